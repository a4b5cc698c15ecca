//! Ground forward breadth-first search.

use std::collections::{HashSet, VecDeque};
use std::time::{Duration, Instant};

use planforge_config::SearchConfig;
use planforge_core::semantics::{apply_effects, first_violated};
use planforge_core::{
    Action, ActionInstance, Binding, Feature, Plan, Problem, ProblemKind, State,
};
use tracing::{debug, info, trace};

use crate::engine::{Engine, Operation, SolveOutcome};
use crate::error::Result;
use crate::registry::EngineDescriptor;

/// Breadth-first search over total ground states.
///
/// All actions are grounded up front. Nodes are expanded in order of
/// depth, so the first plan found is a shortest one. Search stops with
/// [`SolveOutcome::Timeout`] when the node or time limit is reached and with
/// [`SolveOutcome::Unsolvable`] when every reachable state has been seen.
///
/// Like most classical search engines it only accepts positive conditions;
/// negated conditions are compiled away before dispatch.
#[derive(Debug, Clone)]
pub struct BreadthFirstPlanner {
    node_limit: u64,
    time_limit: Option<Duration>,
}

/// A ground action ready to be applied.
struct Candidate<'p> {
    action: &'p Action,
    instance: ActionInstance,
    binding: Binding,
}

impl Candidate<'_> {
    /// The successor of `state`, or `None` if the action is not applicable.
    fn apply(&self, state: &State) -> Option<State> {
        match first_violated(self.action.preconditions(), state, &self.binding) {
            Ok(None) => apply_effects(self.action.effects(), state, &self.binding).ok(),
            Ok(Some(_)) | Err(_) => None,
        }
    }
}

struct Node {
    state: State,
    parent: Option<usize>,
    via: Option<usize>,
}

impl BreadthFirstPlanner {
    pub const NAME: &'static str = "breadth_first";

    pub fn new(config: &SearchConfig) -> Self {
        Self {
            node_limit: config.node_limit,
            time_limit: config.time_limit(),
        }
    }

    pub fn with_node_limit(mut self, node_limit: u64) -> Self {
        self.node_limit = node_limit;
        self
    }

    /// Registration record for this engine.
    pub fn descriptor() -> EngineDescriptor {
        EngineDescriptor::new(
            Self::NAME,
            ProblemKind::full().without(Feature::NegativeConditions),
            [Operation::Solve],
            |config| Box::new(Self::new(config)),
        )
    }

    fn ground<'p>(problem: &'p Problem) -> Result<Vec<Candidate<'p>>> {
        let mut candidates = Vec::new();
        for action in problem.actions() {
            for arguments in problem.argument_tuples(action.parameters()) {
                let binding = Binding::bind(action.name(), action.parameters(), &arguments)?;
                candidates.push(Candidate {
                    action,
                    instance: ActionInstance::new(action.name(), arguments),
                    binding,
                });
            }
        }
        Ok(candidates)
    }

    fn goals_hold(problem: &Problem, state: &State) -> bool {
        matches!(
            first_violated(problem.goals(), state, &Binding::new()),
            Ok(None)
        )
    }

    fn extract_plan(nodes: &[Node], candidates: &[Candidate<'_>], mut index: usize) -> Plan {
        let mut steps = Vec::new();
        while let (Some(parent), Some(via)) = (nodes[index].parent, nodes[index].via) {
            steps.push(candidates[via].instance.clone());
            index = parent;
        }
        steps.reverse();
        Plan::new(steps)
    }
}

impl Engine for BreadthFirstPlanner {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn solve(&mut self, problem: &Problem) -> Result<SolveOutcome> {
        let started = Instant::now();
        let initial = problem.initial_state()?;
        let candidates = Self::ground(problem)?;
        debug!(
            event = "search_start",
            problem = problem.name(),
            ground_actions = candidates.len(),
            node_limit = self.node_limit,
        );

        let mut visited: HashSet<State> = HashSet::from([initial.clone()]);
        let mut nodes = vec![Node {
            state: initial,
            parent: None,
            via: None,
        }];
        let mut frontier = VecDeque::from([0usize]);
        let mut expanded: u64 = 0;

        let outcome = loop {
            let Some(index) = frontier.pop_front() else {
                break SolveOutcome::Unsolvable;
            };
            if Self::goals_hold(problem, &nodes[index].state) {
                break SolveOutcome::Solved(Self::extract_plan(&nodes, &candidates, index));
            }
            let out_of_time = self.time_limit.is_some_and(|limit| started.elapsed() >= limit);
            if expanded >= self.node_limit || out_of_time {
                break SolveOutcome::Timeout;
            }
            expanded += 1;
            trace!(event = "node_expanded", node = index, frontier = frontier.len());

            for (via, candidate) in candidates.iter().enumerate() {
                let Some(next) = candidate.apply(&nodes[index].state) else {
                    continue;
                };
                if visited.insert(next.clone()) {
                    nodes.push(Node {
                        state: next,
                        parent: Some(index),
                        via: Some(via),
                    });
                    frontier.push_back(nodes.len() - 1);
                }
            }
        };

        info!(
            event = "search_end",
            engine = Self::NAME,
            outcome = match &outcome {
                SolveOutcome::Solved(_) => "solved",
                SolveOutcome::Unsolvable => "unsolvable",
                SolveOutcome::Timeout => "timeout",
            },
            plan_length = outcome.plan().map_or(0, Plan::len),
            nodes_expanded = expanded,
            states_seen = nodes.len(),
            duration_ms = started.elapsed().as_millis() as u64,
        );
        Ok(outcome)
    }
}
