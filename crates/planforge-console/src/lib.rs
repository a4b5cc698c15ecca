//! Colorful console output for planning runs.
//!
//! Provides a custom `tracing` layer that formats PlanForge events with
//! colors.
//!
//! ## Log Levels
//!
//! - **INFO**: Lifecycle events (compilation, engine selection, search and
//!   validation results)
//! - **DEBUG**: Per-step details (shadow fluents, skipped ground actions,
//!   validation steps)
//! - **TRACE**: Individual search node expansions
//!
//! The filter defaults to `planforge=info` and honours `RUST_LOG`.

use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: OnceLock<()> = OnceLock::new();
static EPOCH: OnceLock<Instant> = OnceLock::new();

/// Package version for banner display.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initializes the console output.
///
/// Safe to call multiple times - only the first call has effect.
/// Prints the PlanForge banner and sets up tracing.
pub fn init() {
    INIT.get_or_init(|| {
        EPOCH.get_or_init(Instant::now);
        print_banner();

        let filter = EnvFilter::builder()
            .with_default_directive(LevelFilter::WARN.into())
            .from_env_lossy()
            .add_directive(
                "planforge=info"
                    .parse()
                    .unwrap_or_else(|_| LevelFilter::INFO.into()),
            );

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(PlanConsoleLayer)
            .try_init();
    });
}

fn elapsed_secs() -> f64 {
    EPOCH.get().map_or(0.0, |epoch| epoch.elapsed().as_secs_f64())
}

fn print_banner() {
    let banner = r#"
 ____  _             _____
|  _ \| | __ _ _ __ |  ___|__  _ __ __ _  ___
| |_) | |/ _` | '_ \| |_ / _ \| '__/ _` |/ _ \
|  __/| | (_| | | | |  _| (_) | | | (_| |  __/
|_|   |_|\__,_|_| |_|_|  \___/|_|  \__, |\___|
                                   |___/
"#;

    let version_line = format!("              v{} - Classical Planning Toolkit\n", VERSION);

    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{}", banner.bright_cyan());
    let _ = writeln!(stdout, "{}", version_line.bright_white().bold());
    let _ = stdout.flush();
}

/// A tracing layer that formats planning events with colors.
pub struct PlanConsoleLayer;

impl<S: Subscriber> Layer<S> for PlanConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !metadata.target().starts_with("planforge") {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_event(&visitor, *metadata.level());
        if !output.is_empty() {
            let _ = writeln!(io::stdout(), "{} {}", format_elapsed(), output);
        }
    }
}

#[derive(Debug, Default)]
struct EventVisitor {
    event: Option<String>,
    problem: Option<String>,
    compiler: Option<String>,
    engine: Option<String>,
    operation: Option<String>,
    outcome: Option<String>,
    kind: Option<String>,
    action: Option<String>,
    valid: Option<bool>,
    steps: Option<u64>,
    step: Option<u64>,
    stages: Option<u64>,
    actions: Option<u64>,
    fluents_added: Option<u64>,
    plan_length: Option<u64>,
    nodes_expanded: Option<u64>,
    states_seen: Option<u64>,
    node: Option<u64>,
    duration_ms: Option<u64>,
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let s = format!("{:?}", value);
        self.record_str(field, s.trim_matches('"'));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            "steps" => self.steps = Some(value),
            "step" => self.step = Some(value),
            "stages" => self.stages = Some(value),
            "actions" => self.actions = Some(value),
            "fluents_added" => self.fluents_added = Some(value),
            "plan_length" => self.plan_length = Some(value),
            "nodes_expanded" => self.nodes_expanded = Some(value),
            "states_seen" => self.states_seen = Some(value),
            "node" => self.node = Some(value),
            "duration_ms" => self.duration_ms = Some(value),
            _ => {}
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_u64(field, value.max(0) as u64);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        if field.name() == "valid" {
            self.valid = Some(value);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        let slot = match field.name() {
            "event" => &mut self.event,
            "problem" => &mut self.problem,
            "compiler" => &mut self.compiler,
            "engine" => &mut self.engine,
            "operation" => &mut self.operation,
            "outcome" => &mut self.outcome,
            "kind" | "problem_kind" => &mut self.kind,
            "action" => &mut self.action,
            _ => return,
        };
        *slot = Some(value.to_string());
    }
}

fn format_event(v: &EventVisitor, level: Level) -> String {
    match v.event.as_deref().unwrap_or("") {
        "solve_start" => format_solve_start(v),
        "compile_end" => format_compile_end(v),
        "pipeline_end" => format_pipeline_end(v),
        "engine_selected" => format_engine_selected(v),
        "search_end" => format_search_end(v),
        "validation_end" => format_validation_end(v),
        "validation_step" if level <= Level::DEBUG => format_validation_step(v),
        "node_expanded" if level == Level::TRACE => format_node(v),
        _ => String::new(),
    }
}

fn format_elapsed() -> String {
    format!("{:>7.3}s", elapsed_secs())
        .bright_black()
        .to_string()
}

fn count(n: u64) -> String {
    n.to_formatted_string(&Locale::en)
}

fn format_solve_start(v: &EventVisitor) -> String {
    format!(
        "{} Planning {}",
        "▶".bright_green().bold(),
        v.problem.as_deref().unwrap_or("problem").white().bold()
    )
}

fn format_compile_end(v: &EventVisitor) -> String {
    let mut output = format!(
        "{} {} │ {}",
        "⚙".bright_blue(),
        v.compiler.as_deref().unwrap_or("compiler").white().bold(),
        format_duration_ms(v.duration_ms.unwrap_or(0)).yellow()
    );
    if let Some(added) = v.fluents_added {
        output.push_str(&format!(" │ {} fluents added", count(added).bright_yellow()));
    }
    if let Some(actions) = v.actions {
        output.push_str(&format!(" │ {} actions", count(actions).bright_yellow()));
    }
    output
}

fn format_pipeline_end(v: &EventVisitor) -> String {
    format!(
        "{} {} stages │ kind {}",
        "◀".bright_blue(),
        count(v.stages.unwrap_or(0)).white(),
        v.kind.as_deref().unwrap_or("?").bright_magenta()
    )
}

fn format_engine_selected(v: &EventVisitor) -> String {
    format!(
        "{} {} selected for {}",
        "→".bright_cyan(),
        v.engine.as_deref().unwrap_or("engine").white().bold(),
        v.operation.as_deref().unwrap_or("?")
    )
}

fn format_search_end(v: &EventVisitor) -> String {
    let outcome = v.outcome.as_deref().unwrap_or("unknown");
    let status = match outcome {
        "solved" => "SOLVED".bright_green().bold().to_string(),
        "timeout" => "TIMEOUT".yellow().bold().to_string(),
        _ => outcome.to_uppercase().bright_red().bold().to_string(),
    };
    let mut output = format!(
        "{} Search complete │ {} │ {} │ {} nodes │ {} states",
        "■".bright_cyan().bold(),
        status,
        format_duration_ms(v.duration_ms.unwrap_or(0)).yellow(),
        count(v.nodes_expanded.unwrap_or(0)).bright_magenta(),
        count(v.states_seen.unwrap_or(0)).bright_magenta(),
    );
    if outcome == "solved" {
        output.push_str(&format!(
            " │ plan of {} steps",
            count(v.plan_length.unwrap_or(0)).white().bold()
        ));
    }
    output
}

fn format_validation_end(v: &EventVisitor) -> String {
    let status = if v.valid.unwrap_or(false) {
        "VALID".bright_green().bold().to_string()
    } else {
        "INVALID".bright_red().bold().to_string()
    };
    format!(
        "{} Validation │ {} │ {} steps │ {}",
        "✔".bright_cyan(),
        v.problem.as_deref().unwrap_or("problem"),
        count(v.steps.unwrap_or(0)).white(),
        status
    )
}

fn format_validation_step(v: &EventVisitor) -> String {
    format!(
        "  Step {:>6} │ {}",
        count(v.step.unwrap_or(0)).bright_black(),
        v.action.as_deref().unwrap_or("?")
    )
}

fn format_node(v: &EventVisitor) -> String {
    format!(
        "  Node {:>10}",
        count(v.node.unwrap_or(0)).bright_black()
    )
}

fn format_duration_ms(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.2}s", ms as f64 / 1000.0)
    } else {
        let mins = ms / 60_000;
        let secs = (ms % 60_000) / 1000;
        format!("{}m {}s", mins, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visitor(event: &str) -> EventVisitor {
        EventVisitor {
            event: Some(event.to_string()),
            ..EventVisitor::default()
        }
    }

    #[test]
    fn test_duration_formatting() {
        assert_eq!(format_duration_ms(15), "15ms");
        assert_eq!(format_duration_ms(2_500), "2.50s");
        assert_eq!(format_duration_ms(125_000), "2m 5s");
    }

    #[test]
    fn test_search_end_reports_plan() {
        let v = EventVisitor {
            outcome: Some("solved".into()),
            plan_length: Some(3),
            nodes_expanded: Some(12_345),
            ..visitor("search_end")
        };
        let line = format_event(&v, Level::INFO);
        assert!(line.contains("SOLVED"));
        assert!(line.contains("12,345"));
        assert!(line.contains("plan of"));
    }

    #[test]
    fn test_unknown_and_filtered_events_are_silent() {
        assert!(format_event(&visitor("engine_released"), Level::INFO).is_empty());
        assert!(format_event(&visitor("node_expanded"), Level::DEBUG).is_empty());
        assert!(!format_event(&visitor("node_expanded"), Level::TRACE).is_empty());
    }

    #[test]
    fn test_validation_status() {
        let valid = EventVisitor {
            valid: Some(true),
            ..visitor("validation_end")
        };
        let invalid = EventVisitor {
            valid: Some(false),
            ..visitor("validation_end")
        };
        let line = format_event(&valid, Level::INFO);
        assert!(line.contains("VALID") && !line.contains("INVALID"));
        assert!(format_event(&invalid, Level::INFO).contains("INVALID"));
    }
}
