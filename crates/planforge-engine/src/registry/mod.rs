//! Engine registry and capability-based selection.
//!
//! The registry has two phases. While it is open, engines are registered
//! with their supported kind and operations. The first `select` freezes it,
//! after which it is read-only and safe to share between threads without
//! further coordination than the read lock.


use std::collections::BTreeSet;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use planforge_config::SearchConfig;
use planforge_core::{Feature, ProblemKind};
use tracing::{debug, info};

use crate::builtin::{BreadthFirstPlanner, SequentialPlanValidator};
use crate::engine::{Engine, Operation};
use crate::error::{EngineError, Result};

/// Creates a fresh engine instance for one request.
pub type EngineFactory = Arc<dyn Fn(&SearchConfig) -> Box<dyn Engine> + Send + Sync>;

/// What an engine declares about itself at registration.
#[derive(Clone)]
pub struct EngineDescriptor {
    name: String,
    supported_kind: ProblemKind,
    operations: BTreeSet<Operation>,
    factory: EngineFactory,
}

impl EngineDescriptor {
    pub fn new<F>(
        name: impl Into<String>,
        supported_kind: ProblemKind,
        operations: impl IntoIterator<Item = Operation>,
        factory: F,
    ) -> Self
    where
        F: Fn(&SearchConfig) -> Box<dyn Engine> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            supported_kind,
            operations: operations.into_iter().collect(),
            factory: Arc::new(factory),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn supported_kind(&self) -> &ProblemKind {
        &self.supported_kind
    }

    pub fn operations(&self) -> impl Iterator<Item = Operation> + '_ {
        self.operations.iter().copied()
    }

    pub fn declares(&self, operation: Operation) -> bool {
        self.operations.contains(&operation)
    }

    /// True when this engine can perform `operation` on problems of `kind`.
    pub fn supports(&self, operation: Operation, kind: &ProblemKind) -> bool {
        self.declares(operation) && kind.is_subset_of(&self.supported_kind)
    }

    /// Features of `kind` this engine lacks for `operation`.
    fn unmet(&self, operation: Operation, kind: &ProblemKind) -> ProblemKind {
        if self.declares(operation) {
            kind.difference(&self.supported_kind)
        } else {
            kind.clone()
        }
    }

    fn instantiate(&self, config: &SearchConfig) -> Box<dyn Engine> {
        (self.factory)(config)
    }
}

impl fmt::Debug for EngineDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineDescriptor")
            .field("name", &self.name)
            .field("supported_kind", &self.supported_kind)
            .field("operations", &self.operations)
            .finish_non_exhaustive()
    }
}

/// Registered engines, in registration order.
#[derive(Debug, Default)]
pub struct EngineRegistry {
    engines: RwLock<Vec<Arc<EngineDescriptor>>>,
    frozen: AtomicBool,
}

impl EngineRegistry {
    /// Creates an empty, open registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an open registry holding the reference engines.
    pub fn with_builtin_engines() -> Self {
        let registry = Self::new();
        {
            let mut engines = registry.write();
            engines.push(Arc::new(BreadthFirstPlanner::descriptor()));
            engines.push(Arc::new(SequentialPlanValidator::descriptor()));
        }
        registry
    }

    /// Registers an engine.
    ///
    /// Fails with `RegistryFrozen` once the registry has been frozen and with
    /// `DuplicateEngine` if the name is taken.
    pub fn register(&self, descriptor: EngineDescriptor) -> Result<()> {
        let mut engines = self.write();
        if self.frozen.load(Ordering::Acquire) {
            return Err(EngineError::RegistryFrozen(descriptor.name));
        }
        if engines.iter().any(|e| e.name == descriptor.name) {
            return Err(EngineError::DuplicateEngine(descriptor.name));
        }
        info!(
            event = "engine_registered",
            engine = %descriptor.name,
            operations = ?descriptor.operations,
            supported_kind = %descriptor.supported_kind,
        );
        engines.push(Arc::new(descriptor));
        Ok(())
    }

    /// Ends the registration phase.
    pub fn freeze(&self) {
        let _engines = self.write();
        if !self.frozen.swap(true, Ordering::AcqRel) {
            debug!(event = "registry_frozen");
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    /// Snapshot of the registered engines, in registration order.
    pub fn engines(&self) -> Vec<Arc<EngineDescriptor>> {
        self.read().clone()
    }

    /// Selects the closest engine for `operation` on problems of `kind`,
    /// configured with default search bounds.
    pub fn select(&self, operation: Operation, kind: &ProblemKind) -> Result<EngineHandle> {
        self.select_with(operation, kind, &SearchConfig::default())
    }

    /// Selects the closest engine and configures it with `config`.
    ///
    /// An engine is eligible when it declares `operation` and its supported
    /// kind contains `kind`. Among eligible engines the one supporting the
    /// fewest features wins; ties go to the earliest registration. The first
    /// call freezes the registry.
    pub fn select_with(
        &self,
        operation: Operation,
        kind: &ProblemKind,
        config: &SearchConfig,
    ) -> Result<EngineHandle> {
        self.freeze_on_dispatch();
        let engines = self.read();

        let best = engines
            .iter()
            .enumerate()
            .filter(|(_, e)| e.supports(operation, kind))
            .min_by_key(|(index, e)| (e.supported_kind.len(), *index))
            .map(|(_, e)| Arc::clone(e));

        match best {
            Some(descriptor) => Ok(Self::instantiate(&descriptor, operation, kind, config)),
            None => Err(EngineError::NoCompatibleEngine {
                operation,
                unmet: Self::closest_unmet(&engines, operation, kind),
            }),
        }
    }

    /// Selects the engine registered under `name`, provided it is eligible.
    pub fn select_named(
        &self,
        name: &str,
        operation: Operation,
        kind: &ProblemKind,
        config: &SearchConfig,
    ) -> Result<EngineHandle> {
        self.freeze_on_dispatch();
        let engines = self.read();

        let descriptor = engines
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| EngineError::UnknownEngine(name.to_string()))?;
        if !descriptor.supports(operation, kind) {
            return Err(EngineError::NoCompatibleEngine {
                operation,
                unmet: descriptor.unmet(operation, kind).features().collect(),
            });
        }
        Ok(Self::instantiate(descriptor, operation, kind, config))
    }

    fn freeze_on_dispatch(&self) {
        if !self.is_frozen() {
            self.freeze();
        }
    }

    fn instantiate(
        descriptor: &EngineDescriptor,
        operation: Operation,
        kind: &ProblemKind,
        config: &SearchConfig,
    ) -> EngineHandle {
        info!(
            event = "engine_selected",
            engine = %descriptor.name,
            operation = %operation,
            problem_kind = %kind,
        );
        EngineHandle::new(descriptor.instantiate(config))
    }

    /// Smallest missing feature set among engines declaring `operation`, or
    /// every feature of `kind` when none does.
    fn closest_unmet(
        engines: &[Arc<EngineDescriptor>],
        operation: Operation,
        kind: &ProblemKind,
    ) -> Vec<Feature> {
        engines
            .iter()
            .filter(|e| e.declares(operation))
            .map(|e| e.unmet(operation, kind))
            .min_by_key(|unmet| unmet.len())
            .unwrap_or_else(|| kind.clone())
            .features()
            .collect()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<Arc<EngineDescriptor>>> {
        self.engines.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Arc<EngineDescriptor>>> {
        self.engines.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The process-wide registry, created on first use with the reference
/// engines registered.
pub fn global() -> &'static EngineRegistry {
    static GLOBAL: OnceLock<EngineRegistry> = OnceLock::new();
    GLOBAL.get_or_init(EngineRegistry::with_builtin_engines)
}

/// Exclusive, scoped access to a selected engine.
///
/// Dropping the handle calls [`Engine::release`], also when the holder
/// returns early with an error or unwinds.
#[derive(Debug)]
pub struct EngineHandle {
    engine: Box<dyn Engine>,
}

impl EngineHandle {
    pub fn new(engine: Box<dyn Engine>) -> Self {
        Self { engine }
    }
}

impl Deref for EngineHandle {
    type Target = dyn Engine;

    fn deref(&self) -> &Self::Target {
        &*self.engine
    }
}

impl DerefMut for EngineHandle {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.engine
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.engine.release();
        info!(event = "engine_released", engine = %self.engine.name());
    }
}
