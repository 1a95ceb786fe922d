#![warn(missing_docs)]

//! Turn-scoped session state for the chatcad conversational CAD engine.
//!
//! A [`Session`] owns one conversation: the accumulated turn history, the
//! live [`ModelRegistry`], a single-slot snapshot cache, and the display
//! lifecycle. Each call to [`Session::submit_turn`] asks the planner for
//! an operation log, applies it atomically through the composition
//! engine, and presents the result.
//!
//! The registry is always derivable by replaying the full history from
//! empty; the cache only short-circuits that replay, never changes it.

mod cache;
mod config;
mod display;
mod planner;

pub use cache::{history_key, SessionCache};
pub use config::{ConfigError, SessionConfig};
pub use display::{DisplaySession, DisplaySurface};
pub use planner::{JsonPlanner, Planner, PlannerError};

use chatcad_engine::{
    export_combined, export_model, CompositionEngine, EngineError, ModelExportError,
    ModelRegistry, ModelSummary,
};
use chatcad_export::ExportFormat;
use chatcad_ops::OperationLog;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// One accepted conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// The user utterance that produced this turn.
    pub utterance: String,
    /// The operation log the planner emitted for it.
    pub log: OperationLog,
}

/// Result of a successful turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// Summaries of every live model after the turn.
    pub models: Vec<ModelSummary>,
    /// Whether the turn extended a cached snapshot instead of replaying.
    pub cache_hit: bool,
    /// Number of operations applied.
    pub operations: usize,
}

/// Errors from submitting a turn. The turn is rejected as a whole; the
/// session keeps its pre-turn state.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The planner could not produce an operation log.
    #[error(transparent)]
    Planner(#[from] PlannerError),
    /// The composition engine rejected the log.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// One conversation's session state.
pub struct Session<P: Planner, S: DisplaySurface> {
    planner: P,
    display: DisplaySession<S>,
    engine: CompositionEngine,
    config: SessionConfig,
    history: Vec<Turn>,
    registry: ModelRegistry,
    cache: SessionCache,
}

impl<P: Planner, S: DisplaySurface> Session<P, S> {
    /// Create a session over a planner and a display surface.
    pub fn new(planner: P, surface: S, config: SessionConfig) -> Self {
        let engine = CompositionEngine::with_config(config.engine_config());
        Self {
            planner,
            display: DisplaySession::new(surface),
            engine,
            config,
            history: Vec::new(),
            registry: ModelRegistry::new(),
            cache: SessionCache::new(),
        }
    }

    /// Submit one user utterance.
    ///
    /// With `use_cache`, the turn extends the cached snapshot for the
    /// prior history when one is available; otherwise the full history is
    /// replayed from empty first. Either way the observable result is the
    /// same. The display is updated only after the whole log has applied.
    pub fn submit_turn(
        &mut self,
        utterance: &str,
        use_cache: bool,
    ) -> Result<TurnOutcome, SessionError> {
        let feedback = self.registry.summaries();
        let log = self.planner.plan(utterance, &feedback)?;

        let (base, cache_hit) = if use_cache {
            let key = history_key(&self.history, self.config.cache_depth);
            match self.cache.lookup(key) {
                Some(snapshot) => (snapshot.clone(), true),
                None => (self.replay()?, false),
            }
        } else {
            (self.registry.clone(), false)
        };

        let operations = log.len();
        let next = self.engine.apply(&log, &base)?;

        self.history.push(Turn {
            utterance: utterance.to_string(),
            log,
        });
        self.registry = next;
        let key = history_key(&self.history, self.config.cache_depth);
        self.cache.store(key, self.registry.clone());
        self.display.show(&self.registry);

        info!(
            turn = self.history.len(),
            operations, cache_hit, "turn accepted"
        );
        Ok(TurnOutcome {
            models: self.registry.summaries(),
            cache_hit,
            operations,
        })
    }

    /// Replay the full accumulated history from an empty registry.
    fn replay(&self) -> Result<ModelRegistry, SessionError> {
        let mut registry = ModelRegistry::new();
        for turn in &self.history {
            registry = self.engine.apply(&turn.log, &registry)?;
        }
        Ok(registry)
    }

    /// Discard all session state and close the display.
    pub fn clear_session(&mut self) {
        self.history.clear();
        self.registry = ModelRegistry::new();
        self.cache.clear();
        self.display.close();
        info!("session cleared");
    }

    /// The accepted turns, in order.
    pub fn get_history(&self) -> &[Turn] {
        &self.history
    }

    /// The live registry.
    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Close the current visualization without clearing state.
    pub fn close_display(&mut self) {
        self.display.close();
    }

    /// True if a visualization is live.
    pub fn display_open(&self) -> bool {
        self.display.is_open()
    }

    /// Export one model in the given format.
    pub fn export(&self, id: &str, format: ExportFormat) -> Result<Vec<u8>, ModelExportError> {
        export_model(&self.registry, id, format)
    }

    /// Export every live model as one combined mesh.
    pub fn export_all(&self, format: ExportFormat) -> Result<Vec<u8>, ModelExportError> {
        export_combined(&self.registry, format)
    }
}
