//! Display session lifecycle.
//!
//! The session owns at most one live visualization. `show` releases the
//! previous surface resource before presenting the new registry, and
//! `close` is idempotent, so external surfaces can rely on a strict
//! acquire/release pairing no matter how many turns run.

use chatcad_engine::{ModelRegistry, ModelSummary};
use tracing::debug;

/// External visualization surface. Implementations render however they
/// like; the session only drives the resource lifecycle.
pub trait DisplaySurface {
    /// Present the given models, acquiring whatever resource backs the
    /// visualization.
    fn present(&mut self, models: &[ModelSummary]);

    /// Release the currently presented visualization.
    fn release(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DisplayState {
    Closed,
    Open,
}

/// Owns the lifetime of one conversation's visualization.
pub struct DisplaySession<S: DisplaySurface> {
    surface: S,
    state: DisplayState,
}

impl<S: DisplaySurface> DisplaySession<S> {
    /// Wrap a surface; starts closed.
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            state: DisplayState::Closed,
        }
    }

    /// True if a visualization is currently live.
    pub fn is_open(&self) -> bool {
        self.state == DisplayState::Open
    }

    /// Show the registry, releasing any prior visualization first.
    pub fn show(&mut self, registry: &ModelRegistry) {
        if self.state == DisplayState::Open {
            debug!("releasing previous visualization before show");
            self.surface.release();
        }
        self.surface.present(&registry.summaries());
        self.state = DisplayState::Open;
    }

    /// Close the visualization if open. No-op when already closed.
    pub fn close(&mut self) {
        if self.state == DisplayState::Open {
            self.surface.release();
            self.state = DisplayState::Closed;
        }
    }

    /// Access the underlying surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test double that counts live resources.
    #[derive(Debug, Default)]
    pub struct CountingSurface {
        pub live: usize,
        pub presents: usize,
        pub releases: usize,
    }

    impl DisplaySurface for CountingSurface {
        fn present(&mut self, _models: &[ModelSummary]) {
            self.live += 1;
            self.presents += 1;
        }

        fn release(&mut self) {
            self.live -= 1;
            self.releases += 1;
        }
    }

    #[test]
    fn repeated_show_keeps_one_resource_live() {
        let mut display = DisplaySession::new(CountingSurface::default());
        let reg = ModelRegistry::new();
        for _ in 0..5 {
            display.show(&reg);
        }
        assert_eq!(display.surface().live, 1);
        assert_eq!(display.surface().presents, 5);
        assert_eq!(display.surface().releases, 4);
    }

    #[test]
    fn close_is_idempotent() {
        let mut display = DisplaySession::new(CountingSurface::default());
        let reg = ModelRegistry::new();
        display.show(&reg);
        display.close();
        display.close();
        assert_eq!(display.surface().live, 0);
        assert_eq!(display.surface().releases, 1);
        assert!(!display.is_open());
    }

    #[test]
    fn show_after_close_reacquires() {
        let mut display = DisplaySession::new(CountingSurface::default());
        let reg = ModelRegistry::new();
        display.show(&reg);
        display.close();
        display.show(&reg);
        assert!(display.is_open());
        assert_eq!(display.surface().live, 1);
    }
}
