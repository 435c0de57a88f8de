use std::time::{Duration, Instant};

use catalog_core::{update, CatalogState, CatalogViewModel, Msg};
use catalog_logging::catalog_trace;

use crate::effects::EffectRunner;

const RECV_SLICE: Duration = Duration::from_millis(100);

/// Single-threaded dispatch loop: msg → update → effects → engine → msg.
pub struct Driver {
    state: CatalogState,
    runner: EffectRunner,
}

impl Driver {
    pub fn new(runner: EffectRunner) -> Self {
        Self {
            state: CatalogState::new(),
            runner,
        }
    }

    pub fn view(&self) -> CatalogViewModel {
        self.state.view()
    }

    /// Applies `msg` and hands the resulting effects to the engine.
    /// Returns whether any effect was issued.
    pub fn dispatch(&mut self, msg: Msg) -> bool {
        catalog_trace!("dispatch {:?}", msg);
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        let issued = !effects.is_empty();
        self.runner.run(effects);
        issued
    }

    /// Feeds engine events into `update` until `done` holds or `timeout`
    /// elapses. Returns whether `done` was reached.
    pub fn run_until(&mut self, timeout: Duration, done: impl Fn(&CatalogState) -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if done(&self.state) {
                return true;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            if let Some(msg) = self.runner.next_msg(remaining.min(RECV_SLICE)) {
                self.dispatch(msg);
            }
        }
    }

    /// Stops background work; pending engine events are dropped.
    pub fn shutdown(&mut self) {
        self.dispatch(Msg::Shutdown);
        self.runner.shutdown();
    }
}
