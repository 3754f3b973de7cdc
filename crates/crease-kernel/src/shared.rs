//! Thread boundary between the editor and a background renderer.
//!
//! The sketch is one mutable resource behind one lock: gestures mutate it
//! through [`SharedSketch::mutate`] while renderers take snapshots under the
//! same lock, so a reader never sees a parent fold removed before its split
//! fragments are in place.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::sketch::Sketch;
use crate::snapshot::SketchSnapshot;
use crate::Result;

/// A sketch shared between threads.
#[derive(Debug, Clone)]
pub struct SharedSketch {
    inner: Arc<Mutex<Sketch>>,
}

impl SharedSketch {
    /// Share `sketch`.
    pub fn new(sketch: Sketch) -> Self {
        Self {
            inner: Arc::new(Mutex::new(sketch)),
        }
    }

    /// Run a mutation under the lock.
    pub fn mutate<R>(&self, f: impl FnOnce(&mut Sketch) -> R) -> R {
        let mut sketch = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut sketch)
    }

    /// Run a read under the lock.
    pub fn read<R>(&self, f: impl FnOnce(&Sketch) -> R) -> R {
        let sketch = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&sketch)
    }

    /// A consistent snapshot for rendering or export.
    pub fn read_snapshot(&self) -> Result<SketchSnapshot> {
        self.mutate(Sketch::snapshot)
    }
}

/// Outcome of asking for a redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedrawStart {
    /// Nothing was running; the caller should redraw now.
    Start,
    /// A redraw is running; one follow-up is now owed.
    Coalesced,
}

/// Outcome of finishing a redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedrawStatus {
    /// Requests arrived meanwhile; redraw once more.
    RunAgain,
    /// Nothing is owed.
    Idle,
}

#[derive(Debug, Default)]
struct GateState {
    in_flight: bool,
    pending: bool,
}

/// Coalesces redraw requests so at most one extra redraw is owed.
#[derive(Debug, Default)]
pub struct RedrawGate {
    state: Mutex<GateState>,
}

impl RedrawGate {
    /// Idle gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for a redraw.
    pub fn request(&self) -> RedrawStart {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.in_flight {
            state.pending = true;
            debug!("redraw coalesced");
            RedrawStart::Coalesced
        } else {
            state.in_flight = true;
            RedrawStart::Start
        }
    }

    /// Report the running redraw as done.
    pub fn finish(&self) -> RedrawStatus {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.pending {
            state.pending = false;
            RedrawStatus::RunAgain
        } else {
            state.in_flight = false;
            RedrawStatus::Idle
        }
    }

    /// Whether a redraw is running.
    pub fn is_busy(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .in_flight
    }
}
