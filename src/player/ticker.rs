//! Display-refresh tick source abstraction.
//!
//! A [`TickScheduler`] hands out one [`TickHandle`] per requested callback. The host delivers
//! each tick back to the player together with its timestamp; cancelled handles must never be
//! delivered.

/// Identifies one scheduled tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TickHandle(u64);

impl TickHandle {
    /// Wrap a host-specific tick id.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Host-specific tick id.
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Source of display-refresh callbacks (e.g. `requestAnimationFrame`, a vsync timer).
pub trait TickScheduler {
    /// Request one callback on the next refresh.
    fn schedule_tick(&mut self) -> TickHandle;
    /// Withdraw a previously scheduled callback. Unknown handles are ignored.
    fn cancel_tick(&mut self, handle: TickHandle);
}

/// Tick scheduler driven by hand; the caller decides when pending ticks fire.
#[derive(Debug, Default)]
pub struct ManualTicker {
    next_id: u64,
    pending: Vec<TickHandle>,
    cancelled: usize,
}

impl ManualTicker {
    /// Create an idle ticker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticks scheduled and not yet taken or cancelled.
    pub fn pending(&self) -> &[TickHandle] {
        &self.pending
    }

    /// Remove and return every pending tick, oldest first.
    pub fn take_pending(&mut self) -> Vec<TickHandle> {
        std::mem::take(&mut self.pending)
    }

    /// Number of pending ticks withdrawn through [`TickScheduler::cancel_tick`].
    pub fn cancelled_count(&self) -> usize {
        self.cancelled
    }
}

impl TickScheduler for ManualTicker {
    fn schedule_tick(&mut self) -> TickHandle {
        self.next_id += 1;
        let handle = TickHandle(self.next_id);
        self.pending.push(handle);
        handle
    }

    fn cancel_tick(&mut self, handle: TickHandle) {
        let before = self.pending.len();
        self.pending.retain(|h| *h != handle);
        if self.pending.len() != before {
            self.cancelled += 1;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/player/ticker.rs"]
mod tests;
