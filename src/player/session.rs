use std::fmt;
use std::path::Path;

use crate::foundation::error::{FlipbookError, FlipbookResult};
use crate::manifest::model::Manifest;
use crate::player::assets::{AtlasImages, PollStatus};
use crate::player::resolve::{Resolution, clamp_frame, resolve};
use crate::player::schedule::{Traversal, is_wraparound_jump, target_frame_for_step};
use crate::player::sink::{AtlasRegion, RenderSink};
use crate::player::ticker::{ManualTicker, TickHandle, TickScheduler};

/// Completion callback, called with the step a traversal arrived at.
pub type StepCallback = Box<dyn FnMut(i64)>;

/// How a [`Player`] is driven. Fixed for the player's lifetime.
pub enum PlaybackMode {
    /// The caller sets the displayed frame directly.
    FrameControlled {
        /// Requested frame (clamped on display).
        frame: i64,
    },
    /// The caller names steps; the player animates between their frames.
    StepControlled {
        /// Frame for each step index.
        steps: Vec<u64>,
        /// Current target step. Negative means before the first step, past the end means the
        /// last frame.
        current_step: i64,
        /// Called once per completed traversal.
        on_complete: Option<StepCallback>,
    },
}

impl PlaybackMode {
    /// Step-controlled mode without a completion callback.
    pub fn steps(steps: Vec<u64>, current_step: i64) -> Self {
        Self::StepControlled {
            steps,
            current_step,
            on_complete: None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::FrameControlled { .. } => "frame-controlled",
            Self::StepControlled { .. } => "step-controlled",
        }
    }
}

impl fmt::Debug for PlaybackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FrameControlled { frame } => f
                .debug_struct("FrameControlled")
                .field("frame", frame)
                .finish(),
            Self::StepControlled {
                steps,
                current_step,
                on_complete,
            } => f
                .debug_struct("StepControlled")
                .field("steps", steps)
                .field("current_step", current_step)
                .field("on_complete", &on_complete.is_some())
                .finish(),
        }
    }
}

/// Observable playback state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlaybackState {
    /// Frame last displayed.
    pub current_frame: u64,
    /// Current target step (step-controlled only).
    pub current_step: Option<i64>,
    /// The one outstanding tick, if a traversal is running.
    pub pending_tick: Option<TickHandle>,
}

/// What a delivered tick did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// The handle was not the pending one.
    Ignored,
    /// A frame was displayed and another tick scheduled.
    Advanced {
        /// Frame displayed.
        frame: u64,
    },
    /// The traversal reached its target.
    Completed {
        /// Step arrived at.
        step: i64,
        /// Frame displayed.
        frame: u64,
    },
}

/// Flipbook player: resolves frames against a manifest and pushes them to a sink.
///
/// Single-threaded and cooperative: the host delivers ticks requested through `T` back via
/// [`on_tick`](Self::on_tick). At most one tick is outstanding at a time.
pub struct Player<S: RenderSink, T: TickScheduler> {
    manifest: Manifest,
    mode: PlaybackMode,
    state: PlaybackState,
    traversal: Option<Traversal>,
    images: AtlasImages,
    sink: S,
    ticker: T,
    usage_errors: usize,
}

impl<S: RenderSink, T: TickScheduler> Player<S, T> {
    /// Create a player and display its initial frame.
    pub fn new(manifest: Manifest, mode: PlaybackMode, sink: S, ticker: T) -> Self {
        let mut player = Self {
            manifest,
            mode,
            state: PlaybackState::default(),
            traversal: None,
            images: AtlasImages::new(),
            sink,
            ticker,
            usage_errors: 0,
        };
        player.show_initial();
        player
    }

    /// Display `frame`. Only valid in frame-controlled mode.
    pub fn set_frame(&mut self, frame: i64) -> FlipbookResult<()> {
        let PlaybackMode::FrameControlled { frame: current } = &mut self.mode else {
            return Err(self.usage("frame-controlled"));
        };
        *current = frame;
        self.display(frame);
        Ok(())
    }

    /// Move toward `step`, starting at `now_ms`. Only valid in step-controlled mode.
    ///
    /// Re-requesting the current step does nothing. Any running traversal is cancelled first.
    pub fn set_step(&mut self, step: i64, now_ms: f64) -> FlipbookResult<()> {
        let last_frame = self.manifest.last_frame();
        let frame_duration_ms = self.manifest.frame_duration_ms;
        let PlaybackMode::StepControlled {
            steps,
            current_step,
            ..
        } = &mut self.mode
        else {
            return Err(self.usage("step-controlled"));
        };
        if *current_step == step {
            return Ok(());
        }

        let prev = std::mem::replace(current_step, step);
        self.state.current_step = Some(step);
        let wraparound = is_wraparound_jump(prev, step, steps.len());
        let traversal = Traversal::begin(steps, step, now_ms, frame_duration_ms, last_frame);
        let target = target_frame_for_step(steps, step, last_frame);

        self.cancel_pending();

        if wraparound {
            tracing::debug!(prev, step, target, "jumping between ends");
            self.display(frame_as_i64(target));
            return Ok(());
        }

        tracing::debug!(
            step,
            from = traversal.begin_frame,
            to = traversal.target_frame,
            "starting traversal"
        );
        self.display(frame_as_i64(traversal.begin_frame));
        self.traversal = Some(traversal);
        self.state.pending_tick = Some(self.ticker.schedule_tick());
        Ok(())
    }

    /// Deliver a tick at timestamp `ts_ms`.
    pub fn on_tick(&mut self, handle: TickHandle, ts_ms: f64) -> TickOutcome {
        if self.state.pending_tick != Some(handle) {
            return TickOutcome::Ignored;
        }
        self.state.pending_tick = None;
        let Some(traversal) = self.traversal else {
            return TickOutcome::Ignored;
        };

        let frame = traversal.frame_at(ts_ms);
        self.display(frame_as_i64(frame));

        if traversal.is_complete(frame) {
            self.traversal = None;
            tracing::debug!(step = traversal.target_step, frame, "traversal complete");
            if let PlaybackMode::StepControlled {
                on_complete: Some(cb),
                ..
            } = &mut self.mode
            {
                cb(traversal.target_step);
            }
            return TickOutcome::Completed {
                step: traversal.target_step,
                frame,
            };
        }

        self.state.pending_tick = Some(self.ticker.schedule_tick());
        TickOutcome::Advanced { frame }
    }

    /// Replace the manifest, dropping playback state and cached images, then show the initial
    /// frame of the new source.
    pub fn swap_source(&mut self, manifest: Manifest) {
        self.cancel_pending();
        self.images.reset();
        self.manifest = manifest;
        self.state = PlaybackState::default();
        self.show_initial();
    }

    /// Start decoding all atlases in the background; `base_dir` is the manifest's folder.
    pub fn preload_atlases(&mut self, base_dir: &Path) -> FlipbookResult<u64> {
        self.images.spawn(&self.manifest, base_dir)
    }

    /// Apply a finished atlas load, redrawing the current frame once pixels are available.
    pub fn poll_atlases(&mut self) -> PollStatus {
        let status = self.images.poll();
        self.redraw_if_applied(status)
    }

    /// Block until the outstanding atlas load settles, then redraw the current frame.
    pub fn wait_for_atlases(&mut self) -> PollStatus {
        let status = self.images.wait();
        self.redraw_if_applied(status)
    }

    /// Current playback state.
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Manifest being played.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Playback mode.
    pub fn mode(&self) -> &PlaybackMode {
        &self.mode
    }

    /// Atlas image cache.
    pub fn images(&self) -> &AtlasImages {
        &self.images
    }

    /// The render sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// The render sink, mutably.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// The tick scheduler.
    pub fn ticker(&self) -> &T {
        &self.ticker
    }

    /// `true` while a traversal is in flight.
    pub fn is_animating(&self) -> bool {
        self.traversal.is_some()
    }

    /// Number of rejected mode-mismatched updates.
    pub fn usage_error_count(&self) -> usize {
        self.usage_errors
    }

    fn show_initial(&mut self) {
        let last_frame = self.manifest.last_frame();
        let frame = match &self.mode {
            PlaybackMode::FrameControlled { frame } => *frame,
            PlaybackMode::StepControlled {
                steps,
                current_step,
                ..
            } => {
                self.state.current_step = Some(*current_step);
                frame_as_i64(target_frame_for_step(steps, *current_step, last_frame))
            }
        };
        self.display(frame);
    }

    fn display(&mut self, requested: i64) {
        match resolve(&self.manifest, requested) {
            Resolution::Frame(loc) => {
                self.state.current_frame = loc.frame.0;
                let region = AtlasRegion {
                    atlas_index: loc.atlas_index,
                    atlas: &self.manifest.atlases[loc.atlas_index],
                    rect: loc.rect,
                    frame: loc.frame,
                    pixels: self.images.image(loc.atlas_index),
                };
                self.sink.draw_region(&region);
            }
            Resolution::NoAtlas { width, height } => {
                self.state.current_frame = clamp_frame(&self.manifest, requested);
                self.sink.show_fallback(width, height);
            }
        }
    }

    fn redraw_if_applied(&mut self, status: PollStatus) -> PollStatus {
        if status == PollStatus::Applied {
            self.display(frame_as_i64(self.state.current_frame));
        }
        status
    }

    fn cancel_pending(&mut self) {
        self.traversal = None;
        if let Some(handle) = self.state.pending_tick.take() {
            self.ticker.cancel_tick(handle);
        }
    }

    fn usage(&mut self, required: &str) -> FlipbookError {
        self.usage_errors += 1;
        let msg = format!(
            "player is {}; this update requires {required} mode and was ignored",
            self.mode.name()
        );
        tracing::error!("{msg}");
        FlipbookError::usage(msg)
    }
}

impl<S: RenderSink> Player<S, ManualTicker> {
    /// Deliver pending ticks every `interval_ms` starting at `start_ms` until none remain or
    /// `max_ticks` have been delivered.
    pub fn run_until_idle(
        &mut self,
        start_ms: f64,
        interval_ms: f64,
        max_ticks: usize,
    ) -> Vec<TickOutcome> {
        let mut outcomes = Vec::new();
        let mut ts = start_ms;
        while outcomes.len() < max_ticks {
            let pending = self.ticker.take_pending();
            if pending.is_empty() {
                break;
            }
            for handle in pending {
                outcomes.push(self.on_tick(handle, ts));
            }
            ts += interval_ms;
        }
        outcomes
    }
}

impl<S: RenderSink, T: TickScheduler> Drop for Player<S, T> {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

fn frame_as_i64(frame: u64) -> i64 {
    i64::try_from(frame).unwrap_or(i64::MAX)
}

#[cfg(test)]
#[path = "../../tests/unit/player/session.rs"]
mod tests;
