//! Step-to-frame resolution and the timing of a single step traversal.

/// Which side of a step table a step index falls on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepSide {
    /// Negative index: before the first step.
    Before,
    /// A valid index into the table.
    Within,
    /// Index past the last step.
    After,
}

/// Classify `step` against a table of `len` steps.
pub fn step_side(step: i64, len: usize) -> StepSide {
    if step < 0 {
        StepSide::Before
    } else if matches!(usize::try_from(step), Ok(s) if s < len) {
        StepSide::Within
    } else {
        StepSide::After
    }
}

/// Frame a step index stands for.
///
/// Negative steps mean frame 0, steps past the table mean the last frame. Table entries are
/// clamped to `last_frame` so a traversal toward them always terminates.
pub fn target_frame_for_step(steps: &[u64], step: i64, last_frame: u64) -> u64 {
    let frame = match step_side(step, steps.len()) {
        StepSide::Before => 0,
        StepSide::After => last_frame,
        StepSide::Within => usize::try_from(step)
            .ok()
            .and_then(|i| steps.get(i))
            .copied()
            .unwrap_or(last_frame),
    };
    frame.min(last_frame)
}

/// `true` when moving from `prev` to `next` jumps between opposite out-of-range ends of the
/// table. Such jumps snap to the target instead of animating.
pub fn is_wraparound_jump(prev: i64, next: i64, len: usize) -> bool {
    matches!(
        (step_side(prev, len), step_side(next, len)),
        (StepSide::Before, StepSide::After) | (StepSide::After, StepSide::Before)
    )
}

/// One in-flight animation toward a target step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Traversal {
    /// Frame shown when the traversal starts (the frame of the preceding step).
    pub begin_frame: u64,
    /// Frame the traversal stops on.
    pub target_frame: u64,
    /// Step reported on completion.
    pub target_step: i64,
    /// Timestamp the traversal started at.
    pub started_at_ms: f64,
    /// Playback rate, one frame per this many milliseconds.
    pub frame_duration_ms: f64,
    /// Last displayable frame.
    pub last_frame: u64,
}

impl Traversal {
    /// Start a traversal toward `target_step` at `now_ms`.
    pub fn begin(
        steps: &[u64],
        target_step: i64,
        now_ms: f64,
        frame_duration_ms: f64,
        last_frame: u64,
    ) -> Self {
        Self {
            begin_frame: target_frame_for_step(steps, target_step.saturating_sub(1), last_frame),
            target_frame: target_frame_for_step(steps, target_step, last_frame),
            target_step,
            started_at_ms: now_ms,
            frame_duration_ms,
            last_frame,
        }
    }

    /// Frame to display at timestamp `ts_ms`.
    ///
    /// Advances one frame per `frame_duration_ms` from `begin_frame`, never past `last_frame`
    /// or `target_frame`. Timestamps before the start count as zero elapsed time.
    pub fn frame_at(&self, ts_ms: f64) -> u64 {
        if self.frame_duration_ms.is_nan() || self.frame_duration_ms <= 0.0 {
            return self.target_frame.min(self.last_frame);
        }
        let elapsed = (ts_ms - self.started_at_ms).max(0.0);
        let advanced = (elapsed / self.frame_duration_ms).floor() as u64;
        self.begin_frame
            .saturating_add(advanced)
            .min(self.last_frame)
            .min(self.target_frame)
    }

    /// `true` once `frame` has reached the target.
    pub fn is_complete(&self, frame: u64) -> bool {
        frame >= self.target_frame
    }
}

#[cfg(test)]
#[path = "../../tests/unit/player/schedule.rs"]
mod tests;
