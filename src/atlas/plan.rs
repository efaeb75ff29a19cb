use crate::atlas::bound::TileBound;
use crate::foundation::core::FrameRate;
use crate::foundation::error::{FlipbookError, FlipbookResult};

/// Grid size of one planned atlas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Grid {
    /// Columns in the atlas.
    pub cols: u32,
    /// Rows in the atlas.
    pub rows: u32,
}

impl Grid {
    /// Number of frame cells in this grid.
    pub fn capacity(self) -> u64 {
        u64::from(self.cols) * u64::from(self.rows)
    }
}

/// One planned atlas: which file to write, where in the source it starts, and its grid.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtlasDescriptor {
    /// Output file name, `<index>.png`.
    pub file_name: String,
    /// Source time of the first frame in this atlas.
    pub start_time_ms: f64,
    /// Grid used to tile frames.
    pub grid: Grid,
}

/// Duration of one source frame in milliseconds.
pub fn frame_duration_ms(frame_rate: FrameRate) -> f64 {
    frame_rate.frame_duration_ms()
}

/// Total source frames (real-valued) for a duration and frame duration.
pub fn total_frames(duration_ms: f64, frame_duration_ms: f64) -> f64 {
    duration_ms / frame_duration_ms
}

/// Whole frames tiled for a real-valued frame count.
///
/// A trailing partial frame still gets a cell, so the plan always covers the whole duration.
pub fn planned_frame_count(total_frames: f64) -> u64 {
    total_frames.ceil().max(0.0) as u64
}

/// Partition `total_frames` into atlases of at most `bound.cols x bound.rows` frames.
///
/// Every atlas except the last is filled to exactly the bound's capacity; the last one is
/// sized to cover the remainder. The player derives `framesPerAtlas` from the first atlas,
/// so this fill order must hold for frame lookup to stay correct.
pub fn plan_atlases(
    total_frames: f64,
    frame_duration_ms: f64,
    bound: TileBound,
) -> FlipbookResult<Vec<AtlasDescriptor>> {
    if !total_frames.is_finite() || total_frames <= 0.0 {
        return Err(FlipbookError::validation(
            "total frame count must be finite and > 0",
        ));
    }
    if total_frames.ceil() > f64::from(u32::MAX) {
        return Err(FlipbookError::validation(format!(
            "total frame count {total_frames} exceeds {}",
            u32::MAX
        )));
    }
    if !frame_duration_ms.is_finite() || frame_duration_ms <= 0.0 {
        return Err(FlipbookError::validation(
            "frame duration must be finite and > 0",
        ));
    }
    if bound.cols == 0 || bound.rows == 0 {
        return Err(FlipbookError::validation("tile bound must be at least 1x1"));
    }

    let mut atlases = Vec::new();
    let mut frames_remaining = planned_frame_count(total_frames);
    let mut start_time_ms = 0.0;
    let mut index = 0usize;

    while frames_remaining > 0 {
        let cols = u64::from(bound.cols).min(frames_remaining);
        let rows = u64::from(bound.rows).min(frames_remaining.div_ceil(cols));
        let grid = Grid {
            cols: cols as u32,
            rows: rows as u32,
        };
        let frames_in_atlas = grid.capacity();

        atlases.push(AtlasDescriptor {
            file_name: format!("{index}.png"),
            start_time_ms,
            grid,
        });

        frames_remaining = frames_remaining.saturating_sub(frames_in_atlas);
        start_time_ms += frames_in_atlas as f64 * frame_duration_ms;
        index += 1;
    }

    Ok(atlases)
}

#[cfg(test)]
#[path = "../../tests/unit/atlas/plan.rs"]
mod tests;
