use crate::foundation::core::FrameSize;
use crate::foundation::error::{FlipbookError, FlipbookResult};

/// Largest atlas side, in pixels, that the PNG rasterizer accepts in practice.
///
/// Empirical ceiling; do not re-derive.
pub const MAX_ATLAS_SIDE_PX: u32 = 23150;

/// Upper bound for the rasterizer's combined buffer size (`2^31 - 1`).
pub const INT_MAX: u64 = 2_147_483_647;

/// Maximum grid (columns x rows) one atlas may use for a given frame size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TileBound {
    /// Maximum number of columns, always >= 1.
    pub cols: u32,
    /// Maximum number of rows, always >= 1.
    pub rows: u32,
}

impl TileBound {
    /// Frames held by a full atlas at this bound.
    pub fn capacity(self) -> u64 {
        u64::from(self.cols) * u64::from(self.rows)
    }

    /// Return `true` when an atlas of this grid stays under [`INT_MAX`] for `frame`.
    pub fn fits(self, frame: FrameSize) -> bool {
        combined_size(frame, self.cols, self.rows) <= INT_MAX
    }
}

/// The rasterizer's buffer estimate: `((w*cols*8)+1024) * (h*rows+128)`.
pub(crate) fn combined_size(frame: FrameSize, cols: u32, rows: u32) -> u64 {
    let w = u64::from(frame.width) * u64::from(cols) * 8 + 1024;
    let h = u64::from(frame.height) * u64::from(rows) + 128;
    w.saturating_mul(h)
}

/// Compute the largest grid that fits under the atlas ceiling for `frame`.
///
/// Starts from `MAX_ATLAS_SIDE_PX / side` on each axis and shrinks columns first, then rows,
/// until the combined size fits. The shrink order is part of the on-disk layout contract:
/// changing it changes which frames land in which atlas.
pub fn compute_max_tile_bound(frame: FrameSize) -> FlipbookResult<TileBound> {
    if frame.width == 0 || frame.height == 0 {
        return Err(FlipbookError::validation(
            "frame width/height must be non-zero",
        ));
    }

    let mut cols = MAX_ATLAS_SIDE_PX / frame.width;
    let mut rows = MAX_ATLAS_SIDE_PX / frame.height;
    if cols == 0 || rows == 0 {
        return Err(FlipbookError::too_large(frame.width, frame.height));
    }

    while combined_size(frame, cols, rows) > INT_MAX {
        if cols > 1 {
            cols -= 1;
        } else if rows > 1 {
            rows -= 1;
        } else {
            return Err(FlipbookError::too_large(frame.width, frame.height));
        }
    }

    Ok(TileBound { cols, rows })
}

#[cfg(test)]
#[path = "../../tests/unit/atlas/bound.rs"]
mod tests;
