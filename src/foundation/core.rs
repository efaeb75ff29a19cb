use std::fmt;
use std::str::FromStr;

use crate::foundation::error::{FlipbookError, FlipbookResult};

/// Absolute 0-based frame index in source video space.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Source frame rate represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRate {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32, // must be > 0
}

impl FrameRate {
    /// Create a validated frame rate.
    pub fn new(num: u32, den: u32) -> FlipbookResult<Self> {
        if den == 0 {
            return Err(FlipbookError::validation("frame rate den must be > 0"));
        }
        if num == 0 {
            return Err(FlipbookError::validation("frame rate num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point frames per second.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one source frame in milliseconds.
    ///
    /// Kept as a real number: rounding here would drift atlas start times.
    pub fn frame_duration_ms(self) -> f64 {
        (f64::from(self.den) * 1000.0) / f64::from(self.num)
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

impl FromStr for FrameRate {
    type Err = FlipbookError;

    /// Parse `"num/den"` (as printed by ffprobe's `r_frame_rate`). A bare integer means `num/1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (num, den) = match s.split_once('/') {
            Some((n, d)) => (n.trim(), d.trim()),
            None => (s, "1"),
        };
        let num: u32 = num
            .parse()
            .map_err(|_| FlipbookError::validation(format!("invalid frame rate '{s}'")))?;
        let den: u32 = den
            .parse()
            .map_err(|_| FlipbookError::validation(format!("invalid frame rate '{s}'")))?;
        Self::new(num, den)
    }
}

/// Per-frame pixel dimensions of a source video.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl FrameSize {
    /// Create a validated, non-empty frame size.
    pub fn new(width: u32, height: u32) -> FlipbookResult<Self> {
        if width == 0 || height == 0 {
            return Err(FlipbookError::validation(
                "frame width/height must be non-zero",
            ));
        }
        Ok(Self { width, height })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
