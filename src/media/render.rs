use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::atlas::plan::Grid;
use crate::foundation::error::{FlipbookError, FlipbookResult};

/// Request to rasterize one atlas from a source video.
#[derive(Clone, Debug, PartialEq)]
pub struct AtlasRenderRequest {
    /// Source video path.
    pub source_path: PathBuf,
    /// Source time of the atlas' first frame.
    pub start_time_ms: f64,
    /// Grid to tile frames into, left-to-right then top-to-bottom.
    pub grid: Grid,
    /// Output image path.
    pub output_path: PathBuf,
}

/// Turns an [`AtlasRenderRequest`] into an image file.
///
/// A call either leaves a complete image at `output_path` or fails; partial atlases are never
/// accepted.
pub trait AtlasRenderer: Sync {
    /// Render one atlas.
    fn render(&self, req: &AtlasRenderRequest) -> FlipbookResult<()>;
}

/// [`AtlasRenderer`] backed by the system `ffmpeg` binary and its `tile` filter.
///
/// Unfilled trailing cells of the last atlas are padded with transparent black.
#[derive(Clone, Copy, Debug, Default)]
pub struct FfmpegAtlasRenderer;

impl AtlasRenderer for FfmpegAtlasRenderer {
    fn render(&self, req: &AtlasRenderRequest) -> FlipbookResult<()> {
        if req.grid.cols == 0 || req.grid.rows == 0 {
            return Err(FlipbookError::validation("atlas grid must be at least 1x1"));
        }
        ensure_parent_dir(&req.output_path)?;

        let out = Command::new("ffmpeg")
            .args(ffmpeg_tile_args(req))
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                FlipbookError::render(format!(
                    "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
                ))
            })?;

        if !out.status.success() {
            return Err(FlipbookError::render(format!(
                "ffmpeg exited with status {} for '{}': {}",
                out.status,
                req.output_path.display(),
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }
        if !req.output_path.is_file() {
            return Err(FlipbookError::render(format!(
                "ffmpeg reported success but '{}' was not written",
                req.output_path.display()
            )));
        }
        Ok(())
    }
}

/// Command-line arguments for rendering one tiled atlas with `ffmpeg`.
pub(crate) fn ffmpeg_tile_args(req: &AtlasRenderRequest) -> Vec<OsString> {
    let seek = format!("{:.6}", req.start_time_ms / 1000.0);
    let tile = format!(
        "tile={}x{}:color=0x000000@0x00",
        req.grid.cols, req.grid.rows
    );

    let mut args: Vec<OsString> = Vec::with_capacity(13);
    args.extend(["-hide_banner", "-loglevel", "error", "-ss"].map(OsString::from));
    args.push(seek.into());
    args.push("-i".into());
    args.push(req.source_path.clone().into_os_string());
    args.extend(["-frames:v", "1", "-vf"].map(OsString::from));
    args.push(tile.into());
    args.push("-y".into());
    args.push(req.output_path.clone().into_os_string());
    args
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> FlipbookResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/media/render.rs"]
mod tests;
