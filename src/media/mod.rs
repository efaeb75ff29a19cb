//! Adapters for the external probe and render tools.
//!
//! Both are traits so the encode pipeline can be exercised without `ffmpeg` installed.

/// Probing source videos (`ffprobe`).
pub mod probe;
/// Rendering tiled atlases (`ffmpeg`).
pub mod render;
