//! Video to flipbook encoding: probe, plan, render atlases, write the manifest.

/// The per-file encode driver and batch runner.
pub mod pipeline;
