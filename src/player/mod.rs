//! Flipbook playback: frame lookup, step traversal timing, and presentation.

/// Atlas image prefetch and cache.
pub mod assets;
/// Frame to atlas-region lookup.
pub mod resolve;
/// Step targets and traversal timing.
pub mod schedule;
/// The player state machine.
pub mod session;
/// Presentation strategies.
pub mod sink;
/// Display-refresh tick sources.
pub mod ticker;
