/// Tile bound calculation under the atlas size ceiling.
pub mod bound;
/// Partitioning a frame count into atlases.
pub mod plan;
