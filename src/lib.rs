//! Flipbook turns videos into sprite-sheet atlases and plays them back frame by frame.
//!
//! Encoding probes a source video, computes how many frames fit in one atlas image, renders
//! the atlases with `ffmpeg` and writes a JSON manifest (`toc.json`) next to them:
//!
//! - [`compute_max_tile_bound`] and [`plan_atlases`] decide the atlas grids
//! - [`encode_file`] / [`encode_files`] drive probing, rendering and the manifest write
//!
//! Playback resolves frame indices against a [`Manifest`] and pushes atlas regions to a
//! [`RenderSink`], either directly ([`Player::set_frame`]) or by animating toward named steps
//! ([`Player::set_step`]).
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Atlas sizing and planning.
pub mod atlas;
/// Source-to-flipbook encoding.
pub mod encode;
/// The persisted flipbook manifest.
pub mod manifest;
/// External probe and render tools.
pub mod media;
/// Flipbook playback.
pub mod player;

pub use crate::foundation::core::{FrameIndex, FrameRate, FrameSize};
pub use crate::foundation::error::{FlipbookError, FlipbookResult};

pub use crate::atlas::bound::{INT_MAX, MAX_ATLAS_SIDE_PX, TileBound, compute_max_tile_bound};
pub use crate::atlas::plan::{AtlasDescriptor, Grid, plan_atlases};
pub use crate::encode::pipeline::{
    EncodeOpts, EncodeSummary, FileOutcome, build_manifest, encode_file, encode_files,
};
pub use crate::manifest::model::{AtlasEntry, Manifest};
pub use crate::media::probe::{FfprobeProber, ProbeResult, Prober};
pub use crate::media::render::{AtlasRenderRequest, AtlasRenderer, FfmpegAtlasRenderer};
pub use crate::player::assets::{AssetLoadFailure, AssetLoadReport, AtlasImages};
pub use crate::player::resolve::{FrameLocation, Resolution, SourceRect, resolve};
pub use crate::player::session::{PlaybackMode, PlaybackState, Player, TickOutcome};
pub use crate::player::sink::{CssSink, ImageSink, RecordingSink, RenderSink};
pub use crate::player::ticker::{ManualTicker, TickHandle, TickScheduler};
