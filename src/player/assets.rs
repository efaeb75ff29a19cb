//! Atlas image prefetch.
//!
//! Every atlas of a manifest is decoded up front (rayon, wait-for-all). Pixel-dependent
//! drawing is withheld until the whole set has settled. Failed atlases are reported, not
//! thrown: frames on atlases that did load still draw.

use std::path::{Path, PathBuf};
use std::sync::{Arc, mpsc};
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::Context as _;
use image::RgbaImage;
use rayon::prelude::*;

use crate::foundation::error::FlipbookResult;
use crate::manifest::model::Manifest;

/// One atlas that could not be loaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetLoadFailure {
    /// Index into the manifest's atlas list.
    pub index: usize,
    /// The atlas `src` as written in the manifest.
    pub src: String,
    /// Human-readable cause.
    pub reason: String,
}

/// Outcome of loading every atlas of a manifest.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssetLoadReport {
    /// Atlases decoded successfully.
    pub loaded: usize,
    /// Atlases that failed, in index order.
    pub failures: Vec<AssetLoadFailure>,
}

impl AssetLoadReport {
    /// `true` when every atlas loaded.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// One-line description of all failures.
    pub fn describe_failures(&self) -> String {
        self.failures
            .iter()
            .map(|f| format!("atlas {} ({}): {}", f.index, f.src, f.reason))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Decoded atlases, indexed like the manifest's atlas list.
#[derive(Clone, Debug, Default)]
pub struct LoadedAtlases {
    /// `None` where loading failed.
    pub images: Vec<Option<Arc<RgbaImage>>>,
    /// What failed, if anything.
    pub report: AssetLoadReport,
}

/// Decode every atlas referenced by `manifest`, resolving `src` against `base_dir`.
///
/// Blocks until all atlases have settled.
pub fn load_atlas_images(manifest: &Manifest, base_dir: &Path) -> LoadedAtlases {
    let results = (0..manifest.atlases.len())
        .into_par_iter()
        .map(|i| load_one(manifest, base_dir, i))
        .collect::<Vec<_>>();

    let mut out = LoadedAtlases::default();
    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok(img) => {
                out.report.loaded += 1;
                out.images.push(Some(Arc::new(img)));
            }
            Err(e) => {
                out.report.failures.push(AssetLoadFailure {
                    index,
                    src: manifest.atlases[index].src.clone(),
                    reason: format!("{e:#}"),
                });
                out.images.push(None);
            }
        }
    }

    if !out.report.is_complete() {
        tracing::error!(
            failed = out.report.failures.len(),
            "errors while loading assets: {}",
            out.report.describe_failures()
        );
    }
    out
}

fn load_one(manifest: &Manifest, base_dir: &Path, index: usize) -> FlipbookResult<RgbaImage> {
    let path = manifest.atlas_path(base_dir, index)?;
    let img = image::open(&path).with_context(|| format!("decode atlas '{}'", path.display()))?;
    Ok(img.to_rgba8())
}

/// What [`AtlasImages::poll`] or [`AtlasImages::wait`] observed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollStatus {
    /// No load outstanding.
    Idle,
    /// The current load is still running.
    Pending,
    /// The current load finished and its images are now available.
    Applied,
}

type LoadMsg = (u64, LoadedAtlases);

/// Atlas image cache fed by background loads.
///
/// Each load is tagged with the generation current when it started. [`reset`](Self::reset)
/// and [`spawn`](Self::spawn) move to a new generation, so results of a superseded load are
/// dropped when they arrive.
#[derive(Debug)]
pub struct AtlasImages {
    generation: u64,
    images: Vec<Option<Arc<RgbaImage>>>,
    report: Option<AssetLoadReport>,
    in_flight: Option<(u64, JoinHandle<()>)>,
    tx: mpsc::Sender<LoadMsg>,
    rx: mpsc::Receiver<LoadMsg>,
}

impl Default for AtlasImages {
    fn default() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            generation: 0,
            images: Vec::new(),
            report: None,
            in_flight: None,
            tx,
            rx,
        }
    }
}

impl AtlasImages {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Forget all images and abandon any outstanding load.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.images.clear();
        self.report = None;
        self.in_flight = None;
    }

    /// Start loading every atlas of `manifest` on a background thread.
    ///
    /// Supersedes any earlier load. Returns the generation the load is tagged with.
    pub fn spawn(&mut self, manifest: &Manifest, base_dir: &Path) -> FlipbookResult<u64> {
        self.reset();
        let generation = self.generation;
        let manifest = manifest.clone();
        let base_dir: PathBuf = base_dir.to_path_buf();
        let tx = self.tx.clone();

        let handle = std::thread::Builder::new()
            .name("flipbook-atlas-load".to_string())
            .spawn(move || {
                let loaded = load_atlas_images(&manifest, &base_dir);
                // The receiver lives as long as the cache; a send error means it is gone.
                let _ = tx.send((generation, loaded));
            })
            .context("spawn atlas loader thread")?;

        self.in_flight = Some((generation, handle));
        Ok(generation)
    }

    /// Apply any finished load without blocking.
    pub fn poll(&mut self) -> PollStatus {
        let mut status = self.idle_or_pending();
        while let Ok((generation, loaded)) = self.rx.try_recv() {
            if self.apply(generation, loaded) {
                status = PollStatus::Applied;
            }
        }
        status
    }

    /// Block until the current load settles.
    pub fn wait(&mut self) -> PollStatus {
        loop {
            let Some((_, handle)) = &self.in_flight else {
                return PollStatus::Idle;
            };
            let finished = handle.is_finished();
            match self.rx.recv_timeout(Duration::from_millis(20)) {
                Ok((generation, loaded)) => {
                    if self.apply(generation, loaded) {
                        return PollStatus::Applied;
                    }
                }
                Err(mpsc::RecvTimeoutError::Timeout) if finished => {
                    tracing::error!("atlas loader exited without reporting");
                    self.in_flight = None;
                    return PollStatus::Idle;
                }
                Err(_) => {}
            }
        }
    }

    /// `true` once every atlas of the current generation has either loaded or failed.
    pub fn is_settled(&self) -> bool {
        self.report.is_some()
    }

    /// Report for the current generation, once settled.
    pub fn report(&self) -> Option<&AssetLoadReport> {
        self.report.as_ref()
    }

    /// Decoded pixels for atlas `index`, available only after the set has settled.
    pub fn image(&self, index: usize) -> Option<&RgbaImage> {
        if !self.is_settled() {
            return None;
        }
        self.images.get(index)?.as_deref()
    }

    fn idle_or_pending(&self) -> PollStatus {
        if self.in_flight.is_some() {
            PollStatus::Pending
        } else {
            PollStatus::Idle
        }
    }

    fn apply(&mut self, generation: u64, loaded: LoadedAtlases) -> bool {
        let current = matches!(self.in_flight, Some((g, _)) if g == generation)
            && generation == self.generation;
        if !current {
            tracing::debug!(
                generation,
                current = self.generation,
                "dropping superseded atlas load"
            );
            return false;
        }
        self.images = loaded.images;
        self.report = Some(loaded.report);
        self.in_flight = None;
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/player/assets.rs"]
mod tests;
