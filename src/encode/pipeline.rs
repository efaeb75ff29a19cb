use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context as _;
use rayon::prelude::*;

use crate::atlas::bound::compute_max_tile_bound;
use crate::atlas::plan::{AtlasDescriptor, frame_duration_ms, plan_atlases, total_frames};
use crate::foundation::error::{FlipbookError, FlipbookResult};
use crate::manifest::model::{AtlasEntry, Manifest};
use crate::media::probe::{ProbeResult, Prober};
use crate::media::render::{AtlasRenderRequest, AtlasRenderer};

/// Options controlling where and how flipbooks are written.
#[derive(Clone, Debug)]
pub struct EncodeOpts {
    /// Suffix appended to the source file stem to name the output folder.
    pub output_suffix: String,
    /// File name of the manifest inside the output folder.
    pub manifest_name: String,
    /// Replace an existing flipbook in the output folder.
    pub overwrite: bool,
    /// Encode multiple input files concurrently (rayon), using a dedicated thread pool.
    pub parallel: bool,
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
}

impl Default for EncodeOpts {
    fn default() -> Self {
        Self {
            output_suffix: ".flipb".to_string(),
            manifest_name: "toc.json".to_string(),
            overwrite: true,
            parallel: false,
            threads: None,
        }
    }
}

/// Result of encoding one source file.
#[derive(Clone, Debug)]
pub struct EncodeSummary {
    /// Source video path.
    pub source_path: PathBuf,
    /// Folder holding atlases and manifest.
    pub output_dir: PathBuf,
    /// Path of the written manifest.
    pub manifest_path: PathBuf,
    /// Number of atlases rendered.
    pub atlas_count: usize,
    /// Real-valued frame count recorded in the manifest.
    pub total_frames: f64,
    /// Capacity of a full atlas.
    pub frames_per_atlas: u64,
    /// Wall time spent on this file.
    pub elapsed: Duration,
}

/// Per-file outcome of [`encode_files`]; one failure never stops the other files.
#[derive(Debug)]
pub struct FileOutcome {
    /// Input path as given.
    pub source_path: PathBuf,
    /// Summary on success, the file's fatal error otherwise.
    pub result: FlipbookResult<EncodeSummary>,
}

/// Output folder for `source_path`: `<dir>/<stem><suffix>`.
pub fn output_dir_for(source_path: &Path, opts: &EncodeOpts) -> FlipbookResult<PathBuf> {
    let stem = source_path
        .file_stem()
        .ok_or_else(|| {
            FlipbookError::validation(format!(
                "source path '{}' has no file name",
                source_path.display()
            ))
        })?
        .to_string_lossy();
    let dir = source_path.parent().unwrap_or_else(|| Path::new(""));
    Ok(dir.join(format!("{stem}{}", opts.output_suffix)))
}

/// Assemble the manifest describing `atlases` for a probed source.
///
/// Atlas pixel sizes are `grid * frame size`; `frames_per_atlas` comes from the first atlas.
pub fn build_manifest(
    probe: &ProbeResult,
    frame_duration_ms: f64,
    total_frames: f64,
    atlases: &[AtlasDescriptor],
) -> FlipbookResult<Manifest> {
    let first = atlases
        .first()
        .ok_or_else(|| FlipbookError::manifest("cannot build a manifest without atlases"))?;

    let entries = atlases
        .iter()
        .map(|a| {
            let width = a.grid.cols.checked_mul(probe.width);
            let height = a.grid.rows.checked_mul(probe.height);
            match (width, height) {
                (Some(width), Some(height)) => Ok(AtlasEntry {
                    src: format!("./{}", a.file_name),
                    width,
                    height,
                }),
                _ => Err(FlipbookError::manifest(format!(
                    "atlas '{}' pixel size overflows",
                    a.file_name
                ))),
            }
        })
        .collect::<FlipbookResult<Vec<_>>>()?;

    Ok(Manifest {
        width: probe.width,
        height: probe.height,
        duration_ms: probe.duration_ms,
        frame_rate: probe.frame_rate,
        frame_duration_ms,
        total_frames,
        atlases: entries,
        frames_per_atlas: first.grid.capacity(),
    })
}

/// Probe, plan, render every atlas and write the manifest for one source file.
///
/// Atlases are rendered strictly one after another. Any failure aborts the file before the
/// manifest is written, so a manifest on disk always describes a complete set of atlases.
#[tracing::instrument(
    skip(source_path, opts, prober, renderer),
    fields(source = %source_path.display())
)]
pub fn encode_file(
    source_path: &Path,
    opts: &EncodeOpts,
    prober: &dyn Prober,
    renderer: &dyn AtlasRenderer,
) -> FlipbookResult<EncodeSummary> {
    let started = Instant::now();

    let probe = prober.probe(source_path)?;
    tracing::debug!(?probe, "probed source");

    let bound = compute_max_tile_bound(probe.frame_size())?;
    let frame_duration_ms = frame_duration_ms(probe.frame_rate);
    let total_frames = total_frames(probe.duration_ms, frame_duration_ms);
    let atlases = plan_atlases(total_frames, frame_duration_ms, bound)?;
    tracing::info!(
        total_frames,
        cols = bound.cols,
        rows = bound.rows,
        atlases = atlases.len(),
        "planned atlases"
    );

    let output_dir = output_dir_for(source_path, opts)?;
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("create output folder '{}'", output_dir.display()))?;

    let manifest_path = output_dir.join(&opts.manifest_name);
    if manifest_path.exists() {
        if !opts.overwrite {
            return Err(FlipbookError::validation(format!(
                "manifest '{}' already exists",
                manifest_path.display()
            )));
        }
        // Drop the old manifest first so a failed re-encode can't leave it pointing at a mix
        // of old and new atlases.
        std::fs::remove_file(&manifest_path)
            .with_context(|| format!("remove stale manifest '{}'", manifest_path.display()))?;
    }

    for (i, atlas) in atlases.iter().enumerate() {
        tracing::info!(atlas = i + 1, of = atlases.len(), "rendering atlas");
        let req = AtlasRenderRequest {
            source_path: source_path.to_path_buf(),
            start_time_ms: atlas.start_time_ms,
            grid: atlas.grid,
            output_path: output_dir.join(&atlas.file_name),
        };
        renderer.render(&req)?;
    }

    let manifest = build_manifest(&probe, frame_duration_ms, total_frames, &atlases)?;
    manifest.write_to_path(&manifest_path)?;
    tracing::info!(manifest = %manifest_path.display(), "wrote manifest");

    Ok(EncodeSummary {
        source_path: source_path.to_path_buf(),
        output_dir,
        manifest_path,
        atlas_count: atlases.len(),
        total_frames,
        frames_per_atlas: manifest.frames_per_atlas,
        elapsed: started.elapsed(),
    })
}

/// Encode every input file, collecting a [`FileOutcome`] per file in input order.
pub fn encode_files(
    sources: &[PathBuf],
    opts: &EncodeOpts,
    prober: &dyn Prober,
    renderer: &dyn AtlasRenderer,
) -> FlipbookResult<Vec<FileOutcome>> {
    let run_one = |(i, source): (usize, &PathBuf)| {
        let result = encode_file(source, opts, prober, renderer);
        match &result {
            Ok(summary) => tracing::info!(
                file = i + 1,
                of = sources.len(),
                atlases = summary.atlas_count,
                "encoded {}",
                source.display()
            ),
            Err(e) => tracing::error!(
                file = i + 1,
                of = sources.len(),
                "failed to encode {}: {e}",
                source.display()
            ),
        }
        FileOutcome {
            source_path: source.clone(),
            result,
        }
    };

    if !opts.parallel || sources.len() < 2 {
        return Ok(sources.iter().enumerate().map(run_one).collect());
    }

    let mut pool = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = opts.threads {
        pool = pool.num_threads(threads.max(1));
    }
    let pool = pool
        .build()
        .map_err(|e| FlipbookError::validation(format!("build encode thread pool: {e}")))?;

    Ok(pool.install(|| sources.par_iter().enumerate().map(run_one).collect()))
}

#[cfg(test)]
#[path = "../../tests/unit/encode/pipeline.rs"]
mod tests;
