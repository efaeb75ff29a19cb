use std::fs::File;
use std::io::{BufReader, BufWriter, Write as _};
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::atlas::plan::planned_frame_count;
use crate::foundation::core::{FrameRate, FrameSize};
use crate::foundation::error::{FlipbookError, FlipbookResult};

/// One atlas image as referenced by a manifest.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AtlasEntry {
    /// Image reference relative to the manifest's folder (e.g. `./0.png`).
    pub src: String,
    /// Atlas width in pixels (`grid.cols * frame width`).
    pub width: u32,
    /// Atlas height in pixels (`grid.rows * frame height`).
    pub height: u32,
}

/// Persisted flipbook table of contents.
///
/// Written once at encode time and read-only afterwards. `frames_per_atlas` comes from the
/// first atlas: every atlas but the last holds exactly that many frames.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Source duration in milliseconds.
    pub duration_ms: f64,
    /// Source frame rate, persisted as `"num/den"`.
    #[serde(with = "frame_rate_string")]
    pub frame_rate: FrameRate,
    /// Duration of one frame in milliseconds.
    pub frame_duration_ms: f64,
    /// Real-valued total frame count (`duration_ms / frame_duration_ms`).
    pub total_frames: f64,
    /// Atlas images in frame order.
    pub atlases: Vec<AtlasEntry>,
    /// Capacity of every atlas except possibly the last.
    pub frames_per_atlas: u64,
}

impl Manifest {
    /// Parse a manifest from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> FlipbookResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| FlipbookError::manifest(format!("parse manifest JSON: {e}")))
    }

    /// Parse a manifest from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> FlipbookResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            FlipbookError::manifest(format!("open manifest '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Serialize this manifest as compact JSON.
    pub fn to_writer<W: std::io::Write>(&self, w: W) -> FlipbookResult<()> {
        serde_json::to_writer(w, self)
            .map_err(|e| FlipbookError::manifest(format!("serialize manifest JSON: {e}")))
    }

    /// Write this manifest to `path`.
    ///
    /// The JSON goes to a sibling temporary file first and is renamed into place, so readers
    /// never observe a half-written manifest.
    pub fn write_to_path(&self, path: impl AsRef<Path>) -> FlipbookResult<()> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .ok_or_else(|| FlipbookError::manifest("manifest path has no file name"))?;
        let mut tmp_name = file_name.to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = path.with_file_name(tmp_name);

        let f = File::create(&tmp_path)
            .with_context(|| format!("create manifest '{}'", tmp_path.display()))?;
        let mut w = BufWriter::new(f);
        self.to_writer(&mut w)?;
        w.flush()
            .with_context(|| format!("flush manifest '{}'", tmp_path.display()))?;
        drop(w);

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("move manifest into place at '{}'", path.display()))?;
        Ok(())
    }

    /// Validate the structural invariants the player relies on.
    pub fn validate(&self) -> FlipbookResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(FlipbookError::manifest("width/height must be non-zero"));
        }
        if !self.frame_duration_ms.is_finite() || self.frame_duration_ms <= 0.0 {
            return Err(FlipbookError::manifest(
                "frameDurationMs must be finite and > 0",
            ));
        }
        if !self.total_frames.is_finite() || self.total_frames <= 0.0 {
            return Err(FlipbookError::manifest(
                "totalFrames must be finite and > 0",
            ));
        }
        if self.atlases.is_empty() {
            return Err(FlipbookError::manifest("atlas list must be non-empty"));
        }
        if self.frames_per_atlas == 0 {
            return Err(FlipbookError::manifest("framesPerAtlas must be > 0"));
        }

        for (i, atlas) in self.atlases.iter().enumerate() {
            if atlas.width == 0 || !atlas.width.is_multiple_of(self.width) {
                return Err(FlipbookError::manifest(format!(
                    "atlas {i} width {} is not a multiple of frame width {}",
                    atlas.width, self.width
                )));
            }
            if atlas.height == 0 || !atlas.height.is_multiple_of(self.height) {
                return Err(FlipbookError::manifest(format!(
                    "atlas {i} height {} is not a multiple of frame height {}",
                    atlas.height, self.height
                )));
            }
            normalize_src(&atlas.src)?;
        }

        // Frame lookup assumes every atlas but the last is exactly as full as the first.
        let capacities: Vec<u64> = self
            .atlases
            .iter()
            .map(|a| u64::from(a.width / self.width) * u64::from(a.height / self.height))
            .collect();
        if self.frames_per_atlas != capacities[0] {
            return Err(FlipbookError::manifest(format!(
                "framesPerAtlas {} does not match the first atlas' {} cells",
                self.frames_per_atlas, capacities[0]
            )));
        }
        let last = capacities.len() - 1;
        if let Some(i) = capacities[..last]
            .iter()
            .position(|&c| c != self.frames_per_atlas)
        {
            return Err(FlipbookError::manifest(format!(
                "atlas {i} holds {} frames, expected {}",
                capacities[i], self.frames_per_atlas
            )));
        }

        let frames = planned_frame_count(self.total_frames);
        let before_last = self.frames_per_atlas.checked_mul(last as u64);
        let in_last = before_last.and_then(|n| frames.checked_sub(n));
        match in_last {
            Some(n) if n <= capacities[last] => {}
            _ => {
                return Err(FlipbookError::manifest(format!(
                    "{} atlases of {} frames do not match {} frames",
                    self.atlases.len(),
                    self.frames_per_atlas,
                    self.total_frames
                )));
            }
        }

        Ok(())
    }

    /// Per-frame dimensions.
    pub fn frame_size(&self) -> FrameSize {
        FrameSize {
            width: self.width,
            height: self.height,
        }
    }

    /// Last displayable frame index.
    pub fn last_frame(&self) -> u64 {
        planned_frame_count(self.total_frames).saturating_sub(1)
    }

    /// Resolve atlas `index`'s `src` against the folder containing the manifest.
    pub fn atlas_path(&self, base_dir: &Path, index: usize) -> FlipbookResult<PathBuf> {
        let atlas = self.atlases.get(index).ok_or_else(|| {
            FlipbookError::validation(format!(
                "atlas index {index} out of range ({} atlases)",
                self.atlases.len()
            ))
        })?;
        Ok(base_dir.join(normalize_src(&atlas.src)?))
    }
}

/// Normalize an atlas `src` into a manifest-relative path.
///
/// Uses `/` separators, drops `.` segments, and rejects absolute paths or `..` traversals.
pub(crate) fn normalize_src(src: &str) -> FlipbookResult<String> {
    let s = src.replace('\\', "/");
    if s.starts_with('/') {
        return Err(FlipbookError::manifest(format!(
            "atlas src '{src}' must be relative"
        )));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(FlipbookError::manifest(format!(
                "atlas src '{src}' must not contain '..'"
            )));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(FlipbookError::manifest(format!(
            "atlas src '{src}' must contain a file name"
        )));
    }

    Ok(out.join("/"))
}

mod frame_rate_string {
    use crate::foundation::core::FrameRate;

    pub(super) fn serialize<S: serde::Serializer>(r: &FrameRate, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(r)
    }

    pub(super) fn deserialize<'de, D: serde::Deserializer<'de>>(
        d: D,
    ) -> Result<FrameRate, D::Error> {
        let raw = <String as serde::Deserialize>::deserialize(d)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/manifest/model.rs"]
mod tests;
