use crate::foundation::core::FrameIndex;
use crate::manifest::model::Manifest;

/// Pixel rectangle inside an atlas image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SourceRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Frame width.
    pub width: u32,
    /// Frame height.
    pub height: u32,
}

/// Where one frame lives inside the atlas set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameLocation {
    /// Frame actually displayed, after clamping and reset.
    pub frame: FrameIndex,
    /// Index into the manifest's atlas list.
    pub atlas_index: usize,
    /// Rectangle to copy out of the atlas.
    pub rect: SourceRect,
}

/// Result of [`resolve`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// The frame maps onto a region of an atlas.
    Frame(FrameLocation),
    /// No atlas is available; the display should only be sized to the frame.
    NoAtlas {
        /// Frame width.
        width: u32,
        /// Frame height.
        height: u32,
    },
}

impl Resolution {
    /// The resolved location, if any.
    pub fn location(&self) -> Option<&FrameLocation> {
        match self {
            Self::Frame(loc) => Some(loc),
            Self::NoAtlas { .. } => None,
        }
    }
}

/// Clamp `requested` into `[0, last_frame]` without any atlas lookup.
pub fn clamp_frame(manifest: &Manifest, requested: i64) -> u64 {
    u64::try_from(requested)
        .unwrap_or(0)
        .min(manifest.last_frame())
}

/// Map a requested frame onto its atlas and source rectangle.
///
/// Frames are clamped into `[0, last_frame]`. A frame whose atlas index falls past the end of
/// the atlas list displays frame 0 instead. Frames are laid out left-to-right then
/// top-to-bottom; the column count is implied by `atlas.width / manifest.width`.
pub fn resolve(manifest: &Manifest, requested: i64) -> Resolution {
    let no_atlas = Resolution::NoAtlas {
        width: manifest.width,
        height: manifest.height,
    };
    if manifest.frames_per_atlas == 0 {
        return no_atlas;
    }

    let mut frame = clamp_frame(manifest, requested);
    let mut atlas_index = usize::try_from(frame / manifest.frames_per_atlas).unwrap_or(usize::MAX);
    if atlas_index >= manifest.atlases.len() {
        if !manifest.atlases.is_empty() {
            tracing::warn!(frame, atlas_index, "frame has no atlas, showing frame 0");
        }
        atlas_index = 0;
        frame = 0;
    }

    let Some(atlas) = manifest.atlases.get(atlas_index) else {
        return no_atlas;
    };
    if atlas.width == 0 {
        return no_atlas;
    }

    let width = u64::from(manifest.width);
    let Some(virtual_x) = (frame % manifest.frames_per_atlas).checked_mul(width) else {
        tracing::warn!(frame, atlas_index, "frame offset overflows");
        return no_atlas;
    };
    let x = virtual_x % u64::from(atlas.width);
    let y = (virtual_x / u64::from(atlas.width)).checked_mul(u64::from(manifest.height));
    let inside = |y: u32| u64::from(y) + u64::from(manifest.height) <= u64::from(atlas.height);

    match (u32::try_from(x), y.and_then(|y| u32::try_from(y).ok())) {
        (Ok(x), Some(y)) if inside(y) => Resolution::Frame(FrameLocation {
            frame: FrameIndex(frame),
            atlas_index,
            rect: SourceRect {
                x,
                y,
                width: manifest.width,
                height: manifest.height,
            },
        }),
        _ => {
            tracing::warn!(frame, atlas_index, "frame lies outside atlas bounds");
            no_atlas
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/player/resolve.rs"]
mod tests;
