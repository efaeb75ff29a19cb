//! Presentation strategies for resolved frames.

use image::RgbaImage;

use crate::foundation::core::FrameIndex;
use crate::manifest::model::{AtlasEntry, normalize_src};
use crate::player::resolve::SourceRect;

/// One frame's region inside an atlas, handed to a [`RenderSink`].
#[derive(Clone, Copy, Debug)]
pub struct AtlasRegion<'a> {
    /// Index into the manifest's atlas list.
    pub atlas_index: usize,
    /// The atlas as described by the manifest.
    pub atlas: &'a AtlasEntry,
    /// Rectangle holding the frame.
    pub rect: SourceRect,
    /// Frame being displayed.
    pub frame: FrameIndex,
    /// Decoded atlas pixels, once loaded.
    pub pixels: Option<&'a RgbaImage>,
}

/// Receives display updates from a player.
pub trait RenderSink {
    /// Show `region` of an atlas.
    fn draw_region(&mut self, region: &AtlasRegion<'_>);
    /// No atlas is available; size the display to one frame and show nothing.
    fn show_fallback(&mut self, width: u32, height: u32);
}

/// One call observed by a [`RecordingSink`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SinkEvent {
    /// [`RenderSink::draw_region`].
    Draw {
        /// Frame displayed.
        frame: FrameIndex,
        /// Atlas used.
        atlas_index: usize,
        /// Source rectangle.
        rect: SourceRect,
        /// Whether decoded pixels were available.
        had_pixels: bool,
    },
    /// [`RenderSink::show_fallback`].
    Fallback {
        /// Frame width.
        width: u32,
        /// Frame height.
        height: u32,
    },
}

/// Sink that records every call.
#[derive(Debug, Default)]
pub struct RecordingSink {
    /// Calls in arrival order.
    pub events: Vec<SinkEvent>,
}

impl RecordingSink {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames drawn, in order.
    pub fn drawn_frames(&self) -> Vec<u64> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Draw { frame, .. } => Some(frame.0),
                SinkEvent::Fallback { .. } => None,
            })
            .collect()
    }

    /// Most recent call, if any.
    pub fn last(&self) -> Option<&SinkEvent> {
        self.events.last()
    }
}

impl RenderSink for RecordingSink {
    fn draw_region(&mut self, region: &AtlasRegion<'_>) {
        self.events.push(SinkEvent::Draw {
            frame: region.frame,
            atlas_index: region.atlas_index,
            rect: region.rect,
            had_pixels: region.pixels.is_some(),
        });
    }

    fn show_fallback(&mut self, width: u32, height: u32) {
        self.events.push(SinkEvent::Fallback { width, height });
    }
}

/// Background-position strategy: the whole atlas is the element's background and the frame
/// is selected by offsetting it.
///
/// The sink keeps the element's current inline style; fallbacks only touch the size, leaving
/// the last background in place.
#[derive(Clone, Debug, Default)]
pub struct CssSink {
    base_url: String,
    background_image: Option<String>,
    background_size: Option<String>,
    background_position: Option<String>,
    width: Option<String>,
    height: Option<String>,
    frame_attr: Option<String>,
}

impl CssSink {
    /// Create a sink resolving atlas `src` values against `base_url` (empty keeps them as-is).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Current inline style, declarations in a fixed order.
    pub fn style(&self) -> Vec<(&'static str, &str)> {
        [
            ("background-image", &self.background_image),
            ("background-size", &self.background_size),
            ("background-position", &self.background_position),
            ("width", &self.width),
            ("height", &self.height),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.as_deref().map(|v| (k, v)))
        .collect()
    }

    /// Current inline style as a `style` attribute value.
    pub fn style_attr(&self) -> String {
        self.style()
            .into_iter()
            .map(|(k, v)| format!("{k}: {v};"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Value of the `data-flipbook-frame` attribute.
    pub fn frame_attr(&self) -> Option<&str> {
        self.frame_attr.as_deref()
    }

    fn url_for(&self, src: &str) -> String {
        if self.base_url.is_empty() {
            return src.to_string();
        }
        // Invalid sources are rejected by manifest validation; fall back to the raw value.
        let rel = normalize_src(src).unwrap_or_else(|_| src.to_string());
        format!("{}/{rel}", self.base_url.trim_end_matches('/'))
    }
}

impl RenderSink for CssSink {
    fn draw_region(&mut self, region: &AtlasRegion<'_>) {
        let url = self.url_for(&region.atlas.src);
        self.background_image = Some(format!("url(\"{url}\")"));
        self.background_size = Some(format!(
            "{}px {}px",
            region.atlas.width, region.atlas.height
        ));
        self.background_position = Some(format!(
            "{}px {}px",
            -i64::from(region.rect.x),
            -i64::from(region.rect.y)
        ));
        self.width = Some(format!("{}px", region.rect.width));
        self.height = Some(format!("{}px", region.rect.height));
        self.frame_attr = Some(region.frame.0.to_string());
    }

    fn show_fallback(&mut self, width: u32, height: u32) {
        self.width = Some(format!("{width}px"));
        self.height = Some(format!("{height}px"));
    }
}

/// Canvas blit strategy: copies the frame's rectangle out of the decoded atlas.
///
/// Draws are skipped while the atlas pixels are not loaded, keeping the previous frame.
#[derive(Clone, Debug, Default)]
pub struct ImageSink {
    frame: Option<RgbaImage>,
    shown: Option<FrameIndex>,
    skipped: usize,
}

impl ImageSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current frame buffer.
    pub fn frame(&self) -> Option<&RgbaImage> {
        self.frame.as_ref()
    }

    /// Take the current frame buffer.
    pub fn take_frame(&mut self) -> Option<RgbaImage> {
        self.shown = None;
        self.frame.take()
    }

    /// Frame index currently in the buffer; `None` after a fallback.
    pub fn shown_frame(&self) -> Option<FrameIndex> {
        self.shown
    }

    /// Draws skipped because pixels were unavailable or the rectangle was out of bounds.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl RenderSink for ImageSink {
    fn draw_region(&mut self, region: &AtlasRegion<'_>) {
        let Some(pixels) = region.pixels else {
            self.skipped += 1;
            return;
        };
        let r = region.rect;
        let fits = u64::from(r.x) + u64::from(r.width) <= u64::from(pixels.width())
            && u64::from(r.y) + u64::from(r.height) <= u64::from(pixels.height());
        if !fits {
            tracing::warn!(
                atlas = region.atlas_index,
                frame = region.frame.0,
                "frame rectangle exceeds decoded atlas, skipping draw"
            );
            self.skipped += 1;
            return;
        }
        self.frame =
            Some(image::imageops::crop_imm(pixels, r.x, r.y, r.width, r.height).to_image());
        self.shown = Some(region.frame);
    }

    fn show_fallback(&mut self, width: u32, height: u32) {
        self.frame = Some(RgbaImage::new(width, height));
        self.shown = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/player/sink.rs"]
mod tests;
