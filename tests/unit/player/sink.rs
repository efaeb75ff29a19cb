use super::*;

fn entry() -> AtlasEntry {
    AtlasEntry {
        src: "./1.png".to_string(),
        width: 8,
        height: 4,
    }
}

fn region<'a>(atlas: &'a AtlasEntry, pixels: Option<&'a RgbaImage>) -> AtlasRegion<'a> {
    AtlasRegion {
        atlas_index: 1,
        atlas,
        rect: SourceRect {
            x: 4,
            y: 2,
            width: 4,
            height: 2,
        },
        frame: FrameIndex(7),
        pixels,
    }
}

#[test]
fn css_sink_offsets_the_atlas_background() {
    let atlas = entry();
    let mut sink = CssSink::new("");
    sink.draw_region(&region(&atlas, None));

    assert_eq!(
        sink.style(),
        vec![
            ("background-image", "url(\"./1.png\")"),
            ("background-size", "8px 4px"),
            ("background-position", "-4px -2px"),
            ("width", "4px"),
            ("height", "2px"),
        ]
    );
    assert_eq!(sink.frame_attr(), Some("7"));
}

#[test]
fn css_sink_resolves_against_a_base_url() {
    let atlas = entry();
    let mut sink = CssSink::new("/media/clip.flipb/");
    sink.draw_region(&region(&atlas, None));
    assert!(
        sink.style_attr()
            .starts_with("background-image: url(\"/media/clip.flipb/1.png\");")
    );
}

#[test]
fn css_fallback_only_sizes_the_element() {
    let mut sink = CssSink::new("");
    sink.show_fallback(64, 36);
    assert_eq!(sink.style_attr(), "width: 64px; height: 36px;");
    assert_eq!(sink.frame_attr(), None);
}

#[test]
fn image_sink_crops_the_frame_rectangle() {
    let atlas = entry();
    let pixels = RgbaImage::from_fn(8, 4, |x, y| image::Rgba([x as u8, y as u8, 0, 255]));
    let mut sink = ImageSink::new();
    sink.draw_region(&region(&atlas, Some(&pixels)));

    let frame = sink.frame().unwrap();
    assert_eq!(frame.dimensions(), (4, 2));
    assert_eq!(frame.get_pixel(0, 0).0, [4, 2, 0, 255]);
    assert_eq!(frame.get_pixel(3, 1).0, [7, 3, 0, 255]);
    assert_eq!(sink.shown_frame(), Some(FrameIndex(7)));
}

#[test]
fn image_sink_skips_until_pixels_arrive() {
    let atlas = entry();
    let mut sink = ImageSink::new();
    sink.draw_region(&region(&atlas, None));
    assert!(sink.frame().is_none());
    assert_eq!(sink.skipped(), 1);

    let small = RgbaImage::new(4, 4);
    sink.draw_region(&region(&atlas, Some(&small)));
    assert!(sink.frame().is_none());
    assert_eq!(sink.skipped(), 2);
}

#[test]
fn recording_sink_keeps_call_order() {
    let atlas = entry();
    let mut sink = RecordingSink::new();
    sink.draw_region(&region(&atlas, None));
    sink.show_fallback(4, 2);
    assert_eq!(sink.drawn_frames(), vec![7]);
    assert_eq!(
        sink.last(),
        Some(&SinkEvent::Fallback {
            width: 4,
            height: 2
        })
    );
}
