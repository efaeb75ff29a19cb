use super::*;
use crate::foundation::core::FrameRate;
use crate::manifest::model::AtlasEntry;

fn scratch(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_assets").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_png(path: &Path, color: [u8; 4]) {
    RgbaImage::from_pixel(8, 4, image::Rgba(color))
        .save_with_format(path, image::ImageFormat::Png)
        .unwrap();
}

fn manifest(srcs: &[&str]) -> Manifest {
    Manifest {
        width: 4,
        height: 2,
        duration_ms: 400.0,
        frame_rate: FrameRate::new(25, 1).unwrap(),
        frame_duration_ms: 40.0,
        total_frames: 10.0,
        atlases: srcs
            .iter()
            .map(|s| AtlasEntry {
                src: s.to_string(),
                width: 8,
                height: 4,
            })
            .collect(),
        frames_per_atlas: 4,
    }
}

#[test]
fn bulk_load_reports_failures_without_dropping_good_atlases() {
    let dir = scratch("partial");
    write_png(&dir.join("0.png"), [255, 0, 0, 255]);
    write_png(&dir.join("2.png"), [0, 0, 255, 255]);
    std::fs::write(dir.join("1.png"), b"not a png").unwrap();
    let m = manifest(&["./0.png", "./1.png", "./2.png", "./3.png"]);

    let loaded = load_atlas_images(&m, &dir);

    assert_eq!(loaded.images.len(), 4);
    assert!(loaded.images[0].is_some());
    assert!(loaded.images[1].is_none());
    assert!(loaded.images[2].is_some());
    assert!(loaded.images[3].is_none());
    assert_eq!(loaded.report.loaded, 2);
    let failed: Vec<usize> = loaded.report.failures.iter().map(|f| f.index).collect();
    assert_eq!(failed, vec![1, 3]);
    assert_eq!(loaded.report.failures[1].src, "./3.png");
    assert!(loaded.report.describe_failures().contains("atlas 3 (./3.png)"));
}

#[test]
fn background_load_applies_once_settled() {
    let dir = scratch("spawn");
    write_png(&dir.join("0.png"), [0, 255, 0, 255]);
    let m = manifest(&["./0.png"]);

    let mut cache = AtlasImages::new();
    cache.spawn(&m, &dir).unwrap();
    assert!(cache.image(0).is_none());
    assert_eq!(cache.wait(), PollStatus::Applied);

    assert!(cache.is_settled());
    assert!(cache.report().unwrap().is_complete());
    assert_eq!(cache.image(0).unwrap().get_pixel(0, 0).0, [0, 255, 0, 255]);
    assert_eq!(cache.poll(), PollStatus::Idle);
}

#[test]
fn superseded_load_never_applies() {
    let dir = scratch("stale");
    write_png(&dir.join("red.png"), [255, 0, 0, 255]);
    write_png(&dir.join("blue.png"), [0, 0, 255, 255]);

    let mut cache = AtlasImages::new();
    let first = cache.spawn(&manifest(&["./red.png"]), &dir).unwrap();
    let second = cache.spawn(&manifest(&["./blue.png"]), &dir).unwrap();
    assert_ne!(first, second);

    assert_eq!(cache.wait(), PollStatus::Applied);
    assert_eq!(cache.image(0).unwrap().get_pixel(0, 0).0, [0, 0, 255, 255]);

    // Let the first loader finish too; its result must be ignored.
    std::thread::sleep(Duration::from_millis(100));
    assert_eq!(cache.poll(), PollStatus::Idle);
    assert_eq!(cache.image(0).unwrap().get_pixel(0, 0).0, [0, 0, 255, 255]);
}

#[test]
fn reset_abandons_the_outstanding_load() {
    let dir = scratch("reset");
    write_png(&dir.join("0.png"), [1, 2, 3, 255]);

    let mut cache = AtlasImages::new();
    cache.spawn(&manifest(&["./0.png"]), &dir).unwrap();
    cache.reset();

    assert_eq!(cache.wait(), PollStatus::Idle);
    std::thread::sleep(Duration::from_millis(100));
    assert_eq!(cache.poll(), PollStatus::Idle);
    assert!(!cache.is_settled());
    assert!(cache.image(0).is_none());
}
