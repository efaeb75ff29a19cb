use super::*;
use crate::foundation::core::FrameRate;
use crate::manifest::model::AtlasEntry;

fn manifest_250() -> Manifest {
    let atlas = |src: &str, rows: u32| AtlasEntry {
        src: src.to_string(),
        width: 640,
        height: 36 * rows,
    };
    Manifest {
        width: 64,
        height: 36,
        duration_ms: 8332.5,
        frame_rate: FrameRate::new(30, 1).unwrap(),
        frame_duration_ms: 33.33,
        total_frames: 250.0,
        atlases: vec![atlas("./0.png", 10), atlas("./1.png", 10), atlas("./2.png", 5)],
        frames_per_atlas: 100,
    }
}

fn loc(r: Resolution) -> FrameLocation {
    *r.location().expect("frame should resolve to an atlas")
}

#[test]
fn frames_walk_rows_left_to_right() {
    let m = manifest_250();

    let first = loc(resolve(&m, 0));
    assert_eq!(first.atlas_index, 0);
    assert_eq!((first.rect.x, first.rect.y), (0, 0));
    assert_eq!((first.rect.width, first.rect.height), (64, 36));

    let f = loc(resolve(&m, 13));
    assert_eq!(f.atlas_index, 0);
    assert_eq!((f.rect.x, f.rect.y), (3 * 64, 36));

    let f = loc(resolve(&m, 199));
    assert_eq!(f.atlas_index, 1);
    assert_eq!((f.rect.x, f.rect.y), (9 * 64, 9 * 36));

    let f = loc(resolve(&m, 245));
    assert_eq!(f.atlas_index, 2);
    assert_eq!(f.frame, FrameIndex(245));
    assert_eq!((f.rect.x, f.rect.y), (5 * 64, 4 * 36));
}

#[test]
fn resolve_is_idempotent() {
    let m = manifest_250();
    for f in [-3, 0, 57, 100, 249, 400] {
        let once = loc(resolve(&m, f));
        let twice = loc(resolve(&m, once.frame.0 as i64));
        assert_eq!(once, twice, "frame {f}");
    }
}

#[test]
fn out_of_range_requests_clamp_to_the_ends() {
    let m = manifest_250();
    assert_eq!(resolve(&m, -5), resolve(&m, 0));
    assert_eq!(resolve(&m, 250 + 100), resolve(&m, 249));
    assert_eq!(loc(resolve(&m, i64::MAX)).frame, FrameIndex(249));
    assert_eq!(clamp_frame(&m, i64::MIN), 0);
}

#[test]
fn fractional_total_keeps_the_partial_last_frame() {
    let mut m = manifest_250();
    m.total_frames = 249.4;
    assert_eq!(loc(resolve(&m, 1000)).frame, FrameIndex(249));
}

#[test]
fn missing_atlas_resets_to_frame_zero() {
    let mut m = manifest_250();
    m.atlases.truncate(1);
    let f = loc(resolve(&m, 150));
    assert_eq!(f.frame, FrameIndex(0));
    assert_eq!(f.atlas_index, 0);
    assert_eq!((f.rect.x, f.rect.y), (0, 0));
}

#[test]
fn empty_atlas_list_only_reports_the_frame_size() {
    let mut m = manifest_250();
    m.atlases.clear();
    assert_eq!(
        resolve(&m, 10),
        Resolution::NoAtlas {
            width: 64,
            height: 36
        }
    );
    assert!(resolve(&m, 10).location().is_none());
}

#[test]
fn unvalidated_layouts_never_escape_the_atlas() {
    let mut m = manifest_250();
    m.frames_per_atlas = 200;
    assert_eq!(
        resolve(&m, 150),
        Resolution::NoAtlas {
            width: 64,
            height: 36
        }
    );

    let m = Manifest {
        width: 4,
        height: 2,
        total_frames: 1e30,
        atlases: vec![AtlasEntry {
            src: "./0.png".to_string(),
            width: 4,
            height: 2,
        }],
        frames_per_atlas: u64::MAX,
        ..manifest_250()
    };
    assert_eq!(
        resolve(&m, i64::MAX),
        Resolution::NoAtlas {
            width: 4,
            height: 2
        }
    );
}
