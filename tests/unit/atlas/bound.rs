use super::*;

fn size(width: u32, height: u32) -> FrameSize {
    FrameSize::new(width, height).unwrap()
}

#[test]
fn full_hd_starts_from_the_side_ratio_and_shrinks_columns_only() {
    let frame = size(1920, 1080);
    assert_eq!(MAX_ATLAS_SIDE_PX / 1920, 12);
    assert_eq!(MAX_ATLAS_SIDE_PX / 1080, 21);
    // The initial 12x21 grid is over the limit, so columns shrink while rows stay put.
    assert!(combined_size(frame, 12, 21) > INT_MAX);

    let bound = compute_max_tile_bound(frame).unwrap();
    assert!(bound.fits(frame));
    assert_eq!(bound, TileBound { cols: 6, rows: 21 });
    assert!(!TileBound { cols: 7, rows: 21 }.fits(frame));
}

#[test]
fn small_frames_keep_their_initial_grid_when_it_fits() {
    let frame = size(10000, 10000);
    // 2x2 is over the limit; columns go to 1 first, then rows are kept at 2.
    assert_eq!(
        compute_max_tile_bound(frame).unwrap(),
        TileBound { cols: 1, rows: 2 }
    );
}

#[test]
fn returned_bounds_satisfy_the_area_invariant() {
    for (w, h) in [
        (1, 1),
        (64, 64),
        (320, 240),
        (640, 360),
        (1280, 720),
        (1920, 1080),
        (3840, 2160),
        (100, 7000),
        (7000, 100),
    ] {
        let frame = size(w, h);
        let bound = compute_max_tile_bound(frame).unwrap();
        assert!(bound.cols >= 1 && bound.rows >= 1, "{w}x{h}");
        assert!(bound.fits(frame), "{w}x{h} -> {bound:?}");
        assert!(bound.cols <= MAX_ATLAS_SIDE_PX / w, "{w}x{h}");
        assert!(bound.rows <= MAX_ATLAS_SIDE_PX / h, "{w}x{h}");

        // One fewer column (or row, once columns are exhausted) still fits.
        let smaller = if bound.cols > 1 {
            TileBound {
                cols: bound.cols - 1,
                rows: bound.rows,
            }
        } else {
            TileBound {
                cols: 1,
                rows: bound.rows.saturating_sub(1).max(1),
            }
        };
        assert!(smaller.fits(frame), "{w}x{h}");
    }
}

#[test]
fn rows_only_shrink_after_columns_reach_one() {
    let frame = size(3840, 2160);
    let bound = compute_max_tile_bound(frame).unwrap();
    assert_eq!(bound, TileBound { cols: 3, rows: 10 });
    assert_eq!(bound.rows, MAX_ATLAS_SIDE_PX / 2160);
}

#[test]
fn frames_wider_or_taller_than_the_ceiling_are_too_large() {
    assert!(matches!(
        compute_max_tile_bound(size(23151, 10)),
        Err(FlipbookError::TooLarge {
            width: 23151,
            height: 10
        })
    ));
    assert!(matches!(
        compute_max_tile_bound(size(10, 23151)),
        Err(FlipbookError::TooLarge { .. })
    ));
}

#[test]
fn a_single_frame_over_the_area_limit_is_too_large() {
    // 1x1 grid is allowed by the side ceiling but not by the combined size.
    let frame = size(23150, 23150);
    assert!(!TileBound { cols: 1, rows: 1 }.fits(frame));
    assert!(matches!(
        compute_max_tile_bound(frame),
        Err(FlipbookError::TooLarge { .. })
    ));
}

#[test]
fn capacity_is_cols_times_rows() {
    assert_eq!(TileBound { cols: 6, rows: 21 }.capacity(), 126);
}
