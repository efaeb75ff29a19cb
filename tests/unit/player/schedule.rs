use super::*;

const STEPS: [u64; 3] = [10, 40, 90];

#[test]
fn step_sentinels_map_to_the_ends() {
    assert_eq!(target_frame_for_step(&STEPS, -1, 249), 0);
    assert_eq!(target_frame_for_step(&STEPS, -20, 249), 0);
    assert_eq!(target_frame_for_step(&STEPS, 0, 249), 10);
    assert_eq!(target_frame_for_step(&STEPS, 2, 249), 90);
    assert_eq!(target_frame_for_step(&STEPS, 3, 249), 249);
    assert_eq!(target_frame_for_step(&STEPS, i64::MAX, 249), 249);
}

#[test]
fn step_frames_past_the_end_are_clamped() {
    assert_eq!(target_frame_for_step(&[10, 500], 1, 249), 249);
}

#[test]
fn wraparound_only_between_opposite_out_of_range_sides() {
    assert!(is_wraparound_jump(-1, 3, STEPS.len()));
    assert!(is_wraparound_jump(7, -2, STEPS.len()));
    assert!(!is_wraparound_jump(-1, 0, STEPS.len()));
    assert!(!is_wraparound_jump(2, 3, STEPS.len()));
    assert!(!is_wraparound_jump(3, 4, STEPS.len()));
    assert!(!is_wraparound_jump(-1, -1, STEPS.len()));
}

#[test]
fn traversal_starts_at_the_previous_step_frame() {
    let t = Traversal::begin(&STEPS, 1, 1000.0, 40.0, 249);
    assert_eq!(t.begin_frame, 10);
    assert_eq!(t.target_frame, 40);

    let t = Traversal::begin(&STEPS, 0, 1000.0, 40.0, 249);
    assert_eq!(t.begin_frame, 0);
    assert_eq!(t.target_frame, 10);
}

#[test]
fn traversal_advances_one_frame_per_frame_duration() {
    let t = Traversal::begin(&STEPS, 1, 1000.0, 40.0, 249);
    assert_eq!(t.frame_at(900.0), 10);
    assert_eq!(t.frame_at(1000.0), 10);
    assert_eq!(t.frame_at(1039.9), 10);
    assert_eq!(t.frame_at(1040.0), 11);
    assert_eq!(t.frame_at(1000.0 + 40.0 * 29.0), 39);
    assert!(!t.is_complete(39));
    assert_eq!(t.frame_at(1000.0 + 40.0 * 30.0), 40);
    assert!(t.is_complete(40));
    assert_eq!(t.frame_at(1_000_000.0), 40);
}

#[test]
fn traversal_to_the_end_stops_on_the_last_frame() {
    let t = Traversal::begin(&STEPS, 3, 0.0, 10.0, 120);
    assert_eq!(t.begin_frame, 90);
    assert_eq!(t.frame_at(10_000.0), 120);
    assert!(t.is_complete(120));
}
