use super::*;

#[test]
fn frame_rate_rejects_zero_parts() {
    assert!(FrameRate::new(0, 1).is_err());
    assert!(FrameRate::new(30, 0).is_err());
    assert!(FrameRate::new(30000, 1001).is_ok());
}

#[test]
fn frame_rate_parses_ffprobe_ratio_and_prints_it_back() {
    let r: FrameRate = "30000/1001".parse().unwrap();
    assert_eq!(r, FrameRate { num: 30000, den: 1001 });
    assert_eq!(r.to_string(), "30000/1001");

    let bare: FrameRate = "25".parse().unwrap();
    assert_eq!(bare, FrameRate { num: 25, den: 1 });

    assert!("0/0".parse::<FrameRate>().is_err());
    assert!("abc/1".parse::<FrameRate>().is_err());
    assert!("".parse::<FrameRate>().is_err());
}

#[test]
fn frame_duration_is_not_rounded() {
    let r = FrameRate::new(30000, 1001).unwrap();
    assert!((r.frame_duration_ms() - 33.366_666_666).abs() < 1e-6);

    let r = FrameRate::new(25, 1).unwrap();
    assert_eq!(r.frame_duration_ms(), 40.0);
    assert_eq!(r.as_f64(), 25.0);
}

#[test]
fn frame_size_must_be_non_empty() {
    assert!(FrameSize::new(0, 10).is_err());
    assert!(FrameSize::new(10, 0).is_err());
    assert_eq!(
        FrameSize::new(64, 32).unwrap(),
        FrameSize {
            width: 64,
            height: 32
        }
    );
}
