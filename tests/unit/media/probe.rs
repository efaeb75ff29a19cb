use super::*;

#[test]
fn parses_first_video_stream() {
    let json = br#"{
        "streams": [
            { "codec_type": "audio", "duration": "9.9" },
            {
                "codec_type": "video",
                "width": 1920,
                "height": 1080,
                "r_frame_rate": "30000/1001",
                "duration": "10.010000"
            }
        ],
        "format": { "duration": "10.050000" }
    }"#;
    let probe = parse_ffprobe_json(json).unwrap();
    assert_eq!(probe.width, 1920);
    assert_eq!(probe.height, 1080);
    assert_eq!(probe.frame_rate, FrameRate::new(30000, 1001).unwrap());
    assert!((probe.duration_ms - 10_010.0).abs() < 1e-6);
    assert_eq!(
        probe.frame_size(),
        FrameSize {
            width: 1920,
            height: 1080
        }
    );
}

#[test]
fn falls_back_to_container_duration() {
    let json = br#"{
        "streams": [
            { "codec_type": "video", "width": 64, "height": 64, "r_frame_rate": "25/1" }
        ],
        "format": { "duration": "2.000000" }
    }"#;
    let probe = parse_ffprobe_json(json).unwrap();
    assert_eq!(probe.duration_ms, 2000.0);
}

#[test]
fn missing_pieces_are_probe_errors() {
    let cases: [&[u8]; 6] = [
        br#"{ "streams": [] }"#,
        br#"{ "streams": [ { "codec_type": "audio" } ] }"#,
        br#"{ "streams": [ { "codec_type": "video", "height": 4, "r_frame_rate": "25/1", "duration": "1" } ] }"#,
        br#"{ "streams": [ { "codec_type": "video", "width": 4, "height": 4, "r_frame_rate": "0/0", "duration": "1" } ] }"#,
        br#"{ "streams": [ { "codec_type": "video", "width": 4, "height": 4, "r_frame_rate": "25/1" } ] }"#,
        b"not json",
    ];
    for json in cases {
        let err = parse_ffprobe_json(json).unwrap_err();
        assert!(
            matches!(err, FlipbookError::Probe(_)),
            "{}: {err}",
            String::from_utf8_lossy(json)
        );
    }
}

#[test]
fn non_positive_duration_is_rejected() {
    let json = br#"{
        "streams": [
            { "codec_type": "video", "width": 4, "height": 4, "r_frame_rate": "25/1", "duration": "0.0" }
        ]
    }"#;
    assert!(parse_ffprobe_json(json).is_err());
}
