//! Dimension probe integration tests.
//!
//! Tests require fixture files from `tests/fixtures/generate_fixtures.sh`.

use std::path::Path;

use framegrab::{Dimensions, MediaProbe};

const FIXTURES: [&str; 3] = [
    "tests/fixtures/sample_video.mp4",
    "tests/fixtures/sample_video.mkv",
    "tests/fixtures/sample_video.webm",
];
const TWO_VIDEO_STREAMS: &str = "tests/fixtures/two_video_streams.mkv";

#[test]
fn dimensions_of_every_container() {
    for path in FIXTURES {
        if !Path::new(path).exists() {
            return;
        }
        let bytes = std::fs::read(path).unwrap();
        let dimensions = framegrab::get_dimensions(&bytes).unwrap();
        assert_eq!(
            dimensions,
            Dimensions {
                width: 320,
                height: 240
            },
            "{path}"
        );
    }
}

#[test]
fn probing_is_repeatable() {
    let path = FIXTURES[1];
    if !Path::new(path).exists() {
        return;
    }
    let bytes = std::fs::read(path).unwrap();
    let first = framegrab::get_dimensions(&bytes).unwrap();
    let second = framegrab::get_dimensions(&bytes).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.to_string(), "320x240");
    assert!((first.aspect_ratio() - 4.0 / 3.0).abs() < 1e-9);
}

#[test]
fn first_video_stream_wins() {
    if !Path::new(TWO_VIDEO_STREAMS).exists() {
        return;
    }
    let bytes = std::fs::read(TWO_VIDEO_STREAMS).unwrap();
    let dimensions = framegrab::get_dimensions(&bytes).unwrap();
    assert_eq!((dimensions.width, dimensions.height), (320, 240));
}

#[test]
fn path_adapter_matches_buffer_probe() {
    let path = FIXTURES[0];
    if !Path::new(path).exists() {
        return;
    }
    let from_path = framegrab::get_dimensions_from_path(path).unwrap();
    let from_bytes = framegrab::get_dimensions(&std::fs::read(path).unwrap()).unwrap();
    assert_eq!(from_path, from_bytes);
}

#[test]
fn batch_probe_keeps_order_and_isolates_failures() {
    let path = FIXTURES[2];
    if !Path::new(path).exists() {
        return;
    }
    let good = std::fs::read(path).unwrap();
    let buffers: Vec<Vec<u8>> = vec![good.clone(), Vec::new(), good];
    let results = MediaProbe::dimensions_many(&buffers);
    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(results[1].is_err());
    assert!(results[2].is_ok());
}
