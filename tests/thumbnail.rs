//! Thumbnail extraction integration tests.
//!
//! Tests require fixture files from `tests/fixtures/generate_fixtures.sh`.

use std::path::Path;

use framegrab::{ExtractOptions, JPEG_SIGNATURE, Thumbnailer};

const FIXTURES: [&str; 3] = [
    "tests/fixtures/sample_video.mp4",
    "tests/fixtures/sample_video.mkv",
    "tests/fixtures/sample_video.webm",
];
const TWO_VIDEO_STREAMS: &str = "tests/fixtures/two_video_streams.mkv";

fn load(path: &str) -> Option<Vec<u8>> {
    Path::new(path)
        .exists()
        .then(|| std::fs::read(path).expect("Failed to read fixture"))
}

#[test]
fn thumbnail_is_a_jpeg_at_source_size() {
    for path in FIXTURES {
        let Some(bytes) = load(path) else { return };
        let jpeg = framegrab::extract_thumbnail(&bytes).unwrap();
        assert!(jpeg.starts_with(&JPEG_SIGNATURE), "{path}");

        let decoded = image::load_from_memory(&jpeg).expect("JPEG should decode");
        assert_eq!((decoded.width(), decoded.height()), (320, 240), "{path}");
    }
}

#[test]
fn thumbnail_matches_probed_dimensions() {
    let Some(bytes) = load(FIXTURES[0]) else { return };
    let dimensions = framegrab::get_dimensions(&bytes).unwrap();
    let image = framegrab::extract_thumbnail_with_options(&bytes, &ExtractOptions::new()).unwrap();
    assert_eq!((image.width(), image.height()), (dimensions.width, dimensions.height));
    assert_eq!(image.decode_dimensions().unwrap(), (image.width(), image.height()));
}

#[test]
fn repeated_extraction_is_stable() {
    let Some(bytes) = load(FIXTURES[1]) else { return };
    let first = framegrab::extract_thumbnail(&bytes).unwrap();
    let second = framegrab::extract_thumbnail(&bytes).unwrap();
    assert_eq!(first.len(), second.len());
    assert!(!first.is_empty());
}

#[test]
fn max_dimension_scales_down() {
    let Some(bytes) = load(FIXTURES[0]) else { return };
    let options = ExtractOptions::new().with_max_dimension(160);
    let image = framegrab::extract_thumbnail_with_options(&bytes, &options).unwrap();
    assert_eq!((image.width(), image.height()), (160, 120));
    assert!(image.has_jpeg_signature());
    assert_eq!(image.to_image().unwrap().width(), 160);
}

#[test]
fn exact_size_ignores_aspect_ratio() {
    let Some(bytes) = load(FIXTURES[2]) else { return };
    let options = ExtractOptions::new().with_output_size(96, 96);
    let image = framegrab::extract_thumbnail_with_options(&bytes, &options).unwrap();
    assert_eq!(image.decode_dimensions().unwrap(), (96, 96));
}

#[test]
fn later_frame_counts_still_produce_an_image() {
    let Some(bytes) = load(FIXTURES[1]) else { return };
    for frame_count in [2, 3, 8] {
        let options = ExtractOptions::new().with_frame_count(frame_count);
        let image = framegrab::extract_thumbnail_with_options(&bytes, &options)
            .unwrap_or_else(|error| panic!("frame_count {frame_count}: {error}"));
        assert!(image.has_jpeg_signature());
    }
}

#[test]
fn first_video_stream_is_thumbnailed() {
    let Some(bytes) = load(TWO_VIDEO_STREAMS) else { return };
    let image = framegrab::extract_thumbnail_with_options(&bytes, &ExtractOptions::new()).unwrap();
    assert_eq!((image.width(), image.height()), (320, 240));
}

#[test]
fn save_writes_the_same_bytes() {
    let Some(bytes) = load(FIXTURES[0]) else { return };
    let image = Thumbnailer::default().extract(&bytes).unwrap();

    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output = directory.path().join("thumb.jpg");
    image.save(&output).unwrap();

    let written = std::fs::read(&output).unwrap();
    assert_eq!(written, image.as_bytes());
}

#[test]
fn path_adapter_matches_buffer_extraction() {
    let path = FIXTURES[2];
    let Some(bytes) = load(path) else { return };
    let from_path = framegrab::extract_thumbnail_from_path(path).unwrap();
    let from_bytes = framegrab::extract_thumbnail(&bytes).unwrap();
    assert_eq!(from_path.len(), from_bytes.len());
}
