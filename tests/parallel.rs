//! Parallel batch tests (`rayon` feature).

#![cfg(feature = "rayon")]

use std::path::Path;

use framegrab::{ErrorKind, ExtractOptions};

const SAMPLE_WEBM: &str = "tests/fixtures/sample_video.webm";

#[test]
fn results_follow_input_order() {
    let buffers: Vec<Vec<u8>> = vec![Vec::new(), b"definitely not video".repeat(8), Vec::new()];
    let results = framegrab::get_dimensions_parallel(&buffers);
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(Result::is_err));
    assert_eq!(results[0].as_ref().unwrap_err().kind(), ErrorKind::Open);
    assert_eq!(results[2].as_ref().unwrap_err().kind(), ErrorKind::Open);
}

#[test]
fn invalid_options_fail_every_buffer() {
    let buffers = vec![vec![0u8; 16], vec![1u8; 16]];
    let options = ExtractOptions::new().with_frame_count(0);
    let results = framegrab::extract_thumbnails_parallel_with_options(&buffers, &options);
    assert!(
        results
            .iter()
            .all(|result| matches!(result, Err(error) if error.kind() == ErrorKind::InvalidOptions))
    );
}

#[test]
fn mixed_batch_isolates_failures() {
    if !Path::new(SAMPLE_WEBM).exists() {
        return;
    }
    let good = std::fs::read(SAMPLE_WEBM).unwrap();
    let buffers = vec![good.clone(), Vec::new(), good];

    let results = framegrab::extract_thumbnails_parallel(&buffers);
    assert_eq!(results.len(), 3);
    assert!(results[0].as_ref().unwrap().starts_with(&framegrab::JPEG_SIGNATURE));
    assert_eq!(results[1].as_ref().unwrap_err().kind(), ErrorKind::Open);
    assert!(results[2].is_ok());
}
