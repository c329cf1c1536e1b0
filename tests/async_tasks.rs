//! Async wrapper tests (`async` feature).

#![cfg(feature = "async")]

use std::{path::Path, time::Duration};

use framegrab::{ErrorKind, ExtractOptions};

const SAMPLE_MKV: &str = "tests/fixtures/sample_video.mkv";

#[tokio::test]
async fn empty_input_fails_asynchronously() {
    let error = framegrab::get_dimensions_async(Vec::new()).await.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Open);

    let error = framegrab::extract_thumbnail_async(Vec::new()).await.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Open);
}

#[tokio::test]
async fn invalid_options_surface_through_the_future() {
    let options = ExtractOptions::new().with_max_dimension(0);
    let error = framegrab::extract_thumbnail_with_options_async(vec![1, 2, 3], options)
        .await
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::InvalidOptions);
}

#[tokio::test]
async fn thumbnail_within_timeout() {
    if !Path::new(SAMPLE_MKV).exists() {
        return;
    }
    let bytes = std::fs::read(SAMPLE_MKV).unwrap();

    let dimensions = framegrab::get_dimensions_async(bytes.clone()).await.unwrap();
    assert_eq!((dimensions.width, dimensions.height), (320, 240));

    let jpeg = tokio::time::timeout(
        Duration::from_secs(30),
        framegrab::extract_thumbnail_async(bytes),
    )
    .await
    .expect("extraction should finish well within the timeout")
    .unwrap();
    assert!(jpeg.starts_with(&framegrab::JPEG_SIGNATURE));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_calls_are_independent() {
    if !Path::new(SAMPLE_MKV).exists() {
        return;
    }
    let bytes = std::fs::read(SAMPLE_MKV).unwrap();

    let first = framegrab::extract_thumbnail_async(bytes.clone());
    let second = framegrab::extract_thumbnail_async(bytes);
    let (first, second) = tokio::join!(first, second);
    assert_eq!(first.unwrap().len(), second.unwrap().len());
}
