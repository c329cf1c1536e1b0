//! Error handling integration tests.
//!
//! These tests verify that malformed, empty, truncated and audio-only input
//! fail with the right error kind and never panic.
//!
//! Some tests require fixture files from `tests/fixtures/generate_fixtures.sh`.

use std::path::Path;

use framegrab::{ErrorKind, ExtractOptions, FramegrabError};

const SAMPLE_MP4: &str = "tests/fixtures/sample_video.mp4";
const SAMPLE_MKV: &str = "tests/fixtures/sample_video.mkv";
const AUDIO_ONLY: &str = "tests/fixtures/sample_audio_only.m4a";

#[test]
fn empty_buffer_is_an_open_error() {
    let error = framegrab::get_dimensions(&[]).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Open);

    let error = framegrab::extract_thumbnail(&[]).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Open);
}

/// Header-level failures must surface as an open or stream-info error.
fn assert_header_failure(error: &FramegrabError, context: &str) {
    assert!(
        matches!(error.kind(), ErrorKind::Open | ErrorKind::StreamInfo),
        "{context}: unexpected error {error}",
    );
}

#[test]
fn garbage_is_rejected() {
    let garbage = b"this is not a media file, just some text".repeat(16);
    let error = framegrab::get_dimensions(&garbage).unwrap_err();
    assert_header_failure(&error, "get_dimensions");
    let error = framegrab::extract_thumbnail(&garbage).unwrap_err();
    assert_header_failure(&error, "extract_thumbnail");
}

#[test]
fn zero_filled_buffer_is_rejected() {
    let zeros = vec![0u8; 8192];
    let error = framegrab::get_dimensions(&zeros).unwrap_err();
    assert_header_failure(&error, "get_dimensions");
    let error = framegrab::extract_thumbnail(&zeros).unwrap_err();
    assert_header_failure(&error, "extract_thumbnail");
}

#[test]
fn invalid_options_fail_before_touching_input() {
    let options = ExtractOptions::new().with_frame_count(0);
    let error = framegrab::extract_thumbnail_with_options(b"anything", &options).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::InvalidOptions);
}

#[test]
fn missing_file_is_an_io_error() {
    let error = framegrab::get_dimensions_from_path("this_file_does_not_exist.mp4").unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Io);

    let error = framegrab::extract_thumbnail_from_path("this_file_does_not_exist.mp4").unwrap_err();
    assert!(matches!(error, FramegrabError::Io(_)));
}

#[test]
fn error_messages_name_the_stage() {
    let error = framegrab::get_dimensions(&[]).unwrap_err();
    assert!(
        error.to_string().contains("Failed to open media container"),
        "{error}"
    );

    let error = FramegrabError::NoFrameDecoded {
        requested: 3,
        decoded: 1,
    };
    assert_eq!(error.kind(), ErrorKind::NoFrameDecoded);
    assert!(error.to_string().contains("1 of 3"), "{error}");
}

#[test]
fn truncated_prefix_is_rejected() {
    for path in [SAMPLE_MP4, SAMPLE_MKV] {
        if !Path::new(path).exists() {
            continue;
        }
        let bytes = std::fs::read(path).unwrap();
        let prefix = &bytes[..64];

        let error = framegrab::get_dimensions(prefix).unwrap_err();
        assert_header_failure(&error, path);
        let error = framegrab::extract_thumbnail(prefix).unwrap_err();
        assert_header_failure(&error, path);
    }
}

#[test]
fn corrupted_payload_does_not_panic() {
    if !Path::new(SAMPLE_MKV).exists() {
        return;
    }
    let mut bytes = std::fs::read(SAMPLE_MKV).unwrap();
    // Keep the header, scramble everything after it.
    for (index, byte) in bytes.iter_mut().enumerate().skip(4096) {
        *byte = (index as u8).wrapping_mul(31) ^ 0x5A;
    }
    // Either outcome is acceptable as long as it is an orderly one.
    match framegrab::extract_thumbnail(&bytes) {
        Ok(jpeg) => assert!(jpeg.starts_with(&framegrab::JPEG_SIGNATURE)),
        Err(error) => assert!(!error.to_string().is_empty()),
    }
}

#[test]
fn audio_only_input_has_no_video_stream() {
    if !Path::new(AUDIO_ONLY).exists() {
        return;
    }
    let bytes = std::fs::read(AUDIO_ONLY).unwrap();

    let error = framegrab::get_dimensions(&bytes).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::NoVideoStream);

    let error = framegrab::extract_thumbnail(&bytes).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::NoVideoStream);
}

#[test]
fn counting_past_the_end_reports_frames_decoded() {
    if !Path::new(SAMPLE_MKV).exists() {
        return;
    }
    let bytes = std::fs::read(SAMPLE_MKV).unwrap();
    let options = ExtractOptions::new().with_frame_count(10_000);

    match framegrab::extract_thumbnail_with_options(&bytes, &options) {
        Err(FramegrabError::NoFrameDecoded { requested, decoded }) => {
            assert_eq!(requested, 10_000);
            assert!(decoded > 0 && decoded < requested, "decoded {decoded}");
        }
        other => panic!("expected NoFrameDecoded, got {other:?}"),
    }
}
