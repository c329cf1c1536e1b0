//! # framegrab
//!
//! Grab a JPEG thumbnail and the pixel dimensions from a video held in
//! memory.
//!
//! The caller hands over bytes: an upload body, a cache entry, an object
//! store blob. `framegrab` detects the container, picks the first video
//! stream, decodes a frame near the middle, and encodes it as a JPEG. The
//! caller never names a format or codec. Everything runs on FFmpeg through
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next).
//!
//! ## Quick Start
//!
//! ```no_run
//! let bytes = std::fs::read("upload.webm")?;
//!
//! let dimensions = framegrab::get_dimensions(&bytes)?;
//! println!("{}x{}", dimensions.width, dimensions.height);
//!
//! let jpeg = framegrab::extract_thumbnail(&bytes)?;
//! std::fs::write("upload.jpg", jpeg)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ### Sizing the thumbnail
//!
//! ```no_run
//! use framegrab::ExtractOptions;
//!
//! let bytes = std::fs::read("upload.mp4")?;
//! let options = ExtractOptions::new().with_max_dimension(320);
//! let image = framegrab::extract_thumbnail_with_options(&bytes, &options)?;
//! assert!(image.width() <= 320 && image.height() <= 320);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Input requirements
//!
//! Input is read strictly front to back and never rewound. Containers that
//! keep their index at the end (MP4 without `+faststart`) may fail to open.
//! Matroska, WebM, MPEG-TS and fast-start MP4 all work.
//!
//! ## Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `async` | `extract_thumbnail_async` / `get_dimensions_async` on Tokio's blocking pool |
//! | `rayon` | `extract_thumbnails_parallel` / `get_dimensions_parallel` for batches |
//! | `full` | Enables all of the above |
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod config;
pub mod container;
mod conversion;
pub mod decode;
pub mod encode;
pub mod error;
pub mod ffmpeg;
pub mod memory_io;
pub mod probe;
#[cfg(feature = "rayon")]
mod rayon;
pub mod scale;
pub mod selector;
#[cfg(feature = "async")]
mod tasks;
pub mod thumbnail;

use std::path::Path;

pub use config::{ExtractOptions, OutputSize};
pub use container::{MediaContainer, StreamDescriptor, StreamKind};
pub use decode::{DecodeEngine, DecodeState, DecodedFrame, SeekSchedule};
pub use encode::{EncodedImage, JPEG_SIGNATURE, OUTPUT_PIXEL_FORMAT, StillEncoder};
pub use error::{ErrorKind, FramegrabError};
pub use ffmpeg::{FfmpegLogLevel, get_ffmpeg_log_level, set_ffmpeg_log_level};
pub use memory_io::InputBuffer;
pub use probe::{Dimensions, MediaProbe};
#[cfg(feature = "rayon")]
pub use rayon::{
    extract_thumbnails_parallel, extract_thumbnails_parallel_with_options,
    get_dimensions_parallel,
};
pub use scale::{FrameScaler, fit_within};
pub use selector::{SelectedStream, first_video_stream, select_video_stream};
#[cfg(feature = "async")]
pub use tasks::{
    DimensionsFuture, ThumbnailFuture, extract_thumbnail_async,
    extract_thumbnail_with_options_async, get_dimensions_async,
};
pub use thumbnail::Thumbnailer;

/// Width and height of the first video stream in `buffer`.
///
/// Only the container header and stream-info scan are read; nothing is
/// decoded.
///
/// # Errors
///
/// - [`FramegrabError::Open`] if the buffer is empty or not a known
///   container.
/// - [`FramegrabError::StreamInfo`] if stream analysis fails.
/// - [`FramegrabError::NoVideoStream`] if there is no video stream or it
///   reports a zero dimension.
pub fn get_dimensions(buffer: &[u8]) -> Result<Dimensions, FramegrabError> {
    MediaProbe::dimensions(buffer)
}

/// A JPEG thumbnail of the first video stream in `buffer`.
///
/// The frame is taken from roughly the middle of the stream and encoded at
/// the source resolution.
///
/// # Errors
///
/// Any [`FramegrabError`]; see [`ErrorKind`] for the stages.
pub fn extract_thumbnail(buffer: &[u8]) -> Result<Vec<u8>, FramegrabError> {
    Thumbnailer::default()
        .extract(buffer)
        .map(EncodedImage::into_bytes)
}

/// [`extract_thumbnail`] with explicit [`ExtractOptions`].
///
/// # Errors
///
/// [`FramegrabError::InvalidOptions`] for out-of-range options, otherwise as
/// [`extract_thumbnail`].
pub fn extract_thumbnail_with_options(
    buffer: &[u8],
    options: &ExtractOptions,
) -> Result<EncodedImage, FramegrabError> {
    Thumbnailer::new(*options)?.extract(buffer)
}

/// Read the file at `path` into memory and probe its dimensions.
///
/// # Errors
///
/// [`FramegrabError::Io`] if the file cannot be read, otherwise as
/// [`get_dimensions`].
pub fn get_dimensions_from_path<P: AsRef<Path>>(path: P) -> Result<Dimensions, FramegrabError> {
    MediaProbe::dimensions_from_path(path)
}

/// Read the file at `path` into memory and extract a thumbnail.
///
/// # Errors
///
/// [`FramegrabError::Io`] if the file cannot be read, otherwise as
/// [`extract_thumbnail`].
pub fn extract_thumbnail_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<u8>, FramegrabError> {
    Thumbnailer::default()
        .extract_from_path(path)
        .map(EncodedImage::into_bytes)
}
