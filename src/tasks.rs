//! Async wrappers around the blocking pipeline.
//!
//! Decoding is CPU-bound FFmpeg work, so each call runs on
//! `tokio::task::spawn_blocking` and the returned future resolves when it
//! finishes. The futures own their input buffers, so they are `'static` and
//! can be wrapped in `tokio::time::timeout`. A timeout drops the future but
//! does not stop the blocking call already running.
//!
//! # Example
//!
//! ```no_run
//! # async fn example() -> Result<(), framegrab::FramegrabError> {
//! let bytes = std::fs::read("input.webm")?;
//! let dimensions = framegrab::get_dimensions_async(bytes.clone()).await?;
//! let jpeg = framegrab::extract_thumbnail_async(bytes).await?;
//! println!("{dimensions}: {} byte thumbnail", jpeg.len());
//! # Ok(())
//! # }
//! ```

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use tokio::task::{JoinError, JoinHandle};

use crate::{
    config::ExtractOptions, encode::EncodedImage, error::FramegrabError, probe::Dimensions,
    probe::MediaProbe, thumbnail::Thumbnailer,
};

/// Future returned by [`extract_thumbnail_async`].
pub struct ThumbnailFuture {
    handle: JoinHandle<Result<EncodedImage, FramegrabError>>,
}

impl Future for ThumbnailFuture {
    type Output = Result<Vec<u8>, FramegrabError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.handle)
            .poll(cx)
            .map(|joined| joined.unwrap_or_else(|error| Err(task_failed(error))))
            .map(|result| result.map(EncodedImage::into_bytes))
    }
}

/// Future returned by [`get_dimensions_async`].
pub struct DimensionsFuture {
    handle: JoinHandle<Result<Dimensions, FramegrabError>>,
}

impl Future for DimensionsFuture {
    type Output = Result<Dimensions, FramegrabError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.handle)
            .poll(cx)
            .map(|joined| joined.unwrap_or_else(|error| Err(task_failed(error))))
    }
}

fn task_failed(error: JoinError) -> FramegrabError {
    let reason = if error.is_panic() {
        "panicked"
    } else {
        "was cancelled"
    };
    FramegrabError::TaskFailed(format!("extraction task {reason}"))
}

/// Extract a thumbnail on the blocking pool.
///
/// Must be called from within a Tokio runtime.
pub fn extract_thumbnail_async(bytes: Vec<u8>) -> ThumbnailFuture {
    extract_thumbnail_with_options_async(bytes, ExtractOptions::default())
}

/// [`extract_thumbnail_async`] with explicit options.
///
/// Invalid options surface as the future's error.
pub fn extract_thumbnail_with_options_async(
    bytes: Vec<u8>,
    options: ExtractOptions,
) -> ThumbnailFuture {
    let handle = tokio::task::spawn_blocking(move || Thumbnailer::new(options)?.extract(&bytes));
    ThumbnailFuture { handle }
}

/// Probe dimensions on the blocking pool.
///
/// Must be called from within a Tokio runtime.
pub fn get_dimensions_async(bytes: Vec<u8>) -> DimensionsFuture {
    let handle = tokio::task::spawn_blocking(move || MediaProbe::dimensions(&bytes));
    DimensionsFuture { handle }
}
