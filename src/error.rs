//! Error types for the `framegrab` crate.
//!
//! [`FramegrabError`] is the single error type returned by every fallible
//! operation. Each variant names the pipeline stage that failed, and the
//! message carries FFmpeg's own description where one exists. Use
//! [`FramegrabError::kind`] to branch on the stage without matching on
//! message text.

use std::io::Error as IoError;

use image::ImageError;
use thiserror::Error;

/// The unified error type for all `framegrab` operations.
///
/// No operation retries internally and none returns a partial result: a call
/// either produces a complete image or dimension pair, or fails with one of
/// these variants after releasing every native resource it had acquired.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FramegrabError {
    /// No known container format matches the input bytes.
    #[error("Failed to open media container: {0}")]
    Open(String),

    /// The container opened but its streams could not be analysed.
    #[error("Failed to read stream information: {0}")]
    StreamInfo(String),

    /// The input has no usable video stream.
    #[error("No usable video stream: {0}")]
    NoVideoStream(String),

    /// No decoder is registered for the video stream's codec.
    #[error("No decoder available for codec {0}")]
    UnsupportedCodec(String),

    /// The decoder could not be configured or started.
    #[error("Failed to initialise video decoder: {0}")]
    DecoderInit(String),

    /// The decoder rejected a packet, or a packet could not be read.
    #[error("Failed to decode video: {0}")]
    Decode(String),

    /// The stream ended before enough frames were decoded.
    #[error("Stream ended after decoding {decoded} of {requested} frame(s)")]
    NoFrameDecoded {
        /// Frames the decode engine was asked to count down.
        requested: u32,
        /// Frames that actually came out of the decoder.
        decoded: u32,
    },

    /// The still-image encoder could not be found, configured, or opened.
    #[error("Failed to initialise JPEG encoder: {0}")]
    EncoderInit(String),

    /// The encoder refused the decoded frame.
    #[error("Failed to submit frame to JPEG encoder: {0}")]
    EncodeSubmit(String),

    /// The encoder did not hand back a compressed image.
    #[error("Failed to retrieve encoded JPEG: {0}")]
    EncodeRetrieve(String),

    /// A native FFmpeg allocation failed.
    #[error("Failed to allocate {0}")]
    Allocation(String),

    /// The software scaler could not be created or failed to convert a frame.
    #[error("Frame scaling error: {0}")]
    Scale(String),

    /// An [`ExtractOptions`](crate::ExtractOptions) value is out of range.
    #[error("Invalid extraction options: {0}")]
    InvalidOptions(String),

    /// An I/O error occurred while reading input from or writing output to disk.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// An error from the `image` crate while inspecting an encoded image.
    #[error("Image processing error: {0}")]
    Image(#[from] ImageError),

    /// The blocking task running an async extraction panicked or was cancelled.
    #[cfg(feature = "async")]
    #[error("Background extraction task failed: {0}")]
    TaskFailed(String),
}

/// The failure class of a [`FramegrabError`], without its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// See [`FramegrabError::Open`].
    Open,
    /// See [`FramegrabError::StreamInfo`].
    StreamInfo,
    /// See [`FramegrabError::NoVideoStream`].
    NoVideoStream,
    /// See [`FramegrabError::UnsupportedCodec`].
    UnsupportedCodec,
    /// See [`FramegrabError::DecoderInit`].
    DecoderInit,
    /// See [`FramegrabError::Decode`].
    Decode,
    /// See [`FramegrabError::NoFrameDecoded`].
    NoFrameDecoded,
    /// See [`FramegrabError::EncoderInit`].
    EncoderInit,
    /// See [`FramegrabError::EncodeSubmit`].
    EncodeSubmit,
    /// See [`FramegrabError::EncodeRetrieve`].
    EncodeRetrieve,
    /// See [`FramegrabError::Allocation`].
    Allocation,
    /// See [`FramegrabError::Scale`].
    Scale,
    /// See [`FramegrabError::InvalidOptions`].
    InvalidOptions,
    /// See [`FramegrabError::Io`].
    Io,
    /// See [`FramegrabError::Image`].
    Image,
    /// The async task wrapper failed (only produced with the `async` feature).
    TaskFailed,
}

impl FramegrabError {
    /// The failure class of this error.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use framegrab::ErrorKind;
    ///
    /// let error = framegrab::get_dimensions(b"not a video").unwrap_err();
    /// if error.kind() == ErrorKind::Open {
    ///     eprintln!("unrecognised container: {error}");
    /// }
    /// ```
    pub fn kind(&self) -> ErrorKind {
        match self {
            FramegrabError::Open(_) => ErrorKind::Open,
            FramegrabError::StreamInfo(_) => ErrorKind::StreamInfo,
            FramegrabError::NoVideoStream(_) => ErrorKind::NoVideoStream,
            FramegrabError::UnsupportedCodec(_) => ErrorKind::UnsupportedCodec,
            FramegrabError::DecoderInit(_) => ErrorKind::DecoderInit,
            FramegrabError::Decode(_) => ErrorKind::Decode,
            FramegrabError::NoFrameDecoded { .. } => ErrorKind::NoFrameDecoded,
            FramegrabError::EncoderInit(_) => ErrorKind::EncoderInit,
            FramegrabError::EncodeSubmit(_) => ErrorKind::EncodeSubmit,
            FramegrabError::EncodeRetrieve(_) => ErrorKind::EncodeRetrieve,
            FramegrabError::Allocation(_) => ErrorKind::Allocation,
            FramegrabError::Scale(_) => ErrorKind::Scale,
            FramegrabError::InvalidOptions(_) => ErrorKind::InvalidOptions,
            FramegrabError::Io(_) => ErrorKind::Io,
            FramegrabError::Image(_) => ErrorKind::Image,
            #[cfg(feature = "async")]
            FramegrabError::TaskFailed(_) => ErrorKind::TaskFailed,
        }
    }
}
