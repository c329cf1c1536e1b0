//! Container probing over an in-memory buffer.
//!
//! [`MediaContainer`] binds an in-memory I/O context to a fresh FFmpeg format
//! context, lets FFmpeg detect the container, runs the stream-info scan, and
//! snapshots every stream as a [`StreamDescriptor`].

use std::{
    ffi::c_int,
    fmt::{Debug, Formatter, Result as FmtResult},
    ptr,
};

use ffmpeg_next::{
    Error as FfmpegError, Rational, codec::Id, format::context::Input, format::stream::Stream,
    media::Type,
};

use crate::{conversion, error::FramegrabError, memory_io::MemoryIo};

/// Coarse media type of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    /// A video stream.
    Video,
    /// An audio stream.
    Audio,
    /// Subtitles, data, attachments, or anything FFmpeg could not classify.
    Other,
}

impl From<Type> for StreamKind {
    fn from(medium: Type) -> Self {
        match medium {
            Type::Video => StreamKind::Video,
            Type::Audio => StreamKind::Audio,
            _ => StreamKind::Other,
        }
    }
}

/// Codec parameters of one elementary stream, read without decoding.
///
/// `width` and `height` are only meaningful when `kind` is
/// [`StreamKind::Video`]; other streams report zero.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamDescriptor {
    /// Position of the stream in the container (packet stream index).
    pub index: usize,
    /// Media type of the stream.
    pub kind: StreamKind,
    /// Codec identifier from the codec parameters.
    pub codec: Id,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Declared duration in `time_base` units, if the container states one.
    pub duration: Option<i64>,
    /// Timestamp of the first packet in `time_base` units, if known.
    pub start_time: Option<i64>,
    /// Unit of the stream's timestamps.
    pub time_base: Rational,
}

impl StreamDescriptor {
    fn from_stream(stream: &Stream<'_>) -> Self {
        let parameters = stream.parameters();
        // SAFETY: the parameters belong to a stream of an open format
        // context that outlives this call.
        let (width, height) = unsafe {
            let raw = *parameters.as_ptr();
            (raw.width.max(0) as u32, raw.height.max(0) as u32)
        };

        Self {
            index: stream.index(),
            kind: StreamKind::from(parameters.medium()),
            codec: parameters.id(),
            width,
            height,
            duration: conversion::known_timestamp(stream.duration()).filter(|value| *value > 0),
            start_time: conversion::known_timestamp(stream.start_time()),
            time_base: stream.time_base(),
        }
    }

    /// Whether this stream carries video.
    pub fn is_video(&self) -> bool {
        self.kind == StreamKind::Video
    }
}

/// An opened container reading from caller-owned bytes.
///
/// The lifetime ties the container to the buffer it reads from. Created per
/// call and closed on drop; it is never shared or reused.
///
/// # Example
///
/// ```no_run
/// use framegrab::MediaContainer;
///
/// let bytes = std::fs::read("input.webm")?;
/// let container = MediaContainer::open(&bytes)?;
/// for stream in container.streams() {
///     println!("#{} {:?} {:?} {}x{}", stream.index, stream.kind, stream.codec, stream.width, stream.height);
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct MediaContainer<'a> {
    // Field order is drop order: the demuxer must close before its I/O
    // context is freed.
    input: Input,
    io: MemoryIo<'a>,
    streams: Vec<StreamDescriptor>,
}

impl Debug for MediaContainer<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("MediaContainer")
            .field("format", &self.format_name())
            .field("streams", &self.streams)
            .field("bytes_consumed", &self.bytes_consumed())
            .finish_non_exhaustive()
    }
}

impl<'a> MediaContainer<'a> {
    /// Detect the container in `bytes` and scan its streams.
    ///
    /// Initialises FFmpeg (idempotent). Consumes a format-dependent prefix of
    /// the buffer; the amount is not under the caller's control.
    ///
    /// # Errors
    ///
    /// - [`FramegrabError::Open`] if the buffer is empty or no container
    ///   format matches it.
    /// - [`FramegrabError::StreamInfo`] if the stream-info scan fails or
    ///   finds no streams at all.
    /// - [`FramegrabError::Allocation`] if a native allocation fails.
    pub fn open(bytes: &'a [u8]) -> Result<Self, FramegrabError> {
        ffmpeg_next::init().map_err(|error| {
            FramegrabError::Open(format!("FFmpeg initialisation failed: {error}"))
        })?;

        if bytes.is_empty() {
            return Err(FramegrabError::Open("input buffer is empty".to_string()));
        }

        log::debug!("Opening in-memory container ({} bytes)", bytes.len());

        let mut io = MemoryIo::new(bytes)?;

        // SAFETY: the format context is allocated here and either handed to
        // `Input::wrap`, which owns it from then on, or freed by
        // avformat_open_input on failure. It never takes ownership of `io`
        // because the custom-I/O flag is set.
        let input = unsafe {
            let mut context = ffmpeg_sys_next::avformat_alloc_context();
            if context.is_null() {
                return Err(FramegrabError::Allocation("format context".to_string()));
            }
            (*context).pb = io.as_mut_ptr();
            (*context).flags |= ffmpeg_sys_next::AVFMT_FLAG_CUSTOM_IO as c_int;

            let result = ffmpeg_sys_next::avformat_open_input(
                &mut context,
                ptr::null(),
                ptr::null(),
                ptr::null_mut(),
            );
            if result < 0 {
                return Err(FramegrabError::Open(FfmpegError::from(result).to_string()));
            }
            Input::wrap(context)
        };

        let mut container = Self {
            input,
            io,
            streams: Vec::new(),
        };

        // SAFETY: the context is open and exclusively owned by `container`.
        let result = unsafe {
            ffmpeg_sys_next::avformat_find_stream_info(container.input.as_mut_ptr(), ptr::null_mut())
        };
        if result < 0 {
            return Err(FramegrabError::StreamInfo(FfmpegError::from(result).to_string()));
        }

        container.streams = container
            .input
            .streams()
            .map(|stream| StreamDescriptor::from_stream(&stream))
            .collect();

        // A header cut short can parse cleanly yet declare nothing.
        if container.streams.is_empty() {
            return Err(FramegrabError::StreamInfo(format!(
                "{} container declares no streams",
                container.format_name()
            )));
        }

        log::debug!(
            "Detected container format={} streams={} (read {} of {} bytes)",
            container.format_name(),
            container.streams.len(),
            container.bytes_consumed(),
            bytes.len(),
        );

        Ok(container)
    }

    /// Stream descriptors in container-declared order.
    pub fn streams(&self) -> &[StreamDescriptor] {
        &self.streams
    }

    /// Short name of the detected container format (e.g. `"matroska,webm"`).
    pub fn format_name(&self) -> String {
        self.input.format().name().to_string()
    }

    /// Container-level duration in microseconds, if known.
    pub fn duration(&self) -> Option<i64> {
        conversion::known_timestamp(self.input.duration()).filter(|value| *value > 0)
    }

    /// Bytes pulled from the input buffer so far.
    pub fn bytes_consumed(&self) -> usize {
        self.io.position()
    }

    /// Demuxer access for the decode engine.
    pub(crate) fn input_mut(&mut self) -> &mut Input {
        &mut self.input
    }
}
