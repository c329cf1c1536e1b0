//! Decode engine: seek to a computed offset and count decoded frames.
//!
//! The byte source cannot rewind, so repositioning happens on packets
//! rather than through `av_seek_frame`. While seeking, the engine keeps the
//! selected stream's packets since the last keyframe. When a packet reaches
//! the target timestamp, that run is handed to the decoder, so decoding
//! always restarts from a keyframe at or before the target.

use std::{
    collections::VecDeque,
    fmt::{Debug, Formatter, Result as FmtResult},
    mem,
};

use ffmpeg_next::{
    Error as FfmpegError, Packet, codec::context::Context as CodecContext, decoder,
    format::Pixel, frame::Video as VideoFrame, util::error::EAGAIN,
};

use crate::{
    container::MediaContainer, conversion, error::FramegrabError, selector::SelectedStream,
};

/// Where the decode engine is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodeState {
    /// Created, no decoder yet.
    Idle,
    /// Decoder opened for the selected stream.
    Opened,
    /// Reading packets toward the current target timestamp.
    Seeking,
    /// Submitting packets and counting the frames that come out.
    Decoding,
    /// The countdown reached zero; a frame was produced.
    FrameReady,
    /// Input ran out before the countdown reached zero.
    Exhausted,
    /// The decoder or demuxer reported an error.
    Failed,
}

/// Evenly spaced seek targets across a stream.
///
/// With `n` requested frames the duration is cut into `n + 1` equal steps.
/// The first target is one step past the origin, and each
/// [`advance`](SeekSchedule::advance) moves it one more step.
///
/// # Example
///
/// ```
/// use framegrab::SeekSchedule;
///
/// let mut schedule = SeekSchedule::new(0, 90_000, 2);
/// assert_eq!(schedule.step(), 30_000);
/// assert_eq!(schedule.target(), 30_000);
/// assert_eq!(schedule.advance(), 60_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeekSchedule {
    origin: i64,
    step: i64,
    target: i64,
}

impl SeekSchedule {
    /// Build a schedule for `requested_frame_count` frames over `duration`
    /// time-base units starting at `origin`.
    ///
    /// A negative duration is treated as unknown (step 0).
    pub fn new(origin: i64, duration: i64, requested_frame_count: u32) -> Self {
        let step = duration.max(0) / (i64::from(requested_frame_count) + 1);
        Self {
            origin,
            step,
            target: origin.saturating_add(step),
        }
    }

    /// Schedule for the selected stream.
    ///
    /// Uses the stream's own duration, else the container duration (in
    /// microseconds) rescaled into the stream's time base, else zero.
    pub fn for_stream(
        stream: &SelectedStream,
        container_duration: Option<i64>,
        requested_frame_count: u32,
    ) -> Self {
        let descriptor = &stream.descriptor;
        let duration = descriptor
            .duration
            .or_else(|| {
                container_duration.and_then(|microseconds| {
                    conversion::microseconds_to_stream_timestamp(microseconds, descriptor.time_base)
                })
            })
            .unwrap_or(0);
        Self::new(
            descriptor.start_time.unwrap_or(0),
            duration,
            requested_frame_count,
        )
    }

    /// Timestamp the schedule measures from.
    pub fn origin(&self) -> i64 {
        self.origin
    }

    /// Distance between consecutive targets.
    pub fn step(&self) -> i64 {
        self.step
    }

    /// Current target timestamp.
    pub fn target(&self) -> i64 {
        self.target
    }

    /// Move to the next target and return it.
    pub fn advance(&mut self) -> i64 {
        self.target = self.target.saturating_add(self.step);
        self.target
    }
}

/// A single decoded picture.
///
/// Wraps an owned FFmpeg video frame; the pixel data lives in FFmpeg's
/// reference-counted buffers and is released on drop.
pub struct DecodedFrame {
    frame: VideoFrame,
}

impl DecodedFrame {
    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.frame.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.frame.height()
    }

    /// Pixel format of the planes.
    pub fn format(&self) -> Pixel {
        self.frame.format()
    }

    /// Presentation timestamp in the source stream's time base.
    pub fn pts(&self) -> Option<i64> {
        self.frame.pts()
    }

    /// Number of data planes.
    pub fn planes(&self) -> usize {
        self.frame.planes()
    }

    /// Raw bytes of plane `index`, including row padding.
    pub fn data(&self, index: usize) -> &[u8] {
        self.frame.data(index)
    }

    /// Row length in bytes of plane `index`.
    pub fn stride(&self, index: usize) -> usize {
        self.frame.stride(index)
    }

    /// Borrow the underlying FFmpeg frame.
    pub fn as_video_frame(&self) -> &VideoFrame {
        &self.frame
    }

    /// Give up the wrapper and return the FFmpeg frame.
    pub fn into_inner(self) -> VideoFrame {
        self.frame
    }
}

impl From<VideoFrame> for DecodedFrame {
    fn from(frame: VideoFrame) -> Self {
        Self { frame }
    }
}

impl Debug for DecodedFrame {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("DecodedFrame")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("format", &self.format())
            .field("pts", &self.pts())
            .finish()
    }
}

/// Outcome of handing one packet to the decoder.
enum Submitted {
    /// The countdown hit zero on this frame.
    Ready(DecodedFrame),
    /// Frames came out but more are still owed.
    Progressed,
    /// The decoder buffered the packet without emitting anything.
    Buffered,
}

/// Drives one decoder over the selected stream of a [`MediaContainer`].
///
/// The engine borrows the container mutably for its whole life because it
/// pulls packets from the shared demuxer.
pub struct DecodeEngine<'c, 'a> {
    container: &'c mut MediaContainer<'a>,
    stream: SelectedStream,
    decoder: Option<decoder::Video>,
    schedule: SeekSchedule,
    state: DecodeState,
    requested: u32,
    decoded: u32,
    remaining: u32,
    pending: Vec<Packet>,
    inbox: VecDeque<Packet>,
    end_of_input: bool,
}

impl<'c, 'a> DecodeEngine<'c, 'a> {
    /// Prepare an engine in [`DecodeState::Idle`] that will return the
    /// `requested_frame_count`-th decoded frame.
    ///
    /// # Errors
    ///
    /// Returns [`FramegrabError::InvalidOptions`] if the count is zero.
    pub fn new(
        container: &'c mut MediaContainer<'a>,
        stream: SelectedStream,
        requested_frame_count: u32,
    ) -> Result<Self, FramegrabError> {
        if requested_frame_count == 0 {
            return Err(FramegrabError::InvalidOptions(
                "frame count must be at least 1".to_string(),
            ));
        }

        let schedule =
            SeekSchedule::for_stream(&stream, container.duration(), requested_frame_count);

        Ok(Self {
            container,
            stream,
            decoder: None,
            schedule,
            state: DecodeState::Idle,
            requested: requested_frame_count,
            decoded: 0,
            remaining: requested_frame_count,
            pending: Vec::new(),
            inbox: VecDeque::new(),
            end_of_input: false,
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> DecodeState {
        self.state
    }

    /// The seek schedule in use.
    pub fn schedule(&self) -> &SeekSchedule {
        &self.schedule
    }

    /// Frames decoded so far.
    pub fn frames_decoded(&self) -> u32 {
        self.decoded
    }

    /// Resolve and open a decoder for the selected stream.
    ///
    /// Does nothing if the engine is already past [`DecodeState::Idle`].
    ///
    /// # Errors
    ///
    /// - [`FramegrabError::UnsupportedCodec`] if no decoder is registered.
    /// - [`FramegrabError::DecoderInit`] if the decoder cannot be opened.
    pub fn open(&mut self) -> Result<(), FramegrabError> {
        if self.state != DecodeState::Idle {
            return Ok(());
        }

        let codec_id = self.stream.descriptor.codec;
        let Some(codec) = decoder::find(codec_id) else {
            self.state = DecodeState::Failed;
            return Err(FramegrabError::UnsupportedCodec(format!("{codec_id:?}")));
        };
        let codec_name = codec.name().to_string();

        let context = {
            let Some(stream) = self.container.input_mut().stream(self.stream.index) else {
                self.state = DecodeState::Failed;
                return Err(FramegrabError::NoVideoStream(format!(
                    "stream #{} vanished",
                    self.stream.index
                )));
            };
            CodecContext::from_parameters(stream.parameters())
        };

        let decoder = context
            .and_then(|context| context.decoder().open_as(codec))
            .and_then(|opened| opened.video())
            .map_err(|error| {
                self.state = DecodeState::Failed;
                FramegrabError::DecoderInit(error.to_string())
            })?;

        log::debug!(
            "Opened {} decoder for stream #{} ({}x{} {:?})",
            codec_name,
            self.stream.index,
            decoder.width(),
            decoder.height(),
            decoder.format(),
        );

        self.decoder = Some(decoder);
        self.state = DecodeState::Opened;
        Ok(())
    }

    /// Seek, decode, and return the frame the countdown lands on.
    ///
    /// Opens the decoder first if needed.
    ///
    /// # Errors
    ///
    /// - Any error from [`open`](DecodeEngine::open).
    /// - [`FramegrabError::Decode`] if a packet cannot be read or is rejected.
    /// - [`FramegrabError::NoFrameDecoded`] if the stream ends first.
    pub fn run(&mut self) -> Result<DecodedFrame, FramegrabError> {
        self.open()?;
        if self.state != DecodeState::Opened {
            return Err(FramegrabError::Decode(format!(
                "decode engine cannot run from state {:?}",
                self.state
            )));
        }

        self.enter_seek();

        let mut frame = VideoFrame::empty();
        loop {
            if let Some(packet) = self.inbox.pop_front() {
                match self.submit(&packet, &mut frame)? {
                    Submitted::Ready(result) => return Ok(result),
                    Submitted::Progressed => {
                        self.schedule.advance();
                        self.enter_seek();
                        for queued in mem::take(&mut self.inbox) {
                            self.accept(queued);
                        }
                    }
                    Submitted::Buffered => {}
                }
                continue;
            }

            if self.end_of_input {
                if self.pending.is_empty() {
                    return self.drain(&mut frame);
                }
                log::warn!(
                    "Input ended before seek target {}; decoding from the last keyframe",
                    self.schedule.target()
                );
                self.inbox.extend(self.pending.drain(..));
                self.state = DecodeState::Decoding;
                continue;
            }

            let mut packet = Packet::empty();
            match packet.read(self.container.input_mut()) {
                Ok(()) => {
                    if packet.stream() == self.stream.index {
                        self.accept(packet);
                    }
                }
                Err(FfmpegError::Eof) => {
                    log::debug!(
                        "Demuxer reached end of input after {} bytes",
                        self.container.bytes_consumed()
                    );
                    self.end_of_input = true;
                }
                Err(error) => {
                    self.state = DecodeState::Failed;
                    return Err(FramegrabError::Decode(format!("packet read failed: {error}")));
                }
            }
        }
    }

    fn enter_seek(&mut self) {
        self.state = DecodeState::Seeking;
        log::debug!(
            "Seeking stream #{} to {} ({:.3}s)",
            self.stream.index,
            self.schedule.target(),
            conversion::timestamp_to_seconds(
                self.schedule.target(),
                self.stream.descriptor.time_base
            ),
        );
    }

    /// Route a packet of the selected stream according to the state.
    fn accept(&mut self, packet: Packet) {
        if self.state != DecodeState::Seeking {
            self.inbox.push_back(packet);
            return;
        }

        if packet.is_key() {
            self.pending.clear();
            if let Some(decoder) = self.decoder.as_mut() {
                decoder.flush();
            }
        }

        let reached = packet
            .pts()
            .or_else(|| packet.dts())
            .is_some_and(|timestamp| timestamp >= self.schedule.target());

        self.pending.push(packet);

        if reached {
            log::trace!(
                "Seek target reached; submitting {} packet(s)",
                self.pending.len()
            );
            self.inbox.extend(self.pending.drain(..));
            self.state = DecodeState::Decoding;
        }
    }

    fn submit(
        &mut self,
        packet: &Packet,
        frame: &mut VideoFrame,
    ) -> Result<Submitted, FramegrabError> {
        let mut progressed = false;
        loop {
            let Some(decoder) = self.decoder.as_mut() else {
                return Err(FramegrabError::DecoderInit("decoder is not open".to_string()));
            };

            match decoder.send_packet(packet) {
                Ok(()) => break,
                Err(FfmpegError::Other { errno }) if errno == EAGAIN => {
                    log::trace!("Decoder output full; receiving frames before resending packet");
                    match self.collect(frame)? {
                        Submitted::Ready(result) => return Ok(Submitted::Ready(result)),
                        Submitted::Progressed => progressed = true,
                        Submitted::Buffered => {
                            self.state = DecodeState::Failed;
                            return Err(FramegrabError::Decode(
                                "decoder refused packet without producing output".to_string(),
                            ));
                        }
                    }
                }
                Err(error) => {
                    self.state = DecodeState::Failed;
                    return Err(FramegrabError::Decode(format!("decoder rejected packet: {error}")));
                }
            }
        }

        match self.collect(frame)? {
            Submitted::Buffered if progressed => Ok(Submitted::Progressed),
            submitted => Ok(submitted),
        }
    }

    /// Signal end of stream and count whatever the decoder still holds.
    fn drain(&mut self, frame: &mut VideoFrame) -> Result<DecodedFrame, FramegrabError> {
        self.state = DecodeState::Decoding;
        if let Some(decoder) = self.decoder.as_mut() {
            match decoder.send_eof() {
                Ok(()) | Err(FfmpegError::Eof) => {}
                Err(error) => {
                    self.state = DecodeState::Failed;
                    return Err(FramegrabError::Decode(format!("decoder flush failed: {error}")));
                }
            }
        }

        if let Submitted::Ready(result) = self.collect(frame)? {
            return Ok(result);
        }

        self.state = DecodeState::Exhausted;
        log::debug!(
            "Stream #{} exhausted after {} of {} frame(s)",
            self.stream.index,
            self.decoded,
            self.requested
        );
        Err(FramegrabError::NoFrameDecoded {
            requested: self.requested,
            decoded: self.decoded,
        })
    }

    /// Pull every frame the decoder has ready, counting each one.
    fn collect(&mut self, frame: &mut VideoFrame) -> Result<Submitted, FramegrabError> {
        let Some(decoder) = self.decoder.as_mut() else {
            return Err(FramegrabError::DecoderInit("decoder is not open".to_string()));
        };

        let mut produced = false;
        loop {
            match decoder.receive_frame(frame) {
                Ok(()) => {
                    produced = true;
                    self.decoded += 1;
                    self.remaining -= 1;
                    if self.remaining == 0 {
                        self.state = DecodeState::FrameReady;
                        let ready = DecodedFrame::from(mem::replace(frame, VideoFrame::empty()));
                        log::debug!(
                            "Decoded frame {}/{} at pts {:?} ({}x{})",
                            self.decoded,
                            self.requested,
                            ready.pts(),
                            ready.width(),
                            ready.height(),
                        );
                        return Ok(Submitted::Ready(ready));
                    }
                }
                Err(FfmpegError::Eof) => break,
                Err(FfmpegError::Other { errno }) if errno == EAGAIN => break,
                Err(error) => {
                    self.state = DecodeState::Failed;
                    return Err(FramegrabError::Decode(format!("frame receive failed: {error}")));
                }
            }
        }

        Ok(if produced {
            Submitted::Progressed
        } else {
            Submitted::Buffered
        })
    }
}
