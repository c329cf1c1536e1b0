//! Still-image encoder: one decoded frame in, one JPEG out.
//!
//! [`StillEncoder`] drives FFmpeg's MJPEG encoder for a single frame and
//! copies the packet into an owned [`EncodedImage`].
//!
//! # Example
//!
//! ```no_run
//! use ffmpeg_next::{format::Pixel, frame::Video};
//! use framegrab::{DecodedFrame, StillEncoder};
//!
//! ffmpeg_next::init()?;
//! let frame = DecodedFrame::from(Video::new(Pixel::YUV420P, 320, 240));
//! let image = StillEncoder::new().encode(frame)?;
//! image.save("frame.jpg")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::{io::Cursor, path::Path};

use ffmpeg_next::{
    Packet, Rational, codec::Id, codec::context::Context as CodecContext, format::Pixel,
};
use image::{DynamicImage, ImageFormat, ImageReader};

use crate::{decode::DecodedFrame, error::FramegrabError, scale::FrameScaler};

/// Pixel format handed to the MJPEG encoder (full-range 4:2:2).
pub const OUTPUT_PIXEL_FORMAT: Pixel = Pixel::YUVJ422P;

/// First three bytes of every JPEG file (SOI marker plus the next marker
/// prefix).
pub const JPEG_SIGNATURE: [u8; 3] = [0xFF, 0xD8, 0xFF];

/// Time base the encoder is opened with.
const ENCODER_TIME_BASE: Rational = Rational(1, 25);

/// A compressed still image owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    bytes: Vec<u8>,
    width: u32,
    height: u32,
}

impl EncodedImage {
    /// The JPEG bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Take the JPEG bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Size of the JPEG in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the image has no bytes. Never true for encoder output.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Width the image was encoded at.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height the image was encoded at.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether the bytes start with the JPEG SOI marker.
    pub fn has_jpeg_signature(&self) -> bool {
        self.bytes.starts_with(&JPEG_SIGNATURE)
    }

    /// Read the width and height back out of the JPEG header.
    ///
    /// # Errors
    ///
    /// Returns [`FramegrabError::Image`] if the header cannot be parsed.
    pub fn decode_dimensions(&self) -> Result<(u32, u32), FramegrabError> {
        let reader = ImageReader::with_format(Cursor::new(self.as_bytes()), ImageFormat::Jpeg);
        Ok(reader.into_dimensions()?)
    }

    /// Decode the JPEG into an [`image::DynamicImage`].
    ///
    /// # Errors
    ///
    /// Returns [`FramegrabError::Image`] if the data is not a valid JPEG.
    pub fn to_image(&self) -> Result<DynamicImage, FramegrabError> {
        Ok(image::load_from_memory_with_format(
            self.as_bytes(),
            ImageFormat::Jpeg,
        )?)
    }

    /// Write the JPEG bytes to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns [`FramegrabError::Io`] if the file cannot be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), FramegrabError> {
        std::fs::write(path.as_ref(), &self.bytes)?;
        log::debug!("Wrote {} bytes to {:?}", self.bytes.len(), path.as_ref());
        Ok(())
    }
}

impl AsRef<[u8]> for EncodedImage {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<EncodedImage> for Vec<u8> {
    fn from(image: EncodedImage) -> Self {
        image.bytes
    }
}

/// Encodes a single [`DecodedFrame`] as an MJPEG still.
///
/// Every call to [`encode`](StillEncoder::encode) opens and drops its own
/// encoder context, so one `StillEncoder` can be reused freely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StillEncoder {
    output_size: Option<(u32, u32)>,
}

impl StillEncoder {
    /// Encoder that keeps the frame's own dimensions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rescale every frame to `width`x`height` before encoding.
    pub fn with_output_size(mut self, width: u32, height: u32) -> Self {
        self.output_size = Some((width, height));
        self
    }

    /// The fixed output size, if one was set.
    pub fn output_size(&self) -> Option<(u32, u32)> {
        self.output_size
    }

    /// Encode `frame` as one JPEG image.
    ///
    /// The frame is first converted to [`OUTPUT_PIXEL_FORMAT`] and, when an
    /// output size is set, rescaled.
    ///
    /// # Errors
    ///
    /// - [`FramegrabError::EncoderInit`] if the frame or target size is
    ///   empty, or the MJPEG encoder cannot be found or opened.
    /// - [`FramegrabError::Scale`] if the conversion fails.
    /// - [`FramegrabError::EncodeSubmit`] if the encoder rejects the frame.
    /// - [`FramegrabError::EncodeRetrieve`] if no packet comes back.
    pub fn encode(&self, frame: DecodedFrame) -> Result<EncodedImage, FramegrabError> {
        let (width, height) = self
            .output_size
            .unwrap_or((frame.width(), frame.height()));
        if width == 0 || height == 0 {
            return Err(FramegrabError::EncoderInit(format!(
                "cannot encode a {width}x{height} image"
            )));
        }

        let frame = if frame.format() != OUTPUT_PIXEL_FORMAT
            || frame.width() != width
            || frame.height() != height
        {
            FrameScaler::for_frame(&frame, OUTPUT_PIXEL_FORMAT, width, height)?.run(&frame)?
        } else {
            frame
        };

        let codec = ffmpeg_next::encoder::find(Id::MJPEG).ok_or_else(|| {
            FramegrabError::EncoderInit("MJPEG encoder is not available".to_string())
        })?;

        let mut encoder = CodecContext::new_with_codec(codec)
            .encoder()
            .video()
            .map_err(|error| FramegrabError::EncoderInit(error.to_string()))?;
        encoder.set_width(width);
        encoder.set_height(height);
        encoder.set_format(OUTPUT_PIXEL_FORMAT);
        encoder.set_time_base(ENCODER_TIME_BASE);

        let mut encoder = encoder
            .open_as(codec)
            .map_err(|error| FramegrabError::EncoderInit(error.to_string()))?;

        let mut picture = frame.into_inner();
        picture.set_pts(Some(0));

        encoder
            .send_frame(&picture)
            .map_err(|error| FramegrabError::EncodeSubmit(error.to_string()))?;
        encoder
            .send_eof()
            .map_err(|error| FramegrabError::EncodeSubmit(error.to_string()))?;

        let mut packet = Packet::empty();
        encoder
            .receive_packet(&mut packet)
            .map_err(|error| FramegrabError::EncodeRetrieve(error.to_string()))?;

        let bytes = match packet.data() {
            Some(data) if !data.is_empty() => data.to_vec(),
            _ => {
                return Err(FramegrabError::EncodeRetrieve(
                    "encoder returned an empty packet".to_string(),
                ));
            }
        };

        log::debug!("Encoded {width}x{height} JPEG ({} bytes)", bytes.len());

        Ok(EncodedImage {
            bytes,
            width,
            height,
        })
    }
}
