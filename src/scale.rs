//! Software rescaling and pixel-format conversion.

use ffmpeg_next::{
    format::Pixel,
    frame::Video as VideoFrame,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};

use crate::{decode::DecodedFrame, error::FramegrabError};

/// A bilinear `swscale` context for one fixed source/destination geometry.
///
/// # Example
///
/// ```no_run
/// use ffmpeg_next::{format::Pixel, frame::Video};
/// use framegrab::{DecodedFrame, FrameScaler};
///
/// ffmpeg_next::init()?;
/// let source = DecodedFrame::from(Video::new(Pixel::YUV420P, 640, 480));
/// let mut scaler = FrameScaler::for_frame(&source, Pixel::YUVJ422P, 320, 240)?;
/// let scaled = scaler.run(&source)?;
/// assert_eq!((scaled.width(), scaled.height()), (320, 240));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct FrameScaler {
    context: ScalingContext,
    source: (Pixel, u32, u32),
    destination: (Pixel, u32, u32),
}

impl FrameScaler {
    /// Create a scaler from `src_format` at `src_width`x`src_height` to
    /// `dst_format` at `dst_width`x`dst_height`.
    ///
    /// # Errors
    ///
    /// Returns [`FramegrabError::Scale`] for a zero dimension or a format
    /// pair `swscale` cannot handle.
    pub fn new(
        src_format: Pixel,
        src_width: u32,
        src_height: u32,
        dst_format: Pixel,
        dst_width: u32,
        dst_height: u32,
    ) -> Result<Self, FramegrabError> {
        if src_width == 0 || src_height == 0 || dst_width == 0 || dst_height == 0 {
            return Err(FramegrabError::Scale(format!(
                "cannot scale {src_width}x{src_height} to {dst_width}x{dst_height}"
            )));
        }

        let context = ScalingContext::get(
            src_format,
            src_width,
            src_height,
            dst_format,
            dst_width,
            dst_height,
            ScalingFlags::BILINEAR,
        )
        .map_err(|error| {
            FramegrabError::Scale(format!(
                "cannot create scaler {src_format:?} -> {dst_format:?}: {error}"
            ))
        })?;

        log::debug!(
            "Created scaler {src_format:?} {src_width}x{src_height} -> {dst_format:?} {dst_width}x{dst_height}"
        );

        Ok(Self {
            context,
            source: (src_format, src_width, src_height),
            destination: (dst_format, dst_width, dst_height),
        })
    }

    /// Create a scaler whose source geometry is taken from `frame`.
    ///
    /// # Errors
    ///
    /// See [`FrameScaler::new`].
    pub fn for_frame(
        frame: &DecodedFrame,
        dst_format: Pixel,
        dst_width: u32,
        dst_height: u32,
    ) -> Result<Self, FramegrabError> {
        Self::new(
            frame.format(),
            frame.width(),
            frame.height(),
            dst_format,
            dst_width,
            dst_height,
        )
    }

    /// Destination pixel format and size.
    pub fn output(&self) -> (Pixel, u32, u32) {
        self.destination
    }

    /// Convert `frame` into a new frame with the destination geometry.
    ///
    /// The presentation timestamp is carried over.
    ///
    /// # Errors
    ///
    /// Returns [`FramegrabError::Scale`] if `frame` does not match the source
    /// geometry or `swscale` fails.
    pub fn run(&mut self, frame: &DecodedFrame) -> Result<DecodedFrame, FramegrabError> {
        let actual = (frame.format(), frame.width(), frame.height());
        if actual != self.source {
            return Err(FramegrabError::Scale(format!(
                "frame is {actual:?}, scaler expects {:?}",
                self.source
            )));
        }

        let mut output = VideoFrame::empty();
        self.context
            .run(frame.as_video_frame(), &mut output)
            .map_err(|error| FramegrabError::Scale(format!("scaling failed: {error}")))?;
        output.set_pts(frame.pts());

        Ok(DecodedFrame::from(output))
    }
}

/// Scale `width`x`height` so the longer side equals `max_dimension`,
/// keeping the aspect ratio. Neither side drops below 1.
///
/// ```
/// assert_eq!(framegrab::fit_within(1920, 1080, 320), (320, 180));
/// assert_eq!(framegrab::fit_within(480, 640, 320), (240, 320));
/// ```
pub fn fit_within(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (max_dimension, max_dimension);
    }
    let scale = f64::from(max_dimension) / f64::from(width.max(height));
    let fitted_width = (f64::from(width) * scale).round() as u32;
    let fitted_height = (f64::from(height) * scale).round() as u32;
    (fitted_width.max(1), fitted_height.max(1))
}
