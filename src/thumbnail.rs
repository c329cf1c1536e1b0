//! Thumbnail extraction pipeline.
//!
//! [`Thumbnailer`] ties the stages together for one buffer: open the
//! container, select the video stream, run the decode engine, and encode the
//! resulting frame. Every native resource is scoped to one call.

use std::path::Path;

use crate::{
    config::ExtractOptions,
    container::MediaContainer,
    decode::DecodeEngine,
    encode::{EncodedImage, StillEncoder},
    error::FramegrabError,
    selector,
};

/// Reusable thumbnail settings.
///
/// Holds only validated [`ExtractOptions`]; it owns no FFmpeg state and is
/// `Send + Sync`.
///
/// # Example
///
/// ```no_run
/// use framegrab::{ExtractOptions, Thumbnailer};
///
/// let thumbnailer = Thumbnailer::new(ExtractOptions::new().with_max_dimension(320))?;
/// let bytes = std::fs::read("input.mkv")?;
/// let image = thumbnailer.extract(&bytes)?;
/// image.save("thumb.jpg")?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Thumbnailer {
    options: ExtractOptions,
}

impl Thumbnailer {
    /// Create a thumbnailer after validating `options`.
    ///
    /// # Errors
    ///
    /// Returns [`FramegrabError::InvalidOptions`] if the options are out of
    /// range.
    pub fn new(options: ExtractOptions) -> Result<Self, FramegrabError> {
        options.validate()?;
        Ok(Self { options })
    }

    /// The options in use.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Extract one JPEG thumbnail from `bytes`.
    ///
    /// # Errors
    ///
    /// Any [`FramegrabError`] from the container, selector, decode, scale,
    /// or encode stage.
    pub fn extract(&self, bytes: &[u8]) -> Result<EncodedImage, FramegrabError> {
        log::debug!(
            "Extracting thumbnail from {} bytes (frame_count={}, output={:?})",
            bytes.len(),
            self.options.frame_count,
            self.options.output_size,
        );

        let mut container = MediaContainer::open(bytes)?;
        let stream = selector::select_video_stream(&container)?;
        stream.require_dimensions()?;

        let frame = {
            let mut engine = DecodeEngine::new(&mut container, stream, self.options.frame_count)?;
            engine.run()?
        };

        let encoder = match self.options.output_size.resolve(frame.width(), frame.height()) {
            Some((width, height)) => StillEncoder::new().with_output_size(width, height),
            None => StillEncoder::new(),
        };
        let image = encoder.encode(frame)?;

        log::info!(
            "Extracted {}x{} thumbnail ({} bytes) from {} container",
            image.width(),
            image.height(),
            image.len(),
            container.format_name(),
        );

        Ok(image)
    }

    /// Read the file at `path` into memory and extract a thumbnail.
    ///
    /// # Errors
    ///
    /// [`FramegrabError::Io`] if the file cannot be read, otherwise as
    /// [`Thumbnailer::extract`].
    pub fn extract_from_path<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<EncodedImage, FramegrabError> {
        log::debug!("Reading {:?} for thumbnail extraction", path.as_ref());
        let bytes = std::fs::read(path.as_ref())?;
        self.extract(&bytes)
    }
}
