//! Dimension probing without decoding.
//!
//! [`MediaProbe`] opens the container, picks the first video stream, and
//! reads its width and height straight from the codec parameters. No decoder
//! is created, so probing is cheap even for codecs that are slow to open.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::Path,
};

use crate::{container::MediaContainer, error::FramegrabError, selector};

/// Pixel width and height of a video stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Width divided by height.
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

impl Display for Dimensions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl From<Dimensions> for (u32, u32) {
    fn from(dimensions: Dimensions) -> Self {
        (dimensions.width, dimensions.height)
    }
}

/// Stateless dimension probe.
///
/// # Example
///
/// ```no_run
/// use framegrab::MediaProbe;
///
/// let bytes = std::fs::read("input.mp4")?;
/// let dimensions = MediaProbe::dimensions(&bytes)?;
/// println!("{dimensions}");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct MediaProbe;

impl MediaProbe {
    /// Width and height of the first video stream in `bytes`.
    ///
    /// # Errors
    ///
    /// - [`FramegrabError::Open`] / [`FramegrabError::StreamInfo`] if the
    ///   container cannot be read.
    /// - [`FramegrabError::NoVideoStream`] if there is no video stream or it
    ///   reports a zero width or height.
    pub fn dimensions(bytes: &[u8]) -> Result<Dimensions, FramegrabError> {
        let container = MediaContainer::open(bytes)?;
        let stream = selector::select_video_stream(&container)?;
        let (width, height) = stream.require_dimensions()?;
        log::info!("Probed {width}x{height} from stream #{}", stream.index);
        Ok(Dimensions { width, height })
    }

    /// Read the file at `path` into memory and probe it.
    ///
    /// # Errors
    ///
    /// [`FramegrabError::Io`] if the file cannot be read, otherwise as
    /// [`MediaProbe::dimensions`].
    pub fn dimensions_from_path<P: AsRef<Path>>(path: P) -> Result<Dimensions, FramegrabError> {
        log::debug!("Reading {:?} for probing", path.as_ref());
        let bytes = std::fs::read(path.as_ref())?;
        Self::dimensions(&bytes)
    }

    /// Probe several buffers one after another.
    ///
    /// A failure in one buffer produces an `Err` entry; the rest still run.
    pub fn dimensions_many<B: AsRef<[u8]>>(
        buffers: &[B],
    ) -> Vec<Result<Dimensions, FramegrabError>> {
        buffers
            .iter()
            .map(|buffer| Self::dimensions(buffer.as_ref()))
            .collect()
    }
}
