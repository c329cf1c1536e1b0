//! Extraction options.
//!
//! [`ExtractOptions`] controls which decoded frame becomes the thumbnail and
//! how large the JPEG is. The defaults give the plain
//! [`extract_thumbnail`](crate::extract_thumbnail) behaviour: first frame
//! past the midpoint seek, encoded at source resolution.
//!
//! # Example
//!
//! ```
//! use framegrab::{ExtractOptions, OutputSize};
//!
//! let options = ExtractOptions::new()
//!     .with_frame_count(3)
//!     .with_max_dimension(320);
//! assert_eq!(options.frame_count, 3);
//! assert_eq!(options.output_size, OutputSize::FitWithin(320));
//! assert!(options.validate().is_ok());
//! ```

use crate::{error::FramegrabError, scale};

/// Size of the encoded thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputSize {
    /// Keep the decoded frame's width and height.
    #[default]
    Source,
    /// Rescale to exactly this width and height.
    Exact {
        /// Output width in pixels.
        width: u32,
        /// Output height in pixels.
        height: u32,
    },
    /// Rescale so the longer side equals this value, keeping aspect ratio.
    FitWithin(u32),
}

impl OutputSize {
    /// Resolve against the source frame size.
    ///
    /// Returns `None` for [`OutputSize::Source`].
    pub fn resolve(self, source_width: u32, source_height: u32) -> Option<(u32, u32)> {
        match self {
            OutputSize::Source => None,
            OutputSize::Exact { width, height } => Some((width, height)),
            OutputSize::FitWithin(max_dimension) => Some(scale::fit_within(
                source_width,
                source_height,
                max_dimension,
            )),
        }
    }
}

/// Builder-style settings for [`Thumbnailer`](crate::Thumbnailer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Which decoded frame to return, counting from 1. Each frame beyond the
    /// first moves the seek target one step further into the stream.
    pub frame_count: u32,
    /// Size of the encoded image.
    pub output_size: OutputSize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            frame_count: 1,
            output_size: OutputSize::Source,
        }
    }
}

impl ExtractOptions {
    /// Default options: one frame, source size.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of frames to count down through.
    pub fn with_frame_count(mut self, frame_count: u32) -> Self {
        self.frame_count = frame_count;
        self
    }

    /// Encode at exactly `width`x`height`.
    pub fn with_output_size(mut self, width: u32, height: u32) -> Self {
        self.output_size = OutputSize::Exact { width, height };
        self
    }

    /// Encode with the longer side scaled to `max_dimension`.
    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.output_size = OutputSize::FitWithin(max_dimension);
        self
    }

    /// Check every field is in range.
    ///
    /// # Errors
    ///
    /// Returns [`FramegrabError::InvalidOptions`] for a zero frame count or a
    /// zero output dimension.
    pub fn validate(&self) -> Result<(), FramegrabError> {
        if self.frame_count == 0 {
            return Err(FramegrabError::InvalidOptions(
                "frame count must be at least 1".to_string(),
            ));
        }
        match self.output_size {
            OutputSize::Exact { width, height } if width == 0 || height == 0 => {
                Err(FramegrabError::InvalidOptions(format!(
                    "output size {width}x{height} has a zero dimension"
                )))
            }
            OutputSize::FitWithin(0) => Err(FramegrabError::InvalidOptions(
                "maximum dimension must be at least 1".to_string(),
            )),
            _ => Ok(()),
        }
    }
}
