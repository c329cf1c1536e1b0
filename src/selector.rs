//! Primary video stream selection.

use crate::{
    container::{MediaContainer, StreamDescriptor},
    error::FramegrabError,
};

/// The video stream chosen for probing or decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedStream {
    /// Packet stream index of the chosen stream.
    pub index: usize,
    /// Snapshot of the stream's parameters.
    pub descriptor: StreamDescriptor,
}

impl SelectedStream {
    /// Width and height of the stream, rejecting zero in either.
    ///
    /// # Errors
    ///
    /// Returns [`FramegrabError::NoVideoStream`] if the codec parameters
    /// report a zero width or height.
    pub fn require_dimensions(&self) -> Result<(u32, u32), FramegrabError> {
        let StreamDescriptor { width, height, .. } = self.descriptor;
        if width == 0 || height == 0 {
            return Err(FramegrabError::NoVideoStream(format!(
                "stream #{} reports {width}x{height}",
                self.index
            )));
        }
        Ok((width, height))
    }
}

/// Position of the first video descriptor, in declared order.
pub fn first_video_stream(streams: &[StreamDescriptor]) -> Option<usize> {
    streams.iter().position(StreamDescriptor::is_video)
}

/// Pick the first video stream of an opened container.
///
/// Later video streams (alternate angles, cover art after the main track)
/// are ignored.
///
/// # Errors
///
/// Returns [`FramegrabError::NoVideoStream`] if no stream is video-typed.
pub fn select_video_stream(container: &MediaContainer<'_>) -> Result<SelectedStream, FramegrabError> {
    let streams = container.streams();
    let position = first_video_stream(streams).ok_or_else(|| {
        FramegrabError::NoVideoStream(format!(
            "none of {} stream(s) is video",
            streams.len()
        ))
    })?;
    let descriptor = streams[position].clone();

    log::debug!(
        "Selected video stream #{} ({:?}, {}x{})",
        descriptor.index,
        descriptor.codec,
        descriptor.width,
        descriptor.height,
    );

    Ok(SelectedStream {
        index: descriptor.index,
        descriptor,
    })
}
