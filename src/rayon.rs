//! Batch processing of independent buffers on the rayon pool.
//!
//! Each buffer gets its own container, decoder, and encoder, so workers
//! share nothing. Results come back in input order, one per buffer.

use ::rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::{
    config::ExtractOptions, encode::EncodedImage, error::FramegrabError, probe::Dimensions,
    probe::MediaProbe, thumbnail::Thumbnailer,
};

/// Extract one thumbnail from each buffer in parallel.
///
/// ```no_run
/// let clips: Vec<Vec<u8>> = ["a.mp4", "b.webm"]
///     .iter()
///     .map(std::fs::read)
///     .collect::<Result<_, _>>()?;
/// for (index, result) in framegrab::extract_thumbnails_parallel(&clips).into_iter().enumerate() {
///     match result {
///         Ok(jpeg) => std::fs::write(format!("thumb_{index}.jpg"), jpeg)?,
///         Err(error) => eprintln!("clip {index}: {error}"),
///     }
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn extract_thumbnails_parallel<B>(buffers: &[B]) -> Vec<Result<Vec<u8>, FramegrabError>>
where
    B: AsRef<[u8]> + Sync,
{
    extract_thumbnails_parallel_with_options(buffers, &ExtractOptions::default())
        .into_iter()
        .map(|result| result.map(EncodedImage::into_bytes))
        .collect()
}

/// [`extract_thumbnails_parallel`] with explicit options.
///
/// Invalid options produce the same error for every buffer.
pub fn extract_thumbnails_parallel_with_options<B>(
    buffers: &[B],
    options: &ExtractOptions,
) -> Vec<Result<EncodedImage, FramegrabError>>
where
    B: AsRef<[u8]> + Sync,
{
    log::debug!("Extracting {} thumbnails in parallel", buffers.len());
    let options = *options;
    buffers
        .par_iter()
        .map(|buffer| Thumbnailer::new(options)?.extract(buffer.as_ref()))
        .collect()
}

/// Probe each buffer's dimensions in parallel.
pub fn get_dimensions_parallel<B>(buffers: &[B]) -> Vec<Result<Dimensions, FramegrabError>>
where
    B: AsRef<[u8]> + Sync,
{
    log::debug!("Probing {} buffers in parallel", buffers.len());
    buffers
        .par_iter()
        .map(|buffer| MediaProbe::dimensions(buffer.as_ref()))
        .collect()
}
