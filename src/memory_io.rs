//! In-memory byte source for the FFmpeg demuxer.
//!
//! [`InputBuffer`] is a forward-only cursor over caller-owned bytes.
//! [`MemoryIo`] wraps it in an FFmpeg `AVIOContext` with a read callback and
//! no seek callback, so the demuxer pulls bytes sequentially and can never
//! rewind the buffer.

use std::{
    ffi::{c_int, c_void},
    io::{self, Read},
    ptr::{self, NonNull},
};

use ffmpeg_sys_next::AVIOContext;

use crate::error::FramegrabError;

/// Size of the scratch buffer FFmpeg reads into.
const IO_BUFFER_SIZE: usize = 4096;

/// A forward-only read cursor over an immutable byte slice.
///
/// Reads never fail: a request for more bytes than remain is a short read,
/// and once the cursor reaches the end every read returns 0.
///
/// # Example
///
/// ```
/// use framegrab::InputBuffer;
///
/// let mut input = InputBuffer::new(b"abcdef");
/// let mut chunk = [0u8; 4];
/// assert_eq!(input.read(&mut chunk), 4);
/// assert_eq!(input.read(&mut chunk), 2);
/// assert_eq!(&chunk[..2], b"ef");
/// assert_eq!(input.read(&mut chunk), 0);
/// ```
#[derive(Debug, Clone)]
pub struct InputBuffer<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> InputBuffer<'a> {
    /// Wrap `data` with the cursor at offset 0.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Copy up to `out.len()` bytes into `out` and advance the cursor.
    ///
    /// Returns the number of bytes copied, which is
    /// `min(out.len(), self.remaining())`.
    pub fn read(&mut self, out: &mut [u8]) -> usize {
        let count = out.len().min(self.remaining());
        out[..count].copy_from_slice(&self.data[self.position..self.position + count]);
        self.position += count;
        count
    }

    /// Offset of the next byte to be read.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of bytes not yet read.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Total length of the wrapped slice.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the wrapped slice is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether every byte has been read.
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }
}

impl Read for InputBuffer<'_> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        Ok(InputBuffer::read(self, out))
    }
}

/// An FFmpeg `AVIOContext` that pulls from an [`InputBuffer`].
///
/// Owns the I/O context, its scratch buffer, and the boxed cursor handed to
/// the read callback. All three are released in [`Drop`]. The format context
/// using this I/O context must be closed first; [`MediaContainer`] guarantees
/// that through its field order.
///
/// [`MediaContainer`]: crate::MediaContainer
pub(crate) struct MemoryIo<'a> {
    context: *mut AVIOContext,
    input: NonNull<InputBuffer<'a>>,
}

impl<'a> MemoryIo<'a> {
    /// Allocate the scratch buffer and I/O context for `data`.
    ///
    /// # Errors
    ///
    /// Returns [`FramegrabError::Allocation`] if FFmpeg cannot allocate
    /// either the buffer or the context.
    pub(crate) fn new(data: &'a [u8]) -> Result<Self, FramegrabError> {
        let input = NonNull::from(Box::leak(Box::new(InputBuffer::new(data))));
        // From here on, Drop reclaims the cursor on every exit path.
        let mut io = Self {
            context: ptr::null_mut(),
            input,
        };

        // SAFETY: the buffer is handed to avio_alloc_context, which takes
        // ownership on success. On failure we free it ourselves. The opaque
        // pointer stays valid until Drop, which runs after FFmpeg has
        // stopped using the context.
        unsafe {
            let buffer = ffmpeg_sys_next::av_malloc(IO_BUFFER_SIZE) as *mut u8;
            if buffer.is_null() {
                return Err(FramegrabError::Allocation(
                    "I/O buffer for in-memory input".to_string(),
                ));
            }

            let context = ffmpeg_sys_next::avio_alloc_context(
                buffer,
                IO_BUFFER_SIZE as c_int,
                0,
                io.input.as_ptr() as *mut c_void,
                Some(read_input_buffer),
                None,
                None,
            );
            if context.is_null() {
                ffmpeg_sys_next::av_free(buffer as *mut c_void);
                return Err(FramegrabError::Allocation(
                    "I/O context for in-memory input".to_string(),
                ));
            }
            io.context = context;
        }

        log::trace!("Allocated in-memory I/O context over {} bytes", data.len());
        Ok(io)
    }

    /// Raw pointer for binding to a format context's `pb` field.
    pub(crate) fn as_mut_ptr(&mut self) -> *mut AVIOContext {
        self.context
    }

    /// Bytes the demuxer has pulled so far.
    pub(crate) fn position(&self) -> usize {
        // SAFETY: the cursor is only mutated from the read callback, which
        // cannot run while we hold `&self` on this single-threaded context.
        unsafe { self.input.as_ref().position() }
    }
}

impl Drop for MemoryIo<'_> {
    fn drop(&mut self) {
        // SAFETY: FFmpeg may have replaced the scratch buffer, so free the
        // one the context currently points at, then the context, then the
        // cursor that was leaked in `new`.
        unsafe {
            if !self.context.is_null() {
                ffmpeg_sys_next::av_freep(&mut (*self.context).buffer as *mut *mut u8 as *mut c_void);
                ffmpeg_sys_next::avio_context_free(&mut self.context);
            }
            drop(Box::from_raw(self.input.as_ptr()));
        }
    }
}

/// Read callback installed on the `AVIOContext`.
///
/// FFmpeg no longer accepts 0 as an end-of-stream marker from custom I/O,
/// so an exhausted cursor is reported as `AVERROR_EOF`.
unsafe extern "C" fn read_input_buffer(opaque: *mut c_void, buffer: *mut u8, size: c_int) -> c_int {
    if opaque.is_null() || buffer.is_null() || size <= 0 {
        return ffmpeg_sys_next::AVERROR_EOF;
    }

    // SAFETY: `opaque` is the cursor installed by `MemoryIo::new` and
    // `buffer` points at `size` writable bytes owned by FFmpeg.
    let (input, out) = unsafe {
        (
            &mut *(opaque as *mut InputBuffer<'_>),
            std::slice::from_raw_parts_mut(buffer, size as usize),
        )
    };

    match input.read(out) {
        0 => ffmpeg_sys_next::AVERROR_EOF,
        count => count as c_int,
    }
}
