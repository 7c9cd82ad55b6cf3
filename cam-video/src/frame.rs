//! Frame entity and buffer lifecycle
//!
//! A frame couples pixel bytes with the geometry describing them. Owned
//! buffers are grown and shrunk by the library; borrowed buffers wrap
//! caller memory whose capacity is fixed for the life of the frame.

use crate::types::{FrameError, FrameFormat, PayloadError};

/// Backing storage for frame pixels
#[derive(Debug)]
pub(crate) enum FrameBuf<'a> {
    /// Library-owned, resized freely
    Owned(Vec<u8>),
    /// Caller-supplied memory; `len` tracks the logical image size within it
    Borrowed { buf: &'a mut [u8], len: usize },
}

impl FrameBuf<'_> {
    /// Logical number of image bytes
    fn len(&self) -> usize {
        match self {
            FrameBuf::Owned(v) => v.len(),
            FrameBuf::Borrowed { len, .. } => *len,
        }
    }

    fn owns_buffer(&self) -> bool {
        matches!(self, FrameBuf::Owned(_))
    }

    fn as_slice(&self) -> &[u8] {
        match self {
            FrameBuf::Owned(v) => v,
            FrameBuf::Borrowed { buf, len } => &buf[..*len],
        }
    }

    fn as_mut_slice(&mut self) -> &mut [u8] {
        match self {
            FrameBuf::Owned(v) => v,
            FrameBuf::Borrowed { buf, len } => &mut buf[..*len],
        }
    }

    /// Size the storage to exactly `need` logical bytes.
    ///
    /// Owned storage is reallocated whenever its size differs; bytes below
    /// the new boundary are preserved. Borrowed storage is never touched:
    /// the call fails if capacity is short, otherwise only the logical
    /// length changes.
    fn ensure_exact(&mut self, need: usize) -> Result<(), FrameError> {
        match self {
            FrameBuf::Owned(v) => {
                if need > v.len() {
                    v.try_reserve_exact(need - v.len())
                        .map_err(|_| FrameError::OutOfMemory { need, have: v.len() })?;
                    v.resize(need, 0);
                } else if need < v.len() {
                    v.truncate(need);
                    v.shrink_to_fit();
                }
                Ok(())
            }
            FrameBuf::Borrowed { buf, len } => {
                if buf.len() < need {
                    return Err(FrameError::OutOfMemory {
                        need,
                        have: buf.len(),
                    });
                }
                *len = need;
                Ok(())
            }
        }
    }
}

/// A captured or converted video frame
#[derive(Debug)]
pub struct Frame<'a> {
    width: u32,
    height: u32,
    format: FrameFormat,
    step: u32,
    data: FrameBuf<'a>,
    metadata: Vec<u8>,
    /// Producer frame counter, copied verbatim by conversions
    pub sequence: u32,
    /// Monotonic timestamp (ns) taken when acquisition began
    pub capture_time: u64,
    /// Monotonic timestamp (ns) taken when the payload completed
    pub capture_time_finished: u64,
    /// Opaque tag of the stream or device that produced the frame.
    /// Provenance only, never dereferenced here.
    pub source_id: u64,
    /// Advisory payload corruption code from acquisition
    pub error_code: PayloadError,
}

impl Frame<'static> {
    /// Allocate a frame that owns its buffer
    ///
    /// The buffer holds `data_bytes` zeroed bytes, or stays unallocated
    /// when `data_bytes` is 0. On allocation failure no frame is returned.
    pub fn alloc(data_bytes: usize) -> Result<Self, FrameError> {
        let mut data = Vec::new();
        if data_bytes > 0 {
            data.try_reserve_exact(data_bytes)
                .map_err(|_| FrameError::OutOfMemory {
                    need: data_bytes,
                    have: 0,
                })?;
            data.resize(data_bytes, 0);
        }
        Ok(Self::empty(FrameBuf::Owned(data)))
    }

    /// Allocate an owned frame already populated with a complete image
    pub fn with_image(
        width: u32,
        height: u32,
        format: FrameFormat,
        pixels: &[u8],
    ) -> Result<Self, FrameError> {
        let mut frame = Self::alloc(pixels.len())?;
        frame.data.as_mut_slice().copy_from_slice(pixels);
        frame.set_geometry(width, height, format);
        Ok(frame)
    }
}

impl<'a> Frame<'a> {
    /// Wrap caller-supplied memory; the buffer is never reallocated or
    /// freed by this library
    pub fn from_buffer(buf: &'a mut [u8]) -> Frame<'a> {
        let len = buf.len();
        Self::empty(FrameBuf::Borrowed { buf, len })
    }

    fn empty(data: FrameBuf<'a>) -> Frame<'a> {
        Frame {
            width: 0,
            height: 0,
            format: FrameFormat::Unknown,
            step: 0,
            data,
            metadata: Vec::new(),
            sequence: 0,
            capture_time: 0,
            capture_time_finished: 0,
            source_id: 0,
            error_code: PayloadError::None,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> FrameFormat {
        self.format
    }

    /// Byte stride of one image row
    pub fn step(&self) -> u32 {
        self.step
    }

    pub fn data(&self) -> &[u8] {
        self.data.as_slice()
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        self.data.as_mut_slice()
    }

    /// Logical size of the image in the buffer
    pub fn data_bytes(&self) -> usize {
        self.data.len()
    }

    /// True when this frame may grow, shrink, and free its buffer
    pub fn owns_buffer(&self) -> bool {
        self.data.owns_buffer()
    }

    pub fn metadata(&self) -> &[u8] {
        &self.metadata
    }

    pub fn metadata_bytes(&self) -> usize {
        self.metadata.len()
    }

    /// Attach side-channel payload metadata, replacing any existing bytes
    pub fn set_metadata(&mut self, bytes: &[u8]) {
        self.metadata.clear();
        self.metadata.extend_from_slice(bytes);
    }

    /// Describe the image carried in the buffer; `step` derives from the
    /// format's bytes-per-pixel, so the four geometry fields stay
    /// consistent as a unit
    pub fn set_geometry(&mut self, width: u32, height: u32, format: FrameFormat) {
        self.width = width;
        self.height = height;
        self.format = format;
        self.step = width * format.bytes_per_pixel() as u32;
    }

    /// Size the pixel buffer for `need_bytes` before writing.
    ///
    /// Owned buffers are resized to exactly `need_bytes` (shrink or grow);
    /// borrowed buffers fail with [`FrameError::OutOfMemory`] when their
    /// capacity is below `need_bytes` and are otherwise left untouched.
    pub fn ensure_size(&mut self, need_bytes: usize) -> Result<(), FrameError> {
        self.data.ensure_exact(need_bytes)
    }

    /// Copy `src` into this frame verbatim, preserving color format
    pub fn duplicate_from(&mut self, src: &Frame<'_>) -> Result<(), FrameError> {
        self.ensure_size(src.data_bytes())?;

        self.width = src.width;
        self.height = src.height;
        self.format = src.format;
        self.step = src.step;
        self.sequence = src.sequence;
        self.capture_time = src.capture_time;
        self.capture_time_finished = src.capture_time_finished;
        self.source_id = src.source_id;

        self.data.as_mut_slice().copy_from_slice(src.data.as_slice());

        if !src.metadata.is_empty() {
            // Metadata capacity grows eagerly and never shrinks, unlike
            // the exact-resize policy of the pixel buffer.
            self.metadata.clear();
            self.metadata
                .try_reserve(src.metadata.len())
                .map_err(|_| FrameError::OutOfMemory {
                    need: src.metadata.len(),
                    have: self.metadata.capacity(),
                })?;
            self.metadata.extend_from_slice(&src.metadata);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterned(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 7 % 256) as u8).collect()
    }

    #[test]
    fn test_alloc_empty() {
        let frame = Frame::alloc(0).unwrap();
        assert!(frame.owns_buffer());
        assert_eq!(frame.data_bytes(), 0);
        assert_eq!(frame.format(), FrameFormat::Unknown);
    }

    #[test]
    fn test_alloc_sized() {
        let frame = Frame::alloc(64).unwrap();
        assert_eq!(frame.data_bytes(), 64);
        assert!(frame.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_ensure_size_exact_resize() {
        let mut frame = Frame::alloc(16).unwrap();
        frame.ensure_size(32).unwrap();
        assert_eq!(frame.data_bytes(), 32);

        frame.ensure_size(8).unwrap();
        assert_eq!(frame.data_bytes(), 8, "owned buffers shrink too");
    }

    #[test]
    fn test_ensure_size_idempotent() {
        let mut frame = Frame::alloc(16).unwrap();
        frame.data_mut().copy_from_slice(&patterned(16));

        frame.ensure_size(16).unwrap();
        frame.ensure_size(16).unwrap();
        assert_eq!(frame.data(), &patterned(16)[..], "contents survive resizing to the same size");
    }

    #[test]
    fn test_ensure_size_preserves_prefix_on_grow() {
        let mut frame = Frame::alloc(8).unwrap();
        frame.data_mut().copy_from_slice(&patterned(8));

        frame.ensure_size(16).unwrap();
        assert_eq!(&frame.data()[..8], &patterned(8)[..]);
        assert!(frame.data()[8..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_borrowed_rejects_growth() {
        let mut storage = [0xAAu8; 64];
        let mut frame = Frame::from_buffer(&mut storage);
        assert!(!frame.owns_buffer());

        let err = frame.ensure_size(65).unwrap_err();
        assert_eq!(err, FrameError::OutOfMemory { need: 65, have: 64 });
        assert_eq!(frame.data_bytes(), 64, "failed sizing leaves the logical size alone");
        assert!(frame.data().iter().all(|&b| b == 0xAA), "buffer untouched");
    }

    #[test]
    fn test_borrowed_logical_resize() {
        let mut storage = [0u8; 64];
        let mut frame = Frame::from_buffer(&mut storage);

        frame.ensure_size(32).unwrap();
        assert_eq!(frame.data_bytes(), 32);

        frame.ensure_size(64).unwrap();
        assert_eq!(frame.data_bytes(), 64);
    }

    #[test]
    fn test_duplicate_copies_everything() {
        let mut src = Frame::with_image(4, 2, FrameFormat::Yuyv, &patterned(16)).unwrap();
        src.sequence = 42;
        src.capture_time = 1_000;
        src.capture_time_finished = 2_000;
        src.source_id = 7;
        src.set_metadata(&[1, 2, 3, 4]);

        let mut dst = Frame::alloc(0).unwrap();
        dst.duplicate_from(&src).unwrap();

        assert_eq!(dst.width(), src.width());
        assert_eq!(dst.height(), src.height());
        assert_eq!(dst.format(), src.format());
        assert_eq!(dst.step(), src.step());
        assert_eq!(dst.sequence, 42);
        assert_eq!(dst.capture_time, 1_000);
        assert_eq!(dst.capture_time_finished, 2_000);
        assert_eq!(dst.source_id, 7);
        assert_eq!(dst.data(), src.data());
        assert_eq!(dst.metadata(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_duplicate_into_borrowed() {
        let src = Frame::with_image(4, 2, FrameFormat::Yuyv, &patterned(16)).unwrap();

        let mut storage = [0u8; 16];
        let mut dst = Frame::from_buffer(&mut storage);
        dst.duplicate_from(&src).unwrap();
        assert_eq!(dst.data(), src.data());

        let mut small = [0u8; 8];
        let mut dst = Frame::from_buffer(&mut small);
        let err = dst.duplicate_from(&src).unwrap_err();
        assert_eq!(err, FrameError::OutOfMemory { need: 16, have: 8 });
    }

    #[test]
    fn test_duplicate_metadata_growth_is_eager() {
        let mut src = Frame::with_image(4, 2, FrameFormat::Yuyv, &patterned(16)).unwrap();
        src.set_metadata(&[9; 12]);

        let mut dst = Frame::alloc(0).unwrap();
        dst.set_metadata(&[0; 32]);
        let capacity_before = 32;

        dst.duplicate_from(&src).unwrap();
        assert_eq!(dst.metadata(), &[9; 12]);
        assert!(
            dst.metadata.capacity() >= capacity_before,
            "metadata capacity never shrinks"
        );
    }

    #[test]
    fn test_duplicate_without_metadata_leaves_dest_metadata() {
        let src = Frame::with_image(4, 2, FrameFormat::Yuyv, &patterned(16)).unwrap();

        let mut dst = Frame::alloc(0).unwrap();
        dst.set_metadata(&[5, 5]);
        dst.duplicate_from(&src).unwrap();
        assert_eq!(dst.metadata(), &[5, 5]);
    }

    #[test]
    fn test_geometry_stays_consistent() {
        let mut frame = Frame::alloc(0).unwrap();
        frame.set_geometry(640, 480, FrameFormat::Rgb);
        assert_eq!(frame.step(), 640 * 3);

        frame.set_geometry(640, 480, FrameFormat::Gray8);
        assert_eq!(frame.step(), 640);
    }
}
