//! Pre-allocated destination frames to eliminate per-frame allocation churn

use parking_lot::Mutex;

use crate::frame::Frame;
use crate::types::{FrameError, FrameFormat, PayloadError};

/// Pool of pre-allocated owned frames for one format and resolution
pub struct FramePool {
    frames: Mutex<Vec<Frame<'static>>>,
    format: FrameFormat,
    width: u32,
    height: u32,
    capacity: usize,
}

impl FramePool {
    /// Create a pool of `capacity` frames sized for `format` at
    /// `width` x `height`
    pub fn new(
        format: FrameFormat,
        width: u32,
        height: u32,
        capacity: usize,
    ) -> Result<Self, FrameError> {
        let bytes = format.frame_bytes(width, height);
        let mut frames = Vec::with_capacity(capacity);
        for _ in 0..capacity {
            let mut frame = Frame::alloc(bytes)?;
            frame.set_geometry(width, height, format);
            frames.push(frame);
        }

        Ok(FramePool {
            frames: Mutex::new(frames),
            format,
            width,
            height,
            capacity,
        })
    }

    /// Acquire a frame from the pool, or `None` when exhausted
    pub fn acquire(&self) -> Option<Frame<'static>> {
        self.frames.lock().pop()
    }

    /// Release a frame back to the pool.
    ///
    /// The frame's layout is restored to the pool's configured format and
    /// size. Frames that cannot be restored, or that arrive after the pool
    /// is already full, are dropped.
    pub fn release(&self, mut frame: Frame<'static>) {
        let bytes = self.format.frame_bytes(self.width, self.height);
        if frame.ensure_size(bytes).is_err() {
            log::warn!("released frame could not be restored to {} bytes, dropping it", bytes);
            return;
        }
        frame.set_geometry(self.width, self.height, self.format);
        frame.error_code = PayloadError::None;
        frame.set_metadata(&[]);

        let mut frames = self.frames.lock();
        if frames.len() < self.capacity {
            frames.push(frame);
        }
    }

    /// Get pool statistics
    pub fn stats(&self) -> PoolStats {
        let available = self.frames.lock().len();
        PoolStats {
            capacity: self.capacity,
            in_use: self.capacity - available,
            available,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PoolStats {
    pub capacity: usize,
    pub in_use: usize,
    pub available: usize,
}
