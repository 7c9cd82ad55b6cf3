//! Camera frame processing core
//!
//! Frame buffer lifecycle and pixel-format conversion for packed YUV
//! camera payloads.
//!
//! Key pieces:
//! - Owned/borrowed frame buffers with an explicit sizing contract
//! - Fixed-point BT.601 conversion kernels (block-of-8 unrolled loops)
//! - Format dispatch with pass-through duplication
//! - Frame pooling to reduce allocation churn

pub mod format_conversion;
pub mod frame;
pub mod frame_pool;
#[cfg(feature = "jpeg")]
pub mod mjpeg;
pub mod types;

pub use format_conversion::*;
pub use frame::*;
pub use frame_pool::*;
#[cfg(feature = "jpeg")]
pub use mjpeg::*;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_format_strides() {
        assert_eq!(FrameFormat::Yuyv.bytes_per_pixel(), 2);
        assert_eq!(FrameFormat::Rgb.bytes_per_pixel(), 3);
        assert!(!FrameFormat::Mjpeg.is_packed());
    }
}
