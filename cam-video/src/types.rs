//! Frame data types and constants

use bytemuck::{Pod, Zeroable};
use thiserror::Error;

/// Pixel format enumeration
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameFormat {
    #[default]
    Unknown = 0,
    Yuyv = 1,   // Packed YUV 4:2:2, Y0 Cb Y1 Cr byte order
    Uyvy = 2,   // Packed YUV 4:2:2, Cb Y0 Cr Y1 byte order
    Rgb = 3,    // Packed RGB 24-bit
    Bgr = 4,    // Packed BGR 24-bit
    Gray8 = 5,  // Grayscale, one byte per pixel
    Gray16 = 6, // Grayscale, two bytes per pixel
    Nv12 = 7,   // Semi-planar YUV 4:2:0 (Y plane, interleaved UV)
    Mjpeg = 8,  // Motion-JPEG compressed
    H264 = 9,   // H.264 compressed
}

impl FrameFormat {
    /// Returns bytes per pixel for packed raw formats (0 for planar or compressed)
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            FrameFormat::Rgb | FrameFormat::Bgr => 3,
            FrameFormat::Yuyv | FrameFormat::Uyvy | FrameFormat::Gray16 => 2,
            FrameFormat::Gray8 => 1,
            _ => 0, // Planar or compressed formats
        }
    }

    /// Check if format is a raw packed format with a fixed row stride
    pub fn is_packed(self) -> bool {
        self.bytes_per_pixel() != 0
    }

    /// Calculate frame size in bytes
    pub fn frame_bytes(self, width: u32, height: u32) -> usize {
        let pixels = width as usize * height as usize;
        match self {
            FrameFormat::Nv12 => pixels + pixels / 2,
            _ => pixels * self.bytes_per_pixel(),
        }
    }

    /// Convert a raw tag as carried over the FFI boundary
    pub fn from_u32(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(FrameFormat::Unknown),
            1 => Some(FrameFormat::Yuyv),
            2 => Some(FrameFormat::Uyvy),
            3 => Some(FrameFormat::Rgb),
            4 => Some(FrameFormat::Bgr),
            5 => Some(FrameFormat::Gray8),
            6 => Some(FrameFormat::Gray16),
            7 => Some(FrameFormat::Nv12),
            8 => Some(FrameFormat::Mjpeg),
            9 => Some(FrameFormat::H264),
            _ => None,
        }
    }
}

/// Payload-level corruption detected while a frame was assembled.
///
/// Advisory only: the producer stamps it, conversion tolerates a non-`None`
/// code and never repairs it.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadError {
    #[default]
    None = 0,
    /// Payload header length field disagrees with the packet
    HeaderLength = 1,
    /// Reserved header bits were set
    ReservedBits = 2,
    /// End-of-packet flag seen mid-frame
    EndOfPacket = 3,
    /// Frame identifier toggled mid-frame
    FrameIdMismatch = 4,
}

/// Sizing and conversion errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// Source format, dimensions, or buffer disagree with what the converter expects
    #[error("invalid source frame in format {0:?}")]
    InvalidParameter(FrameFormat),
    /// A frame buffer could not be sized as required. For an owned buffer
    /// `have` is the size the failed grow started from; for a borrowed one
    /// it is the fixed capacity.
    #[error("cannot size frame buffer to {need} bytes (have {have})")]
    OutOfMemory { need: usize, have: usize },
    /// No conversion path exists from the source format
    #[error("no conversion path from {0:?}")]
    NotSupported(FrameFormat),
    /// The MJPEG decode collaborator rejected the payload
    #[cfg(feature = "jpeg")]
    #[error("jpeg decode failed: {0}")]
    Decode(String),
}

/// Frame geometry snapshot (C-compatible)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct FrameDesc {
    pub width: u32,
    pub height: u32,
    pub format: u32, // FrameFormat as u32
    pub step: u32,
    pub sequence: u32,
    pub data_bytes: u32,
}
