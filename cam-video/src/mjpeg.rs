//! MJPEG decode collaborator (`jpeg` feature)
//!
//! Wraps the external JPEG decoder behind the same (input, output) frame
//! contract as the exact converters. Decode internals are the decoder
//! crate's business; this module only polices the frame contract around it.

use jpeg_decoder::{Decoder, PixelFormat as JpegPixelFormat};

use crate::format_conversion::copy_frame_header;
use crate::frame::Frame;
use crate::types::{FrameError, FrameFormat};

/// Convert an MJPEG frame to RGB via the external decoder
pub fn mjpeg_to_rgb(input: &Frame<'_>, output: &mut Frame<'_>) -> Result<(), FrameError> {
    if input.format() != FrameFormat::Mjpeg {
        return Err(FrameError::InvalidParameter(input.format()));
    }

    let mut decoder = Decoder::new(input.data());
    let pixels = decoder
        .decode()
        .map_err(|e| FrameError::Decode(e.to_string()))?;
    let info = decoder
        .info()
        .ok_or_else(|| FrameError::Decode("decoder reported no image info".into()))?;

    if info.pixel_format != JpegPixelFormat::RGB24 {
        return Err(FrameError::Decode(format!(
            "unsupported jpeg pixel format {:?}",
            info.pixel_format
        )));
    }
    if (info.width as u32, info.height as u32) != (input.width(), input.height()) {
        return Err(FrameError::Decode(format!(
            "decoded size {}x{} disagrees with frame header {}x{}",
            info.width,
            info.height,
            input.width(),
            input.height()
        )));
    }

    output.ensure_size(pixels.len())?;
    copy_frame_header(input, output, FrameFormat::Rgb);
    output.data_mut().copy_from_slice(&pixels);

    log::debug!("decoded mjpeg frame {}x{}", info.width, info.height);
    Ok(())
}
