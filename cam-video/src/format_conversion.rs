//! Pixel-format conversion between packed YUV and interleaved RGB/BGR
//!
//! Fixed-point BT.601 kernels operating on 4-byte macropixels (two pixels
//! sharing one chroma pair), unrolled over blocks of 8 source pixels with
//! a scalar tail for the remaining macropixels.

use crate::frame::Frame;
use crate::types::{FrameError, FrameFormat};

/// Source pixels per unrolled block
const BLOCK_PIXELS: usize = 8;
/// Packed 4:2:2 bytes per unrolled block
const BLOCK_YUV_BYTES: usize = BLOCK_PIXELS * 2;
/// Interleaved tri-channel bytes per unrolled block
const BLOCK_RGB_BYTES: usize = BLOCK_PIXELS * 3;

/// Saturate a fixed-point channel value to the representable range
#[inline(always)]
fn sat(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}

/// Fixed-point chroma offsets shared by both pixels of a macropixel
/// (BT.601 coefficients scaled by 2^14)
#[inline(always)]
fn chroma_offsets(cb: u8, cr: u8) -> (i32, i32, i32) {
    let cb = cb as i32 - 128;
    let cr = cr as i32 - 128;
    let r = (22987 * cr) >> 14;
    let g = (-5636 * cb - 11698 * cr) >> 14;
    let b = (29049 * cb) >> 14;
    (r, g, b)
}

/// One YUYV macropixel (Y0 Cb Y1 Cr) to two RGB pixels
#[inline(always)]
fn yuyv_pair_rgb(yuv: &[u8], out: &mut [u8]) {
    let (r, g, b) = chroma_offsets(yuv[1], yuv[3]);
    let y0 = yuv[0] as i32;
    let y1 = yuv[2] as i32;
    out[0] = sat(y0 + r);
    out[1] = sat(y0 + g);
    out[2] = sat(y0 + b);
    out[3] = sat(y1 + r);
    out[4] = sat(y1 + g);
    out[5] = sat(y1 + b);
}

/// One YUYV macropixel to two BGR pixels
#[inline(always)]
fn yuyv_pair_bgr(yuv: &[u8], out: &mut [u8]) {
    let (r, g, b) = chroma_offsets(yuv[1], yuv[3]);
    let y0 = yuv[0] as i32;
    let y1 = yuv[2] as i32;
    out[0] = sat(y0 + b);
    out[1] = sat(y0 + g);
    out[2] = sat(y0 + r);
    out[3] = sat(y1 + b);
    out[4] = sat(y1 + g);
    out[5] = sat(y1 + r);
}

/// One UYVY macropixel (Cb Y0 Cr Y1) to two RGB pixels
#[inline(always)]
fn uyvy_pair_rgb(yuv: &[u8], out: &mut [u8]) {
    let (r, g, b) = chroma_offsets(yuv[0], yuv[2]);
    let y0 = yuv[1] as i32;
    let y1 = yuv[3] as i32;
    out[0] = sat(y0 + r);
    out[1] = sat(y0 + g);
    out[2] = sat(y0 + b);
    out[3] = sat(y1 + r);
    out[4] = sat(y1 + g);
    out[5] = sat(y1 + b);
}

/// One UYVY macropixel to two BGR pixels
#[inline(always)]
fn uyvy_pair_bgr(yuv: &[u8], out: &mut [u8]) {
    let (r, g, b) = chroma_offsets(yuv[0], yuv[2]);
    let y0 = yuv[1] as i32;
    let y1 = yuv[3] as i32;
    out[0] = sat(y0 + b);
    out[1] = sat(y0 + g);
    out[2] = sat(y0 + r);
    out[3] = sat(y1 + b);
    out[4] = sat(y1 + g);
    out[5] = sat(y1 + r);
}

/// Stream packed 4:2:2 bytes into interleaved tri-channel bytes.
///
/// `src` must hold `2 * pixels` and `dst` `3 * pixels` bytes for an even
/// pixel count; both are guaranteed by the calling converter.
fn convert_packed(src: &[u8], dst: &mut [u8], pair: impl Fn(&[u8], &mut [u8])) {
    let blocks = src.len() / BLOCK_YUV_BYTES;
    let (src_blocks, src_tail) = src.split_at(blocks * BLOCK_YUV_BYTES);
    let (dst_blocks, dst_tail) = dst.split_at_mut(blocks * BLOCK_RGB_BYTES);

    // Unrolled fast path, 8 pixels per iteration
    for (sb, db) in src_blocks
        .chunks_exact(BLOCK_YUV_BYTES)
        .zip(dst_blocks.chunks_exact_mut(BLOCK_RGB_BYTES))
    {
        pair(&sb[0..4], &mut db[0..6]);
        pair(&sb[4..8], &mut db[6..12]);
        pair(&sb[8..12], &mut db[12..18]);
        pair(&sb[12..16], &mut db[18..24]);
    }

    // Scalar tail for the remaining macropixels
    for (sp, dp) in src_tail.chunks_exact(4).zip(dst_tail.chunks_exact_mut(6)) {
        pair(sp, dp);
    }
}

/// Format and sizing checks shared by the packed 4:2:2 converters.
/// Returns the source pixel count.
fn check_packed_source(input: &Frame<'_>, expect: FrameFormat) -> Result<usize, FrameError> {
    if input.format() != expect {
        return Err(FrameError::InvalidParameter(input.format()));
    }
    let pixels = input.width() as usize * input.height() as usize;
    if pixels % 2 != 0 {
        // Packed 4:2:2 cannot carry an unpaired luma sample
        return Err(FrameError::InvalidParameter(input.format()));
    }
    if input.data_bytes() < pixels * 2 {
        return Err(FrameError::InvalidParameter(input.format()));
    }
    Ok(pixels)
}

/// Stamp the output with the source geometry in the new format and copy
/// the pass-through fields
pub(crate) fn copy_frame_header(input: &Frame<'_>, output: &mut Frame<'_>, format: FrameFormat) {
    output.set_geometry(input.width(), input.height(), format);
    output.sequence = input.sequence;
    output.capture_time = input.capture_time;
    output.capture_time_finished = input.capture_time_finished;
    output.source_id = input.source_id;
}

/// Convert a YUYV frame to RGB
pub fn yuyv_to_rgb(input: &Frame<'_>, output: &mut Frame<'_>) -> Result<(), FrameError> {
    let pixels = check_packed_source(input, FrameFormat::Yuyv)?;
    output.ensure_size(pixels * 3)?;
    copy_frame_header(input, output, FrameFormat::Rgb);
    convert_packed(&input.data()[..pixels * 2], output.data_mut(), yuyv_pair_rgb);
    Ok(())
}

/// Convert a YUYV frame to BGR
pub fn yuyv_to_bgr(input: &Frame<'_>, output: &mut Frame<'_>) -> Result<(), FrameError> {
    let pixels = check_packed_source(input, FrameFormat::Yuyv)?;
    output.ensure_size(pixels * 3)?;
    copy_frame_header(input, output, FrameFormat::Bgr);
    convert_packed(&input.data()[..pixels * 2], output.data_mut(), yuyv_pair_bgr);
    Ok(())
}

/// Extract the luma plane of a YUYV frame (GRAY8)
pub fn yuyv_to_gray(input: &Frame<'_>, output: &mut Frame<'_>) -> Result<(), FrameError> {
    let pixels = check_packed_source(input, FrameFormat::Yuyv)?;
    output.ensure_size(pixels)?;
    copy_frame_header(input, output, FrameFormat::Gray8);
    let src = &input.data()[..pixels * 2];
    for (pair, dst) in src.chunks_exact(2).zip(output.data_mut().iter_mut()) {
        *dst = pair[0];
    }
    Ok(())
}

/// Extract the interleaved chroma samples of a YUYV frame (GRAY8).
///
/// Diagnostic counterpart of [`yuyv_to_gray`]: takes the Cb/Cr byte of
/// every 2-byte pair instead of the luma byte.
pub fn yuyv_to_chroma(input: &Frame<'_>, output: &mut Frame<'_>) -> Result<(), FrameError> {
    let pixels = check_packed_source(input, FrameFormat::Yuyv)?;
    output.ensure_size(pixels)?;
    copy_frame_header(input, output, FrameFormat::Gray8);
    let src = &input.data()[..pixels * 2];
    for (pair, dst) in src.chunks_exact(2).zip(output.data_mut().iter_mut()) {
        *dst = pair[1];
    }
    Ok(())
}

/// Convert a UYVY frame to RGB
pub fn uyvy_to_rgb(input: &Frame<'_>, output: &mut Frame<'_>) -> Result<(), FrameError> {
    let pixels = check_packed_source(input, FrameFormat::Uyvy)?;
    output.ensure_size(pixels * 3)?;
    copy_frame_header(input, output, FrameFormat::Rgb);
    convert_packed(&input.data()[..pixels * 2], output.data_mut(), uyvy_pair_rgb);
    Ok(())
}

/// Convert a UYVY frame to BGR
pub fn uyvy_to_bgr(input: &Frame<'_>, output: &mut Frame<'_>) -> Result<(), FrameError> {
    let pixels = check_packed_source(input, FrameFormat::Uyvy)?;
    output.ensure_size(pixels * 3)?;
    copy_frame_header(input, output, FrameFormat::Bgr);
    convert_packed(&input.data()[..pixels * 2], output.data_mut(), uyvy_pair_bgr);
    Ok(())
}

/// Convert a frame of any supported format to RGB
pub fn any_to_rgb(input: &Frame<'_>, output: &mut Frame<'_>) -> Result<(), FrameError> {
    match input.format() {
        #[cfg(feature = "jpeg")]
        FrameFormat::Mjpeg => crate::mjpeg::mjpeg_to_rgb(input, output),
        FrameFormat::Yuyv => yuyv_to_rgb(input, output),
        FrameFormat::Uyvy => uyvy_to_rgb(input, output),
        FrameFormat::Rgb => output.duplicate_from(input),
        other => {
            log::debug!("no conversion path from {:?} to RGB", other);
            Err(FrameError::NotSupported(other))
        }
    }
}

/// Convert a frame of any supported format to BGR
pub fn any_to_bgr(input: &Frame<'_>, output: &mut Frame<'_>) -> Result<(), FrameError> {
    match input.format() {
        FrameFormat::Yuyv => yuyv_to_bgr(input, output),
        FrameFormat::Uyvy => uyvy_to_bgr(input, output),
        FrameFormat::Bgr => output.duplicate_from(input),
        other => {
            log::debug!("no conversion path from {:?} to BGR", other);
            Err(FrameError::NotSupported(other))
        }
    }
}
