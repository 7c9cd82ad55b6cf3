//! C Foreign Function Interface for the camera frame core
//!
//! Exposes frame allocation, population, and format conversion to C
//! callers through opaque handles and integer status codes.

use std::ptr;

use libc::{c_char, c_int};

use cam_video::{any_to_bgr, any_to_rgb, Frame, FrameDesc, FrameError, FrameFormat};

/// Opaque handle to a frame (C-compatible)
pub struct CamFrame {
    _private: [u8; 0],
}

/// Status codes returned by the C API
pub const CAM_OK: c_int = 0;
pub const CAM_ERROR_INVALID_PARAM: c_int = -1;
pub const CAM_ERROR_NO_MEM: c_int = -2;
pub const CAM_ERROR_NOT_SUPPORTED: c_int = -3;
pub const CAM_ERROR_DECODE: c_int = -4;
pub const CAM_ERROR_NULL: c_int = -5;

fn status(result: Result<(), FrameError>) -> c_int {
    match result {
        Ok(()) => CAM_OK,
        Err(FrameError::InvalidParameter(_)) => CAM_ERROR_INVALID_PARAM,
        Err(FrameError::OutOfMemory { .. }) => CAM_ERROR_NO_MEM,
        Err(FrameError::NotSupported(_)) => CAM_ERROR_NOT_SUPPORTED,
        #[cfg(feature = "jpeg")]
        Err(FrameError::Decode(_)) => CAM_ERROR_DECODE,
    }
}

// ============================================================================
// FRAME LIFECYCLE API
// ============================================================================

/// Allocate a frame that owns its buffer
///
/// # Safety
/// The returned pointer must be released with `cam_frame_free` and not
/// used afterwards. Returns null on allocation failure.
#[no_mangle]
pub unsafe extern "C" fn cam_frame_alloc(data_bytes: usize) -> *mut CamFrame {
    match Frame::alloc(data_bytes) {
        Ok(frame) => Box::into_raw(Box::new(frame)) as *mut CamFrame,
        Err(e) => {
            log::warn!("frame allocation failed: {}", e);
            ptr::null_mut()
        }
    }
}

/// Free a frame allocated by this library
///
/// # Safety
/// Caller must ensure ptr came from `cam_frame_alloc` and is not already
/// freed. Null is ignored.
#[no_mangle]
pub unsafe extern "C" fn cam_frame_free(ptr: *mut CamFrame) {
    if !ptr.is_null() {
        let _ = Box::from_raw(ptr as *mut Frame<'static>);
    }
}

/// Populate a frame with a complete image
///
/// # Safety
/// `data` must point to `len` readable bytes (or be null when `len` is 0).
#[no_mangle]
pub unsafe extern "C" fn cam_frame_set_image(
    ptr: *mut CamFrame,
    width: u32,
    height: u32,
    format: u32,
    data: *const u8,
    len: usize,
) -> c_int {
    if ptr.is_null() || (data.is_null() && len > 0) {
        return CAM_ERROR_NULL;
    }
    let Some(format) = FrameFormat::from_u32(format) else {
        return CAM_ERROR_INVALID_PARAM;
    };

    let frame = &mut *(ptr as *mut Frame<'static>);
    if let Err(e) = frame.ensure_size(len) {
        return status(Err(e));
    }
    if len > 0 {
        frame
            .data_mut()
            .copy_from_slice(std::slice::from_raw_parts(data, len));
    }
    frame.set_geometry(width, height, format);
    CAM_OK
}

/// Snapshot the frame geometry into `desc`
///
/// # Safety
/// Caller must ensure both pointers are valid.
#[no_mangle]
pub unsafe extern "C" fn cam_frame_desc(ptr: *const CamFrame, desc: *mut FrameDesc) -> c_int {
    if ptr.is_null() || desc.is_null() {
        return CAM_ERROR_NULL;
    }

    let frame = &*(ptr as *const Frame<'static>);
    *desc = FrameDesc {
        width: frame.width(),
        height: frame.height(),
        format: frame.format() as u32,
        step: frame.step(),
        sequence: frame.sequence,
        data_bytes: frame.data_bytes() as u32,
    };
    CAM_OK
}

/// Borrow the frame's pixel bytes
///
/// # Safety
/// The returned pointer is valid until the next mutating call on the
/// frame. `len_out` receives the logical image size when non-null.
#[no_mangle]
pub unsafe extern "C" fn cam_frame_data(ptr: *const CamFrame, len_out: *mut usize) -> *const u8 {
    if ptr.is_null() {
        return ptr::null();
    }

    let frame = &*(ptr as *const Frame<'static>);
    if !len_out.is_null() {
        *len_out = frame.data_bytes();
    }
    frame.data().as_ptr()
}

// ============================================================================
// FORMAT CONVERSION API
// ============================================================================

/// Convert a frame of any supported format to RGB
///
/// # Safety
/// Caller must ensure both handles are valid and distinct.
#[no_mangle]
pub unsafe extern "C" fn cam_any_to_rgb(input: *const CamFrame, output: *mut CamFrame) -> c_int {
    if input.is_null() || output.is_null() {
        return CAM_ERROR_NULL;
    }

    let input = &*(input as *const Frame<'static>);
    let output = &mut *(output as *mut Frame<'static>);
    status(any_to_rgb(input, output))
}

/// Convert a frame of any supported format to BGR
///
/// # Safety
/// Caller must ensure both handles are valid and distinct.
#[no_mangle]
pub unsafe extern "C" fn cam_any_to_bgr(input: *const CamFrame, output: *mut CamFrame) -> c_int {
    if input.is_null() || output.is_null() {
        return CAM_ERROR_NULL;
    }

    let input = &*(input as *const Frame<'static>);
    let output = &mut *(output as *mut Frame<'static>);
    status(any_to_bgr(input, output))
}

/// Duplicate a frame, preserving color format
///
/// # Safety
/// Caller must ensure both handles are valid and distinct.
#[no_mangle]
pub unsafe extern "C" fn cam_duplicate(input: *const CamFrame, output: *mut CamFrame) -> c_int {
    if input.is_null() || output.is_null() {
        return CAM_ERROR_NULL;
    }

    let input = &*(input as *const Frame<'static>);
    let output = &mut *(output as *mut Frame<'static>);
    status(output.duplicate_from(input))
}

// ============================================================================
// UTILITY FUNCTIONS
// ============================================================================

/// Get library version string
#[no_mangle]
pub extern "C" fn cam_version() -> *const c_char {
    "0.1.0\0".as_ptr() as *const c_char
}

/// Check whether the MJPEG decode path is compiled in
#[no_mangle]
pub extern "C" fn cam_has_jpeg() -> c_int {
    cfg!(feature = "jpeg") as c_int
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytemuck::Zeroable;
    use std::ffi::CStr;

    #[test]
    fn test_frame_alloc_free() {
        unsafe {
            let frame = cam_frame_alloc(64);
            assert!(!frame.is_null());

            let mut desc = FrameDesc::zeroed();
            assert_eq!(cam_frame_desc(frame, &mut desc), CAM_OK);
            assert_eq!(desc.data_bytes, 64);
            assert_eq!(desc.format, FrameFormat::Unknown as u32);

            cam_frame_free(frame);
        }
    }

    #[test]
    fn test_set_image_and_convert() {
        unsafe {
            let input = cam_frame_alloc(0);
            let output = cam_frame_alloc(0);

            // 8x1 pure white YUYV
            let white = [255u8, 128, 255, 128].repeat(4);
            assert_eq!(
                cam_frame_set_image(
                    input,
                    8,
                    1,
                    FrameFormat::Yuyv as u32,
                    white.as_ptr(),
                    white.len()
                ),
                CAM_OK
            );

            assert_eq!(cam_any_to_bgr(input, output), CAM_OK);

            let mut desc = FrameDesc::zeroed();
            assert_eq!(cam_frame_desc(output, &mut desc), CAM_OK);
            assert_eq!(desc.format, FrameFormat::Bgr as u32);
            assert_eq!(desc.data_bytes, 8 * 3);
            assert_eq!(desc.step, 8 * 3);

            let mut len = 0usize;
            let data = cam_frame_data(output, &mut len);
            assert!(!data.is_null());
            let bytes = std::slice::from_raw_parts(data, len);
            assert!(bytes.iter().all(|&b| b == 255));

            cam_frame_free(input);
            cam_frame_free(output);
        }
    }

    #[test]
    fn test_unsupported_conversion_status() {
        unsafe {
            let input = cam_frame_alloc(0);
            let output = cam_frame_alloc(0);

            let gray = [0u8; 16];
            cam_frame_set_image(
                input,
                4,
                4,
                FrameFormat::Gray8 as u32,
                gray.as_ptr(),
                gray.len(),
            );

            assert_eq!(cam_any_to_rgb(input, output), CAM_ERROR_NOT_SUPPORTED);

            cam_frame_free(input);
            cam_frame_free(output);
        }
    }

    #[test]
    fn test_duplicate_round_trip() {
        unsafe {
            let input = cam_frame_alloc(0);
            let output = cam_frame_alloc(0);

            let pixels = [42u8; 24];
            cam_frame_set_image(
                input,
                4,
                2,
                FrameFormat::Rgb as u32,
                pixels.as_ptr(),
                pixels.len(),
            );

            assert_eq!(cam_duplicate(input, output), CAM_OK);

            let mut len = 0usize;
            let data = cam_frame_data(output, &mut len);
            assert_eq!(std::slice::from_raw_parts(data, len), &pixels[..]);

            cam_frame_free(input);
            cam_frame_free(output);
        }
    }

    #[test]
    fn test_null_handling() {
        unsafe {
            assert_eq!(cam_any_to_rgb(ptr::null(), ptr::null_mut()), CAM_ERROR_NULL);
            assert_eq!(cam_frame_desc(ptr::null(), ptr::null_mut()), CAM_ERROR_NULL);
            assert!(cam_frame_data(ptr::null(), ptr::null_mut()).is_null());
            cam_frame_free(ptr::null_mut()); // must be a no-op
        }
    }

    #[test]
    fn test_bad_format_tag() {
        unsafe {
            let frame = cam_frame_alloc(0);
            let data = [0u8; 4];
            assert_eq!(
                cam_frame_set_image(frame, 2, 1, 1000, data.as_ptr(), data.len()),
                CAM_ERROR_INVALID_PARAM
            );
            cam_frame_free(frame);
        }
    }

    #[test]
    fn test_version() {
        unsafe {
            let version = cam_version();
            assert!(!version.is_null());

            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert_eq!(version_str, "0.1.0");
        }
    }

    #[test]
    fn test_jpeg_probe_matches_build() {
        assert_eq!(cam_has_jpeg() != 0, cfg!(feature = "jpeg"));
    }
}
