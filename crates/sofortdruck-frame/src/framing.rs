// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Framing transform — from preview-space pan/zoom to the print canvas.
//
// The preview shows the photo behind a fixed-aspect window; the user pans and
// pinches until the crop looks right. At print time the same framing is
// replayed in printer pixel space: cover-scale the source onto the canvas,
// apply the user's zoom, convert the pan offset from preview points to canvas
// pixels, composite onto white, and rotate for the chosen orientation.

use image::{DynamicImage, Rgba, RgbaImage, imageops};
use tracing::{debug, instrument};

use sofortdruck_core::error::{Result, SofortError};
use sofortdruck_core::types::{Orientation, PrinterModel};

/// Minimum user zoom (1.0 = the cover fit itself).
pub const MIN_SCALE: f32 = 1.0;

/// Maximum user zoom.
pub const MAX_SCALE: f32 = 5.0;

/// User framing input, expressed in on-screen preview coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramingParams {
    /// Uniform zoom on top of the cover fit, clamped to [1.0, 5.0].
    pub scale: f32,
    /// Pan offset in preview points (x, y).
    pub offset: (f32, f32),
    /// Size of the on-screen preview window in points (width, height).
    pub preview_size: (f32, f32),
}

impl FramingParams {
    /// Neutral framing for a preview of the given size: no zoom, no pan.
    pub fn centered(preview_size: (f32, f32)) -> Self {
        Self {
            scale: MIN_SCALE,
            offset: (0.0, 0.0),
            preview_size,
        }
    }
}

/// A transient print job: one photo plus the framing to apply to it.
///
/// Created at print time, consumed by the encoder, discarded after.
#[derive(Debug, Clone)]
pub struct PrintJob {
    pub image: DynamicImage,
    pub model: PrinterModel,
    pub orientation: Orientation,
    pub params: FramingParams,
}

impl PrintJob {
    /// Render this job into the final print canvas.
    pub fn render(&self) -> Result<DynamicImage> {
        render_print_canvas(&self.image, self.model, self.orientation, &self.params)
    }
}

/// Uniform scale factor that makes the source fully cover the canvas while
/// preserving its aspect ratio.
pub fn cover_scale(source: (u32, u32), canvas: (u32, u32)) -> f32 {
    let sx = canvas.0 as f32 / source.0 as f32;
    let sy = canvas.1 as f32 / source.1 as f32;
    sx.max(sy)
}

/// Convert a preview-space pan offset into canvas pixels, independently per
/// axis, by the ratio canvas size / preview size.
pub fn preview_offset_to_canvas(
    offset: (f32, f32),
    preview: (f32, f32),
    canvas: (u32, u32),
) -> (f32, f32) {
    (
        offset.0 * canvas.0 as f32 / preview.0,
        offset.1 * canvas.1 as f32 / preview.1,
    )
}

/// Clamp a canvas-space offset so the rendered image always fully covers the
/// canvas. With no zoom the slack is zero and the offset collapses to (0, 0).
pub fn clamp_offset(offset: (f32, f32), rendered: (u32, u32), canvas: (u32, u32)) -> (f32, f32) {
    let max_dx = (rendered.0.saturating_sub(canvas.0)) as f32 / 2.0;
    let max_dy = (rendered.1.saturating_sub(canvas.1)) as f32 / 2.0;
    (
        offset.0.clamp(-max_dx, max_dx),
        offset.1.clamp(-max_dy, max_dy),
    )
}

/// Rotate an image clockwise by a multiple of 90 degrees.
///
/// 90 and 270 swap width and height; any other value is a no-op.
pub fn rotate_clockwise(image: DynamicImage, degrees: u32) -> DynamicImage {
    match degrees % 360 {
        90 => image.rotate90(),
        180 => image.rotate180(),
        270 => image.rotate270(),
        _ => image,
    }
}

/// Composite the source photo onto the print canvas.
///
/// Steps: cover-fit the source onto the orientation's canvas, apply the user
/// zoom, convert and clamp the pan offset, composite onto a white-filled
/// canvas of exactly the target dimensions, then rotate for the orientation.
/// The white fill guards against any sub-pixel gap at the edges.
#[instrument(skip(source, params), fields(src_w = source.width(), src_h = source.height()))]
pub fn render_print_canvas(
    source: &DynamicImage,
    model: PrinterModel,
    orientation: Orientation,
    params: &FramingParams,
) -> Result<DynamicImage> {
    if source.width() == 0 || source.height() == 0 {
        return Err(SofortError::ImageError("source image is empty".into()));
    }
    if params.preview_size.0 <= 0.0 || params.preview_size.1 <= 0.0 {
        return Err(SofortError::ImageError(format!(
            "invalid preview size {:?}",
            params.preview_size
        )));
    }

    let canvas = orientation.canvas_size(model);
    let (canvas_w, canvas_h) = canvas;

    let base = cover_scale((source.width(), source.height()), canvas);
    let scale = base * params.scale.clamp(MIN_SCALE, MAX_SCALE);

    // Ceil so rounding never leaves the canvas uncovered.
    let rendered_w = (source.width() as f32 * scale).ceil() as u32;
    let rendered_h = (source.height() as f32 * scale).ceil() as u32;

    let offset = preview_offset_to_canvas(params.offset, params.preview_size, canvas);
    let offset = clamp_offset(offset, (rendered_w, rendered_h), canvas);

    debug!(
        canvas_w,
        canvas_h,
        rendered_w,
        rendered_h,
        offset_x = offset.0,
        offset_y = offset.1,
        "compositing print canvas"
    );

    let resized = source.resize_exact(rendered_w, rendered_h, imageops::FilterType::Lanczos3);

    let mut composite: RgbaImage =
        RgbaImage::from_pixel(canvas_w, canvas_h, Rgba([255, 255, 255, 255]));

    // Center, then pan. Coordinates may be negative; `overlay` clips.
    let x = ((canvas_w as f32 - rendered_w as f32) / 2.0 + offset.0).round() as i64;
    let y = ((canvas_h as f32 - rendered_h as f32) / 2.0 + offset.1).round() as i64;
    imageops::overlay(&mut composite, &resized.to_rgba8(), x, y);

    Ok(rotate_clockwise(
        DynamicImage::ImageRgba8(composite),
        orientation.rotation_degrees(),
    ))
}
