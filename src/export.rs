//! Flattening the layer stack into a single image for download.

#[cfg(test)]
#[path = "export_test.rs"]
mod export_test;

use crate::consts::FALLBACK_BACKGROUND;
use crate::render::Layers;
use crate::surface::{RenderError, Surface};

/// Composite base map, fog, grid, and drawing layers into `target`.
///
/// `target` is resized to the world bounds times `scale`; every layer is
/// stretched to fill it. Without a base map the background is a flat fill.
///
/// # Errors
///
/// Returns `Err` if a surface call fails.
pub fn compose<S: Surface>(
    target: &mut S,
    base: Option<&S::Image>,
    layers: &Layers<S>,
    world_width: f64,
    world_height: f64,
    scale: f64,
) -> Result<(), RenderError> {
    let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
    let (width, height) = export_size(world_width, world_height, scale);
    target.resize(width, height);
    target.clear();

    let (w, h) = (f64::from(width), f64::from(height));
    match base {
        Some(image) => target.draw_image(image, 0.0, 0.0, w, h)?,
        None => {
            target.set_fill(FALLBACK_BACKGROUND);
            target.fill_rect(0.0, 0.0, w, h);
        }
    }
    target.draw_surface(&layers.fog, 0.0, 0.0, w, h)?;
    target.draw_surface(&layers.grid, 0.0, 0.0, w, h)?;
    if let Some(drawing) = &layers.drawing {
        target.draw_surface(drawing, 0.0, 0.0, w, h)?;
    }

    tracing::debug!(width, height, "layers composited for export");
    Ok(())
}

/// Output size in whole pixels, never smaller than 1x1.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn export_size(world_width: f64, world_height: f64, scale: f64) -> (u32, u32) {
    let px = |v: f64| {
        let v = (v * scale).round();
        if v.is_finite() { v.clamp(1.0, f64::from(u32::MAX)) as u32 } else { 1 }
    };
    (px(world_width), px(world_height))
}

/// Download name for an export: `{name}_{timestamp}.webp`.
///
/// `iso_timestamp` is an ISO-8601 string such as `2024-05-01T12:30:45.123Z`;
/// `:` and `.` are replaced with `-` and the result is cut to seconds.
#[must_use]
pub fn export_file_name(name: &str, iso_timestamp: &str) -> String {
    let stamp: String = iso_timestamp.chars().map(|c| if c == ':' || c == '.' { '-' } else { c }).take(19).collect();
    let name = if name.trim().is_empty() { "map" } else { name };
    format!("{name}_{stamp}.webp")
}
