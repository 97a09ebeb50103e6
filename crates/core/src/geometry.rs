//! Render-scale resolution and screen/PDF coordinate mapping.
//!
//! The edit layer works in screen pixels with a top-left origin; PDF pages
//! use points with a bottom-left origin. Everything here is a pure function
//! of the page size, the viewport width, and the scale in effect.

use pdf_overlay_engine::PageSize;

/// Preferred render scale when the viewport has room for it.
pub const BASE_SCALE: f32 = 1.5;

/// Horizontal pixel budget for the page container at a given viewport width.
pub fn container_budget(viewport_width: f32) -> f32 {
    if viewport_width < 480.0 {
        viewport_width * 0.98
    } else if viewport_width < 768.0 {
        viewport_width * 0.95
    } else if viewport_width < 1024.0 {
        viewport_width * 0.90
    } else {
        900.0
    }
}

/// Resolved raster geometry for one page at one viewport width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderGeometry {
    pub render_scale: f32,
    pub pixel_width: f32,
    pub pixel_height: f32,
}

impl RenderGeometry {
    /// Scale the page to [`BASE_SCALE`], shrinking only when the scaled width
    /// would exceed the container budget. Aspect ratio is always preserved.
    pub fn resolve(page: PageSize, viewport_width: f32) -> Self {
        let budget = container_budget(viewport_width);
        let render_scale = if page.width_pt * BASE_SCALE > budget {
            budget / page.width_pt
        } else {
            BASE_SCALE
        };

        Self {
            render_scale,
            pixel_width: page.width_pt * render_scale,
            pixel_height: page.height_pt * render_scale,
        }
    }
}

/// Screen x (pixels from the left edge) to PDF x (points).
pub fn to_pdf_x(left: f32, scale: f32) -> f32 {
    left / scale
}

/// Screen top to the PDF y of the drawn object's bottom edge.
///
/// `extent` is the object's drawn height in screen pixels (font size for
/// text, display height for images).
pub fn to_pdf_y(top: f32, extent: f32, page_height_pt: f32, scale: f32) -> f32 {
    page_height_pt - top / scale - extent / scale
}

/// Inverse of [`to_pdf_x`].
pub fn to_screen_x(pdf_x: f32, scale: f32) -> f32 {
    pdf_x * scale
}

/// Inverse of [`to_pdf_y`].
pub fn to_screen_top(pdf_y: f32, extent: f32, page_height_pt: f32, scale: f32) -> f32 {
    (page_height_pt - pdf_y) * scale - extent
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_budget_follows_breakpoints() {
        assert_eq!(container_budget(400.0), 400.0 * 0.98);
        assert_eq!(container_budget(600.0), 600.0 * 0.95);
        assert_eq!(container_budget(800.0), 800.0 * 0.90);
        assert_eq!(container_budget(1024.0), 900.0);
        assert_eq!(container_budget(1920.0), 900.0);
    }

    #[test]
    fn wide_viewport_uses_base_scale() {
        let geometry =
            RenderGeometry::resolve(PageSize { width_pt: 595.0, height_pt: 842.0 }, 1280.0);
        assert_eq!(geometry.render_scale, BASE_SCALE);
        assert_eq!(geometry.pixel_width, 595.0 * 1.5);
        assert_eq!(geometry.pixel_height, 842.0 * 1.5);
    }

    #[test]
    fn narrow_viewport_shrinks_to_fit_budget() {
        let page = PageSize { width_pt: 612.0, height_pt: 792.0 };
        let geometry = RenderGeometry::resolve(page, 400.0);

        let budget = 400.0 * 0.98;
        assert!((geometry.render_scale - budget / 612.0).abs() < 1e-6);
        assert!((geometry.pixel_width - budget).abs() < 1e-3);
        // Aspect ratio preserved.
        let ratio = geometry.pixel_height / geometry.pixel_width;
        assert!((ratio - 792.0 / 612.0).abs() < 1e-4);
    }

    #[test]
    fn screen_and_pdf_conversions_are_inverses() {
        let scale = 1.5;
        let page_h = 792.0;
        for (left, top, extent) in [(0.0, 0.0, 16.0), (100.0, 100.0, 16.0), (453.2, 871.9, 48.5)]
        {
            let x = to_pdf_x(left, scale);
            let y = to_pdf_y(top, extent, page_h, scale);
            assert!((to_screen_x(x, scale) - left).abs() < 1e-3);
            assert!((to_screen_top(y, extent, page_h, scale) - top).abs() < 1e-3);
        }
    }

    #[test]
    fn known_projection_values() {
        // Screen (100, 100), font size 16, scale 1.5, US Letter page.
        let x = to_pdf_x(100.0, 1.5);
        let y = to_pdf_y(100.0, 16.0, 792.0, 1.5);
        assert!((x - 66.6667).abs() < 0.01);
        assert!((y - 714.6667).abs() < 0.01);
    }
}
