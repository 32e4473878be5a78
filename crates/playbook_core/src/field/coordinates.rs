//! Coordinate system conversions
//!
//! ## Coordinate Systems
//!
//! **Field coordinates** (yards, used by every model):
//! - x: 0 = left edge of the left end zone, 120 = right edge (LENGTH)
//! - y: 0 = top sideline, 53.33 = bottom sideline (WIDTH)
//!
//! **Canvas pixels** (drawing): `base = (x * yard_to_pixel, y * height / 53.33)`,
//! then the viewport transform `canvas = (base + pan) * zoom`. This is the
//! order a 2D context applies `scale(zoom)` followed by `translate(pan)`.
//!
//! **Screen fraction** (pointer drag over the overlay): the pointer is mapped
//! linearly against the container's bounding rectangle, ignoring zoom/pan.

use crate::config::FieldConfig;
use crate::error::{PlaybookError, Result};
use crate::models::player::FieldPos;
use serde::{Deserialize, Serialize};

/// Field length including both end zones (yards)
pub const FIELD_LENGTH_YD: f64 = 120.0;
/// Sideline to sideline (yards)
pub const FIELD_WIDTH_YD: f64 = 53.33;

pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 3.0;

/// A point in pixel space (canvas or screen, depending on context).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct PixelPos {
    pub x: f64,
    pub y: f64,
}

impl PixelPos {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { zoom: 1.0, pan_x: 0.0, pan_y: 0.0 }
    }
}

impl Viewport {
    pub fn new(zoom: f64, pan_x: f64, pan_y: f64) -> Result<Self> {
        let viewport = Self { zoom, pan_x, pan_y };
        viewport.check()?;
        Ok(viewport)
    }

    /// Clamps to [`MIN_ZOOM`, `MAX_ZOOM`]. Non-finite input is ignored.
    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        }
    }

    pub fn set_pan(&mut self, pan_x: f64, pan_y: f64) {
        self.pan_x = pan_x;
        self.pan_y = pan_y;
    }

    fn check(&self) -> Result<()> {
        if !self.zoom.is_finite() || self.zoom <= 0.0 {
            return Err(PlaybookError::geometry(format!("zoom must be positive, got {}", self.zoom)));
        }
        if !self.pan_x.is_finite() || !self.pan_y.is_finite() {
            return Err(PlaybookError::geometry("pan must be finite"));
        }
        Ok(())
    }
}

/// On-screen bounding rectangle of the field container.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct ContainerRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ContainerRect {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    fn check(&self) -> Result<()> {
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(PlaybookError::geometry(format!(
                "container width must be positive, got {}",
                self.width
            )));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(PlaybookError::geometry(format!(
                "container height must be positive, got {}",
                self.height
            )));
        }
        Ok(())
    }
}

/// Canvas-space conversions for one canvas size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    canvas_width: f64,
    canvas_height: f64,
    yard_to_pixel: f64,
}

impl Default for CoordinateMapper {
    fn default() -> Self {
        Self::from_config(&FieldConfig::default())
    }
}

impl CoordinateMapper {
    pub fn new(canvas_width: f64, canvas_height: f64, yard_to_pixel: f64) -> Result<Self> {
        for (name, value) in
            [("canvas width", canvas_width), ("canvas height", canvas_height), ("yard scale", yard_to_pixel)]
        {
            if !value.is_finite() || value <= 0.0 {
                return Err(PlaybookError::geometry(format!("{} must be positive, got {}", name, value)));
            }
        }
        Ok(Self { canvas_width, canvas_height, yard_to_pixel })
    }

    /// Config values are validated by `PlaybookConfig::validate`.
    pub fn from_config(config: &FieldConfig) -> Self {
        Self {
            canvas_width: config.canvas_width,
            canvas_height: config.canvas_height,
            yard_to_pixel: config.yard_to_pixel,
        }
    }

    pub fn canvas_size(&self) -> (f64, f64) {
        (self.canvas_width, self.canvas_height)
    }

    fn y_scale(&self) -> f64 {
        self.canvas_height / FIELD_WIDTH_YD
    }

    pub fn field_to_canvas(&self, pos: FieldPos, viewport: &Viewport) -> PixelPos {
        let base_x = pos.x * self.yard_to_pixel;
        let base_y = pos.y * self.y_scale();
        PixelPos {
            x: (base_x + viewport.pan_x) * viewport.zoom,
            y: (base_y + viewport.pan_y) * viewport.zoom,
        }
    }

    /// Exact inverse of [`field_to_canvas`](Self::field_to_canvas).
    pub fn canvas_to_field(&self, canvas: PixelPos, viewport: &Viewport) -> Result<FieldPos> {
        viewport.check()?;
        if self.canvas_height <= 0.0 || self.yard_to_pixel <= 0.0 {
            return Err(PlaybookError::geometry("degenerate canvas dimensions"));
        }
        let base_x = canvas.x / viewport.zoom - viewport.pan_x;
        let base_y = canvas.y / viewport.zoom - viewport.pan_y;
        Ok(FieldPos { x: base_x / self.yard_to_pixel, y: base_y / self.y_scale() })
    }

    /// Page-space pointer over the canvas element → field.
    pub fn screen_to_field(
        &self,
        screen: PixelPos,
        viewport: &Viewport,
        rect: &ContainerRect,
    ) -> Result<FieldPos> {
        rect.check()?;
        self.canvas_to_field(PixelPos::new(screen.x - rect.left, screen.y - rect.top), viewport)
    }
}

/// Pointer position → field, linear against the container rectangle.
pub fn screen_to_field_fraction(screen: PixelPos, rect: &ContainerRect) -> Result<FieldPos> {
    rect.check()?;
    let fx = (screen.x - rect.left) / rect.width;
    let fy = (screen.y - rect.top) / rect.height;
    Ok(FieldPos { x: fx * FIELD_LENGTH_YD, y: fy * FIELD_WIDTH_YD })
}

/// Inverse of [`screen_to_field_fraction`].
pub fn field_to_screen_fraction(pos: FieldPos, rect: &ContainerRect) -> Result<PixelPos> {
    rect.check()?;
    Ok(PixelPos {
        x: (pos.x / FIELD_LENGTH_YD) * rect.width + rect.left,
        y: (pos.y / FIELD_WIDTH_YD) * rect.height + rect.top,
    })
}

pub fn clamp_to_field(pos: FieldPos) -> FieldPos {
    FieldPos { x: pos.x.clamp(0.0, FIELD_LENGTH_YD), y: pos.y.clamp(0.0, FIELD_WIDTH_YD) }
}

/// `round(v / grid) * grid` on both axes. A non-positive grid is a no-op.
pub fn snap_to_grid(pos: FieldPos, grid_size: f64) -> FieldPos {
    if !(grid_size.is_finite() && grid_size > 0.0) {
        return pos;
    }
    FieldPos {
        x: (pos.x / grid_size).round() * grid_size,
        y: (pos.y / grid_size).round() * grid_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_to_canvas_identity_viewport() {
        let mapper = CoordinateMapper::default();
        let px = mapper.field_to_canvas(FieldPos::new(60.0, FIELD_WIDTH_YD), &Viewport::default());
        assert!((px.x - 600.0).abs() < 1e-9);
        assert!((px.y - 533.0).abs() < 1e-9);
    }

    #[test]
    fn test_pan_is_applied_before_zoom() {
        let mapper = CoordinateMapper::default();
        let viewport = Viewport::new(2.0, 10.0, -5.0).unwrap();
        let px = mapper.field_to_canvas(FieldPos::new(1.0, 0.0), &viewport);
        assert!((px.x - 40.0).abs() < 1e-9);
        assert!((px.y + 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_screen_to_field_subtracts_container_origin() {
        let mapper = CoordinateMapper::default();
        let rect = ContainerRect::new(100.0, 50.0, 1200.0, 533.0);
        let pos = mapper
            .screen_to_field(PixelPos::new(700.0, 50.0), &Viewport::default(), &rect)
            .unwrap();
        assert!((pos.x - 60.0).abs() < 1e-9);
        assert!(pos.y.abs() < 1e-9);
    }

    #[test]
    fn test_zero_zoom_is_geometry_error() {
        let mapper = CoordinateMapper::default();
        let viewport = Viewport { zoom: 0.0, pan_x: 0.0, pan_y: 0.0 };
        let err = mapper.canvas_to_field(PixelPos::new(10.0, 10.0), &viewport).unwrap_err();
        assert!(matches!(err, PlaybookError::Geometry(_)));
        assert!(Viewport::new(0.0, 0.0, 0.0).is_err());
    }

    #[test]
    fn test_set_zoom_clamps() {
        let mut viewport = Viewport::default();
        viewport.set_zoom(10.0);
        assert_eq!(viewport.zoom, MAX_ZOOM);
        viewport.set_zoom(0.1);
        assert_eq!(viewport.zoom, MIN_ZOOM);
        viewport.set_zoom(f64::NAN);
        assert_eq!(viewport.zoom, MIN_ZOOM);
    }

    #[test]
    fn test_fraction_mapping() {
        let rect = ContainerRect::new(20.0, 10.0, 600.0, 266.65);
        let pos = screen_to_field_fraction(PixelPos::new(320.0, 143.325), &rect).unwrap();
        assert!((pos.x - 60.0).abs() < 1e-9);
        assert!((pos.y - FIELD_WIDTH_YD / 2.0).abs() < 1e-9);

        let back = field_to_screen_fraction(pos, &rect).unwrap();
        assert!((back.x - 320.0).abs() < 1e-9);
        assert!((back.y - 143.325).abs() < 1e-9);
    }

    #[test]
    fn test_zero_sized_rect_is_geometry_error() {
        let rect = ContainerRect::new(0.0, 0.0, 0.0, 300.0);
        assert!(matches!(
            screen_to_field_fraction(PixelPos::new(1.0, 1.0), &rect),
            Err(PlaybookError::Geometry(_))
        ));
        let rect = ContainerRect::new(0.0, 0.0, 300.0, 0.0);
        assert!(field_to_screen_fraction(FieldPos::new(1.0, 1.0), &rect).is_err());
    }

    #[test]
    fn test_degenerate_mapper_rejected() {
        assert!(CoordinateMapper::new(1200.0, 0.0, 10.0).is_err());
        assert!(CoordinateMapper::new(1200.0, 533.0, 10.0).is_ok());
    }

    #[test]
    fn test_snap_and_clamp() {
        assert_eq!(snap_to_grid(FieldPos::new(10.4, 26.6), 1.0), FieldPos::new(10.0, 27.0));
        assert_eq!(snap_to_grid(FieldPos::new(10.4, 26.6), 0.5), FieldPos::new(10.5, 26.5));
        assert_eq!(snap_to_grid(FieldPos::new(10.4, 26.6), 0.0), FieldPos::new(10.4, 26.6));
        assert_eq!(clamp_to_field(FieldPos::new(-3.0, 60.0)), FieldPos::new(0.0, FIELD_WIDTH_YD));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: canvas_to_field inverts field_to_canvas for every viewport
            #[test]
            fn prop_canvas_round_trip(
                x in 0.0f64..=FIELD_LENGTH_YD,
                y in 0.0f64..=FIELD_WIDTH_YD,
                zoom in MIN_ZOOM..=MAX_ZOOM,
                pan_x in -500.0f64..500.0,
                pan_y in -500.0f64..500.0,
            ) {
                let mapper = CoordinateMapper::default();
                let viewport = Viewport::new(zoom, pan_x, pan_y).unwrap();
                let canvas = mapper.field_to_canvas(FieldPos::new(x, y), &viewport);
                let back = mapper.canvas_to_field(canvas, &viewport).unwrap();
                prop_assert!((back.x - x).abs() < 1e-6);
                prop_assert!((back.y - y).abs() < 1e-6);
            }

            /// Property: the fraction path round-trips for any non-degenerate rect
            #[test]
            fn prop_fraction_round_trip(
                x in 0.0f64..=FIELD_LENGTH_YD,
                y in 0.0f64..=FIELD_WIDTH_YD,
                left in -100.0f64..100.0,
                width in 1.0f64..2000.0,
                height in 1.0f64..1000.0,
            ) {
                let rect = ContainerRect::new(left, 0.0, width, height);
                let screen = field_to_screen_fraction(FieldPos::new(x, y), &rect).unwrap();
                let back = screen_to_field_fraction(screen, &rect).unwrap();
                prop_assert!((back.x - x).abs() < 1e-6);
                prop_assert!((back.y - y).abs() < 1e-6);
            }
        }
    }
}
