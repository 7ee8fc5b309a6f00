use std::f64::consts::PI;

use crate::config::{MAX_ZOOM, MIN_ZOOM};
use crate::map::geometry::{BBox, Point32};

/// Sphere radius used by the projection, in meters
pub const EARTH_RADIUS: f64 = 6378137.0;

/// Spherical Mercator: geographic degrees to planar meters.
/// Fractional meters are truncated toward zero.
pub fn to_planar(lat: f64, lon: f64) -> Point32 {
    let x = lon.to_radians() * EARTH_RADIUS;
    let y = (PI / 4.0 + lat.to_radians() / 2.0).tan().ln() * EARTH_RADIUS;
    Point32::new(x as i32, y as i32)
}

/// Inverse of [`to_planar`], returns `(lat, lon)` in degrees
pub fn to_geographic(p: Point32) -> (f64, f64) {
    let lon = (p.x as f64 / EARTH_RADIUS).to_degrees();
    let lat = (2.0 * (p.y as f64 / EARTH_RADIUS).exp().atan() - PI / 2.0).to_degrees();
    (lat, lon)
}

/// Project one planar axis value onto the screen, relative to the center
#[inline(always)]
pub fn to_screen_coord(world: i32, center: i32, zoom: u8, half_extent: i32) -> i16 {
    let v = ((world - center) as f64 / zoom as f64).round() + half_extent as f64;
    v.clamp(i16::MIN as f64, i16::MAX as f64) as i16
}

/// Visible planar area: center, zoom and screen size, plus the derived bbox
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    center: Point32,
    /// Meters per pixel (higher = more area shown)
    zoom: u8,
    /// Surface pixel width
    width: u16,
    /// Surface pixel height
    height: u16,
    bbox: BBox,
}

impl Viewport {
    pub fn new(center: Point32, zoom: u8, width: u16, height: u16) -> Self {
        let mut vp = Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            width,
            height,
            bbox: BBox::default(),
        };
        vp.update_bbox();
        vp
    }

    /// Viewport centered on a geographic position
    pub fn at(lat: f64, lon: f64, zoom: u8, width: u16, height: u16) -> Self {
        Self::new(to_planar(lat, lon), zoom, width, height)
    }

    pub fn center(&self) -> Point32 {
        self.center
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn bbox(&self) -> BBox {
        self.bbox
    }

    /// Move the center and recompute the visible box
    pub fn set_center(&mut self, center: Point32) {
        self.center = center;
        self.update_bbox();
    }

    /// Change zoom, clamped to the supported range
    pub fn set_zoom(&mut self, zoom: u8) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.update_bbox();
    }

    /// Update surface size when the display resizes
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.update_bbox();
    }

    /// Pan the viewport by pixel delta. Screen y grows downward, planar y upward.
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let step = self.zoom as i32;
        self.set_center(self.center + Point32::new(dx * step, -dy * step));
    }

    fn update_bbox(&mut self) {
        let zoom = self.zoom as i32;
        let half_w = self.width as i32 * zoom / 2;
        let half_h = self.height as i32 * zoom / 2;
        self.bbox = BBox::new(
            Point32::new(self.center.x - half_w, self.center.y - half_h),
            Point32::new(self.center.x + half_w, self.center.y + half_h),
        );
    }

    /// Project a point given relative to `origin` (e.g. a block offset)
    /// into screen coordinates, Y still pointing up
    #[inline(always)]
    pub fn to_screen(&self, local: Point32, origin: Point32) -> (i32, i32) {
        let center = self.center - origin;
        (
            to_screen_coord(local.x, center.x, self.zoom, self.width as i32 / 2) as i32,
            to_screen_coord(local.y, center.y, self.zoom, self.height as i32 / 2) as i32,
        )
    }
}
