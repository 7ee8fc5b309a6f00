use crate::config::MAX_ZOOM;
use crate::map::geometry::{BBox, Point16, Point32};
use crate::surface::Rgb565;

/// Stroked line feature. Points are block-local.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub points: Vec<Point16>,
    pub bbox: BBox,
    pub color: Rgb565,
    /// Stroke width in meters-per-pixel units at zoom 1
    pub width: u8,
    /// Hidden when the current zoom is above this
    pub max_zoom: u8,
}

impl Default for Polyline {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            bbox: BBox::default(),
            color: Rgb565::BLACK,
            width: 1,
            max_zoom: MAX_ZOOM,
        }
    }
}

/// Filled area feature. The last point implicitly connects to the first.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub points: Vec<Point16>,
    pub bbox: BBox,
    pub color: Rgb565,
    pub max_zoom: u8,
}

impl Default for Polygon {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            bbox: BBox::default(),
            color: Rgb565::BLACK,
            max_zoom: MAX_ZOOM,
        }
    }
}

/// One square map shard, backed by one block file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapBlock {
    /// Min (south-west) corner, aligned to the block size
    pub offset: Point32,
    /// Whether the last visibility pass asked for this block
    pub in_view: bool,
    pub polygons: Vec<Polygon>,
    pub polylines: Vec<Polyline>,
}

impl MapBlock {
    /// Total vertices held by this block
    pub fn point_count(&self) -> usize {
        self.polygons.iter().map(|p| p.points.len()).sum::<usize>()
            + self.polylines.iter().map(|l| l.points.len()).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty() && self.polylines.is_empty()
    }
}
