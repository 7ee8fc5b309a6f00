use log::debug;
use std::time::Instant;

use crate::map::block::{MapBlock, Polygon, Polyline};
use crate::map::geometry::{BBox, Point16, Point32};
use crate::map::projection::Viewport;
use crate::map::source::BlockSource;
use crate::map::view::MapView;
use crate::surface::{Rgb565, Surface};

/// What a redraw painted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub blocks: usize,
    pub polygons: usize,
    pub polylines: usize,
    /// Features skipped by zoom, bbox or emptiness
    pub culled: usize,
}

impl<S: BlockSource> MapView<S> {
    /// Paint the in-view resident blocks of this view
    pub fn render(&self, surface: &mut impl Surface) -> RenderStats {
        render(self.viewport(), self.cache().blocks(), surface)
    }
}

/// Paint every in-view block onto `surface`, in the order given, then the
/// position marker. Within a block, polygons go first so lines stay on top.
pub fn render<'a>(
    viewport: &Viewport,
    blocks: impl IntoIterator<Item = &'a MapBlock>,
    surface: &mut impl Surface,
) -> RenderStats {
    let started = Instant::now();
    let mut stats = RenderStats::default();
    let mut scratch: Vec<(i32, i32)> = Vec::new();
    let mut nodes: Vec<i32> = Vec::new();

    surface.fill_background(Rgb565::BACKGROUND);

    for block in blocks.into_iter().filter(|b| b.in_view) {
        stats.blocks += 1;
        // Viewport box in the block's own coordinates
        let local_bbox = viewport.bbox() - block.offset;

        for polygon in &block.polygons {
            if !feature_visible(viewport, polygon.max_zoom, polygon, &local_bbox) {
                stats.culled += 1;
                continue;
            }
            project_into(viewport, block.offset, &polygon.points, &mut scratch);
            fill_polygon(
                &scratch,
                polygon.color,
                viewport.width() as i32,
                viewport.height() as i32,
                &mut nodes,
                surface,
            );
            stats.polygons += 1;
        }

        for line in &block.polylines {
            if !feature_visible(viewport, line.max_zoom, line, &local_bbox) {
                stats.culled += 1;
                continue;
            }
            project_into(viewport, block.offset, &line.points, &mut scratch);
            let width = (line.width / viewport.zoom()).max(1) as i32;
            stroke_polyline(
                &scratch,
                width,
                line.color,
                viewport.width() as i32,
                viewport.height() as i32,
                surface,
            );
            stats.polylines += 1;
        }
    }

    draw_position_marker(viewport, surface);

    debug!(
        "rendered {} blocks, {} polygons, {} polylines ({} culled) in {:?}",
        stats.blocks,
        stats.polygons,
        stats.polylines,
        stats.culled,
        started.elapsed()
    );
    stats
}

/// Bounding box and point list shared by both feature kinds
trait Feature {
    fn bbox(&self) -> BBox;
    fn is_empty(&self) -> bool;
}

impl Feature for Polygon {
    fn bbox(&self) -> BBox {
        self.bbox
    }
    fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl Feature for Polyline {
    fn bbox(&self) -> BBox {
        self.bbox
    }
    fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Zoom threshold, emptiness and bbox overlap, all in block-local space
fn feature_visible(
    viewport: &Viewport,
    max_zoom: u8,
    feature: &impl Feature,
    local_bbox: &BBox,
) -> bool {
    viewport.zoom() <= max_zoom && !feature.is_empty() && feature.bbox().intersects(local_bbox)
}

/// Project block-local points to screen space (Y up) into `out`
fn project_into(
    viewport: &Viewport,
    offset: Point32,
    points: &[Point16],
    out: &mut Vec<(i32, i32)>,
) {
    out.clear();
    out.extend(
        points
            .iter()
            .map(|p| viewport.to_screen(Point32::new(p.x as i32, p.y as i32), offset)),
    );
}

/// Scanline polygon fill on screen-space points with Y pointing up.
///
/// Each row collects crossings of edges with `min_y <= row < max_y`
/// (closing edge included), sorts them and fills pairs 0-1, 2-3, ...
/// Rows are painted at `height - row`.
///
/// A second pass then strokes every edge in the fill color. The half-open
/// rule alone leaves out horizontal edges that bound the shape from above;
/// the stroke adds them back, along with a 1px wall on every other edge,
/// including the floor of a concave notch.
pub fn fill_polygon(
    points: &[(i32, i32)],
    color: Rgb565,
    width: i32,
    height: i32,
    nodes: &mut Vec<i32>,
    surface: &mut impl Surface,
) {
    let n = points.len();
    if n == 0 || width <= 0 || height <= 0 {
        return;
    }

    let (mut min_y, mut max_y) = (i32::MAX, i32::MIN);
    for &(_, y) in points {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    let min_y = min_y.max(0);
    let max_y = max_y.min(height - 1);

    for row in min_y..=max_y {
        nodes.clear();
        for i in 0..n {
            let (x0, y0) = points[i];
            let (x1, y1) = points[(i + 1) % n];
            if (y0 <= row && row < y1) || (y1 <= row && row < y0) {
                let t = (row - y0) as f64 / (y1 - y0) as f64;
                nodes.push((x0 as f64 + t * (x1 - x0) as f64) as i32);
            }
        }
        nodes.sort_unstable();

        let y = height - row;
        for pair in nodes.chunks_exact(2) {
            let (a, b) = (pair[0], pair[1]);
            if a > width - 1 {
                break;
            }
            if b < 0 {
                continue;
            }
            surface.draw_line(a.max(0), y, b.min(width - 1), y, color);
        }
    }

    for i in 0..n {
        let (x0, y0) = points[i];
        let (x1, y1) = points[(i + 1) % n];
        let (y0, y1) = (height - y0, height - y1);
        if segment_might_be_visible(x0, y0, x1, y1, width, height) {
            surface.draw_line(x0, y0, x1, y1, color);
        }
    }
}

/// Stroke consecutive points (Y up). Wider strokes are drawn as parallel
/// lines stacked across the segment's minor axis.
pub fn stroke_polyline(
    points: &[(i32, i32)],
    stroke: i32,
    color: Rgb565,
    width: i32,
    height: i32,
    surface: &mut impl Surface,
) {
    let stroke = stroke.max(1);
    for seg in points.windows(2) {
        let (x0, y0) = seg[0];
        let (x1, y1) = seg[1];
        let (y0, y1) = (height - y0, height - y1);
        if !segment_might_be_visible(x0, y0, x1, y1, width + stroke, height + stroke) {
            continue;
        }
        if stroke == 1 {
            surface.draw_line(x0, y0, x1, y1, color);
            continue;
        }
        let steep = (y1 - y0).abs() > (x1 - x0).abs();
        for k in -(stroke - 1) / 2..=stroke / 2 {
            if steep {
                surface.draw_line(x0 + k, y0, x1 + k, y1, color);
            } else {
                surface.draw_line(x0, y0 + k, x1, y1 + k, color);
            }
        }
    }
}

/// Rough bounding box check against a `width` x `height` surface
#[inline(always)]
fn segment_might_be_visible(x0: i32, y0: i32, x1: i32, y1: i32, width: i32, height: i32) -> bool {
    x0.max(x1) >= 0 && x0.min(x1) < width && y0.max(y1) >= 0 && y0.min(y1) < height
}

/// Small upright triangle at the screen center
fn draw_position_marker(viewport: &Viewport, surface: &mut impl Surface) {
    let cx = viewport.width() as i32 / 2;
    let cy = viewport.height() as i32 / 2;
    surface.fill_triangle(cx - 4, cy + 5, cx + 4, cy + 5, cx, cy - 6, Rgb565::RED);
}
