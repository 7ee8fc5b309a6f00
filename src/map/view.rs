use log::{debug, warn};

use crate::error::BlockError;
use crate::map::cache::{resolve, BlockCache};
use crate::map::geometry::Point32;
use crate::map::projection::{to_planar, Viewport};
use crate::map::source::BlockSource;

/// Outcome of one visibility pass
#[derive(Debug, Default)]
pub struct Visibility {
    /// Offsets the viewport corners resolved to, in corner order
    pub resolved: Vec<Point32>,
    /// Offsets that could not be served this pass
    pub failed: Vec<(Point32, BlockError)>,
}

impl Visibility {
    pub fn loaded(&self) -> usize {
        self.resolved.len() - self.failed.len()
    }
}

/// Viewport plus the block cache it drives
pub struct MapView<S> {
    viewport: Viewport,
    cache: BlockCache<S>,
}

impl<S: BlockSource> MapView<S> {
    pub fn new(viewport: Viewport, cache: BlockCache<S>) -> Self {
        Self { viewport, cache }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn cache(&self) -> &BlockCache<S> {
        &self.cache
    }

    pub fn set_center(&mut self, center: Point32) {
        self.viewport.set_center(center);
    }

    /// Center on a geographic position
    pub fn set_position(&mut self, lat: f64, lon: f64) {
        self.viewport.set_center(to_planar(lat, lon));
    }

    pub fn set_zoom(&mut self, zoom: u8) {
        self.viewport.set_zoom(zoom);
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.viewport.resize(width, height);
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.viewport.pan(dx, dy);
    }

    /// Bring the blocks under the viewport corners into the cache.
    ///
    /// Every resident block leaves this marked in view exactly when its
    /// offset was resolved in this pass. A block that cannot be loaded is
    /// logged and skipped; the rest of the pass continues.
    pub fn update_visibility(&mut self) -> Visibility {
        self.cache.reset_view();
        let resolved = resolve(&self.viewport.bbox());
        let mut failed = Vec::new();

        for &offset in &resolved {
            if let Err(e) = self.cache.ensure_loaded(offset) {
                if e.is_not_found() {
                    debug!("no block at ({}, {}): {}", offset.x, offset.y, e);
                } else {
                    warn!("skipping block ({}, {}): {}", offset.x, offset.y, e);
                }
                failed.push((offset, e));
            }
        }

        Visibility { resolved, failed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::address::BlockAddress;
    use crate::map::source::MemorySource;

    const EMPTY_BLOCK: &str = "Polygons:0\nPolylines:0\n";

    fn source_with(offsets: &[Point32]) -> MemorySource {
        let mut source = MemorySource::new();
        for &o in offsets {
            source.insert(BlockAddress::containing(o).key(), EMPTY_BLOCK);
        }
        source
    }

    #[test]
    fn test_visibility_reset() {
        let a = Point32::new(0, 0);
        let b = Point32::new(40_960, 0);
        let mut view = MapView::new(
            Viewport::new(Point32::new(2048, 2048), 1, 100, 100),
            BlockCache::new(source_with(&[a, b])),
        );

        let pass = view.update_visibility();
        assert_eq!(pass.resolved, vec![a]);
        assert!(view.cache().get(a).unwrap().in_view);

        view.set_center(Point32::new(40_960 + 2048, 2048));
        let pass = view.update_visibility();
        assert_eq!(pass.resolved, vec![b]);
        assert_eq!(view.cache().len(), 2);
        for block in view.cache().blocks() {
            assert_eq!(block.in_view, pass.resolved.contains(&block.offset));
        }
        assert!(!view.cache().get(a).unwrap().in_view);
    }

    #[test]
    fn test_missing_corner_does_not_abort_pass() {
        // Viewport straddles x = 0; only the east block exists
        let east = Point32::new(0, 0);
        let mut view = MapView::new(
            Viewport::new(Point32::new(0, 2048), 1, 100, 100),
            BlockCache::new(source_with(&[east])),
        );
        let pass = view.update_visibility();
        assert_eq!(pass.resolved.len(), 2);
        assert_eq!(pass.failed.len(), 1);
        assert_eq!(pass.loaded(), 1);
        assert!(pass.failed[0].1.is_not_found());
        assert!(view.cache().get(east).unwrap().in_view);
    }

    #[test]
    fn test_set_position() {
        let mut view = MapView::new(
            Viewport::new(Point32::ZERO, 1, 10, 10),
            BlockCache::new(MemorySource::new()),
        );
        view.set_position(41.38, 2.17);
        assert_eq!(view.viewport().center(), to_planar(41.38, 2.17));
    }
}
