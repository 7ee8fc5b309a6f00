use blockmap::config::{Config, MAX_ZOOM, MIN_ZOOM};
use blockmap::map::{
    to_geographic, BlockCache, BlockSource, MapView, ParseLimits, RenderStats, Viewport,
    Visibility,
};
use blockmap::Framebuffer;
use log::debug;
use std::collections::VecDeque;

use crate::track::Fix;

/// Position changes smaller than this (degrees, on both axes) are ignored
pub const MOVE_THRESHOLD_DEG: f64 = 0.00005;

/// Heading step for the rotate keys, in degrees
const HEADING_STEP: f64 = 15.0;

/// Application state
pub struct App {
    pub view: MapView<Box<dyn BlockSource>>,
    /// Map surface, sized to the viewport in braille pixels
    pub framebuffer: Framebuffer,
    pub should_quit: bool,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    /// Outcome of the last visibility pass
    pub visibility: Visibility,
    pub stats: RenderStats,
    /// Where blocks come from, for the title bar
    pub source_label: String,
    lat: f64,
    lon: f64,
    /// Degrees clockwise from north; informational only
    heading: f64,
    home: (f64, f64, u8),
    /// Recorded fixes still to be replayed
    track: VecDeque<Fix>,
    dirty: bool,
}

/// Map area in braille pixels for a terminal of `width` x `height` cells
fn pixel_size(width: u16, height: u16) -> (u16, u16) {
    // Border takes 2 cells horizontally; border plus status bar 3 vertically
    let inner_width = width.saturating_sub(2);
    let inner_height = height.saturating_sub(3);
    (
        inner_width.saturating_mul(2),
        inner_height.saturating_mul(4),
    )
}

impl App {
    pub fn new(
        config: &Config,
        source: Box<dyn BlockSource>,
        source_label: impl Into<String>,
        width: u16,
        height: u16,
    ) -> Self {
        let (pw, ph) = pixel_size(width, height);
        let cache = BlockCache::with_capacity(source, config.cache_capacity).with_limits(ParseLimits {
            max_points: config.max_points_per_block,
        });
        let viewport = Viewport::at(config.default_lat, config.default_lon, config.default_zoom, pw, ph);

        Self {
            view: MapView::new(viewport, cache),
            framebuffer: Framebuffer::new(pw as usize, ph as usize),
            should_quit: false,
            last_mouse: None,
            visibility: Visibility::default(),
            stats: RenderStats::default(),
            source_label: source_label.into(),
            lat: config.default_lat,
            lon: config.default_lon,
            heading: 0.0,
            home: (config.default_lat, config.default_lon, config.default_zoom),
            track: VecDeque::new(),
            dirty: true,
        }
    }

    /// Update viewport and surface when the terminal resizes
    pub fn resize(&mut self, width: u16, height: u16) {
        let (pw, ph) = pixel_size(width, height);
        self.view.resize(pw, ph);
        self.framebuffer.resize(pw as usize, ph as usize);
        self.dirty = true;
    }

    /// Apply a new position fix. Returns false when it is within the
    /// movement threshold of the current one.
    pub fn set_position(&mut self, lat: f64, lon: f64) -> bool {
        let moved = (lat - self.lat).abs() > MOVE_THRESHOLD_DEG
            || (lon - self.lon).abs() > MOVE_THRESHOLD_DEG;
        if !moved {
            return false;
        }
        self.lat = lat;
        self.lon = lon;
        self.view.set_position(lat, lon);
        self.dirty = true;
        true
    }

    /// Queue fixes to be replayed by [`App::tick`]
    pub fn load_track(&mut self, fixes: VecDeque<Fix>) {
        self.track = fixes;
    }

    pub fn track_remaining(&self) -> usize {
        self.track.len()
    }

    /// Feed the next recorded fix through the movement threshold.
    /// Returns whether the map moved.
    pub fn tick(&mut self) -> bool {
        let Some(fix) = self.track.pop_front() else {
            return false;
        };
        if let Some(heading) = fix.heading {
            self.heading = heading.rem_euclid(360.0);
        }
        self.set_position(fix.lat, fix.lon)
    }

    /// Pan the map by braille pixels
    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.view.pan(dx, dy);
        (self.lat, self.lon) = to_geographic(self.view.viewport().center());
        self.dirty = true;
    }

    /// Fewer meters per pixel
    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom().saturating_sub(1));
    }

    /// More meters per pixel
    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom().saturating_add(1));
    }

    fn set_zoom(&mut self, zoom: u8) {
        let zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        if zoom != self.zoom() {
            self.view.set_zoom(zoom);
            self.dirty = true;
        }
    }

    pub fn zoom(&self) -> u8 {
        self.view.viewport().zoom()
    }

    /// Turn the heading by `delta` degrees, wrapping into 0..360
    pub fn rotate(&mut self, delta: f64) {
        self.heading = (self.heading + delta).rem_euclid(360.0);
    }

    pub fn rotate_left(&mut self) {
        self.rotate(-HEADING_STEP);
    }

    pub fn rotate_right(&mut self) {
        self.rotate(HEADING_STEP);
    }

    pub fn heading(&self) -> f64 {
        self.heading
    }

    /// Back to the configured start position and zoom
    pub fn reset(&mut self) {
        let (lat, lon, zoom) = self.home;
        self.lat = lat;
        self.lon = lon;
        self.view.set_position(lat, lon);
        self.set_zoom(zoom);
        self.heading = 0.0;
        self.dirty = true;
    }

    /// Refresh visibility and repaint the surface if anything changed
    pub fn redraw(&mut self) {
        if !self.dirty {
            return;
        }
        self.visibility = self.view.update_visibility();
        self.stats = self.view.render(&mut self.framebuffer);
        debug!(
            "redraw at {:.5},{:.5} zoom {}: {} of {} blocks loaded",
            self.lat,
            self.lon,
            self.zoom(),
            self.visibility.loaded(),
            self.visibility.resolved.len()
        );
        self.dirty = false;
    }

    /// Request quit
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Get current zoom level as a string
    pub fn zoom_level(&self) -> String {
        format!("{} m/px", self.zoom())
    }

    /// Get current center coordinates as a string
    pub fn center_coords(&self) -> String {
        format!(
            "{:.5}°{}, {:.5}°{}",
            self.lat.abs(),
            if self.lat >= 0.0 { "N" } else { "S" },
            self.lon.abs(),
            if self.lon >= 0.0 { "E" } else { "W" }
        )
    }

    pub fn heading_label(&self) -> String {
        format!("{:03.0}°", self.heading)
    }

    /// Handle mouse drag by panning the opposite way
    pub fn handle_drag(&mut self, x: u16, y: u16) {
        if let Some((last_x, last_y)) = self.last_mouse {
            // Terminal cells are 2x4 braille pixels
            let dx = (last_x as i32 - x as i32) * 2;
            let dy = (last_y as i32 - y as i32) * 4;
            if dx != 0 || dy != 0 {
                self.pan(dx, dy);
            }
        }
        self.last_mouse = Some((x, y));
    }

    /// Reset drag state when mouse button released
    pub fn end_drag(&mut self) {
        self.last_mouse = None;
    }
}
