use std::fmt::Write;

use crate::map::address::BLOCK_SIZE;
use crate::map::{BlockAddress, MemorySource, Point32};
use crate::surface::Rgb565;

/// Demo blocks span this many blocks on each side of the origin
const DEMO_RADIUS: i32 = 2;

/// Major street spacing inside a block, in meters
const GRID: i32 = 512;

/// Accumulates features of one block and serializes them
#[derive(Default)]
struct BlockWriter {
    polygons: Vec<String>,
    polylines: Vec<String>,
}

impl BlockWriter {
    fn polygon(&mut self, color: Rgb565, max_zoom: Option<u8>, points: &[(i32, i32)]) {
        let mut record = String::new();
        let _ = writeln!(record, "0x{:04X}", color.0);
        record.push_str(&optional(max_zoom));
        record.push('\n');
        push_geometry(&mut record, points);
        self.polygons.push(record);
    }

    fn polyline(&mut self, color: Rgb565, width: u8, max_zoom: Option<u8>, points: &[(i32, i32)]) {
        let mut record = String::new();
        let _ = writeln!(record, "0x{:04X}", color.0);
        let _ = writeln!(record, "{width}");
        record.push_str(&optional(max_zoom));
        record.push('\n');
        push_geometry(&mut record, points);
        self.polylines.push(record);
    }

    fn finish(self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Polygons:{}", self.polygons.len());
        self.polygons.iter().for_each(|p| out.push_str(p));
        let _ = writeln!(out, "Polylines:{}", self.polylines.len());
        self.polylines.iter().for_each(|l| out.push_str(l));
        out
    }
}

fn optional(value: Option<u8>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// `bbox:` and `coords:` lines for block-local points
fn push_geometry(record: &mut String, points: &[(i32, i32)]) {
    let min_x = points.iter().map(|p| p.0).min().unwrap_or(0);
    let min_y = points.iter().map(|p| p.1).min().unwrap_or(0);
    let max_x = points.iter().map(|p| p.0).max().unwrap_or(0);
    let max_y = points.iter().map(|p| p.1).max().unwrap_or(0);
    let _ = writeln!(record, "bbox:{min_x},{min_y},{max_x},{max_y}");
    record.push_str("coords:");
    for (x, y) in points {
        let _ = write!(record, "{x},{y};");
    }
    record.push('\n');
}

/// Axis-aligned rectangle as a polygon ring
fn rect(x0: i32, y0: i32, x1: i32, y1: i32) -> [(i32, i32); 4] {
    [(x0, y0), (x0, y1), (x1, y1), (x1, y0)]
}

/// Contents of the demo block at block grid position (`bx`, `by`)
fn demo_block(bx: i32, by: i32) -> String {
    let mut block = BlockWriter::default();
    let size = BLOCK_SIZE;
    let cells = size / GRID;

    // City blocks between streets: buildings, with the odd park or pond
    for cy in 0..cells {
        for cx in 0..cells {
            let (x, y) = (cx * GRID, cy * GRID);
            let seed = (bx * 31 + by * 17 + cx * 7 + cy * 3).rem_euclid(11);
            match seed {
                0 => block.polygon(
                    Rgb565::GREEN_CLEAR,
                    Some(12),
                    &[
                        (x + 40, y + 60),
                        (x + 200, y + 40),
                        (x + 460, y + 120),
                        (x + 420, y + 440),
                        (x + 80, y + 460),
                    ],
                ),
                1 => block.polygon(
                    Rgb565::BLUE_CLEAR,
                    Some(12),
                    &[
                        (x + 256, y + 60),
                        (x + 420, y + 150),
                        (x + 440, y + 340),
                        (x + 256, y + 450),
                        (x + 90, y + 340),
                        (x + 110, y + 150),
                    ],
                ),
                _ => {
                    block.polygon(Rgb565::GRAY_CLEAR, Some(6), &rect(x + 48, y + 48, x + 232, y + 232));
                    block.polygon(Rgb565::GRAY_CLEAR, Some(6), &rect(x + 280, y + 48, x + 464, y + 232));
                    block.polygon(Rgb565::BROWN, Some(4), &rect(x + 48, y + 280, x + 464, y + 464));
                }
            }
        }
    }

    // Minor streets first, major on top
    for i in 0..cells {
        let c = i * GRID + GRID / 2;
        block.polyline(Rgb565::GRAY_CLEAR2, 4, Some(4), &[(0, c), (size - 1, c)]);
        block.polyline(Rgb565::GRAY_CLEAR2, 4, Some(4), &[(c, 0), (c, size - 1)]);
    }
    for i in 0..cells {
        let c = i * GRID;
        block.polyline(Rgb565::WHITE, 12, None, &[(0, c), (size - 1, c)]);
        block.polyline(Rgb565::WHITE, 12, None, &[(c, 0), (c, size - 1)]);
    }

    // A river meandering east to west through every block row
    let base = 1800 + (by.rem_euclid(3)) * 200;
    let river: Vec<(i32, i32)> = (0..=8)
        .map(|k| (k * size / 8 - k / 8, base + if k % 2 == 0 { 0 } else { 220 }))
        .collect();
    block.polyline(Rgb565::BLUE, 30, None, &river);

    block.finish()
}

/// In-memory demo map: a small town of blocks around the origin, written in
/// the block file grammar so it goes through the real parser and cache
pub fn demo_map() -> MemorySource {
    let mut source = MemorySource::new();
    let size = BLOCK_SIZE;
    for by in -DEMO_RADIUS..DEMO_RADIUS {
        for bx in -DEMO_RADIUS..DEMO_RADIUS {
            let address = BlockAddress::containing(Point32::new(bx * size, by * size));
            source.insert(address.key(), demo_block(bx, by));
        }
    }
    source
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{parse_block, BlockCache, ParseLimits};

    #[test]
    fn test_demo_blocks_parse() {
        let text = demo_block(0, 0);
        let block = parse_block(text.as_bytes(), ParseLimits::default()).unwrap();
        assert!(!block.polygons.is_empty());
        // 8 minor + 8 major in each direction, plus the river
        assert_eq!(block.polylines.len(), 33);
        assert!(block.polygons.iter().all(|p| p.points.len() >= 4));
        let river = block.polylines.last().unwrap();
        assert_eq!(river.points.len(), 9);
        assert_eq!(river.width, 30);
        assert_eq!(river.max_zoom, crate::config::MAX_ZOOM);
    }

    #[test]
    fn test_demo_map_covers_origin() {
        let source = demo_map();
        assert_eq!(source.len(), 16);
        let mut cache = BlockCache::new(source);
        for p in [Point32::new(0, 0), Point32::new(-1, -1), Point32::new(8191, -8192)] {
            assert!(cache.ensure_loaded(p).is_ok(), "no demo block at {p}");
        }
    }

    #[test]
    fn test_bbox_matches_points() {
        let mut w = BlockWriter::default();
        w.polygon(Rgb565::RED, None, &[(5, 9), (1, 2), (7, 3)]);
        let text = w.finish();
        assert!(text.contains("bbox:1,2,7,9\n"));
        assert!(text.contains("coords:5,9;1,2;7,3;\n"));
        let block = parse_block(text.as_bytes(), ParseLimits::default()).unwrap();
        assert_eq!(block.polygons[0].color, Rgb565::RED);
    }
}
