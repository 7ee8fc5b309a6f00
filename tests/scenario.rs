use blockmap::map::{BlockAddress, BlockCache, MapView, MemorySource, Point32, Viewport};
use blockmap::{Framebuffer, Rgb565, Surface};

/// A field south of the road in the east half, and the road across the block
const TOWN_BLOCK: &str = "\
Polygons:1
0x76EE

bbox:2000,1000,4000,1800
coords:2000,1000;2000,1800;4000,1800;4000,1000;
Polylines:1
0x227E
4

bbox:0,2048,4095,2048
coords:0,2048;4095,2048;
";

fn town() -> MemorySource {
    let mut source = MemorySource::new();
    for offset in [Point32::new(0, 0), Point32::new(4096, 0), Point32::new(409_600, 0)] {
        source.insert(BlockAddress::containing(offset).key(), TOWN_BLOCK);
    }
    source
}

#[test]
fn two_blocks_then_a_far_third() {
    let west = Point32::new(0, 0);
    let east = Point32::new(4096, 0);
    let far = Point32::new(409_600, 0);

    let mut view = MapView::new(
        Viewport::new(Point32::new(4096, 2048), 2, 320, 374),
        BlockCache::new(town()),
    );

    let pass = view.update_visibility();
    assert_eq!(pass.resolved, vec![west, east]);
    assert!(pass.failed.is_empty());
    assert_eq!(view.cache().len(), 2);
    assert!(view.cache().get(west).unwrap().in_view);
    assert!(view.cache().get(east).unwrap().in_view);

    let mut fb = Framebuffer::new(320, 374);
    let stats = view.render(&mut fb);
    assert_eq!(stats.blocks, 2);
    assert_eq!(stats.polylines, 2);
    // The east block's field is out of view
    assert_eq!(stats.polygons, 1);
    assert_eq!(stats.culled, 1);
    // Road runs through the screen center row, the field below it
    assert!(fb.count(Rgb565::BLUE) > 0);
    assert!(fb.count(Rgb565::GREEN) > 0);
    assert_eq!(fb.pixel(160, 187), Some(Rgb565::RED));

    view.set_center(far + Point32::new(2048, 2048));
    let pass = view.update_visibility();
    assert_eq!(pass.resolved, vec![far]);
    assert_eq!(view.cache().len(), 3);
    assert!(view.cache().contains(west));
    assert!(view.cache().contains(east));
    assert!(!view.cache().get(west).unwrap().in_view);
    assert!(!view.cache().get(east).unwrap().in_view);
    assert!(view.cache().get(far).unwrap().in_view);

    // Only the far block is painted now
    fb.fill_background(Rgb565::BLACK);
    assert_eq!(view.render(&mut fb).blocks, 1);
}

#[test]
fn geographic_position_into_missing_area() {
    let mut view = MapView::new(
        Viewport::new(Point32::ZERO, 1, 100, 100),
        BlockCache::new(town()),
    );
    view.set_position(41.38, 2.17);
    let pass = view.update_visibility();
    assert_eq!(pass.loaded(), 0);
    assert!(pass.failed.iter().all(|(_, e)| e.is_not_found()));

    // Nothing loaded, yet a frame is still produced
    let mut fb = Framebuffer::new(100, 100);
    let stats = view.render(&mut fb);
    assert_eq!(stats.blocks, 0);
    assert!(fb.count(Rgb565::BACKGROUND) > 9000);
}
