use blockmap::map::renderer::fill_polygon;
use blockmap::map::{
    parse_block, BlockAddress, BlockCache, MapView, MemorySource, ParseLimits, Point32, Viewport,
};
use blockmap::{Framebuffer, Rgb565};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::fmt::Write;

/// A dense block: `n` small square polygons and `n` two-segment roads
fn dense_block(n: i32) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Polygons:{}", n * n);
    for i in 0..n {
        for j in 0..n {
            let (x, y) = (i * 4096 / n, j * 4096 / n);
            let _ = writeln!(out, "0x94B2\n\nbbox:{},{},{},{}", x, y, x + 30, y + 30);
            let _ = writeln!(out, "coords:{x},{y};{x},{};{},{};{},{y};", y + 30, x + 30, y + 30, x + 30);
        }
    }
    let _ = writeln!(out, "Polylines:{n}");
    for i in 0..n {
        let y = i * 4096 / n;
        let _ = writeln!(out, "0xFFFF\n6\n\nbbox:0,{y},4095,{}", y + 40);
        let _ = writeln!(out, "coords:0,{y};2048,{};4095,{y};", y + 40);
    }
    out
}

fn bench_parse(c: &mut Criterion) {
    let text = dense_block(40);
    c.bench_function("parse_block_1600_polygons", |b| {
        b.iter(|| parse_block(black_box(text.as_bytes()), ParseLimits::default()))
    });
}

fn bench_fill(c: &mut Criterion) {
    let mut fb = Framebuffer::new(320, 374);
    let mut nodes = Vec::new();
    // Star-ish ring crossing most of the screen
    let ring: Vec<(i32, i32)> = (0..24)
        .map(|k| {
            let a = k as f64 * std::f64::consts::TAU / 24.0;
            let r = if k % 2 == 0 { 170.0 } else { 90.0 };
            (160 + (r * a.cos()) as i32, 187 + (r * a.sin()) as i32)
        })
        .collect();
    c.bench_function("fill_polygon_star", |b| {
        b.iter(|| fill_polygon(black_box(&ring), Rgb565::GREEN, 320, 374, &mut nodes, &mut fb))
    });
}

fn bench_render(c: &mut Criterion) {
    let mut source = MemorySource::new();
    let text = dense_block(40);
    for offset in [Point32::new(0, 0), Point32::new(4096, 0)] {
        source.insert(BlockAddress::containing(offset).key(), text.clone());
    }
    let mut view = MapView::new(
        Viewport::new(Point32::new(4096, 2048), 2, 320, 374),
        BlockCache::new(source),
    );
    view.update_visibility();
    let mut fb = Framebuffer::new(320, 374);

    c.bench_function("render_two_blocks", |b| b.iter(|| view.render(black_box(&mut fb))));
}

criterion_group!(benches, bench_parse, bench_fill, bench_render);
criterion_main!(benches);
