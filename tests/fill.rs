// Copyright 2026 the Rastro Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Basic filling: solid shapes, fill rules, painter order.

mod common;

use common::{fill, rect_path, render, TestImage, BLUE, WHITE};
use rastro::color::PremulRgba8;
use rastro::kurbo::Affine;
use rastro::peniko::Fill;
use rastro::{
    rasterize_with, Path, ThreadPool, Tile16x8, Tile64x16, Tile8x16, Tile8x32, Tile8x8,
    TileDescriptor,
};

#[test]
fn pixel_aligned_opaque_square() {
    let color = PremulRgba8 {
        r: 0x20,
        g: 0x40,
        b: 0x80,
        a: 0xff,
    };

    let geometry = fill(rect_path(0.0, 0.0, 10.0, 10.0), color, Fill::NonZero);
    let image = render(&[geometry], 20, 20, 4);

    for y in 0..20 {
        for x in 0..20 {
            let expected = if x < 10 && y < 10 {
                [0x20, 0x40, 0x80, 0xff]
            } else {
                [0, 0, 0, 0]
            };

            assert_eq!(image.pixel(x, y), expected, "pixel ({x}, {y})");
        }
    }
}

fn aligned_square_with<T: TileDescriptor>() {
    let geometry = fill(rect_path(0.0, 0.0, 10.0, 10.0), WHITE, Fill::NonZero);
    let mut image = TestImage::new(20, 20);
    let mut pool = ThreadPool::with_thread_count(2);

    rasterize_with::<T>(&[geometry], Affine::IDENTITY, &mut pool, image.view());

    for y in 0..20 {
        for x in 0..20 {
            let expected = if x < 10 && y < 10 { 255 } else { 0 };

            assert_eq!(image.alpha(x, y), expected, "pixel ({x}, {y})");
        }
    }
}

#[test]
fn aligned_square_in_every_tile_configuration() {
    aligned_square_with::<Tile8x8>();
    aligned_square_with::<Tile8x16>();
    aligned_square_with::<Tile8x32>();
    aligned_square_with::<Tile16x8>();
    aligned_square_with::<Tile64x16>();
}

#[test]
fn sub_pixel_triangle() {
    let mut b = Path::builder();
    b.move_to(0.25, 0.25);
    b.line_to(4.75, 0.25);
    b.line_to(2.5, 4.75);
    b.close();

    let geometry = fill(b.finish(), WHITE, Fill::NonZero);
    let image = render(&[geometry], 6, 6, 1);

    // Corner pixels are partially covered.
    for (x, y) in [(0, 0), (4, 0), (2, 4)] {
        let alpha = image.alpha(x, y);

        assert!(alpha > 0 && alpha < 255, "corner ({x}, {y}) alpha {alpha}");
    }

    // Total coverage is close to the analytic area of 10.125 px².
    let coverage = image.coverage();

    assert!((9.5..=11.5).contains(&coverage), "coverage {coverage}");
}

#[test]
fn even_odd_annulus() {
    let mut b = Path::builder();
    // Outer square, counter-clockwise.
    b.move_to(0.0, 0.0);
    b.line_to(0.0, 20.0);
    b.line_to(20.0, 20.0);
    b.line_to(20.0, 0.0);
    b.close();
    // Inner square, clockwise.
    b.move_to(5.0, 5.0);
    b.line_to(15.0, 5.0);
    b.line_to(15.0, 15.0);
    b.line_to(5.0, 15.0);
    b.close();

    let geometry = fill(b.finish(), BLUE, Fill::EvenOdd);
    let image = render(&[geometry], 20, 20, 4);

    for y in 0..20 {
        for x in 0..20 {
            let inside_hole = (5..15).contains(&x) && (5..15).contains(&y);
            let expected = if inside_hole { [0, 0, 0, 0] } else { [0, 0, 255, 255] };

            assert_eq!(image.pixel(x, y), expected, "pixel ({x}, {y})");
        }
    }
}

#[test]
fn non_zero_ignores_the_hole_when_windings_agree() {
    let mut b = Path::builder();
    // Outer and inner squares wound the same way: non-zero fills both.
    b.move_to(0.0, 0.0);
    b.line_to(20.0, 0.0);
    b.line_to(20.0, 20.0);
    b.line_to(0.0, 20.0);
    b.close();
    b.move_to(5.0, 5.0);
    b.line_to(15.0, 5.0);
    b.line_to(15.0, 15.0);
    b.line_to(5.0, 15.0);
    b.close();

    let geometry = fill(b.finish(), BLUE, Fill::NonZero);
    let image = render(&[geometry], 20, 20, 4);

    for y in 0..20 {
        for x in 0..20 {
            assert_eq!(image.alpha(x, y), 255, "pixel ({x}, {y})");
        }
    }
}

#[test]
fn diamond_coverage_matches_area() {
    let mut b = Path::builder();
    b.move_to(16.0, 2.0);
    b.line_to(30.0, 16.0);
    b.line_to(16.0, 30.0);
    b.line_to(2.0, 16.0);
    b.close();

    let geometry = fill(b.finish(), WHITE, Fill::NonZero);
    let image = render(&[geometry], 32, 32, 4);

    // Area 392 px², perimeter ≈ 79 px.
    let coverage = image.coverage();

    assert!((392.0 - 79.0..=392.0 + 79.0).contains(&coverage), "coverage {coverage}");
}

#[test]
fn empty_input_leaves_image_untouched() {
    let mut image = TestImage::new(16, 16);

    image.data[100] = 77;

    let mut pool = ThreadPool::with_thread_count(2);

    rastro::rasterize(&[], Affine::IDENTITY, &mut pool, image.view());

    assert_eq!(image.data[100], 77);
    assert!(image.data.iter().enumerate().all(|(i, &b)| b == 0 || i == 100));
}

#[test]
fn degenerate_geometries_are_ignored() {
    // No tags at all.
    let empty = fill(Path::builder().finish(), WHITE, Fill::NonZero);

    // Zero-width bounds.
    let zero_width = fill(rect_path(3.0, 0.0, 3.0, 10.0), WHITE, Fill::NonZero);

    // Entirely outside the image.
    let outside = fill(rect_path(100.0, 100.0, 120.0, 130.0), WHITE, Fill::NonZero);

    let image = render(&[empty, zero_width, outside], 16, 16, 2);

    assert!(image.data.iter().all(|&b| b == 0));
}

#[test]
fn painter_order_equals_sequential_composition() {
    let red = PremulRgba8 { r: 200, g: 0, b: 0, a: 200 };
    let green = PremulRgba8 { r: 0, g: 180, b: 0, a: 180 };

    let bottom = fill(rect_path(1.5, 1.5, 12.5, 12.5), red, Fill::NonZero);
    let top = fill(rect_path(6.5, 6.5, 18.5, 18.5), green, Fill::NonZero);

    // Both in one frame.
    let combined = render(&[bottom.clone(), top.clone()], 20, 20, 4);

    // Painter's algorithm by hand: two frames over the same buffer.
    let mut sequential = TestImage::new(20, 20);
    let mut pool = ThreadPool::with_thread_count(4);

    rastro::rasterize(&[bottom], Affine::IDENTITY, &mut pool, sequential.view());
    rastro::rasterize(&[top], Affine::IDENTITY, &mut pool, sequential.view());

    assert_eq!(combined.data, sequential.data);
}

#[test]
fn translucent_overlap_blends_source_over() {
    let half = PremulRgba8 { r: 128, g: 0, b: 0, a: 128 };

    let a = fill(rect_path(0.0, 0.0, 8.0, 8.0), half, Fill::NonZero);
    let b = fill(rect_path(4.0, 0.0, 12.0, 8.0), half, Fill::NonZero);

    let image = render(&[a, b], 16, 8, 2);

    // Single layers keep their own alpha.
    assert_eq!(image.alpha(1, 1), 128);
    assert_eq!(image.alpha(10, 1), 128);

    // The overlap composites to 128 + 128·(1 - 0.5).
    let overlap = image.alpha(6, 1);

    assert!((191..=193).contains(&overlap), "overlap alpha {overlap}");

    assert_eq!(image.alpha(14, 1), 0);
}
