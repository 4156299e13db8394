// Copyright 2026 the Rastro Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Curve flattening, extrema handling and transform composition.

mod common;

use common::{fill, render, WHITE};
use rastro::color::PremulRgba8;
use rastro::curve::cut_cubic_at_y_extrema;
use rastro::kurbo::{Affine, Point};
use rastro::peniko::Fill;
use rastro::transform::rotate_degrees;
use rastro::{Geometry, Path};

#[test]
fn quad_rounded_square_coverage_matches_area() {
    // A square with its corners replaced by quadratics whose control points
    // sit at the original corners. Each corner cuts away 1/3 · 12 · 12 of
    // the square.
    let mut b = Path::builder();
    b.move_to(16.0, 4.0);
    b.quad_to(28.0, 4.0, 28.0, 16.0);
    b.quad_to(28.0, 28.0, 16.0, 28.0);
    b.quad_to(4.0, 28.0, 4.0, 16.0);
    b.quad_to(4.0, 4.0, 16.0, 4.0);
    b.close();

    let geometry = fill(b.finish(), WHITE, Fill::NonZero);
    let image = render(&[geometry], 32, 32, 4);

    let expected = 24.0 * 24.0 - 4.0 * (12.0 * 12.0 / 3.0);
    let coverage = image.coverage();

    assert!(
        (coverage - expected).abs() < 8.0,
        "coverage {coverage}, expected ≈ {expected}"
    );

    // The center is solid, the corners are cut away.
    assert_eq!(image.alpha(16, 16), 255);
    assert_eq!(image.alpha(5, 5), 0);
    assert_eq!(image.alpha(26, 26), 0);
}

#[test]
fn cubic_renders_identically_when_pre_split_at_extrema() {
    // An s-shaped cubic whose Y extrema force monotonization into three
    // sub-curves. Splitting it up front with the same cutter must not
    // change the rendering.
    let curve = [
        Point::new(0.0, 0.0),
        Point::new(10.0, -10.0),
        Point::new(20.0, 30.0),
        Point::new(30.0, 0.0),
    ];

    let mut whole = Path::builder();
    whole.move_to(curve[0].x, curve[0].y);
    whole.cubic_to(curve[1].x, curve[1].y, curve[2].x, curve[2].y, curve[3].x, curve[3].y);
    whole.close();

    let mut split = [Point::ZERO; 10];
    let pieces = cut_cubic_at_y_extrema(&curve, &mut split);
    assert_eq!(pieces, 3);

    let mut pre_split = Path::builder();
    pre_split.move_to(split[0].x, split[0].y);
    for i in 0..pieces {
        let c = &split[i * 3..i * 3 + 4];
        pre_split.cubic_to(c[1].x, c[1].y, c[2].x, c[2].y, c[3].x, c[3].y);
    }
    pre_split.close();

    let color = PremulRgba8 { r: 0, g: 0, b: 255, a: 128 };

    let a = render(&[fill(whole.finish(), color, Fill::NonZero)], 32, 32, 4);
    let b = render(&[fill(pre_split.finish(), color, Fill::NonZero)], 32, 32, 4);

    assert_eq!(a.data, b.data);
    assert!(a.coverage() > 1.0);
}

#[test]
fn single_hump_cubic_is_clipped_at_the_top() {
    // The control points dip above the image; the visible part below y = 0
    // must still close correctly.
    let mut b = Path::builder();
    b.move_to(2.0, 6.0);
    b.cubic_to(10.0, -6.0, 22.0, -6.0, 30.0, 6.0);
    b.close();

    let geometry = fill(b.finish(), WHITE, Fill::NonZero);
    let image = render(&[geometry], 32, 8, 2);

    // Clipped region keeps some coverage near the top edge center.
    assert!(image.alpha(16, 0) > 0);
    // Ends of the chord carry no fill above the closing line.
    assert_eq!(image.alpha(0, 7), 0);
    assert_eq!(image.alpha(31, 7), 0);
}

#[test]
fn composed_transform_equals_pre_multiplied_geometry_transform() {
    let mut b = Path::builder();
    b.move_to(2.0, 2.0);
    b.quad_to(14.0, 0.0, 14.0, 14.0);
    b.line_to(2.0, 14.0);
    b.close();
    let path = b.finish();

    let own = rotate_degrees(30.0) * Affine::translate((3.0, 1.0));
    let global = Affine::scale(1.25) * Affine::translate((4.0, 6.0));

    // Frame transform applied by the rasterizer...
    let by_frame = {
        let geometry = Geometry::new(path.clone(), own, WHITE, Fill::NonZero);
        let mut image = common::TestImage::new(40, 40);
        let mut pool = rastro::ThreadPool::with_thread_count(2);

        rastro::rasterize(&[geometry], global, &mut pool, image.view());

        image
    };

    // ...equals the same product baked into the geometry.
    let baked = {
        let geometry = Geometry::new(path, global * own, WHITE, Fill::NonZero);
        let mut image = common::TestImage::new(40, 40);
        let mut pool = rastro::ThreadPool::with_thread_count(2);

        rastro::rasterize(&[geometry], Affine::IDENTITY, &mut pool, image.view());

        image
    };

    assert_eq!(by_frame.data, baked.data);
}

#[test]
fn rotated_square_keeps_its_area() {
    let mut b = Path::builder();
    b.move_to(10.0, 10.0);
    b.line_to(26.0, 10.0);
    b.line_to(26.0, 26.0);
    b.line_to(10.0, 26.0);
    b.close();

    let rotate = Affine::translate((18.0, 18.0))
        * rotate_degrees(45.0)
        * Affine::translate((-18.0, -18.0));

    let geometry = Geometry::new(b.finish(), rotate, WHITE, Fill::NonZero);
    let image = render(&[geometry], 36, 36, 4);

    let coverage = image.coverage();

    // 16×16 square, rotation preserves area up to boundary rounding.
    assert!((250.0..=262.0).contains(&coverage), "coverage {coverage}");
}
