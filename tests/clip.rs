// Copyright 2026 the Rastro Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Clipping against the destination rectangle and the start-cover backdrop
//! carried in from geometry left of the image.

mod common;

use common::{fill, rect_path, render, TestImage, WHITE};
use rastro::color::PremulRgba8;
use rastro::kurbo::Affine;
use rastro::peniko::Fill;
use rastro::ThreadPool;

#[test]
fn left_of_image_rectangle_fills_through_start_covers() {
    // X range [-100, 4] with full vertical coverage: the left edge never
    // enters the image and only contributes backdrop.
    let geometry = fill(rect_path(-100.0, 0.0, 4.0, 10.0), WHITE, Fill::NonZero);
    let image = render(&[geometry], 10, 10, 2);

    for y in 0..10 {
        for x in 0..10 {
            let expected = if x < 4 { [255, 255, 255, 255] } else { [0, 0, 0, 0] };

            assert_eq!(image.pixel(x, y), expected, "pixel ({x}, {y})");
        }
    }
}

#[test]
fn start_cover_backdrop_equals_direct_fill() {
    // A rectangle pushed off the left edge produces the same columns as
    // filling the visible part directly.
    let shifted = fill(rect_path(-64.0, 0.0, 7.0, 12.0), WHITE, Fill::NonZero);
    let direct = fill(rect_path(0.0, 0.0, 7.0, 12.0), WHITE, Fill::NonZero);

    let a = render(&[shifted], 12, 12, 2);
    let b = render(&[direct], 12, 12, 2);

    assert_eq!(a.data, b.data);
}

#[test]
fn geometry_is_clipped_to_the_image() {
    // Overhangs all four edges; only the intersection is painted.
    let geometry = fill(rect_path(-5.0, -6.0, 25.0, 30.0), WHITE, Fill::NonZero);
    let image = render(&[geometry], 10, 10, 2);

    for y in 0..10 {
        for x in 0..10 {
            assert_eq!(image.alpha(x, y), 255, "pixel ({x}, {y})");
        }
    }
}

#[test]
fn partial_overlap_writes_only_the_intersection() {
    let geometry = fill(rect_path(5.0, -5.0, 15.0, 5.0), WHITE, Fill::NonZero);
    let image = render(&[geometry], 10, 10, 2);

    for y in 0..10 {
        for x in 0..10 {
            let expected = if x >= 5 && y < 5 { 255 } else { 0 };

            assert_eq!(image.alpha(x, y), expected, "pixel ({x}, {y})");
        }
    }
}

#[test]
fn right_edge_square_keeps_its_closing_line() {
    // The square's right edge coincides with its bounds; without the
    // one-pixel footprint extension the closing vertical line would be
    // dropped and the fill would leak to the image edge.
    let geometry = fill(rect_path(2.0, 2.0, 6.0, 6.0), WHITE, Fill::NonZero);
    let image = render(&[geometry], 12, 8, 1);

    for y in 0..8 {
        for x in 0..12 {
            let expected = if (2..6).contains(&x) && (2..6).contains(&y) { 255 } else { 0 };

            assert_eq!(image.alpha(x, y), expected, "pixel ({x}, {y})");
        }
    }
}

#[test]
fn wide_geometry_uses_wide_line_storage() {
    // A footprint of 250 px spans more than 128 pixels of tile columns, so
    // this exercises the wide (full 24.8 X) line layout end-to-end.
    let geometry = fill(rect_path(0.0, 0.0, 250.0, 20.0), WHITE, Fill::NonZero);
    let image = render(&[geometry], 300, 30, 4);

    for y in 0..30 {
        for x in 0..300 {
            let expected = if x < 250 && y < 20 { 255 } else { 0 };

            assert_eq!(image.alpha(x, y), expected, "pixel ({x}, {y})");
        }
    }
}

#[test]
fn sub_pixel_edges_blend_on_both_sides() {
    let geometry = fill(rect_path(1.5, 0.0, 4.5, 4.0), WHITE, Fill::NonZero);
    let image = render(&[geometry], 8, 4, 1);

    for y in 0..4 {
        assert_eq!(image.alpha(0, y), 0);
        assert_eq!(image.alpha(1, y), 128);
        assert_eq!(image.alpha(2, y), 255);
        assert_eq!(image.alpha(3, y), 255);
        assert_eq!(image.alpha(4, y), 128);
        assert_eq!(image.alpha(5, y), 0);
    }
}

#[test]
fn strided_image_view_respects_row_padding() {
    // 10 pixels per row, but a 64-byte stride; the padding bytes must stay
    // untouched.
    let width = 10;
    let height = 6;
    let stride = 64;
    let mut data = vec![0xab_u8; stride * height];

    for y in 0..height {
        data[y * stride..y * stride + width * 4].fill(0);
    }

    let geometry = fill(rect_path(0.0, 0.0, 10.0, 6.0), WHITE, Fill::NonZero);
    let mut pool = ThreadPool::with_thread_count(2);

    rastro::rasterize(
        &[geometry],
        Affine::IDENTITY,
        &mut pool,
        rastro::ImageView::new(&mut data, width, height, stride),
    );

    for y in 0..height {
        let row = &data[y * stride..(y + 1) * stride];

        assert!(row[..width * 4].iter().all(|&b| b == 255), "row {y}");
        assert!(row[width * 4..].iter().all(|&b| b == 0xab), "row {y} padding");
    }
}

#[test]
fn translucent_backdrop_composites_once() {
    // The start-cover path must produce a single compositing pass, exactly
    // like an in-image fill would.
    let half = PremulRgba8 { r: 0, g: 128, b: 0, a: 128 };

    let shifted = fill(rect_path(-40.0, 0.0, 6.0, 8.0), half, Fill::NonZero);
    let image = render(&[shifted], 8, 8, 1);

    let mut expected = TestImage::new(8, 8);
    let mut pool = ThreadPool::with_thread_count(1);

    rastro::rasterize(
        &[fill(rect_path(0.0, 0.0, 6.0, 8.0), half, Fill::NonZero)],
        Affine::IDENTITY,
        &mut pool,
        expected.view(),
    );

    assert_eq!(image.data, expected.data);
}
