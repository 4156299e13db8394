// Copyright 2026 the Rastro Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Utilities shared across the integration tests.
#![allow(dead_code)]

use rastro::color::PremulRgba8;
use rastro::kurbo::Affine;
use rastro::peniko::Fill;
use rastro::{Geometry, ImageView, Path, ThreadPool};

pub const WHITE: PremulRgba8 = PremulRgba8 {
    r: 255,
    g: 255,
    b: 255,
    a: 255,
};

pub const BLUE: PremulRgba8 = PremulRgba8 {
    r: 0,
    g: 0,
    b: 255,
    a: 255,
};

/// A tightly packed RGBA8 test image.
pub struct TestImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl TestImage {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height * 4],
        }
    }

    pub fn view(&mut self) -> ImageView<'_> {
        ImageView::new(&mut self.data, self.width, self.height, self.width * 4)
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = (y * self.width + x) * 4;

        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    pub fn alpha(&self, x: usize, y: usize) -> u8 {
        self.pixel(x, y)[3]
    }

    /// Sum of all alpha values, in units of fully covered pixels.
    pub fn coverage(&self) -> f64 {
        let sum: u64 = self.data.chunks_exact(4).map(|p| u64::from(p[3])).sum();

        sum as f64 / 255.0
    }
}

pub fn rect_path(x0: f64, y0: f64, x1: f64, y1: f64) -> Path {
    let mut b = Path::builder();
    b.move_to(x0, y0);
    b.line_to(x1, y0);
    b.line_to(x1, y1);
    b.line_to(x0, y1);
    b.close();
    b.finish()
}

pub fn fill(path: Path, color: PremulRgba8, rule: Fill) -> Geometry {
    Geometry::new(path, Affine::IDENTITY, color, rule)
}

/// Renders geometries with the identity transform into a fresh image.
pub fn render(geometries: &[Geometry], width: usize, height: usize, threads: usize) -> TestImage {
    let mut image = TestImage::new(width, height);
    let mut pool = ThreadPool::with_thread_count(threads);

    rastro::rasterize(geometries, Affine::IDENTITY, &mut pool, image.view());

    image
}
