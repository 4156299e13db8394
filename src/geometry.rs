// Copyright 2026 the Rastro Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Renderable geometry: path commands, integer rectangles and the
//! [`Geometry`] record consumed by the rasterizer.

use peniko::color::PremulRgba8;
use peniko::kurbo::{Affine, Point};
use peniko::Fill;

/// A path command. Each tag consumes a fixed number of points from the
/// parallel point buffer: move and line one, quadratics two, cubics three,
/// close none.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum PathTag {
    Move = 0,
    Line = 1,
    Quadratic = 2,
    Cubic = 3,
    Close = 4,
}

impl PathTag {
    /// Number of points this tag consumes.
    pub const fn point_count(self) -> usize {
        match self {
            Self::Move | Self::Line => 1,
            Self::Quadratic => 2,
            Self::Cubic => 3,
            Self::Close => 0,
        }
    }

    pub(crate) const fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Move),
            1 => Some(Self::Line),
            2 => Some(Self::Quadratic),
            3 => Some(Self::Cubic),
            4 => Some(Self::Close),
            _ => None,
        }
    }
}

/// An integer rectangle, `min` inclusive, `max` exclusive.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct IntRect {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl IntRect {
    pub const fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub const fn width(&self) -> i32 {
        self.max_x - self.min_x
    }

    pub const fn height(&self) -> i32 {
        self.max_y - self.min_y
    }
}

/// A sequence of path commands and their points. The first tag is always
/// `Move`; close commands connect back to the point of the most recent move.
#[derive(Clone, Debug, Default)]
pub struct Path {
    tags: Vec<PathTag>,
    points: Vec<Point>,
}

impl Path {
    /// Starts building a path.
    pub fn builder() -> PathBuilder {
        PathBuilder::default()
    }

    /// Builds a path from raw tag and point buffers.
    ///
    /// Returns `None` unless the buffers are consistent: the tag list starts
    /// with `Move` and consumes exactly `points.len()` points.
    pub fn from_raw_parts(tags: Vec<PathTag>, points: Vec<Point>) -> Option<Self> {
        if tags.first() != Some(&PathTag::Move) {
            return None;
        }

        let needed: usize = tags.iter().map(|t| t.point_count()).sum();

        if needed != points.len() {
            return None;
        }

        Some(Self { tags, points })
    }

    pub fn tags(&self) -> &[PathTag] {
        &self.tags
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Integer bounding box of the path's points (control points included),
    /// expanded outward to whole pixels.
    pub fn bounds(&self) -> IntRect {
        let Some(first) = self.points.first() else {
            return IntRect::default();
        };

        let mut min_x = first.x;
        let mut min_y = first.y;
        let mut max_x = first.x;
        let mut max_y = first.y;

        for p in &self.points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        IntRect {
            min_x: min_x.floor() as i32,
            min_y: min_y.floor() as i32,
            max_x: max_x.ceil() as i32,
            max_y: max_y.ceil() as i32,
        }
    }
}

/// Incremental [`Path`] construction.
#[derive(Clone, Debug, Default)]
pub struct PathBuilder {
    tags: Vec<PathTag>,
    points: Vec<Point>,
}

impl PathBuilder {
    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.tags.push(PathTag::Move);
        self.points.push(Point::new(x, y));
        self
    }

    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        debug_assert!(!self.tags.is_empty(), "path must start with move_to");

        self.tags.push(PathTag::Line);
        self.points.push(Point::new(x, y));
        self
    }

    pub fn quad_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) -> &mut Self {
        debug_assert!(!self.tags.is_empty(), "path must start with move_to");

        self.tags.push(PathTag::Quadratic);
        self.points.push(Point::new(cx, cy));
        self.points.push(Point::new(x, y));
        self
    }

    pub fn cubic_to(&mut self, c1x: f64, c1y: f64, c2x: f64, c2y: f64, x: f64, y: f64) -> &mut Self {
        debug_assert!(!self.tags.is_empty(), "path must start with move_to");

        self.tags.push(PathTag::Cubic);
        self.points.push(Point::new(c1x, c1y));
        self.points.push(Point::new(c2x, c2y));
        self.points.push(Point::new(x, y));
        self
    }

    pub fn close(&mut self) -> &mut Self {
        debug_assert!(!self.tags.is_empty(), "path must start with move_to");

        self.tags.push(PathTag::Close);
        self
    }

    pub fn finish(&mut self) -> Path {
        Path {
            tags: std::mem::take(&mut self.tags),
            points: std::mem::take(&mut self.points),
        }
    }
}

/// One renderable item: a path, its transform, a premultiplied color and a
/// fill rule.
///
/// `path_bounds` is the bounding box of the path in path coordinates; the
/// frame driver maps it through the effective transform to find the
/// destination-image footprint. It may exceed the destination image.
#[derive(Clone, Debug)]
pub struct Geometry {
    pub path_bounds: IntRect,
    pub tags: Vec<PathTag>,
    pub points: Vec<Point>,
    pub transform: Affine,
    pub color: PremulRgba8,
    pub fill_rule: Fill,
}

impl Geometry {
    /// Builds a geometry from a path, computing `path_bounds` from the
    /// path's points.
    pub fn new(path: Path, transform: Affine, color: PremulRgba8, fill_rule: Fill) -> Self {
        let path_bounds = path.bounds();

        Self {
            path_bounds,
            tags: path.tags,
            points: path.points,
            transform,
            color,
            fill_rule,
        }
    }

    /// The packed wire format of the color: R in the low byte, A in the high
    /// byte.
    pub(crate) fn color_word(&self) -> u32 {
        u32::from_le_bytes([self.color.r, self.color.g, self.color.b, self.color.a])
    }
}
