// Copyright 2026 the Rastro Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Turns one geometry into per-tile-row line segments.
//!
//! The linearizer transforms path points, clips every segment against the
//! destination bounds, converts curves into short 24.8 line segments, and
//! splits every line at tile-row boundaries, appending the pieces to the
//! row's line list. Segments that fall entirely to the left of the
//! destination contribute to per-row "start cover" arrays instead: one
//! signed value per scanline capturing the winding carried in from the left
//! edge.
//!
//! Geometries known to be fully inside the image take a fast path that
//! quantizes all points up front and skips clipping. Everything else is
//! processed segment by segment in double precision.

use core::array;
use core::marker::PhantomData;

use peniko::kurbo::{Affine, Point};

use crate::curve::{
    cubic_control_points_between_ends_x, cubic_control_points_between_ends_y, cut_cubic_at,
    cut_cubic_at_x_extrema, cut_cubic_at_y_extrema, cut_monotonic_cubic_at_x,
    cut_monotonic_cubic_at_y, cut_monotonic_quadratic_at_x, cut_monotonic_quadratic_at_y,
    cut_quadratic_at, cut_quadratic_at_x_extrema, cut_quadratic_at_y_extrema,
    is_cubic_flat_enough, is_quadratic_flat_enough, quadratic_control_point_between_ends_x,
    quadratic_control_point_between_ends_y, split_cubic, split_quadratic,
};
use crate::fixed::{double_to_f24dot8, F24Dot8, F24Dot8Point, F24DOT8_1};
use crate::geometry::{Geometry, PathTag};
use crate::line_block::{LineBlockPool, LineList};
use crate::memory::ThreadMemory;
use crate::tile::{ClipBounds, TileBounds, TileDescriptor};
use crate::transform::quantize_points;

/// Lines longer than this on either axis are halved before row dispatch so
/// that the 32-bit `dx * dy` products cannot overflow.
const MAXIMUM_DELTA: F24Dot8 = 2048 << 8;

/// Cover contributed by a line fully traversing one scanline upwards.
const FULL_PIXEL_COVER_POSITIVE: i32 = 256;

/// Cover contributed by a line fully traversing one scanline downwards.
const FULL_PIXEL_COVER_NEGATIVE: i32 = -256;

/// Start-cover arrays per tile row; `None` for rows with no left-of-image
/// contribution.
pub(crate) type StartCoverTable = Vec<Option<Box<[i32]>>>;

pub(crate) struct Linearizer<T: TileDescriptor, L: LineList> {
    bounds: TileBounds,
    rows: Vec<L>,
    start_covers: Option<StartCoverTable>,
    _tile: PhantomData<T>,
}

impl<T: TileDescriptor, L: LineList> Linearizer<T, L> {
    /// Processes `geometry` under `transform` (the effective transform,
    /// already combined with the frame matrix) into per-row line lists.
    ///
    /// `contained` asserts that the transformed path bounds lie inside the
    /// destination image; coordinates are clamped either way, so an
    /// incorrect flag produces clamped output rather than out-of-bounds
    /// access.
    pub fn process(
        bounds: TileBounds,
        contained: bool,
        geometry: &Geometry,
        transform: &Affine,
        memory: &mut ThreadMemory,
    ) -> Self {
        let mut rows = Vec::new();
        rows.resize_with(bounds.row_count as usize, L::default);

        let mut linearizer = Self {
            bounds,
            rows,
            start_covers: None,
            _tile: PhantomData,
        };

        if contained {
            linearizer.process_contained(geometry, transform, memory);
        } else {
            let tx = T::column_index_to_points(bounds.x);
            let ty = T::row_index_to_points(bounds.y);
            let clip_w = T::column_index_to_points(bounds.column_count);
            let clip_h = T::row_index_to_points(bounds.row_count);

            let clip = ClipBounds::new(clip_w, clip_h);
            let local = Affine::translate((-f64::from(tx), -f64::from(ty))) * *transform;

            linearizer.process_uncontained(geometry, &clip, &local, memory);
        }

        linearizer
    }

    /// Consumes the linearizer, returning the per-row line lists and the
    /// start-cover table.
    pub fn into_parts(self) -> (Vec<L>, Option<StartCoverTable>) {
        (self.rows, self.start_covers)
    }

    fn process_contained(&mut self, geometry: &Geometry, transform: &Affine, memory: &mut ThreadMemory) {
        // The path is known to be completely within the destination image,
        // so every point can be quantized up front and clipping skipped.
        let ThreadMemory { frame, task, .. } = memory;
        let pool = &mut frame.line_blocks;

        let origin = F24Dot8Point::new(
            T::column_index_to_f24dot8(self.bounds.x),
            T::row_index_to_f24dot8(self.bounds.y),
        );
        let size = F24Dot8Point::new(
            T::column_index_to_f24dot8(self.bounds.column_count),
            T::row_index_to_f24dot8(self.bounds.row_count),
        );

        quantize_points(transform, &geometry.points, &mut task.quantized, origin, size);

        let points = &task.quantized[..];

        let Some(&first) = points.first() else {
            return;
        };

        let mut move_to = first;
        let mut current = first;
        let mut at = 1;

        for &tag in &geometry.tags[1..] {
            match tag {
                PathTag::Move => {
                    // Complete the previous subpath.
                    self.add_contained_line(pool, current, move_to);

                    let Some(&p) = points.get(at) else { return };

                    move_to = p;
                    current = p;
                    at += 1;
                }
                PathTag::Line => {
                    let Some(&p) = points.get(at) else { return };

                    self.add_contained_line(pool, current, p);

                    current = p;
                    at += 1;
                }
                PathTag::Quadratic => {
                    if points.len() < at + 2 {
                        return;
                    }

                    let q = [current, points[at], points[at + 1]];

                    self.add_contained_quadratic(pool, &q);

                    current = q[2];
                    at += 2;
                }
                PathTag::Cubic => {
                    if points.len() < at + 3 {
                        return;
                    }

                    let c = [current, points[at], points[at + 1], points[at + 2]];

                    self.add_contained_cubic(pool, &c);

                    current = c[3];
                    at += 3;
                }
                PathTag::Close => {
                    self.add_contained_line(pool, current, move_to);

                    current = move_to;
                }
            }
        }

        // Complete the final subpath.
        self.add_contained_line(pool, current, move_to);
    }

    fn process_uncontained(
        &mut self,
        geometry: &Geometry,
        clip: &ClipBounds,
        transform: &Affine,
        memory: &mut ThreadMemory,
    ) {
        let pool = &mut memory.frame.line_blocks;
        let points = &geometry.points;

        let Some(&first) = points.first() else {
            return;
        };

        let mut move_to = *transform * first;
        let mut current = move_to;
        let mut at = 1;

        for &tag in &geometry.tags[1..] {
            match tag {
                PathTag::Move => {
                    self.add_uncontained_line(pool, clip, current, move_to);

                    let Some(&p) = points.get(at) else { return };

                    move_to = *transform * p;
                    current = move_to;
                    at += 1;
                }
                PathTag::Line => {
                    let Some(&p) = points.get(at) else { return };

                    let p = *transform * p;

                    self.add_uncontained_line(pool, clip, current, p);

                    current = p;
                    at += 1;
                }
                PathTag::Quadratic => {
                    if points.len() < at + 2 {
                        return;
                    }

                    let q = [current, *transform * points[at], *transform * points[at + 1]];

                    self.add_uncontained_quadratic(pool, clip, &q);

                    current = q[2];
                    at += 2;
                }
                PathTag::Cubic => {
                    if points.len() < at + 3 {
                        return;
                    }

                    let c = [
                        current,
                        *transform * points[at],
                        *transform * points[at + 1],
                        *transform * points[at + 2],
                    ];

                    self.add_uncontained_cubic(pool, clip, &c);

                    current = c[3];
                    at += 3;
                }
                PathTag::Close => {
                    self.add_uncontained_line(pool, clip, current, move_to);

                    current = move_to;
                }
            }
        }

        self.add_uncontained_line(pool, clip, current, move_to);
    }

    fn add_uncontained_line(&mut self, pool: &mut LineBlockPool, clip: &ClipBounds, p0: Point, p1: Point) {
        let y0 = p0.y;
        let y1 = p1.y;

        if y0 == y1 {
            // Horizontal line, completely discarded.
            return;
        }

        if y0 <= 0.0 && y1 <= 0.0 {
            // Line is on top, completely discarded.
            return;
        }

        if y0 >= clip.max_y && y1 >= clip.max_y {
            // Line is on bottom, completely discarded.
            return;
        }

        let x0 = p0.x;
        let x1 = p1.x;

        if x0 >= clip.max_x && x1 >= clip.max_x {
            // Line is on the right, completely discarded.
            return;
        }

        if x0 == x1 {
            // Vertical line.
            let x = double_to_f24dot8(x0).clamp(0, clip.fmax.x);
            let p0y = double_to_f24dot8(y0).clamp(0, clip.fmax.y);
            let p1y = double_to_f24dot8(y1).clamp(0, clip.fmax.y);

            if x == 0 {
                self.update_start_covers(p0y, p1y);
            } else {
                self.add_contained_line(
                    pool,
                    F24Dot8Point::new(x, p0y),
                    F24Dot8Point::new(x, p1y),
                );
            }

            return;
        }

        // Vertical clipping.
        //
        // Absolute delta-y is needed for calculating the vertical t values
        // at min-y and max-y. Delta-x stays signed since it is multiplied by
        // t and the line can go either left or right.
        let delta_y_v = (y1 - y0).abs();
        let delta_x_v = x1 - x0;

        // Line start/end after vertical clipping.
        let mut rx0 = x0;
        let mut ry0 = y0;
        let mut rx1 = x1;
        let mut ry1 = y1;

        if y1 > y0 {
            // Line is going ↓.
            if y0 < 0.0 {
                let t = -y0 / delta_y_v;

                rx0 = x0 + delta_x_v * t;
                ry0 = 0.0;
            }

            if y1 > clip.max_y {
                let t = (clip.max_y - y0) / delta_y_v;

                rx1 = x0 + delta_x_v * t;
                ry1 = clip.max_y;
            }
        } else {
            // Line is going ↑.
            if y0 > clip.max_y {
                let t = (y0 - clip.max_y) / delta_y_v;

                rx0 = x0 + delta_x_v * t;
                ry0 = clip.max_y;
            }

            if y1 < 0.0 {
                let t = y0 / delta_y_v;

                rx1 = x0 + delta_x_v * t;
                ry1 = 0.0;
            }
        }

        if rx0 >= clip.max_x && rx1 >= clip.max_x {
            // What remains is on the right, completely discarded.
            return;
        }

        if rx0 > 0.0 && rx1 > 0.0 && rx0 < clip.max_x && rx1 < clip.max_x {
            // Inside.
            let a = F24Dot8Point::new(
                double_to_f24dot8(rx0).clamp(0, clip.fmax.x),
                double_to_f24dot8(ry0).clamp(0, clip.fmax.y),
            );
            let b = F24Dot8Point::new(
                double_to_f24dot8(rx1).clamp(0, clip.fmax.x),
                double_to_f24dot8(ry1).clamp(0, clip.fmax.y),
            );

            self.add_contained_line(pool, a, b);

            return;
        }

        if rx0 <= 0.0 && rx1 <= 0.0 {
            // Left.
            let a = double_to_f24dot8(ry0).clamp(0, clip.fmax.y);
            let b = double_to_f24dot8(ry1).clamp(0, clip.fmax.y);

            self.update_start_covers(a, b);

            return;
        }

        // Horizontal clipping.
        let delta_y_h = ry1 - ry0;
        let delta_x_h = (rx1 - rx0).abs();

        if rx1 > rx0 {
            // Line is going →.
            let mut bx1 = rx1;
            let mut by1 = ry1;

            if rx1 > clip.max_x {
                let t = (clip.max_x - rx0) / delta_x_h;

                by1 = ry0 + delta_y_h * t;
                bx1 = clip.max_x;
            }

            if rx0 < 0.0 {
                // Split at min-x.
                let t = -rx0 / delta_x_h;

                let a = double_to_f24dot8(ry0).clamp(0, clip.fmax.y);

                let b = F24Dot8Point::new(
                    0,
                    double_to_f24dot8(ry0 + delta_y_h * t).clamp(0, clip.fmax.y),
                );
                let c = F24Dot8Point::new(
                    double_to_f24dot8(bx1).clamp(0, clip.fmax.x),
                    double_to_f24dot8(by1).clamp(0, clip.fmax.y),
                );

                self.update_start_covers(a, b.y);
                self.add_contained_line(pool, b, c);
            } else {
                let a = F24Dot8Point::new(
                    double_to_f24dot8(rx0).clamp(0, clip.fmax.x),
                    double_to_f24dot8(ry0).clamp(0, clip.fmax.y),
                );
                let b = F24Dot8Point::new(
                    double_to_f24dot8(bx1).clamp(0, clip.fmax.x),
                    double_to_f24dot8(by1).clamp(0, clip.fmax.y),
                );

                self.add_contained_line(pool, a, b);
            }
        } else {
            // Line is going ←.
            let mut bx0 = rx0;
            let mut by0 = ry0;

            if rx0 > clip.max_x {
                let t = (rx0 - clip.max_x) / delta_x_h;

                by0 = ry0 + delta_y_h * t;
                bx0 = clip.max_x;
            }

            if rx1 < 0.0 {
                // Split at min-x.
                let t = rx0 / delta_x_h;

                let a = F24Dot8Point::new(
                    double_to_f24dot8(bx0).clamp(0, clip.fmax.x),
                    double_to_f24dot8(by0).clamp(0, clip.fmax.y),
                );
                let b = F24Dot8Point::new(
                    0,
                    double_to_f24dot8(ry0 + delta_y_h * t).clamp(0, clip.fmax.y),
                );

                let c = double_to_f24dot8(ry1).clamp(0, clip.fmax.y);

                self.add_contained_line(pool, a, b);
                self.update_start_covers(b.y, c);
            } else {
                let a = F24Dot8Point::new(
                    double_to_f24dot8(bx0).clamp(0, clip.fmax.x),
                    double_to_f24dot8(by0).clamp(0, clip.fmax.y),
                );
                let b = F24Dot8Point::new(
                    double_to_f24dot8(rx1).clamp(0, clip.fmax.x),
                    double_to_f24dot8(ry1).clamp(0, clip.fmax.y),
                );

                self.add_contained_line(pool, a, b);
            }
        }
    }

    fn add_uncontained_quadratic(&mut self, pool: &mut LineBlockPool, clip: &ClipBounds, p: &[Point; 3]) {
        let min_x = p[0].x.min(p[1].x).min(p[2].x);

        if min_x >= clip.max_x {
            // Curve is to the right of the clipping bounds.
            return;
        }

        let min_y = p[0].y.min(p[1].y).min(p[2].y);

        if min_y >= clip.max_y {
            // Curve is below the clipping bounds.
            return;
        }

        let max_y = p[0].y.max(p[1].y).max(p[2].y);

        if max_y <= 0.0 {
            // Curve is above the clipping bounds.
            return;
        }

        if min_y >= 0.0 && max_y <= clip.max_y {
            // Within the clipping bounds vertically.
            let max_x = p[0].x.max(p[1].x).max(p[2].x);

            if max_x <= 0.0 {
                // Completely to the left without intersecting anything.
                let a = double_to_f24dot8(p[0].y).clamp(0, clip.fmax.y);
                let b = double_to_f24dot8(p[2].y).clamp(0, clip.fmax.y);

                self.update_start_covers(a, b);

                return;
            }

            if max_x <= clip.max_x && min_x >= 0.0 {
                // Completely inside.
                let q = [
                    clamp_point(p[0], clip),
                    clamp_point(p[1], clip),
                    clamp_point(p[2], clip),
                ];

                self.add_contained_quadratic(pool, &q);

                return;
            }
        }

        // The curve potentially intersects the clipping bounds; monotonize
        // before clipping.
        let mono_in_x = quadratic_control_point_between_ends_x(p);
        let mono_in_y = quadratic_control_point_between_ends_y(p);

        if mono_in_x && mono_in_y {
            // Already monotonic in both directions; common for quadratics.
            self.add_uncontained_monotonic_quadratic(pool, clip, p);
        } else if mono_in_y {
            let mut mono_x = [Point::ZERO; 5];
            let n_x = cut_quadratic_at_x_extrema(p, &mut mono_x);

            for j in 0..n_x {
                let q = array::from_fn(|k| mono_x[j * 2 + k]);

                self.add_uncontained_monotonic_quadratic(pool, clip, &q);
            }
        } else {
            let mut mono_y = [Point::ZERO; 5];
            let n_y = cut_quadratic_at_y_extrema(p, &mut mono_y);

            for i in 0..n_y {
                let my: [Point; 3] = array::from_fn(|k| mono_y[i * 2 + k]);

                if quadratic_control_point_between_ends_x(&my) {
                    self.add_uncontained_monotonic_quadratic(pool, clip, &my);
                } else {
                    let mut mono_x = [Point::ZERO; 5];
                    let n_x = cut_quadratic_at_x_extrema(&my, &mut mono_x);

                    for j in 0..n_x {
                        let q = array::from_fn(|k| mono_x[j * 2 + k]);

                        self.add_uncontained_monotonic_quadratic(pool, clip, &q);
                    }
                }
            }
        }
    }

    fn add_uncontained_monotonic_quadratic(
        &mut self,
        pool: &mut LineBlockPool,
        clip: &ClipBounds,
        p: &[Point; 3],
    ) {
        debug_assert!(p[1].x <= p[0].x.max(p[2].x));
        debug_assert!(p[1].x >= p[0].x.min(p[2].x));
        debug_assert!(p[1].y <= p[0].y.max(p[2].y));
        debug_assert!(p[1].y >= p[0].y.min(p[2].y));

        let sx = p[0].x;
        let px = p[2].x;

        if sx >= clip.max_x && px >= clip.max_x {
            // Completely on the right.
            return;
        }

        let sy = p[0].y;
        let py = p[2].y;

        if sy <= 0.0 && py <= 0.0 {
            // Completely on top.
            return;
        }

        if sy >= clip.max_y && py >= clip.max_y {
            // Completely on the bottom.
            return;
        }

        let mut pts = *p;
        let mut tmp = [Point::ZERO; 5];

        if sy > py {
            // Curve is going ↑.
            if sy > clip.max_y {
                // Cut off at the bottom, keep the upper part.
                if let Some(t) = cut_monotonic_quadratic_at_y(&pts, clip.max_y) {
                    cut_quadratic_at(&pts, &mut tmp, t);

                    pts[0] = tmp[2];
                    pts[1] = tmp[3];
                    pts[2] = tmp[4];
                }
            }

            if py < 0.0 {
                // Cut off at the top, keep the bottom part.
                if let Some(t) = cut_monotonic_quadratic_at_y(&pts, 0.0) {
                    cut_quadratic_at(&pts, &mut tmp, t);

                    pts[1] = tmp[1];
                    pts[2] = tmp[2];
                }
            }

            self.add_vertically_contained_monotonic_quadratic(pool, clip, pts);
        } else if sy < py {
            // Curve is going ↓.
            if py > clip.max_y {
                // Cut off at the bottom, keep the upper part.
                if let Some(t) = cut_monotonic_quadratic_at_y(&pts, clip.max_y) {
                    cut_quadratic_at(&pts, &mut tmp, t);

                    pts[1] = tmp[1];
                    pts[2] = tmp[2];
                }
            }

            if sy < 0.0 {
                // Cut off at the top, keep the bottom part.
                if let Some(t) = cut_monotonic_quadratic_at_y(&pts, 0.0) {
                    cut_quadratic_at(&pts, &mut tmp, t);

                    pts[0] = tmp[2];
                    pts[1] = tmp[3];
                    pts[2] = tmp[4];
                }
            }

            self.add_vertically_contained_monotonic_quadratic(pool, clip, pts);
        }
    }

    fn add_vertically_contained_monotonic_quadratic(
        &mut self,
        pool: &mut LineBlockPool,
        clip: &ClipBounds,
        mut p: [Point; 3],
    ) {
        let sx = p[0].x;
        let px = p[2].x;

        let mut tmp = [Point::ZERO; 5];

        if sx > px {
            // Curve is going ←.
            if px >= clip.max_x {
                // Completely on the right.
                return;
            }

            if sx <= 0.0 {
                // Completely on the left.
                let a = double_to_f24dot8(p[0].y).clamp(0, clip.fmax.y);
                let b = double_to_f24dot8(p[2].y).clamp(0, clip.fmax.y);

                self.update_start_covers(a, b);

                return;
            }

            if sx > clip.max_x {
                // Cut off at the right, keep the left part.
                if let Some(t) = cut_monotonic_quadratic_at_x(&p, clip.max_x) {
                    cut_quadratic_at(&p, &mut tmp, t);

                    p[0] = tmp[2];
                    p[1] = tmp[3];
                    p[2] = tmp[4];
                }
            }

            if px < 0.0 {
                // Split at min-x and keep both parts, the part on the left
                // becomes start covers.
                if let Some(t) = cut_monotonic_quadratic_at_x(&p, 0.0) {
                    cut_quadratic_at(&p, &mut tmp, t);

                    let q = [
                        clamp_point(tmp[0], clip),
                        clamp_point(tmp[1], clip),
                        clamp_point(tmp[2], clip),
                    ];

                    let c = double_to_f24dot8(tmp[4].y).clamp(0, clip.fmax.y);

                    self.add_contained_quadratic(pool, &q);
                    self.update_start_covers(q[2].y, c);

                    return;
                }
            }

            let q = [
                clamp_point(p[0], clip),
                clamp_point(p[1], clip),
                clamp_point(p[2], clip),
            ];

            self.add_contained_quadratic(pool, &q);
        } else if sx < px {
            // Curve is going →.
            if sx >= clip.max_x {
                // Completely on the right.
                return;
            }

            if px <= 0.0 {
                // Completely on the left.
                let a = double_to_f24dot8(p[0].y).clamp(0, clip.fmax.y);
                let b = double_to_f24dot8(p[2].y).clamp(0, clip.fmax.y);

                self.update_start_covers(a, b);

                return;
            }

            if px > clip.max_x {
                // Cut off at the right, keep the left part.
                if let Some(t) = cut_monotonic_quadratic_at_x(&p, clip.max_x) {
                    cut_quadratic_at(&p, &mut tmp, t);

                    p[1] = tmp[1];
                    p[2] = tmp[2];
                }
            }

            if sx < 0.0 {
                // Split at min-x and keep both parts, the part on the left
                // becomes start covers.
                if let Some(t) = cut_monotonic_quadratic_at_x(&p, 0.0) {
                    cut_quadratic_at(&p, &mut tmp, t);

                    let a = double_to_f24dot8(tmp[0].y).clamp(0, clip.fmax.y);

                    let q = [
                        clamp_point(tmp[2], clip),
                        clamp_point(tmp[3], clip),
                        clamp_point(tmp[4], clip),
                    ];

                    self.update_start_covers(a, q[0].y);
                    self.add_contained_quadratic(pool, &q);

                    return;
                }
            }

            let q = [
                clamp_point(p[0], clip),
                clamp_point(p[1], clip),
                clamp_point(p[2], clip),
            ];

            self.add_contained_quadratic(pool, &q);
        } else {
            // Vertical.
            if px < clip.max_x {
                if px <= 0.0 {
                    let a = double_to_f24dot8(p[0].y).clamp(0, clip.fmax.y);
                    let b = double_to_f24dot8(p[2].y).clamp(0, clip.fmax.y);

                    self.update_start_covers(a, b);
                } else {
                    let q = [
                        clamp_point(p[0], clip),
                        clamp_point(p[1], clip),
                        clamp_point(p[2], clip),
                    ];

                    self.add_contained_quadratic(pool, &q);
                }
            }
        }
    }

    fn add_contained_quadratic(&mut self, pool: &mut LineBlockPool, q: &[F24Dot8Point; 3]) {
        if is_quadratic_flat_enough(q) {
            self.add_contained_line(pool, q[0], q[2]);
        } else {
            let mut split = [F24Dot8Point::default(); 5];

            split_quadratic(&mut split, q);

            let first = array::from_fn(|k| split[k]);
            let second = array::from_fn(|k| split[2 + k]);

            self.add_contained_quadratic(pool, &first);
            self.add_contained_quadratic(pool, &second);
        }
    }

    fn add_uncontained_cubic(&mut self, pool: &mut LineBlockPool, clip: &ClipBounds, p: &[Point; 4]) {
        let min_x = p[0].x.min(p[1].x).min(p[2].x).min(p[3].x);

        if min_x >= clip.max_x {
            // Curve is to the right of the clipping bounds.
            return;
        }

        let min_y = p[0].y.min(p[1].y).min(p[2].y).min(p[3].y);

        if min_y >= clip.max_y {
            // Curve is below the clipping bounds.
            return;
        }

        let max_y = p[0].y.max(p[1].y).max(p[2].y).max(p[3].y);

        if max_y <= 0.0 {
            // Curve is above the clipping bounds.
            return;
        }

        if min_y >= 0.0 && max_y <= clip.max_y {
            // Within the clipping bounds vertically.
            let max_x = p[0].x.max(p[1].x).max(p[2].x).max(p[3].x);

            if max_x <= 0.0 {
                // Completely to the left without intersecting anything.
                let a = double_to_f24dot8(p[0].y).clamp(0, clip.fmax.y);
                let b = double_to_f24dot8(p[3].y).clamp(0, clip.fmax.y);

                self.update_start_covers(a, b);

                return;
            }

            if max_x <= clip.max_x && min_x >= 0.0 {
                let c = [
                    clamp_point(p[0], clip),
                    clamp_point(p[1], clip),
                    clamp_point(p[2], clip),
                    clamp_point(p[3], clip),
                ];

                self.add_contained_cubic(pool, &c);

                return;
            }
        }

        // The curve potentially intersects the clipping bounds. The clipper
        // expects monotonic cubics, so monotonize the input.
        let mono_in_x = cubic_control_points_between_ends_x(p);
        let mono_in_y = cubic_control_points_between_ends_y(p);

        if mono_in_x && mono_in_y {
            // Already monotonic in both directions.
            self.add_uncontained_monotonic_cubic(pool, clip, p);
        } else if mono_in_y {
            let mut mono_x = [Point::ZERO; 10];
            let n_x = cut_cubic_at_x_extrema(p, &mut mono_x);

            for j in 0..n_x {
                let c = array::from_fn(|k| mono_x[j * 3 + k]);

                self.add_uncontained_monotonic_cubic(pool, clip, &c);
            }
        } else {
            let mut mono_y = [Point::ZERO; 10];
            let n_y = cut_cubic_at_y_extrema(p, &mut mono_y);

            for i in 0..n_y {
                let my: [Point; 4] = array::from_fn(|k| mono_y[i * 3 + k]);

                if cubic_control_points_between_ends_x(&my) {
                    self.add_uncontained_monotonic_cubic(pool, clip, &my);
                } else {
                    let mut mono_x = [Point::ZERO; 10];
                    let n_x = cut_cubic_at_x_extrema(&my, &mut mono_x);

                    for j in 0..n_x {
                        let c = array::from_fn(|k| mono_x[j * 3 + k]);

                        self.add_uncontained_monotonic_cubic(pool, clip, &c);
                    }
                }
            }
        }
    }

    fn add_uncontained_monotonic_cubic(&mut self, pool: &mut LineBlockPool, clip: &ClipBounds, p: &[Point; 4]) {
        let sx = p[0].x;
        let px = p[3].x;

        if sx >= clip.max_x && px >= clip.max_x {
            // Completely on the right.
            return;
        }

        let sy = p[0].y;
        let py = p[3].y;

        if sy <= 0.0 && py <= 0.0 {
            // Completely on top.
            return;
        }

        if sy >= clip.max_y && py >= clip.max_y {
            // Completely on the bottom.
            return;
        }

        let mut pts = *p;
        let mut tmp = [Point::ZERO; 7];

        if sy > py {
            // Curve is ascending.
            if sy > clip.max_y {
                // Cut off at the bottom, keep the upper part.
                if let Some(t) = cut_monotonic_cubic_at_y(p, clip.max_y) {
                    cut_cubic_at(p, &mut tmp, t);

                    pts[0] = tmp[3];
                    pts[1] = tmp[4];
                    pts[2] = tmp[5];
                    pts[3] = tmp[6];
                }
            }

            if py < 0.0 {
                // Cut off at the top, keep the bottom part.
                if let Some(t) = cut_monotonic_cubic_at_y(&pts, 0.0) {
                    cut_cubic_at(&pts, &mut tmp, t);

                    pts[1] = tmp[1];
                    pts[2] = tmp[2];
                    pts[3] = tmp[3];
                }
            }

            self.add_vertically_contained_monotonic_cubic(pool, clip, pts);
        } else if sy < py {
            // Curve is descending.
            if py > clip.max_y {
                // Cut off at the bottom, keep the upper part.
                if let Some(t) = cut_monotonic_cubic_at_y(&pts, clip.max_y) {
                    cut_cubic_at(&pts, &mut tmp, t);

                    pts[1] = tmp[1];
                    pts[2] = tmp[2];
                    pts[3] = tmp[3];
                }
            }

            if sy < 0.0 {
                // Cut off at the top, keep the bottom part.
                if let Some(t) = cut_monotonic_cubic_at_y(&pts, 0.0) {
                    cut_cubic_at(&pts, &mut tmp, t);

                    pts[0] = tmp[3];
                    pts[1] = tmp[4];
                    pts[2] = tmp[5];
                    pts[3] = tmp[6];
                }
            }

            self.add_vertically_contained_monotonic_cubic(pool, clip, pts);
        }
    }

    fn add_vertically_contained_monotonic_cubic(
        &mut self,
        pool: &mut LineBlockPool,
        clip: &ClipBounds,
        mut p: [Point; 4],
    ) {
        let sx = p[0].x;
        let px = p[3].x;

        let mut tmp = [Point::ZERO; 7];

        if sx > px {
            // Curve is going from right to left.
            if px >= clip.max_x {
                // Completely on the right.
                return;
            }

            if sx <= 0.0 {
                // Completely on the left.
                let a = double_to_f24dot8(p[0].y).clamp(0, clip.fmax.y);
                let b = double_to_f24dot8(p[3].y).clamp(0, clip.fmax.y);

                self.update_start_covers(a, b);

                return;
            }

            if sx > clip.max_x {
                // Cut off at the right, keep the left part.
                if let Some(t) = cut_monotonic_cubic_at_x(&p, clip.max_x) {
                    cut_cubic_at(&p, &mut tmp, t);

                    p[0] = tmp[3];
                    p[1] = tmp[4];
                    p[2] = tmp[5];
                    p[3] = tmp[6];
                }
            }

            if px < 0.0 {
                // Split at min-x and keep both parts. Going right to left,
                // the first part is inside and the second is on the left.
                if let Some(t) = cut_monotonic_cubic_at_x(&p, 0.0) {
                    cut_cubic_at(&p, &mut tmp, t);

                    let c = [
                        to_f24dot8_point(tmp[0]),
                        to_f24dot8_point(tmp[1]),
                        to_f24dot8_point(tmp[2]),
                        to_f24dot8_point(tmp[3]),
                    ];

                    self.add_potentially_uncontained_cubic(pool, clip.fmax, &c);

                    let b = double_to_f24dot8(tmp[6].y).clamp(0, clip.fmax.y);

                    self.update_start_covers(c[3].y.clamp(0, clip.fmax.y), b);

                    return;
                }
            }

            let c = [
                clamp_point(p[0], clip),
                clamp_point(p[1], clip),
                clamp_point(p[2], clip),
                clamp_point(p[3], clip),
            ];

            self.add_contained_cubic(pool, &c);
        } else if sx < px {
            // Curve is going from left to right.
            if sx >= clip.max_x {
                // Completely on the right.
                return;
            }

            if px <= 0.0 {
                // Completely on the left.
                let a = double_to_f24dot8(p[0].y).clamp(0, clip.fmax.y);
                let b = double_to_f24dot8(p[3].y).clamp(0, clip.fmax.y);

                self.update_start_covers(a, b);

                return;
            }

            if px > clip.max_x {
                // Cut off at the right, keep the left part.
                if let Some(t) = cut_monotonic_cubic_at_x(&p, clip.max_x) {
                    cut_cubic_at(&p, &mut tmp, t);

                    p[1] = tmp[1];
                    p[2] = tmp[2];
                    p[3] = tmp[3];
                }
            }

            if sx < 0.0 {
                // Split at min-x and keep both parts. Going left to right,
                // the first part is on the left and the second is inside.
                if let Some(t) = cut_monotonic_cubic_at_x(&p, 0.0) {
                    cut_cubic_at(&p, &mut tmp, t);

                    let c = [
                        to_f24dot8_point(tmp[3]),
                        to_f24dot8_point(tmp[4]),
                        to_f24dot8_point(tmp[5]),
                        to_f24dot8_point(tmp[6]),
                    ];

                    let a = double_to_f24dot8(tmp[0].y).clamp(0, clip.fmax.y);

                    self.update_start_covers(a, c[0].y.clamp(0, clip.fmax.y));
                    self.add_potentially_uncontained_cubic(pool, clip.fmax, &c);

                    return;
                }
            }

            let c = [
                clamp_point(p[0], clip),
                clamp_point(p[1], clip),
                clamp_point(p[2], clip),
                clamp_point(p[3], clip),
            ];

            self.add_contained_cubic(pool, &c);
        } else {
            // Vertical.
            if px < clip.max_x {
                if px <= 0.0 {
                    let a = double_to_f24dot8(p[0].y).clamp(0, clip.fmax.y);
                    let b = double_to_f24dot8(p[3].y).clamp(0, clip.fmax.y);

                    self.update_start_covers(a, b);
                } else {
                    let c = [
                        clamp_point(p[0], clip),
                        clamp_point(p[1], clip),
                        clamp_point(p[2], clip),
                        clamp_point(p[3], clip),
                    ];

                    self.add_contained_cubic(pool, &c);
                }
            }
        }
    }

    fn add_potentially_uncontained_cubic(
        &mut self,
        pool: &mut LineBlockPool,
        max: F24Dot8Point,
        c: &[F24Dot8Point; 4],
    ) {
        // A monotonic cubic can still have control points outside the
        // bounding box of its end points. Clamping such control points to
        // the destination bounds would bend the curve, so when any point is
        // out of bounds the curve is split in half until either all points
        // are inside or the curve becomes too small to matter; each
        // subdivision tightens the control-point bounding box.
        let outside = c.iter().any(|p| {
            p.x < 0 || p.x > max.x || p.y < 0 || p.y > max.y
        });

        if !outside {
            self.add_contained_cubic(pool, c);

            return;
        }

        let dx = (c[0].x - c[1].x).abs() + (c[1].x - c[2].x).abs() + (c[2].x - c[3].x).abs();
        let dy = (c[0].y - c[1].y).abs() + (c[1].y - c[2].y).abs() + (c[2].y - c[3].y).abs();

        if dx + dy < F24DOT8_1 {
            let clamped = [
                F24Dot8Point::new(c[0].x.clamp(0, max.x), c[0].y.clamp(0, max.y)),
                F24Dot8Point::new(c[1].x.clamp(0, max.x), c[1].y.clamp(0, max.y)),
                F24Dot8Point::new(c[2].x.clamp(0, max.x), c[2].y.clamp(0, max.y)),
                F24Dot8Point::new(c[3].x.clamp(0, max.x), c[3].y.clamp(0, max.y)),
            ];

            self.add_contained_cubic(pool, &clamped);
        } else {
            let mut split = [F24Dot8Point::default(); 7];

            split_cubic(&mut split, c);

            let first = array::from_fn(|k| split[k]);
            let second = array::from_fn(|k| split[3 + k]);

            self.add_potentially_uncontained_cubic(pool, max, &first);
            self.add_potentially_uncontained_cubic(pool, max, &second);
        }
    }

    fn add_contained_cubic(&mut self, pool: &mut LineBlockPool, c: &[F24Dot8Point; 4]) {
        if is_cubic_flat_enough(c) {
            self.add_contained_line(pool, c[0], c[3]);
        } else {
            let mut split = [F24Dot8Point::default(); 7];

            split_cubic(&mut split, c);

            let first = array::from_fn(|k| split[k]);
            let second = array::from_fn(|k| split[3 + k]);

            self.add_contained_cubic(pool, &first);
            self.add_contained_cubic(pool, &second);
        }
    }

    fn add_contained_line(&mut self, pool: &mut LineBlockPool, p0: F24Dot8Point, p1: F24Dot8Point) {
        debug_assert!(p0.x >= 0 && p0.x <= T::column_index_to_f24dot8(self.bounds.column_count));
        debug_assert!(p0.y >= 0 && p0.y <= T::row_index_to_f24dot8(self.bounds.row_count));
        debug_assert!(p1.x >= 0 && p1.x <= T::column_index_to_f24dot8(self.bounds.column_count));
        debug_assert!(p1.y >= 0 && p1.y <= T::row_index_to_f24dot8(self.bounds.row_count));

        if p0.y == p1.y {
            // Ignore horizontal lines.
            return;
        }

        if p0.x == p1.x {
            // Vertical line.
            if p0.y < p1.y {
                self.vertical_down(pool, p0.y, p1.y, p0.x);
            } else {
                self.vertical_up(pool, p0.y, p1.y, p0.x);
            }

            return;
        }

        // Limit the line size so the stepper's products stay in 32 bits.
        let dx = (p1.x - p0.x).abs();
        let dy = (p1.y - p0.y).abs();

        if dx > MAXIMUM_DELTA || dy > MAXIMUM_DELTA {
            let m = F24Dot8Point::new((p0.x + p1.x) >> 1, (p0.y + p1.y) >> 1);

            self.add_contained_line(pool, p0, m);
            self.add_contained_line(pool, m, p1);

            return;
        }

        if p0.y < p1.y {
            // Line is going down ↓.
            let row0 = T::f24dot8_to_row_index(p0.y);
            let row1 = T::f24dot8_to_row_index(p1.y - 1);

            debug_assert!(row0 <= row1);

            if row0 == row1 {
                // Completely within one tile row, the common case for
                // flattened curves.
                let ty = T::row_index_to_f24dot8(row0);

                self.rows[row0 as usize].append(pool, p0.x, p0.y - ty, p1.x, p1.y - ty);
            } else if p0.x < p1.x {
                self.line_down_r(pool, row0, row1, dx, dy, p0, p1);
            } else {
                self.line_down_l(pool, row0, row1, dx, dy, p0, p1);
            }
        } else {
            // Line is going up ↑.
            let row0 = T::f24dot8_to_row_index(p0.y - 1);
            let row1 = T::f24dot8_to_row_index(p1.y);

            debug_assert!(row1 <= row0);

            if row0 == row1 {
                let ty = T::row_index_to_f24dot8(row0);

                self.rows[row0 as usize].append(pool, p0.x, p0.y - ty, p1.x, p1.y - ty);
            } else if p0.x < p1.x {
                self.line_up_r(pool, row0, row1, dx, dy, p0, p1);
            } else {
                self.line_up_l(pool, row0, row1, dx, dy, p0, p1);
            }
        }
    }

    fn vertical_down(&mut self, pool: &mut LineBlockPool, y0: F24Dot8, y1: F24Dot8, x: F24Dot8) {
        debug_assert!(y0 < y1);

        let row0 = T::f24dot8_to_row_index(y0);
        let row1 = T::f24dot8_to_row_index(y1 - 1);
        let fy0 = y0 - T::row_index_to_f24dot8(row0);
        let fy1 = y1 - T::row_index_to_f24dot8(row1);

        if row0 == row1 {
            self.rows[row0 as usize].append(pool, x, fy0, x, fy1);
        } else {
            self.rows[row0 as usize].append(pool, x, fy0, x, T::HEIGHT_F24DOT8);

            for i in row0 + 1..row1 {
                self.rows[i as usize].append(pool, x, 0, x, T::HEIGHT_F24DOT8);
            }

            self.rows[row1 as usize].append(pool, x, 0, x, fy1);
        }
    }

    fn vertical_up(&mut self, pool: &mut LineBlockPool, y0: F24Dot8, y1: F24Dot8, x: F24Dot8) {
        debug_assert!(y0 > y1);

        let row0 = T::f24dot8_to_row_index(y0 - 1);
        let row1 = T::f24dot8_to_row_index(y1);
        let fy0 = y0 - T::row_index_to_f24dot8(row0);
        let fy1 = y1 - T::row_index_to_f24dot8(row1);

        if row0 == row1 {
            self.rows[row0 as usize].append(pool, x, fy0, x, fy1);
        } else {
            self.rows[row0 as usize].append(pool, x, fy0, x, 0);

            for i in row1 + 1..row0 {
                self.rows[i as usize].append(pool, x, T::HEIGHT_F24DOT8, x, 0);
            }

            self.rows[row1 as usize].append(pool, x, T::HEIGHT_F24DOT8, x, fy1);
        }
    }

    /// ⬊
    fn line_down_r(
        &mut self,
        pool: &mut LineBlockPool,
        row0: u32,
        row1: u32,
        dx: F24Dot8,
        dy: F24Dot8,
        p0: F24Dot8Point,
        p1: F24Dot8Point,
    ) {
        debug_assert!(row0 < row1);

        let fy0 = p0.y - T::row_index_to_f24dot8(row0);
        let fy1 = p1.y - T::row_index_to_f24dot8(row1);

        let p = (T::HEIGHT_F24DOT8 - fy0) * dx;
        let mut delta = p / dy;

        let mut cx = p0.x + delta;

        self.rows[row0 as usize].append(pool, p0.x, fy0, cx, T::HEIGHT_F24DOT8);

        let mut idy = row0 + 1;

        if idy != row1 {
            let mut rem_acc = (p % dy) - dy;

            let p = T::HEIGHT_F24DOT8 * dx;
            let lift = p / dy;
            let rem = p % dy;

            while idy != row1 {
                delta = lift;
                rem_acc += rem;

                if rem_acc >= 0 {
                    rem_acc -= dy;
                    delta += 1;
                }

                let nx = cx + delta;

                self.rows[idy as usize].append(pool, cx, 0, nx, T::HEIGHT_F24DOT8);

                cx = nx;
                idy += 1;
            }
        }

        self.rows[row1 as usize].append(pool, cx, 0, p1.x, fy1);
    }

    /// ⬈
    fn line_up_r(
        &mut self,
        pool: &mut LineBlockPool,
        row0: u32,
        row1: u32,
        dx: F24Dot8,
        dy: F24Dot8,
        p0: F24Dot8Point,
        p1: F24Dot8Point,
    ) {
        debug_assert!(row0 > row1);

        let fy0 = p0.y - T::row_index_to_f24dot8(row0);
        let fy1 = p1.y - T::row_index_to_f24dot8(row1);

        let p = fy0 * dx;
        let mut delta = p / dy;

        let mut cx = p0.x + delta;

        self.rows[row0 as usize].append(pool, p0.x, fy0, cx, 0);

        let mut idy = row0 - 1;

        if idy != row1 {
            let mut rem_acc = (p % dy) - dy;

            let p = T::HEIGHT_F24DOT8 * dx;
            let lift = p / dy;
            let rem = p % dy;

            while idy != row1 {
                delta = lift;
                rem_acc += rem;

                if rem_acc >= 0 {
                    rem_acc -= dy;
                    delta += 1;
                }

                let nx = cx + delta;

                self.rows[idy as usize].append(pool, cx, T::HEIGHT_F24DOT8, nx, 0);

                cx = nx;
                idy -= 1;
            }
        }

        self.rows[row1 as usize].append(pool, cx, T::HEIGHT_F24DOT8, p1.x, fy1);
    }

    /// ⬋
    fn line_down_l(
        &mut self,
        pool: &mut LineBlockPool,
        row0: u32,
        row1: u32,
        dx: F24Dot8,
        dy: F24Dot8,
        p0: F24Dot8Point,
        p1: F24Dot8Point,
    ) {
        debug_assert!(row0 < row1);

        let fy0 = p0.y - T::row_index_to_f24dot8(row0);
        let fy1 = p1.y - T::row_index_to_f24dot8(row1);

        let p = (T::HEIGHT_F24DOT8 - fy0) * dx;
        let mut delta = p / dy;

        let mut cx = p0.x - delta;

        self.rows[row0 as usize].append(pool, p0.x, fy0, cx, T::HEIGHT_F24DOT8);

        let mut idy = row0 + 1;

        if idy != row1 {
            let mut rem_acc = (p % dy) - dy;

            let p = T::HEIGHT_F24DOT8 * dx;
            let lift = p / dy;
            let rem = p % dy;

            while idy != row1 {
                delta = lift;
                rem_acc += rem;

                if rem_acc >= 0 {
                    rem_acc -= dy;
                    delta += 1;
                }

                let nx = cx - delta;

                self.rows[idy as usize].append(pool, cx, 0, nx, T::HEIGHT_F24DOT8);

                cx = nx;
                idy += 1;
            }
        }

        self.rows[row1 as usize].append(pool, cx, 0, p1.x, fy1);
    }

    /// ⬉
    fn line_up_l(
        &mut self,
        pool: &mut LineBlockPool,
        row0: u32,
        row1: u32,
        dx: F24Dot8,
        dy: F24Dot8,
        p0: F24Dot8Point,
        p1: F24Dot8Point,
    ) {
        debug_assert!(row0 > row1);

        let fy0 = p0.y - T::row_index_to_f24dot8(row0);
        let fy1 = p1.y - T::row_index_to_f24dot8(row1);

        let p = fy0 * dx;
        let mut delta = p / dy;

        let mut cx = p0.x - delta;

        self.rows[row0 as usize].append(pool, p0.x, fy0, cx, 0);

        let mut idy = row0 - 1;

        if idy != row1 {
            let mut rem_acc = (p % dy) - dy;

            let p = T::HEIGHT_F24DOT8 * dx;
            let lift = p / dy;
            let rem = p % dy;

            while idy != row1 {
                delta = lift;
                rem_acc += rem;

                if rem_acc >= 0 {
                    rem_acc -= dy;
                    delta += 1;
                }

                let nx = cx - delta;

                self.rows[idy as usize].append(pool, cx, T::HEIGHT_F24DOT8, nx, 0);

                cx = nx;
                idy -= 1;
            }
        }

        self.rows[row1 as usize].append(pool, cx, T::HEIGHT_F24DOT8, p1.x, fy1);
    }

    fn start_covers_row(&mut self, index: usize) -> &mut [i32] {
        let row_count = self.bounds.row_count as usize;
        let table = self.start_covers.get_or_insert_with(|| vec![None; row_count]);

        table[index].get_or_insert_with(|| vec![0; T::HEIGHT as usize].into_boxed_slice())
    }

    fn update_start_covers_full(&mut self, index: usize, value: i32) {
        for cover in self.start_covers_row(index) {
            *cover += value;
        }
    }

    fn update_start_covers(&mut self, y0: F24Dot8, y1: F24Dot8) {
        debug_assert!(y0 >= 0 && y0 <= T::row_index_to_f24dot8(self.bounds.row_count));
        debug_assert!(y1 >= 0 && y1 <= T::row_index_to_f24dot8(self.bounds.row_count));

        if y0 == y1 {
            // Not contributing.
            return;
        }

        if y0 < y1 {
            // Line is going down.
            let row0 = T::f24dot8_to_row_index(y0);
            let row1 = T::f24dot8_to_row_index(y1 - 1);
            let fy0 = y0 - T::row_index_to_f24dot8(row0);
            let fy1 = y1 - T::row_index_to_f24dot8(row1);

            if row0 == row1 {
                update_start_covers_down(self.start_covers_row(row0 as usize), fy0, fy1);
            } else {
                update_start_covers_down(
                    self.start_covers_row(row0 as usize),
                    fy0,
                    T::HEIGHT_F24DOT8,
                );

                for i in row0 + 1..row1 {
                    self.update_start_covers_full(i as usize, FULL_PIXEL_COVER_NEGATIVE);
                }

                update_start_covers_down(self.start_covers_row(row1 as usize), 0, fy1);
            }
        } else {
            // Line is going up.
            let row0 = T::f24dot8_to_row_index(y0 - 1);
            let row1 = T::f24dot8_to_row_index(y1);
            let fy0 = y0 - T::row_index_to_f24dot8(row0);
            let fy1 = y1 - T::row_index_to_f24dot8(row1);

            if row0 == row1 {
                update_start_covers_up(self.start_covers_row(row0 as usize), fy0, fy1);
            } else {
                update_start_covers_up(self.start_covers_row(row0 as usize), fy0, 0);

                for i in row1 + 1..row0 {
                    self.update_start_covers_full(i as usize, FULL_PIXEL_COVER_POSITIVE);
                }

                update_start_covers_up(
                    self.start_covers_row(row1 as usize),
                    T::HEIGHT_F24DOT8,
                    fy1,
                );
            }
        }
    }
}

#[inline]
fn clamp_point(p: Point, clip: &ClipBounds) -> F24Dot8Point {
    F24Dot8Point::new(
        double_to_f24dot8(p.x).clamp(0, clip.fmax.x),
        double_to_f24dot8(p.y).clamp(0, clip.fmax.y),
    )
}

#[inline]
fn to_f24dot8_point(p: Point) -> F24Dot8Point {
    F24Dot8Point::new(double_to_f24dot8(p.x), double_to_f24dot8(p.y))
}

fn update_start_covers_down(covers: &mut [i32], y0: F24Dot8, y1: F24Dot8) {
    debug_assert!(y0 < y1);

    let row0 = (y0 >> 8) as usize;
    let row1 = ((y1 - 1) >> 8) as usize;

    let fy0 = y0 - ((row0 as i32) << 8);
    let fy1 = y1 - ((row1 as i32) << 8);

    if row0 == row1 {
        covers[row0] -= fy1 - fy0;
    } else {
        covers[row0] -= 256 - fy0;

        for cover in &mut covers[row0 + 1..row1] {
            *cover -= 256;
        }

        covers[row1] -= fy1;
    }
}

fn update_start_covers_up(covers: &mut [i32], y0: F24Dot8, y1: F24Dot8) {
    debug_assert!(y0 > y1);

    let row0 = ((y0 - 1) >> 8) as usize;
    let row1 = (y1 >> 8) as usize;

    let fy0 = y0 - ((row0 as i32) << 8);
    let fy1 = y1 - ((row1 as i32) << 8);

    if row0 == row1 {
        covers[row0] += fy0 - fy1;
    } else {
        covers[row0] += fy0;

        for cover in &mut covers[row1 + 1..row0] {
            *cover += 256;
        }

        covers[row1] += 256 - fy1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line_block::{NarrowLines, NO_BLOCK};
    use crate::tile::Tile16x8;
    use peniko::color::PremulRgba8;
    use peniko::Fill;
    use crate::geometry::Path;

    fn square_geometry(x0: f64, y0: f64, x1: f64, y1: f64) -> Geometry {
        let mut b = Path::builder();
        b.move_to(x0, y0);
        b.line_to(x1, y0);
        b.line_to(x1, y1);
        b.line_to(x0, y1);
        b.close();

        Geometry::new(
            b.finish(),
            Affine::IDENTITY,
            PremulRgba8 { r: 255, g: 255, b: 255, a: 255 },
            Fill::NonZero,
        )
    }

    #[test]
    fn contained_square_fills_expected_rows() {
        let geometry = square_geometry(0.0, 0.0, 10.0, 10.0);
        let bounds = TileBounds { x: 0, y: 0, column_count: 1, row_count: 2 };
        let mut memory = ThreadMemory::new(0);

        let lin = Linearizer::<Tile16x8, NarrowLines>::process(
            bounds,
            true,
            &geometry,
            &Affine::IDENTITY,
            &mut memory,
        );

        let (rows, covers) = lin.into_parts();

        // The square spans rows 0 and 1; each row holds the two vertical
        // edges (horizontal edges are dropped).
        assert_eq!(rows.len(), 2);
        assert_ne!(rows[0].front_block(), NO_BLOCK);
        assert_eq!(rows[0].front_count(), 2);
        assert_ne!(rows[1].front_block(), NO_BLOCK);
        assert_eq!(rows[1].front_count(), 2);
        assert!(covers.is_none());
    }

    #[test]
    fn left_of_image_square_becomes_start_covers() {
        let geometry = square_geometry(-20.0, 0.0, -4.0, 16.0);
        let bounds = TileBounds { x: 0, y: 0, column_count: 1, row_count: 2 };
        let mut memory = ThreadMemory::new(0);

        let lin = Linearizer::<Tile16x8, NarrowLines>::process(
            bounds,
            false,
            &geometry,
            &Affine::IDENTITY,
            &mut memory,
        );

        let (rows, covers) = lin.into_parts();

        assert_eq!(rows[0].front_block(), NO_BLOCK);
        assert_eq!(rows[1].front_block(), NO_BLOCK);

        // Both edges lie left of x = 0: the down edge contributes -256 per
        // scanline, the up edge +256, so the backdrop cancels exactly. The
        // frame driver later drops all-zero rows.
        let covers = covers.expect("start covers expected");
        for row in covers.iter() {
            let row = row.as_deref().expect("both rows are covered");
            assert!(row.iter().all(|&c| c == 0));
        }
    }

    #[test]
    fn partially_left_rect_splits_into_covers_and_lines() {
        let geometry = square_geometry(-100.0, 0.0, 4.0, 10.0);
        let bounds = TileBounds { x: 0, y: 0, column_count: 1, row_count: 2 };
        let mut memory = ThreadMemory::new(0);

        let lin = Linearizer::<Tile16x8, NarrowLines>::process(
            bounds,
            false,
            &geometry,
            &Affine::IDENTITY,
            &mut memory,
        );

        let (rows, covers) = lin.into_parts();

        // The right edge at x = 4 is a real line.
        assert_ne!(rows[0].front_block(), NO_BLOCK);

        // The left edge went entirely into start covers.
        let covers = covers.expect("start covers expected");
        let first = covers[0].as_deref().expect("row 0 covered");
        assert_eq!(first, &[256; 8]);
    }
}
