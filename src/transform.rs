// Copyright 2026 the Rastro Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Helpers over [`kurbo::Affine`]: complexity classification, construction,
//! inversion, interpolation and the per-complexity point quantization used
//! by the linearizer.
//!
//! The coefficient order throughout is kurbo's `[a, b, c, d, e, f]`, mapping
//! `(x, y)` to `(a·x + c·y + e, b·x + d·y + f)`.

use crate::fixed::{double_to_f24dot8, F24Dot8, F24Dot8Point};
use crate::geometry::IntRect;
use crate::math::{fuzzy_is_zero, fuzzy_ne, fuzzy_not_zero};
use peniko::kurbo::{Affine, Point};

/// How complex an affine transform is. Derived by fuzzy comparison of the
/// six coefficients against 0 and 1, and used to select quantization fast
/// paths.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TransformComplexity {
    /// Transforming a point results in an identical point.
    Identity,
    /// Translation, no scale or other components.
    TranslationOnly,
    /// Scale, no translation or other components.
    ScaleOnly,
    /// A combination of translation and scale.
    TranslationScale,
    /// Potentially a combination of scale, translation, rotation and skew.
    Complex,
}

/// Classifies a transform by fuzzy comparison of its coefficients.
pub fn complexity(transform: &Affine) -> TransformComplexity {
    let [a, b, c, d, e, f] = transform.as_coeffs();

    let scale = fuzzy_ne(a, 1.0) || fuzzy_ne(d, 1.0);
    let skew = fuzzy_not_zero(b) || fuzzy_not_zero(c);
    let translation = fuzzy_not_zero(e) || fuzzy_not_zero(f);

    match (translation, scale, skew) {
        (false, false, false) => TransformComplexity::Identity,
        (true, false, false) => TransformComplexity::TranslationOnly,
        (false, true, false) => TransformComplexity::ScaleOnly,
        (true, true, false) => TransformComplexity::TranslationScale,
        _ => TransformComplexity::Complex,
    }
}

/// Rotation by `degrees`, with exact coefficients at multiples of 90°.
pub fn rotate_degrees(degrees: f64) -> Affine {
    if fuzzy_is_zero(degrees) {
        return Affine::IDENTITY;
    }

    let (s, c) = if degrees == 90.0 || degrees == -270.0 {
        (1.0, 0.0)
    } else if degrees == 180.0 || degrees == -180.0 {
        (0.0, -1.0)
    } else if degrees == -90.0 || degrees == 270.0 {
        (-1.0, 0.0)
    } else {
        let radians = degrees.to_radians();

        (radians.sin(), radians.cos())
    };

    Affine::new([c, s, -s, c, 0.0, 0.0])
}

/// Skew by the given angles in degrees.
pub fn skew_degrees(degrees_x: f64, degrees_y: f64) -> Affine {
    Affine::new([
        1.0,
        degrees_y.to_radians().tan(),
        degrees_x.to_radians().tan(),
        1.0,
        0.0,
        0.0,
    ])
}

/// Elementwise linear interpolation between two transforms.
pub fn lerp(from: &Affine, to: &Affine, t: f64) -> Affine {
    let a = from.as_coeffs();
    let b = to.as_coeffs();
    let mut m = [0.0; 6];

    for i in 0..6 {
        m[i] = a[i] + (b[i] - a[i]) * t;
    }

    Affine::new(m)
}

/// Inverse of a transform, or identity when the determinant is fuzzy-zero.
pub fn inverse_or_identity(transform: &Affine) -> Affine {
    let [a, b, c, d, e, f] = transform.as_coeffs();
    let det = a * d - b * c;

    if fuzzy_is_zero(det) {
        return Affine::IDENTITY;
    }

    Affine::new([
        d / det,
        -b / det,
        -c / det,
        a / det,
        (c * f - d * e) / det,
        (b * e - a * f) / det,
    ])
}

/// Maps all four corners of `rect` and returns the smallest integer
/// rectangle containing the result (floor of minima, ceiling of maxima).
pub fn map_bounding_rect(transform: &Affine, rect: &IntRect) -> IntRect {
    let corners = [
        *transform * Point::new(rect.min_x as f64, rect.min_y as f64),
        *transform * Point::new(rect.max_x as f64, rect.min_y as f64),
        *transform * Point::new(rect.min_x as f64, rect.max_y as f64),
        *transform * Point::new(rect.max_x as f64, rect.max_y as f64),
    ];

    let mut min_x = corners[0].x;
    let mut min_y = corners[0].y;
    let mut max_x = corners[0].x;
    let mut max_y = corners[0].y;

    for p in &corners[1..] {
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

#[inline]
fn round_to_f24dot8(v: f64) -> F24Dot8 {
    v.round() as F24Dot8
}

/// Maps and quantizes `src` into 24.8, subtracting `origin` and clamping to
/// `[0, size]` on both axes. The loop body is specialized per transform
/// complexity; the complexity is computed here, at the moment of
/// quantization, so it always agrees with the numeric values.
pub(crate) fn quantize_points(
    transform: &Affine,
    src: &[Point],
    dst: &mut Vec<F24Dot8Point>,
    origin: F24Dot8Point,
    size: F24Dot8Point,
) {
    dst.clear();
    dst.reserve(src.len());

    let [a, b, c, d, e, f] = transform.as_coeffs();

    match complexity(transform) {
        TransformComplexity::Identity => {
            for p in src {
                dst.push(F24Dot8Point::new(
                    (double_to_f24dot8(p.x) - origin.x).clamp(0, size.x),
                    (double_to_f24dot8(p.y) - origin.y).clamp(0, size.y),
                ));
            }
        }
        TransformComplexity::TranslationOnly => {
            for p in src {
                dst.push(F24Dot8Point::new(
                    (double_to_f24dot8(p.x + e) - origin.x).clamp(0, size.x),
                    (double_to_f24dot8(p.y + f) - origin.y).clamp(0, size.y),
                ));
            }
        }
        TransformComplexity::ScaleOnly => {
            let sx = a * 256.0;
            let sy = d * 256.0;

            for p in src {
                dst.push(F24Dot8Point::new(
                    (round_to_f24dot8(p.x * sx) - origin.x).clamp(0, size.x),
                    (round_to_f24dot8(p.y * sy) - origin.y).clamp(0, size.y),
                ));
            }
        }
        TransformComplexity::TranslationScale => {
            let sx = a * 256.0;
            let sy = d * 256.0;
            let tx = e * 256.0;
            let ty = f * 256.0;

            for p in src {
                dst.push(F24Dot8Point::new(
                    (round_to_f24dot8(p.x * sx + tx) - origin.x).clamp(0, size.x),
                    (round_to_f24dot8(p.y * sy + ty) - origin.y).clamp(0, size.y),
                ));
            }
        }
        TransformComplexity::Complex => {
            let (sa, sb, sc, sd, se, sf) =
                (a * 256.0, b * 256.0, c * 256.0, d * 256.0, e * 256.0, f * 256.0);

            for p in src {
                dst.push(F24Dot8Point::new(
                    (round_to_f24dot8(sa * p.x + sc * p.y + se) - origin.x).clamp(0, size.x),
                    (round_to_f24dot8(sb * p.x + sd * p.y + sf) - origin.y).clamp(0, size.y),
                ));
            }
        }
    }
}
