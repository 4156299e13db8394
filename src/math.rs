// Copyright 2026 the Rastro Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fuzzy floating-point comparisons.

#[inline]
pub(crate) fn fuzzy_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < f64::EPSILON
}

#[inline]
pub(crate) fn fuzzy_ne(a: f64, b: f64) -> bool {
    (a - b).abs() >= f64::EPSILON
}

#[inline]
pub(crate) fn fuzzy_is_zero(v: f64) -> bool {
    v.abs() < f64::EPSILON
}

#[inline]
pub(crate) fn fuzzy_not_zero(v: f64) -> bool {
    v.abs() >= f64::EPSILON
}
