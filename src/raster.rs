// Copyright 2026 the Rastro Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-tile-row coverage accumulation and span emission.
//!
//! Segments are replayed into a sparse `(cover, area)` table: one pair of
//! signed accumulators per pixel, guarded by a bit vector of touched pixels
//! so only the bits are cleared between items. A segment crossing a pixel
//! cell from `(x0, y0)` to `(x1, y1)` in cell-local 24.8 coordinates
//! contributes `y0 - y1` to the cover and `(y0 - y1) · (512 - x0 - x1)` to
//! the area. After all segments of an item are accumulated, set bits are
//! walked in ascending pixel order, converting areas to alpha under the
//! active fill rule and coalescing equal-alpha runs into spans.

use crate::fine::SpanBlend;
use crate::fixed::{F24Dot8, F24DOT8_1, F24DOT8_2};

/// Converts an accumulated signed area to 8-bit alpha.
pub(crate) trait FillRuleAlpha {
    fn alpha(area: i32) -> u32;
}

/// Non-zero winding: `min(|area|, 1.0)`.
pub(crate) struct NonZeroAlpha;

impl FillRuleAlpha for NonZeroAlpha {
    #[inline]
    fn alpha(area: i32) -> u32 {
        (area >> 9).unsigned_abs().min(255)
    }
}

/// Even-odd winding: `|area - 2.0 · round(0.5 · area)|`.
pub(crate) struct EvenOddAlpha;

impl FillRuleAlpha for EvenOddAlpha {
    #[inline]
    fn alpha(area: i32) -> u32 {
        let folded = (area >> 9).unsigned_abs() & 511;

        if folded > 256 {
            512 - folded
        } else {
            folded.min(255)
        }
    }
}

/// Returns 1 when `v` is positive and sits exactly on a pixel boundary,
/// otherwise 0. Subtracting it before a `>> 8` keeps boundary coordinates
/// in the cell to their left.
#[inline]
fn find_adjustment(v: F24Dot8) -> F24Dot8 {
    F24Dot8::from(v > 0 && (v & 255) == 0)
}

#[inline]
fn conditional_set_bit(bits: &mut [u64], index: usize) -> bool {
    let word = index / 64;
    let bit = 1_u64 << (index % 64);
    let current = bits[word];

    if current & bit == 0 {
        bits[word] = current | bit;

        true
    } else {
        false
    }
}

/// The per-task scratch tables of the row rasterizer: a bit-vector row and
/// an interleaved `[cover, area]` row per scanline of the tile.
pub(crate) struct RowScratch<'a> {
    bits: &'a mut [u64],
    bit_stride: usize,
    cover_area: &'a mut [i32],
    ca_stride: usize,
}

impl<'a> RowScratch<'a> {
    pub fn new(
        bits: &'a mut [u64],
        bit_stride: usize,
        cover_area: &'a mut [i32],
        ca_stride: usize,
    ) -> Self {
        Self {
            bits,
            bit_stride,
            cover_area,
            ca_stride,
        }
    }

    /// Clears the first `words` bits of every scanline row. Only the bits
    /// are cleared between items; cover/area slots are invalidated by their
    /// guard bits.
    pub fn clear_bits(&mut self, rows: usize, words: usize) {
        for i in 0..rows {
            self.bits[i * self.bit_stride..i * self.bit_stride + words].fill(0);
        }
    }

    pub fn bit_row(&self, row: usize) -> &[u64] {
        &self.bits[row * self.bit_stride..(row + 1) * self.bit_stride]
    }

    pub fn cover_area_row(&self, row: usize) -> &[i32] {
        &self.cover_area[row * self.ca_stride..(row + 1) * self.ca_stride]
    }

    #[inline]
    fn cell(&mut self, px: u32, py: u32, x0: F24Dot8, y0: F24Dot8, x1: F24Dot8, y1: F24Dot8) {
        let delta = y0 - y1;
        let area = delta * (F24DOT8_2 - x0 - x1);
        let index = (px as usize) << 1;

        let bits = &mut self.bits[py as usize * self.bit_stride..][..self.bit_stride];
        let ca = &mut self.cover_area[py as usize * self.ca_stride..][..self.ca_stride];

        if conditional_set_bit(bits, px as usize) {
            ca[index] = delta;
            ca[index + 1] = area;
        } else {
            ca[index] += delta;
            ca[index + 1] += area;
        }
    }

    #[inline]
    fn cell_vertical(&mut self, px: u32, py: u32, x: F24Dot8, y0: F24Dot8, y1: F24Dot8) {
        self.cell(px, py, x, y0, x, y1);
    }

    fn vertical_down(&mut self, column: u32, y0: F24Dot8, y1: F24Dot8, x: F24Dot8) {
        debug_assert!(y0 < y1);

        let row0 = (y0 >> 8) as u32;
        let row1 = ((y1 - 1) >> 8) as u32;
        let fy0 = y0 - ((row0 as i32) << 8);
        let fy1 = y1 - ((row1 as i32) << 8);
        let fx = x - ((column as i32) << 8);

        if row0 == row1 {
            self.cell_vertical(column, row0, fx, fy0, fy1);
        } else {
            self.cell_vertical(column, row0, fx, fy0, F24DOT8_1);

            for i in row0 + 1..row1 {
                self.cell_vertical(column, i, fx, 0, F24DOT8_1);
            }

            self.cell_vertical(column, row1, fx, 0, fy1);
        }
    }

    fn vertical_up(&mut self, column: u32, y0: F24Dot8, y1: F24Dot8, x: F24Dot8) {
        debug_assert!(y0 > y1);

        let row0 = ((y0 - 1) >> 8) as u32;
        let row1 = (y1 >> 8) as u32;
        let fy0 = y0 - ((row0 as i32) << 8);
        let fy1 = y1 - ((row1 as i32) << 8);
        let fx = x - ((column as i32) << 8);

        if row0 == row1 {
            self.cell_vertical(column, row0, fx, fy0, fy1);
        } else {
            self.cell_vertical(column, row0, fx, fy0, 0);

            let mut i = row0;
            while i > row1 + 1 {
                i -= 1;
                self.cell_vertical(column, i, fx, F24DOT8_1, 0);
            }

            self.cell_vertical(column, row1, fx, F24DOT8_1, fy1);
        }
    }

    /// ⬊ within one scanline, left to right.
    fn row_down_r(&mut self, row: u32, p0x: F24Dot8, p0y: F24Dot8, p1x: F24Dot8, p1y: F24Dot8) {
        debug_assert!(p0x < p1x);
        debug_assert!(p0y <= p1y);

        let col0 = (p0x >> 8) as u32;
        let col1 = ((p1x - 1) >> 8) as u32;

        let fx0 = p0x - ((col0 as i32) << 8);
        let fx1 = p1x - ((col1 as i32) << 8);

        if col0 == col1 {
            self.cell(col0, row, fx0, p0y, fx1, p1y);
        } else {
            let dx = p1x - p0x;
            let dy = p1y - p0y;

            let pp = (F24DOT8_1 - fx0) * dy;
            let mut cy = p0y + pp / dx;

            self.cell(col0, row, fx0, p0y, F24DOT8_1, cy);

            let mut idx = col0 + 1;

            if idx != col1 {
                let mut rem_acc = (pp % dx) - dx;

                let p = F24DOT8_1 * dy;
                let lift = p / dx;
                let rem = p % dx;

                while idx != col1 {
                    let mut delta = lift;

                    rem_acc += rem;

                    if rem_acc >= 0 {
                        rem_acc -= dx;
                        delta += 1;
                    }

                    let ny = cy + delta;

                    self.cell(idx, row, 0, cy, F24DOT8_1, ny);

                    cy = ny;
                    idx += 1;
                }
            }

            self.cell(col1, row, 0, cy, fx1, p1y);
        }
    }

    /// ⬊ within one scanline, left to right or vertical.
    fn row_down_r_v(&mut self, row: u32, p0x: F24Dot8, p0y: F24Dot8, p1x: F24Dot8, p1y: F24Dot8) {
        if p0x < p1x {
            self.row_down_r(row, p0x, p0y, p1x, p1y);
        } else {
            let column = ((p0x - find_adjustment(p0x)) >> 8) as u32;
            let x = p0x - ((column as i32) << 8);

            self.cell_vertical(column, row, x, p0y, p1y);
        }
    }

    /// ⬈ within one scanline, left to right.
    fn row_up_r(&mut self, row: u32, p0x: F24Dot8, p0y: F24Dot8, p1x: F24Dot8, p1y: F24Dot8) {
        debug_assert!(p0x < p1x);
        debug_assert!(p0y >= p1y);

        let col0 = (p0x >> 8) as u32;
        let col1 = ((p1x - 1) >> 8) as u32;

        let fx0 = p0x - ((col0 as i32) << 8);
        let fx1 = p1x - ((col1 as i32) << 8);

        if col0 == col1 {
            self.cell(col0, row, fx0, p0y, fx1, p1y);
        } else {
            let dx = p1x - p0x;
            let dy = p0y - p1y;

            let pp = (F24DOT8_1 - fx0) * dy;
            let mut cy = p0y - pp / dx;

            self.cell(col0, row, fx0, p0y, F24DOT8_1, cy);

            let mut idx = col0 + 1;

            if idx != col1 {
                let mut rem_acc = (pp % dx) - dx;

                let p = F24DOT8_1 * dy;
                let lift = p / dx;
                let rem = p % dx;

                while idx != col1 {
                    let mut delta = lift;

                    rem_acc += rem;

                    if rem_acc >= 0 {
                        rem_acc -= dx;
                        delta += 1;
                    }

                    let ny = cy - delta;

                    self.cell(idx, row, 0, cy, F24DOT8_1, ny);

                    cy = ny;
                    idx += 1;
                }
            }

            self.cell(col1, row, 0, cy, fx1, p1y);
        }
    }

    /// ⬈ within one scanline, left to right or vertical.
    fn row_up_r_v(&mut self, row: u32, p0x: F24Dot8, p0y: F24Dot8, p1x: F24Dot8, p1y: F24Dot8) {
        if p0x < p1x {
            self.row_up_r(row, p0x, p0y, p1x, p1y);
        } else {
            let column = ((p0x - find_adjustment(p0x)) >> 8) as u32;
            let x = p0x - ((column as i32) << 8);

            self.cell_vertical(column, row, x, p0y, p1y);
        }
    }

    /// ⬋ within one scanline, right to left.
    fn row_down_l(&mut self, row: u32, p0x: F24Dot8, p0y: F24Dot8, p1x: F24Dot8, p1y: F24Dot8) {
        debug_assert!(p0x > p1x);
        debug_assert!(p0y <= p1y);

        let col0 = ((p0x - 1) >> 8) as u32;
        let col1 = (p1x >> 8) as u32;

        let fx0 = p0x - ((col0 as i32) << 8);
        let fx1 = p1x - ((col1 as i32) << 8);

        if col0 == col1 {
            self.cell(col0, row, fx0, p0y, fx1, p1y);
        } else {
            let dx = p0x - p1x;
            let dy = p1y - p0y;

            let pp = fx0 * dy;
            let mut cy = p0y + pp / dx;

            self.cell(col0, row, fx0, p0y, 0, cy);

            let mut idx = col0 - 1;

            if idx != col1 {
                let mut rem_acc = (pp % dx) - dx;

                let p = F24DOT8_1 * dy;
                let lift = p / dx;
                let rem = p % dx;

                while idx != col1 {
                    let mut delta = lift;

                    rem_acc += rem;

                    if rem_acc >= 0 {
                        rem_acc -= dx;
                        delta += 1;
                    }

                    let ny = cy + delta;

                    self.cell(idx, row, F24DOT8_1, cy, 0, ny);

                    cy = ny;
                    idx -= 1;
                }
            }

            self.cell(col1, row, F24DOT8_1, cy, fx1, p1y);
        }
    }

    /// ⬋ within one scanline, right to left or vertical.
    fn row_down_l_v(&mut self, row: u32, p0x: F24Dot8, p0y: F24Dot8, p1x: F24Dot8, p1y: F24Dot8) {
        if p0x > p1x {
            self.row_down_l(row, p0x, p0y, p1x, p1y);
        } else {
            let column = ((p0x - find_adjustment(p0x)) >> 8) as u32;
            let x = p0x - ((column as i32) << 8);

            self.cell_vertical(column, row, x, p0y, p1y);
        }
    }

    /// ⬉ within one scanline, right to left.
    fn row_up_l(&mut self, row: u32, p0x: F24Dot8, p0y: F24Dot8, p1x: F24Dot8, p1y: F24Dot8) {
        debug_assert!(p0x > p1x);
        debug_assert!(p0y >= p1y);

        let col0 = ((p0x - 1) >> 8) as u32;
        let col1 = (p1x >> 8) as u32;

        let fx0 = p0x - ((col0 as i32) << 8);
        let fx1 = p1x - ((col1 as i32) << 8);

        if col0 == col1 {
            self.cell(col0, row, fx0, p0y, fx1, p1y);
        } else {
            let dx = p0x - p1x;
            let dy = p0y - p1y;

            let pp = fx0 * dy;
            let mut cy = p0y - pp / dx;

            self.cell(col0, row, fx0, p0y, 0, cy);

            let mut idx = col0 - 1;

            if idx != col1 {
                let mut rem_acc = (pp % dx) - dx;

                let p = F24DOT8_1 * dy;
                let lift = p / dx;
                let rem = p % dx;

                while idx != col1 {
                    let mut delta = lift;

                    rem_acc += rem;

                    if rem_acc >= 0 {
                        rem_acc -= dx;
                        delta += 1;
                    }

                    let ny = cy - delta;

                    self.cell(idx, row, F24DOT8_1, cy, 0, ny);

                    cy = ny;
                    idx -= 1;
                }
            }

            self.cell(col1, row, F24DOT8_1, cy, fx1, p1y);
        }
    }

    /// ⬉ within one scanline, right to left or vertical.
    fn row_up_l_v(&mut self, row: u32, p0x: F24Dot8, p0y: F24Dot8, p1x: F24Dot8, p1y: F24Dot8) {
        if p0x > p1x {
            self.row_up_l(row, p0x, p0y, p1x, p1y);
        } else {
            let column = ((p0x - find_adjustment(p0x)) >> 8) as u32;
            let x = p0x - ((column as i32) << 8);

            self.cell_vertical(column, row, x, p0y, p1y);
        }
    }

    /// ⬊ across scanlines.
    fn line_down_r(&mut self, row0: u32, row1: u32, x0: F24Dot8, y0: F24Dot8, x1: F24Dot8, y1: F24Dot8) {
        debug_assert!(y0 < y1);
        debug_assert!(x0 < x1);
        debug_assert!(row0 < row1);

        let dx = x1 - x0;
        let dy = y1 - y0;

        let fy0 = y0 - ((row0 as i32) << 8);
        let fy1 = y1 - ((row1 as i32) << 8);

        let p = (F24DOT8_1 - fy0) * dx;
        let mut delta = p / dy;

        let mut cx = x0 + delta;

        self.row_down_r_v(row0, x0, fy0, cx, F24DOT8_1);

        let mut idy = row0 + 1;

        if idy != row1 {
            let mut rem_acc = (p % dy) - dy;

            let p = F24DOT8_1 * dx;
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

                self.row_down_r_v(idy, cx, 0, nx, F24DOT8_1);

                cx = nx;
                idy += 1;
            }
        }

        self.row_down_r_v(row1, cx, 0, x1, fy1);
    }

    /// ⬈ across scanlines.
    fn line_up_r(&mut self, row0: u32, row1: u32, x0: F24Dot8, y0: F24Dot8, x1: F24Dot8, y1: F24Dot8) {
        debug_assert!(y0 > y1);
        debug_assert!(x0 < x1);
        debug_assert!(row0 > row1);

        let dx = x1 - x0;
        let dy = y0 - y1;

        let fy0 = y0 - ((row0 as i32) << 8);
        let fy1 = y1 - ((row1 as i32) << 8);

        let p = fy0 * dx;
        let mut delta = p / dy;

        let mut cx = x0 + delta;

        self.row_up_r_v(row0, x0, fy0, cx, 0);

        let mut idy = row0 - 1;

        if idy != row1 {
            let mut rem_acc = (p % dy) - dy;

            let p = F24DOT8_1 * dx;
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

                self.row_up_r_v(idy, cx, F24DOT8_1, nx, 0);

                cx = nx;
                idy -= 1;
            }
        }

        self.row_up_r_v(row1, cx, F24DOT8_1, x1, fy1);
    }

    /// ⬋ across scanlines.
    fn line_down_l(&mut self, row0: u32, row1: u32, x0: F24Dot8, y0: F24Dot8, x1: F24Dot8, y1: F24Dot8) {
        debug_assert!(y0 < y1);
        debug_assert!(x0 > x1);
        debug_assert!(row0 < row1);

        let dx = x0 - x1;
        let dy = y1 - y0;

        let fy0 = y0 - ((row0 as i32) << 8);
        let fy1 = y1 - ((row1 as i32) << 8);

        let p = (F24DOT8_1 - fy0) * dx;
        let mut delta = p / dy;

        let mut cx = x0 - delta;

        self.row_down_l_v(row0, x0, fy0, cx, F24DOT8_1);

        let mut idy = row0 + 1;

        if idy != row1 {
            let mut rem_acc = (p % dy) - dy;

            let p = F24DOT8_1 * dx;
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

                self.row_down_l_v(idy, cx, 0, nx, F24DOT8_1);

                cx = nx;
                idy += 1;
            }
        }

        self.row_down_l_v(row1, cx, 0, x1, fy1);
    }

    /// ⬉ across scanlines.
    fn line_up_l(&mut self, row0: u32, row1: u32, x0: F24Dot8, y0: F24Dot8, x1: F24Dot8, y1: F24Dot8) {
        debug_assert!(y0 > y1);
        debug_assert!(x0 > x1);
        debug_assert!(row0 > row1);

        let dx = x0 - x1;
        let dy = y0 - y1;

        let fy0 = y0 - ((row0 as i32) << 8);
        let fy1 = y1 - ((row1 as i32) << 8);

        let p = fy0 * dx;
        let mut delta = p / dy;

        let mut cx = x0 - delta;

        self.row_up_l_v(row0, x0, fy0, cx, 0);

        let mut idy = row0 - 1;

        if idy != row1 {
            let mut rem_acc = (p % dy) - dy;

            let p = F24DOT8_1 * dx;
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

                self.row_up_l_v(idy, cx, F24DOT8_1, nx, 0);

                cx = nx;
                idy -= 1;
            }
        }

        self.row_up_l_v(row1, cx, F24DOT8_1, x1, fy1);
    }

    /// Accumulates one segment in tile-row-local 24.8 coordinates.
    pub fn rasterize_line(&mut self, x0: F24Dot8, y0: F24Dot8, x1: F24Dot8, y1: F24Dot8) {
        debug_assert!(y0 != y1);

        if x0 == x1 {
            let column = ((x0 - find_adjustment(x0)) >> 8) as u32;

            // Vertical line, simplifies things a lot.
            if y0 < y1 {
                self.vertical_down(column, y0, y1, x0);
            } else {
                self.vertical_up(column, y0, y1, x0);
            }

            return;
        }

        if y0 < y1 {
            // Line is going down ↓.
            let row0 = (y0 >> 8) as u32;
            let row1 = ((y1 - 1) >> 8) as u32;

            debug_assert!(row0 <= row1);

            if row0 == row1 {
                // Entirely within one scanline, the common case for
                // flattened curves.
                let ty = (row0 as i32) << 8;

                if x0 < x1 {
                    self.row_down_r(row0, x0, y0 - ty, x1, y1 - ty);
                } else {
                    self.row_down_l(row0, x0, y0 - ty, x1, y1 - ty);
                }
            } else if x0 < x1 {
                self.line_down_r(row0, row1, x0, y0, x1, y1);
            } else {
                self.line_down_l(row0, row1, x0, y0, x1, y1);
            }
        } else {
            // Line is going up ↑.
            let row0 = ((y0 - 1) >> 8) as u32;
            let row1 = (y1 >> 8) as u32;

            debug_assert!(row1 <= row0);

            if row0 == row1 {
                let ty = (row0 as i32) << 8;

                if x0 < x1 {
                    self.row_up_r(row0, x0, y0 - ty, x1, y1 - ty);
                } else {
                    self.row_up_l(row0, x0, y0 - ty, x1, y1 - ty);
                }
            } else if x0 < x1 {
                self.line_up_r(row0, row1, x0, y0, x1, y1);
            } else {
                self.line_up_l(row0, row1, x0, y0, x1, y1);
            }
        }
    }
}

#[inline]
fn flush<B: SpanBlend>(
    blender: &B,
    dst: &mut [[u8; 4]],
    from: usize,
    to: usize,
    row_length: usize,
    alpha: u32,
) {
    // Coverage may extend into the tile padding past the logical width;
    // everything right of `row_length` is clipped away here.
    let to = to.min(row_length);

    if alpha != 0 && from < to {
        blender.composite_span(&mut dst[from..to], alpha);
    }
}

/// Walks the set bits of one scanline, converts areas to alpha under fill
/// rule `R`, coalesces runs of equal alpha and composites them with `B`.
///
/// `x` is the pixel position of the first bit, `start_cover` the backdrop
/// carried in from segments left of the image. A non-zero cover remaining
/// past the last set bit fills the rest of the row.
pub(crate) fn render_line<B: SpanBlend, R: FillRuleAlpha>(
    dst: &mut [[u8; 4]],
    bits: &[u64],
    cover_area: &[i32],
    x: usize,
    row_length: usize,
    start_cover: i32,
    blender: &B,
) {
    let mut cover = start_cover;

    // Span state.
    let mut span_x = x;
    let mut span_end = x;
    let mut span_alpha = 0_u32;

    for (word_index, &word) in bits.iter().enumerate() {
        let mut bitset = word;

        while bitset != 0 {
            let bit = bitset.trailing_zeros() as usize;

            bitset &= bitset - 1;

            // Bit indices are local to the geometry's tile span.
            let index = word_index * 64 + bit;
            let table_index = index << 1;
            let edge_x = index + x;
            let next_edge_x = edge_x + 1;

            let area = cover_area[table_index + 1] + (cover << 9);
            let alpha = R::alpha(area);

            if span_end == edge_x {
                // No gap between the previous span and this pixel.
                if alpha == 0 {
                    flush(blender, dst, span_x, span_end, row_length, span_alpha);

                    span_x = next_edge_x;
                    span_end = next_edge_x;
                    span_alpha = 0;
                } else if span_alpha == alpha {
                    span_end = next_edge_x;
                } else {
                    flush(blender, dst, span_x, span_end, row_length, span_alpha);

                    span_x = edge_x;
                    span_end = next_edge_x;
                    span_alpha = alpha;
                }
            } else {
                debug_assert!(span_end < edge_x);

                if cover == 0 {
                    // Empty gap.
                    flush(blender, dst, span_x, span_end, row_length, span_alpha);

                    span_x = edge_x;
                    span_end = next_edge_x;
                    span_alpha = alpha;
                } else {
                    // Non-empty gap; try to merge it with the current span.
                    let gap_alpha = R::alpha(cover << 9);

                    if span_alpha == gap_alpha {
                        if alpha == gap_alpha {
                            // Current pixel matches as well.
                            span_end = next_edge_x;
                        } else {
                            // Only the gap matches; the span absorbs it.
                            flush(blender, dst, span_x, edge_x, row_length, span_alpha);

                            span_x = edge_x;
                            span_end = next_edge_x;
                            span_alpha = alpha;
                        }
                    } else {
                        flush(blender, dst, span_x, span_end, row_length, span_alpha);
                        flush(blender, dst, span_end, edge_x, row_length, gap_alpha);

                        span_x = edge_x;
                        span_end = next_edge_x;
                        span_alpha = alpha;
                    }
                }
            }

            cover += cover_area[table_index];
        }
    }

    flush(blender, dst, span_x, span_end, row_length, span_alpha);

    if cover != 0 && span_end < row_length {
        // Whatever remains covered runs to the edge of the image.
        let alpha = R::alpha(cover << 9);

        flush(blender, dst, span_end, row_length, row_length, alpha);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fine::SpanBlenderOpaque;

    #[test]
    fn fill_rule_alpha_tables() {
        // Full single coverage maps to opaque under both rules.
        assert_eq!(NonZeroAlpha::alpha(256 << 9), 255);
        assert_eq!(EvenOddAlpha::alpha(256 << 9), 255);

        // Double winding stays opaque under non-zero, cancels under
        // even-odd.
        assert_eq!(NonZeroAlpha::alpha(512 << 9), 255);
        assert_eq!(EvenOddAlpha::alpha(512 << 9), 0);

        // Winding direction does not matter.
        assert_eq!(NonZeroAlpha::alpha(-(256 << 9)), 255);
        assert_eq!(EvenOddAlpha::alpha(-(384 << 9)), 128);

        // Half coverage.
        assert_eq!(NonZeroAlpha::alpha(128 << 9), 128);
        assert_eq!(EvenOddAlpha::alpha(128 << 9), 128);

        assert_eq!(NonZeroAlpha::alpha(0), 0);
        assert_eq!(EvenOddAlpha::alpha(0), 0);
    }

    #[test]
    fn pixel_boundary_adjustment() {
        assert_eq!(find_adjustment(0), 0);
        assert_eq!(find_adjustment(1), 0);
        assert_eq!(find_adjustment(256), 1);
        assert_eq!(find_adjustment(257), 0);
        assert_eq!(find_adjustment(512), 1);
    }

    #[test]
    fn single_cell_square_coverage() {
        // One 8-scanline tile row, four pixels wide. A vertical edge down
        // at x=1 and up at x=3 between them covers pixels 1 and 2 of every
        // scanline.
        let mut bits = [0_u64; 8];
        let mut cover_area = [0_i32; 8 * 8];
        let mut scratch = RowScratch::new(&mut bits, 1, &mut cover_area, 8);

        scratch.rasterize_line(256, 0, 256, 8 << 8);
        scratch.rasterize_line(3 * 256, 8 << 8, 3 * 256, 0);

        let mut row = [[0_u8; 4]; 4];
        let blender = SpanBlenderOpaque::new(0xff00_00ff);

        render_line::<_, NonZeroAlpha>(
            &mut row,
            scratch.bit_row(0),
            scratch.cover_area_row(0),
            0,
            4,
            0,
            &blender,
        );

        assert_eq!(row[0], [0, 0, 0, 0]);
        assert_eq!(row[1], [255, 0, 0, 255]);
        assert_eq!(row[2], [255, 0, 0, 255]);
        assert_eq!(row[3], [0, 0, 0, 0]);
    }

    #[test]
    fn trailing_cover_runs_to_row_end() {
        // A single down edge at x=1 with nothing closing it: everything to
        // its right is covered by the trailing cover flush.
        let mut bits = [0_u64; 8];
        let mut cover_area = [0_i32; 8 * 8];
        let mut scratch = RowScratch::new(&mut bits, 1, &mut cover_area, 8);

        scratch.rasterize_line(256, 0, 256, 8 << 8);

        let mut row = [[0_u8; 4]; 4];
        let blender = SpanBlenderOpaque::new(0xff00_00ff);

        render_line::<_, NonZeroAlpha>(
            &mut row,
            scratch.bit_row(0),
            scratch.cover_area_row(0),
            0,
            4,
            0,
            &blender,
        );

        assert_eq!(row[0], [0, 0, 0, 0]);
        assert_eq!(row[1], [255, 0, 0, 255]);
        assert_eq!(row[2], [255, 0, 0, 255]);
        assert_eq!(row[3], [255, 0, 0, 255]);
    }
}
