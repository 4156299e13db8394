// Copyright 2026 the Rastro Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixed-capacity line segment blocks and the slab pool they live in.
//!
//! Every tile row of a linearized geometry owns a singly-linked list of
//! blocks, newest block first; only the newest block is partially filled.
//! Links are indices into the owning [`LineBlockPool`] rather than
//! pointers, and the pool recycles its storage between frames: clearing
//! truncates the slabs but keeps their capacity.

use crate::fixed::{pack_f8dot8x2, F24Dot8, F8Dot8x2};

/// Sentinel for "no block".
pub(crate) const NO_BLOCK: u32 = u32::MAX;

/// Segments stored per block.
pub(crate) const LINES_PER_BLOCK: usize = 32;

/// Narrow line block: all four endpoint coordinates fit in 8.8, two packed
/// words per segment. Used when a geometry spans less than 128 pixels of
/// tile columns.
pub(crate) struct NarrowBlock {
    /// `y0` and `y1` packed low/high.
    pub y0y1: [F8Dot8x2; LINES_PER_BLOCK],
    /// `x0` and `x1` packed low/high.
    pub x0x1: [F8Dot8x2; LINES_PER_BLOCK],
    /// Index of the next (older) block in the same row.
    pub next: u32,
}

/// Wide line block: Y values fit in 8.8, X values are kept in full 24.8.
pub(crate) struct WideBlock {
    /// `y0` and `y1` packed low/high.
    pub y0y1: [F8Dot8x2; LINES_PER_BLOCK],
    pub x0: [F24Dot8; LINES_PER_BLOCK],
    pub x1: [F24Dot8; LINES_PER_BLOCK],
    /// Index of the next (older) block in the same row.
    pub next: u32,
}

/// Which block layout a geometry's rows use.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum LineKind {
    Narrow,
    Wide,
}

/// Slab storage for line blocks, one pool per memory domain (worker thread
/// or the main thread).
#[derive(Default)]
pub(crate) struct LineBlockPool {
    pub narrow: Vec<NarrowBlock>,
    pub wide: Vec<WideBlock>,
}

impl LineBlockPool {
    fn new_narrow_block(&mut self, next: u32) -> u32 {
        let index = self.narrow.len() as u32;

        self.narrow.push(NarrowBlock {
            y0y1: [0; LINES_PER_BLOCK],
            x0x1: [0; LINES_PER_BLOCK],
            next,
        });

        index
    }

    fn new_wide_block(&mut self, next: u32) -> u32 {
        let index = self.wide.len() as u32;

        self.wide.push(WideBlock {
            y0y1: [0; LINES_PER_BLOCK],
            x0: [0; LINES_PER_BLOCK],
            x1: [0; LINES_PER_BLOCK],
            next,
        });

        index
    }

    /// Drops all blocks. Capacity is retained so the next frame reuses the
    /// same slabs.
    pub fn clear(&mut self) {
        self.narrow.clear();
        self.wide.clear();
    }
}

/// Per-tile-row append state for one of the two block layouts.
///
/// The front block is the newest one and the only one that may be partially
/// filled; iteration starts there with [`LineList::front_count`] valid
/// segments and continues through full blocks.
pub(crate) trait LineList: Default {
    const KIND: LineKind;

    /// Appends a segment, dropping horizontal ones.
    fn append(&mut self, pool: &mut LineBlockPool, x0: F24Dot8, y0: F24Dot8, x1: F24Dot8, y1: F24Dot8);

    /// Index of the front block, or [`NO_BLOCK`].
    fn front_block(&self) -> u32;

    /// Number of valid segments in the front block.
    fn front_count(&self) -> u32;
}

/// Append state for [`NarrowBlock`] rows.
pub(crate) struct NarrowLines {
    current: u32,
    count: u32,
}

impl Default for NarrowLines {
    fn default() -> Self {
        Self {
            current: NO_BLOCK,
            count: LINES_PER_BLOCK as u32,
        }
    }
}

impl LineList for NarrowLines {
    const KIND: LineKind = LineKind::Narrow;

    #[inline]
    fn append(&mut self, pool: &mut LineBlockPool, x0: F24Dot8, y0: F24Dot8, x1: F24Dot8, y1: F24Dot8) {
        if y0 == y1 {
            return;
        }

        let y0y1 = pack_f8dot8x2(y0, y1);
        let x0x1 = pack_f8dot8x2(x0, x1);
        let count = self.count as usize;

        if count < LINES_PER_BLOCK {
            let block = &mut pool.narrow[self.current as usize];

            block.y0y1[count] = y0y1;
            block.x0x1[count] = x0x1;

            self.count += 1;
        } else {
            let index = pool.new_narrow_block(self.current);
            let block = &mut pool.narrow[index as usize];

            block.y0y1[0] = y0y1;
            block.x0x1[0] = x0x1;

            self.count = 1;
            self.current = index;
        }
    }

    fn front_block(&self) -> u32 {
        self.current
    }

    fn front_count(&self) -> u32 {
        if self.current == NO_BLOCK {
            0
        } else {
            self.count
        }
    }
}

/// Append state for [`WideBlock`] rows.
pub(crate) struct WideLines {
    current: u32,
    count: u32,
}

impl Default for WideLines {
    fn default() -> Self {
        Self {
            current: NO_BLOCK,
            count: LINES_PER_BLOCK as u32,
        }
    }
}

impl LineList for WideLines {
    const KIND: LineKind = LineKind::Wide;

    #[inline]
    fn append(&mut self, pool: &mut LineBlockPool, x0: F24Dot8, y0: F24Dot8, x1: F24Dot8, y1: F24Dot8) {
        if y0 == y1 {
            return;
        }

        let y0y1 = pack_f8dot8x2(y0, y1);
        let count = self.count as usize;

        if count < LINES_PER_BLOCK {
            let block = &mut pool.wide[self.current as usize];

            block.y0y1[count] = y0y1;
            block.x0[count] = x0;
            block.x1[count] = x1;

            self.count += 1;
        } else {
            let index = pool.new_wide_block(self.current);
            let block = &mut pool.wide[index as usize];

            block.y0y1[0] = y0y1;
            block.x0[0] = x0;
            block.x1[0] = x1;

            self.count = 1;
            self.current = index;
        }
    }

    fn front_block(&self) -> u32 {
        self.current
    }

    fn front_count(&self) -> u32 {
        if self.current == NO_BLOCK {
            0
        } else {
            self.count
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::{unpack_hi_f8dot8x2, unpack_lo_f8dot8x2};

    #[test]
    fn narrow_append_chains_blocks() {
        let mut pool = LineBlockPool::default();
        let mut lines = NarrowLines::default();

        assert_eq!(lines.front_block(), NO_BLOCK);
        assert_eq!(lines.front_count(), 0);

        for i in 0..40 {
            lines.append(&mut pool, i, 0, i + 1, 256);
        }

        // 40 segments span two blocks, the front block holds the newest 8.
        assert_eq!(lines.front_count(), 8);
        let front = &pool.narrow[lines.front_block() as usize];
        assert_ne!(front.next, NO_BLOCK);
        assert_eq!(unpack_lo_f8dot8x2(front.x0x1[0]), 32);
        assert_eq!(unpack_hi_f8dot8x2(front.x0x1[0]), 33);

        let older = &pool.narrow[front.next as usize];
        assert_eq!(older.next, NO_BLOCK);
        assert_eq!(unpack_lo_f8dot8x2(older.x0x1[31]), 31);
    }

    #[test]
    fn horizontal_segments_are_dropped() {
        let mut pool = LineBlockPool::default();
        let mut lines = WideLines::default();

        lines.append(&mut pool, 0, 128, 512, 128);
        assert_eq!(lines.front_count(), 0);

        lines.append(&mut pool, 0, 0, 512, 256);
        assert_eq!(lines.front_count(), 1);
        let front = &pool.wide[lines.front_block() as usize];
        assert_eq!(front.x0[0], 0);
        assert_eq!(front.x1[0], 512);
    }

    #[test]
    fn clear_retains_capacity() {
        let mut pool = LineBlockPool::default();
        let mut lines = NarrowLines::default();

        for i in 0..100 {
            lines.append(&mut pool, 0, i & 0xff, 256, (i + 1) & 0x1ff);
        }

        let capacity = pool.narrow.capacity();
        assert!(capacity >= 3);

        pool.clear();
        assert!(pool.narrow.is_empty());
        assert_eq!(pool.narrow.capacity(), capacity);
    }
}
