// Copyright 2026 the Rastro Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-thread memory with frame and task lifetimes.
//!
//! Each worker thread (and the main thread) owns one [`ThreadMemory`].
//! Frame memory holds data that must survive until the frame completes: the
//! line-block slabs. Task memory holds scratch that is only valid within a
//! single `parallel_for` iteration: the quantized point buffer and the
//! bit-vector and cover/area tables of the row rasterizer. Both resets are
//! O(1) truncations; capacity is retained so steady-state frames allocate
//! nothing.

use crate::fixed::F24Dot8Point;
use crate::line_block::LineBlockPool;

/// Memory owned by one worker (or the main thread).
pub struct ThreadMemory {
    /// Which memory domain this is: worker index, or the extra main-thread
    /// slot.
    pub(crate) domain: u32,
    pub(crate) frame: FrameMemory,
    pub(crate) task: TaskMemory,
}

impl ThreadMemory {
    pub(crate) fn new(domain: u32) -> Self {
        Self {
            domain,
            frame: FrameMemory::default(),
            task: TaskMemory::default(),
        }
    }

    /// Invalidates all task-lifetime scratch. Called automatically after
    /// every `parallel_for` iteration body.
    pub fn reset_task_memory(&mut self) {
        self.task.reset();
    }

    /// Invalidates all frame-lifetime allocations. Called by the frame
    /// driver once the frame completes.
    pub fn reset_frame_memory(&mut self) {
        self.frame.reset();
    }
}

/// Frame-lifetime storage: valid until the frame-level reset.
#[derive(Default)]
pub(crate) struct FrameMemory {
    pub line_blocks: LineBlockPool,
}

impl FrameMemory {
    fn reset(&mut self) {
        self.line_blocks.clear();
    }
}

/// Task-lifetime scratch: valid only within the current iteration body.
#[derive(Default)]
pub(crate) struct TaskMemory {
    /// Quantized path points, refilled per geometry by the linearizer.
    pub quantized: Vec<F24Dot8Point>,
    /// Bit-vector table of the row rasterizer, `TileH` rows of words.
    pub bit_vectors: Vec<u64>,
    /// Interleaved `[cover, area]` table, `TileH` rows.
    pub cover_area: Vec<i32>,
}

impl TaskMemory {
    fn reset(&mut self) {
        self.quantized.clear();
        self.bit_vectors.clear();
        self.cover_area.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resets_keep_capacity() {
        let mut memory = ThreadMemory::new(0);

        memory.task.quantized.reserve(1024);
        memory.task.bit_vectors.resize(64, u64::MAX);
        let capacity = memory.task.bit_vectors.capacity();

        memory.reset_task_memory();
        assert!(memory.task.bit_vectors.is_empty());
        assert_eq!(memory.task.bit_vectors.capacity(), capacity);
        assert!(memory.task.quantized.capacity() >= 1024);
    }
}
