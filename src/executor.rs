// Copyright 2026 the Rastro Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The fork-join worker pool driving all parallel stages.
//!
//! [`ThreadPool::parallel_for`] publishes an iteration count and lets the
//! workers compete for batches of indices through a shared atomic cursor;
//! the call returns once every worker has drained the cursor. Each worker
//! owns a [`ThreadMemory`], and the submitting thread contributes one more
//! memory domain of its own, used when work is too small to be worth
//! distributing. Task memory is reset after every iteration body.
//!
//! The OS threads come from a rayon pool, which also provides the wake-up
//! and finalization barrier; the pool is started lazily on first use and
//! lives until the [`ThreadPool`] is dropped.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::line_block::LineBlockPool;
use crate::memory::ThreadMemory;

/// Upper bound on worker threads.
const MAX_THREADS: usize = 128;

/// Iterations are handed out in batches to bound synchronization overhead
/// for tiny bodies.
fn batch_size(count: usize, threads: usize) -> usize {
    (count / (threads * 32)).min(64).max(1)
}

struct Workers {
    pool: rayon::ThreadPool,
    memories: Vec<Mutex<ThreadMemory>>,
}

impl Workers {
    fn start(thread_count: usize) -> Self {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(thread_count)
            .thread_name(|i| format!("rastro-worker-{i}"))
            .build()
            .unwrap();

        let memories = (0..thread_count)
            .map(|i| Mutex::new(ThreadMemory::new(i as u32)))
            .collect();

        Self { pool, memories }
    }
}

/// A fixed pool of worker threads with per-thread memory.
pub struct ThreadPool {
    thread_count: usize,
    workers: Option<Workers>,
    main_memory: ThreadMemory,
}

impl ThreadPool {
    /// Creates a pool sized to the available hardware parallelism, capped
    /// at 128 workers. Threads are not started until the first call to
    /// [`parallel_for`](Self::parallel_for) that needs them.
    pub fn new() -> Self {
        let threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);

        Self::with_thread_count(threads)
    }

    /// Creates a pool with an explicit worker count, clamped to `1..=128`.
    pub fn with_thread_count(threads: usize) -> Self {
        let thread_count = threads.clamp(1, MAX_THREADS);

        Self {
            thread_count,
            workers: None,
            main_memory: ThreadMemory::new(thread_count as u32),
        }
    }

    /// Number of worker threads.
    pub fn thread_count(&self) -> usize {
        self.thread_count
    }

    /// Number of memory domains: the workers plus the submitting thread.
    pub(crate) fn domain_count(&self) -> usize {
        self.thread_count + 1
    }

    /// Runs `body` for every index in `0..count`, distributing batches of
    /// indices over the workers. Returns when all iterations finished.
    ///
    /// Bodies must be synchronous and must not call `parallel_for`
    /// re-entrantly. A count of one runs inline on the submitting thread's
    /// memory.
    pub fn parallel_for<F>(&mut self, count: usize, body: F)
    where
        F: Fn(usize, &mut ThreadMemory) + Sync,
    {
        if count == 0 {
            return;
        }

        if count == 1 {
            body(0, &mut self.main_memory);
            self.main_memory.reset_task_memory();

            return;
        }

        let thread_count = self.thread_count;
        let workers = &*self
            .workers
            .get_or_insert_with(|| Workers::start(thread_count));

        let batch = batch_size(count, thread_count);
        let batches = count.div_ceil(batch);
        let cursor = AtomicUsize::new(0);

        workers.pool.broadcast(|context| {
            let mut memory = workers.memories[context.index()].lock().unwrap();

            loop {
                let i = cursor.fetch_add(1, Ordering::Relaxed);

                if i >= batches {
                    break;
                }

                let start = i * batch;
                let end = (start + batch).min(count);

                for index in start..end {
                    body(index, &mut memory);
                    memory.reset_task_memory();
                }
            }
        });
    }

    /// Takes the line-block pools out of every memory domain so the frame
    /// driver can share them read-only across workers. Index `i` is worker
    /// `i`'s pool; the last entry belongs to the submitting thread.
    pub(crate) fn take_line_pools(&mut self) -> Vec<LineBlockPool> {
        let mut pools = Vec::with_capacity(self.domain_count());

        match &self.workers {
            Some(workers) => {
                for memory in &workers.memories {
                    pools.push(std::mem::take(
                        &mut memory.lock().unwrap().frame.line_blocks,
                    ));
                }
            }
            None => {
                pools.extend((0..self.thread_count).map(|_| LineBlockPool::default()));
            }
        }

        pools.push(std::mem::take(&mut self.main_memory.frame.line_blocks));

        pools
    }

    /// Puts pools taken with [`take_line_pools`](Self::take_line_pools)
    /// back, so their slabs are recycled by the next frame.
    pub(crate) fn restore_line_pools(&mut self, mut pools: Vec<LineBlockPool>) {
        debug_assert_eq!(pools.len(), self.domain_count());

        if let Some(main) = pools.pop() {
            self.main_memory.frame.line_blocks = main;
        }

        if let Some(workers) = &self.workers {
            for (memory, pool) in workers.memories.iter().zip(pools) {
                memory.lock().unwrap().frame.line_blocks = pool;
            }
        }
    }

    /// Resets the frame memory of every memory domain. Slabs are recycled,
    /// not returned to the OS.
    pub fn reset_frame_memory(&mut self) {
        if let Some(workers) = &self.workers {
            for memory in &workers.memories {
                memory.lock().unwrap().reset_frame_memory();
            }
        }

        self.main_memory.reset_frame_memory();
    }
}

impl Default for ThreadPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU64;

    #[test]
    fn all_indices_run_exactly_once() {
        let mut pool = ThreadPool::with_thread_count(4);
        let sum = AtomicU64::new(0);
        let runs = AtomicUsize::new(0);

        pool.parallel_for(1000, |index, _memory| {
            sum.fetch_add(index as u64, Ordering::Relaxed);
            runs.fetch_add(1, Ordering::Relaxed);
        });

        assert_eq!(runs.load(Ordering::Relaxed), 1000);
        assert_eq!(sum.load(Ordering::Relaxed), 999 * 1000 / 2);
    }

    #[test]
    fn single_iteration_runs_inline() {
        let mut pool = ThreadPool::with_thread_count(4);
        let main_domain = pool.domain_count() as u32 - 1;
        let seen = AtomicUsize::new(usize::MAX);

        pool.parallel_for(1, |index, memory| {
            assert_eq!(index, 0);
            seen.store(memory.domain as usize, Ordering::Relaxed);
        });

        // The workers were never needed, let alone started.
        assert_eq!(seen.load(Ordering::Relaxed) as u32, main_domain);
        assert!(pool.workers.is_none());
    }

    #[test]
    fn batching_covers_uneven_counts() {
        for threads in [1, 3, 16] {
            let mut pool = ThreadPool::with_thread_count(threads);

            for count in [2, 7, 63, 64, 65, 4097] {
                let runs = AtomicUsize::new(0);

                pool.parallel_for(count, |_, _| {
                    runs.fetch_add(1, Ordering::Relaxed);
                });

                assert_eq!(runs.load(Ordering::Relaxed), count);
            }
        }
    }

    #[test]
    fn batch_size_bounds() {
        assert_eq!(batch_size(1, 8), 1);
        assert_eq!(batch_size(10_000, 8), 39);
        assert_eq!(batch_size(1_000_000, 8), 64);
    }
}
