// Copyright 2026 the Rastro Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The frame driver: prepares geometries, linearizes them in parallel, bins
//! the results into tile rows, and rasterizes every row into the
//! destination image.
//!
//! A frame is three fan-out stages over the same worker pool. Linearization
//! produces one [`Rasterizable`] per visible geometry, with line blocks in
//! the linearizing worker's pool. The pools are then taken out of the
//! workers and shared read-only; binning appends `(geometry, local row)`
//! items to per-tile-row lists, and rasterization walks each list
//! back-to-front into a disjoint horizontal slab of the image. Painter
//! order is preserved per row because binning iterates geometries in input
//! order and each row is rasterized by exactly one worker.

use std::sync::Mutex;

use log::warn;
use peniko::kurbo::Affine;
use peniko::Fill;

use crate::executor::ThreadPool;
use crate::fine::{SpanBlend, SpanBlender, SpanBlenderOpaque};
use crate::fixed::{unpack_hi_f8dot8x2, unpack_lo_f8dot8x2};
use crate::geometry::Geometry;
use crate::line_block::{LineBlockPool, LineKind, LineList, NarrowLines, WideLines, LINES_PER_BLOCK, NO_BLOCK};
use crate::linearizer::{Linearizer, StartCoverTable};
use crate::memory::{TaskMemory, ThreadMemory};
use crate::raster::{render_line, EvenOddAlpha, FillRuleAlpha, NonZeroAlpha, RowScratch};
use crate::tile::{
    calculate_tile_bounds, column_count_for_width, row_count_for_height, Tile16x8, TileBounds,
    TileDescriptor,
};
use crate::transform::map_bounding_rect;
use crate::vector_image::VectorImage;

/// A mutable view of a destination image: row-major premultiplied RGBA8
/// with byte order `R, G, B, A` and a row stride of at least `4 * width`
/// bytes.
pub struct ImageView<'a> {
    pub(crate) data: &'a mut [u8],
    pub(crate) width: usize,
    pub(crate) height: usize,
    pub(crate) bytes_per_row: usize,
}

impl<'a> ImageView<'a> {
    /// Creates a view over `data`.
    ///
    /// # Panics
    ///
    /// Panics if the stride is below `4 * width` or `data` is too short for
    /// `height` rows.
    pub fn new(data: &'a mut [u8], width: usize, height: usize, bytes_per_row: usize) -> Self {
        assert!(bytes_per_row >= width * 4);

        if height > 0 && width > 0 {
            assert!(data.len() >= bytes_per_row * (height - 1) + width * 4);
        }

        Self {
            data,
            width,
            height,
            bytes_per_row,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn bytes_per_row(&self) -> usize {
        self.bytes_per_row
    }
}

/// Line list head of one tile row of a rasterizable geometry.
struct RowLines {
    first_block: u32,
    first_count: u32,
}

/// A geometry after linearization, ready for binning and rasterization.
struct Rasterizable {
    /// Packed premultiplied color, R in the low byte.
    color: u32,
    opaque: bool,
    fill_rule: Fill,
    bounds: TileBounds,
    kind: LineKind,
    /// Memory domain owning this geometry's line blocks.
    pool: u32,
    rows: Vec<RowLines>,
    start_covers: Option<StartCoverTable>,
}

impl Rasterizable {
    fn cover_row(&self, local_row: usize) -> Option<&[i32]> {
        self.start_covers.as_ref()?.get(local_row)?.as_deref()
    }

    fn actual_covers<T: TileDescriptor>(&self, local_row: usize) -> &[i32] {
        self.cover_row(local_row).unwrap_or_else(|| T::zero_covers())
    }

    /// Whether this row contributes anything: either segments or a
    /// left-of-image backdrop.
    fn has_content(&self, local_row: usize) -> bool {
        self.rows[local_row].first_block != NO_BLOCK || self.cover_row(local_row).is_some()
    }
}

/// One entry of a tile row's work list.
struct RowItem {
    rasterizable: u32,
    local_row: u32,
}

/// Rasterizes `geometries` in input (painter) order into `image`, using the
/// reference 16×8 tile configuration.
///
/// Every geometry is transformed by `transform` composed with its own
/// transform. The output is deterministic for a given input, independent of
/// the pool's thread count.
pub fn rasterize(
    geometries: &[Geometry],
    transform: Affine,
    threads: &mut ThreadPool,
    image: ImageView<'_>,
) {
    rasterize_with::<Tile16x8>(geometries, transform, threads, image);
}

/// [`rasterize`] with an explicit tile configuration.
pub fn rasterize_with<T: TileDescriptor>(
    geometries: &[Geometry],
    transform: Affine,
    threads: &mut ThreadPool,
    image: ImageView<'_>,
) {
    if geometries.is_empty() || image.width == 0 || image.height == 0 {
        return;
    }

    // Stage 1: linearize all geometries in parallel. Results come back over
    // a channel and are re-ordered by input index.
    let (sender, receiver) = crossbeam_channel::unbounded();

    threads.parallel_for(geometries.len(), |index, memory| {
        let rasterizable =
            build_rasterizable::<T>(&geometries[index], &transform, image.width, image.height, memory);

        if let Some(rasterizable) = rasterizable {
            sender.send((index, rasterizable)).unwrap();
        }
    });

    drop(sender);

    let mut slots: Vec<Option<Rasterizable>> = Vec::new();
    slots.resize_with(geometries.len(), || None);

    for (index, rasterizable) in receiver.try_iter() {
        slots[index] = Some(rasterizable);
    }

    let visible: Vec<Rasterizable> = slots.into_iter().flatten().collect();

    if visible.is_empty() {
        threads.reset_frame_memory();

        return;
    }

    // Stage 2: build per-tile-row item lists. Workers own contiguous row
    // chunks; within a chunk, geometries are visited in input order, which
    // is what preserves painter order per row.
    let row_count = row_count_for_height::<T>(image.height) as usize;

    let mut row_lists: Vec<Vec<RowItem>> = Vec::new();
    row_lists.resize_with(row_count, Vec::new);

    {
        let chunk_rows = (row_count / threads.thread_count()).max(1);

        let chunks: Vec<Mutex<(usize, &mut [Vec<RowItem>])>> = row_lists
            .chunks_mut(chunk_rows)
            .enumerate()
            .map(|(i, chunk)| Mutex::new((i * chunk_rows, chunk)))
            .collect();

        threads.parallel_for(chunks.len(), |index, _memory| {
            let mut guard = chunks[index].lock().unwrap();
            let (start, lists) = &mut *guard;
            let start = *start;
            let end = start + lists.len();

            for (i, rasterizable) in visible.iter().enumerate() {
                let bounds = &rasterizable.bounds;

                let min = (bounds.y as usize).clamp(start, end);
                let max = ((bounds.y + bounds.row_count) as usize).clamp(start, end);

                for y in min..max {
                    let local_row = y - bounds.y as usize;

                    if !rasterizable.has_content(local_row) {
                        continue;
                    }

                    lists[y - start].push(RowItem {
                        rasterizable: i as u32,
                        local_row: local_row as u32,
                    });
                }
            }
        });
    }

    // Stage 3: rasterize rows. Line pools are taken out of the workers and
    // shared read-only; each tile row writes to a disjoint slab of the
    // image.
    let pools = threads.take_line_pools();

    {
        let tile_h = T::HEIGHT as usize;
        let stride = image.bytes_per_row;
        let width = image.width;
        let height = image.height;
        let used = (stride * height).min(image.data.len());

        let slabs: Vec<Mutex<&mut [u8]>> = image.data[..used]
            .chunks_mut(stride * tile_h)
            .map(Mutex::new)
            .collect();

        let column_count = column_count_for_width::<T>(width) as usize;

        threads.parallel_for(row_count, |row, memory| {
            let items = &row_lists[row];

            if items.is_empty() {
                return;
            }

            let mut slab = slabs[row].lock().unwrap();

            rasterize_row::<T>(
                items,
                &visible,
                &pools,
                &mut memory.task,
                &mut slab,
                row,
                column_count,
                width,
                height,
                stride,
            );
        });
    }

    threads.restore_line_pools(pools);
    threads.reset_frame_memory();
}

fn build_rasterizable<T: TileDescriptor>(
    geometry: &Geometry,
    global: &Affine,
    width: usize,
    height: usize,
    memory: &mut ThreadMemory,
) -> Option<Rasterizable> {
    if geometry.tags.is_empty() || geometry.points.is_empty() {
        return None;
    }

    let transform = *global * geometry.transform;

    if transform.as_coeffs().iter().any(|c| !c.is_finite()) {
        warn!("ignoring a geometry with a non-finite transform");

        return None;
    }

    let bounds = map_bounding_rect(&transform, &geometry.path_bounds);

    if bounds.min_x == bounds.max_x {
        return None;
    }

    // A path closing with a vertical line exactly on the right edge of its
    // bounds must not have that line clipped away, so the footprint extends
    // one pixel to the right.
    let min_x = bounds.min_x.max(0);
    let min_y = bounds.min_y.max(0);
    let max_x = (bounds.max_x + 1).min(width as i32);
    let max_y = bounds.max_y.min(height as i32);

    if min_x >= max_x || min_y >= max_y {
        // No intersection with the destination image.
        return None;
    }

    let tile_bounds = calculate_tile_bounds::<T>(min_x, min_y, max_x, max_y);

    let contained = bounds.min_x >= 0
        && bounds.min_y >= 0
        && bounds.max_x <= width as i32
        && bounds.max_y <= height as i32;

    if tile_bounds.column_count * T::WIDTH < 128 {
        linearize::<T, NarrowLines>(geometry, &transform, tile_bounds, contained, memory)
    } else {
        linearize::<T, WideLines>(geometry, &transform, tile_bounds, contained, memory)
    }
}

fn linearize<T: TileDescriptor, L: LineList>(
    geometry: &Geometry,
    transform: &Affine,
    bounds: TileBounds,
    contained: bool,
    memory: &mut ThreadMemory,
) -> Option<Rasterizable> {
    let linearizer = Linearizer::<T, L>::process(bounds, contained, geometry, transform, memory);
    let (lists, mut start_covers) = linearizer.into_parts();

    let rows = lists
        .iter()
        .map(|list| RowLines {
            first_block: list.front_block(),
            first_count: list.front_count(),
        })
        .collect();

    if let Some(table) = &mut start_covers {
        let mut any = false;

        for slot in table.iter_mut() {
            if let Some(covers) = slot {
                if T::cover_array_is_zero(covers) {
                    // All contributions cancelled each other; the row does
                    // not need a backdrop after all.
                    *slot = None;
                } else {
                    any = true;
                }
            }
        }

        if !any {
            start_covers = None;
        }
    }

    Some(Rasterizable {
        color: geometry.color_word(),
        opaque: geometry.color.a == 255,
        fill_rule: geometry.fill_rule,
        bounds,
        kind: L::KIND,
        pool: memory.domain,
        rows,
        start_covers,
    })
}

#[allow(clippy::too_many_arguments)]
fn rasterize_row<T: TileDescriptor>(
    items: &[RowItem],
    visible: &[Rasterizable],
    pools: &[LineBlockPool],
    task: &mut TaskMemory,
    slab: &mut [u8],
    row: usize,
    column_count: usize,
    width: usize,
    height: usize,
    stride: usize,
) {
    let tile_h = T::HEIGHT as usize;
    let width_px = column_count * T::WIDTH as usize;
    let bit_stride = width_px.div_ceil(64);
    let ca_stride = width_px * 2;

    task.bit_vectors.clear();
    task.bit_vectors.resize(bit_stride * tile_h, 0);
    task.cover_area.clear();
    task.cover_area.resize(ca_stride * tile_h, 0);

    for item in items {
        let rasterizable = &visible[item.rasterizable as usize];

        rasterize_one_item::<T>(
            rasterizable,
            item.local_row as usize,
            pools,
            task,
            slab,
            row,
            bit_stride,
            ca_stride,
            width,
            height,
            stride,
        );
    }
}

#[allow(clippy::too_many_arguments)]
fn rasterize_one_item<T: TileDescriptor>(
    rasterizable: &Rasterizable,
    local_row: usize,
    pools: &[LineBlockPool],
    task: &mut TaskMemory,
    slab: &mut [u8],
    row: usize,
    bit_stride: usize,
    ca_stride: usize,
    width: usize,
    height: usize,
    stride: usize,
) {
    let tile_h = T::HEIGHT as usize;
    let item_words = ((rasterizable.bounds.column_count * T::WIDTH) as usize).div_ceil(64);

    let mut scratch = RowScratch::new(&mut task.bit_vectors, bit_stride, &mut task.cover_area, ca_stride);

    // Only this item's footprint needs erasing; cover/area slots are
    // invalidated by the bits.
    scratch.clear_bits(tile_h, item_words);

    let pool = &pools[rasterizable.pool as usize];
    let lines = &rasterizable.rows[local_row];

    match rasterizable.kind {
        LineKind::Narrow => iterate_narrow_lines(pool, lines, &mut scratch),
        LineKind::Wide => iterate_wide_lines(pool, lines, &mut scratch),
    }

    let covers = rasterizable.actual_covers::<T>(local_row);
    let x = (rasterizable.bounds.x * T::WIDTH) as usize;

    // The last tile row can hang past the image; render only what is
    // inside.
    let py = row * tile_h;
    let rows = (py + tile_h).min(height) - py;

    match (rasterizable.opaque, rasterizable.fill_rule) {
        (true, Fill::NonZero) => render_item_rows::<_, NonZeroAlpha>(
            &SpanBlenderOpaque::new(rasterizable.color),
            &scratch,
            item_words,
            slab,
            stride,
            width,
            rows,
            x,
            covers,
        ),
        (true, Fill::EvenOdd) => render_item_rows::<_, EvenOddAlpha>(
            &SpanBlenderOpaque::new(rasterizable.color),
            &scratch,
            item_words,
            slab,
            stride,
            width,
            rows,
            x,
            covers,
        ),
        (false, Fill::NonZero) => render_item_rows::<_, NonZeroAlpha>(
            &SpanBlender::new(rasterizable.color),
            &scratch,
            item_words,
            slab,
            stride,
            width,
            rows,
            x,
            covers,
        ),
        (false, Fill::EvenOdd) => render_item_rows::<_, EvenOddAlpha>(
            &SpanBlender::new(rasterizable.color),
            &scratch,
            item_words,
            slab,
            stride,
            width,
            rows,
            x,
            covers,
        ),
    }
}

fn iterate_narrow_lines(pool: &LineBlockPool, lines: &RowLines, scratch: &mut RowScratch<'_>) {
    let mut count = lines.first_count as usize;
    let mut block_index = lines.first_block;

    while block_index != NO_BLOCK {
        let block = &pool.narrow[block_index as usize];

        for i in 0..count {
            let y0y1 = block.y0y1[i];
            let x0x1 = block.x0x1[i];

            scratch.rasterize_line(
                unpack_lo_f8dot8x2(x0x1),
                unpack_lo_f8dot8x2(y0y1),
                unpack_hi_f8dot8x2(x0x1),
                unpack_hi_f8dot8x2(y0y1),
            );
        }

        block_index = block.next;
        count = LINES_PER_BLOCK;
    }
}

fn iterate_wide_lines(pool: &LineBlockPool, lines: &RowLines, scratch: &mut RowScratch<'_>) {
    let mut count = lines.first_count as usize;
    let mut block_index = lines.first_block;

    while block_index != NO_BLOCK {
        let block = &pool.wide[block_index as usize];

        for i in 0..count {
            let y0y1 = block.y0y1[i];

            scratch.rasterize_line(
                block.x0[i],
                unpack_lo_f8dot8x2(y0y1),
                block.x1[i],
                unpack_hi_f8dot8x2(y0y1),
            );
        }

        block_index = block.next;
        count = LINES_PER_BLOCK;
    }
}

#[allow(clippy::too_many_arguments)]
fn render_item_rows<B: SpanBlend, R: FillRuleAlpha>(
    blender: &B,
    scratch: &RowScratch<'_>,
    item_words: usize,
    slab: &mut [u8],
    stride: usize,
    width: usize,
    rows: usize,
    x: usize,
    covers: &[i32],
) {
    for i in 0..rows {
        let line = &mut slab[i * stride..i * stride + width * 4];
        let dst: &mut [[u8; 4]] = bytemuck::cast_slice_mut(line);
        let bits = &scratch.bit_row(i)[..item_words];

        render_line::<B, R>(dst, bits, scratch.cover_area_row(i), x, width, covers[i], blender);
    }
}

/// An owned destination image whose allocation is padded to a whole number
/// of tile columns, plus the thread pool used to draw into it.
pub struct RenderTarget {
    data: Vec<u8>,
    width: usize,
    height: usize,
    bytes_per_row: usize,
    threads: ThreadPool,
}

impl RenderTarget {
    /// Creates a zeroed target of the given logical size.
    pub fn new(width: usize, height: usize) -> Self {
        let mut target = Self {
            data: Vec::new(),
            width: 0,
            height: 0,
            bytes_per_row: 0,
            threads: ThreadPool::new(),
        };

        target.resize(width, height);
        target
    }

    /// Resizes the target. The backing allocation is rounded up to whole
    /// tiles and never shrinks; newly exposed pixels are not cleared.
    pub fn resize(&mut self, width: usize, height: usize) {
        let padded = if width == 0 {
            0
        } else {
            column_count_for_width::<Tile16x8>(width) as usize * Tile16x8::WIDTH as usize
        };

        self.width = width;
        self.height = height;
        self.bytes_per_row = padded * 4;

        let needed = self.bytes_per_row * height;

        if self.data.len() < needed {
            self.data.resize(needed, 0);
        }
    }

    /// Clears the image to transparent black.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Draws all geometries of a vector image, transformed by `transform`,
    /// over the current contents.
    pub fn draw(&mut self, image: &VectorImage, transform: Affine) {
        if image.geometries().is_empty() || self.width == 0 || self.height == 0 {
            return;
        }

        let view = ImageView::new(&mut self.data, self.width, self.height, self.bytes_per_row);

        rasterize(image.geometries(), transform, &mut self.threads, view);
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn bytes_per_row(&self) -> usize {
        self.bytes_per_row
    }

    /// The pixel bytes, row-major with [`bytes_per_row`](Self::bytes_per_row)
    /// stride.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}
