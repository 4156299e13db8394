// Copyright 2026 the Rastro Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rastro is a multithreaded CPU rasterizer for filled 2D vector paths.
//!
//! Paths are sequences of move/line/quadratic/cubic commands with an affine
//! transform, a premultiplied RGBA color and a fill rule. Rasterization
//! produces analytic coverage: every path is converted into 24.8 fixed-point
//! line segments, segments are binned into rows of tiles, and each tile row
//! is resolved into pixels independently, in parallel.
//!
//! # Usage
//!
//! ```rust
//! use rastro::kurbo::Affine;
//! use rastro::color::PremulRgba8;
//! use rastro::peniko::Fill;
//! use rastro::{Geometry, ImageView, Path, ThreadPool, rasterize};
//!
//! let mut path = Path::builder();
//! path.move_to(2.0, 1.0);
//! path.line_to(8.0, 1.0);
//! path.line_to(8.0, 4.0);
//! path.line_to(2.0, 4.0);
//! path.close();
//!
//! let magenta = PremulRgba8 { r: 255, g: 0, b: 255, a: 255 };
//! let geometry = Geometry::new(path.finish(), Affine::IDENTITY, magenta, Fill::NonZero);
//!
//! let (width, height) = (10usize, 5usize);
//! let mut buffer = vec![0_u8; width * height * 4];
//! let mut threads = ThreadPool::new();
//!
//! rasterize(
//!     &[geometry],
//!     Affine::IDENTITY,
//!     &mut threads,
//!     ImageView::new(&mut buffer, width, height, width * 4),
//! );
//!
//! let mut filled = 0;
//! for pixel in buffer.chunks_exact(4) {
//!     if pixel == &[255, 0, 255, 255][..] {
//!         filled += 1;
//!     } else {
//!         assert_eq!(pixel, &[0, 0, 0, 0][..]);
//!     }
//! }
//! assert_eq!(filled, 6 * 3);
//! ```
//!
//! The output buffer is row-major premultiplied RGBA8 with byte order
//! `R, G, B, A` at increasing addresses and an arbitrary row stride of at
//! least `4 * width` bytes.
//!
//! # Contents
//!
//! - [`rasterize`] / [`rasterize_with`] — render a slice of [`Geometry`]
//!   into an [`ImageView`] using a shared [`ThreadPool`].
//! - [`RenderTarget`] — an owned destination image, padded to whole tiles.
//! - [`VectorImage`] — a small binary container for geometry collections.
//! - [`transform`] — helpers over [`kurbo::Affine`] (rotation in degrees,
//!   skew, lerp, inverse, bounding-rect mapping).
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![warn(clippy::print_stdout, clippy::print_stderr)]
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
#![forbid(unsafe_code)]

pub mod curve;
pub mod fixed;
pub mod geometry;
pub mod tile;
pub mod transform;
pub mod vector_image;

mod executor;
mod fine;
mod line_block;
mod linearizer;
mod math;
mod memory;
mod raster;
mod render;

pub use executor::ThreadPool;
pub use geometry::{Geometry, IntRect, Path, PathBuilder, PathTag};
pub use memory::ThreadMemory;
pub use render::{rasterize, rasterize_with, ImageView, RenderTarget};
pub use tile::{Tile16x8, Tile64x16, Tile8x16, Tile8x32, Tile8x8, TileBounds, TileDescriptor};
pub use vector_image::VectorImage;

pub use peniko;
pub use peniko::color;
pub use peniko::kurbo;
