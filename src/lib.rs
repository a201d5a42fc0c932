//! Library to scramble images with Arnold's cat map.
//!
//! The cat map is the bijection `(x, y) -> (2x + y, x + y) mod n` on an
//! `n` by `n` grid. Applied to every pixel of a square image it produces
//! a stretched, folded copy where:
//!
//! * No pixel is duplicated nor removed.
//! * Repeated application eventually restores the image, after
//!   [CatMap::period] iterations.
//!
//! The pure kernel is [arnold_cat]. [Pipeline] chains iterations
//! through image files on disk.

// Copyright (C) 2023 Dheatly23
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Lesser General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Lesser General Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
//

mod catmap;
pub mod codec;
mod error;
pub mod frame;
mod iteration;
mod pipeline;
#[cfg(test)]
mod test_support;

#[doc(inline)]
pub use crate::catmap::{
    arnold_cat, arnold_cat_into, arnold_cat_inverse, arnold_cat_inverse_into, CatMap,
};
pub use crate::error::Error;
pub use crate::iteration::{apply_iteration, permute_image};
pub use crate::pipeline::{run_pipeline, Config, ConfigBuilder, Pipeline, PipelineOutput};
