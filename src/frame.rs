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

//! Coordinate frames.
//!
//! The map is defined in a mathematical frame (origin bottom-left, `y` up),
//! while pixel buffers are addressed top-left, `row` down.
//! Mixing the two shears the result, so every conversion goes through here.

/// Coordinate in the mathematical frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MathCoord {
    pub x: usize,
    pub y: usize,
}

/// Coordinate in the storage frame, as used to index pixel buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorageCoord {
    pub col: usize,
    pub row: usize,
}

impl MathCoord {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Convert to storage frame of an `n`-sized grid.
    ///
    /// `y` must be less than `n`.
    #[inline]
    pub const fn to_storage(self, n: usize) -> StorageCoord {
        StorageCoord {
            col: self.x,
            row: n - 1 - self.y,
        }
    }
}

impl StorageCoord {
    pub const fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }

    /// Convert to mathematical frame of an `n`-sized grid.
    ///
    /// `row` must be less than `n`.
    #[inline]
    pub const fn to_math(self, n: usize) -> MathCoord {
        MathCoord {
            x: self.col,
            y: n - 1 - self.row,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_is_bottom_left() {
        assert_eq!(MathCoord::new(0, 0).to_storage(5), StorageCoord::new(0, 4));
        assert_eq!(MathCoord::new(4, 4).to_storage(5), StorageCoord::new(4, 0));
    }

    #[test]
    fn conversions_are_inverse() {
        let n = 7;
        for x in 0..n {
            for y in 0..n {
                let c = MathCoord::new(x, y);
                assert_eq!(c.to_storage(n).to_math(n), c);
            }
        }
    }
}
