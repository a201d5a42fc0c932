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

use ndarray::parallel::prelude::*;
use ndarray::prelude::*;

use crate::frame::{MathCoord, StorageCoord};

/// Arnold's cat map on an `n` by `n` torus.
///
/// Matrix `[[2, 1], [1, 1]]` has determinant 1, so it is a bijection for every `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatMap {
    n: usize,
}

impl CatMap {
    /// Creates the map for grid size `n`. Panics if `n` is zero.
    pub fn new(n: usize) -> Self {
        assert!(n > 0, "Grid size must be nonzero");
        Self { n }
    }

    pub fn size(&self) -> usize {
        self.n
    }

    /// `(x, y) -> (2x + y, x + y) mod n`
    #[inline]
    pub fn forward(&self, c: MathCoord) -> MathCoord {
        let n = self.n;
        MathCoord::new((2 * c.x + c.y) % n, (c.x + c.y) % n)
    }

    /// `(x, y) -> (x - y, 2y - x) mod n`
    #[inline]
    pub fn inverse(&self, c: MathCoord) -> MathCoord {
        let n = self.n;
        MathCoord::new((c.x + n - c.y) % n, (2 * c.y + n - c.x) % n)
    }

    /// Number of iterations after which every point returns to itself.
    pub fn period(&self) -> usize {
        let n = self.n;
        if n == 1 {
            return 1;
        }

        let identity = [1, 0, 0, 1];
        let mut m = [2 % n, 1 % n, 1 % n, 1 % n];
        let mut k = 1;
        while m != identity {
            let [a, b, c, d] = m;
            m = [(2 * a + c) % n, (2 * b + d) % n, (a + c) % n, (b + d) % n];
            k += 1;
        }
        k
    }
}

/// Fill `out` by pulling every pixel from `src(dst)`, both in mathematical frame.
fn remap_into<A, F>(arr: ArrayView3<'_, A>, mut out: ArrayViewMut3<'_, A>, src: F)
where
    A: Clone + Send + Sync,
    F: Fn(MathCoord) -> MathCoord + Sync,
{
    let (h, w, _) = arr.dim();
    if h != w {
        panic!("Array is not square ({w}x{h})");
    }
    if arr.shape() != out.shape() {
        let s1 = arr.shape();
        let s2 = out.shape();
        panic!(
            "Array shape mismatch with output ([{} {} {}] != [{} {} {}])",
            s1[0], s1[1], s1[2], s2[0], s2[1], s2[2],
        );
    }
    let n = w;
    if n == 0 {
        return;
    }

    let arr = arr.view();
    out.axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(row, mut line)| {
            for (col, mut px) in line.axis_iter_mut(Axis(0)).enumerate() {
                let from = src(StorageCoord::new(col, row).to_math(n)).to_storage(n);
                px.assign(&arr.slice(s![from.row, from.col, ..]));
            }
        });
}

/// Applies one iteration of Arnold's cat map.
///
/// Parameters:
/// * `arr` : Input array view, shaped `(height, width, channels)`.
///   Must be square, otherwise it panics.
/// * `out` : Output array view. Must be the same shape, otherwise it panics.
///   Its previous content is irrelevant, every element is overwritten.
///
/// The pixel at mathematical coordinate `p` lands at `forward(p)`.
pub fn arnold_cat_into<A>(arr: ArrayView3<'_, A>, out: ArrayViewMut3<'_, A>)
where
    A: Clone + Send + Sync,
{
    let n = arr.dim().0.max(1);
    let map = CatMap::new(n);
    remap_into(arr, out, |c| map.inverse(c));
}

/// Undoes one iteration of [arnold_cat_into].
pub fn arnold_cat_inverse_into<A>(arr: ArrayView3<'_, A>, out: ArrayViewMut3<'_, A>)
where
    A: Clone + Send + Sync,
{
    let n = arr.dim().0.max(1);
    let map = CatMap::new(n);
    remap_into(arr, out, |c| map.forward(c));
}

/// Allocating version of [arnold_cat_into].
pub fn arnold_cat<A>(arr: ArrayView3<'_, A>) -> Array3<A>
where
    A: Clone + Send + Sync,
{
    let mut out = arr.to_owned();
    arnold_cat_into(arr, out.view_mut());
    out
}

/// Allocating version of [arnold_cat_inverse_into].
pub fn arnold_cat_inverse<A>(arr: ArrayView3<'_, A>) -> Array3<A>
where
    A: Clone + Send + Sync,
{
    let mut out = arr.to_owned();
    arnold_cat_inverse_into(arr, out.view_mut());
    out
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn numbered(n: usize) -> Array3<u32> {
        Array3::from_shape_fn((n, n, 3), |(r, c, ch)| ((r * n + c) * 3 + ch) as u32)
    }

    #[test]
    fn forward_is_bijective() {
        for n in 1..=16 {
            let map = CatMap::new(n);
            let mut seen = HashSet::new();
            for x in 0..n {
                for y in 0..n {
                    let d = map.forward(MathCoord::new(x, y));
                    assert!(d.x < n && d.y < n);
                    assert!(seen.insert(d), "collision at {d:?} for n = {n}");
                }
            }
            assert_eq!(seen.len(), n * n);
        }
    }

    #[test]
    fn inverse_undoes_forward() {
        let map = CatMap::new(9);
        for x in 0..9 {
            for y in 0..9 {
                let c = MathCoord::new(x, y);
                assert_eq!(map.inverse(map.forward(c)), c);
                assert_eq!(map.forward(map.inverse(c)), c);
            }
        }
    }

    #[test]
    fn known_periods() {
        let periods: Vec<_> = [1, 2, 3, 4, 5, 6, 8]
            .into_iter()
            .map(|n| CatMap::new(n).period())
            .collect();
        assert_eq!(periods, [1, 3, 4, 3, 10, 12, 6]);
    }

    #[test]
    fn image_returns_after_period() {
        for n in [2, 3, 4, 6, 8] {
            let orig = numbered(n);
            let period = CatMap::new(n).period();

            let mut cur = orig.clone();
            for k in 1..=period {
                cur = arnold_cat(cur.view());
                if k < period {
                    assert_ne!(cur, orig, "n = {n} returned early at {k}");
                }
            }
            assert_eq!(cur, orig, "n = {n} did not return after {period}");
        }
    }

    #[test]
    fn permutes_in_math_frame() {
        let arr = numbered(3);
        let out = arnold_cat(arr.view());

        // Math (1, 0) is storage row 2, col 1. It maps to math (2, 1),
        // which is storage row 1, col 2.
        assert_eq!(out.slice(s![1, 2, ..]), arr.slice(s![2, 1, ..]));

        // Applying the map directly in storage frame would send it to row 0, col 1.
        assert_ne!(out.slice(s![0, 1, ..]), arr.slice(s![2, 1, ..]));
    }

    #[test]
    fn every_pixel_is_kept() {
        let arr = numbered(5);
        let out = arnold_cat(arr.view());

        let mut a: Vec<_> = arr.iter().copied().collect();
        let mut b: Vec<_> = out.iter().copied().collect();
        a.sort_unstable();
        b.sort_unstable();
        assert_eq!(a, b);
    }

    #[test]
    fn inverse_restores() {
        let arr = numbered(7);
        let out = arnold_cat_inverse(arnold_cat(arr.view()).view());
        assert_eq!(out, arr);
    }

    #[test]
    fn empty_grid() {
        let arr = Array3::<u8>::zeros((0, 0, 3));
        assert_eq!(arnold_cat(arr.view()).dim(), (0, 0, 3));
    }

    #[test]
    #[should_panic(expected = "not square")]
    fn rejects_non_square() {
        let arr = Array3::<u8>::zeros((4, 6, 3));
        arnold_cat(arr.view());
    }
}
