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

use std::path::Path;

use image::RgbImage;
use ndarray::prelude::*;
use tracing::{debug, error, warn};

use crate::catmap::arnold_cat_into;
use crate::codec::Codec;
use crate::error::Error;

/// Permutes an in-memory image by one iteration.
///
/// Returns [Error::NonSquareImage] (with `path` as the reported location)
/// if the image is not square.
pub fn permute_image(im: &RgbImage, path: &Path) -> Result<RgbImage, Error> {
    let (width, height) = im.dimensions();
    if width != height {
        return Err(Error::NonSquareImage {
            path: path.to_owned(),
            width,
            height,
        });
    }

    let shape = (height as usize, width as usize, 3);
    let arr = <ArrayView3<u8>>::from_shape(shape, im.as_raw().as_slice())?;

    let mut out = RgbImage::new(width, height);
    let out_arr = <ArrayViewMut3<u8>>::from_shape(shape, &mut *out)?;
    arnold_cat_into(arr, out_arr);

    Ok(out)
}

/// Reads `input`, applies one iteration, and writes the result to `output`.
///
/// A non-square input is still copied (converted to RGB) to `output`
/// before the error is returned, unless both paths are the same.
/// The input file is never modified otherwise.
/// Failures are logged with both paths before being returned.
pub fn apply_iteration<C>(codec: &C, input: &Path, output: &Path) -> Result<(), Error>
where
    C: Codec + ?Sized,
{
    let r = permute_file(codec, input, output);
    if let Err(e) = &r {
        error!(
            input = %input.display(),
            output = %output.display(),
            err = %e,
            "cannot apply iteration"
        );
    }
    r
}

fn permute_file<C>(codec: &C, input: &Path, output: &Path) -> Result<(), Error>
where
    C: Codec + ?Sized,
{
    let im = codec.load(input)?;

    let out = match permute_image(&im, input) {
        Ok(v) => v,
        Err(e @ Error::NonSquareImage { .. }) => {
            if input != output {
                debug!(output = %output.display(), "copying non-square input through");
                if let Err(ce) = codec.save(&im, output) {
                    warn!(output = %output.display(), err = %ce, "copy-through failed");
                }
            }
            return Err(e);
        }
        Err(e) => return Err(e),
    };

    codec.save(&out, output)
}
