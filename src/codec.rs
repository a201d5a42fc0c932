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

//! Image file access.

use std::io::ErrorKind;
use std::path::Path;

use image::io::Reader as ImageReader;
use image::RgbImage;
use tracing::debug;

use crate::error::Error;

/// Loads and stores RGB images by path.
///
/// Alpha and palette information is dropped on load.
pub trait Codec {
    fn load(&self, path: &Path) -> Result<RgbImage, Error>;

    /// Saves `image` in the format implied by the extension of `path`.
    fn save(&self, image: &RgbImage, path: &Path) -> Result<(), Error>;
}

/// [Codec] backed by the `image` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageCodec;

impl Codec for ImageCodec {
    fn load(&self, path: &Path) -> Result<RgbImage, Error> {
        debug!(path = %path.display(), "loading image");
        let reader = ImageReader::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::InputNotFound(path.to_owned()),
            _ => Error::Io {
                path: path.to_owned(),
                source: e,
            },
        })?;

        // Content sniffing wins over the extension.
        let im = reader
            .with_guessed_format()
            .map_err(|e| Error::Io {
                path: path.to_owned(),
                source: e,
            })?
            .decode()
            .map_err(|e| Error::Codec {
                path: path.to_owned(),
                source: e,
            })?;

        Ok(im.into_rgb8())
    }

    fn save(&self, image: &RgbImage, path: &Path) -> Result<(), Error> {
        debug!(path = %path.display(), "saving image");
        image.save(path).map_err(|e| Error::Codec {
            path: path.to_owned(),
            source: e,
        })
    }
}
