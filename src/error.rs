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

use std::io;
use std::path::PathBuf;

/// Errors produced by a single iteration or a whole pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input image does not exist.
    #[error("image not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("image {} is not square ({width}x{height})", .path.display())]
    NonSquareImage {
        path: PathBuf,
        width: u32,
        height: u32,
    },

    #[error("cannot access {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Decode or encode failure.
    #[error("cannot process image {}", .path.display())]
    Codec {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("pixel buffer has unexpected layout")]
    Layout(#[from] ndarray::ShapeError),

    /// The pipeline finished but its last artifact is gone.
    #[error("final image not found at {}", .0.display())]
    MissingFinalArtifact(PathBuf),

    /// Iteration `index` (1-based) failed, aborting the run.
    #[error("iteration {index} failed")]
    Iteration {
        index: usize,
        #[source]
        source: Box<Error>,
    },

    /// Artifact of iteration `index` would replace the initial image.
    #[error("iteration {index} would overwrite initial image {}", .path.display())]
    ArtifactOverwritesInput { path: PathBuf, index: usize },

    #[error("invalid artifact template {template:?}: {reason}")]
    InvalidTemplate {
        template: String,
        reason: &'static str,
    },
}

impl Error {
    /// Innermost error, skipping [Error::Iteration] wrappers.
    pub fn root(&self) -> &Error {
        match self {
            Error::Iteration { source, .. } => source.root(),
            e => e,
        }
    }
}
