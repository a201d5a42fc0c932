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

//! Iteration chaining and artifact lifecycle.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use image::RgbImage;
use tracing::{debug, error, info, warn};

use crate::codec::{Codec, ImageCodec};
use crate::error::Error;
use crate::iteration::apply_iteration;

const NAME: &str = "{name}";
const INDEX: &str = "{index}";

/// Pipeline configuration. Create with [ConfigBuilder].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    template: String,
    output_dir: PathBuf,
    keep_intermediates: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            template: format!("arnold_cat-{NAME}-{INDEX}.png"),
            output_dir: PathBuf::new(),
            keep_intermediates: false,
        }
    }
}

impl Config {
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn keep_intermediates(&self) -> bool {
        self.keep_intermediates
    }

    /// Path of the artifact produced by iteration `index` (1-based).
    pub fn artifact_path(&self, stem: &str, index: usize) -> PathBuf {
        let index = index.to_string();
        let mut name = String::with_capacity(self.template.len() + stem.len());
        let mut rest = self.template.as_str();

        // Single pass, so placeholders inside `stem` are left alone.
        while let Some(pos) = rest.find('{') {
            name.push_str(&rest[..pos]);
            let tail = &rest[pos..];
            rest = if let Some(t) = tail.strip_prefix(NAME) {
                name.push_str(stem);
                t
            } else if let Some(t) = tail.strip_prefix(INDEX) {
                name.push_str(&index);
                t
            } else {
                name.push('{');
                &tail[1..]
            };
        }
        name.push_str(rest);

        self.output_dir.join(name)
    }
}

/// Builder for [Config].
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    prefix: String,
    extension: String,
    template: Option<String>,
    output_dir: PathBuf,
    keep_intermediates: bool,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            prefix: "arnold_cat".into(),
            extension: "png".into(),
            template: None,
            output_dir: PathBuf::new(),
            keep_intermediates: false,
        }
    }

    /// Artifact file name prefix. Ignored if [ConfigBuilder::template] is set.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Artifact extension, which also picks the output format.
    /// Ignored if [ConfigBuilder::template] is set.
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        self.extension = extension.trim_start_matches('.').to_owned();
        self
    }

    /// Full artifact file name template.
    ///
    /// Must contain both `{name}` (input file stem) and `{index}` (iteration number).
    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Directory artifacts are written to. Defaults to current directory.
    pub fn output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Keep every intermediate artifact instead of only the last one.
    pub fn keep_intermediates(mut self, keep: bool) -> Self {
        self.keep_intermediates = keep;
        self
    }

    pub fn build(self) -> Result<Config, Error> {
        let template = match self.template {
            Some(v) => v,
            None => format!("{}-{NAME}-{INDEX}.{}", self.prefix, self.extension),
        };

        let reason = if !template.contains(NAME) {
            Some("missing {name}")
        } else if !template.contains(INDEX) {
            Some("missing {index}")
        } else if template.contains('/') || template.contains(std::path::MAIN_SEPARATOR) {
            Some("must be a file name, use output_dir for directories")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(Error::InvalidTemplate { template, reason });
        }

        Ok(Config {
            template,
            output_dir: self.output_dir,
            keep_intermediates: self.keep_intermediates,
        })
    }
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub image: RgbImage,
    /// Final artifact, or the initial image if no iteration was run.
    pub path: PathBuf,
}

/// Runs the map repeatedly, each iteration reading the previous artifact.
#[derive(Debug, Clone)]
pub struct Pipeline<C = ImageCodec> {
    config: Config,
    codec: C,
}

impl Pipeline<ImageCodec> {
    pub fn new(config: Config) -> Self {
        Self::with_codec(config, ImageCodec)
    }
}

impl<C: Codec> Pipeline<C> {
    pub fn with_codec(config: Config, codec: C) -> Self {
        Self { config, codec }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Applies `iterations` iterations starting from `initial`.
    ///
    /// The initial file is never deleted. Intermediate artifacts are removed
    /// as soon as the next iteration consumed them, unless configured to keep them.
    /// On failure, artifacts already written are left on disk.
    pub fn run(&self, initial: &Path, iterations: usize) -> Result<PipelineOutput, Error> {
        if !initial.exists() {
            error!(path = %initial.display(), "initial image does not exist");
            return Err(Error::InputNotFound(initial.to_owned()));
        }

        let im = self.codec.load(initial).map_err(|e| {
            error!(path = %initial.display(), err = %e, "cannot read initial image");
            e
        })?;
        let (width, height) = im.dimensions();
        if width != height {
            error!(path = %initial.display(), width, height, "initial image must be square");
            return Err(Error::NonSquareImage {
                path: initial.to_owned(),
                width,
                height,
            });
        }

        if iterations == 0 {
            info!("no iterations requested, returning initial image");
            return Ok(PipelineOutput {
                image: im,
                path: initial.to_owned(),
            });
        }
        drop(im);

        let stem = initial
            .file_stem()
            .map_or_else(|| "image".into(), |s| s.to_string_lossy());
        self.check_no_overwrite(initial, &stem, iterations)?;
        info!(path = %initial.display(), iterations, "starting pipeline");

        let mut current = initial.to_owned();
        for i in 1..=iterations {
            let output = self.config.artifact_path(&stem, i);
            debug!(
                iteration = i,
                input = %current.display(),
                output = %output.display(),
                "applying iteration"
            );

            if let Err(e) = apply_iteration(&self.codec, &current, &output) {
                error!(iteration = i, err = %e, "iteration failed, aborting");
                return Err(Error::Iteration {
                    index: i,
                    source: Box::new(e),
                });
            }

            if !self.config.keep_intermediates && current != initial {
                remove_artifact(&current);
            }
            current = output;
        }

        if !current.exists() {
            error!(path = %current.display(), "final image is missing");
            return Err(Error::MissingFinalArtifact(current));
        }
        let image = self.codec.load(&current).map_err(|e| {
            error!(path = %current.display(), err = %e, "cannot read final image");
            e
        })?;
        info!(path = %current.display(), "pipeline finished");

        Ok(PipelineOutput {
            image,
            path: current,
        })
    }

    /// Fails if any artifact name of the run resolves to the initial file.
    fn check_no_overwrite(
        &self,
        initial: &Path,
        stem: &str,
        iterations: usize,
    ) -> Result<(), Error> {
        let canonical = fs::canonicalize(initial).ok();
        for i in 1..=iterations {
            let path = self.config.artifact_path(stem, i);
            let same = path == initial
                || (canonical.is_some() && fs::canonicalize(&path).ok() == canonical);
            if same {
                error!(
                    path = %initial.display(),
                    iteration = i,
                    "artifact would overwrite initial image"
                );
                return Err(Error::ArtifactOverwritesInput {
                    path: initial.to_owned(),
                    index: i,
                });
            }
        }
        Ok(())
    }
}

fn remove_artifact(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "removed intermediate image"),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "intermediate image already gone")
        }
        Err(e) => warn!(path = %path.display(), err = %e, "cannot remove intermediate image"),
    }
}

/// Runs the pipeline with default naming, writing to the current directory.
pub fn run_pipeline(
    initial: &Path,
    iterations: usize,
    keep_intermediates: bool,
) -> Result<RgbImage, Error> {
    let config = ConfigBuilder::new()
        .keep_intermediates(keep_intermediates)
        .build()?;
    Pipeline::new(config)
        .run(initial, iterations)
        .map(|o| o.image)
}

#[cfg(test)]
mod tests {
    use image::Rgb;

    use super::*;
    use crate::test_support::capture_logs;

    #[test]
    fn default_naming() {
        let config = ConfigBuilder::new().build().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(
            config.artifact_path("cat", 3),
            PathBuf::from("arnold_cat-cat-3.png")
        );
    }

    #[test]
    fn prefix_and_extension() {
        let config = ConfigBuilder::new()
            .prefix("scrambled")
            .extension(".bmp")
            .output_dir("out")
            .build()
            .unwrap();
        assert_eq!(
            config.artifact_path("lena", 12),
            Path::new("out").join("scrambled-lena-12.bmp")
        );
    }

    #[test]
    fn custom_template() {
        let config = ConfigBuilder::new()
            .template("{index}_{name}.png")
            .build()
            .unwrap();
        assert_eq!(config.artifact_path("a", 1), PathBuf::from("1_a.png"));
        assert_ne!(config.artifact_path("a", 1), config.artifact_path("a", 2));
    }

    #[test]
    fn placeholders_in_stem_are_kept() {
        let config = Config::default();
        assert_eq!(
            config.artifact_path("{index}", 2),
            PathBuf::from("arnold_cat-{index}-2.png")
        );
        assert_eq!(
            config.artifact_path("a{name}b", 1),
            PathBuf::from("arnold_cat-a{name}b-1.png")
        );
    }

    #[test]
    fn stray_braces_in_template() {
        let config = ConfigBuilder::new()
            .template("{{name}}-{index}-{x.png")
            .build()
            .unwrap();
        assert_eq!(config.artifact_path("cat", 4), PathBuf::from("{cat}-4-{x.png"));
    }

    #[test]
    fn template_needs_placeholders() {
        for t in ["{name}.png", "{index}.png", "x/{name}-{index}.png"] {
            let r = ConfigBuilder::new().template(t).build();
            assert!(matches!(r, Err(Error::InvalidTemplate { .. })), "{t}");
        }
    }

    #[test]
    fn remove_missing_is_quiet() {
        let dir = tempfile::tempdir().unwrap();
        remove_artifact(&dir.path().join("gone.png"));
    }

    /// Loads fine, except the artifacts it was asked to save.
    struct UnreadableArtifacts;

    impl Codec for UnreadableArtifacts {
        fn load(&self, path: &Path) -> Result<RgbImage, Error> {
            if path.to_string_lossy().contains("arnold_cat-") {
                return Err(Error::Codec {
                    path: path.to_owned(),
                    source: image::ImageError::IoError(std::io::Error::new(
                        ErrorKind::InvalidData,
                        "truncated",
                    )),
                });
            }
            ImageCodec.load(path)
        }

        fn save(&self, image: &RgbImage, path: &Path) -> Result<(), Error> {
            ImageCodec.save(image, path)
        }
    }

    #[test]
    fn unreadable_final_image_is_logged() {
        let dir = tempfile::tempdir().unwrap();
        let initial = dir.path().join("cat.png");
        RgbImage::from_fn(4, 4, |x, y| Rgb([x as u8, y as u8, 0]))
            .save(&initial)
            .unwrap();
        let config = ConfigBuilder::new().output_dir(dir.path()).build().unwrap();
        let pipeline = Pipeline::with_codec(config, UnreadableArtifacts);

        let (r, logs) = capture_logs(|| pipeline.run(&initial, 1));
        let final_path = dir.path().join("arnold_cat-cat-1.png");
        assert!(matches!(r, Err(Error::Codec { ref path, .. }) if *path == final_path));
        assert!(logs.contains("cannot read final image"), "{logs}");
        assert!(logs.contains(&final_path.display().to_string()), "{logs}");
    }
}
