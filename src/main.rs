//! Main Program for Catmap
//! Run with `--help` for more instruction

// Copyright (C) 2023 Dheatly23
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

mod logging;
mod prompt;

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Error};
use catmap::{CatMap, ConfigBuilder, Pipeline};
use clap::Parser;
use tracing::warn;

use crate::prompt::Prompt;

#[derive(Parser, Debug)]
#[command(author, version, about = "Scramble square images with Arnold's cat map")]
struct Args {
    /// Input image (must be square). Asked interactively if omitted
    input: Option<PathBuf>,

    /// Number of iterations. Asked interactively if omitted
    #[arg(short = 'n', long)]
    iterations: Option<usize>,

    /// Keep intermediate images
    #[arg(short = 'k', long)]
    keep: bool,

    /// Artifact file name template, with {name} and {index} placeholders
    #[arg(long)]
    template: Option<String>,

    /// Output directory
    #[arg(short = 'o', long)]
    output_dir: Option<PathBuf>,

    /// Number of worker threads
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// Print the period of the image size and exit
    #[arg(long)]
    period: bool,

    /// Do not open the final image in a viewer
    #[arg(long)]
    no_show: bool,
}

fn main() {
    logging::init();

    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Error> {
    let args = Args::parse();

    if let Some(n) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()?;
    }

    let stdin = io::stdin();
    let mut prompt = Prompt::new(stdin.lock(), io::stdout());
    let interactive = args.input.is_none() || (args.iterations.is_none() && !args.period);

    let input = match args.input {
        Some(v) => v,
        None => prompt.image_path()?,
    };

    if args.period {
        let (w, h) = image::image_dimensions(&input)
            .with_context(|| format!("cannot read {}", input.display()))?;
        if w != h || w == 0 {
            anyhow::bail!("{} is not square ({w}x{h})", input.display());
        }
        println!("{}", CatMap::new(w as usize).period());
        return Ok(());
    }

    let iterations = match args.iterations {
        Some(v) => v,
        None => prompt.iterations()?,
    };
    let keep = args.keep || (interactive && iterations > 0 && prompt.keep_intermediates()?);

    let mut builder = ConfigBuilder::new().keep_intermediates(keep);
    if let Some(t) = args.template {
        builder = builder.template(t);
    }
    if let Some(d) = args.output_dir {
        builder = builder.output_dir(d);
    }
    let pipeline = Pipeline::new(builder.build()?);

    println!("Processing {} with {iterations} iterations...", input.display());
    let out = pipeline.run(&input, iterations)?;

    if iterations == 0 {
        println!("No iterations applied, {} is unchanged.", input.display());
    } else {
        println!("Done. Final image saved to {}", out.path.display());
        let (w, _) = out.image.dimensions();
        let period = CatMap::new(w.max(1) as usize).period();
        println!("The original image returns after {period} iterations.");
    }

    if !args.no_show {
        if let Err(e) = show(&out.path) {
            warn!(path = %out.path.display(), err = %e, "cannot open image viewer");
        }
    }

    Ok(())
}

/// Opens `path` with the platform image viewer.
fn show(path: &Path) -> Result<(), Error> {
    let mut cmd = if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    } else if cfg!(target_os = "macos") {
        Command::new("open")
    } else {
        Command::new("xdg-open")
    };

    let status = cmd.arg(path).status()?;
    if !status.success() {
        anyhow::bail!("viewer exited with {status}");
    }
    Ok(())
}
