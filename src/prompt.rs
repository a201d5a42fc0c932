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

//! Interactive prompts. Each one asks again until the answer is valid.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Error};

pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, question: &str) -> Result<String, Error> {
        writeln!(self.output, "{question}")?;
        write!(self.output, "\t")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            bail!("Unexpected end of input");
        }
        Ok(line.trim().to_owned())
    }

    /// Asks for an existing, readable, square image.
    pub fn image_path(&mut self) -> Result<PathBuf, Error> {
        loop {
            let answer = self.ask("Path to image (must be square):")?;
            if answer.is_empty() {
                writeln!(self.output, "Path cannot be empty.")?;
                continue;
            }

            let path = PathBuf::from(answer);
            match check_square(&path) {
                Ok(()) => return Ok(path),
                Err(e) => writeln!(self.output, "{e}. Try again.")?,
            }
        }
    }

    pub fn iterations(&mut self) -> Result<usize, Error> {
        loop {
            let answer = self.ask("Number of iterations (e.g. 3):")?;
            match answer.parse::<i64>() {
                Ok(v) if v >= 0 => return Ok(v as usize),
                Ok(_) => writeln!(self.output, "Iterations cannot be negative.")?,
                Err(_) => writeln!(self.output, "Invalid input, enter an integer.")?,
            }
        }
    }

    pub fn keep_intermediates(&mut self) -> Result<bool, Error> {
        loop {
            let answer = self.ask("Keep intermediate images? (yes/no):")?;
            match &*answer.to_lowercase() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => writeln!(self.output, "Invalid answer, type 'yes' or 'no'.")?,
            }
        }
    }
}

fn check_square(path: &Path) -> Result<(), String> {
    if !path.exists() {
        return Err(format!("No image found at {}", path.display()));
    }
    match image::image_dimensions(path) {
        Ok((w, h)) if w == h => Ok(()),
        Ok((w, h)) => Err(format!("Image is not square ({w}x{h})")),
        Err(e) => Err(format!("Cannot open image: {e}")),
    }
}
