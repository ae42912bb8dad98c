//! File helpers around [`convert`](crate::convert).

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::{convert, Conversion, Encoding, Error, Options};

pub const DEFAULT_EXTENSION: &str = "bin";

/// Output filename: `input` with its extension replaced by `extension`.
///
/// Fails with [`std::io::ErrorKind::InvalidInput`] if that would overwrite
/// the input itself.
pub fn output_path(input: &Path, extension: &str) -> Result<PathBuf, Error> {
    let output = input.with_extension(extension.trim_start_matches('.'));

    if output == input {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("output file {} would overwrite the input", output.display()),
        )
        .into());
    }

    Ok(output)
}

/// Reads and converts one input file.
///
/// Bytes that are not UTF-8 only spoil the lines they sit on, which are then
/// reported as malformed.
pub fn convert_file(path: &Path, encoding: Encoding, options: &Options) -> Result<Conversion, Error> {
    let bytes = fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    info!("Input file: {}", path.display());

    convert(encoding, &text, options)
}

pub fn write_image(path: &Path, bytes: &[u8]) -> Result<(), Error> {
    fs::write(path, bytes)?;
    info!("Wrote {} bytes to {}", bytes.len(), path.display());

    Ok(())
}
