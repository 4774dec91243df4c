//! Asset loading errors and the legacy animation path format.
//!
//! A path file is a plain list of real numbers separated by whitespace or
//! newlines, read as `(dx, dy)` pairs until end of file. Each pair is the
//! displacement of one step of the path. A trailing unpaired number is
//! ignored; a file without a single complete pair is rejected.

use std::path::{Path, PathBuf};

use glam::Vec2;
use log::info;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path:?} contains no data")]
    Empty { path: PathBuf },
    #[error("failed to parse {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid asset: {0}")]
    Invalid(String),
}

/// Read a legacy path file into its list of per-step displacements.
pub fn load_animation_path(path: impl AsRef<Path>) -> Result<Vec<Vec2>, AssetError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let steps = parse_animation_path(&text).map_err(|message| AssetError::Parse {
        path: path.to_path_buf(),
        message,
    })?;
    if steps.is_empty() {
        return Err(AssetError::Empty {
            path: path.to_path_buf(),
        });
    }
    info!("Loaded animation path {:?} ({} steps)", path, steps.len());
    Ok(steps)
}

/// Parse the textual form. Reading stops at the first token that is not a
/// number, as a stream extraction would.
pub fn parse_animation_path(text: &str) -> Result<Vec<Vec2>, String> {
    let mut numbers = Vec::new();
    for token in text.split_whitespace() {
        match token.parse::<f32>() {
            Ok(value) if value.is_finite() => numbers.push(value),
            Ok(_) => return Err(format!("non-finite value '{}'", token)),
            Err(_) => break,
        }
    }
    Ok(numbers
        .chunks_exact(2)
        .map(|pair| Vec2::new(pair[0], pair[1]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_are_read_until_eof() {
        let steps = parse_animation_path("1 2\n3.5 -4\n 5").unwrap();
        assert_eq!(steps, vec![Vec2::new(1.0, 2.0), Vec2::new(3.5, -4.0)]);
    }

    #[test]
    fn garbage_stops_reading() {
        let steps = parse_animation_path("1 2 x 3 4").unwrap();
        assert_eq!(steps, vec![Vec2::new(1.0, 2.0)]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_animation_path("/nonexistent/path.txt").unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
    }
}
