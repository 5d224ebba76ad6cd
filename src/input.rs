//! Input source abstraction for file and stdin.
//!
//! This module provides the [`Input`] enum for abstracting over different input sources,
//! enabling seamless Unix pipeline integration.
//!
//! # Example
//!
//! ```rust
//! use seqsift::input::Input;
//! use std::path::Path;
//!
//! // From a file path
//! let input = Input::from_path(Path::new("contigs.fa"));
//! assert!(matches!(input, Input::File(_)));
//!
//! // From stdin marker
//! let input = Input::from_path(Path::new("-"));
//! assert!(matches!(input, Input::Stdin));
//! ```

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

/// Input source for sequence files and score tables.
///
/// Represents either a file path or standard input, allowing the same
/// reading logic to work with both input sources.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Input {
    /// Read from a file at the specified path.
    File(PathBuf),
    /// Read from standard input.
    #[default]
    Stdin,
}

impl Input {
    /// Creates an `Input` from a path.
    ///
    /// If the path is "-", returns [`Self::Stdin`].
    /// Otherwise, returns [`Self::File`] with the given path.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        if path.as_os_str() == "-" {
            Self::Stdin
        } else {
            Self::File(path.to_path_buf())
        }
    }

    /// Returns `true` if this input is stdin.
    #[must_use]
    pub const fn is_stdin(&self) -> bool {
        matches!(self, Self::Stdin)
    }

    /// Returns the file path if this is a file input.
    #[must_use]
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Self::File(path) => Some(path),
            Self::Stdin => None,
        }
    }

    /// Path used in error messages (`-` for stdin).
    #[must_use]
    pub fn display_path(&self) -> PathBuf {
        self.as_path()
            .map_or_else(|| PathBuf::from("-"), Path::to_path_buf)
    }

    /// Opens the input as a buffered reader.
    ///
    /// With the `gzip` feature, files ending in `.gz` are decompressed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn open(&self) -> io::Result<Box<dyn BufRead>> {
        match self {
            Self::Stdin => Ok(Box::new(BufReader::new(io::stdin()))),
            Self::File(path) => {
                let file = File::open(path)?;
                #[cfg(feature = "gzip")]
                if is_gzip_path(path) {
                    let decoder = flate2::read::MultiGzDecoder::new(file);
                    return Ok(Box::new(BufReader::new(decoder)));
                }
                Ok(Box::new(BufReader::new(file)))
            }
        }
    }
}

/// Check if a path has a gzip extension (.gz).
#[cfg(feature = "gzip")]
fn is_gzip_path(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

impl std::fmt::Display for Input {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Stdin => write!(f, "<stdin>"),
        }
    }
}
