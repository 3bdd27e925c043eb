//! Input and output endpoints
//!
//! `-` stands for stdin or stdout. Files are written through a temporary
//! file in the destination directory and renamed into place, so a failed
//! conversion never leaves a partial program behind.

use penkit_core::{OutputError, Result, ValidationError};
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Names tried in a directory before giving up
pub const MAX_NAME_ATTEMPTS: usize = 100;

/// Extension of generated programs
pub const GCODE_EXTENSION: &str = "gcode";

/// Where a conversion reads from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    /// `-` is stdin, anything else a file
    pub fn parse(arg: &str) -> Self {
        if arg == "-" {
            Self::Stdin
        } else {
            Self::File(PathBuf::from(arg))
        }
    }

    /// Name used in headers, events and messages
    pub fn display_name(&self) -> String {
        match self {
            Self::Stdin => "stdin".to_string(),
            Self::File(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
        }
    }

    /// File stem used to name outputs
    pub fn stem(&self) -> String {
        match self {
            Self::Stdin => "stdin".to_string(),
            Self::File(path) => path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "output".to_string()),
        }
    }

    /// Read the whole input as text
    pub fn read_to_string(&self) -> Result<String> {
        match self {
            Self::Stdin => {
                let mut content = String::new();
                std::io::stdin()
                    .read_to_string(&mut content)
                    .map_err(|e| ValidationError::UnreadableInput {
                        path: "stdin".to_string(),
                        reason: e.to_string(),
                    })?;
                Ok(content)
            }
            Self::File(path) => fs::read_to_string(path).map_err(|e| {
                ValidationError::UnreadableInput {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                }
                .into()
            }),
        }
    }
}

/// Where a conversion writes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    /// An explicit file; replaced if it exists
    File(PathBuf),
    /// A directory; a free name is picked inside
    Directory(PathBuf),
}

impl OutputTarget {
    /// `-` is stdout; existing directories and paths ending in a separator
    /// are directories; anything else is a file
    pub fn parse(arg: &str) -> Self {
        if arg == "-" {
            return Self::Stdout;
        }
        let path = PathBuf::from(arg);
        if path.is_dir() || arg.ends_with('/') || arg.ends_with(std::path::MAIN_SEPARATOR) {
            Self::Directory(path)
        } else {
            Self::File(path)
        }
    }

    /// Write `lines` and return the path written, `None` for stdout
    ///
    /// `stem` names the file when the target is a directory.
    pub fn write(&self, lines: &[String], stem: &str) -> Result<Option<PathBuf>> {
        match self {
            Self::Stdout => {
                let stdout = std::io::stdout();
                let mut out = stdout.lock();
                write_lines(&mut out, lines)
                    .and_then(|_| out.flush())
                    .map_err(|e| OutputError::WriteFailed {
                        path: PathBuf::from("-"),
                        reason: e.to_string(),
                    })?;
                Ok(None)
            }
            Self::File(path) => {
                if path.exists() {
                    tracing::warn!("Overwriting {}", path.display());
                }
                write_atomic(path, lines)?;
                Ok(Some(path.clone()))
            }
            Self::Directory(dir) => {
                ensure_dir(dir)?;
                let path = unique_path(dir, stem, GCODE_EXTENSION)?;
                write_atomic(&path, lines)?;
                Ok(Some(path))
            }
        }
    }
}

/// First free name among `stem.ext`, `stem_1.ext`, ... in `dir`
pub fn unique_path(dir: &Path, stem: &str, ext: &str) -> Result<PathBuf> {
    let first = dir.join(format!("{}.{}", stem, ext));
    for n in 0..MAX_NAME_ATTEMPTS {
        let candidate = match n {
            0 => first.clone(),
            n => dir.join(format!("{}_{}.{}", stem, n, ext)),
        };
        if !candidate.exists() {
            return Ok(candidate);
        }
    }
    Err(OutputError::NameCollision {
        path: first,
        attempts: MAX_NAME_ATTEMPTS,
    }
    .into())
}

/// Write `lines` to `path` through a temporary file and rename
pub fn write_atomic(path: &Path, lines: &[String]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    ensure_dir(&dir)?;

    let failed = |reason: String| OutputError::WriteFailed {
        path: path.to_path_buf(),
        reason,
    };

    let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| failed(e.to_string()))?;
    write_lines(&mut tmp, lines)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| failed(e.to_string()))?;
    tmp.persist(path).map_err(|e| failed(e.error.to_string()))?;

    tracing::debug!("Wrote {} lines to {}", lines.len(), path.display());
    Ok(())
}

fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| {
        OutputError::DirectoryUncreatable {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        }
        .into()
    })
}

fn write_lines<W: Write>(out: &mut W, lines: &[String]) -> std::io::Result<()> {
    for line in lines {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}
