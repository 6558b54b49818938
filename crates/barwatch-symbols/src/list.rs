//! Newline-delimited symbol source.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use barwatch_types::{BarwatchError, Symbol};
use thiserror::Error;

/// Errors raised while loading or partitioning the symbol universe.
#[derive(Error, Debug)]
pub enum SymbolError {
    /// The symbol file could not be read.
    #[error("Failed to read symbol file {path}: {source}")]
    Io {
        /// Path of the symbol file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The symbol source contained no symbols.
    #[error("No stock symbols found in {origin}")]
    Empty {
        /// Where the symbols were read from.
        origin: String,
    },

    /// The worker cap was zero.
    #[error("Worker cap must be at least 1")]
    ZeroWorkers,
}

impl From<SymbolError> for BarwatchError {
    fn from(err: SymbolError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Ordered, non-empty list of ticker symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolList {
    symbols: Vec<Symbol>,
}

impl SymbolList {
    /// Loads symbols from a file with one ticker per line.
    ///
    /// Lines are trimmed and blank lines are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolError::Io`] if the file cannot be read and
    /// [`SymbolError::Empty`] if it holds no symbols.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SymbolError> {
        let path = path.as_ref();
        let io_err = |source| SymbolError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(io_err)?;
        let symbols = read_lines(BufReader::new(file)).map_err(io_err)?;
        let list = Self::from_symbols(symbols).map_err(|_| SymbolError::Empty {
            origin: path.display().to_string(),
        })?;
        tracing::info!(count = list.len(), path = %path.display(), "Loaded stock symbols");
        Ok(list)
    }

    /// Loads symbols from any reader with one ticker per line.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or no symbols are found.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SymbolError> {
        let symbols = read_lines(BufReader::new(reader)).map_err(|source| SymbolError::Io {
            path: PathBuf::from("<reader>"),
            source,
        })?;
        Self::from_symbols(symbols)
    }

    /// Builds a list from symbols already in memory.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolError::Empty`] if the iterator yields nothing.
    pub fn from_symbols<I, S>(symbols: I) -> Result<Self, SymbolError>
    where
        I: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        let symbols: Vec<Symbol> = symbols.into_iter().map(Into::into).collect();
        if symbols.is_empty() {
            return Err(SymbolError::Empty {
                origin: "symbol list".to_string(),
            });
        }
        Ok(Self { symbols })
    }

    /// Returns the number of symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Always false: an empty list cannot be constructed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Returns the symbols in file order.
    #[must_use]
    pub fn as_slice(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Returns an iterator over the symbols.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    /// Returns true if the list contains the given ticker.
    #[must_use]
    pub fn contains(&self, ticker: &str) -> bool {
        self.symbols.iter().any(|s| s.as_str() == ticker)
    }
}

fn read_lines<R: BufRead>(reader: R) -> std::io::Result<Vec<Symbol>> {
    let mut symbols = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            symbols.push(Symbol::from(trimmed));
        }
    }
    Ok(symbols)
}
