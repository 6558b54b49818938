//! Symbol partitioning into worker batches.

use std::iter::FusedIterator;
use std::slice::Chunks;

use barwatch_types::Symbol;

use crate::SymbolError;

/// Computes the batch size for `len` symbols spread over `max_workers`.
///
/// The result is `ceil(len / max_workers)`, never less than 1.
///
/// # Errors
///
/// Returns an error if `len` or `max_workers` is zero.
pub fn batch_size(len: usize, max_workers: usize) -> Result<usize, SymbolError> {
    if max_workers == 0 {
        return Err(SymbolError::ZeroWorkers);
    }
    if len == 0 {
        return Err(SymbolError::Empty {
            origin: String::new(),
        });
    }
    let size = len.div_ceil(max_workers);
    Ok(if size == 0 { 1 } else { size })
}

/// Splits symbols into contiguous, order-preserving batches.
///
/// At most `max_workers` batches are produced and none of them is empty.
///
/// # Errors
///
/// Returns an error if `symbols` is empty or `max_workers` is zero.
pub fn partition(symbols: &[Symbol], max_workers: usize) -> Result<Batches<'_>, SymbolError> {
    let size = batch_size(symbols.len(), max_workers).map_err(|err| match err {
        SymbolError::Empty { .. } => SymbolError::Empty {
            origin: "symbol list".to_string(),
        },
        other => other,
    })?;
    Ok(Batches {
        chunks: symbols.chunks(size),
        batch_size: size,
    })
}

/// Lazy sequence of symbol batches; consumed once.
#[derive(Debug, Clone)]
pub struct Batches<'a> {
    chunks: Chunks<'a, Symbol>,
    batch_size: usize,
}

impl Batches<'_> {
    /// Returns the maximum number of symbols per batch.
    #[must_use]
    pub const fn batch_size(&self) -> usize {
        self.batch_size
    }
}

impl<'a> Iterator for Batches<'a> {
    type Item = &'a [Symbol];

    fn next(&mut self) -> Option<Self::Item> {
        self.chunks.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl ExactSizeIterator for Batches<'_> {}

impl FusedIterator for Batches<'_> {}
