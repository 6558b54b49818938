//! Symbol universe loading and batch partitioning for barwatch.
//!
//! # Example
//!
//! ```
//! use barwatch_symbols::{SymbolList, partition};
//!
//! let symbols = SymbolList::from_reader("AAPL\nMSFT\n\nNVDA\n".as_bytes()).unwrap();
//! let batches: Vec<_> = partition(symbols.as_slice(), 2).unwrap().collect();
//! assert_eq!(batches.len(), 2);
//! assert_eq!(batches[0].len(), 2);
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/barwatch/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod list;
mod partition;

pub use list::{SymbolError, SymbolList};
pub use partition::{Batches, batch_size, partition};
