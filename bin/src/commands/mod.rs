//! CLI command implementations.

pub(crate) mod export;
pub(crate) mod replay;
pub(crate) mod run;
pub(crate) mod show;
