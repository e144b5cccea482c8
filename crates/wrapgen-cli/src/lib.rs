//! wrapgen CLI library.
//!
//! Manifest loading, the in-process build graph, and the command
//! implementations behind the `wrapgen` binary.

pub mod commands;
pub mod graph;
pub mod logging;
pub mod manifest;
