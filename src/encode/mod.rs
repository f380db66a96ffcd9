//! Encoding surfaces to bytes and writing them to a destination.

pub mod format;
pub mod sink;
