//! The recommendation engine. Everything here is synchronous and free of I/O.

pub mod aggregator;
pub mod analysis;
pub mod auditor;
pub mod error;
pub mod ranker;
pub mod records;
pub mod synthesizer;
pub mod vector;
pub mod weights;
