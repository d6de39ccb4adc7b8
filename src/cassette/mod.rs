//! Cassettes: YAML recordings of board-service interactions, replayed in
//! tests and when reproducing a reported pass.

pub mod format;
pub mod recorder;
pub mod replayer;
