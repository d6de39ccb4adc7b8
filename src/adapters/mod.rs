//! Adapter implementations of the port traits.
//!
//! - `live`: real Trello API and system clock.
//! - `memory`: in-process board used by tests.
//! - `recording`: wraps another board service and records every call.
//! - `replaying`: serves a recorded cassette back.

pub mod live;
pub mod memory;
pub mod recording;
pub mod replaying;
