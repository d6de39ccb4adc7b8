//! Replaying adapters that serve recorded interactions.

pub mod board;

use serde::de::DeserializeOwned;

use crate::ports::BoardError;

pub use board::ReplayingBoard;

/// Turn a recorded `{"Ok": v}` / `{"Err": msg}` output back into a `Result`.
///
/// Mirror of `recording::record_result`.
///
/// # Errors
///
/// Returns the recorded error message, or a decode error when the output
/// does not fit `T`.
pub(crate) fn replay_result<T: DeserializeOwned>(
    output: serde_json::Value,
    context: &str,
) -> Result<T, BoardError> {
    if let Some(err) = output.get("Err") {
        let msg = err.as_str().unwrap_or("unknown error").to_string();
        return Err(msg.into());
    }
    let value = output.get("Ok").cloned().unwrap_or(output);
    serde_json::from_value(value)
        .map_err(|e| format!("{context}: failed to deserialize recorded output: {e}").into())
}
