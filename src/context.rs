//! Service context bundling the port trait objects.

use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use crate::adapters::live::{LiveClock, LiveTrello};
use crate::adapters::recording::RecordingBoard;
use crate::adapters::replaying::ReplayingBoard;
use crate::cassette::format::Cassette;
use crate::cassette::recorder::CassetteRecorder;
use crate::cassette::replayer::CassetteReplayer;
use crate::config::AuthConfig;
use crate::ports::{BoardService, Clock};

/// Bundles the port trait objects a run needs.
///
/// Constructors wire up different adapter implementations (live, recording,
/// replaying).
pub struct ServiceContext {
    /// Trello boards, lists, cards and checklists.
    pub board: Box<dyn BoardService>,
    /// Clock for pacing passes.
    pub clock: Box<dyn Clock>,
    /// Optional cassette recorder; written to disk on drop.
    recorder: Option<Arc<Mutex<CassetteRecorder>>>,
}

impl ServiceContext {
    /// Creates a live context talking to the Trello API.
    #[must_use]
    pub fn live(auth: AuthConfig) -> Self {
        Self::with_board(Box::new(LiveTrello::new(auth)))
    }

    /// Creates a live context that records every board interaction.
    ///
    /// The cassette is written to `path` when this context is dropped. This
    /// is the mechanism behind the `COLLATE_RECORD` env var.
    #[must_use]
    pub fn recording(auth: AuthConfig, path: &Path) -> Self {
        Self::recording_with(Box::new(LiveTrello::new(auth)), path)
    }

    /// Records the interactions of an arbitrary board service.
    #[must_use]
    pub fn recording_with(inner: Box<dyn BoardService>, path: &Path) -> Self {
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(path, "collate-session")));
        Self {
            board: Box::new(RecordingBoard::new(inner, Arc::clone(&recorder))),
            clock: Box::new(LiveClock),
            recorder: Some(recorder),
        }
    }

    /// Creates a context whose board interactions are served from a cassette.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be read or parsed.
    pub fn replaying(path: &Path) -> Result<Self, String> {
        let cassette = Cassette::load(path)?;
        Ok(Self::with_board(Box::new(ReplayingBoard::new(CassetteReplayer::new(&cassette)))))
    }

    /// Wraps a board service with the live clock.
    #[must_use]
    pub fn with_board(board: Box<dyn BoardService>) -> Self {
        Self { board, clock: Box::new(LiveClock), recorder: None }
    }
}

impl Drop for ServiceContext {
    fn drop(&mut self) {
        let Some(shared) = self.recorder.take() else {
            return;
        };
        let Ok(recorder) = shared.lock() else {
            warn!("cassette recorder lock poisoned; recording discarded");
            return;
        };
        let written = recorder.finish();
        match written {
            Ok(path) => {
                info!(path = %path.display(), interactions = recorder.len(), "recording saved");
            }
            Err(e) => warn!("failed to write cassette: {e}"),
        }
    }
}
