use tokio::sync::broadcast;

use super::{AudioOutput, PlaybackError};
use crate::protocol::ServerMessage;
use crate::types::ClipId;

/// Plays clips in the connected host pages.
///
/// The host page answers every `PlayClip` with a `ClipDone` once the clip
/// ends or errors. Reports that never arrive are covered by a completion
/// deadline on the state side.
pub struct RemoteAudio {
    tx: broadcast::Sender<ServerMessage>,
}

impl RemoteAudio {
    pub fn new(tx: broadcast::Sender<ServerMessage>) -> Self {
        Self { tx }
    }
}

impl AudioOutput for RemoteAudio {
    fn play(&mut self, clip: ClipId, resource: &str) -> Result<(), PlaybackError> {
        self.tx
            .send(ServerMessage::PlayClip {
                clip_id: clip,
                resource: resource.to_string(),
            })
            .map(|_| ())
            .map_err(|_| PlaybackError::NoListener)
    }

    fn stop(&mut self, clip: ClipId) {
        // Nobody listening means nothing is playing
        let _ = self.tx.send(ServerMessage::StopClip { clip_id: clip });
    }
}
