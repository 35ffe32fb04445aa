//! Reconciler
//!
//! Routes one pushed message at a time into the directory or the active
//! timeline, maintaining the dedup and unseen-count invariants under
//! arbitrary interleavings with selection changes and history loads.
//!
//! Events are processed strictly in channel-delivery order; no reordering
//! by `created_at` is attempted.

use crate::directory::Directory;
use crate::protocol::PushedMessage;
use crate::timeline::Timeline;
use tracing::{debug, warn};

/// Outcome of routing one pushed message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Routing {
    /// Appended to the active timeline; the caller must fire the seen ack
    Appended {
        /// Id of the appended message
        message_id: String,
    },
    /// The active timeline already held this id; redelivery, nothing to do
    AlreadyPresent,
    /// Counted against a non-active peer's unseen counter
    Counted {
        /// Peer whose counter was incremented
        sender_id: String,
    },
    /// Event could not be attributed and was dropped
    Dropped,
}

/// Route one pushed message
///
/// If the message belongs to the selected conversation it is marked seen
/// and appended to the timeline (dedup by id); otherwise the sender's
/// unseen counter is incremented and no timeline is touched. Malformed
/// events degrade to [`Routing::Dropped`] with a log entry, never an error.
pub fn route_push(
    selection: Option<&str>,
    directory: &mut Directory,
    timeline: &mut Timeline,
    pushed: PushedMessage,
) -> Routing {
    let mut message = match pushed.into_message() {
        Ok(m) => m,
        Err(e) => {
            warn!("Dropping unattributable push event: {}", e);
            return Routing::Dropped;
        }
    };

    if selection == Some(message.conversation_peer_id.as_str()) {
        // Conversation is open: the operator is looking at it right now.
        message.seen = true;
        let message_id = message.id.clone();

        if timeline.append_unique(message) {
            debug!("Appended pushed message {} to active timeline", message_id);
            Routing::Appended { message_id }
        } else {
            debug!("Push redelivery of {} ignored", message_id);
            Routing::AlreadyPresent
        }
    } else {
        let count = directory.bump_unseen(&message.sender_id);
        debug!(
            "Counted pushed message {} for inactive peer {} (unseen: {})",
            message.id, message.sender_id, count
        );
        Routing::Counted {
            sender_id: message.sender_id,
        }
    }
}
