//! README Agents
//!
//! Each agent consumes one envelope (or raw input for the first step) and
//! produces one envelope. Consumers check the incoming kind before doing
//! anything and answer an unexpected kind with an `error` envelope addressed
//! to the caller, without touching any backend.

pub mod analyzer;
pub mod exporter;
pub mod feedback;
pub mod publisher;
pub mod vision;
pub mod writer;

pub use analyzer::AnalyzerAgent;
pub use exporter::{ExportAgent, ExportHook, ExportLogHook, VersionSnapshotHook};
pub use feedback::FeedbackAgent;
pub use publisher::{GitHubApi, HostingApi, PublishAgent, PutFileRequest, RepoRef};
pub use vision::VisionAgent;
pub use writer::{SummarySignals, WriterAgent};

use crate::constants::agents::CALLER;
use crate::types::{Message, MessageKind};

/// Validate `incoming` against the kinds `agent` accepts.
///
/// Returns the error envelope to hand back when the kind does not match.
pub(crate) fn check_kind(
    agent: &str,
    incoming: &Message,
    accepted: &[MessageKind],
) -> Option<Message> {
    match incoming.ensure_kind(agent, accepted) {
        Ok(()) => None,
        Err(e) => {
            tracing::warn!("{} rejected message {}: {}", agent, incoming.id(), e);
            Some(Message::error(agent, CALLER, e.to_string()))
        }
    }
}
