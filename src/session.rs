//! Pipeline Session
//!
//! Owns the envelope history of one README run and decides what each step
//! receives. Steps only ever see the latest relevant envelope, so the causal
//! chain lives here instead of in the agents.
//!
//! Two hand-offs are rewritten by the session:
//! - another feedback round on a `final-document` re-issues it as a
//!   `draft-document` sent by the session;
//! - exporting or publishing a draft that never went through feedback
//!   promotes it to a `final-document` sent by the session.
//!
//! The session serializes to a JSON file so separate CLI invocations can
//! continue the same run.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::agents::{FEEDBACK, SESSION};
use crate::types::{CraftError, Message, MessageKind, Result};

const DOCUMENT_KINDS: [MessageKind; 3] = [
    MessageKind::DraftDocument,
    MessageKind::AnnotatedDraft,
    MessageKind::FinalDocument,
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Repository reference the run was started from
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    history: Vec<Message>,
}

impl Session {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            history: Vec::new(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CraftError::Session(format!(
                "no session at {}; run `readmecraft generate` first",
                path.display()
            )));
        }
        let raw = fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|e| {
            CraftError::Session(format!("corrupt session {}: {}", path.display(), e))
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        debug!("Saved session ({} messages) to {}", self.history.len(), path.display());
        Ok(())
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn last(&self) -> Option<&Message> {
        self.history.last()
    }

    /// Append an envelope and hand back a reference to it
    pub fn record(&mut self, message: Message) -> &Message {
        debug!("Session recorded {}", message);
        self.history.push(message);
        &self.history[self.history.len() - 1]
    }

    fn latest_of(&self, kinds: &[MessageKind]) -> Option<&Message> {
        self.history.iter().rev().find(|m| kinds.contains(m.kind()))
    }

    pub fn latest_summary(&self) -> Option<&Message> {
        self.latest_of(&[MessageKind::RepositorySummary])
    }

    /// Newest draft, annotated draft or final document
    pub fn latest_document(&self) -> Option<&Message> {
        self.latest_of(&DOCUMENT_KINDS)
    }

    /// Envelope for the writer
    pub fn writer_input(&self) -> Result<Message> {
        self.latest_summary()
            .cloned()
            .ok_or_else(|| CraftError::Session("no repository summary yet; analyze first".into()))
    }

    fn require_document(&self) -> Result<&Message> {
        self.latest_document()
            .ok_or_else(|| CraftError::Session("no README draft yet; generate one first".into()))
    }

    /// Envelope for the next feedback round
    pub fn feedback_input(&self) -> Result<Message> {
        let document = self.require_document()?;
        if document.kind() == &MessageKind::FinalDocument {
            return Ok(Message::new(
                SESSION,
                FEEDBACK,
                MessageKind::DraftDocument,
                document.content(),
            ));
        }
        Ok(document.clone())
    }

    /// Envelope for the exporter or publisher addressed to `receiver`
    pub fn output_input(&self, receiver: &str) -> Result<Message> {
        let document = self.require_document()?;
        if document.kind() == &MessageKind::FinalDocument {
            return Ok(document.clone());
        }
        Ok(Message::new(
            SESSION,
            receiver,
            MessageKind::FinalDocument,
            document.content(),
        ))
    }

    /// The annotator accepts any prior envelope; the newest document wins.
    pub fn vision_input(&self) -> Result<Message> {
        self.require_document().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::agents::EXPORTER;
    use tempfile::TempDir;

    fn session_with(kinds: &[MessageKind]) -> Session {
        let mut session = Session::new("octo/app");
        for (i, kind) in kinds.iter().enumerate() {
            session.record(Message::new("A", "B", kind.clone(), format!("doc {}", i)));
        }
        session
    }

    #[test]
    fn test_missing_steps_are_errors() {
        let session = Session::new("octo/app");
        assert!(matches!(session.writer_input(), Err(CraftError::Session(_))));
        assert!(matches!(session.feedback_input(), Err(CraftError::Session(_))));
        assert!(matches!(session.output_input(EXPORTER), Err(CraftError::Session(_))));
    }

    #[test]
    fn test_final_document_is_reissued_as_draft_for_feedback() {
        let session = session_with(&[MessageKind::DraftDocument, MessageKind::FinalDocument]);
        let input = session.feedback_input().unwrap();
        assert_eq!(input.kind(), &MessageKind::DraftDocument);
        assert_eq!(input.sender(), SESSION);
        assert_eq!(input.content(), "doc 1");
    }

    #[test]
    fn test_draft_is_promoted_for_export() {
        let session = session_with(&[MessageKind::DraftDocument, MessageKind::AnnotatedDraft]);
        let input = session.output_input(EXPORTER).unwrap();
        assert_eq!(input.kind(), &MessageKind::FinalDocument);
        assert_eq!(input.sender(), SESSION);
        assert_eq!(input.receiver(), EXPORTER);
        assert_eq!(input.content(), "doc 1");
    }

    #[test]
    fn test_final_document_passes_through() {
        let session = session_with(&[MessageKind::FinalDocument, MessageKind::ExportConfirmation]);
        let input = session.output_input(EXPORTER).unwrap();
        assert_eq!(input, session.history()[0]);
    }

    #[test]
    fn test_latest_ignores_non_documents() {
        let session = session_with(&[
            MessageKind::RepositorySummary,
            MessageKind::DraftDocument,
            MessageKind::Error,
            MessageKind::PublishStatus,
        ]);
        assert_eq!(session.latest_document().unwrap().content(), "doc 1");
        assert_eq!(session.latest_summary().unwrap().content(), "doc 0");
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".readmecraft").join("session.json");

        let session = session_with(&[MessageKind::RepositorySummary, MessageKind::DraftDocument]);
        session.save(&path).unwrap();

        let loaded = Session::load(&path).unwrap();
        assert_eq!(loaded, session);
        assert_eq!(loaded.source(), Some("octo/app"));
    }

    #[test]
    fn test_load_missing_and_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        assert!(matches!(Session::load(&path), Err(CraftError::Session(_))));

        fs::write(&path, "{not json").unwrap();
        assert!(matches!(Session::load(&path), Err(CraftError::Session(_))));
    }
}
