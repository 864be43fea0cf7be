//! Message Envelope
//!
//! The typed record every pipeline step consumes and produces. An envelope is
//! immutable once built: fields are private and only exposed by reference.
//!
//! ## Wire format
//!
//! The canonical text form is pretty-printed JSON with keys in lexicographic
//! order:
//!
//! ```json
//! {
//!   "from_agent": "AnalyzerAgent",
//!   "id": "6f1c…",
//!   "message": { "content": "…", "type": "repository-summary" },
//!   "timestamp": "2026-01-01T12:00:00.000000Z",
//!   "to_agent": "WriterAgent"
//! }
//! ```
//!
//! Unknown `type` values survive deserialization as [`MessageKind::Unknown`];
//! rejecting them is the consuming step's job.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use super::error::{CraftError, Result};

// =============================================================================
// Message Kind
// =============================================================================

/// Kinds of message exchanged between pipeline steps
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageKind {
    RepositorySummary,
    DraftDocument,
    AnnotatedDraft,
    FinalDocument,
    ExportConfirmation,
    PublishStatus,
    Error,
    /// A kind outside the known set, kept verbatim
    Unknown(String),
}

impl MessageKind {
    /// Every kind defined by the protocol
    pub const KNOWN: [MessageKind; 7] = [
        MessageKind::RepositorySummary,
        MessageKind::DraftDocument,
        MessageKind::AnnotatedDraft,
        MessageKind::FinalDocument,
        MessageKind::ExportConfirmation,
        MessageKind::PublishStatus,
        MessageKind::Error,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::RepositorySummary => "repository-summary",
            Self::DraftDocument => "draft-document",
            Self::AnnotatedDraft => "annotated-draft",
            Self::FinalDocument => "final-document",
            Self::ExportConfirmation => "export-confirmation",
            Self::PublishStatus => "publish-status",
            Self::Error => "error",
            Self::Unknown(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }

    /// Map an `Unknown` that spells a known kind onto that kind
    fn normalized(self) -> Self {
        match self {
            Self::Unknown(raw) => Self::from(raw),
            known => known,
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for MessageKind {
    fn from(s: &str) -> Self {
        Self::KNOWN
            .iter()
            .find(|k| k.as_str() == s)
            .cloned()
            .unwrap_or_else(|| Self::Unknown(s.to_string()))
    }
}

impl From<String> for MessageKind {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<MessageKind> for String {
    fn from(kind: MessageKind) -> Self {
        kind.as_str().to_string()
    }
}

// =============================================================================
// Message Id
// =============================================================================

/// Globally unique envelope identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageId(String);

impl MessageId {
    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for MessageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// =============================================================================
// Monotonic clock
// =============================================================================

static LAST_TIMESTAMP_MICROS: AtomicI64 = AtomicI64::new(i64::MIN);

/// Wall-clock time, strictly increasing across calls within this process.
///
/// Works at microsecond resolution so the value survives the RFC 3339 wire
/// form unchanged.
fn monotonic_now() -> DateTime<Utc> {
    let wall = Utc::now().timestamp_micros();
    let mut prev = LAST_TIMESTAMP_MICROS.load(Ordering::Acquire);
    loop {
        let next = if wall > prev { wall } else { prev + 1 };
        match LAST_TIMESTAMP_MICROS.compare_exchange_weak(
            prev,
            next,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => return DateTime::from_timestamp_micros(next).unwrap_or_else(Utc::now),
            Err(actual) => prev = actual,
        }
    }
}

fn parse_timestamp(raw: &str) -> std::result::Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    // Offset-less ISO-8601 is read as UTC
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| format!("invalid timestamp '{}': {}", raw, e))
}

// =============================================================================
// Message
// =============================================================================

/// Envelope threading data from one pipeline step to the next
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "WireMessage", try_from = "WireMessage")]
pub struct Message {
    id: MessageId,
    sender: String,
    receiver: String,
    kind: MessageKind,
    content: String,
    timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(
        sender: impl Into<String>,
        receiver: impl Into<String>,
        kind: MessageKind,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: MessageId::generate(),
            sender: sender.into(),
            receiver: receiver.into(),
            kind: kind.normalized(),
            content: content.into(),
            timestamp: monotonic_now(),
        }
    }

    /// Build an `error` envelope
    pub fn error(
        sender: impl Into<String>,
        receiver: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self::new(sender, receiver, MessageKind::Error, content)
    }

    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn receiver(&self) -> &str {
        &self.receiver
    }

    pub fn kind(&self) -> &MessageKind {
        &self.kind
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn is_error(&self) -> bool {
        self.kind == MessageKind::Error
    }

    /// Check this envelope's kind against what `step` accepts.
    pub fn ensure_kind(&self, step: &str, accepted: &[MessageKind]) -> Result<()> {
        if accepted.contains(&self.kind) {
            return Ok(());
        }
        let expected = accepted
            .iter()
            .map(MessageKind::as_str)
            .collect::<Vec<_>>()
            .join(" or ");
        Err(CraftError::Contract {
            step: step.to_string(),
            expected,
            actual: self.kind.to_string(),
        })
    }

    /// Serialize to the canonical text form
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rebuild an envelope from its canonical text form
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} -> {} ({}, {} chars)",
            self.kind,
            self.sender,
            self.receiver,
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.content.chars().count()
        )
    }
}

// Field order is the canonical key order.
#[derive(Serialize, Deserialize)]
struct WireMessage {
    from_agent: String,
    id: String,
    message: WireBody,
    timestamp: String,
    to_agent: String,
}

#[derive(Serialize, Deserialize)]
struct WireBody {
    content: String,
    #[serde(rename = "type")]
    kind: MessageKind,
}

impl From<Message> for WireMessage {
    fn from(m: Message) -> Self {
        Self {
            from_agent: m.sender,
            id: m.id.0,
            message: WireBody {
                content: m.content,
                kind: m.kind,
            },
            timestamp: m.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
            to_agent: m.receiver,
        }
    }
}

impl TryFrom<WireMessage> for Message {
    type Error = String;

    fn try_from(w: WireMessage) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            id: MessageId(w.id),
            sender: w.from_agent,
            receiver: w.to_agent,
            kind: w.message.kind,
            content: w.message.content,
            timestamp: parse_timestamp(&w.timestamp)?,
        })
    }
}
