//! Vision Agent
//!
//! Appends a "System Overview" section derived from an architecture diagram.
//! The prior envelope is taken as-is (no kind check). Decoding or generation
//! problems end up as the failure text inside the section; only reading the
//! diagram from disk is fatal, and that happens before this agent runs.

use std::path::Path;

use tracing::{info, warn};

use crate::ai::{ImageAttachment, TextGenerator};
use crate::constants::agents::{FEEDBACK, VISION};
use crate::constants::generation::{DEFAULT_VISION_PROMPT, OVERVIEW_HEADING};
use crate::types::{CraftError, Message, MessageKind, Result};

/// Section separator placed between the draft and the overview
pub const SEPARATOR: &str = "\n\n---\n\n";

/// Read a diagram from disk.
pub fn read_diagram(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        CraftError::Image(format!("cannot read diagram {}: {}", path.display(), e))
    })
}

/// Identify the image format by its signature
pub fn decode_image(bytes: Vec<u8>) -> Result<ImageAttachment> {
    let mime_type = if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        "image/png"
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        "image/gif"
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        "image/webp"
    } else if bytes.is_empty() {
        return Err(CraftError::Image("empty image data".to_string()));
    } else {
        return Err(CraftError::Image(
            "unrecognized image format (expected PNG, JPEG, GIF or WebP)".to_string(),
        ));
    };
    Ok(ImageAttachment::new(mime_type, bytes))
}

pub struct VisionAgent {
    generator: TextGenerator,
    instruction: String,
}

impl VisionAgent {
    pub fn new(generator: TextGenerator) -> Self {
        Self {
            generator,
            instruction: DEFAULT_VISION_PROMPT.to_string(),
        }
    }

    /// Replace the default diagram instruction
    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = instruction.into();
        self
    }

    /// Describe the diagram, or the reason it could not be described
    pub async fn describe(&self, image_bytes: Vec<u8>) -> String {
        match decode_image(image_bytes) {
            Ok(image) => {
                info!("Analyzing {} diagram", image.mime_type);
                self.generator
                    .complete_with_image(&self.instruction, &image)
                    .await
            }
            Err(e) => {
                warn!("Diagram rejected: {}", e);
                TextGenerator::failure_text("image", e)
            }
        }
    }

    /// Produce an `annotated-draft` from any prior envelope
    pub async fn run(&self, image_bytes: Vec<u8>, previous: &Message) -> Message {
        let section = self.describe(image_bytes).await;
        let content = format!(
            "{}{}{}\n{}",
            previous.content(),
            SEPARATOR,
            OVERVIEW_HEADING,
            section
        );
        Message::new(VISION, FEEDBACK, MessageKind::AnnotatedDraft, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::stub::StubProvider;
    use std::time::Duration;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];

    fn draft() -> Message {
        Message::new("WriterAgent", VISION, MessageKind::DraftDocument, "# App")
    }

    #[test]
    fn test_signatures() {
        assert_eq!(decode_image(PNG.to_vec()).unwrap().mime_type, "image/png");
        assert_eq!(
            decode_image(vec![0xFF, 0xD8, 0xFF, 0xE0]).unwrap().mime_type,
            "image/jpeg"
        );
        assert_eq!(decode_image(b"GIF89a..".to_vec()).unwrap().mime_type, "image/gif");
        assert_eq!(
            decode_image(b"RIFF\x10\0\0\0WEBPVP8 ".to_vec()).unwrap().mime_type,
            "image/webp"
        );
        assert!(decode_image(b"%PDF-1.7".to_vec()).is_err());
        assert!(decode_image(Vec::new()).is_err());
    }

    #[tokio::test]
    async fn test_appends_overview_section() {
        let stub = StubProvider::replying("Three services talk over a queue.");
        let agent = VisionAgent::new(TextGenerator::new(stub.shared(), Duration::from_secs(1)));

        let reply = agent.run(PNG.to_vec(), &draft()).await;

        assert_eq!(reply.kind(), &MessageKind::AnnotatedDraft);
        assert_eq!(
            reply.content(),
            "# App\n\n---\n\n🧭 **System Overview**\nThree services talk over a queue."
        );
        let call = &stub.calls()[0];
        assert_eq!(call.prompt, DEFAULT_VISION_PROMPT);
        assert_eq!(call.image_mime, Some("image/png"));
    }

    #[tokio::test]
    async fn test_undecodable_image_degrades() {
        let stub = StubProvider::replying("unused");
        let agent = VisionAgent::new(TextGenerator::new(stub.shared(), Duration::from_secs(1)));

        let reply = agent.run(b"not an image".to_vec(), &draft()).await;

        assert_eq!(reply.kind(), &MessageKind::AnnotatedDraft);
        assert!(reply.content().starts_with("# App\n\n---\n\n🧭 **System Overview**\n[generation failed] image: "));
        assert!(stub.calls().is_empty());
    }

    #[tokio::test]
    async fn test_generation_failure_degrades_and_custom_instruction() {
        let stub = StubProvider::failing("vision model offline");
        let agent = VisionAgent::new(TextGenerator::new(stub.shared(), Duration::from_secs(1)))
            .with_instruction("List the components.");

        let reply = agent.run(PNG.to_vec(), &draft()).await;

        assert!(reply.content().contains("[generation failed] stub: "));
        assert_eq!(stub.calls()[0].prompt, "List the components.");
    }

    #[test]
    fn test_missing_diagram_is_fatal() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(matches!(
            read_diagram(&dir.path().join("arch.png")),
            Err(CraftError::Image(_))
        ));
    }
}
