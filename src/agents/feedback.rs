//! Feedback Agent
//!
//! Applies one round of free-text feedback to a draft. Output is not
//! deterministic across runs, so tests only check the prompt and the
//! envelope shape.

use tracing::info;

use super::check_kind;
use crate::ai::{PromptBuilder, TextGenerator};
use crate::constants::agents::{EXPORTER, FEEDBACK};
use crate::types::{Message, MessageKind};

/// Kinds the feedback step accepts
pub const ACCEPTED: [MessageKind; 2] = [MessageKind::DraftDocument, MessageKind::AnnotatedDraft];

/// Edit-instruction prompt embedding the draft and the feedback verbatim
pub fn build_prompt(original: &str, feedback: &str) -> String {
    PromptBuilder::new()
        .role("You are an AI README editor. Your task is to update the original README based on the user's feedback.")
        .section("Original README", original)
        .section("User Feedback", feedback)
        .instructions([
            "Analyze the user's feedback to understand the requested changes. The feedback may be a direct edit or a comment.",
            "Incorporate the feedback into the original README to improve its clarity, correctness, and usefulness.",
            "Maintain the original structure and formatting of the README as much as possible.",
            "Do not add any new information that is not present in the original README or the user's feedback.",
            "Output only the final, updated README.",
        ])
        .build()
}

pub struct FeedbackAgent {
    generator: TextGenerator,
}

impl FeedbackAgent {
    pub fn new(generator: TextGenerator) -> Self {
        Self { generator }
    }

    /// Produce a `final-document` from a draft and feedback text
    pub async fn run(&self, feedback: &str, previous: &Message) -> Message {
        if let Some(rejection) = check_kind(FEEDBACK, previous, &ACCEPTED) {
            return rejection;
        }

        info!("Applying {} chars of feedback", feedback.chars().count());
        let prompt = build_prompt(previous.content(), feedback);
        let revised = self.generator.complete(&prompt).await;

        Message::new(FEEDBACK, EXPORTER, MessageKind::FinalDocument, revised)
    }
}
