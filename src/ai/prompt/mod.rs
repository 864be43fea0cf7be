//! Prompt Builder System
//!
//! Standardized prompt construction for the README agents.
//! Every section renders deterministically in insertion order so that
//! identical inputs always produce identical prompts.

/// Prompt section types
#[derive(Debug, Clone)]
pub enum PromptSection {
    /// Role definition with the task the model performs
    Role(String),
    /// Numbered instructions
    Instructions(Vec<String>),
    /// Raw text with an optional bold header
    Text {
        header: Option<String>,
        content: String,
    },
    /// Bullet list with a header
    Bullets { header: String, items: Vec<String> },
}

/// Prompt builder for consistent prompt construction
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    sections: Vec<PromptSection>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn role(mut self, role: &str) -> Self {
        self.sections.push(PromptSection::Role(role.to_string()));
        self
    }

    pub fn instructions<I, S>(mut self, instructions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sections.push(PromptSection::Instructions(
            instructions.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Add text section
    pub fn text(mut self, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: None,
            content: content.to_string(),
        });
        self
    }

    /// Add text section with header
    pub fn section(mut self, header: &str, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: Some(header.to_string()),
            content: content.to_string(),
        });
        self
    }

    /// Add a bullet list, skipped entirely when `items` is empty
    pub fn bullets<I, S>(mut self, header: &str, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items: Vec<String> = items.into_iter().map(Into::into).collect();
        if !items.is_empty() {
            self.sections.push(PromptSection::Bullets {
                header: header.to_string(),
                items,
            });
        }
        self
    }

    /// Build the final prompt string
    pub fn build(self) -> String {
        let mut prompt = String::new();

        for section in self.sections {
            match section {
                PromptSection::Role(role) => {
                    prompt.push_str(&role);
                    prompt.push_str("\n\n");
                }
                PromptSection::Instructions(instructions) => {
                    prompt.push_str("**Instructions:**\n");
                    for (i, instruction) in instructions.iter().enumerate() {
                        prompt.push_str(&format!("{}. {}\n", i + 1, instruction));
                    }
                    prompt.push('\n');
                }
                PromptSection::Text { header, content } => {
                    if let Some(h) = header {
                        prompt.push_str(&format!("**{}:**\n", h));
                    }
                    prompt.push_str(&content);
                    prompt.push_str("\n\n");
                }
                PromptSection::Bullets { header, items } => {
                    prompt.push_str(&format!("**{}:**\n", header));
                    for item in items {
                        prompt.push_str(&format!("* {}\n", item));
                    }
                    prompt.push('\n');
                }
            }
        }

        prompt.trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_prompt() {
        let prompt = PromptBuilder::new()
            .role("You are a documentation editor.")
            .instructions(["Read the draft", "Apply the feedback"])
            .build();

        assert!(prompt.starts_with("You are a documentation editor."));
        assert!(prompt.contains("**Instructions:**"));
        assert!(prompt.contains("1. Read the draft"));
        assert!(prompt.contains("2. Apply the feedback"));
    }

    #[test]
    fn test_sections_keep_insertion_order() {
        let prompt = PromptBuilder::new()
            .section("Original README", "# Title")
            .section("User Feedback", "shorter intro")
            .build();

        let original = prompt.find("# Title").unwrap();
        let feedback = prompt.find("shorter intro").unwrap();
        assert!(original < feedback);
    }

    #[test]
    fn test_empty_bullets_are_skipped() {
        let prompt = PromptBuilder::new()
            .text("body")
            .bullets("Sections", Vec::<String>::new())
            .build();
        assert_eq!(prompt, "body");

        let prompt = PromptBuilder::new().bullets("Sections", ["Usage"]).build();
        assert_eq!(prompt, "**Sections:**\n* Usage");
    }
}
