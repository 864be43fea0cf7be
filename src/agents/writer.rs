//! Writer Agent
//!
//! Turns a repository summary into a README draft. The prompt is a pure
//! function of the summary text and the writer configuration: selected
//! sections, template tone, and appendices switched on by the signals the
//! summary carries.

use tracing::{debug, info};

use super::check_kind;
use crate::ai::{PromptBuilder, TextGenerator};
use crate::config::{Section, Template, WriterConfig};
use crate::constants::agents::{VISION, WRITER};
use crate::constants::summary;
use crate::types::{Message, MessageKind};

// =============================================================================
// Summary Signals
// =============================================================================

/// Features detected in a summary that trigger prompt appendices
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummarySignals {
    pub endpoints: bool,
    pub ci: bool,
    pub docker: bool,
    pub tests: bool,
}

impl SummarySignals {
    /// Read signals from summary text by label; a missing label means absent.
    pub fn parse(summary_text: &str) -> Self {
        let mut signals = Self::default();
        for line in summary_text.lines() {
            let line = line.trim();
            if let Some(value) = field(line, summary::API_ENDPOINTS) {
                signals.endpoints = is_present(value);
            } else if let Some(value) = field(line, summary::CI_CD) {
                signals.ci = is_present(value);
            } else if let Some(value) = field(line, summary::DOCKER) {
                signals.docker = value.eq_ignore_ascii_case("yes");
            } else if let Some(value) = field(line, summary::TEST_FILES) {
                signals.tests = is_present(value);
            }
        }
        signals
    }
}

fn field<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    line.strip_prefix(label).map(str::trim)
}

fn is_present(value: &str) -> bool {
    !value.is_empty() && value != summary::NONE_FOUND
}

// =============================================================================
// Prompt
// =============================================================================

fn section_guidance(section: Section) -> &'static str {
    match section {
        Section::Installation => {
            "Installation: step-by-step setup instructions, including how to install the dependencies."
        }
        Section::Usage => {
            "Usage: examples and code snippets showing how to run the project and call its main features."
        }
        Section::Contributing => {
            "Contributing: clear guidelines for contributors, from forking to opening a pull request."
        }
        Section::License => "License: the project's license information.",
        Section::Faq => "FAQ: short answers to the questions new users are most likely to ask.",
        Section::Troubleshooting => {
            "Troubleshooting: common problems and how to resolve them."
        }
        Section::Security => {
            "Security: how to report vulnerabilities and any security considerations for deployments."
        }
    }
}

fn template_instruction(template: Template) -> &'static str {
    match template {
        Template::Basic => "Keep the layout simple but informative.",
        Template::Detailed => "Use emojis, badges, and clear Markdown headings for a rich, detailed layout.",
        Template::Creative => "Use a unique, visually striking layout that stands out from generic READMEs.",
    }
}

/// Build the generation prompt for a summary.
///
/// Only the configured sections are named; nothing about an unselected
/// section reaches the prompt.
pub fn build_prompt(summary_text: &str, options: &WriterConfig) -> String {
    let signals = SummarySignals::parse(summary_text);

    let mut instructions: Vec<String> = vec![
        "Use all available metadata (structure, languages, dependencies, CI/CD, Docker, badges, API endpoints, test files) to infer the project's purpose and features.".to_string(),
        "Start with a clear, catchy project title, relevant badges, and an engaging description of what the project does and why it is useful. Add a table of contents if the README is long.".to_string(),
    ];

    if options.sections.is_empty() {
        instructions.push(
            "Do not add optional sections beyond the title, badges and description.".to_string(),
        );
    } else {
        let names: Vec<&str> = options.sections.iter().map(Section::title).collect();
        instructions.push(format!(
            "Include these sections, in this order: {}.",
            names.join(", ")
        ));
    }

    instructions.push(template_instruction(options.template).to_string());

    if signals.endpoints {
        instructions.push(
            "API endpoints were detected: add an API Reference section listing each endpoint with an example request."
                .to_string(),
        );
    }
    if signals.docker {
        instructions.push(
            "Container configuration is present: add a Docker section explaining how to build and run the container."
                .to_string(),
        );
    }
    if signals.ci {
        instructions.push(
            "CI/CD configuration is present: mention the workflow and what it checks.".to_string(),
        );
    }
    if signals.tests {
        instructions.push(
            "Test files were detected: add a Testing section with instructions for running the tests."
                .to_string(),
        );
    }

    instructions.push(
        "Follow Markdown best practices for formatting, accessibility, and readability.".to_string(),
    );

    PromptBuilder::new()
        .role(
            "You are an expert open-source documentation writer. Generate a project-specific, well-structured README.md for a GitHub repository, using the following repository analysis:",
        )
        .text(summary_text.trim())
        .bullets(
            "Section guidance",
            options.sections.iter().map(|s| section_guidance(*s)),
        )
        .instructions(instructions)
        .build()
}

// =============================================================================
// Agent
// =============================================================================

pub struct WriterAgent {
    generator: TextGenerator,
    options: WriterConfig,
}

impl WriterAgent {
    pub fn new(generator: TextGenerator, options: WriterConfig) -> Self {
        Self { generator, options }
    }

    pub fn options(&self) -> &WriterConfig {
        &self.options
    }

    /// Produce a `draft-document` from a `repository-summary`.
    ///
    /// The generated text is carried verbatim, failure marker included.
    pub async fn run(&self, incoming: &Message) -> Message {
        if let Some(rejection) = check_kind(WRITER, incoming, &[MessageKind::RepositorySummary]) {
            return rejection;
        }

        let prompt = build_prompt(incoming.content(), &self.options);
        debug!("Writer prompt: {} chars", prompt.len());
        info!(
            "Generating {} README with {} section(s)",
            self.options.template,
            self.options.sections.len()
        );

        let draft = self.generator.complete(&prompt).await;
        Message::new(WRITER, VISION, MessageKind::DraftDocument, draft)
    }
}
