//! Generate Command
//!
//! Full pipeline: provider health check, analyze, write, optionally describe a diagram, apply
//! feedback rounds, then export and/or publish. The session is saved even
//! when a step fails so the run can be continued with `revise`.
//!
//! Usage:
//!   readmecraft generate <source> [--template T] [--section S]...
//!       [--diagram IMG] [--feedback TEXT]... [--export] [--publish REPO]

use std::path::PathBuf;

use tracing::info;

use crate::agents::PublishAgent;
use crate::ai::TextGenerator;
use crate::cli::Output;
use crate::cli::util::{CommandContext, ConfigOverrides, require_success, runtime};
use crate::constants::agents::PUBLISHER;
use crate::pipeline::GenerateOptions;
use crate::session::Session;
use crate::types::{CraftError, Result};

#[derive(Debug, Clone, Default)]
pub struct GenerateArgs {
    /// Local directory or git URL
    pub source: String,
    pub diagram: Option<PathBuf>,
    pub feedback: Vec<String>,
    pub export: bool,
    /// Repository to publish to
    pub publish: Option<String>,
    pub overrides: ConfigOverrides,
}

pub fn run(args: GenerateArgs) -> Result<()> {
    let ctx = CommandContext::load(&args.overrides)?;
    let pipeline = ctx.pipeline();
    let output = Output::new();
    let rt = runtime()?;

    info!(
        "Generating README for {} ({} template, provider {})",
        args.source, ctx.config.writer.template, ctx.config.llm.provider
    );

    let mut session = Session::new(&args.source);
    let options = GenerateOptions {
        diagram: args.diagram.as_deref(),
        feedback: args.feedback.clone(),
    };

    output.header(&format!("Generating README for {}", args.source));
    if !rt.block_on(pipeline.preflight())? {
        output.warning(&format!(
            "Provider '{}' did not pass its health check; generation may fail",
            ctx.config.llm.provider
        ));
    }
    let result = rt.block_on(pipeline.generate(&mut session, &options));
    ctx.save_session(&session)?;
    let latest = result?;

    output.section("Pipeline");
    for message in session.history() {
        output.envelope(message);
    }
    require_success(&latest)?;

    output.section("README");
    output.document(latest.content());
    if TextGenerator::is_failure(latest.content()) {
        output.warning("Generation failed; the document holds the failure text. Check the llm settings and run again.");
    }

    if args.export {
        let confirmation = pipeline.export(&mut session)?;
        ctx.save_session(&session)?;
        require_success(&confirmation)?;
        output.success(confirmation.content());
    }

    if let Some(repository) = &args.publish {
        let result = rt.block_on(pipeline.publish(&mut session, repository));
        ctx.save_session(&session)?;
        let status = result?;
        require_success(&status)?;
        if !PublishAgent::is_success(status.content()) {
            return Err(CraftError::step_failed(PUBLISHER, status.content()));
        }
        output.success(status.content());
    }

    output.info(&format!("Session saved to {}", ctx.session_path.display()));
    Ok(())
}
