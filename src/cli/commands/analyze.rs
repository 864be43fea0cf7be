//! Analyze Command
//!
//! Print the repository summary the writer would receive.
//!
//! Usage:
//!   readmecraft analyze <source>

use crate::agents::AnalyzerAgent;
use crate::cli::util::{CommandContext, ConfigOverrides, runtime};
use crate::cli::Output;
use crate::types::Result;

pub fn run(source: &str) -> Result<()> {
    let ctx = CommandContext::load(&ConfigOverrides::default())?;
    let output = Output::new();

    let agent = AnalyzerAgent::new(ctx.config.analysis.clone());
    let summary = runtime()?.block_on(agent.run(source))?;

    output.header(&format!("Repository summary: {}", source));
    output.document(summary.content());
    Ok(())
}
