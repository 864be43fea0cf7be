//! Revise Command
//!
//! One more feedback round on the saved session.
//!
//! Usage:
//!   readmecraft revise --feedback TEXT

use crate::cli::Output;
use crate::cli::util::{CommandContext, ConfigOverrides, require_success, runtime};
use crate::types::Result;

pub fn run(feedback: &str, overrides: &ConfigOverrides) -> Result<()> {
    let ctx = CommandContext::load(overrides)?;
    let mut session = ctx.load_session()?;
    let output = Output::new();

    let result = runtime()?.block_on(ctx.pipeline().revise(&mut session, feedback));
    ctx.save_session(&session)?;
    let revised = result?;
    require_success(&revised)?;

    output.section("Revised README");
    output.document(revised.content());
    Ok(())
}
