//! Publish Command
//!
//! Usage:
//!   readmecraft publish <repo> [--branch B] [--path P] [--message M]

use crate::agents::PublishAgent;
use crate::cli::Output;
use crate::cli::util::{CommandContext, ConfigOverrides, require_success, runtime};
use crate::constants::agents::PUBLISHER;
use crate::types::{CraftError, Result};

pub fn run(repository: &str, overrides: &ConfigOverrides) -> Result<()> {
    let ctx = CommandContext::load(overrides)?;
    let mut session = ctx.load_session()?;

    let result = runtime()?.block_on(ctx.pipeline().publish(&mut session, repository));
    ctx.save_session(&session)?;
    let status = result?;
    require_success(&status)?;

    if !PublishAgent::is_success(status.content()) {
        return Err(CraftError::step_failed(PUBLISHER, status.content()));
    }
    Output::new().success(status.content());
    Ok(())
}
