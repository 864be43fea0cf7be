//! Export Command
//!
//! Usage:
//!   readmecraft export [--dir DIR] [--filename NAME]

use crate::cli::Output;
use crate::cli::util::{CommandContext, ConfigOverrides, require_success};
use crate::types::Result;

pub fn run(overrides: &ConfigOverrides) -> Result<()> {
    let ctx = CommandContext::load(overrides)?;
    let mut session = ctx.load_session()?;

    let result = ctx.pipeline().export(&mut session);
    ctx.save_session(&session)?;
    let confirmation = result?;
    require_success(&confirmation)?;

    Output::new().success(confirmation.content());
    Ok(())
}
