//! Show Command
//!
//! Print the latest document of the saved session, or its full envelope
//! history as a JSON array with `--json`.

use crate::cli::Output;
use crate::config::ConfigLoader;
use crate::session::Session;
use crate::types::{CraftError, Result};

pub fn run(json: bool) -> Result<()> {
    let session = Session::load(&ConfigLoader::session_path())?;
    let output = Output::new();

    if json {
        output.document(&serde_json::to_string_pretty(session.history())?);
        return Ok(());
    }

    let document = session
        .latest_document()
        .ok_or_else(|| CraftError::Session("session holds no README yet".into()))?;

    if let Some(source) = session.source() {
        output.info(&format!("Source: {}", source));
    }
    output.envelope(document);
    output.section("README");
    output.document(document.content());
    Ok(())
}
