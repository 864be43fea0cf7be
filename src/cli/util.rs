//! CLI Common Utilities
//!
//! Shared configuration and session handling for command handlers.

use std::path::PathBuf;

use tokio::runtime::Runtime;

use crate::config::{Config, ConfigLoader, Section, Template};
use crate::pipeline::Pipeline;
use crate::session::Session;
use crate::types::{CraftError, Message, Result};

/// Command-line overrides applied on top of the loaded configuration
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub template: Option<Template>,
    /// Replaces the configured sections when non-empty
    pub sections: Vec<Section>,
    pub export_dir: Option<PathBuf>,
    pub export_filename: Option<String>,
    pub branch: Option<String>,
    pub path: Option<String>,
    pub commit_message: Option<String>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut Config) -> Result<()> {
        if let Some(provider) = &self.provider {
            config.llm.provider = provider.clone();
        }
        if let Some(model) = &self.model {
            config.llm.model = model.clone();
        }
        if let Some(template) = self.template {
            config.writer.template = template;
        }
        if !self.sections.is_empty() {
            config.writer.sections = self.sections.clone();
        }
        if let Some(dir) = &self.export_dir {
            config.export.dir = dir.clone();
        }
        if let Some(filename) = &self.export_filename {
            config.export.filename = filename.clone();
        }
        if let Some(branch) = &self.branch {
            config.publish.branch = branch.clone();
        }
        if let Some(path) = &self.path {
            config.publish.path = path.clone();
        }
        if let Some(message) = &self.commit_message {
            config.publish.commit_message = message.clone();
        }
        config.validate()
    }
}

/// Command execution context
pub struct CommandContext {
    /// Effective configuration (files, env, then overrides)
    pub config: Config,
    /// Where the current session is kept
    pub session_path: PathBuf,
}

impl CommandContext {
    pub fn load(overrides: &ConfigOverrides) -> Result<Self> {
        let mut config = ConfigLoader::load()?;
        overrides.apply(&mut config)?;
        Ok(Self {
            config,
            session_path: ConfigLoader::session_path(),
        })
    }

    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new(self.config.clone())
    }

    pub fn load_session(&self) -> Result<Session> {
        Session::load(&self.session_path)
    }

    pub fn save_session(&self, session: &Session) -> Result<()> {
        session.save(&self.session_path)
    }
}

/// Runtime for the async pipeline steps
pub fn runtime() -> Result<Runtime> {
    Ok(Runtime::new()?)
}

/// Turn an `error` envelope into a failure naming the step
pub fn require_success(message: &Message) -> Result<()> {
    if message.is_error() {
        return Err(CraftError::step_failed(message.sender(), message.content()));
    }
    Ok(())
}

// Loading is not tested here: it reads the working directory, which tests
// running in parallel would race on.
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MessageKind;

    #[test]
    fn test_overrides_apply_and_validate() {
        let mut config = Config::default();
        let overrides = ConfigOverrides {
            model: Some("gpt-4o".to_string()),
            template: Some(Template::Creative),
            sections: vec![Section::License],
            branch: Some("docs".to_string()),
            ..ConfigOverrides::default()
        };
        overrides.apply(&mut config).unwrap();

        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.writer.template, Template::Creative);
        assert_eq!(config.writer.sections, vec![Section::License]);
        assert_eq!(config.publish.branch, "docs");

        let invalid = ConfigOverrides {
            export_filename: Some("../README.md".to_string()),
            ..ConfigOverrides::default()
        };
        assert!(invalid.apply(&mut config).is_err());
    }

    #[test]
    fn test_empty_sections_keep_configured() {
        let mut config = Config::default();
        let configured = config.writer.sections.clone();
        ConfigOverrides::default().apply(&mut config).unwrap();
        assert_eq!(config.writer.sections, configured);
    }

    #[test]
    fn test_require_success() {
        let ok = Message::new("ExportAgent", "CLI", MessageKind::ExportConfirmation, "saved");
        assert!(require_success(&ok).is_ok());

        let refused = Message::error("ExportAgent", "CLI", "wrong kind");
        let err = require_success(&refused).unwrap_err();
        assert_eq!(err.to_string(), "ExportAgent failed: wrong kind");
    }
}
