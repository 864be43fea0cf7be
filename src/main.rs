use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use readmecraft::cli::commands::generate::GenerateArgs;
use readmecraft::cli::{ConfigOverrides, Output};
use readmecraft::{Section, Template};

/// Parse README template from string
fn parse_template(s: &str) -> Result<Template, String> {
    s.parse()
}

/// Parse README section from string
fn parse_section(s: &str) -> Result<Section, String> {
    s.parse()
}

#[derive(Parser)]
#[command(name = "readmecraft")]
#[command(
    version,
    about = "Multi-agent README generator for code repositories"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(clap::Args)]
struct LlmArgs {
    #[arg(long, help = "LLM provider (gemini, openai, ollama)")]
    provider: Option<String>,
    #[arg(long, help = "Model to use")]
    model: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the repository summary for a local directory or git URL
    Analyze {
        #[arg(help = "Local directory or git URL")]
        source: String,
    },

    /// Generate a README through the full agent pipeline
    Generate {
        #[arg(help = "Local directory or git URL")]
        source: String,
        #[arg(long, short, value_parser = parse_template, help = "Template: basic, detailed, creative")]
        template: Option<Template>,
        #[arg(
            long = "section",
            short,
            value_parser = parse_section,
            help = "Section to include (repeatable): installation, usage, contributing, license, faq, troubleshooting, security"
        )]
        sections: Vec<Section>,
        #[arg(long, help = "Architecture diagram (PNG, JPEG, GIF, WebP)")]
        diagram: Option<PathBuf>,
        #[arg(long, help = "Feedback round to apply (repeatable, in order)")]
        feedback: Vec<String>,
        #[arg(long, help = "Export the result to the configured directory")]
        export: bool,
        #[arg(long, value_name = "REPO", help = "Publish the result to owner/name or a GitHub URL")]
        publish: Option<String>,
        #[command(flatten)]
        llm: LlmArgs,
    },

    /// Apply one more feedback round to the saved session
    Revise {
        #[arg(long, short, help = "Feedback text")]
        feedback: String,
        #[command(flatten)]
        llm: LlmArgs,
    },

    /// Export the saved session's document
    Export {
        #[arg(long, help = "Export directory")]
        dir: Option<PathBuf>,
        #[arg(long, help = "File name inside the export directory")]
        filename: Option<String>,
    },

    /// Publish the saved session's document
    Publish {
        #[arg(help = "Target repository: owner/name or a GitHub URL")]
        repository: String,
        #[arg(long, help = "Branch to commit to")]
        branch: Option<String>,
        #[arg(long, help = "File path inside the repository")]
        path: Option<String>,
        #[arg(long, short, help = "Commit message")]
        message: Option<String>,
    },

    /// Show the saved session's latest document
    Show {
        #[arg(long, help = "Print the envelope history as JSON")]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json, yaml"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Initialize configuration
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

impl LlmArgs {
    fn into_overrides(self) -> ConfigOverrides {
        ConfigOverrides {
            provider: self.provider,
            model: self.model,
            ..ConfigOverrides::default()
        }
    }
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mreadmecraft encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Call default hook for backtrace (if RUST_BACKTRACE=1)
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            Output::new().error(&format!("Error: {}", e));
            if let Some(craft) = e.downcast_ref::<readmecraft::CraftError>()
                && craft.is_recoverable()
            {
                eprintln!("  The failure looks temporary; running the command again may succeed.");
            }
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Analyze { source } => {
            readmecraft::cli::commands::analyze::run(&source)?;
        }
        Commands::Generate {
            source,
            template,
            sections,
            diagram,
            feedback,
            export,
            publish,
            llm,
        } => {
            let overrides = ConfigOverrides {
                template,
                sections,
                ..llm.into_overrides()
            };
            readmecraft::cli::commands::generate::run(GenerateArgs {
                source,
                diagram,
                feedback,
                export,
                publish,
                overrides,
            })?;
        }
        Commands::Revise { feedback, llm } => {
            readmecraft::cli::commands::revise::run(&feedback, &llm.into_overrides())?;
        }
        Commands::Export { dir, filename } => {
            readmecraft::cli::commands::export::run(&ConfigOverrides {
                export_dir: dir,
                export_filename: filename,
                ..ConfigOverrides::default()
            })?;
        }
        Commands::Publish {
            repository,
            branch,
            path,
            message,
        } => {
            readmecraft::cli::commands::publish::run(
                &repository,
                &ConfigOverrides {
                    branch,
                    path,
                    commit_message: message,
                    ..ConfigOverrides::default()
                },
            )?;
        }
        Commands::Show { json } => {
            readmecraft::cli::commands::show::run(json)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => {
                readmecraft::cli::commands::config::show(&format)?;
            }
            ConfigAction::Path => {
                readmecraft::cli::commands::config::path()?;
            }
            ConfigAction::Init { global, force } => {
                if global {
                    readmecraft::cli::commands::config::init_global(force)?;
                } else {
                    readmecraft::cli::commands::config::init_project(force)?;
                }
            }
        },
    }

    Ok(())
}
