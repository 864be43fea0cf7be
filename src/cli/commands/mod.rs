pub mod analyze;
pub mod config;
pub mod export;
pub mod generate;
pub mod publish;
pub mod revise;
pub mod show;
