pub mod commands;
pub mod ui;
pub mod util;

pub use ui::Output;
pub use util::{CommandContext, ConfigOverrides, require_success, runtime};
