//! CLI command implementations.

mod completions;
mod del;
mod init;
mod list;
mod reap;
mod show_data_dir;

pub use completions::CompletionsCommand;
pub use del::DelCommand;
pub use init::InitCommand;
pub use list::ListCommand;
pub use reap::ReapCommand;
pub use show_data_dir::ShowDataDirCommand;
