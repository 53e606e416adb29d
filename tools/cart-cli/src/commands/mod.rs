//! CLI command implementations.

pub mod config;
pub mod items;
pub mod show;

use clap::{Args, Subcommand};

/// Arguments for the add command.
#[derive(Args)]
pub struct AddArgs {
    /// Product id.
    pub id: String,

    /// Unit price (e.g. 19.99).
    #[arg(short, long)]
    pub price: String,

    /// Product title.
    #[arg(short, long, default_value = "")]
    pub title: String,

    /// Product image URL.
    #[arg(short, long, default_value = "")]
    pub image: String,
}

/// Arguments for commands addressing one product line.
#[derive(Args)]
pub struct ItemArgs {
    /// Product id.
    pub id: String,
}

/// Arguments for the dispatch command.
#[derive(Args)]
pub struct DispatchArgs {
    /// Action JSON, e.g. '{"type":"cart/removeItem","payload":1}'.
    /// Reads one action per line from stdin when omitted.
    pub action: Option<String>,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
}
