//! Cart CLI - Command line tool for a persisted storefront cart.
//!
//! Every invocation opens the cart from storage the way a page load would,
//! applies at most one batch of actions, and writes the result back.
//!
//! Commands:
//! - `cart add` - Add one unit of a product
//! - `cart remove` - Remove one unit of a product
//! - `cart delete` - Remove a product line entirely
//! - `cart dispatch` - Apply UI actions given as JSON
//! - `cart show` - Print the cart
//! - `cart config` - Manage configuration

mod commands;
mod config;
mod context;
mod logging;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{AddArgs, ConfigArgs, DispatchArgs, ItemArgs};

/// Cart CLI - Inspect and drive a persisted storefront cart
#[derive(Parser)]
#[command(name = "cart")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add one unit of a product
    Add(AddArgs),

    /// Remove one unit of a product
    Remove(ItemArgs),

    /// Remove a product line with all its units
    Delete(ItemArgs),

    /// Apply cart actions given as JSON
    Dispatch(DispatchArgs),

    /// Show the cart
    Show,

    /// Manage configuration
    Config(ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    // Load config
    let config_path = cli.config.as_deref();
    let ctx = match context::Context::load(config_path, output.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            output.error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    logging::init(&ctx.config.logging, cli.verbose);

    // Execute command
    let result = match cli.command {
        Commands::Add(args) => commands::items::add(args, &ctx),
        Commands::Remove(args) => commands::items::remove(args, &ctx),
        Commands::Delete(args) => commands::items::delete(args, &ctx),
        Commands::Dispatch(args) => commands::items::dispatch(args, &ctx),
        Commands::Show => commands::show::run(&ctx),
        Commands::Config(args) => commands::config::run(args, &ctx),
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
