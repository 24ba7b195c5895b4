// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storefront - WhatsApp ordering and abandoned-order recovery.
//!
//! This is the binary entry point.

mod commands;
mod serve;
mod webhook;

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use crate::commands::AdminCommand;

/// Storefront - WhatsApp ordering and abandoned-order recovery.
#[derive(Parser, Debug)]
#[command(name = "storefront", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the webhook receiver and the recovery worker.
    Serve,
    /// Force an order to abandoned.
    Abandon { order_id: i64 },
    /// Mark an order completed and notify the customer.
    Complete { order_id: i64 },
    /// Send the recovery reminder for an order now.
    Remind { order_id: i64 },
    /// Text today's store summary to a phone number.
    Summary { phone: String },
    /// Create a backdated pending order for a customer.
    SimulateAbandon { customer_id: i64, amount: Decimal },
    /// Send a free-form text to a customer.
    Message {
        customer_id: i64,
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
}

impl Commands {
    fn into_admin(self) -> Option<AdminCommand> {
        Some(match self {
            Commands::Serve => return None,
            Commands::Abandon { order_id } => AdminCommand::Abandon { order_id },
            Commands::Complete { order_id } => AdminCommand::Complete { order_id },
            Commands::Remind { order_id } => AdminCommand::Remind { order_id },
            Commands::Summary { phone } => AdminCommand::Summary { phone },
            Commands::SimulateAbandon {
                customer_id,
                amount,
            } => AdminCommand::SimulateAbandon {
                customer_id,
                amount,
            },
            Commands::Message { customer_id, text } => AdminCommand::Message {
                customer_id,
                text: text.join(" "),
            },
        })
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => storefront_config::load_and_validate_path(path),
        None => storefront_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            storefront_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    serve::init_tracing(&config.agent.log_level);

    let Some(command) = cli.command else {
        println!("storefront: use --help for available commands");
        return;
    };

    let result = match command.into_admin() {
        None => serve::run_serve(config).await.map(|()| None),
        Some(admin) => commands::run_admin(config, admin).await.map(Some),
    };
    match result {
        Ok(Some(report)) => println!("{report}"),
        Ok(None) => {}
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}
