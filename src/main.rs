// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ddnsgate::{
    api,
    config::{GatewayArgs, GatewayConfig},
    constants::{DEFAULT_LISTEN_ADDR, TOKIO_THREAD_NAME, TOKIO_WORKER_THREADS},
    tsig::{KeyAlgorithm, SigningKey},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "ddnsgate", version)]
#[command(about = "Signed dynamic DNS update gateway (RFC 2136 + TSIG)")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve {
        #[command(flatten)]
        gateway: GatewayArgs,

        /// Address the HTTP API listens on
        #[arg(long, env = "DDNS_LISTEN", default_value = DEFAULT_LISTEN_ADDR)]
        listen: SocketAddr,
    },

    /// Add one record and exit
    Add {
        #[command(flatten)]
        gateway: GatewayArgs,

        #[command(flatten)]
        record: RecordArgs,

        /// TTL in seconds (defaults to the configured default TTL)
        #[arg(long, allow_negative_numbers = true)]
        ttl: Option<i64>,
    },

    /// Delete one record and exit
    Delete {
        #[command(flatten)]
        gateway: GatewayArgs,

        #[command(flatten)]
        record: RecordArgs,
    },

    /// Print the update transaction without sending it
    Render {
        #[command(flatten)]
        gateway: GatewayArgs,

        #[command(flatten)]
        record: RecordArgs,

        /// TTL in seconds (defaults to the configured default TTL)
        #[arg(long, allow_negative_numbers = true)]
        ttl: Option<i64>,

        /// Render a delete instead of an add
        #[arg(long)]
        delete: bool,
    },

    /// Generate a TSIG key in BIND key-file format
    Keygen {
        /// Key name
        name: String,

        /// HMAC algorithm
        #[arg(long, default_value_t = KeyAlgorithm::HmacSha256)]
        algorithm: KeyAlgorithm,
    },
}

#[derive(Debug, clap::Args)]
struct RecordArgs {
    /// Record name relative to the zone, or @ for the apex
    name: String,

    /// Record type (A, AAAA, CNAME, MX, NS, PTR, SRV, TXT)
    #[arg(value_name = "TYPE")]
    record_type: String,

    /// Record value
    value: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name(TOKIO_THREAD_NAME)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cli))
}

fn init_logging() {
    // Format: timestamp file:line LEVEL message
    //
    // Respects RUST_LOG environment variable if set, otherwise defaults to INFO level
    // Example: RUST_LOG=debug ddnsgate serve
    //
    // Respects RUST_LOG_FORMAT environment variable for output format
    // Example: RUST_LOG_FORMAT=json ddnsgate serve
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_writer(std::io::stderr)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

async fn async_main(cli: Cli) -> Result<()> {
    init_logging();

    match cli.command {
        Command::Serve { gateway, listen } => {
            let config = GatewayConfig::from_args(&gateway)?;
            info!(
                "Starting ddnsgate v{} for zone {} via {}:{} ({})",
                env!("CARGO_PKG_VERSION"),
                config.builder().zone(),
                gateway.server,
                gateway.port,
                config.protocol()
            );
            let service = Arc::new(config.into_service()?);
            api::serve(listen, service).await
        }
        Command::Add {
            gateway,
            record,
            ttl,
        } => {
            let service = GatewayConfig::from_args(&gateway)?.into_service()?;
            let ack = service
                .add_record_with_ttl(&record.name, &record.record_type, &record.value, ttl)
                .await
                .context("Failed to add record")?;
            println!(
                "Record added (server {}, message id {}, {}ms)",
                ack.server,
                ack.message_id,
                ack.elapsed.as_millis()
            );
            Ok(())
        }
        Command::Delete { gateway, record } => {
            let service = GatewayConfig::from_args(&gateway)?.into_service()?;
            let ack = service
                .delete_record(&record.name, &record.record_type, &record.value)
                .await
                .context("Failed to delete record")?;
            println!(
                "Record deleted (server {}, message id {}, {}ms)",
                ack.server,
                ack.message_id,
                ack.elapsed.as_millis()
            );
            Ok(())
        }
        Command::Render {
            gateway,
            record,
            ttl,
            delete,
        } => {
            let config = GatewayConfig::from_args(&gateway)?;
            let builder = config.builder();
            let transaction = if delete {
                builder.build_delete(&record.name, &record.record_type, &record.value)?
            } else {
                builder.build(&record.name, &record.record_type, &record.value, ttl)?
            };
            print!("{}", transaction.render());
            Ok(())
        }
        Command::Keygen { name, algorithm } => {
            let key = SigningKey::generate(&name, algorithm).context("Failed to generate key")?;
            print!("{}", key.to_key_file());
            Ok(())
        }
    }
}

#[cfg(test)]
mod main_tests;
