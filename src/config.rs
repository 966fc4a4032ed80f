// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Process configuration.
//!
//! Every option can be given as a command-line flag or through a `DDNS_*`
//! environment variable. [`GatewayArgs`] is the raw form parsed by `clap`;
//! [`GatewayConfig`] is the validated, immutable form the rest of the crate
//! works with.

use crate::constants::{DEFAULT_RECORD_TTL_SECS, DEFAULT_UPDATE_TIMEOUT_SECS, DNS_PORT};
use crate::dns_errors::{KeyError, ValidationError};
use crate::service::RecordService;
use crate::transaction::UpdateTransactionBuilder;
use crate::transport::{HickoryTransport, Protocol};
use crate::tsig::SigningKey;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Connection and record defaults shared by every subcommand.
#[derive(Debug, Clone, clap::Args)]
pub struct GatewayArgs {
    /// Authoritative DNS server (host name or IP address)
    #[arg(long, env = "DDNS_SERVER")]
    pub server: String,

    /// Port of the DNS server
    #[arg(long, env = "DDNS_PORT", default_value_t = DNS_PORT)]
    pub port: u16,

    /// Zone that receives the updates (e.g. example.test)
    #[arg(long, env = "DDNS_ZONE")]
    pub zone: String,

    /// BIND key file holding the TSIG key
    #[arg(long, env = "DDNS_KEY_FILE", value_name = "FILE")]
    pub key_file: Option<PathBuf>,

    /// TTL applied when a request does not carry one
    #[arg(long, env = "DDNS_DEFAULT_TTL", default_value_t = DEFAULT_RECORD_TTL_SECS)]
    pub default_ttl: u32,

    /// Seconds to wait for the server to acknowledge an update
    #[arg(long, env = "DDNS_TIMEOUT_SECS", default_value_t = DEFAULT_UPDATE_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Transport protocol for updates
    #[arg(long, env = "DDNS_PROTOCOL", value_enum, default_value_t = Protocol::Udp)]
    pub protocol: Protocol,
}

/// Errors raised while turning arguments into a usable configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Server, zone or default TTL is invalid
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ValidationError),

    /// Timeout of zero seconds
    #[error("Invalid configuration: timeout must be at least 1 second")]
    ZeroTimeout,

    /// A command that submits updates was started without a key file
    #[error("No signing key configured: set --key-file or DDNS_KEY_FILE")]
    MissingKeyFile,

    /// The key file could not be loaded
    #[error(transparent)]
    Key(#[from] KeyError),
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    builder: UpdateTransactionBuilder,
    key_file: Option<PathBuf>,
    timeout: Duration,
    protocol: Protocol,
}

impl GatewayConfig {
    /// Validate `args`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a bad server, zone or TTL, and
    /// [`ConfigError::ZeroTimeout`] for a zero timeout.
    pub fn from_args(args: &GatewayArgs) -> Result<Self, ConfigError> {
        if args.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        let builder =
            UpdateTransactionBuilder::new(&args.server, args.port, &args.zone, args.default_ttl)?;

        Ok(Self {
            builder,
            key_file: args.key_file.clone(),
            timeout: Duration::from_secs(args.timeout_secs),
            protocol: args.protocol,
        })
    }

    /// Builder for the configured server, zone and default TTL.
    #[must_use]
    pub fn builder(&self) -> &UpdateTransactionBuilder {
        &self.builder
    }

    /// Path of the key file, if one was configured.
    #[must_use]
    pub fn key_file(&self) -> Option<&Path> {
        self.key_file.as_deref()
    }

    /// Per-update timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Transport protocol.
    #[must_use]
    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Load the signing key from the configured key file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingKeyFile`] if no file is configured, or
    /// [`ConfigError::Key`] if it cannot be loaded.
    pub fn load_key(&self) -> Result<SigningKey, ConfigError> {
        let path = self.key_file().ok_or(ConfigError::MissingKeyFile)?;
        Ok(SigningKey::from_key_file(path)?)
    }

    /// Load the key and assemble the record service.
    ///
    /// # Errors
    ///
    /// Same as [`GatewayConfig::load_key`].
    pub fn into_service(self) -> Result<RecordService<HickoryTransport>, ConfigError> {
        let key = self.load_key()?;
        Ok(RecordService::new(
            self.builder,
            Arc::new(key),
            HickoryTransport::new(self.protocol),
            self.timeout,
        ))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
