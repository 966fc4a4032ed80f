// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The record update boundary.
//!
//! [`RecordService`] is what the HTTP adapter and the CLI call. It validates
//! caller input with the [`UpdateTransactionBuilder`], hands the resulting
//! transaction to an [`UpdateTransport`] together with the process-wide signing
//! key, and records the outcome in [`crate::metrics`].
//!
//! # Example
//!
//! ```rust,no_run
//! use ddnsgate::service::RecordService;
//! use ddnsgate::transaction::UpdateTransactionBuilder;
//! use ddnsgate::transport::{HickoryTransport, Protocol};
//! use ddnsgate::tsig::SigningKey;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let builder = UpdateTransactionBuilder::new("10.0.0.2", 53, "example.test", 60)?;
//! let key = SigningKey::from_key_file(std::path::Path::new("/etc/ddns/update.key"))?;
//! let service = RecordService::new(
//!     builder,
//!     Arc::new(key),
//!     HickoryTransport::new(Protocol::Udp),
//!     Duration::from_secs(5),
//! );
//!
//! let ack = service.add_record("www", "A", "10.0.0.5").await?;
//! println!("acknowledged as message {}", ack.message_id);
//! # Ok(())
//! # }
//! ```

use crate::dns_errors::{DdnsError, ValidationError};
use crate::metrics;
use crate::transaction::{UpdateTransaction, UpdateTransactionBuilder};
use crate::transport::{Ack, HickoryTransport, SubmitState, UpdateTransport};
use crate::tsig::SigningKey;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Validates and submits record updates against one zone on one server.
///
/// The service holds no mutable state; concurrent calls are independent.
#[derive(Debug, Clone)]
pub struct RecordService<T = HickoryTransport> {
    builder: UpdateTransactionBuilder,
    key: Arc<SigningKey>,
    transport: T,
    timeout: Duration,
}

impl<T: UpdateTransport> RecordService<T> {
    /// Create a service from its collaborators.
    pub fn new(
        builder: UpdateTransactionBuilder,
        key: Arc<SigningKey>,
        transport: T,
        timeout: Duration,
    ) -> Self {
        Self {
            builder,
            key,
            transport,
            timeout,
        }
    }

    /// The builder used to validate input.
    pub fn builder(&self) -> &UpdateTransactionBuilder {
        &self.builder
    }

    /// Per-update timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Add a record using the configured default TTL.
    ///
    /// # Errors
    ///
    /// Returns [`DdnsError::Validation`] if the input is rejected,
    /// [`DdnsError::Key`] if the signing key is unusable, or
    /// [`DdnsError::Transport`] if the update was not acknowledged.
    pub async fn add_record(
        &self,
        name: &str,
        record_type: &str,
        value: &str,
    ) -> Result<Ack, DdnsError> {
        self.add_record_with_ttl(name, record_type, value, None)
            .await
    }

    /// Add a record with an explicit TTL, or the default when `ttl` is `None`.
    ///
    /// # Errors
    ///
    /// Same as [`RecordService::add_record`].
    pub async fn add_record_with_ttl(
        &self,
        name: &str,
        record_type: &str,
        value: &str,
        ttl: Option<i64>,
    ) -> Result<Ack, DdnsError> {
        let transaction = self.prepare_add(name, record_type, value, ttl)?;
        self.apply(&transaction).await
    }

    /// Delete the record matching name, type and value.
    ///
    /// # Errors
    ///
    /// Same as [`RecordService::add_record`].
    pub async fn delete_record(
        &self,
        name: &str,
        record_type: &str,
        value: &str,
    ) -> Result<Ack, DdnsError> {
        let transaction = self.prepare_delete(name, record_type, value)?;
        self.apply(&transaction).await
    }

    /// Validate an add without submitting it.
    ///
    /// # Errors
    ///
    /// Returns the [`ValidationError`] raised by the builder.
    pub fn prepare_add(
        &self,
        name: &str,
        record_type: &str,
        value: &str,
        ttl: Option<i64>,
    ) -> Result<UpdateTransaction, ValidationError> {
        self.builder
            .build(name, record_type, value, ttl)
            .inspect_err(Self::note_rejected)
    }

    /// Validate a delete without submitting it.
    ///
    /// # Errors
    ///
    /// Returns the [`ValidationError`] raised by the builder.
    pub fn prepare_delete(
        &self,
        name: &str,
        record_type: &str,
        value: &str,
    ) -> Result<UpdateTransaction, ValidationError> {
        self.builder
            .build_delete(name, record_type, value)
            .inspect_err(Self::note_rejected)
    }

    /// Submit a validated transaction and record its outcome.
    ///
    /// # Errors
    ///
    /// Returns [`DdnsError::Key`] if the signing key cannot produce a signer,
    /// and [`DdnsError::Transport`] if the update was not acknowledged.
    pub async fn apply(&self, transaction: &UpdateTransaction) -> Result<Ack, DdnsError> {
        // Nothing is sent with a key that cannot sign
        if let Err(e) = self.key.signer() {
            warn!("Signing key '{}' is unusable: {}", self.key.name, e);
            return Err(DdnsError::Key(e));
        }

        let started = Instant::now();
        let result = self
            .transport
            .submit(transaction, &self.key, &transaction.endpoint(), self.timeout)
            .await;

        metrics::record_update(
            transaction.operation().as_str(),
            transaction.record_type().as_str(),
            SubmitState::of(&result).as_str(),
            started.elapsed(),
        );
        result.map_err(DdnsError::from)
    }

    fn note_rejected(error: &ValidationError) {
        debug!("Rejected update input: {}", error);
        metrics::record_validation_failure(error.reason());
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod service_tests;
