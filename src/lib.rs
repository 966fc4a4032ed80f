// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # ddnsgate - Signed Dynamic DNS Update Gateway
//!
//! ddnsgate adds and deletes DNS records on an authoritative server using
//! signed dynamic updates (RFC 2136 with TSIG, RFC 8945). It talks the DNS
//! protocol directly through `hickory-client`; no external `nsupdate` process
//! or shell is involved, so record input can never turn into commands.
//!
//! ## Overview
//!
//! An update flows through two stages:
//!
//! 1. [`transaction::UpdateTransactionBuilder`] validates name, type, value and
//!    TTL and produces an immutable [`transaction::UpdateTransaction`].
//! 2. An [`transport::UpdateTransport`] signs the transaction with a
//!    [`tsig::SigningKey`], sends it and waits for the acknowledgment.
//!
//! [`service::RecordService`] ties both stages together and is what the HTTP API
//! and the CLI call.
//!
//! ## Modules
//!
//! - [`record`] - Record types, name qualification and typed record data
//! - [`transaction`] - Update transactions, their builder and text form
//! - [`transport`] - Signed delivery of transactions and failure classification
//! - [`tsig`] - TSIG key files, key generation and signers
//! - [`service`] - The record update boundary
//! - [`api`] - HTTP adapter
//! - [`config`] - Command-line and environment configuration
//! - [`metrics`] - Prometheus metrics
//!
//! ## Example
//!
//! ```rust
//! use ddnsgate::transaction::UpdateTransactionBuilder;
//!
//! let builder = UpdateTransactionBuilder::new("10.0.0.2", 53, "example.test", 60).unwrap();
//! let transaction = builder.build("www", "A", "10.0.0.5", None).unwrap();
//!
//! assert_eq!(
//!     transaction.render(),
//!     "server 10.0.0.2 53\nzone example.test\nupdate add www.example.test. 60 A 10.0.0.5\nsend\n"
//! );
//! ```

pub mod api;
pub mod config;
pub mod constants;
pub mod dns_errors;
pub mod http_errors;
pub mod metrics;
pub mod record;
pub mod service;
pub mod status_reasons;
pub mod transaction;
pub mod transport;
pub mod tsig;
