// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for dynamic DNS update operations.
//!
//! This module provides specialized error types for:
//! - Caller input validation (record name, type, value, TTL)
//! - Delivery of signed RFC 2136 updates to the authoritative server
//! - TSIG signing key loading and signer construction
//!
//! Every variant maps to one stable reason code from [`crate::status_reasons`],
//! so callers can tell each failure apart without parsing messages.

use crate::record::RecordType;
use crate::status_reasons::{
    REASON_AUTHENTICATION_FAILURE, REASON_INVALID_NAME, REASON_INVALID_TTL, REASON_INVALID_VALUE,
    REASON_SERVER_REJECTED, REASON_SIGNING_KEY_INVALID, REASON_TIMEOUT,
    REASON_TRANSPORT_UNAVAILABLE, REASON_UNSUPPORTED_TYPE,
};
use thiserror::Error;

/// Errors raised while validating caller input into an update transaction.
///
/// These are reported before any network activity takes place and are never
/// retryable: the same input always fails the same way.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Record name failed label or length rules
    ///
    /// Returned for empty names, labels longer than 63 bytes, names longer than
    /// 253 bytes after the zone suffix is applied, or characters outside the
    /// hostname alphabet.
    #[error("Invalid record name {name:?}: {reason}")]
    InvalidName {
        /// The name as supplied by the caller
        name: String,
        /// Which rule the name broke
        reason: String,
    },

    /// Record type is not one of the supported types
    #[error("Unsupported record type {record_type:?} (supported: {supported})")]
    UnsupportedType {
        /// The type as supplied by the caller
        record_type: String,
        /// Comma-separated list of supported types
        supported: String,
    },

    /// Record value failed the syntax rules of its type
    ///
    /// The value is shown in debug form so control characters in hostile input
    /// are escaped in messages and logs.
    #[error("Invalid {record_type} value {value:?}: {reason}")]
    InvalidValue {
        /// The record type whose rules were applied
        record_type: RecordType,
        /// The value as supplied by the caller
        value: String,
        /// Which rule the value broke
        reason: String,
    },

    /// TTL is negative or above the RFC 2181 maximum
    #[error("Invalid TTL {ttl}: must be between 0 and {max}")]
    InvalidTtl {
        /// The TTL as supplied by the caller
        ttl: i64,
        /// Largest accepted TTL
        max: u32,
    },
}

impl ValidationError {
    /// Returns the stable reason code for this error.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::InvalidName { .. } => REASON_INVALID_NAME,
            Self::UnsupportedType { .. } => REASON_UNSUPPORTED_TYPE,
            Self::InvalidValue { .. } => REASON_INVALID_VALUE,
            Self::InvalidTtl { .. } => REASON_INVALID_TTL,
        }
    }
}

/// Errors raised while delivering a signed update to the authoritative server.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The server did not accept the TSIG key or signature
    ///
    /// Returned when the server answers NOTAUTH, BADSIG, BADKEY or BADTIME, or
    /// when the response fails TSIG verification. Typical causes:
    /// - Key name or secret not configured on the server
    /// - Mismatched HMAC algorithm
    /// - Clock skew larger than the TSIG fudge window
    #[error("TSIG authentication with key '{key_name}' failed on server {server}: {reason}")]
    AuthenticationFailure {
        /// The DNS server (IP:port) that rejected the key
        server: String,
        /// The TSIG key name that was used
        key_name: String,
        /// Response code or verification failure detail
        reason: String,
    },

    /// The server answered with a non-success response code
    ///
    /// Returned for REFUSED, NOTZONE, FORMERR, SERVFAIL, YXRRSET and the like.
    #[error("Server {server} rejected update for {fqdn}: {response_code}")]
    ServerRejected {
        /// The DNS server (IP:port) that rejected the update
        server: String,
        /// The fully-qualified record name in the update
        fqdn: String,
        /// Mnemonic of the response code (e.g. `Refused`)
        response_code: String,
        /// Numeric response code
        rcode: u16,
    },

    /// No response arrived within the timeout
    #[error("Update to server {server} timed out after {timeout_ms}ms")]
    Timeout {
        /// The DNS server (IP:port) that did not answer
        server: String,
        /// Timeout in milliseconds
        timeout_ms: u64,
    },

    /// The server could not be resolved or a connection could not be established
    #[error("Server {server} unavailable: {reason}")]
    TransportUnavailable {
        /// The endpoint as configured (host:port)
        server: String,
        /// Reason for the connection failure
        reason: String,
    },
}

impl TransportError {
    /// Returns true if the caller may retry the same update.
    ///
    /// Only conditions where the server never saw or never answered the request
    /// are retryable. Rejections and authentication failures repeat on retry.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::TransportUnavailable { .. } => true,
            Self::AuthenticationFailure { .. } | Self::ServerRejected { .. } => false,
        }
    }

    /// Returns the stable reason code for this error.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::AuthenticationFailure { .. } => REASON_AUTHENTICATION_FAILURE,
            Self::ServerRejected { .. } => REASON_SERVER_REJECTED,
            Self::Timeout { .. } => REASON_TIMEOUT,
            Self::TransportUnavailable { .. } => REASON_TRANSPORT_UNAVAILABLE,
        }
    }
}

/// Errors related to the TSIG signing key.
///
/// These occur at startup while loading the key file, or when a signer is built
/// from key material. They indicate configuration problems and are never retryable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// Key file could not be read
    #[error("Failed to read signing key file {path}: {reason}")]
    Io {
        /// Path of the key file
        path: String,
        /// Underlying I/O error
        reason: String,
    },

    /// Key file content is not in BIND key format
    #[error("Failed to parse signing key: {0}")]
    Parse(String),

    /// Algorithm is not one of the supported HMAC algorithms
    #[error("Unsupported TSIG algorithm '{0}'. Supported algorithms: hmac-md5, hmac-sha1, hmac-sha224, hmac-sha256, hmac-sha384, hmac-sha512")]
    UnsupportedAlgorithm(String),

    /// Key name is not a valid DNS name
    #[error("Invalid TSIG key name '{key_name}': {reason}")]
    InvalidName {
        /// The rejected key name
        key_name: String,
        /// Explanation of what is invalid
        reason: String,
    },

    /// Secret is not valid base64 or is empty
    #[error("Invalid TSIG secret for key '{key_name}': {reason}")]
    InvalidSecret {
        /// The key name
        key_name: String,
        /// Explanation of what is invalid
        reason: String,
    },

    /// The DNS library refused to build a signer from the key
    #[error("Failed to create TSIG signer for key '{key_name}': {reason}")]
    Signer {
        /// The key name
        key_name: String,
        /// Underlying library error
        reason: String,
    },
}

/// Composite error type that encompasses all update errors.
///
/// This is the error returned by the `AddRecord` boundary
/// ([`crate::service::RecordService`]).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DdnsError {
    /// Caller input was rejected before any transaction was attempted
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The transaction was attempted and failed in delivery or at the server
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The signing key could not be used
    #[error(transparent)]
    Key(#[from] KeyError),
}

impl DdnsError {
    /// Returns true if the operation may succeed when retried unchanged.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_retryable(),
            Self::Validation(_) | Self::Key(_) => false,
        }
    }

    /// Returns the stable reason code for this error.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Validation(e) => e.reason(),
            Self::Transport(e) => e.reason(),
            Self::Key(_) => REASON_SIGNING_KEY_INVALID,
        }
    }
}
