// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Stable reason codes for update failures.
//!
//! Every error kind that can reach a caller maps to exactly one reason code.
//! Reasons are programmatic identifiers in CamelCase; they appear in HTTP error
//! bodies, log lines and metric labels, and must not change between releases.
//!
//! # Example Error Body
//!
//! ```json
//! {
//!   "error": "Server 10.0.0.2:53 rejected update for www.example.test.: Refused",
//!   "reason": "ServerRejected",
//!   "retryable": false
//! }
//! ```

// ============================================================================
// Validation Reasons (caller input, never retryable)
// ============================================================================

/// Record name failed label or length rules.
pub const REASON_INVALID_NAME: &str = "InvalidName";

/// Record type is not one of the supported types.
pub const REASON_UNSUPPORTED_TYPE: &str = "UnsupportedType";

/// Record value failed the syntax rules of its type.
pub const REASON_INVALID_VALUE: &str = "InvalidValue";

/// TTL is outside the range allowed by RFC 2181.
pub const REASON_INVALID_TTL: &str = "InvalidTtl";

// ============================================================================
// Transport Reasons
// ============================================================================

/// The server rejected the TSIG signature or key (NOTAUTH, BADSIG, BADKEY, BADTIME).
pub const REASON_AUTHENTICATION_FAILURE: &str = "AuthenticationFailure";

/// The server answered with a non-success response code (REFUSED, NOTZONE, ...).
pub const REASON_SERVER_REJECTED: &str = "ServerRejected";

/// No response arrived before the deadline. Retryable.
pub const REASON_TIMEOUT: &str = "Timeout";

/// The server could not be resolved or reached. Retryable.
pub const REASON_TRANSPORT_UNAVAILABLE: &str = "TransportUnavailable";

// ============================================================================
// Key Reasons (startup configuration)
// ============================================================================

/// The signing key could not be loaded or used.
pub const REASON_SIGNING_KEY_INVALID: &str = "SigningKeyInvalid";

// ============================================================================
// Outcome Labels (terminal submit states)
// ============================================================================

/// Update was acknowledged with NOERROR.
pub const OUTCOME_ACKED: &str = "acked";

/// Update was rejected by the server (any non-success rcode).
pub const OUTCOME_REJECTED: &str = "rejected";

/// Update timed out waiting for a response.
pub const OUTCOME_TIMED_OUT: &str = "timed_out";

/// Connection to the server could not be established.
pub const OUTCOME_CONNECTION_FAILED: &str = "connection_failed";
