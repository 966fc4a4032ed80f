// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for ddnsgate.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// DNS Protocol Constants
// ============================================================================

/// Standard DNS port for queries and dynamic updates
pub const DNS_PORT: u16 = 53;

/// Maximum length of a single DNS label in bytes (RFC 1035)
pub const MAX_LABEL_LEN: usize = 63;

/// Maximum length of a domain name in presentation form, without the trailing dot
pub const MAX_NAME_LEN: usize = 253;

/// Maximum length of a single TXT character-string in bytes (RFC 1035)
pub const MAX_TXT_SEGMENT_LEN: usize = 255;

/// Maximum total length of a TXT value accepted from callers
pub const MAX_TXT_VALUE_LEN: usize = 4096;

/// Maximum TTL value (RFC 2181 section 8)
pub const MAX_TTL_SECS: u32 = 2_147_483_647;

/// Default MX preference when the value only names the exchange
pub const DEFAULT_MX_PREFERENCE: u16 = 10;

/// Record name that refers to the zone apex
pub const APEX_NAME: &str = "@";

// ============================================================================
// Update Defaults
// ============================================================================

/// Default TTL for records added without an explicit TTL
pub const DEFAULT_RECORD_TTL_SECS: u32 = 60;

/// Default time to wait for the server's acknowledgment
pub const DEFAULT_UPDATE_TIMEOUT_SECS: u64 = 5;

/// Extra time the outer task guard allows beyond the connection timeout
pub const UPDATE_TIMEOUT_GRACE_MILLIS: u64 = 1_000;

// ============================================================================
// TSIG Constants
// ============================================================================

/// TSIG fudge time in seconds (allows for clock skew)
pub const TSIG_FUDGE_TIME_SECS: u16 = 300;

/// Size of generated TSIG secrets in bytes (256 bits)
pub const TSIG_GENERATED_KEY_BYTES: usize = 32;

// ============================================================================
// HTTP API Constants
// ============================================================================

/// Default listen address for the HTTP API
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";

/// Route for adding records
pub const ROUTE_ADD_RECORD: &str = "/dns/add";

/// Route for deleting records
pub const ROUTE_DELETE_RECORD: &str = "/dns/delete";

/// Route for liveness checks
pub const ROUTE_HEALTH: &str = "/healthz";

/// Route for Prometheus metrics
pub const ROUTE_METRICS: &str = "/metrics";

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of Tokio worker threads
pub const TOKIO_WORKER_THREADS: usize = 4;

/// Name given to Tokio worker threads
pub const TOKIO_THREAD_NAME: &str = "ddnsgate-worker";
