// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Delivery of signed dynamic updates (RFC 2136 + TSIG).
//!
//! [`UpdateTransport`] is the seam between validated transactions and the
//! network. [`HickoryTransport`] implements it with `hickory-client`: the update
//! is encoded as a binary DNS UPDATE message, signed with TSIG and sent over
//! UDP or TCP. No external process is involved.
//!
//! Each call walks a linear state machine:
//!
//! ```text
//! Idle -> Sending -> { Acked | Rejected | TimedOut | ConnectionFailed }
//! ```
//!
//! There are no retries; the caller decides whether a retryable error is worth
//! another attempt.

use crate::constants::UPDATE_TIMEOUT_GRACE_MILLIS;
use crate::dns_errors::TransportError;
use crate::status_reasons::{
    OUTCOME_ACKED, OUTCOME_CONNECTION_FAILED, OUTCOME_REJECTED, OUTCOME_TIMED_OUT,
};
use crate::transaction::{Operation, UpdateTransaction};
use crate::tsig::SigningKey;
use async_trait::async_trait;
use hickory_client::client::{Client, ClientConnection, SyncClient};
use hickory_client::error::{ClientError, ClientErrorKind, ClientResult};
use hickory_client::op::ResponseCode;
use hickory_client::rr::{Name, Record};
use hickory_client::tcp::TcpClientConnection;
use hickory_client::udp::UdpClientConnection;
use hickory_proto::error::ProtoErrorKind;
use hickory_proto::rr::dnssec::tsig::TSigner;
use hickory_proto::xfer::DnsResponse;
use std::fmt;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Response codes that mean the server did not accept our key or signature.
const RCODE_NOTAUTH: u16 = 9;
const RCODE_BADSIG: u16 = 16;
const RCODE_BADKEY: u16 = 17;
const RCODE_BADTIME: u16 = 18;

/// Protocol-level acknowledgment of an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack {
    /// Address the update was sent to
    pub server: SocketAddr,
    /// DNS message id of the acknowledged update
    pub message_id: u16,
    /// Time from sending to acknowledgment
    pub elapsed: Duration,
}

/// States of a single submit call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmitState {
    /// Nothing sent yet
    Idle,
    /// Request in flight
    Sending,
    /// Server answered NOERROR
    Acked,
    /// Server answered with an error code or refused the key
    Rejected,
    /// No answer before the deadline
    TimedOut,
    /// Server could not be resolved or reached
    ConnectionFailed,
}

impl SubmitState {
    /// True for the four final states.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Idle | Self::Sending)
    }

    /// The state a finished submit ends in.
    #[must_use]
    pub fn of(result: &Result<Ack, TransportError>) -> Self {
        match result {
            Ok(_) => Self::Acked,
            Err(TransportError::AuthenticationFailure { .. } | TransportError::ServerRejected { .. }) => {
                Self::Rejected
            }
            Err(TransportError::Timeout { .. }) => Self::TimedOut,
            Err(TransportError::TransportUnavailable { .. }) => Self::ConnectionFailed,
        }
    }

    /// Label used in logs and metrics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Sending => "sending",
            Self::Acked => OUTCOME_ACKED,
            Self::Rejected => OUTCOME_REJECTED,
            Self::TimedOut => OUTCOME_TIMED_OUT,
            Self::ConnectionFailed => OUTCOME_CONNECTION_FAILED,
        }
    }
}

impl fmt::Display for SubmitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport protocol used to reach the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Protocol {
    /// UDP, as `nsupdate` uses by default
    #[default]
    Udp,
    /// TCP, for servers or networks that drop UDP updates
    Tcp,
}

impl Protocol {
    /// Lower-case protocol name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Udp => "udp",
            Self::Tcp => "tcp",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivers a validated transaction to an authoritative server.
///
/// Implementations must not retry, must release all connection resources
/// before returning, and must map every failure onto one [`TransportError`].
#[async_trait]
pub trait UpdateTransport: Send + Sync {
    /// Sign `transaction` with `key`, send it to `endpoint` (`host:port`) and wait
    /// up to `timeout` for the acknowledgment.
    async fn submit(
        &self,
        transaction: &UpdateTransaction,
        key: &SigningKey,
        endpoint: &str,
        timeout: Duration,
    ) -> Result<Ack, TransportError>;
}

/// [`UpdateTransport`] backed by `hickory-client`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HickoryTransport {
    protocol: Protocol,
}

impl HickoryTransport {
    /// Create a transport using `protocol`.
    #[must_use]
    pub fn new(protocol: Protocol) -> Self {
        Self { protocol }
    }

    /// Protocol this transport uses.
    #[must_use]
    pub fn protocol(&self) -> Protocol {
        self.protocol
    }
}

#[async_trait]
impl UpdateTransport for HickoryTransport {
    async fn submit(
        &self,
        transaction: &UpdateTransaction,
        key: &SigningKey,
        endpoint: &str,
        timeout: Duration,
    ) -> Result<Ack, TransportError> {
        let deadline = Instant::now() + timeout;
        let timed_out = || TransportError::Timeout {
            server: endpoint.to_string(),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        };

        debug!(
            "Submitting update over {} to {}:\n{}",
            self.protocol,
            endpoint,
            transaction.render()
        );

        let server_addr = resolve_endpoint(endpoint, timeout)
            .await
            .map_err(|failure| match failure {
                None => timed_out(),
                Some(reason) => TransportError::TransportUnavailable {
                    server: endpoint.to_string(),
                    reason,
                },
            })?;

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(timed_out());
        }

        let signer = key
            .signer()
            .map_err(|e| TransportError::AuthenticationFailure {
                server: server_addr.to_string(),
                key_name: key.name.clone(),
                reason: e.to_string(),
            })?;

        let record = transaction.to_record();
        let zone = transaction.zone().clone();
        let operation = transaction.operation();
        let protocol = self.protocol;

        debug!(
            "Update state {} -> {} for {} via {}",
            SubmitState::Idle,
            SubmitState::Sending,
            transaction.fqdn(),
            server_addr
        );
        let started = Instant::now();

        // The connection carries its own I/O timeout; the outer guard only
        // catches a blocking task that fails to honour it.
        let task = tokio::task::spawn_blocking(move || {
            send_update(protocol, server_addr, remaining, signer, record, zone, operation)
        });
        let guard = remaining + Duration::from_millis(UPDATE_TIMEOUT_GRACE_MILLIS);
        let outcome = match tokio::time::timeout(guard, task).await {
            Err(_) => Err(timed_out()),
            Ok(Err(join_error)) => Err(TransportError::TransportUnavailable {
                server: server_addr.to_string(),
                reason: format!("update task failed: {join_error}"),
            }),
            Ok(Ok(Ok(response))) => classify_response_code(
                response.response_code(),
                &server_addr.to_string(),
                &transaction.fqdn().to_ascii(),
                &key.name,
            )
            .map(|()| Ack {
                server: server_addr,
                message_id: response.id(),
                elapsed: started.elapsed(),
            }),
            Ok(Ok(Err(client_error))) => Err(classify_client_error(
                &client_error,
                started.elapsed() >= remaining,
                &server_addr.to_string(),
                &key.name,
                timeout,
            )),
        };

        let state = SubmitState::of(&outcome);
        match &outcome {
            Ok(ack) => info!(
                "Update {} {} {} acknowledged by {} in {}ms (state: {})",
                operation,
                transaction.fqdn(),
                transaction.record_type(),
                ack.server,
                ack.elapsed.as_millis(),
                state
            ),
            Err(e) => warn!(
                "Update {} {} {} failed (state: {}): {}",
                operation,
                transaction.fqdn(),
                transaction.record_type(),
                state,
                e
            ),
        }
        outcome
    }
}

/// Resolve `host:port` to a socket address.
///
/// Returns `Err(None)` if resolution did not finish within `timeout`, and
/// `Err(Some(reason))` if it failed.
async fn resolve_endpoint(endpoint: &str, timeout: Duration) -> Result<SocketAddr, Option<String>> {
    if let Ok(addr) = endpoint.parse::<SocketAddr>() {
        return Ok(addr);
    }

    let mut addrs = tokio::time::timeout(timeout, tokio::net::lookup_host(endpoint))
        .await
        .map_err(|_| None)?
        .map_err(|e| Some(format!("cannot resolve {endpoint}: {e}")))?;
    addrs
        .next()
        .ok_or_else(|| Some(format!("{endpoint} resolved to no addresses")))
}

/// Blocking half of a submit: connect, sign, send and wait for the response.
fn send_update(
    protocol: Protocol,
    server_addr: SocketAddr,
    timeout: Duration,
    signer: TSigner,
    record: Record,
    zone: Name,
    operation: Operation,
) -> ClientResult<DnsResponse> {
    match protocol {
        Protocol::Udp => exchange(
            UdpClientConnection::with_timeout(server_addr, timeout)?,
            signer,
            record,
            zone,
            operation,
        ),
        Protocol::Tcp => exchange(
            TcpClientConnection::with_timeout(server_addr, timeout)?,
            signer,
            record,
            zone,
            operation,
        ),
    }
}

fn exchange<CC: ClientConnection>(
    conn: CC,
    signer: TSigner,
    record: Record,
    zone: Name,
    operation: Operation,
) -> ClientResult<DnsResponse> {
    let client = SyncClient::with_tsigner(conn, signer);
    match operation {
        // No prerequisites: adding an existing record is a no-op on the server
        Operation::Add => client.append(record, zone, false),
        Operation::Delete => client.delete_by_rdata(record, zone),
    }
}

/// Map the response code of an answered update onto success or a typed error.
///
/// # Errors
///
/// Returns [`TransportError::AuthenticationFailure`] for NOTAUTH, BADSIG, BADKEY
/// and BADTIME, and [`TransportError::ServerRejected`] for every other
/// non-NOERROR code.
pub fn classify_response_code(
    code: ResponseCode,
    server: &str,
    fqdn: &str,
    key_name: &str,
) -> Result<(), TransportError> {
    match u16::from(code) {
        0 => Ok(()),
        RCODE_NOTAUTH | RCODE_BADSIG | RCODE_BADKEY | RCODE_BADTIME => {
            Err(TransportError::AuthenticationFailure {
                server: server.to_string(),
                key_name: key_name.to_string(),
                reason: format!("server answered {code:?}"),
            })
        }
        rcode => Err(TransportError::ServerRejected {
            server: server.to_string(),
            fqdn: fqdn.to_string(),
            response_code: format!("{code:?}"),
            rcode,
        }),
    }
}

/// Map a client-side failure (no usable response) onto a typed error.
///
/// `deadline_passed` is true when the failure surfaced at or after the timeout,
/// which is how a silent server shows up regardless of the error wording.
///
/// Responses that fail TSIG verification (unsigned, wrong key, bad MAC) are
/// reported as [`TransportError::AuthenticationFailure`]. A server that rejects
/// our key answers with such a response.
#[must_use]
pub fn classify_client_error(
    error: &ClientError,
    deadline_passed: bool,
    server: &str,
    key_name: &str,
    timeout: Duration,
) -> TransportError {
    let is_timeout = match error.kind() {
        ClientErrorKind::Timeout => true,
        ClientErrorKind::Proto(proto) => matches!(proto.kind(), ProtoErrorKind::Timeout),
        _ => false,
    };
    if is_timeout || deadline_passed {
        return TransportError::Timeout {
            server: server.to_string(),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        };
    }

    // The outer display of a wrapped error is only its category ("proto error",
    // "io error"); the detail lives in the inner error.
    let (message, wrong_key) = match error.kind() {
        ClientErrorKind::Proto(proto) => (
            proto.to_string(),
            matches!(
                proto.kind(),
                ProtoErrorKind::TsigWrongKey | ProtoErrorKind::TsigUnsupportedMacAlgorithm(_)
            ),
        ),
        ClientErrorKind::DnsSec(dnssec) => (dnssec.to_string(), false),
        ClientErrorKind::Io(io) => (io.to_string(), false),
        _ => (error.to_string(), false),
    };
    let lowered = message.to_ascii_lowercase();
    if wrong_key || lowered.contains("tsig") || lowered.contains("signature") {
        return TransportError::AuthenticationFailure {
            server: server.to_string(),
            key_name: key_name.to_string(),
            reason: message,
        };
    }

    TransportError::TransportUnavailable {
        server: server.to_string(),
        reason: message,
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod transport_tests;
