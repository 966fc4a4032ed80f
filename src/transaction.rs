// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Dynamic update transactions (RFC 2136).
//!
//! [`UpdateTransactionBuilder`] turns untrusted caller input into an immutable
//! [`UpdateTransaction`]. A transaction holds only typed, validated data; its
//! textual form is produced by [`UpdateTransaction::render`] in the line-oriented
//! `nsupdate` syntax:
//!
//! ```text
//! server dns-server 53
//! zone example.test
//! update add www.example.test. 60 A 10.0.0.5
//! send
//! ```
//!
//! The rendered text is for logs, dry runs and interoperability. Updates are
//! delivered by [`crate::transport`] as binary DNS messages, never through a shell.
//!
//! # Example
//!
//! ```rust
//! use ddnsgate::transaction::UpdateTransactionBuilder;
//!
//! let builder = UpdateTransactionBuilder::new("dns-server", 53, "example.test", 60).unwrap();
//! let transaction = builder.build("www", "A", "10.0.0.5", None).unwrap();
//!
//! assert_eq!(transaction.update_line(), "update add www.example.test. 60 A 10.0.0.5");
//! ```

use crate::constants::MAX_TTL_SECS;
use crate::dns_errors::ValidationError;
use crate::record::{check_server_host, parse_zone, qualify_record_name, RecordData, RecordType};
use hickory_client::rr::{DNSClass, Name, Record};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Update operation carried by a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Add the record to its RRset
    Add,
    /// Delete the record with exactly this data
    Delete,
}

impl Operation {
    /// Keyword used in `update <op>` lines and metric labels.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing the rendered text form of a transaction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionParseError {
    /// The text does not have the `server` / `zone` / `update` / `send` shape
    #[error("line {line}: {reason}")]
    Syntax {
        /// 1-based line number
        line: usize,
        /// What was wrong
        reason: String,
    },

    /// A field has the right shape but fails validation
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// A single, immutable, well-formed update.
///
/// Instances only come from [`UpdateTransactionBuilder`] or
/// [`UpdateTransaction::parse`], so every field has passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UpdateTransaction {
    server: String,
    port: u16,
    zone: Name,
    operation: Operation,
    fqdn: Name,
    ttl: u32,
    data: RecordData,
}

impl UpdateTransaction {
    /// Target server host (IP address or hostname).
    #[must_use]
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Target server port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// `host:port` of the target server, with IPv6 literals bracketed.
    #[must_use]
    pub fn endpoint(&self) -> String {
        if self.server.contains(':') {
            format!("[{}]:{}", self.server, self.port)
        } else {
            format!("{}:{}", self.server, self.port)
        }
    }

    /// Zone the update applies to.
    #[must_use]
    pub fn zone(&self) -> &Name {
        &self.zone
    }

    /// Add or delete.
    #[must_use]
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Fully-qualified owner name of the record.
    #[must_use]
    pub fn fqdn(&self) -> &Name {
        &self.fqdn
    }

    /// TTL in seconds. Always 0 for deletes.
    #[must_use]
    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    /// Record type.
    #[must_use]
    pub fn record_type(&self) -> RecordType {
        self.data.record_type()
    }

    /// Typed record data.
    #[must_use]
    pub fn data(&self) -> &RecordData {
        &self.data
    }

    /// The `update ...` line of the rendered transaction.
    #[must_use]
    pub fn update_line(&self) -> String {
        match self.operation {
            Operation::Add => format!(
                "update add {} {} {} {}",
                self.fqdn.to_ascii(),
                self.ttl,
                self.record_type(),
                self.data.render()
            ),
            Operation::Delete => format!(
                "update delete {} {} {}",
                self.fqdn.to_ascii(),
                self.record_type(),
                self.data.render()
            ),
        }
    }

    /// Render the full transaction in `nsupdate` syntax.
    ///
    /// Field order is fixed and `send` terminates the transaction.
    #[must_use]
    pub fn render(&self) -> String {
        let zone = self.zone.to_ascii();
        format!(
            "server {} {}\nzone {}\n{}\nsend\n",
            self.server,
            self.port,
            zone.strip_suffix('.').unwrap_or(&zone),
            self.update_line()
        )
    }

    /// Parse a rendered transaction back into a value.
    ///
    /// Only the exact shape produced by [`UpdateTransaction::render`] is
    /// accepted: one `server`, one `zone`, one `update` line and `send`.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionParseError::Syntax`] for structural problems and
    /// [`TransactionParseError::Validation`] when a field fails validation.
    pub fn parse(text: &str) -> Result<Self, TransactionParseError> {
        let lines: Vec<&str> = text.lines().collect();
        if lines.len() != 4 {
            return Err(syntax(1, format!("expected 4 lines, found {}", lines.len())));
        }

        let [server, port] = fields::<2>(lines[0], "server", 1)?;
        let port = port
            .parse::<u16>()
            .map_err(|_| syntax(1, format!("invalid port '{port}'")))?;
        check_server_host(server)?;

        let [zone] = fields::<1>(lines[1], "zone", 2)?;
        let zone = parse_zone(zone)?;

        let update = lines[2]
            .strip_prefix("update ")
            .ok_or_else(|| syntax(3, "expected 'update'".to_string()))?;
        let (operation, fqdn, ttl, record_type, value) =
            if let Some(rest) = update.strip_prefix("add ") {
                let parts: Vec<&str> = rest.splitn(4, ' ').collect();
                let [fqdn, ttl, record_type, value] = parts.as_slice() else {
                    return Err(syntax(3, "expected '<fqdn> <ttl> <type> <value>'".to_string()));
                };
                let ttl = ttl
                    .parse::<i64>()
                    .map_err(|_| syntax(3, format!("invalid TTL '{ttl}'")))?;
                (Operation::Add, *fqdn, Some(ttl), *record_type, *value)
            } else if let Some(rest) = update.strip_prefix("delete ") {
                let parts: Vec<&str> = rest.splitn(3, ' ').collect();
                let [fqdn, record_type, value] = parts.as_slice() else {
                    return Err(syntax(3, "expected '<fqdn> <type> <value>'".to_string()));
                };
                (Operation::Delete, *fqdn, None, *record_type, *value)
            } else {
                return Err(syntax(3, "expected 'update add' or 'update delete'".to_string()));
            };

        if lines[3] != "send" {
            return Err(syntax(4, "expected 'send'".to_string()));
        }

        let fqdn = owner_in_zone(fqdn, &zone)?;
        let record_type = RecordType::from_str(record_type)?;
        let ttl = match ttl {
            Some(ttl) => check_ttl(ttl)?,
            None => 0,
        };
        let data = RecordData::parse_rendered(record_type, value, &zone)?;

        Ok(Self {
            server: server.to_string(),
            port,
            zone,
            operation,
            fqdn,
            ttl,
            data,
        })
    }

    /// Build the hickory record sent in the update section.
    #[must_use]
    pub fn to_record(&self) -> Record {
        let mut record = Record::from_rdata(self.fqdn.clone(), self.ttl, self.data.to_rdata());
        record.set_dns_class(DNSClass::IN);
        record
    }
}

impl fmt::Display for UpdateTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.update_line())
    }
}

fn syntax(line: usize, reason: String) -> TransactionParseError {
    TransactionParseError::Syntax { line, reason }
}

/// Split `<keyword> <f1> ... <fN>` into exactly `N` single-space separated fields.
fn fields<'a, const N: usize>(
    line: &'a str,
    keyword: &str,
    number: usize,
) -> Result<[&'a str; N], TransactionParseError> {
    let mut parts = line.split(' ');
    if parts.next() != Some(keyword) {
        return Err(syntax(number, format!("expected '{keyword}'")));
    }
    let values: Vec<&str> = parts.collect();
    <[&str; N]>::try_from(values.as_slice())
        .map_err(|_| syntax(number, format!("'{keyword}' takes {N} field(s)")))
}

/// Validate an absolute owner name and check that it lies inside `zone`.
fn owner_in_zone(fqdn: &str, zone: &Name) -> Result<Name, TransactionParseError> {
    let absolute = fqdn
        .strip_suffix('.')
        .ok_or_else(|| syntax(3, format!("owner name '{fqdn}' is not absolute")))?
        .to_ascii_lowercase();
    let zone_ascii = zone.to_ascii();
    let zone_text = zone_ascii.strip_suffix('.').unwrap_or(&zone_ascii);

    let relative = if absolute == zone_text {
        "@"
    } else {
        absolute
            .strip_suffix(&format!(".{zone_text}"))
            .ok_or_else(|| syntax(3, format!("owner name '{fqdn}' is outside zone {zone_text}")))?
    };
    Ok(qualify_record_name(relative, zone)?)
}

fn check_ttl(ttl: i64) -> Result<u32, ValidationError> {
    u32::try_from(ttl)
        .ok()
        .filter(|ttl| *ttl <= MAX_TTL_SECS)
        .ok_or(ValidationError::InvalidTtl {
            ttl,
            max: MAX_TTL_SECS,
        })
}

/// Validates caller input and produces [`UpdateTransaction`]s for one zone.
///
/// The builder is configuration (server, zone, default TTL) and has no
/// mutable state; `build` is a pure function of its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTransactionBuilder {
    server: String,
    port: u16,
    zone: Name,
    default_ttl: u32,
}

impl UpdateTransactionBuilder {
    /// Create a builder for updates to `zone` on `server:port`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidName`] if the server or zone is not a
    /// valid name, or [`ValidationError::InvalidTtl`] if the default TTL is out
    /// of range.
    pub fn new(
        server: &str,
        port: u16,
        zone: &str,
        default_ttl: u32,
    ) -> Result<Self, ValidationError> {
        check_server_host(server)?;
        let zone = parse_zone(zone)?;
        let default_ttl = check_ttl(i64::from(default_ttl))?;

        Ok(Self {
            server: server.to_string(),
            port,
            zone,
            default_ttl,
        })
    }

    /// Zone updates are built for.
    #[must_use]
    pub fn zone(&self) -> &Name {
        &self.zone
    }

    /// TTL used when `build` is called without one.
    #[must_use]
    pub fn default_ttl(&self) -> u32 {
        self.default_ttl
    }

    /// Build an `add` transaction.
    ///
    /// `name` is relative to the zone (`@` for the apex), `record_type` is a
    /// mnemonic such as `A` or `txt`, and `ttl` falls back to the default TTL.
    ///
    /// # Errors
    ///
    /// Returns `InvalidName`, `UnsupportedType`, `InvalidTtl` or `InvalidValue`
    /// when the corresponding input fails validation.
    pub fn build(
        &self,
        name: &str,
        record_type: &str,
        value: &str,
        ttl: Option<i64>,
    ) -> Result<UpdateTransaction, ValidationError> {
        let ttl = match ttl {
            Some(ttl) => Some(check_ttl(ttl)?),
            None => None,
        };
        self.assemble(Operation::Add, name, record_type, value, ttl.unwrap_or(self.default_ttl))
    }

    /// Build a `delete` transaction removing exactly the given record.
    ///
    /// # Errors
    ///
    /// Returns `InvalidName`, `UnsupportedType` or `InvalidValue` when the
    /// corresponding input fails validation.
    pub fn build_delete(
        &self,
        name: &str,
        record_type: &str,
        value: &str,
    ) -> Result<UpdateTransaction, ValidationError> {
        self.assemble(Operation::Delete, name, record_type, value, 0)
    }

    fn assemble(
        &self,
        operation: Operation,
        name: &str,
        record_type: &str,
        value: &str,
        ttl: u32,
    ) -> Result<UpdateTransaction, ValidationError> {
        let fqdn = qualify_record_name(name, &self.zone)?;
        let record_type = RecordType::from_str(record_type)?;
        let data = RecordData::parse(record_type, value, &self.zone)?;

        Ok(UpdateTransaction {
            server: self.server.clone(),
            port: self.port,
            zone: self.zone.clone(),
            operation,
            fqdn,
            ttl,
            data,
        })
    }
}

#[cfg(test)]
#[path = "transaction_tests.rs"]
mod transaction_tests;
