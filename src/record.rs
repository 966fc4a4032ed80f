// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Record types, names and typed record data.
//!
//! Everything a caller supplies as text is parsed here into typed values before
//! it can become part of an update. Values are never carried as raw strings:
//! an A record holds an [`Ipv4Addr`], a CNAME holds a validated [`Name`], and a
//! TXT record holds printable segments that are escaped again on rendering.
//!
//! # Name rules
//!
//! - Labels are 1 to 63 bytes of `[a-z0-9_-]`, not starting or ending with `-`
//! - The fully-qualified name is at most 253 bytes (without the trailing dot)
//! - Record names are relative to the zone; `@` is the zone apex and a leading
//!   `*` label is a wildcard
//! - Names are lower-cased

use crate::constants::{
    APEX_NAME, DEFAULT_MX_PREFERENCE, MAX_LABEL_LEN, MAX_NAME_LEN, MAX_TXT_SEGMENT_LEN,
    MAX_TXT_VALUE_LEN,
};
use crate::dns_errors::ValidationError;
use hickory_client::rr::{rdata, Name, RData};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// Supported DNS record types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    /// IPv4 address
    A,
    /// IPv6 address
    Aaaa,
    /// Canonical name alias
    Cname,
    /// Mail exchange
    Mx,
    /// Name server delegation
    Ns,
    /// Reverse pointer
    Ptr,
    /// Service locator
    Srv,
    /// Free-form text
    Txt,
}

impl RecordType {
    /// All supported types, in display order.
    pub const ALL: [Self; 8] = [
        Self::A,
        Self::Aaaa,
        Self::Cname,
        Self::Mx,
        Self::Ns,
        Self::Ptr,
        Self::Srv,
        Self::Txt,
    ];

    /// Mnemonic used in presentation format (`A`, `AAAA`, ...).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Cname => "CNAME",
            Self::Mx => "MX",
            Self::Ns => "NS",
            Self::Ptr => "PTR",
            Self::Srv => "SRV",
            Self::Txt => "TXT",
        }
    }

    fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = ValidationError;

    /// Parse a record type mnemonic, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ValidationError::UnsupportedType {
                record_type: s.to_string(),
                supported: Self::supported_list(),
            })
    }
}

// ============================================================================
// Names
// ============================================================================

/// Check a dot-separated label sequence (no trailing dot) against hostname rules.
///
/// Returns a human-readable reason on failure.
fn check_labels(name: &str, allow_wildcard: bool) -> Result<(), String> {
    for (index, label) in name.split('.').enumerate() {
        if label.is_empty() {
            return Err("empty label".to_string());
        }
        if label.len() > MAX_LABEL_LEN {
            return Err(format!(
                "label '{label}' is {} bytes (max {MAX_LABEL_LEN})",
                label.len()
            ));
        }
        if label == "*" {
            if allow_wildcard && index == 0 {
                continue;
            }
            return Err("wildcard '*' is only allowed as the leftmost label".to_string());
        }
        if let Some(bad) = label
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(format!("character {bad:?} is not allowed"));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(format!("label '{label}' must not start or end with '-'"));
        }
    }
    Ok(())
}

/// Check a full name (no trailing dot) and turn it into an absolute [`Name`].
fn absolute_name(name: &str, allow_wildcard: bool) -> Result<Name, String> {
    check_labels(name, allow_wildcard)?;
    if name.len() > MAX_NAME_LEN {
        return Err(format!(
            "name is {} bytes (max {MAX_NAME_LEN})",
            name.len()
        ));
    }
    Name::from_ascii(format!("{name}.")).map_err(|e| e.to_string())
}

/// Validate a zone name and return it as an absolute [`Name`].
///
/// A single trailing dot is accepted. The zone is lower-cased.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidName`] if the zone breaks the name rules.
pub fn parse_zone(zone: &str) -> Result<Name, ValidationError> {
    let canonical = zone.strip_suffix('.').unwrap_or(zone).to_ascii_lowercase();
    if canonical.is_empty() {
        return Err(ValidationError::InvalidName {
            name: zone.to_string(),
            reason: "zone must not be empty or the root".to_string(),
        });
    }
    absolute_name(&canonical, false).map_err(|reason| ValidationError::InvalidName {
        name: zone.to_string(),
        reason,
    })
}

/// Check a TSIG key name against the zone-name rules.
///
/// A single trailing dot is accepted.
///
/// # Errors
///
/// Returns a human-readable reason if the name breaks the rules.
pub fn check_key_name(name: &str) -> Result<(), String> {
    let canonical = name.strip_suffix('.').unwrap_or(name);
    if canonical.is_empty() {
        return Err("key name must not be empty".to_string());
    }
    absolute_name(canonical, false).map(|_| ())
}

/// Validate the host of the target server: an IP address or a hostname.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidName`] if the host is neither.
pub fn check_server_host(host: &str) -> Result<(), ValidationError> {
    if host.parse::<std::net::IpAddr>().is_ok() {
        return Ok(());
    }
    let hostname = host.strip_suffix('.').unwrap_or(host);
    if hostname.is_empty() {
        return Err(ValidationError::InvalidName {
            name: host.to_string(),
            reason: "server must not be empty".to_string(),
        });
    }
    check_labels(hostname, false)
        .and_then(|()| {
            if hostname.len() > MAX_NAME_LEN {
                Err(format!("name is {} bytes (max {MAX_NAME_LEN})", hostname.len()))
            } else {
                Ok(())
            }
        })
        .map_err(|reason| ValidationError::InvalidName {
            name: host.to_string(),
            reason,
        })
}

/// Combine a record name with its zone into a fully-qualified [`Name`].
///
/// # Errors
///
/// Returns [`ValidationError::InvalidName`] when the name is empty, absolute,
/// breaks the label rules, or is too long once the zone suffix is applied.
pub fn qualify_record_name(name: &str, zone: &Name) -> Result<Name, ValidationError> {
    let invalid = |reason: String| ValidationError::InvalidName {
        name: name.to_string(),
        reason,
    };

    if name.is_empty() {
        return Err(invalid("name must not be empty".to_string()));
    }
    if name == APEX_NAME {
        return Ok(zone.clone());
    }
    if name.ends_with('.') {
        return Err(invalid(
            "name must be relative to the zone (no trailing dot)".to_string(),
        ));
    }

    let relative = name.to_ascii_lowercase();
    check_labels(&relative, true).map_err(invalid)?;
    absolute_name(&format!("{relative}.{}", zone_text(zone)), true).map_err(invalid)
}

/// Resolve a domain name appearing in a record value.
///
/// Absolute names (trailing dot) are taken as they are; relative names are
/// completed with the zone, as `nsupdate` does with its default origin.
fn qualify_target(target: &str, zone: &Name) -> Result<Name, String> {
    if target == APEX_NAME {
        return Ok(zone.clone());
    }
    let lowered = target.to_ascii_lowercase();
    match lowered.strip_suffix('.') {
        Some(absolute) => absolute_name(absolute, false),
        None => absolute_name(&format!("{lowered}.{}", zone_text(zone)), false),
    }
}

/// Zone name in presentation form without the trailing dot.
fn zone_text(zone: &Name) -> String {
    let ascii = zone.to_ascii();
    ascii.strip_suffix('.').unwrap_or(&ascii).to_string()
}

// ============================================================================
// TXT quoting
// ============================================================================

/// Quote one TXT character-string for presentation format.
///
/// Backslash, double quote and semicolon are backslash-escaped, so the result
/// is always exactly one token and cannot end the record or start a comment.
#[must_use]
pub fn quote_txt_segment(segment: &str) -> String {
    let mut quoted = String::with_capacity(segment.len() + 2);
    quoted.push('"');
    for c in segment.chars() {
        if matches!(c, '\\' | '"' | ';') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Parse a sequence of quoted TXT character-strings back into segments.
///
/// # Errors
///
/// Returns a reason when the text is not a space-separated list of complete
/// quoted strings.
pub fn unquote_txt_segments(text: &str) -> Result<Vec<String>, String> {
    let mut segments = Vec::new();
    let mut chars = text.chars().peekable();

    loop {
        while chars.peek() == Some(&' ') {
            chars.next();
        }
        match chars.next() {
            None => break,
            Some('"') => {}
            Some(c) => return Err(format!("expected '\"', found {c:?}")),
        }

        let mut segment = String::new();
        loop {
            match chars.next() {
                None => return Err("unterminated quoted string".to_string()),
                Some('"') => break,
                Some('\\') => match chars.next() {
                    Some(escaped) => segment.push(escaped),
                    None => return Err("dangling escape".to_string()),
                },
                Some(c) => segment.push(c),
            }
        }
        segments.push(segment);

        match chars.peek() {
            None | Some(' ') => {}
            Some(c) => return Err(format!("unexpected {c:?} after quoted string")),
        }
    }

    if segments.is_empty() {
        return Err("no quoted strings".to_string());
    }
    Ok(segments)
}

// ============================================================================
// Record data
// ============================================================================

/// Typed, validated record data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordData {
    /// IPv4 address
    A(Ipv4Addr),
    /// IPv6 address
    Aaaa(Ipv6Addr),
    /// Alias target
    Cname(Name),
    /// Mail exchange with preference
    Mx {
        /// Lower is preferred
        preference: u16,
        /// Mail server name
        exchange: Name,
    },
    /// Delegated name server
    Ns(Name),
    /// Reverse pointer target
    Ptr(Name),
    /// Service location
    Srv {
        /// Lower is preferred
        priority: u16,
        /// Relative weight among equal priorities
        weight: u16,
        /// Service port
        port: u16,
        /// Host providing the service
        target: Name,
    },
    /// Printable ASCII character-strings, each at most 255 bytes
    Txt(Vec<String>),
}

impl RecordData {
    /// Parse a caller-supplied value according to `record_type`.
    ///
    /// Relative domain names in the value are completed with `zone`. TXT values
    /// are split into 255-byte character-strings.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidValue`] if the value breaks the rules of
    /// its type. Control characters are rejected for every type.
    pub fn parse(record_type: RecordType, value: &str, zone: &Name) -> Result<Self, ValidationError> {
        let invalid = |reason: String| ValidationError::InvalidValue {
            record_type,
            value: value.to_string(),
            reason,
        };

        if value.chars().any(|c| c.is_ascii_control()) {
            return Err(invalid("control characters are not allowed".to_string()));
        }
        if !value.is_ascii() {
            return Err(invalid("only printable ASCII is allowed".to_string()));
        }

        match record_type {
            RecordType::A => Ipv4Addr::from_str(value)
                .map(Self::A)
                .map_err(|_| invalid("expected a dotted-quad IPv4 address".to_string())),
            RecordType::Aaaa => Ipv6Addr::from_str(value)
                .map(Self::Aaaa)
                .map_err(|_| invalid("expected an IPv6 address".to_string())),
            RecordType::Cname => single_name(value, zone).map(Self::Cname).map_err(invalid),
            RecordType::Ns => single_name(value, zone).map(Self::Ns).map_err(invalid),
            RecordType::Ptr => single_name(value, zone).map(Self::Ptr).map_err(invalid),
            RecordType::Mx => parse_mx(value, zone).map_err(invalid),
            RecordType::Srv => parse_srv(value, zone).map_err(invalid),
            RecordType::Txt => parse_txt(value).map(Self::Txt).map_err(invalid),
        }
    }

    /// Parse record data from its rendered presentation form.
    ///
    /// This is the inverse of [`RecordData::render`]: TXT data is read as quoted
    /// character-strings rather than as raw text.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidValue`] if the text is not valid
    /// presentation data for `record_type`.
    pub fn parse_rendered(
        record_type: RecordType,
        text: &str,
        zone: &Name,
    ) -> Result<Self, ValidationError> {
        if record_type != RecordType::Txt {
            return Self::parse(record_type, text, zone);
        }

        let invalid = |reason: String| ValidationError::InvalidValue {
            record_type,
            value: text.to_string(),
            reason,
        };
        let segments = unquote_txt_segments(text).map_err(invalid)?;
        for segment in &segments {
            if segment.len() > MAX_TXT_SEGMENT_LEN {
                return Err(invalid(format!(
                    "character-string is {} bytes (max {MAX_TXT_SEGMENT_LEN})",
                    segment.len()
                )));
            }
            if segment.chars().any(|c| c.is_ascii_control() || !c.is_ascii()) {
                return Err(invalid("only printable ASCII is allowed".to_string()));
            }
        }
        Ok(Self::Txt(segments))
    }

    /// The record type this data belongs to.
    #[must_use]
    pub fn record_type(&self) -> RecordType {
        match self {
            Self::A(_) => RecordType::A,
            Self::Aaaa(_) => RecordType::Aaaa,
            Self::Cname(_) => RecordType::Cname,
            Self::Mx { .. } => RecordType::Mx,
            Self::Ns(_) => RecordType::Ns,
            Self::Ptr(_) => RecordType::Ptr,
            Self::Srv { .. } => RecordType::Srv,
            Self::Txt(_) => RecordType::Txt,
        }
    }

    /// Render the data in presentation format, as it appears after the type
    /// in an `update add` line.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::A(ip) => ip.to_string(),
            Self::Aaaa(ip) => ip.to_string(),
            Self::Cname(name) | Self::Ns(name) | Self::Ptr(name) => name.to_ascii(),
            Self::Mx {
                preference,
                exchange,
            } => format!("{preference} {}", exchange.to_ascii()),
            Self::Srv {
                priority,
                weight,
                port,
                target,
            } => format!("{priority} {weight} {port} {}", target.to_ascii()),
            Self::Txt(segments) => segments
                .iter()
                .map(|s| quote_txt_segment(s))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    /// Convert into hickory record data for the wire.
    #[must_use]
    pub fn to_rdata(&self) -> RData {
        match self {
            Self::A(ip) => RData::A((*ip).into()),
            Self::Aaaa(ip) => RData::AAAA((*ip).into()),
            Self::Cname(name) => RData::CNAME(rdata::CNAME(name.clone())),
            Self::Ns(name) => RData::NS(rdata::NS(name.clone())),
            Self::Ptr(name) => RData::PTR(rdata::PTR(name.clone())),
            Self::Mx {
                preference,
                exchange,
            } => RData::MX(rdata::MX::new(*preference, exchange.clone())),
            Self::Srv {
                priority,
                weight,
                port,
                target,
            } => RData::SRV(rdata::SRV::new(*priority, *weight, *port, target.clone())),
            Self::Txt(segments) => RData::TXT(rdata::TXT::new(segments.clone())),
        }
    }
}

fn single_name(value: &str, zone: &Name) -> Result<Name, String> {
    if value.is_empty() {
        return Err("expected a domain name".to_string());
    }
    qualify_target(value, zone)
}

fn parse_u16(field: &str, token: &str) -> Result<u16, String> {
    token
        .parse::<u16>()
        .map_err(|_| format!("{field} must be an integer between 0 and 65535"))
}

fn parse_mx(value: &str, zone: &Name) -> Result<RecordData, String> {
    let tokens: Vec<&str> = value.split(' ').filter(|t| !t.is_empty()).collect();
    let (preference, exchange) = match tokens.as_slice() {
        [exchange] => (DEFAULT_MX_PREFERENCE, *exchange),
        [preference, exchange] => (parse_u16("preference", preference)?, *exchange),
        _ => return Err("expected '[preference] exchange'".to_string()),
    };
    Ok(RecordData::Mx {
        preference,
        exchange: qualify_target(exchange, zone)?,
    })
}

fn parse_srv(value: &str, zone: &Name) -> Result<RecordData, String> {
    let tokens: Vec<&str> = value.split(' ').filter(|t| !t.is_empty()).collect();
    let [priority, weight, port, target] = tokens.as_slice() else {
        return Err("expected 'priority weight port target'".to_string());
    };
    Ok(RecordData::Srv {
        priority: parse_u16("priority", priority)?,
        weight: parse_u16("weight", weight)?,
        port: parse_u16("port", port)?,
        target: qualify_target(target, zone)?,
    })
}

fn parse_txt(value: &str) -> Result<Vec<String>, String> {
    if value.len() > MAX_TXT_VALUE_LEN {
        return Err(format!(
            "value is {} bytes (max {MAX_TXT_VALUE_LEN})",
            value.len()
        ));
    }
    if value.is_empty() {
        return Ok(vec![String::new()]);
    }
    // Input is ASCII at this point, so byte chunks are char boundaries.
    Ok(value
        .as_bytes()
        .chunks(MAX_TXT_SEGMENT_LEN)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect())
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod record_tests;
