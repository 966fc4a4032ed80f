// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! TSIG signing keys for authenticated dynamic updates.
//!
//! Keys use the BIND key-file format consumed by `nsupdate -k` and `named.conf`:
//!
//! ```text
//! key "update-key" {
//!     algorithm hmac-sha256;
//!     secret "base64secret==";
//! };
//! ```
//!
//! A key is loaded once at startup and shared read-only between all updates.

use crate::constants::{TSIG_FUDGE_TIME_SECS, TSIG_GENERATED_KEY_BYTES};
use crate::dns_errors::KeyError;
use crate::record::check_key_name;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hickory_client::rr::rdata::tsig::TsigAlgorithm;
use hickory_client::rr::Name;
use hickory_proto::rr::dnssec::tsig::TSigner;
use rand::Rng;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// HMAC algorithms supported for TSIG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAlgorithm {
    /// HMAC-MD5 (legacy)
    HmacMd5,
    /// HMAC-SHA1
    HmacSha1,
    /// HMAC-SHA224
    HmacSha224,
    /// HMAC-SHA256
    HmacSha256,
    /// HMAC-SHA384
    HmacSha384,
    /// HMAC-SHA512
    HmacSha512,
}

impl KeyAlgorithm {
    /// Algorithm name as written in BIND key files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HmacMd5 => "hmac-md5",
            Self::HmacSha1 => "hmac-sha1",
            Self::HmacSha224 => "hmac-sha224",
            Self::HmacSha256 => "hmac-sha256",
            Self::HmacSha384 => "hmac-sha384",
            Self::HmacSha512 => "hmac-sha512",
        }
    }

    fn to_hickory(self) -> TsigAlgorithm {
        match self {
            Self::HmacMd5 => TsigAlgorithm::HmacMd5,
            Self::HmacSha1 => TsigAlgorithm::HmacSha1,
            Self::HmacSha224 => TsigAlgorithm::HmacSha224,
            Self::HmacSha256 => TsigAlgorithm::HmacSha256,
            Self::HmacSha384 => TsigAlgorithm::HmacSha384,
            Self::HmacSha512 => TsigAlgorithm::HmacSha512,
        }
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyAlgorithm {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hmac-md5" | "hmac-md5.sig-alg.reg.int" => Ok(Self::HmacMd5),
            "hmac-sha1" => Ok(Self::HmacSha1),
            "hmac-sha224" => Ok(Self::HmacSha224),
            "hmac-sha256" => Ok(Self::HmacSha256),
            "hmac-sha384" => Ok(Self::HmacSha384),
            "hmac-sha512" => Ok(Self::HmacSha512),
            _ => Err(KeyError::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

/// TSIG key material used to sign updates.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey {
    /// Key name, as configured on the server
    pub name: String,
    /// HMAC algorithm
    pub algorithm: KeyAlgorithm,
    /// Base64-encoded secret
    pub secret: String,
}

// The secret must never reach logs.
impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("name", &self.name)
            .field("algorithm", &self.algorithm)
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl SigningKey {
    /// Generate a new key with a random 256-bit secret.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidName`] if `name` is not a valid DNS name.
    pub fn generate(name: &str, algorithm: KeyAlgorithm) -> Result<Self, KeyError> {
        check_name(name)?;
        let mut rng = rand::thread_rng();
        let mut key_bytes = [0u8; TSIG_GENERATED_KEY_BYTES];
        rng.fill(&mut key_bytes);

        Ok(Self {
            name: name.to_string(),
            algorithm,
            secret: BASE64.encode(key_bytes),
        })
    }

    /// Read and parse a BIND key file, then check that a signer can be built.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::Io`] if the file cannot be read, or any parsing and
    /// signer error from [`SigningKey::parse_key_file`] and [`SigningKey::signer`].
    pub fn from_key_file(path: &Path) -> Result<Self, KeyError> {
        let content = std::fs::read_to_string(path).map_err(|e| KeyError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let key = Self::parse_key_file(&content)?;
        key.signer()?;
        Ok(key)
    }

    /// Parse a BIND key file (`key "name" { algorithm ...; secret "..."; };`).
    ///
    /// Both the multi-line and single-line layouts are accepted. Lines starting
    /// with `#` or `//` are comments.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::Parse`] if the statement is malformed or a field is
    /// missing, [`KeyError::UnsupportedAlgorithm`] for unknown algorithms, and
    /// [`KeyError::InvalidSecret`] if the secret is not base64.
    pub fn parse_key_file(content: &str) -> Result<Self, KeyError> {
        let text = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.starts_with('#') && !line.starts_with("//"))
            .collect::<Vec<_>>()
            .join(" ");

        let after_key = text
            .trim_start()
            .strip_prefix("key")
            .ok_or_else(|| KeyError::Parse("expected a 'key' statement".to_string()))?;
        let open = after_key
            .find('{')
            .ok_or_else(|| KeyError::Parse("missing '{' after key name".to_string()))?;
        let close = after_key
            .rfind('}')
            .filter(|close| *close > open)
            .ok_or_else(|| KeyError::Parse("missing '}' closing the key".to_string()))?;

        let name = after_key[..open].trim().trim_matches('"').to_string();
        if name.is_empty() {
            return Err(KeyError::Parse("key name is empty".to_string()));
        }
        check_name(&name)?;

        let mut algorithm = None;
        let mut secret = None;
        for statement in after_key[open + 1..close].split(';') {
            let Some((keyword, value)) = statement.trim().split_once(char::is_whitespace) else {
                continue;
            };
            let value = value.trim().trim_matches('"');
            match keyword {
                "algorithm" => algorithm = Some(value.parse::<KeyAlgorithm>()?),
                "secret" => secret = Some(value.to_string()),
                _ => {}
            }
        }

        let key = Self {
            algorithm: algorithm
                .ok_or_else(|| KeyError::Parse(format!("key '{name}' has no algorithm")))?,
            secret: secret.ok_or_else(|| KeyError::Parse(format!("key '{name}' has no secret")))?,
            name,
        };
        key.decoded_secret()?;
        Ok(key)
    }

    /// Render the key in BIND key-file format.
    #[must_use]
    pub fn to_key_file(&self) -> String {
        format!(
            "key \"{}\" {{\n    algorithm {};\n    secret \"{}\";\n}};\n",
            self.name,
            self.algorithm.as_str(),
            self.secret
        )
    }

    /// Create a TSIG signer from this key.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret is invalid or the key name is not a
    /// valid DNS name.
    pub fn signer(&self) -> Result<TSigner, KeyError> {
        let key_bytes = self.decoded_secret()?;
        let signer_name = Name::from_str(&self.name).map_err(|e| KeyError::Signer {
            key_name: self.name.clone(),
            reason: format!("invalid key name: {e}"),
        })?;

        TSigner::new(
            key_bytes,
            self.algorithm.to_hickory(),
            signer_name,
            TSIG_FUDGE_TIME_SECS,
        )
        .map_err(|e| KeyError::Signer {
            key_name: self.name.clone(),
            reason: e.to_string(),
        })
    }

    fn decoded_secret(&self) -> Result<Vec<u8>, KeyError> {
        let bytes = BASE64
            .decode(self.secret.as_bytes())
            .map_err(|e| KeyError::InvalidSecret {
                key_name: self.name.clone(),
                reason: e.to_string(),
            })?;
        if bytes.is_empty() {
            return Err(KeyError::InvalidSecret {
                key_name: self.name.clone(),
                reason: "secret is empty".to_string(),
            });
        }
        Ok(bytes)
    }
}

// Key names are rendered inside quotes in key files.
fn check_name(name: &str) -> Result<(), KeyError> {
    check_key_name(name).map_err(|reason| KeyError::InvalidName {
        key_name: name.to_string(),
        reason,
    })
}

#[cfg(test)]
#[path = "tsig_tests.rs"]
mod tsig_tests;
