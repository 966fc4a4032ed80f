// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

// Common test utilities for integration tests

use ddnsgate::service::RecordService;
use ddnsgate::transaction::UpdateTransactionBuilder;
use ddnsgate::transport::{HickoryTransport, Protocol};
use ddnsgate::tsig::SigningKey;
use hickory_client::client::{Client, SyncClient};
use hickory_client::rr::{DNSClass, Name, RData, RecordType};
use hickory_client::udp::UdpClientConnection;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Connection settings for a real BIND9 server, taken from `DDNS_*` variables.
pub struct Bind9Target {
    pub server: String,
    pub port: u16,
    pub zone: String,
    pub key: SigningKey,
}

/// Read the target server from the environment or skip the test if unset
pub fn bind9_target_or_skip() -> Option<Bind9Target> {
    let (Ok(server), Ok(zone), Ok(key_file)) = (
        std::env::var("DDNS_SERVER"),
        std::env::var("DDNS_ZONE"),
        std::env::var("DDNS_KEY_FILE"),
    ) else {
        eprintln!("Skipping integration test: DDNS_SERVER, DDNS_ZONE and DDNS_KEY_FILE must be set");
        return None;
    };

    let port = std::env::var("DDNS_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(53);
    let key = SigningKey::from_key_file(Path::new(&key_file)).expect("key file loads");

    Some(Bind9Target {
        server,
        port,
        zone,
        key,
    })
}

impl Bind9Target {
    /// Record service using `key` instead of the configured one
    pub fn service_with_key(&self, key: SigningKey) -> RecordService<HickoryTransport> {
        RecordService::new(
            UpdateTransactionBuilder::new(&self.server, self.port, &self.zone, 60)
                .expect("target configuration is valid"),
            Arc::new(key),
            HickoryTransport::new(Protocol::Udp),
            Duration::from_secs(5),
        )
    }

    /// Record service using the configured key
    pub fn service(&self) -> RecordService<HickoryTransport> {
        self.service_with_key(self.key.clone())
    }

    fn address(&self) -> SocketAddr {
        (self.server.as_str(), self.port)
            .to_socket_addrs()
            .expect("server resolves")
            .next()
            .expect("server has an address")
    }

    /// Query `fqdn` directly on the server and return the answers of `record_type`
    pub fn lookup(&self, fqdn: &str, record_type: RecordType) -> Vec<RData> {
        let conn = UdpClientConnection::new(self.address()).expect("udp connection");
        let client = SyncClient::new(conn);
        let name = Name::from_ascii(fqdn).expect("valid name");
        let response = client
            .query(&name, DNSClass::IN, record_type)
            .expect("query succeeds");

        response
            .answers()
            .iter()
            .filter_map(|record| record.data().cloned())
            .collect()
    }
}
