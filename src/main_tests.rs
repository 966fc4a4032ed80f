// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `main.rs` - command-line parsing

#[cfg(test)]
mod tests {
    use crate::{Cli, Command};
    use clap::Parser;
    use ddnsgate::tsig::KeyAlgorithm;

    const GATEWAY: [&str; 4] = ["--server", "10.0.0.2", "--zone", "example.test"];

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        let mut argv = vec!["ddnsgate"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv)
    }

    #[test]
    fn test_add_command() {
        let mut args = vec!["add"];
        args.extend_from_slice(&GATEWAY);
        args.extend_from_slice(&["www", "A", "10.0.0.5", "--ttl", "120"]);

        match parse(&args).unwrap().command {
            Command::Add {
                gateway,
                record,
                ttl,
            } => {
                assert_eq!(gateway.server, "10.0.0.2");
                assert_eq!(record.name, "www");
                assert_eq!(record.record_type, "A");
                assert_eq!(record.value, "10.0.0.5");
                assert_eq!(ttl, Some(120));
            }
            other => panic!("expected add, got {other:?}"),
        }
    }

    #[test]
    fn test_render_delete_command() {
        let mut args = vec!["render", "--delete"];
        args.extend_from_slice(&GATEWAY);
        args.extend_from_slice(&["www", "TXT", "hello world"]);

        match parse(&args).unwrap().command {
            Command::Render { record, delete, .. } => {
                assert!(delete);
                assert_eq!(record.value, "hello world");
            }
            other => panic!("expected render, got {other:?}"),
        }
    }

    #[test]
    fn test_serve_default_listen_address() {
        let mut args = vec!["serve"];
        args.extend_from_slice(&GATEWAY);

        match parse(&args).unwrap().command {
            Command::Serve { listen, .. } => {
                assert_eq!(listen.to_string(), "0.0.0.0:3000");
            }
            other => panic!("expected serve, got {other:?}"),
        }
    }

    #[test]
    fn test_keygen_algorithm() {
        match parse(&["keygen", "update-key"]).unwrap().command {
            Command::Keygen { name, algorithm } => {
                assert_eq!(name, "update-key");
                assert_eq!(algorithm, KeyAlgorithm::HmacSha256);
            }
            other => panic!("expected keygen, got {other:?}"),
        }

        match parse(&["keygen", "k", "--algorithm", "hmac-sha512"])
            .unwrap()
            .command
        {
            Command::Keygen { algorithm, .. } => assert_eq!(algorithm, KeyAlgorithm::HmacSha512),
            other => panic!("expected keygen, got {other:?}"),
        }

        assert!(parse(&["keygen", "k", "--algorithm", "hmac-foo"]).is_err());
    }

    #[test]
    fn test_missing_record_arguments_fail() {
        let mut args = vec!["add"];
        args.extend_from_slice(&GATEWAY);
        args.push("www");

        assert!(parse(&args).is_err());
    }
}
