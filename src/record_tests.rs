// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `record.rs`

use super::*;

fn zone() -> Name {
    parse_zone("example.test").unwrap()
}

// ============================================================================
// RecordType
// ============================================================================

#[test]
fn test_record_type_parse_case_insensitive() {
    assert_eq!("A".parse::<RecordType>().unwrap(), RecordType::A);
    assert_eq!("aaaa".parse::<RecordType>().unwrap(), RecordType::Aaaa);
    assert_eq!("Cname".parse::<RecordType>().unwrap(), RecordType::Cname);
    assert_eq!("txt".parse::<RecordType>().unwrap(), RecordType::Txt);
}

#[test]
fn test_record_type_unsupported() {
    let err = "SOA".parse::<RecordType>().unwrap_err();
    match err {
        ValidationError::UnsupportedType {
            record_type,
            supported,
        } => {
            assert_eq!(record_type, "SOA");
            assert!(supported.contains("AAAA"));
            assert!(supported.contains("SRV"));
        }
        other => panic!("expected UnsupportedType, got {other:?}"),
    }
}

#[test]
fn test_record_type_rejects_injection_in_type() {
    assert!("A 10.0.0.1\nupdate".parse::<RecordType>().is_err());
    assert!("".parse::<RecordType>().is_err());
}

#[test]
fn test_record_type_display_round_trips() {
    for record_type in RecordType::ALL {
        let text = record_type.to_string();
        assert_eq!(text.parse::<RecordType>().unwrap(), record_type);
    }
}

// ============================================================================
// Names
// ============================================================================

#[test]
fn test_parse_zone_accepts_trailing_dot() {
    let with_dot = parse_zone("Example.Test.").unwrap();
    let without = parse_zone("example.test").unwrap();
    assert_eq!(with_dot.to_ascii(), "example.test.");
    assert_eq!(with_dot, without);
}

#[test]
fn test_parse_zone_rejects_root_and_empty() {
    assert!(parse_zone("").is_err());
    assert!(parse_zone(".").is_err());
    assert!(parse_zone("bad zone").is_err());
}

#[test]
fn test_qualify_simple_name() {
    let fqdn = qualify_record_name("www", &zone()).unwrap();
    assert_eq!(fqdn.to_ascii(), "www.example.test.");
}

#[test]
fn test_qualify_lowercases() {
    let fqdn = qualify_record_name("WWW.Api", &zone()).unwrap();
    assert_eq!(fqdn.to_ascii(), "www.api.example.test.");
}

#[test]
fn test_qualify_apex() {
    let fqdn = qualify_record_name("@", &zone()).unwrap();
    assert_eq!(fqdn, zone());
}

#[test]
fn test_qualify_service_labels() {
    let fqdn = qualify_record_name("_acme-challenge", &zone()).unwrap();
    assert_eq!(fqdn.to_ascii(), "_acme-challenge.example.test.");
}

#[test]
fn test_qualify_rejects_empty() {
    assert!(matches!(
        qualify_record_name("", &zone()),
        Err(ValidationError::InvalidName { .. })
    ));
}

#[test]
fn test_qualify_rejects_absolute_name() {
    assert!(qualify_record_name("www.example.test.", &zone()).is_err());
}

#[test]
fn test_qualify_rejects_long_label() {
    let label = "a".repeat(64);
    assert!(qualify_record_name(&label, &zone()).is_err());

    let label = "a".repeat(63);
    assert!(qualify_record_name(&label, &zone()).is_ok());
}

#[test]
fn test_qualify_rejects_long_name() {
    // 4 labels of 63 bytes plus dots is 255 bytes before the zone suffix
    let long = vec!["a".repeat(63); 4].join(".");
    let err = qualify_record_name(&long, &zone()).unwrap_err();
    assert!(err.to_string().contains("max 253") || err.to_string().contains("bytes"));
}

#[test]
fn test_qualify_rejects_bad_characters() {
    for name in ["w w", "www;", "a\nb", "a\"b", "$(reboot)", "a..b", "-www", "www-", "ü"] {
        assert!(
            qualify_record_name(name, &zone()).is_err(),
            "name {name:?} should be rejected"
        );
    }
}

#[test]
fn test_qualify_wildcard_only_leftmost() {
    assert!(qualify_record_name("*", &zone()).is_ok());
    assert!(qualify_record_name("*.dev", &zone()).is_ok());
    assert!(qualify_record_name("dev.*", &zone()).is_err());
    assert!(qualify_record_name("a*b", &zone()).is_err());
}

// ============================================================================
// Record data
// ============================================================================

#[test]
fn test_parse_a() {
    let data = RecordData::parse(RecordType::A, "10.0.0.5", &zone()).unwrap();
    assert_eq!(data, RecordData::A(Ipv4Addr::new(10, 0, 0, 5)));
    assert_eq!(data.render(), "10.0.0.5");
}

#[test]
fn test_parse_a_rejects_non_ip() {
    for value in ["not-an-ip", "10.0.0", "10.0.0.256", " 10.0.0.5", "10.0.0.5 ", "::1"] {
        assert!(
            matches!(
                RecordData::parse(RecordType::A, value, &zone()),
                Err(ValidationError::InvalidValue { .. })
            ),
            "value {value:?} should be rejected"
        );
    }
}

#[test]
fn test_parse_aaaa_normalizes() {
    let data = RecordData::parse(RecordType::Aaaa, "2001:DB8:0:0:0:0:0:1", &zone()).unwrap();
    assert_eq!(data.render(), "2001:db8::1");
    assert!(RecordData::parse(RecordType::Aaaa, "10.0.0.1", &zone()).is_err());
}

#[test]
fn test_parse_cname_relative_and_absolute() {
    let relative = RecordData::parse(RecordType::Cname, "web", &zone()).unwrap();
    assert_eq!(relative.render(), "web.example.test.");

    let absolute = RecordData::parse(RecordType::Cname, "cdn.other.net.", &zone()).unwrap();
    assert_eq!(absolute.render(), "cdn.other.net.");
}

#[test]
fn test_parse_cname_rejects_garbage() {
    assert!(RecordData::parse(RecordType::Cname, "", &zone()).is_err());
    assert!(RecordData::parse(RecordType::Cname, "two words", &zone()).is_err());
    assert!(RecordData::parse(RecordType::Cname, "a;b", &zone()).is_err());
}

#[test]
fn test_parse_mx_with_and_without_preference() {
    let data = RecordData::parse(RecordType::Mx, "20 mail", &zone()).unwrap();
    assert_eq!(data.render(), "20 mail.example.test.");

    let data = RecordData::parse(RecordType::Mx, "mail.example.test.", &zone()).unwrap();
    assert_eq!(data.render(), "10 mail.example.test.");

    assert!(RecordData::parse(RecordType::Mx, "high mail", &zone()).is_err());
    assert!(RecordData::parse(RecordType::Mx, "1 2 3", &zone()).is_err());
}

#[test]
fn test_parse_srv() {
    let data = RecordData::parse(RecordType::Srv, "10 5 5060 sip", &zone()).unwrap();
    assert_eq!(data.render(), "10 5 5060 sip.example.test.");
    assert!(RecordData::parse(RecordType::Srv, "10 5 sip", &zone()).is_err());
    assert!(RecordData::parse(RecordType::Srv, "10 5 70000 sip", &zone()).is_err());
}

#[test]
fn test_parse_txt_quotes_on_render() {
    let data = RecordData::parse(RecordType::Txt, "v=spf1 mx ~all", &zone()).unwrap();
    assert_eq!(data.render(), "\"v=spf1 mx ~all\"");
}

#[test]
fn test_parse_txt_escapes_metacharacters() {
    let data = RecordData::parse(RecordType::Txt, r#"say "hi"; \o/"#, &zone()).unwrap();
    assert_eq!(data.render(), r#""say \"hi\"\; \\o/""#);
}

#[test]
fn test_parse_txt_rejects_control_characters() {
    for value in ["a\nb", "a\rb", "a\tb", "a\u{7f}b", "a\0b"] {
        assert!(
            RecordData::parse(RecordType::Txt, value, &zone()).is_err(),
            "value {value:?} should be rejected"
        );
    }
}

#[test]
fn test_parse_txt_rejects_non_ascii() {
    assert!(RecordData::parse(RecordType::Txt, "café", &zone()).is_err());
}

#[test]
fn test_parse_txt_splits_long_values() {
    let value = "x".repeat(600);
    let data = RecordData::parse(RecordType::Txt, &value, &zone()).unwrap();
    match &data {
        RecordData::Txt(segments) => {
            assert_eq!(segments.len(), 3);
            assert_eq!(segments[0].len(), 255);
            assert_eq!(segments[1].len(), 255);
            assert_eq!(segments[2].len(), 90);
        }
        other => panic!("expected TXT, got {other:?}"),
    }
}

#[test]
fn test_parse_txt_rejects_oversized_values() {
    let value = "x".repeat(MAX_TXT_VALUE_LEN + 1);
    assert!(RecordData::parse(RecordType::Txt, &value, &zone()).is_err());
}

#[test]
fn test_txt_quote_unquote_round_trip() {
    let segments = vec![r#"a "quoted" \ value;"#.to_string(), String::new()];
    let rendered = RecordData::Txt(segments.clone()).render();
    assert_eq!(unquote_txt_segments(&rendered).unwrap(), segments);
}

#[test]
fn test_unquote_rejects_broken_input() {
    assert!(unquote_txt_segments("unquoted").is_err());
    assert!(unquote_txt_segments("\"open").is_err());
    assert!(unquote_txt_segments("\"a\"b").is_err());
    assert!(unquote_txt_segments("").is_err());
    assert!(unquote_txt_segments("\"a\\").is_err());
}

#[test]
fn test_parse_rendered_txt() {
    let data = RecordData::parse_rendered(RecordType::Txt, r#""a\;b" "c""#, &zone()).unwrap();
    assert_eq!(data, RecordData::Txt(vec!["a;b".to_string(), "c".to_string()]));
}

#[test]
fn test_to_rdata_matches_type() {
    let cases = [
        (RecordType::A, "192.0.2.1"),
        (RecordType::Aaaa, "2001:db8::1"),
        (RecordType::Cname, "web"),
        (RecordType::Mx, "10 mail"),
        (RecordType::Ns, "ns1"),
        (RecordType::Ptr, "host"),
        (RecordType::Srv, "0 0 443 web"),
        (RecordType::Txt, "hello"),
    ];
    for (record_type, value) in cases {
        let data = RecordData::parse(record_type, value, &zone()).unwrap();
        assert_eq!(data.record_type(), record_type);
        assert_eq!(
            data.to_rdata().record_type().to_string(),
            record_type.as_str()
        );
    }
}
