//! Property-based tests for the identifier codec, datestamps and XML text.
//!
//! These tests verify that decode(encode(x)) == x for random inputs.

mod common;

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use common::BASE;
use oai_records::sets::is_valid_set_spec;
use oai_records::{
    format_datestamp, parse_datestamp, FieldSetResolver, IdentifierCodec, Item, OaiError,
    SetSpecResolver, XmlElement,
};
use proptest::prelude::*;

const LOCAL_ID: &str = "[A-Za-z0-9\\-_.!~*'();/?:@&=+$,%]{1,40}";

fn codec() -> IdentifierCodec {
    IdentifierCodec::new(BASE).unwrap()
}

// 0000-01-01T00:00:00Z and 9999-12-31T23:59:59Z as Unix seconds.
const FIRST_SECOND: i64 = -62_167_219_200;
const LAST_SECOND: i64 = 253_402_300_799;

fn at(seconds: i64, nanos: u32, offset: i32) -> DateTime<FixedOffset> {
    let utc = Utc.timestamp_opt(seconds, nanos).unwrap();
    utc.with_timezone(&FixedOffset::east_opt(offset).unwrap())
}

// Any instant in years 0000-9999, any offset within +/- 14h.
fn timestamp() -> impl Strategy<Value = DateTime<FixedOffset>> {
    (
        FIRST_SECOND..=LAST_SECOND,
        0u32..1_000_000_000,
        -50_400i32..=50_400,
    )
        .prop_map(|(seconds, nanos, offset)| at(seconds, nanos, offset))
}

// Instants just outside the four-digit year range.
fn out_of_range_timestamp() -> impl Strategy<Value = DateTime<FixedOffset>> {
    prop_oneof![
        (FIRST_SECOND - 10_000_000..FIRST_SECOND),
        (LAST_SECOND + 1..LAST_SECOND + 10_000_000),
    ]
    .prop_map(|seconds| at(seconds, 0, 0))
}

proptest! {
    #[test]
    fn identifier_roundtrip(local_id in LOCAL_ID) {
        let codec = codec();
        let encoded = codec.encode(&local_id).unwrap();
        prop_assert!(encoded.as_str().starts_with("oai:library.example.org:"));
        prop_assert_eq!(codec.decode(encoded.as_str()).unwrap(), local_id.as_str());
    }

    #[test]
    fn numeric_identifier_roundtrip(local_id in any::<u64>()) {
        let codec = codec();
        let encoded = codec.encode_numeric(local_id);
        prop_assert_eq!(codec.decode_numeric(encoded.as_str()).unwrap(), local_id);
    }

    #[test]
    fn local_ids_with_whitespace_rejected(head in LOCAL_ID, tail in LOCAL_ID) {
        let local_id = format!("{head} {tail}");
        prop_assert!(codec().encode(&local_id).is_err());
    }

    #[test]
    fn datestamp_roundtrip_truncates_to_seconds(value in timestamp()) {
        let formatted = format_datestamp(&value).unwrap();
        prop_assert_eq!(formatted.len(), 20);
        prop_assert!(formatted.ends_with('Z'));

        let parsed = parse_datestamp(&formatted).unwrap();
        prop_assert_eq!(parsed.timestamp(), value.timestamp());
        prop_assert_eq!(format_datestamp(&parsed).unwrap(), formatted);
    }

    #[test]
    fn datestamp_out_of_range_years_rejected(value in out_of_range_timestamp()) {
        prop_assert!(matches!(format_datestamp(&value), Err(OaiError::InvalidDate(_))));
    }

    #[test]
    fn datestamp_with_padded_field_rejected(
        position in 0usize..20,
        pad in prop::sample::select(vec![" ", "+", "-"])
    ) {
        let mut value = "2020-01-02T03:04:05Z".to_string();
        value.replace_range(position..=position, pad);
        if value != "2020-01-02T03:04:05Z" {
            prop_assert!(
                matches!(parse_datestamp(&value), Err(OaiError::InvalidDate(_))),
                "accepted {:?}",
                value
            );
        }
    }

    #[test]
    fn text_survives_serialization(
        text in "[ a-zA-Z0-9&<>\"']{1,32}".prop_filter("not blank", |s| !s.trim().is_empty())
    ) {
        let element = XmlElement::with_text("dc:title", text.clone())
            .with_attribute("note", text.clone());
        let xml = element.to_xml_string().unwrap();
        if text.contains('"') {
            prop_assert!(xml.contains("&quot;"));
        }

        let parsed = XmlElement::parse(&xml).unwrap();
        prop_assert_eq!(parsed.text(), text.clone());
        prop_assert_eq!(parsed.attribute("note"), Some(text.as_str()));
    }

    #[test]
    fn field_resolver_emits_only_valid_specs(values in prop::collection::vec("[ -~]{0,12}", 0..8)) {
        let mut item = Item::new("1", common::created());
        for value in &values {
            item.add_value("dcterms:type", oai_records::FieldValue::literal(value.as_str()));
        }

        let resolver = FieldSetResolver::new("dcterms:type").with_parent("type");
        for spec in resolver.list_set_specs(&item) {
            prop_assert!(is_valid_set_spec(&spec), "invalid spec {}", spec);
        }
    }
}
