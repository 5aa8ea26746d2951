//! Parsing of lite-server config documents
//!
//! Two shapes are accepted:
//! - a TON global config object whose `liteservers` array holds entries of
//!   the form `{"ip": <signed int32>, "port": n, "id": {"@type": "pub.ed25519", "key": "<base64>"}}`
//! - a bare JSON array of such entries, where `host` may replace `ip` and
//!   `public_key` may replace `id`
//!
//! Validation is structural only. A document either yields every endpoint
//! in document order or fails as a whole.

use crate::{
    error::{AppError, Result},
    models::{EndpointDescriptor, PublicKey},
};
use serde::Deserialize;
use serde_json::Value;
use std::net::Ipv4Addr;

const ED25519_KEY_TYPE: &str = "pub.ed25519";

#[derive(Debug, Deserialize)]
struct RawLiteServer {
    #[serde(default)]
    ip: Option<i64>,
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    port: Option<u16>,
    #[serde(default)]
    id: Option<RawKeyId>,
    #[serde(default)]
    public_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawKeyId {
    #[serde(rename = "@type", default)]
    kind: Option<String>,
    key: String,
}

/// Parse a config document from text
pub fn parse_document(text: &str) -> Result<Vec<EndpointDescriptor>> {
    let value: Value = serde_json::from_str(text)?;
    parse_value(&value)
}

/// Parse an already decoded config document
pub fn parse_value(value: &Value) -> Result<Vec<EndpointDescriptor>> {
    let (entries, prefix) = match value {
        Value::Array(entries) => (entries, ""),
        Value::Object(map) => match map.get("liteservers") {
            Some(Value::Array(entries)) => (entries, "liteservers"),
            Some(_) => return Err(AppError::config_parse("`liteservers` must be an array")),
            None => return Err(AppError::config_parse("missing field `liteservers`")),
        },
        _ => {
            return Err(AppError::config_parse(
                "expected a JSON object with `liteservers` or a JSON array",
            ))
        }
    };

    if entries.is_empty() {
        return Err(AppError::config_parse("no lite-servers listed"));
    }

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            parse_entry(entry)
                .map_err(|reason| AppError::config_parse(format!("{}[{}]: {}", prefix, index, reason)))
        })
        .collect()
}

fn parse_entry(entry: &Value) -> std::result::Result<EndpointDescriptor, String> {
    if !entry.is_object() {
        return Err("expected an object".to_string());
    }

    let raw: RawLiteServer = RawLiteServer::deserialize(entry).map_err(|e| e.to_string())?;

    let host = match (raw.host, raw.ip) {
        (Some(host), _) if !host.trim().is_empty() => host.trim().to_string(),
        (Some(_), _) => return Err("field `host` is empty".to_string()),
        (None, Some(ip)) => decode_ip(ip)?.to_string(),
        (None, None) => return Err("missing field `ip` or `host`".to_string()),
    };

    let port = match raw.port {
        Some(0) => return Err("field `port` must be non-zero".to_string()),
        Some(port) => port,
        None => return Err("missing field `port`".to_string()),
    };

    let encoded_key = match (raw.id, raw.public_key) {
        (Some(id), _) => {
            if let Some(kind) = id.kind.as_deref() {
                if kind != ED25519_KEY_TYPE {
                    return Err(format!("unsupported key type `{}` in `id`", kind));
                }
            }
            id.key
        }
        (None, Some(key)) => key,
        (None, None) => return Err("missing field `id` or `public_key`".to_string()),
    };

    let public_key = PublicKey::from_base64(&encoded_key).map_err(|e| format!("public key: {}", e))?;

    Ok(EndpointDescriptor::new(host, port, public_key))
}

/// Global configs store IPv4 addresses as signed 32-bit integers
fn decode_ip(ip: i64) -> std::result::Result<Ipv4Addr, String> {
    if ip < i64::from(i32::MIN) || ip > i64::from(u32::MAX) {
        return Err(format!("field `ip` out of range: {}", ip));
    }
    Ok(Ipv4Addr::from(ip as u32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const KEY: &str = "n4VDnSCUuSpjnCyUk9e3QOOd6o0ItSWYbTnW3Wnn8wk=";

    #[test]
    fn test_global_config_shape() {
        let doc = format!(
            r#"{{
                "@type": "config.global",
                "liteservers": [
                    {{"ip": 84478511, "port": 19949, "id": {{"@type": "pub.ed25519", "key": "{KEY}"}}}},
                    {{"ip": -2018135749, "port": 53312, "id": {{"@type": "pub.ed25519", "key": "{KEY}"}}}}
                ]
            }}"#
        );

        let endpoints = parse_document(&doc).unwrap();
        assert_eq!(endpoints.len(), 2);
        assert_eq!(endpoints[0].host, "5.9.10.47");
        assert_eq!(endpoints[0].port, 19949);
        assert_eq!(endpoints[1].host, "135.181.177.59");
        assert_eq!(endpoints[1].public_key.to_base64(), KEY);
    }

    #[test]
    fn test_array_shape_with_host_and_public_key() {
        let doc = format!(
            r#"[
                {{"host": "ls1.example.org", "port": 3000, "public_key": "{KEY}"}},
                {{"host": "10.0.0.2", "port": 3001, "public_key": "{KEY}"}}
            ]"#
        );

        let endpoints = parse_document(&doc).unwrap();
        assert_eq!(endpoints[0].host, "ls1.example.org");
        assert_eq!(endpoints[1].address(), "10.0.0.2:3001");
    }

    #[test]
    fn test_missing_port_names_entry_and_field() {
        let doc = format!(r#"{{"liteservers": [{{"ip": 1, "id": {{"key": "{KEY}"}}}}]}}"#);
        let err = parse_document(&doc).unwrap_err();
        assert!(matches!(err, AppError::ConfigParse(_)));
        assert!(err.to_string().contains("liteservers[0]: missing field `port`"));
    }

    #[test]
    fn test_missing_key_rejected() {
        let err = parse_document(r#"[{"host": "a", "port": 1}]"#).unwrap_err();
        assert!(err.to_string().contains("[0]: missing field `id` or `public_key`"));
    }

    #[test]
    fn test_wrong_key_type_rejected() {
        let doc = format!(r#"[{{"ip": 1, "port": 1, "id": {{"@type": "pub.aes", "key": "{KEY}"}}}}]"#);
        let err = parse_document(&doc).unwrap_err();
        assert!(err.to_string().contains("unsupported key type `pub.aes`"));
    }

    #[test]
    fn test_wrong_port_type_rejected() {
        let doc = format!(r#"[{{"ip": 1, "port": "3000", "public_key": "{KEY}"}}]"#);
        assert!(matches!(parse_document(&doc), Err(AppError::ConfigParse(_))));
    }

    #[test]
    fn test_empty_list_rejected() {
        assert!(matches!(parse_document(r#"{"liteservers": []}"#), Err(AppError::ConfigParse(_))));
        assert!(matches!(parse_document("[]"), Err(AppError::ConfigParse(_))));
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(matches!(parse_document("{\"liteservers\": ["), Err(AppError::ConfigParse(_))));
        assert!(matches!(parse_document("42"), Err(AppError::ConfigParse(_))));
    }

    #[test]
    fn test_one_bad_entry_fails_whole_document() {
        let doc = format!(
            r#"[{{"ip": 1, "port": 1, "public_key": "{KEY}"}}, {{"ip": 2, "port": 2, "public_key": "short"}}]"#
        );
        let err = parse_document(&doc).unwrap_err();
        assert!(err.to_string().contains("[1]: public key"));
    }

    #[test]
    fn test_ip_range() {
        assert_eq!(decode_ip(-1).unwrap(), Ipv4Addr::new(255, 255, 255, 255));
        assert_eq!(decode_ip(i64::from(u32::MAX)).unwrap(), Ipv4Addr::new(255, 255, 255, 255));
        assert!(decode_ip(i64::from(u32::MAX) + 1).is_err());
        assert!(decode_ip(i64::from(i32::MIN) - 1).is_err());
    }

    proptest! {
        /// Arbitrary text never panics and never yields an empty success
        #[test]
        fn arbitrary_text_never_yields_empty_list(text in ".{0,200}") {
            if let Ok(endpoints) = parse_document(&text) {
                prop_assert!(!endpoints.is_empty());
            }
        }

        /// Entries come back in document order
        #[test]
        fn order_is_preserved(ports in proptest::collection::vec(1u16..=u16::MAX, 1..20)) {
            let entries: Vec<String> = ports
                .iter()
                .map(|p| format!(r#"{{"host": "h{p}", "port": {p}, "public_key": "{KEY}"}}"#))
                .collect();
            let doc = format!("[{}]", entries.join(","));
            let endpoints = parse_document(&doc).unwrap();
            let parsed: Vec<u16> = endpoints.iter().map(|e| e.port).collect();
            prop_assert_eq!(parsed, ports);
        }
    }
}
