use serde_json::Value;
use sha2::{Digest, Sha256};

use super::CacheScope;

/// Hex SHA-256 of the request's canonical JSON. SERP fingerprints are
/// prefixed with the engine so identical parameters never collide across engines.
pub fn fingerprint(scope: CacheScope, params: &Value) -> String {
    let body = canonical_json(params);
    let input = match scope {
        CacheScope::Serp(engine) => format!("{engine}:{body}"),
        CacheScope::Site => body,
    };
    hex::encode(Sha256::digest(input.as_bytes()))
}

/// Compact JSON with object keys sorted at every level.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, value)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(value, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use harvest_common::SearchEngine;
    use serde_json::json;

    use super::*;

    #[test]
    fn field_order_does_not_matter() {
        let a: Value = serde_json::from_str(
            r#"{"queries": ["a", "b"], "locale": "ru-RU", "opts": {"x": 1, "y": [1, {"k": 2, "j": 3}]}}"#,
        )
        .unwrap();
        let b: Value = serde_json::from_str(
            r#"{"opts": {"y": [1, {"j": 3, "k": 2}], "x": 1}, "locale": "ru-RU", "queries": ["a", "b"]}"#,
        )
        .unwrap();
        assert_eq!(fingerprint(CacheScope::Site, &a), fingerprint(CacheScope::Site, &b));
        assert_eq!(canonical_json(&a), canonical_json(&b));
    }

    #[test]
    fn array_order_does_matter() {
        let a = json!({"queries": ["a", "b"]});
        let b = json!({"queries": ["b", "a"]});
        assert_ne!(fingerprint(CacheScope::Site, &a), fingerprint(CacheScope::Site, &b));
    }

    #[test]
    fn canonical_form_is_compact_and_sorted() {
        let value = json!({"b": 1, "a": {"d": null, "c": "é\"q"}});
        assert_eq!(canonical_json(&value), r#"{"a":{"c":"é\"q","d":null},"b":1}"#);
    }

    #[test]
    fn scope_is_part_of_the_key() {
        let params = json!({"queries": ["rust"]});
        let google = fingerprint(CacheScope::Serp(SearchEngine::Google), &params);
        let yandex = fingerprint(CacheScope::Serp(SearchEngine::Yandex), &params);
        let site = fingerprint(CacheScope::Site, &params);
        assert_ne!(google, yandex);
        assert_ne!(google, site);
        assert_eq!(google.len(), 64);
    }
}
