pub mod error;

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Serialize;

use error::*;

/// Written after every scope part so ("ab", "c") and ("a", "bc") differ
const SCOPE_SEPARATOR: [u8; 1] = [0x1f];

///
/// Generates an MD5 fingerprint over the ordered `scope_parts` followed by
/// the serialized `payload`, base64 encoded.
/// Only meant for change detection, never for integrity.
///
pub fn fingerprint(scope_parts: &[&str], payload: &str) -> String {
    let mut md5_ctx = md5::Context::new();
    for part in scope_parts {
        md5_ctx.consume(part.as_bytes());
        md5_ctx.consume(SCOPE_SEPARATOR);
    }
    md5_ctx.consume(payload.as_bytes());

    STANDARD.encode(md5_ctx.compute().0)
}

///
/// Serializes `records` to JSON and fingerprints the result under the given scope.
/// Record order is part of the payload, so a reordered list yields a new fingerprint.
///
pub fn fingerprint_records<T: Serialize>(scope_parts: &[&str], records: &[T]) -> Result<String> {
    let payload = serde_json::to_string(records)?;
    Ok(fingerprint(scope_parts, &payload))
}

#[cfg(test)]
mod tests {
    use super::{fingerprint, fingerprint_records};

    #[test]
    fn test_fingerprint_is_deterministic() {
        let first = fingerprint(&["1244", "1244"], r#"[{"courseId":"A"}]"#);
        let second = fingerprint(&["1244", "1244"], r#"[{"courseId":"A"}]"#);
        assert_eq!(first, second);
        // 16 byte digest, base64 encoded with padding
        assert_eq!(first.len(), 24);
    }

    #[test]
    fn test_fingerprint_detects_payload_change() {
        let first = fingerprint(&["1244", "1244"], r#"[{"courseId":"A"}]"#);
        let second = fingerprint(&["1244", "1244"], r#"[{"courseId":"B"}]"#);
        assert_ne!(first, second);
    }

    #[test]
    fn test_fingerprint_scope_is_significant() {
        assert_ne!(fingerprint(&["1244", "1244"], "[]"), fingerprint(&["1244", "CS101"], "[]"));
        assert_ne!(fingerprint(&["ab", "c"], "[]"), fingerprint(&["a", "bc"], "[]"));
    }

    #[test]
    fn test_fingerprint_records_is_order_sensitive() {
        let forward = fingerprint_records(&["1244", "1244"], &["A", "B"]).unwrap();
        let reversed = fingerprint_records(&["1244", "1244"], &["B", "A"]).unwrap();
        assert_ne!(forward, reversed);
        assert_eq!(forward, fingerprint(&["1244", "1244"], r#"["A","B"]"#));
    }
}
