//! Opaque cursor token encoding and validation.
//!
//! A cursor is a versioned tuple `(sort field names, sort values)` taken
//! from the last document of a page. It carries everything needed to resume
//! the ordering: the embedded field-name sequence doubles as a sort
//! signature, so a token produced under a different ordering (or a drifted
//! index schema) is detected from the token alone.
//!
//! The encoding is URL-safe base64 over compact JSON. It is obfuscation,
//! not a security boundary: clients must treat the token as opaque, but
//! nothing secret is inside.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CursorError, CursorResult};

use super::sort::SortSpec;

/// Current cursor format version. Bump on any wire-shape change.
const CURSOR_VERSION: u8 = 1;

/// Wire shape of the token payload. Field names are kept short since the
/// token travels on every page request.
#[derive(Debug, Serialize, Deserialize)]
struct CursorPayload {
    /// Format version.
    v: u8,
    /// Index field names of the sort spec that produced the cursor.
    k: Vec<String>,
    /// Sort values of the last document of the previous page.
    s: Vec<Value>,
}

/// A decoded resumption point.
///
/// Created by the pagination executor after a page fetch; consumed at the
/// start of the next request. Never mutated: each page produces a fresh
/// cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct Cursor {
    keys: Vec<String>,
    values: Vec<Value>,
}

impl Cursor {
    /// Build a cursor from the engine-reported sort values of the last
    /// retained document under `spec`.
    pub fn new(values: Vec<Value>, spec: &SortSpec) -> Self {
        Self {
            keys: spec.index_fields().iter().map(|f| f.to_string()).collect(),
            values,
        }
    }

    /// Serialize to the opaque token form.
    pub fn encode(&self) -> CursorResult<String> {
        let payload = CursorPayload {
            v: CURSOR_VERSION,
            k: self.keys.clone(),
            s: self.values.clone(),
        };
        let json = serde_json::to_vec(&payload).map_err(|e| CursorError::Malformed {
            reason: format!("serialization failed: {e}"),
        })?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    /// Parse an opaque token.
    ///
    /// Fails with [`CursorError::Malformed`] when the token is not valid
    /// base64/JSON, carries an unknown version, or has an inconsistent
    /// shape. Compatibility with the current request's ordering is a
    /// separate step; see [`Cursor::verify`].
    pub fn decode(token: &str) -> CursorResult<Self> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token.as_bytes())
            .map_err(|e| CursorError::Malformed {
                reason: format!("invalid base64: {e}"),
            })?;

        let payload: CursorPayload =
            serde_json::from_slice(&bytes).map_err(|e| CursorError::Malformed {
                reason: format!("invalid payload: {e}"),
            })?;

        if payload.v != CURSOR_VERSION {
            return Err(CursorError::Malformed {
                reason: format!("unsupported cursor version {}", payload.v),
            });
        }

        if payload.k.len() != payload.s.len() || payload.k.is_empty() {
            return Err(CursorError::Malformed {
                reason: format!(
                    "inconsistent shape: {} fields, {} values",
                    payload.k.len(),
                    payload.s.len()
                ),
            });
        }

        Ok(Self {
            keys: payload.k,
            values: payload.s,
        })
    }

    /// Check that this cursor was produced under `spec`.
    ///
    /// The embedded field-name sequence must match the spec's index fields
    /// exactly: same names, same order, same count. A mismatch is
    /// [`CursorError::Incompatible`] and is never silently reinterpreted.
    pub fn verify(&self, spec: &SortSpec) -> CursorResult<()> {
        let expected = spec.index_fields();
        if self.keys.len() != expected.len()
            || self.keys.iter().zip(&expected).any(|(a, b)| a != b)
        {
            return Err(CursorError::Incompatible {
                expected: spec.signature(),
                found: self.keys.join(", "),
            });
        }
        Ok(())
    }

    /// The sort values to resume after.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Consume the cursor, yielding the resumption values.
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// The embedded sort signature (index field names).
    pub fn keys(&self) -> &[String] {
        &self.keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::sort::{SortDirection, SortField, SortKey};
    use serde_json::json;

    fn spec() -> SortSpec {
        SortSpec::compose(&[SortKey::new(SortField::Title, SortDirection::Asc)])
    }

    #[test]
    fn roundtrip_all_scalar_types() {
        // Nombres, chaînes, booléens et null doivent survivre à l'aller-retour
        let spec = SortSpec::compose(&[
            SortKey::new(SortField::Duration, SortDirection::Asc),
            SortKey::new(SortField::Title, SortDirection::Asc),
            SortKey::new(SortField::ReleasedAt, SortDirection::Desc),
        ]);
        let values = vec![json!(42.5), json!("Nocturne"), json!(null), json!("wrk_9")];
        let cursor = Cursor::new(values.clone(), &spec);

        let token = cursor.encode().unwrap();
        let decoded = Cursor::decode(&token).unwrap();

        assert_eq!(decoded.values(), &values[..]);
        assert_eq!(decoded.keys(), cursor.keys());
        assert_eq!(decoded, cursor);
    }

    #[test]
    fn roundtrip_boolean_and_integers() {
        let values = vec![json!(true), json!(-7)];
        let cursor = Cursor::new(values.clone(), &spec());
        let decoded = Cursor::decode(&cursor.encode().unwrap()).unwrap();
        assert_eq!(decoded.values(), &values[..]);
    }

    #[test]
    fn token_is_url_safe() {
        let values = vec![json!("a/b+c?d&e"), json!("x")];
        let token = Cursor::new(values, &spec()).encode().unwrap();
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            Cursor::decode("not base64 at all!!"),
            Err(CursorError::Malformed { .. })
        ));
        // Base64 valide mais pas du JSON
        let token = URL_SAFE_NO_PAD.encode(b"hello world");
        assert!(matches!(
            Cursor::decode(&token),
            Err(CursorError::Malformed { .. })
        ));
        assert!(matches!(
            Cursor::decode(""),
            Err(CursorError::Malformed { .. })
        ));
    }

    #[test]
    fn decode_rejects_unknown_version() {
        let token = URL_SAFE_NO_PAD.encode(br#"{"v":9,"k":["id"],"s":["a"]}"#);
        let err = Cursor::decode(&token).unwrap_err();
        assert!(err.to_string().contains("version 9"));
    }

    #[test]
    fn decode_rejects_mismatched_lengths() {
        let token = URL_SAFE_NO_PAD.encode(br#"{"v":1,"k":["id"],"s":["a","b"]}"#);
        assert!(matches!(
            Cursor::decode(&token),
            Err(CursorError::Malformed { .. })
        ));
    }

    #[test]
    fn decode_rejects_empty_tuple() {
        let token = URL_SAFE_NO_PAD.encode(br#"{"v":1,"k":[],"s":[]}"#);
        assert!(matches!(
            Cursor::decode(&token),
            Err(CursorError::Malformed { .. })
        ));
    }

    #[test]
    fn verify_accepts_matching_spec() {
        let spec = spec();
        let cursor = Cursor::new(vec![json!("Prélude"), json!("wrk_1")], &spec);
        let decoded = Cursor::decode(&cursor.encode().unwrap()).unwrap();
        assert!(decoded.verify(&spec).is_ok());
    }

    #[test]
    fn verify_rejects_different_sort() {
        // Curseur produit sous le tri A, rejoué sous le tri B
        let spec_a = spec();
        let spec_b = SortSpec::compose(&[SortKey::new(SortField::ReleasedAt, SortDirection::Desc)]);

        let cursor = Cursor::new(vec![json!("Prélude"), json!("wrk_1")], &spec_a);
        let decoded = Cursor::decode(&cursor.encode().unwrap()).unwrap();

        let err = decoded.verify(&spec_b).unwrap_err();
        match err {
            CursorError::Incompatible { expected, found } => {
                assert_eq!(expected, "released_at, id");
                assert_eq!(found, "title.sort, id");
            }
            other => panic!("expected Incompatible, got {other:?}"),
        }
    }

    #[test]
    fn verify_rejects_reordered_fields() {
        // Mêmes champs, ordre différent : incompatible quand même
        let spec_a = SortSpec::compose(&[
            SortKey::new(SortField::Title, SortDirection::Asc),
            SortKey::new(SortField::Artist, SortDirection::Asc),
        ]);
        let spec_b = SortSpec::compose(&[
            SortKey::new(SortField::Artist, SortDirection::Asc),
            SortKey::new(SortField::Title, SortDirection::Asc),
        ]);

        let cursor = Cursor::new(vec![json!("a"), json!("b"), json!("c")], &spec_a);
        assert!(matches!(
            cursor.verify(&spec_b),
            Err(CursorError::Incompatible { .. })
        ));
    }
}
