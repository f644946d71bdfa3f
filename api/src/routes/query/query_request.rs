use std::fmt;

use serde::{
    Deserialize, Deserializer, Serialize,
    de::{MapAccess, Visitor, value::MapAccessDeserializer},
};

/// Request payload for /query.
///
/// Only a JSON object is accepted; arrays and scalars are rejected even when
/// their elements would line up with the fields.
#[derive(Debug, Serialize)]
pub struct QueryRequest {
    /// Natural language question.
    pub query: String,
    /// Required by the wire contract but not used for routing: the search
    /// always runs against the configured collection.
    pub collection_name: String,
}

#[derive(Deserialize)]
struct QueryFields {
    query: String,
    collection_name: String,
}

struct ObjectOnly;

impl<'de> Visitor<'de> for ObjectOnly {
    type Value = QueryRequest;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON object")
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
        let QueryFields {
            query,
            collection_name,
        } = QueryFields::deserialize(MapAccessDeserializer::new(map))?;
        Ok(QueryRequest {
            query,
            collection_name,
        })
    }
}

impl<'de> Deserialize<'de> for QueryRequest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ObjectOnly)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_objects_only() {
        let ok: QueryRequest =
            serde_json::from_str(r#"{"query":"q","collection_name":"c"}"#).unwrap();
        assert_eq!(ok.query, "q");
        assert_eq!(ok.collection_name, "c");

        for body in [r#"["q","c"]"#, r#""q""#, "42", "null"] {
            let err = serde_json::from_str::<QueryRequest>(body).unwrap_err();
            assert!(err.to_string().contains("expected a JSON object"), "{body}: {err}");
        }
    }

    #[test]
    fn missing_field_is_reported_by_name() {
        let err = serde_json::from_str::<QueryRequest>(r#"{"query":"q"}"#).unwrap_err();
        assert!(err.to_string().contains("missing field `collection_name`"));
    }
}
