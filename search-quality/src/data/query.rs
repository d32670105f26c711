use std::{
    collections::HashMap,
    hash::{Hash, Hasher},
};

use serde::{Deserialize, Serialize};

/// A search issued by a user, as recorded in the behavior log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    /// Unique identifier of this issuance of the search.
    pub query_id: String,
    /// The raw query text as the user typed it.
    pub user_query: String,
    /// Identifier of the issuing client.
    pub client_id: String,
    /// Time the search was issued.
    pub timestamp: String,
    /// Producer-defined attributes of the search.
    #[serde(default)]
    pub query_attributes: HashMap<String, String>,
    /// The ranked response returned for the search.
    #[serde(default)]
    pub query_response: QueryResponse,
}

/// The ordered documents returned for a query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Unique identifier of the response.
    pub query_response_id: String,
    /// Ids of the returned documents, in rank order.
    pub query_response_hit_ids: Vec<String>,
}

// Identity of a query is its issuance id; incidental fields like the timestamp
// do not participate in equality.
impl PartialEq for Query {
    fn eq(&self, other: &Self) -> bool {
        self.query_id == other.query_id
    }
}

impl Eq for Query {}

impl Hash for Query {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.query_id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(query_id: &str, timestamp: &str) -> Query {
        Query {
            query_id: query_id.into(),
            user_query: "computer".into(),
            client_id: "client-1".into(),
            timestamp: timestamp.into(),
            query_attributes: HashMap::new(),
            query_response: QueryResponse::default(),
        }
    }

    #[test]
    fn test_equality_ignores_incidental_fields() {
        let a = query("q-1", "2024-07-26T10:30:15.123Z");
        let b = query("q-1", "2024-07-26T11:00:00.000Z");
        assert_eq!(a, b);
    }

    #[test]
    fn test_equality_distinguishes_issuances() {
        let a = query("q-1", "2024-07-26T10:30:15.123Z");
        let b = query("q-2", "2024-07-26T10:30:15.123Z");
        assert_ne!(a, b);
    }

    #[test]
    fn test_deserializes_without_optional_fields() {
        let query: Query = serde_json::from_str(
            r#"{
                "query_id": "q-1",
                "user_query": "computer",
                "client_id": "client-1",
                "timestamp": "2024-07-26T10:30:15.123Z"
            }"#,
        )
        .unwrap();
        assert!(query.query_attributes.is_empty());
        assert!(query.query_response.query_response_hit_ids.is_empty());
    }
}
