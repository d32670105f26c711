use serde::{Deserialize, Serialize};

/// A user interaction that followed a query, as recorded in the behavior log.
///
/// Events arrive with whatever the producer managed to attribute; `query_id`
/// and the position may both be absent. Such events cannot be tied to a ranked
/// impression and are excluded from aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Kind of interaction, eg. "click" or "impression".
    pub action_name: String,
    /// Identifier of the client the interaction came from.
    pub client_id: String,
    /// The query this interaction belongs to, if the producer attributed one.
    pub query_id: Option<String>,
    /// Time the interaction happened.
    pub timestamp: String,
    /// Details of the interaction.
    pub event_attributes: EventAttributes,
}

impl Event {
    /// The 1-based rank the acted-on document was shown at, if any.
    pub fn position(&self) -> Option<u32> {
        self.event_attributes
            .position
            .as_ref()
            .map(|position| position.ordinal)
    }

    /// The id of the document acted on.
    pub fn object_id(&self) -> &str {
        &self.event_attributes.object.object_id
    }
}

/// Attributes of an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventAttributes {
    /// The document acted on.
    pub object: EventObject,
    /// Where the document was ranked when the action happened; absent for
    /// actions without a ranked impression.
    pub position: Option<Position>,
    /// Session the action belongs to.
    pub session_id: String,
}

/// The document an event acted on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventObject {
    /// Unique id of the document.
    pub object_id: String,
    /// Field the id was taken from, if the producer recorded it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id_field: Option<String>,
}

/// The rank a search result occupied when it was acted on, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub ordinal: u32,
}
