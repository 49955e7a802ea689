use serde::{Deserialize, Serialize};

/// Raw event object as it appears in a provider's JSON array.
///
/// Every field is optional so that one sparse object cannot fail
/// deserialization of the whole array; the required-field rules are
/// applied afterwards by [`validate`](crate::validate).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EventCandidate {
    pub title: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

/// A validated event ready for calendar encoding.
///
/// `date` and `time` stay textual on purpose: a date that does not parse
/// as a valid Gregorian `YYYY-MM-DD` is skipped at encoding time rather
/// than rejected here, and a present-but-unparseable `HH:MM` time
/// degrades the event to all-day instead of dropping it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub title: String,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
