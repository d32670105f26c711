use std::{
    fmt,
    hash::{Hash, Hasher},
};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::round;

/// Click and event counters for one (query, document) pair.
///
/// `events` counts every retained interaction with the document under the
/// query, `clicks` the click-class subset, hence `events >= clicks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickThroughRate {
    user_query: String,
    object_id: String,
    clicks: u64,
    events: u64,
}

impl ClickThroughRate {
    pub fn new(user_query: impl Into<String>, object_id: impl Into<String>) -> Self {
        Self {
            user_query: user_query.into(),
            object_id: object_id.into(),
            clicks: 0,
            events: 0,
        }
    }

    /// Creates a pair record with preset counters.
    pub fn with_counts(
        user_query: impl Into<String>,
        object_id: impl Into<String>,
        clicks: u64,
        events: u64,
    ) -> Self {
        debug_assert!(events >= clicks);
        Self {
            user_query: user_query.into(),
            object_id: object_id.into(),
            clicks,
            events,
        }
    }

    /// Records a click on the document. A click is itself an event, so both
    /// counters advance.
    pub fn log_click(&mut self) {
        self.clicks += 1;
        self.events += 1;
    }

    /// Records a non-click event on the document.
    pub fn log_event(&mut self) {
        self.events += 1;
    }

    pub fn user_query(&self) -> &str {
        &self.user_query
    }

    pub fn object_id(&self) -> &str {
        &self.object_id
    }

    pub fn clicks(&self) -> u64 {
        self.clicks
    }

    pub fn events(&self) -> u64 {
        self.events
    }

    /// Observed click-through rate of the pair.
    ///
    /// Zero before any event has been recorded; pairs without events never
    /// leave the aggregator, so derived judgments only see defined rates.
    pub fn ctr(&self) -> f64 {
        if self.events == 0 {
            0.
        } else {
            self.clicks as f64 / self.events as f64
        }
    }
}

// Identity of a pair record is the (query, document) pair; the counters are
// incidental.
impl PartialEq for ClickThroughRate {
    fn eq(&self, other: &Self) -> bool {
        self.user_query == other.user_query && self.object_id == other.object_id
    }
}

impl Eq for ClickThroughRate {}

impl Hash for ClickThroughRate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.user_query.hash(state);
        self.object_id.hash(state);
    }
}

impl fmt::Display for ClickThroughRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "user_query: {}, object_id: {}, clicks: {}, events: {}, ctr: {}",
            self.user_query,
            self.object_id,
            self.clicks,
            self.events,
            round(self.ctr(), 3),
        )
    }
}

/// The position-bias baseline: click and impression counters for one rank
/// across all queries and documents in the window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankAggregatedClickThrough {
    position: u32,
    clicks: u64,
    impressions: u64,
}

impl RankAggregatedClickThrough {
    pub(crate) fn new(position: u32, clicks: u64, impressions: u64) -> Self {
        Self {
            position,
            clicks,
            impressions,
        }
    }

    pub fn position(&self) -> u32 {
        self.position
    }

    pub fn clicks(&self) -> u64 {
        self.clicks
    }

    pub fn impressions(&self) -> u64 {
        self.impressions
    }

    /// CTR at this rank, defined as zero when no impressions were recorded so
    /// the downstream expected-CTR division never sees a NaN baseline.
    pub fn ctr(&self) -> f64 {
        if self.impressions == 0 {
            0.
        } else {
            self.clicks as f64 / self.impressions as f64
        }
    }
}

/// An implicit relevance judgment of a document for a query.
///
/// Produced only by a click model; the value is non-negative and already
/// rounded to the model's configured precision. Identity is the
/// (query, document) pair, so re-running a window replaces rather than
/// duplicates judgments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Judgment {
    query_id: String,
    query: String,
    document: String,
    judgment: f64,
}

impl Judgment {
    /// Header line matching [`to_judgment_string`](Self::to_judgment_string).
    pub const HEADER: &'static str = "query_id, query, document, judgment";

    pub fn new(
        query_id: impl Into<String>,
        query: impl Into<String>,
        document: impl Into<String>,
        judgment: f64,
    ) -> Self {
        Self {
            query_id: query_id.into(),
            query: query.into(),
            document: document.into(),
            judgment,
        }
    }

    pub fn query_id(&self) -> &str {
        &self.query_id
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn judgment(&self) -> f64 {
        self.judgment
    }

    /// One-line text form: `<query_id>, <query>, <document>, <judgment>`.
    pub fn to_judgment_string(&self) -> String {
        format!(
            "{}, {}, {}, {}",
            self.query_id, self.query, self.document, self.judgment,
        )
    }
}

// Identity of a judgment is the (query, document) pair it scores.
impl PartialEq for Judgment {
    fn eq(&self, other: &Self) -> bool {
        self.query_id == other.query_id && self.document == other.document
    }
}

impl Eq for Judgment {}

impl Hash for Judgment {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.query_id.hash(state);
        self.document.hash(state);
    }
}

/// A batch of judgments produced by one click model run.
///
/// Stamped with a fresh id and the production time when created; this is the
/// unit handed to the judgment store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgmentSet {
    judgments_id: Uuid,
    timestamp: String,
    judgments: Vec<Judgment>,
}

impl JudgmentSet {
    pub fn new(judgments: Vec<Judgment>) -> Self {
        Self {
            judgments_id: Uuid::new_v4(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            judgments,
        }
    }

    pub fn judgments_id(&self) -> Uuid {
        self.judgments_id
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn judgments(&self) -> &[Judgment] {
        &self.judgments
    }

    /// Text export with one line per judgment under the standard header.
    pub fn to_text(&self) -> String {
        let mut text = String::from(Judgment::HEADER);
        for judgment in &self.judgments {
            text.push('\n');
            text.push_str(&judgment.to_judgment_string());
        }
        text
    }
}
