//! The collaborator boundary: where behavior logs come from and judgments go.
//!
//! The core never talks to a backing store itself; it is handed collections
//! through these traits and any blocking, retry or timeout policy stays with
//! the caller.

use chrono::DateTime;
use displaydoc::Display;
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

use crate::{
    data::{event::Event, judgment::JudgmentSet, query::Query},
    error::ConfigError,
};

lazy_static! {
    // date, literal T, time, millisecond fraction, literal trailing Z
    static ref TIMESTAMP: Regex =
        Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d{3}Z$").unwrap();
}

/// Validates the strict behavior-log timestamp format, eg.
/// `2024-07-26T10:30:15.123Z`.
pub(crate) fn validate_timestamp(timestamp: &str) -> Result<(), ConfigError> {
    if TIMESTAMP.is_match(timestamp) && DateTime::parse_from_rfc3339(timestamp).is_ok() {
        Ok(())
    } else {
        Err(ConfigError::Timestamp(timestamp.to_string()))
    }
}

/// The evaluation window behavior logs are fetched for.
///
/// Bounds are optional; a missing bound leaves that side of the window open.
/// Timestamps are validated eagerly at construction, before any store access.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TimeWindow {
    start: Option<String>,
    end: Option<String>,
}

impl TimeWindow {
    /// The unbounded window: the whole behavior log.
    pub fn all() -> Self {
        Self::default()
    }

    /// A window bounded from below.
    ///
    /// # Errors
    /// Fails if the timestamp does not match the strict behavior-log format.
    pub fn since(start: impl Into<String>) -> Result<Self, ConfigError> {
        let start = start.into();
        validate_timestamp(&start)?;
        Ok(Self {
            start: Some(start),
            end: None,
        })
    }

    /// A window bounded on both sides.
    ///
    /// # Errors
    /// Fails if either timestamp does not match the strict behavior-log format.
    pub fn between(start: impl Into<String>, end: impl Into<String>) -> Result<Self, ConfigError> {
        let start = start.into();
        let end = end.into();
        validate_timestamp(&start)?;
        validate_timestamp(&end)?;
        Ok(Self {
            start: Some(start),
            end: Some(end),
        })
    }

    pub fn start(&self) -> Option<&str> {
        self.start.as_deref()
    }

    pub fn end(&self) -> Option<&str> {
        self.end.as_deref()
    }
}

/// I/O failures at the collaborator boundary.
#[derive(Clone, Debug, Display, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store is unreachable: {0}
    Unreachable(String),
    /// The backing store rejected the operation: {0}
    Rejected(String),
}

/// The behavior log store queries and events are read from.
#[cfg_attr(test, automock)]
pub trait BehaviorLogStore {
    /// Fetches the queries issued within the window. No ordering is assumed.
    fn fetch_queries(&self, window: &TimeWindow) -> Result<Vec<Query>, StoreError>;

    /// Fetches the events recorded within the window. No ordering is assumed.
    fn fetch_events(&self, window: &TimeWindow) -> Result<Vec<Event>, StoreError>;
}

/// The judgment store derived judgment sets are written to.
#[cfg_attr(test, automock)]
pub trait JudgmentStore {
    /// Writes a produced judgment set.
    fn write(&mut self, judgments: &JudgmentSet) -> Result<(), StoreError>;
}
