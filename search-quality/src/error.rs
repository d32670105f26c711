use displaydoc::Display;
use thiserror::Error;

use crate::{clickmodel::ModelError, store::StoreError};

/// Potential errors of the evaluation configuration.
///
/// Configuration is rejected eagerly, before any aggregation work begins.
#[derive(Clone, Debug, Display, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Invalid maximum rank, expected positive value
    MaxRank,
    /// Invalid rounding precision, expected at most 15 decimal digits
    RoundingDigits,
    /// Invalid click action set, expected at least one action name
    ClickActions,
    /// Invalid impression action set, expected at least one action name
    ImpressionActions,
    /// Invalid metric cutoff, expected positive value
    K,
    /// Invalid precision threshold, expected finite value
    Threshold,
    /// Invalid timestamp "{0}", expected ISO-8601 like 2024-07-26T10:30:15.123Z
    Timestamp(String),
}

/// Potential errors of a judgment batch run, tagged with the stage that failed.
///
/// A failed run leaves the judgment store untouched; judgments are only
/// written once the whole batch has been derived.
#[derive(Debug, Display, Error)]
pub enum BatchError {
    /// Invalid configuration: {0}
    Config(#[from] ConfigError),
    /// Failed to fetch behavior logs: {0}
    Fetch(#[source] StoreError),
    /// Failed to derive judgments: {0}
    Model(#[source] ModelError),
    /// Failed to persist the judgment set: {0}
    Persist(#[source] StoreError),
}
