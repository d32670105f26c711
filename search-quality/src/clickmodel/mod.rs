//! Click models deriving implicit relevance judgments from behavior logs.

pub(crate) mod aggregate;
pub(crate) mod coec;

use std::collections::HashSet;

use displaydoc::Display;
use thiserror::Error;

use crate::{
    data::{event::Event, judgment::Judgment, query::Query},
    error::ConfigError,
    store::StoreError,
};

pub use self::{
    aggregate::{BehaviorAggregates, DroppedEvents},
    coec::CoecClickModel,
};

/// A model deriving one implicit relevance judgment per (query, document)
/// pair from a window of behavior.
///
/// Models are pure batch transforms over the handed-in window apart from a
/// configured persistence side effect; there is no incremental state between
/// invocations and identical windows produce identical judgment sets.
pub trait ClickModel {
    fn calculate_judgments(
        &mut self,
        events: &[Event],
        queries: &[Query],
    ) -> Result<Vec<Judgment>, ModelError>;
}

/// Potential errors of a click model run.
#[derive(Debug, Display, Error)]
pub enum ModelError {
    /// Failed to persist the judgment set: {0}
    Persist(#[source] StoreError),
}

/// Which events count as impressions for the position baseline.
///
/// Behavior-log producers emit different event taxonomies, so the choice is
/// configuration rather than hard-coded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImpressionPolicy {
    /// Only events with one of the given action names are impressions.
    ///
    /// For producers emitting an explicit impression event per shown document.
    Actions(HashSet<String>),
    /// Every event at a ranked position counts as an impression regardless of
    /// click status, for producers without an explicit impression action.
    AllEvents,
}

/// The configuration of the COEC click model.
///
/// All validation happens here, before any aggregation work begins.
#[derive(Clone, Debug)]
pub struct CoecConfig {
    max_rank: u32,
    rounding_digits: u32,
    persist: bool,
    click_actions: HashSet<String>,
    impression_policy: ImpressionPolicy,
}

impl Default for CoecConfig {
    fn default() -> Self {
        Self {
            max_rank: 20,
            rounding_digits: 3,
            persist: false,
            click_actions: lowercased(vec![EVENT_CLICK]),
            impression_policy: ImpressionPolicy::Actions(lowercased(vec![EVENT_IMPRESSION])),
        }
    }
}

/// Default click action name in UBI logs.
pub const EVENT_CLICK: &str = "click";
/// Default impression action name in UBI logs.
pub const EVENT_IMPRESSION: &str = "impression";

impl CoecConfig {
    /// The position cutoff; events ranked beyond it are discarded.
    pub fn max_rank(&self) -> u32 {
        self.max_rank
    }

    /// Sets the maximum rank.
    ///
    /// # Errors
    /// Fails if the rank is zero.
    pub fn with_max_rank(self, max_rank: u32) -> Result<Self, ConfigError> {
        if max_rank >= 1 {
            Ok(Self { max_rank, ..self })
        } else {
            Err(ConfigError::MaxRank)
        }
    }

    /// The number of decimal digits judgments are rounded to.
    pub fn rounding_digits(&self) -> u32 {
        self.rounding_digits
    }

    /// Sets the rounding precision.
    ///
    /// # Errors
    /// Fails if the precision exceeds what an f64 can meaningfully hold.
    pub fn with_rounding_digits(self, rounding_digits: u32) -> Result<Self, ConfigError> {
        if rounding_digits <= 15 {
            Ok(Self {
                rounding_digits,
                ..self
            })
        } else {
            Err(ConfigError::RoundingDigits)
        }
    }

    /// Whether produced judgments are forwarded to the judgment store.
    pub fn persist(&self) -> bool {
        self.persist
    }

    /// Sets the persistence flag.
    pub fn with_persist(self, persist: bool) -> Self {
        Self { persist, ..self }
    }

    /// The action names counted as clicks.
    pub fn click_actions(&self) -> &HashSet<String> {
        &self.click_actions
    }

    /// Sets the click action names. Matching is case-insensitive.
    ///
    /// # Errors
    /// Fails if no action name is given.
    pub fn with_click_actions<I, T>(self, actions: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let click_actions = lowercased(actions);
        if click_actions.is_empty() {
            Err(ConfigError::ClickActions)
        } else {
            Ok(Self {
                click_actions,
                ..self
            })
        }
    }

    /// The policy deciding which events count as impressions.
    pub fn impression_policy(&self) -> &ImpressionPolicy {
        &self.impression_policy
    }

    /// Sets the impression policy. Action matching is case-insensitive.
    ///
    /// # Errors
    /// Fails if an action-based policy names no action.
    pub fn with_impression_policy(
        self,
        impression_policy: ImpressionPolicy,
    ) -> Result<Self, ConfigError> {
        let impression_policy = match impression_policy {
            ImpressionPolicy::Actions(actions) => {
                let actions = lowercased(actions);
                if actions.is_empty() {
                    return Err(ConfigError::ImpressionActions);
                }
                ImpressionPolicy::Actions(actions)
            }
            ImpressionPolicy::AllEvents => ImpressionPolicy::AllEvents,
        };
        Ok(Self {
            impression_policy,
            ..self
        })
    }

    pub(crate) fn is_click(&self, action_name: &str) -> bool {
        self.click_actions.contains(&action_name.to_lowercase())
    }

    pub(crate) fn is_impression(&self, action_name: &str) -> bool {
        match &self.impression_policy {
            ImpressionPolicy::Actions(actions) => actions.contains(&action_name.to_lowercase()),
            ImpressionPolicy::AllEvents => true,
        }
    }
}

fn lowercased<I, T>(actions: I) -> HashSet<String>
where
    I: IntoIterator<Item = T>,
    T: Into<String>,
{
    actions
        .into_iter()
        .map(|action| action.into().to_lowercase())
        .collect()
}
