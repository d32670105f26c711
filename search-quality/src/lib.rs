//! Implicit relevance judgments from user-behavior logs, and the ranking
//! metrics to score result lists against them.
//!
//! The crate is a stateless batch core: a [`ClickModel`] turns a window of
//! UBI queries and events into one [`Judgment`] per (query, document) pair,
//! correcting for position bias with the COEC (Clicks Over Expected Clicks)
//! baseline, and the [`metrics`] engine computes DCG, NDCG and Precision@k
//! over ranked relevance scores. Store access stays behind the
//! [`BehaviorLogStore`] and [`JudgmentStore`] collaborator traits; the core
//! itself performs no I/O.

mod batch;
mod clickmodel;
mod data;
mod error;
pub mod metrics;
mod queryhash;
mod store;
mod utils;

pub use crate::{
    batch::run_batch,
    clickmodel::{
        BehaviorAggregates,
        ClickModel,
        CoecClickModel,
        CoecConfig,
        DroppedEvents,
        ImpressionPolicy,
        ModelError,
        EVENT_CLICK,
        EVENT_IMPRESSION,
    },
    data::{
        event::{Event, EventAttributes, EventObject, Position},
        judgment::{ClickThroughRate, Judgment, JudgmentSet, RankAggregatedClickThrough},
        query::{Query, QueryResponse},
    },
    error::{BatchError, ConfigError},
    metrics::{dcg, evaluate, ndcg, precision, MetricKind, MetricValue, MetricsConfig},
    queryhash::QueryIdentityHasher,
    store::{BehaviorLogStore, JudgmentStore, StoreError, TimeWindow},
    utils::round,
};
