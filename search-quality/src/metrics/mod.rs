//! The ranking-metrics engine: scores a ranked result window against
//! relevance judgments.

mod rank;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub use self::rank::{dcg, ndcg, precision};

/// The ranking metrics the engine can compute.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum MetricKind {
    Dcg,
    Ndcg,
    Precision,
}

impl MetricKind {
    /// The reporting name of the metric at a cutoff, eg. `dcg_at_10`.
    pub fn name(&self, k: usize) -> String {
        match self {
            MetricKind::Dcg => format!("dcg_at_{}", k),
            MetricKind::Ndcg => format!("ndcg_at_{}", k),
            MetricKind::Precision => format!("precision_at_{}", k),
        }
    }
}

/// A computed metric, named for reporting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricValue {
    pub name: String,
    pub value: f64,
}

/// The configuration of the metrics engine.
#[derive(Clone, Debug)]
pub struct MetricsConfig {
    k: usize,
    threshold: f64,
    metrics: BTreeSet<MetricKind>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        let metrics = vec![MetricKind::Dcg, MetricKind::Ndcg, MetricKind::Precision]
            .into_iter()
            .collect();
        Self {
            k: 10,
            threshold: 1.,
            metrics,
        }
    }
}

impl MetricsConfig {
    /// The rank cutoff.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Sets the cutoff.
    ///
    /// # Errors
    /// Fails if the cutoff is zero.
    pub fn with_k(self, k: usize) -> Result<Self, ConfigError> {
        if k >= 1 {
            Ok(Self { k, ..self })
        } else {
            Err(ConfigError::K)
        }
    }

    /// The relevance threshold used by precision.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Sets the threshold.
    ///
    /// # Errors
    /// Fails if the threshold is not finite.
    pub fn with_threshold(self, threshold: f64) -> Result<Self, ConfigError> {
        if threshold.is_finite() {
            Ok(Self { threshold, ..self })
        } else {
            Err(ConfigError::Threshold)
        }
    }

    /// The metrics to compute.
    pub fn metrics(&self) -> &BTreeSet<MetricKind> {
        &self.metrics
    }

    /// Sets the metrics to compute.
    pub fn with_metrics(self, metrics: impl IntoIterator<Item = MetricKind>) -> Self {
        Self {
            metrics: metrics.into_iter().collect(),
            ..self
        }
    }
}

/// Computes the configured metrics over one query's ranked relevance scores.
///
/// The scores are the query's result window in rank order, each entry the
/// judgment of the document at that rank (zero for unjudged documents).
pub fn evaluate(relevance_scores: &[f64], config: &MetricsConfig) -> Vec<MetricValue> {
    config
        .metrics()
        .iter()
        .map(|metric| {
            let value = match metric {
                MetricKind::Dcg => dcg(relevance_scores, config.k()),
                MetricKind::Ndcg => ndcg(relevance_scores, config.k()),
                MetricKind::Precision => {
                    precision(relevance_scores, config.k(), config.threshold())
                }
            };
            MetricValue {
                name: metric.name(config.k()),
                value,
            }
        })
        .collect()
}
