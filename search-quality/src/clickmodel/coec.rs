use itertools::Itertools;
use log::{debug, info};

use crate::{
    clickmodel::{aggregate::BehaviorAggregates, ClickModel, CoecConfig, ModelError},
    data::{
        event::Event,
        judgment::{Judgment, JudgmentSet},
        query::Query,
    },
    queryhash::QueryIdentityHasher,
    store::JudgmentStore,
    utils::round,
};

/// The COEC (Clicks Over Expected Clicks) click model.
///
/// Normalizes each (query, document) pair's observed click-through rate by the
/// expected rate of the position the pair was most frequently shown at. The
/// expectation is what an average document earns at that rank across the whole
/// window, so a judgment above one means the document outperformed its rank
/// and below one that it underperformed it.
pub struct CoecClickModel<S> {
    config: CoecConfig,
    store: S,
    hasher: QueryIdentityHasher,
}

impl<S> CoecClickModel<S>
where
    S: JudgmentStore,
{
    pub fn new(store: S, config: CoecConfig) -> Self {
        Self {
            config,
            store,
            hasher: QueryIdentityHasher::new(),
        }
    }

    pub fn config(&self) -> &CoecConfig {
        &self.config
    }
}

/// A single COEC ratio.
///
/// A zero baseline (no impressions recorded at the rank) must not propagate an
/// infinite or NaN judgment downstream.
fn coec(observed_ctr: f64, expected_ctr: f64) -> f64 {
    if expected_ctr == 0. {
        0.
    } else {
        observed_ctr / expected_ctr
    }
}

impl<S> ClickModel for CoecClickModel<S>
where
    S: JudgmentStore,
{
    fn calculate_judgments(
        &mut self,
        events: &[Event],
        queries: &[Query],
    ) -> Result<Vec<Judgment>, ModelError> {
        let digits = self.config.rounding_digits();

        let aggregates = BehaviorAggregates::build(events, queries, &self.config);
        for baseline in aggregates.rank_aggregated() {
            debug!(
                "position: {}, ctr: {}",
                baseline.position(),
                round(baseline.ctr(), digits),
            );
        }

        let mut judgments = Vec::new();
        for (rate, position) in aggregates.pairs_with_positions() {
            let judgment = round(coec(rate.ctr(), aggregates.expected_ctr(position)), digits);
            let query_id = self.hasher.identity(rate.user_query());
            judgments.push(Judgment::new(
                query_id.to_string(),
                rate.user_query(),
                rate.object_id(),
                judgment,
            ));
        }
        info!(
            "derived {} judgments for {} user queries from {} events ({} excluded)",
            judgments.len(),
            judgments
                .iter()
                .unique_by(|judgment| judgment.query_id())
                .count(),
            events.len(),
            aggregates.dropped().total(),
        );
        for judgment in &judgments {
            debug!("{}", judgment.to_judgment_string());
        }

        if self.config.persist() {
            let set = JudgmentSet::new(judgments.clone());
            info!(
                "persisting judgment set {} with {} judgments",
                set.judgments_id(),
                set.judgments().len(),
            );
            self.store.write(&set).map_err(ModelError::Persist)?;
        }

        Ok(judgments)
    }
}

#[cfg(test)]
mod tests {
    use test_utils::assert_approx_eq;

    use super::*;
    use crate::{
        data::event::{EventAttributes, EventObject, Position},
        store::{MockJudgmentStore, StoreError},
    };

    fn query(query_id: &str, user_query: &str) -> Query {
        Query {
            query_id: query_id.into(),
            user_query: user_query.into(),
            client_id: "client-1".into(),
            timestamp: "2024-07-26T10:30:15.123Z".into(),
            query_attributes: Default::default(),
            query_response: Default::default(),
        }
    }

    fn event(action: &str, query_id: Option<&str>, object_id: &str, position: Option<u32>) -> Event {
        Event {
            action_name: action.into(),
            client_id: "client-1".into(),
            query_id: query_id.map(Into::into),
            timestamp: "2024-07-26T10:30:15.123Z".into(),
            event_attributes: EventAttributes {
                object: EventObject {
                    object_id: object_id.into(),
                    object_id_field: None,
                },
                position: position.map(|ordinal| Position { ordinal }),
                session_id: "s-1".into(),
            },
        }
    }

    fn window() -> (Vec<Event>, Vec<Query>) {
        let queries = vec![
            query("q-1", "computer"),
            query("q-2", "computer"),
            query("q-3", "laptop"),
        ];
        let events = vec![
            // computer/doc-1 at rank 1: one click over three events
            event("impression", Some("q-1"), "doc-1", Some(1)),
            event("impression", Some("q-2"), "doc-1", Some(1)),
            event("click", Some("q-1"), "doc-1", Some(1)),
            // computer/doc-2 at rank 2: one click over two events
            event("impression", Some("q-1"), "doc-2", Some(2)),
            event("click", Some("q-2"), "doc-2", Some(2)),
            // laptop/doc-9 at rank 3: never clicked
            event("impression", Some("q-3"), "doc-9", Some(3)),
            // unattributable noise
            event("click", None, "doc-1", Some(1)),
            event("click", Some("q-1"), "doc-1", None),
        ];
        (events, queries)
    }

    // Baselines for the window above: rank 1 has one click over two
    // impressions (0.5), rank 2 one click over one impression (1.0), rank 3
    // no clicks over one impression (0.0).

    #[test]
    fn test_coec_ratio() {
        // observed/expected pairs from the original implementation's suite
        assert_approx_eq!(f64, round(coec(110. / 250., 0.450), 3), 0.978);
        assert_approx_eq!(f64, round(coec(31. / 124., 0.175), 3), 1.429);
        assert_approx_eq!(f64, round(coec(30. / 240., 0.075), 3), 1.667);
    }

    #[test]
    fn test_zero_baseline_never_divides() {
        assert_approx_eq!(f64, coec(0.44, 0.), 0.);
        assert_approx_eq!(f64, coec(0., 0.), 0.);
    }

    #[test]
    fn test_judgments_for_a_window() {
        let (events, queries) = window();
        let mut model = CoecClickModel::new(MockJudgmentStore::new(), CoecConfig::default());
        let judgments = model.calculate_judgments(&events, &queries).unwrap();

        assert_eq!(judgments.len(), 3);

        assert_eq!(judgments[0].query_id(), "1");
        assert_eq!(judgments[0].query(), "computer");
        assert_eq!(judgments[0].document(), "doc-1");
        // observed 1/3 against an expected 0.5
        assert_approx_eq!(f64, judgments[0].judgment(), 0.667);

        assert_eq!(judgments[1].document(), "doc-2");
        // observed 1/2 against an expected 1.0
        assert_approx_eq!(f64, judgments[1].judgment(), 0.5);

        assert_eq!(judgments[2].query_id(), "2");
        assert_eq!(judgments[2].query(), "laptop");
        assert_eq!(judgments[2].document(), "doc-9");
        // never clicked at a never-clicked rank
        assert_approx_eq!(f64, judgments[2].judgment(), 0.);
    }

    #[test]
    fn test_judgments_are_never_negative() {
        let (events, queries) = window();
        let mut model = CoecClickModel::new(MockJudgmentStore::new(), CoecConfig::default());
        let judgments = model.calculate_judgments(&events, &queries).unwrap();
        assert!(judgments.iter().all(|judgment| judgment.judgment() >= 0.));
    }

    #[test]
    fn test_reruns_are_deterministic() {
        let (events, queries) = window();

        let mut model = CoecClickModel::new(MockJudgmentStore::new(), CoecConfig::default());
        let first = model.calculate_judgments(&events, &queries).unwrap();
        let second = model.calculate_judgments(&events, &queries).unwrap();
        let lines = |judgments: &[Judgment]| {
            judgments
                .iter()
                .map(Judgment::to_judgment_string)
                .collect::<Vec<_>>()
        };
        assert_eq!(lines(&first), lines(&second));

        // a fresh model issues the same identities for the same window
        let mut fresh = CoecClickModel::new(MockJudgmentStore::new(), CoecConfig::default());
        let third = fresh.calculate_judgments(&events, &queries).unwrap();
        assert_eq!(lines(&first), lines(&third));
    }

    #[test]
    fn test_persist_forwards_the_batch() {
        let (events, queries) = window();

        let mut store = MockJudgmentStore::new();
        store
            .expect_write()
            .withf(|set| set.judgments().len() == 3)
            .times(1)
            .returning(|_| Ok(()));

        let config = CoecConfig::default().with_persist(true);
        let mut model = CoecClickModel::new(store, config);
        let judgments = model.calculate_judgments(&events, &queries).unwrap();
        // the returned collection is the same with or without persistence
        assert_eq!(judgments.len(), 3);
    }

    #[test]
    fn test_persist_failure_aborts_the_run() {
        let (events, queries) = window();

        let mut store = MockJudgmentStore::new();
        store
            .expect_write()
            .returning(|_| Err(StoreError::Unreachable("judgments index offline".into())));

        let config = CoecConfig::default().with_persist(true);
        let mut model = CoecClickModel::new(store, config);
        let error = model.calculate_judgments(&events, &queries).unwrap_err();
        assert!(matches!(error, ModelError::Persist(_)));
    }

    #[test]
    fn test_no_store_access_without_persist() {
        let (events, queries) = window();

        // the mock panics on any unexpected call
        let store = MockJudgmentStore::new();
        let mut model = CoecClickModel::new(store, CoecConfig::default());
        assert!(model.calculate_judgments(&events, &queries).is_ok());
    }
}
