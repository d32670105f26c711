use log::info;

use crate::{
    clickmodel::{ClickModel, ModelError},
    data::judgment::Judgment,
    error::BatchError,
    store::{BehaviorLogStore, TimeWindow},
};

/// Runs one evaluation batch: fetches the window's behavior logs and derives
/// judgments with the given click model.
///
/// The run fails as a unit. A fetch failure aborts before the model sees any
/// data, and the model only writes to its judgment store after the whole
/// batch has been derived, so a failed run never leaves a partially updated
/// judgment table behind. The error names the stage that failed.
pub fn run_batch<B, M>(
    behavior: &B,
    model: &mut M,
    window: &TimeWindow,
) -> Result<Vec<Judgment>, BatchError>
where
    B: BehaviorLogStore + ?Sized,
    M: ClickModel + ?Sized,
{
    let queries = behavior.fetch_queries(window).map_err(BatchError::Fetch)?;
    let events = behavior.fetch_events(window).map_err(BatchError::Fetch)?;
    info!(
        "fetched {} queries and {} events for the window",
        queries.len(),
        events.len(),
    );

    model
        .calculate_judgments(&events, &queries)
        .map_err(|error| match error {
            ModelError::Persist(error) => BatchError::Persist(error),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clickmodel::{coec::CoecClickModel, CoecConfig},
        data::{
            event::{Event, EventAttributes, EventObject, Position},
            query::Query,
        },
        store::{MockBehaviorLogStore, MockJudgmentStore, StoreError},
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

    fn click(query_id: &str, object_id: &str, ordinal: u32) -> Event {
        Event {
            action_name: "click".into(),
            client_id: "client-1".into(),
            query_id: Some(query_id.into()),
            timestamp: "2024-07-26T10:30:15.123Z".into(),
            event_attributes: EventAttributes {
                object: EventObject {
                    object_id: object_id.into(),
                    object_id_field: None,
                },
                position: Some(Position { ordinal }),
                session_id: "s-1".into(),
            },
        }
    }

    #[test]
    fn test_fetch_failure_reports_the_fetch_stage() {
        let mut behavior = MockBehaviorLogStore::new();
        behavior
            .expect_fetch_queries()
            .returning(|_| Err(StoreError::Unreachable("ubi_queries offline".into())));

        let mut model = CoecClickModel::new(MockJudgmentStore::new(), CoecConfig::default());
        let error = run_batch(&behavior, &mut model, &TimeWindow::all()).unwrap_err();
        assert!(matches!(error, BatchError::Fetch(_)));
    }

    #[test]
    fn test_persist_failure_reports_the_persist_stage() {
        let mut behavior = MockBehaviorLogStore::new();
        behavior
            .expect_fetch_queries()
            .returning(|_| Ok(vec![query("q-1", "computer")]));
        behavior
            .expect_fetch_events()
            .returning(|_| Ok(vec![click("q-1", "doc-1", 1)]));

        let mut judgments = MockJudgmentStore::new();
        judgments
            .expect_write()
            .returning(|_| Err(StoreError::Rejected("bulk insert failed".into())));

        let config = CoecConfig::default().with_persist(true);
        let mut model = CoecClickModel::new(judgments, config);
        let error = run_batch(&behavior, &mut model, &TimeWindow::all()).unwrap_err();
        assert!(matches!(error, BatchError::Persist(_)));
    }

    #[test]
    fn test_successful_run() {
        let mut behavior = MockBehaviorLogStore::new();
        behavior
            .expect_fetch_queries()
            .returning(|_| Ok(vec![query("q-1", "computer")]));
        behavior
            .expect_fetch_events()
            .returning(|_| Ok(vec![click("q-1", "doc-1", 1)]));

        let mut model = CoecClickModel::new(MockJudgmentStore::new(), CoecConfig::default());
        let judgments = run_batch(&behavior, &mut model, &TimeWindow::all()).unwrap();

        assert_eq!(judgments.len(), 1);
        assert_eq!(judgments[0].document(), "doc-1");
    }
}
