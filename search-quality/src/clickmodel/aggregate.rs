use std::collections::{BTreeMap, HashMap};

use log::debug;

use crate::{
    clickmodel::CoecConfig,
    data::{
        event::Event,
        judgment::{ClickThroughRate, RankAggregatedClickThrough},
        query::Query,
    },
};

/// Counts of events excluded from aggregation, for data-quality monitoring.
///
/// Exclusion is recovery, not failure: none of these abort a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DroppedEvents {
    /// Events without an attributed query.
    pub missing_query_id: u64,
    /// Events without a usable 1-based ranked position.
    pub missing_position: u64,
    /// Events ranked beyond the configured maximum rank.
    pub beyond_max_rank: u64,
    /// Events whose query id has no query in the window.
    pub unknown_query: u64,
    /// Events whose action is neither a click nor an impression.
    pub unmatched_action: u64,
}

impl DroppedEvents {
    pub fn total(&self) -> u64 {
        self.missing_query_id
            + self.missing_position
            + self.beyond_max_rank
            + self.unknown_query
            + self.unmatched_action
    }
}

/// Counters for one (query, document) pair.
#[derive(Debug, Default)]
struct PairCounters {
    clicks: u64,
    events: u64,
    /// How often the pair was shown at each rank.
    shown_at: BTreeMap<u32, u64>,
}

impl PairCounters {
    /// The rank the pair was shown at most frequently, ties broken by the
    /// lowest rank.
    fn modal_position(&self) -> u32 {
        self.shown_at
            .iter()
            .fold(None, |best: Option<(u32, u64)>, (&position, &count)| {
                match best {
                    Some((_, best_count)) if count <= best_count => best,
                    _ => Some((position, count)),
                }
            })
            .map(|(position, _)| position)
            .unwrap_or_default()
    }
}

/// Global counters for one rank.
#[derive(Clone, Copy, Debug, Default)]
struct PositionCounters {
    clicks: u64,
    impressions: u64,
}

/// The aggregate tables derived from one window of behavior: per-pair
/// click/event counters and the global per-position baseline, plus the
/// data-quality counters for everything that was excluded.
///
/// Transient; recomputed from scratch each run, never merged across runs.
#[derive(Debug)]
pub struct BehaviorAggregates {
    /// user_query -> object_id -> counters
    pairs: BTreeMap<String, BTreeMap<String, PairCounters>>,
    positions: BTreeMap<u32, PositionCounters>,
    max_rank: u32,
    dropped: DroppedEvents,
}

impl BehaviorAggregates {
    /// Folds a window of events and their related queries into the tables.
    ///
    /// Unattributable events (no query id, no 1-based position, a rank beyond
    /// the maximum, a query id with no query in the window, or an action
    /// outside the configured taxonomy) are excluded and counted.
    pub fn build(events: &[Event], queries: &[Query], config: &CoecConfig) -> Self {
        let user_queries = queries
            .iter()
            .map(|query| (query.query_id.as_str(), query.user_query.as_str()))
            .collect::<HashMap<_, _>>();

        let mut aggregates = Self {
            pairs: BTreeMap::new(),
            positions: BTreeMap::new(),
            max_rank: config.max_rank(),
            dropped: DroppedEvents::default(),
        };
        for event in events {
            aggregates.fold(event, &user_queries, config);
        }

        if aggregates.dropped.total() > 0 {
            debug!(
                "excluded {} of {} events from aggregation: {:?}",
                aggregates.dropped.total(),
                events.len(),
                aggregates.dropped,
            );
        }

        aggregates
    }

    fn fold(&mut self, event: &Event, user_queries: &HashMap<&str, &str>, config: &CoecConfig) {
        let is_click = config.is_click(&event.action_name);
        let is_impression = config.is_impression(&event.action_name);
        if !is_click && !is_impression {
            self.dropped.unmatched_action += 1;
            return;
        }

        let query_id = match &event.query_id {
            Some(query_id) => query_id.as_str(),
            None => {
                self.dropped.missing_query_id += 1;
                return;
            }
        };
        // positions are 1-based; an ordinal of zero cannot be a ranked impression
        let position = match event.position() {
            Some(ordinal) if ordinal >= 1 => ordinal,
            _ => {
                self.dropped.missing_position += 1;
                return;
            }
        };
        if position > self.max_rank {
            self.dropped.beyond_max_rank += 1;
            return;
        }
        let user_query = match user_queries.get(query_id) {
            Some(user_query) => *user_query,
            None => {
                self.dropped.unknown_query += 1;
                return;
            }
        };

        let pair = self
            .pairs
            .entry(user_query.to_string())
            .or_insert_with(BTreeMap::new)
            .entry(event.object_id().to_string())
            .or_insert_with(PairCounters::default);
        pair.events += 1;
        if is_click {
            pair.clicks += 1;
        }
        *pair.shown_at.entry(position).or_insert(0) += 1;

        let counters = self
            .positions
            .entry(position)
            .or_insert_with(PositionCounters::default);
        if is_click {
            counters.clicks += 1;
        }
        if is_impression {
            counters.impressions += 1;
        }
    }

    /// The pair table in (query, document) order, each entry with the rank its
    /// judgment is normalized against: the rank the pair was shown at most
    /// frequently, ties broken by the lowest rank.
    ///
    /// Pairs only enter the table through a retained event, so every returned
    /// rate has a defined denominator.
    pub fn pairs_with_positions(
        &self,
    ) -> impl Iterator<Item = (ClickThroughRate, u32)> + '_ {
        self.pairs.iter().flat_map(|(user_query, documents)| {
            documents.iter().map(move |(object_id, counters)| {
                let rate = ClickThroughRate::with_counts(
                    user_query.clone(),
                    object_id.clone(),
                    counters.clicks,
                    counters.events,
                );
                (rate, counters.modal_position())
            })
        })
    }

    /// The pair table in (query, document) order.
    pub fn clickthrough_rates(&self) -> Vec<ClickThroughRate> {
        self.pairs_with_positions().map(|(rate, _)| rate).collect()
    }

    /// The position baseline, one record per rank in `[1, max_rank]`.
    ///
    /// Ranks nothing was recorded at still get a record, with a
    /// defined-as-zero rate.
    pub fn rank_aggregated(&self) -> Vec<RankAggregatedClickThrough> {
        (1..=self.max_rank)
            .map(|position| {
                let counters = self
                    .positions
                    .get(&position)
                    .copied()
                    .unwrap_or_default();
                RankAggregatedClickThrough::new(position, counters.clicks, counters.impressions)
            })
            .collect()
    }

    /// The baseline CTR at the given rank; zero for ranks without impressions.
    pub fn expected_ctr(&self, position: u32) -> f64 {
        self.positions.get(&position).map_or(0., |counters| {
            if counters.impressions == 0 {
                0.
            } else {
                counters.clicks as f64 / counters.impressions as f64
            }
        })
    }

    /// The data-quality counters of the build.
    pub fn dropped(&self) -> DroppedEvents {
        self.dropped
    }
}
