pub mod analyzer;
pub mod engine;
pub mod error;
pub mod reconstruct;
pub mod state;

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

pub use analyzer::JourneyMetrics;
pub use error::RaptorError;
pub use reconstruct::Leg;
use state::LabelStore;

use crate::{
    repository::{Money, Repository},
    shared::time::{Duration, Time},
};

/// One Pareto-optimal journey: strictly better arrival time than any
/// journey with fewer transfers in the same report.
#[derive(Debug, Clone)]
pub struct Journey {
    pub legs: Vec<Leg>,
    pub metrics: JourneyMetrics,
}

/// The full Pareto frontier over (arrival time, transfer count) found for a
/// single source/destination query, earliest transfer count first.
#[derive(Debug, Clone, Default)]
pub struct ParetoReport {
    pub journeys: Vec<Journey>,
}

impl ParetoReport {
    /// The journey with the earliest arrival time, regardless of transfers.
    pub fn fastest(&self) -> Option<&Journey> {
        self.journeys.last()
    }
}

/// The set of synthetic trip ids (`"<route_id>_0"`) used across a report's
/// journeys, handy for downstream analytics on which routes carried traffic.
pub type TripSet = HashSet<Arc<str>>;

/// Runs RAPTOR from `source` to `destination`, departing at or after
/// `d_time`, exploring up to `max_transfers` rounds.
///
/// `walking_from_source`, if given, allows an initial footpath leg before
/// any vehicle is boarded. `change_time` is the minimum dwell added before
/// boarding a route from a stop reached in the previous round.
pub fn raptor(
    repository: &Repository,
    source: u32,
    destination: u32,
    d_time: Time,
    max_transfers: u32,
    walking_from_source: Option<Duration>,
    change_time: Duration,
) -> (ParetoReport, TripSet) {
    let store = run_search(
        repository,
        source,
        Some(destination),
        d_time,
        max_transfers,
        walking_from_source,
        change_time,
    );
    collect_report(repository, &store, destination, d_time)
}

/// Like [`raptor`], but disables target pruning (a single round's scan can't
/// favor one destination over another) and builds one Pareto frontier per
/// entry in `destinations`, plus the union of every destination's trip set —
/// matching the original's `post_processing_onetomany_rraptor`. Intended for
/// one-to-many queries (e.g. siting many destinations against one source).
pub fn raptor_one_to_many(
    repository: &Repository,
    source: u32,
    destinations: &[u32],
    d_time: Time,
    max_transfers: u32,
    walking_from_source: Option<Duration>,
    change_time: Duration,
) -> (HashMap<u32, ParetoReport>, TripSet) {
    let store = run_search(
        repository,
        source,
        None,
        d_time,
        max_transfers,
        walking_from_source,
        change_time,
    );

    let mut reports = HashMap::with_capacity(destinations.len());
    let mut trips = TripSet::new();
    for &destination in destinations {
        let (report, destination_trips) = collect_report(repository, &store, destination, d_time);
        trips.extend(destination_trips);
        reports.insert(destination, report);
    }
    (reports, trips)
}

pub(crate) fn run_search(
    repository: &Repository,
    source: u32,
    destination: Option<u32>,
    d_time: Time,
    max_transfers: u32,
    walking_from_source: Option<Duration>,
    change_time: Duration,
) -> LabelStore {
    let rounds = max_transfers as usize + 1;
    let mut store = LabelStore::new(repository.stops.len(), rounds);
    store.init(source, d_time);

    if let Some(max_walk) = walking_from_source {
        for transfer in repository.transfers_from_stop(source) {
            if transfer.duration > max_walk {
                continue;
            }
            let arrival = d_time + transfer.duration;
            store.improve(
                0,
                transfer.to_stop_idx,
                arrival,
                state::BackPointer::Walk {
                    from: source,
                    to: transfer.to_stop_idx,
                    duration: transfer.duration,
                    arrive: arrival,
                },
            );
        }
    }

    for round in 1..rounds {
        let keep_going = engine::run_round(repository, &mut store, round, change_time, destination);
        if !keep_going {
            break;
        }
    }

    store
}

/// Builds the Pareto frontier for `destination` out of a solved [`LabelStore`]:
/// one journey per round where the destination's label strictly improved.
fn collect_report(
    repository: &Repository,
    store: &LabelStore,
    destination: u32,
    d_time: Time,
) -> (ParetoReport, TripSet) {
    let mut journeys = Vec::new();
    let mut trips = TripSet::new();
    let mut best_so_far = Time::INF;

    for round in 0..store.rounds() {
        let label = store.label(round, destination);
        if !label.is_reachable() || label >= best_so_far {
            continue;
        }
        best_so_far = label;

        let legs = reconstruct::reconstruct_from_round(store, destination, round);
        if legs.is_empty() {
            // An empty leg list only happens at round 0, when `destination`
            // is the query's own source: reconstruction found no
            // back-pointer because there is nothing to walk back through.
            // That is a valid (trivial) journey, not a dead end.
            if round == 0 {
                journeys.push(Journey {
                    legs,
                    metrics: JourneyMetrics {
                        start_time: d_time,
                        end_time: label,
                        walk_time: Duration::ZERO,
                        wait_time: Duration::ZERO,
                        ovtt: Duration::ZERO,
                        ivtt: Duration::ZERO,
                        metro_fare: Ok(Money::default()),
                        num_transfers: 0,
                    },
                });
            }
            continue;
        }
        for leg in &legs {
            if let Leg::Ride { trip, .. } = leg {
                trips.insert(trip.clone());
            }
        }
        if let Some(metrics) = analyzer::analyze(repository, &legs, Some(d_time)) {
            journeys.push(Journey { legs, metrics });
        }
    }

    (ParetoReport { journeys }, trips)
}

/// Renders one leg the way a rider would describe it, matching the format
/// printed for `--print-itinerary`.
pub fn describe_leg(repository: &Repository, leg: &Leg) -> String {
    match leg {
        Leg::Walk { from, to, duration, .. } => format!(
            "from {} walk till {} for {} seconds",
            repository.stops[*from as usize].name,
            repository.stops[*to as usize].name,
            duration.as_seconds(),
        ),
        Leg::Ride {
            board_time,
            board_stop,
            alight_stop,
            alight_time,
            trip,
        } => format!(
            "from {} board at {} and get down on {} at {} along {}",
            repository.stops[*board_stop as usize].name,
            board_time.to_clock_string(),
            repository.stops[*alight_stop as usize].name,
            alight_time.to_clock_string(),
            trip,
        ),
    }
}
