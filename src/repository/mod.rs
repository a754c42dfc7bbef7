mod entities;
pub mod source;

pub use entities::*;
use std::{collections::HashMap, sync::Arc};

use crate::shared::geo::Coordinate;

/// A read-only, memory-efficient data store containing all transit network information.
///
/// The `Repository` acts as the Network Index consumed by the RAPTOR round engine:
/// everything the engine reads while solving a query lives here and is never
/// mutated after [`Repository::from_gtfs`] returns.
#[derive(Debug, Clone, Default)]
pub struct Repository {
    /// Global list of all physical transit stops or stations.
    pub stops: Box<[Stop]>,
    /// High-level transit routes (e.g., "Bus 42").
    pub routes: Box<[Route]>,
    /// Routes split so that every trip within one shares an identical stop
    /// sequence, as RAPTOR requires.
    pub raptor_routes: Box<[RaptorRoute]>,
    /// All known walking transfers between stops.
    pub transfers: Box<[Transfer]>,

    stop_lookup: HashMap<Arc<str>, u32>,
    route_lookup: HashMap<Arc<str>, u32>,

    /// `stop_idx -> [raptor_route_idx, ...]`, the routes passing through a stop.
    routes_by_stop: Box<[Box<[u32]>]>,
    /// `stop_idx -> [transfer_idx, ...]`, outbound footpaths from a stop.
    transfers_by_stop: Box<[Box<[u32]>]>,
    /// `(raptor_route_idx, stop_idx) -> position of the stop on the route`.
    idx_by_route_stop: HashMap<(u32, u32), u32>,
    /// `(boarding_stop_idx, alighting_stop_idx) -> fare`.
    fare: HashMap<(u32, u32), Money>,
}

impl Repository {
    pub fn new() -> Self {
        Default::default()
    }

    // --- Primary key lookups ---

    pub fn stop_by_id(&self, id: &str) -> Option<&Stop> {
        let stop_index = self.stop_lookup.get(id)?;
        Some(&self.stops[*stop_index as usize])
    }

    pub fn stop_idx_by_id(&self, id: &str) -> Option<u32> {
        self.stop_lookup.get(id).copied()
    }

    pub fn route_by_id(&self, id: &str) -> Option<&Route> {
        let index = self.route_lookup.get(id)?;
        Some(&self.routes[*index as usize])
    }

    // --- Network Index views used by the round engine ---

    /// RAPTOR routes passing through a stop, in no particular order.
    pub fn routes_serving_stop(&self, stop_idx: u32) -> &[u32] {
        &self.routes_by_stop[stop_idx as usize]
    }

    /// Outbound footpaths from a stop.
    pub fn transfers_from_stop(&self, stop_idx: u32) -> impl Iterator<Item = &Transfer> {
        self.transfers_by_stop[stop_idx as usize]
            .iter()
            .map(|idx| &self.transfers[*idx as usize])
    }

    /// Position of a stop within a RAPTOR route's stop sequence, if served.
    pub fn position_in_route(&self, raptor_route_idx: u32, stop_idx: u32) -> Option<u32> {
        self.idx_by_route_stop
            .get(&(raptor_route_idx, stop_idx))
            .copied()
    }

    /// Fare for travelling directly from `board_stop_idx` to `alight_stop_idx`.
    pub fn fare(&self, board_stop_idx: u32, alight_stop_idx: u32) -> Option<Money> {
        self.fare.get(&(board_stop_idx, alight_stop_idx)).copied()
    }

    /// Linear-scan nearest-stop lookup, used to site a coordinate (e.g. a ward
    /// centroid) against the network. `O(|stops|)`; fine for siting a modest
    /// number of external points against a transit network, not for
    /// per-round routing queries.
    pub fn nearest_stop(&self, coordinate: &Coordinate) -> Option<(&Stop, crate::shared::Distance)> {
        self.stops
            .iter()
            .map(|stop| (stop, stop.coordinate.euclidean_distance(coordinate)))
            .min_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
    }
}

/// A small, hand-built four-stop network used to check the round engine's
/// output against worked-by-hand itineraries, independent of any GTFS fixture.
///
/// ```text
/// R1: A --300s--> B --300s--> C
/// R2:             B --400s--> D
/// footpath: C <--120s--> D
/// fares: A-C=10, A-B=5, B-D=7
/// ```
#[cfg(test)]
mod toy_network_tests {
    use std::{collections::HashMap, sync::Arc};

    use super::{Money, RaptorRoute, Repository, Route, Stop, Transfer};
    use crate::{
        raptor::{self, Leg},
        shared::{
            geo::Coordinate,
            time::{Duration, Time},
        },
    };

    const A: u32 = 0;
    const B: u32 = 1;
    const C: u32 = 2;
    const D: u32 = 3;

    fn stop(index: u32, id: &str) -> Stop {
        Stop {
            index,
            id: id.into(),
            name: id.into(),
            coordinate: Coordinate::new(0.0, 0.0),
        }
    }

    fn toy_network() -> Repository {
        let stops: Box<[Stop]> = vec![stop(A, "A"), stop(B, "B"), stop(C, "C"), stop(D, "D")].into();

        let routes: Box<[Route]> = vec![
            Route {
                index: 0,
                id: "R1".into(),
                short_name: None,
                long_name: None,
                route_type: 1,
            },
            Route {
                index: 1,
                id: "R2".into(),
                short_name: None,
                long_name: None,
                route_type: 1,
            },
        ]
        .into();

        let raptor_routes: Box<[RaptorRoute]> = vec![
            RaptorRoute {
                index: 0,
                route_idx: 0,
                stops: Arc::from([A, B, C]),
                offsets: Arc::from([Duration::from_seconds(0), Duration::from_seconds(300), Duration::from_seconds(600)]),
            },
            RaptorRoute {
                index: 1,
                route_idx: 1,
                stops: Arc::from([B, D]),
                offsets: Arc::from([Duration::from_seconds(0), Duration::from_seconds(400)]),
            },
        ]
        .into();

        let transfers: Box<[Transfer]> = vec![
            Transfer { from_stop_idx: C, to_stop_idx: D, duration: Duration::from_seconds(120) },
            Transfer { from_stop_idx: D, to_stop_idx: C, duration: Duration::from_seconds(120) },
        ]
        .into();

        let mut transfers_by_stop: Vec<Box<[u32]>> = vec![Box::from([]); stops.len()];
        transfers_by_stop[C as usize] = Box::from([0u32]);
        transfers_by_stop[D as usize] = Box::from([1u32]);

        let mut routes_by_stop: Vec<Box<[u32]>> = vec![Box::from([]); stops.len()];
        routes_by_stop[A as usize] = Box::from([0u32]);
        routes_by_stop[B as usize] = Box::from([0u32, 1u32]);
        routes_by_stop[C as usize] = Box::from([0u32]);
        routes_by_stop[D as usize] = Box::from([1u32]);

        let mut idx_by_route_stop = HashMap::new();
        idx_by_route_stop.insert((0u32, A), 0u32);
        idx_by_route_stop.insert((0u32, B), 1u32);
        idx_by_route_stop.insert((0u32, C), 2u32);
        idx_by_route_stop.insert((1u32, B), 0u32);
        idx_by_route_stop.insert((1u32, D), 1u32);

        let mut fare = HashMap::new();
        fare.insert((A, C), Money(10.0));
        fare.insert((A, B), Money(5.0));
        fare.insert((B, D), Money(7.0));

        Repository {
            stops,
            routes,
            raptor_routes,
            transfers,
            stop_lookup: HashMap::new(),
            route_lookup: HashMap::new(),
            routes_by_stop: routes_by_stop.into(),
            transfers_by_stop: transfers_by_stop.into(),
            idx_by_route_stop,
            fare,
        }
    }

    const D_TIME: i64 = 1000;
    const MAX_TRANSFER: u32 = 2;

    fn d_time() -> Time {
        Time::from_epoch_seconds(D_TIME)
    }

    #[test]
    fn direct_ride_is_the_only_a_to_c_journey() {
        let repository = toy_network();
        let (report, _trips) = raptor::raptor(
            &repository,
            A,
            C,
            d_time(),
            MAX_TRANSFER,
            Some(Duration::from_seconds(1)),
            Duration::ZERO,
        );

        assert_eq!(report.journeys.len(), 1);
        let journey = &report.journeys[0];
        assert_eq!(journey.metrics.end_time, Time::from_epoch_seconds(1600));
        assert_eq!(journey.metrics.num_transfers, 0);
        assert_eq!(journey.metrics.ivtt, Duration::from_seconds(600));
        assert_eq!(journey.metrics.walk_time, Duration::ZERO);
        assert_eq!(journey.metrics.wait_time, Duration::ZERO);
        assert_eq!(journey.metrics.metro_fare.clone().unwrap(), Money(10.0));
    }

    #[test]
    fn a_to_d_pareto_frontier_has_two_non_dominating_journeys() {
        let repository = toy_network();
        let (report, _trips) = raptor::raptor(
            &repository,
            A,
            D,
            d_time(),
            MAX_TRANSFER,
            Some(Duration::from_seconds(1)),
            Duration::ZERO,
        );

        // One transfer, arrives earlier (1700); zero transfers, arrives later
        // via a footpath from C (1720). Neither should be dropped: faster
        // isn't strictly better when it also costs more transfers.
        assert_eq!(report.journeys.len(), 2);

        let zero_transfer = &report.journeys[0];
        assert_eq!(zero_transfer.metrics.num_transfers, 0);
        assert_eq!(zero_transfer.metrics.end_time, Time::from_epoch_seconds(1720));
        assert_eq!(zero_transfer.metrics.walk_time, Duration::from_seconds(120));
        assert_eq!(zero_transfer.metrics.ivtt, Duration::from_seconds(600));
        assert_eq!(zero_transfer.metrics.metro_fare.clone().unwrap(), Money(10.0));
        assert!(matches!(zero_transfer.legs.as_slice(), [Leg::Ride { .. }, Leg::Walk { .. }]));

        let one_transfer = &report.journeys[1];
        assert_eq!(one_transfer.metrics.num_transfers, 1);
        assert_eq!(one_transfer.metrics.end_time, Time::from_epoch_seconds(1700));
        assert_eq!(one_transfer.metrics.ivtt, Duration::from_seconds(700));
        assert_eq!(one_transfer.metrics.metro_fare.clone().unwrap(), Money(12.0));
        assert!(matches!(one_transfer.legs.as_slice(), [Leg::Ride { .. }, Leg::Ride { .. }]));

        assert_eq!(report.fastest().unwrap().metrics.num_transfers, 1);
    }

    #[test]
    fn trivial_same_stop_query_yields_an_empty_journey() {
        let repository = toy_network();
        let (report, _trips) = raptor::raptor(&repository, A, A, d_time(), MAX_TRANSFER, None, Duration::ZERO);
        assert_eq!(report.journeys.len(), 1);
        let journey = &report.journeys[0];
        assert!(journey.legs.is_empty());
        assert_eq!(journey.metrics.num_transfers, 0);
        assert_eq!(journey.metrics.end_time, d_time());
    }

    #[test]
    fn destination_with_no_reverse_edge_is_unreachable() {
        let repository = toy_network();
        let (report, _trips) = raptor::raptor(&repository, C, A, d_time(), MAX_TRANSFER, None, Duration::ZERO);
        assert!(report.journeys.is_empty());
    }

    #[test]
    fn best_label_is_the_minimum_over_every_round() {
        let repository = toy_network();
        let store = raptor::run_search(
            &repository,
            A,
            None,
            d_time(),
            MAX_TRANSFER,
            Some(Duration::from_seconds(1)),
            Duration::ZERO,
        );
        for stop in [A, B, C, D] {
            let minimum_label = (0..store.rounds())
                .map(|round| store.label(round, stop))
                .min()
                .unwrap();
            assert_eq!(store.best(stop), minimum_label);
            for round in 0..store.rounds() {
                let label = store.label(round, stop);
                if label.is_reachable() {
                    assert!(store.best(stop) <= label);
                }
            }
        }
    }
}
