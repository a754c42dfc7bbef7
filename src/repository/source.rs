use std::{collections::HashMap, sync::Arc, time::Instant};

use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    gtfs::{self, Gtfs},
    repository::{Money, RaptorRoute, Repository, Route, Stop, Transfer},
    shared::time::{Duration, Time},
};

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Gtfs(#[from] gtfs::Error),
    #[error("stop_times.txt references unknown stop id {0}")]
    UnknownStop(String),
    #[error("trips.txt references unknown route id {0}")]
    UnknownRoute(String),
}

/// One row of a trip's schedule, before it has been grouped into a [`RaptorRoute`].
struct ScheduledStop {
    stop_idx: u32,
    sequence: u16,
    arrival: Time,
}

impl Repository {
    /// Builds the Network Index from a GTFS-style source.
    ///
    /// `service_day` anchors the feed's `HH:MM:SS` stop-time offsets (which
    /// may exceed 24h) to an absolute epoch; pass midnight of the day the
    /// queries will run against.
    pub fn from_gtfs(gtfs: &mut Gtfs, service_day: Time) -> Result<Self, self::Error> {
        let mut repo = Repository::new();
        repo.load_stops(gtfs)?;
        repo.load_routes(gtfs)?;
        let trip_to_route = repo.load_trips(gtfs)?;
        repo.load_transfers(gtfs)?;
        let trip_stops = repo.load_stop_times(gtfs, service_day)?;
        repo.generate_raptor_routes(trip_to_route, trip_stops);
        repo.load_fares(gtfs)?;
        Ok(repo)
    }

    fn load_stops(&mut self, gtfs: &mut Gtfs) -> Result<(), self::Error> {
        debug!("Loading stops...");
        let now = Instant::now();
        let mut stop_lookup: HashMap<Arc<str>, u32> = HashMap::new();
        let mut stops: Vec<Stop> = Vec::new();
        gtfs.stream_stops(|(i, gtfs_stop)| {
            let mut stop: Stop = gtfs_stop.into();
            stop.index = i as u32;
            stop_lookup.insert(stop.id.clone(), i as u32);
            stops.push(stop);
        })?;
        self.stops = stops.into();
        self.stop_lookup = stop_lookup;
        debug!("Loading {} stops took {:?}", self.stops.len(), now.elapsed());
        Ok(())
    }

    fn load_routes(&mut self, gtfs: &mut Gtfs) -> Result<(), self::Error> {
        debug!("Loading routes...");
        let now = Instant::now();
        let mut route_lookup: HashMap<Arc<str>, u32> = HashMap::new();
        let mut routes: Vec<Route> = Vec::new();
        gtfs.stream_routes(|(i, gtfs_route)| {
            let mut route: Route = gtfs_route.into();
            route.index = i as u32;
            route_lookup.insert(route.id.clone(), i as u32);
            routes.push(route);
        })?;
        self.routes = routes.into();
        self.route_lookup = route_lookup;
        debug!("Loading {} routes took {:?}", self.routes.len(), now.elapsed());
        Ok(())
    }

    /// Returns `trip_id -> route_idx`, consumed by [`Self::load_stop_times`]
    /// and [`Self::generate_raptor_routes`].
    fn load_trips(&mut self, gtfs: &mut Gtfs) -> Result<HashMap<String, u32>, self::Error> {
        debug!("Loading trips...");
        let now = Instant::now();
        let mut trip_to_route: HashMap<String, u32> = HashMap::new();
        let mut error = None;
        gtfs.stream_trips(|(_, trip)| {
            if error.is_some() {
                return;
            }
            match self.route_lookup.get(trip.route_id.as_str()) {
                Some(route_idx) => {
                    trip_to_route.insert(trip.trip_id, *route_idx);
                }
                None => error = Some(trip.route_id),
            }
        })?;
        if let Some(route_id) = error {
            return Err(self::Error::UnknownRoute(route_id));
        }
        debug!("Loading {} trips took {:?}", trip_to_route.len(), now.elapsed());
        Ok(trip_to_route)
    }

    fn load_transfers(&mut self, gtfs: &mut Gtfs) -> Result<(), self::Error> {
        debug!("Loading transfers...");
        let now = Instant::now();
        let mut transfers: Vec<Transfer> = Vec::new();
        let mut transfers_by_stop: Vec<Vec<u32>> = vec![Vec::new(); self.stops.len()];
        let mut error = None;
        gtfs.stream_transfers(|(i, value)| {
            if error.is_some() {
                return;
            }
            let (Some(from_idx), Some(to_idx)) = (
                self.stop_lookup.get(value.from_stop_id.as_str()).copied(),
                self.stop_lookup.get(value.to_stop_id.as_str()).copied(),
            ) else {
                error = Some(value.from_stop_id);
                return;
            };
            let duration = Duration::from_seconds(value.min_transfer_time.unwrap_or(0));
            transfers_by_stop[from_idx as usize].push(i as u32);
            transfers.push(Transfer {
                from_stop_idx: from_idx,
                to_stop_idx: to_idx,
                duration,
            });
        })?;
        if let Some(stop_id) = error {
            return Err(self::Error::UnknownStop(stop_id));
        }
        self.transfers = transfers.into();
        self.transfers_by_stop = transfers_by_stop.into_iter().map(|v| v.into()).collect();
        debug!(
            "Loading {} transfers took {:?}",
            self.transfers.len(),
            now.elapsed()
        );
        Ok(())
    }

    /// Groups `stop_times.txt` rows by trip, dropping trips whose arrival
    /// times are not monotonically increasing along the sequence (an
    /// inconsistent schedule the routing core must never see).
    fn load_stop_times(
        &mut self,
        gtfs: &mut Gtfs,
        service_day: Time,
    ) -> Result<HashMap<String, Vec<ScheduledStop>>, self::Error> {
        debug!("Loading stop times...");
        let now = Instant::now();
        let mut by_trip: HashMap<String, Vec<ScheduledStop>> = HashMap::new();
        let mut error = None;
        gtfs.stream_stop_times(|(_, value)| {
            if error.is_some() {
                return;
            }
            let Some(stop_idx) = self.stop_lookup.get(value.stop_id.as_str()).copied() else {
                error = Some(value.stop_id);
                return;
            };
            let Some(arrival) = Time::from_hms_offset(service_day, &value.arrival_time) else {
                return;
            };
            by_trip.entry(value.trip_id).or_default().push(ScheduledStop {
                stop_idx,
                sequence: value.stop_sequence,
                arrival,
            });
        })?;
        if let Some(stop_id) = error {
            return Err(self::Error::UnknownStop(stop_id));
        }

        let mut consistent_count = 0;
        let dropped_before = by_trip.len();
        by_trip.retain(|trip_id, stops| {
            stops.sort_by_key(|s| s.sequence);
            let monotonic = stops.windows(2).all(|w| w[0].arrival <= w[1].arrival);
            if !monotonic {
                warn!("dropping trip {trip_id}: non-monotonic stop_times");
            } else {
                consistent_count += 1;
            }
            monotonic
        });
        debug!(
            "Loading stop times for {}/{} trips took {:?}",
            consistent_count,
            dropped_before,
            now.elapsed()
        );
        Ok(by_trip)
    }

    /// Splits each GTFS route into one [`RaptorRoute`] per distinct stop
    /// sequence actually operated, and derives the per-route cumulative
    /// travel offsets the round engine's modified-scan trip selection uses
    /// (§4.3): the earliest-departing trip on each stop sequence stands in
    /// as the route's synthetic timetable.
    fn generate_raptor_routes(
        &mut self,
        trip_to_route: HashMap<String, u32>,
        trip_stops: HashMap<String, Vec<ScheduledStop>>,
    ) {
        debug!("Generating raptor routes...");
        let now = Instant::now();

        let mut by_signature: HashMap<(u32, Vec<u32>), Vec<String>> = HashMap::new();
        for (trip_id, stops) in &trip_stops {
            let Some(route_idx) = trip_to_route.get(trip_id).copied() else {
                continue;
            };
            let signature: Vec<u32> = stops.iter().map(|s| s.stop_idx).collect();
            by_signature
                .entry((route_idx, signature))
                .or_default()
                .push(trip_id.clone());
        }

        let mut raptor_routes: Vec<RaptorRoute> = Vec::new();
        let mut routes_by_stop: Vec<Vec<u32>> = vec![Vec::new(); self.stops.len()];
        let mut idx_by_route_stop: HashMap<(u32, u32), u32> = HashMap::new();

        let mut signatures: Vec<_> = by_signature.into_iter().collect();
        signatures.sort_by_key(|((route_idx, stops), _)| (*route_idx, stops.clone()));

        for ((route_idx, stops), trip_ids) in signatures {
            let earliest_trip = trip_ids
                .iter()
                .min_by_key(|trip_id| trip_stops[*trip_id][0].arrival)
                .expect("non-empty trip group");
            let schedule = &trip_stops[earliest_trip];
            let anchor = schedule[0].arrival;
            let offsets: Vec<Duration> = schedule.iter().map(|s| s.arrival - anchor).collect();

            let raptor_idx = raptor_routes.len() as u32;
            for (position, stop_idx) in stops.iter().enumerate() {
                routes_by_stop[*stop_idx as usize].push(raptor_idx);
                idx_by_route_stop.insert((raptor_idx, *stop_idx), position as u32);
            }

            raptor_routes.push(RaptorRoute {
                index: raptor_idx,
                route_idx,
                stops: stops.into(),
                offsets: offsets.into(),
            });
        }

        self.raptor_routes = raptor_routes.into();
        self.routes_by_stop = routes_by_stop.into_iter().map(|v| v.into()).collect();
        self.idx_by_route_stop = idx_by_route_stop;
        debug!(
            "Generating {} raptor routes took {:?}",
            self.raptor_routes.len(),
            now.elapsed()
        );
    }

    /// Joins `fare_rules.txt` against `fare_attributes.txt` into a flat
    /// `(origin_stop, destination_stop) -> price` table. Both files are
    /// optional in GTFS; an empty table means every in-vehicle segment is
    /// treated as having no recorded fare (see [`crate::raptor::error`]).
    fn load_fares(&mut self, gtfs: &mut Gtfs) -> Result<(), self::Error> {
        debug!("Loading fares...");
        let now = Instant::now();
        let mut prices: HashMap<String, f64> = HashMap::new();
        gtfs.stream_fare_attributes(|(_, attr)| {
            prices.insert(attr.fare_id, attr.price);
        })?;

        let mut fare: HashMap<(u32, u32), Money> = HashMap::new();
        gtfs.stream_fare_rules(|(_, rule)| {
            let (Some(origin), Some(destination), Some(&price)) = (
                self.stop_lookup.get(rule.origin_id.as_str()),
                self.stop_lookup.get(rule.destination_id.as_str()),
                prices.get(&rule.fare_id),
            ) else {
                return;
            };
            fare.insert((*origin, *destination), Money(price));
        })?;
        self.fare = fare;
        debug!("Loading {} fare edges took {:?}", self.fare.len(), now.elapsed());
        Ok(())
    }
}
