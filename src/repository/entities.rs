use std::{fmt::Display, sync::Arc};

use crate::shared::{Identifiable, geo::Coordinate, time::Duration};

/// A physical point where passengers can board or alight from a vehicle.
#[derive(Debug, Default, Clone)]
pub struct Stop {
    /// The global internal index for this stop.
    pub index: u32,
    /// Unique external identifier for the stop.
    pub id: Arc<str>,
    /// Human-readable name (e.g., "Main St & 4th Ave").
    pub name: Arc<str>,
    pub coordinate: Coordinate,
}

impl Identifiable for Stop {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A grouping of trips that are displayed to riders under a single name (e.g., "Blue Line").
#[derive(Debug, Default, Clone)]
pub struct Route {
    pub index: u32,
    pub id: Arc<str>,
    pub short_name: Option<Arc<str>>,
    pub long_name: Option<Arc<str>>,
    /// Classification of the vehicle (0: Tram, 1: Subway, 3: Bus, etc.).
    pub route_type: i32,
}

/// An optimized route structure strictly for the RAPTOR algorithm.
///
/// Unlike a standard [`Route`], a `RaptorRoute` guarantees that every trip
/// within it shares the *exact same stop sequence*. The round engine never
/// searches a trip table directly: it treats the route as a single synthetic
/// trip whose per-stop time is `boarding_time + offsets[stop_position]`
/// (see [`crate::raptor::engine`]).
#[derive(Debug, Default, Clone)]
pub struct RaptorRoute {
    /// Internal index of this RAPTOR-specific route.
    pub index: u32,
    /// Pointer back to the display-level [`Route`].
    pub route_idx: u32,
    /// Stop indices served by this route, in travel order.
    pub stops: Arc<[u32]>,
    /// Cumulative travel offset from the route's first stop to each stop in
    /// `stops`. `offsets[0]` is always zero.
    pub offsets: Arc<[Duration]>,
}

/// A walking connection between two stops.
#[derive(Debug, Default, Clone, Copy)]
pub struct Transfer {
    pub from_stop_idx: u32,
    pub to_stop_idx: u32,
    pub duration: Duration,
}

/// A monetary amount, kept distinct from a bare `f64` so fare arithmetic
/// can't silently mix with time or distance values.
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd)]
pub struct Money(pub f64);

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl std::ops::Add for Money {
    type Output = Money;
    fn add(self, rhs: Self) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}
