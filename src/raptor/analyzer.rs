use crate::{
    raptor::{error::RaptorError, reconstruct::Leg},
    repository::{Money, Repository},
    shared::time::{Duration, Time},
};

/// Derived timing/cost metrics for one reconstructed journey.
///
/// `ovtt` (out-of-vehicle travel time) is defined as `walk_time + wait_time`
/// by construction, never measured independently, so the identity always
/// holds. A missing fare edge is fatal only for `metro_fare`, not for the
/// rest of the journey's metrics.
#[derive(Debug, Clone)]
pub struct JourneyMetrics {
    pub start_time: Time,
    pub end_time: Time,
    pub walk_time: Duration,
    pub wait_time: Duration,
    pub ovtt: Duration,
    pub ivtt: Duration,
    pub metro_fare: Result<Money, RaptorError>,
    pub num_transfers: u32,
}

/// Derives timing and cost metrics from a reconstructed leg sequence.
///
/// `d_time`, if given, is the caller's requested departure time and anchors
/// `wait_time` at the very first stop. When absent, the first leg's own
/// start time stands in as a pseudo-start-time, so the traveller is assumed
/// to arrive at the origin exactly when they need to and no initial wait is
/// attributed.
pub fn analyze(repository: &Repository, legs: &[Leg], d_time: Option<Time>) -> Option<JourneyMetrics> {
    let first = legs.first()?;
    let last = legs.last()?;

    let start_time = d_time.unwrap_or(leg_start(first));
    let end_time = leg_end(last);

    let mut walk_time = Duration::ZERO;
    let mut ivtt = Duration::ZERO;
    let mut num_transfers: u32 = 0;
    let mut boarded = false;
    let mut metro_fare = Ok(Money::default());

    for leg in legs {
        match leg {
            Leg::Walk { duration, .. } => walk_time += *duration,
            Leg::Ride {
                board_time,
                board_stop,
                alight_stop,
                alight_time,
                ..
            } => {
                ivtt += *alight_time - *board_time;
                if !boarded {
                    boarded = true;
                } else {
                    num_transfers += 1;
                }

                // Each ride leg is its own fare edge; the journey's cost is
                // the sum across legs, not a single origin-to-destination
                // lookup, so a transfer between routes is priced as two
                // fares rather than one through-fare.
                metro_fare = match (metro_fare, repository.fare(*board_stop, *alight_stop)) {
                    (Ok(total), Some(leg_fare)) => Ok(total + leg_fare),
                    (Ok(_), None) => Err(RaptorError::MissingFareEdge {
                        origin: stop_id(repository, *board_stop),
                        destination: stop_id(repository, *alight_stop),
                    }),
                    (Err(err), _) => Err(err),
                };
            }
        }
    }

    let elapsed = end_time - start_time;
    let wait_time = elapsed - walk_time - ivtt;
    let ovtt = walk_time + wait_time;

    Some(JourneyMetrics {
        start_time,
        end_time,
        walk_time,
        wait_time,
        ovtt,
        ivtt,
        metro_fare,
        num_transfers,
    })
}

fn stop_id(repository: &Repository, stop_idx: u32) -> String {
    repository
        .stops
        .get(stop_idx as usize)
        .map(|stop| stop.id.to_string())
        .unwrap_or_default()
}

fn leg_start(leg: &Leg) -> Time {
    match leg {
        Leg::Walk { arrive, duration, .. } => *arrive - *duration,
        Leg::Ride { board_time, .. } => *board_time,
    }
}

fn leg_end(leg: &Leg) -> Time {
    match leg {
        Leg::Walk { arrive, .. } => *arrive,
        Leg::Ride { alight_time, .. } => *alight_time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ride(board: i64, board_stop: u32, alight: i64, alight_stop: u32) -> Leg {
        Leg::Ride {
            board_time: Time::from_epoch_seconds(board),
            board_stop,
            alight_stop,
            alight_time: Time::from_epoch_seconds(alight),
            trip: "R1_0".into(),
        }
    }

    #[test]
    fn ovtt_equals_walk_plus_wait() {
        let repository = Repository::new();
        let legs = vec![ride(0, 0, 600, 1)];
        let metrics = analyze(&repository, &legs, Some(Time::from_epoch_seconds(0))).unwrap();
        assert_eq!(metrics.ovtt, metrics.walk_time + metrics.wait_time);
        assert_eq!(metrics.ivtt, Duration::from_seconds(600));
        assert_eq!(metrics.num_transfers, 0);
    }

    #[test]
    fn pseudo_start_time_used_when_no_d_time() {
        let repository = Repository::new();
        let legs = vec![ride(100, 0, 700, 1)];
        let metrics = analyze(&repository, &legs, None).unwrap();
        assert_eq!(metrics.start_time, Time::from_epoch_seconds(100));
        assert_eq!(metrics.wait_time, Duration::ZERO);
    }

    #[test]
    fn counts_transfers_between_rides() {
        let repository = Repository::new();
        let legs = vec![ride(0, 0, 600, 1), ride(660, 1, 1200, 2)];
        let metrics = analyze(&repository, &legs, Some(Time::from_epoch_seconds(0))).unwrap();
        assert_eq!(metrics.num_transfers, 1);
    }

    #[test]
    fn missing_fare_edge_surfaces_as_typed_error_not_zero() {
        let repository = Repository::new();
        let legs = vec![ride(0, 0, 600, 1)];
        let metrics = analyze(&repository, &legs, Some(Time::from_epoch_seconds(0))).unwrap();
        assert!(matches!(
            metrics.metro_fare,
            Err(RaptorError::MissingFareEdge { .. })
        ));
    }
}
