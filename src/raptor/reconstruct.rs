use crate::raptor::state::{BackPointer, LabelStore};

/// A single leg of a reconstructed journey, in travel order.
#[derive(Debug, Clone)]
pub enum Leg {
    Walk {
        from: u32,
        to: u32,
        duration: crate::shared::time::Duration,
        arrive: crate::shared::time::Time,
    },
    Ride {
        board_time: crate::shared::time::Time,
        board_stop: u32,
        alight_stop: u32,
        alight_time: crate::shared::time::Time,
        trip: std::sync::Arc<str>,
    },
}

impl From<BackPointer> for Leg {
    fn from(value: BackPointer) -> Self {
        match value {
            BackPointer::Walk {
                from,
                to,
                duration,
                arrive,
            } => Leg::Walk {
                from,
                to,
                duration,
                arrive,
            },
            BackPointer::Ride {
                board_time,
                board_stop,
                alight_stop,
                alight_time,
                trip,
            } => Leg::Ride {
                board_time,
                board_stop,
                alight_stop,
                alight_time,
                trip,
            },
        }
    }
}

/// Walks the label store's back-pointers from `destination`, in round
/// `round`, back to the round-0 departure stop, and returns the legs in
/// travel order. Returns an empty vec if `destination` was not reached by
/// that round.
///
/// Rounds are only decremented on [`BackPointer::Ride`] legs: walking a
/// footpath is free within a round, so the reconstructor must stay on the
/// same round while following a run of walk legs.
pub fn reconstruct_from_round(store: &LabelStore, destination: u32, round: usize) -> Vec<Leg> {
    let mut legs = Vec::new();
    if !store.label(round, destination).is_reachable() {
        return legs;
    }
    let mut round = round;
    let mut stop = destination;

    loop {
        let Some(pointer) = store.pointer(round, stop) else {
            break;
        };
        let is_ride = pointer.is_ride();
        let from = pointer.from_stop();
        legs.push(Leg::from(pointer.clone()));
        stop = from;

        if is_ride {
            if round == 0 {
                break;
            }
            round -= 1;
        }
    }

    legs.reverse();
    legs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::time::{Duration, Time};

    #[test]
    fn unreached_destination_yields_no_legs() {
        let store = LabelStore::new(3, 2);
        assert!(reconstruct_from_round(&store, 2, 1).is_empty());
    }

    #[test]
    fn walk_then_ride_stays_in_round_until_the_ride() {
        let mut store = LabelStore::new(3, 2);
        store.init(0, Time::from_epoch_seconds(0));
        store.improve(
            0,
            1,
            Time::from_epoch_seconds(60),
            BackPointer::Ride {
                board_time: Time::from_epoch_seconds(0),
                board_stop: 0,
                alight_stop: 1,
                alight_time: Time::from_epoch_seconds(60),
                trip: "R1_0".into(),
            },
        );
        store.improve(
            0,
            2,
            Time::from_epoch_seconds(90),
            BackPointer::Walk {
                from: 1,
                to: 2,
                duration: Duration::from_seconds(30),
                arrive: Time::from_epoch_seconds(90),
            },
        );

        let legs = reconstruct_from_round(&store, 2, 0);
        assert_eq!(legs.len(), 2);
        assert!(matches!(legs[0], Leg::Ride { .. }));
        assert!(matches!(legs[1], Leg::Walk { .. }));
    }
}
