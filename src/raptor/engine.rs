use std::collections::HashMap;

use rayon::prelude::*;

use crate::{
    raptor::state::{BackPointer, LabelStore},
    repository::Repository,
    shared::time::{Duration, Time},
};

/// Runs a single round of the scan: route collection (Phase A), the
/// per-route scan using the modified-scan single-synthetic-trip contract
/// (Phase B), and footpath relaxation (Phase C). Returns `true` if any stop
/// was newly marked, i.e. whether another round could be profitable.
pub fn run_round(
    repository: &Repository,
    store: &mut LabelStore,
    round: usize,
    change_time: Duration,
    destination: Option<u32>,
) -> bool {
    let marked = store.drain();
    if marked.is_empty() {
        return false;
    }

    // Phase A: for every route serving a marked stop, remember only the
    // earliest position on that route we need to (re-)scan from.
    let mut active: HashMap<u32, u32> = HashMap::new();
    for stop in marked {
        for &route_idx in repository.routes_serving_stop(stop) {
            let Some(position) = repository.position_in_route(route_idx, stop) else {
                continue;
            };
            active
                .entry(route_idx)
                .and_modify(|best| {
                    if position < *best {
                        *best = position;
                    }
                })
                .or_insert(position);
        }
    }

    let tau_star = destination.map(|d| store.best(d)).unwrap_or(Time::INF);
    let prev_round = round - 1;

    // Phase B: scan each active route forward from its earliest boarding
    // position, applying the single-synthetic-trip timetable (`offsets`).
    let updates: Vec<(u32, Time, BackPointer)> = active
        .par_iter()
        .flat_map_iter(|(&route_idx, &board_pos)| {
            scan_route(
                repository,
                store,
                prev_round,
                route_idx,
                board_pos,
                tau_star,
                change_time,
            )
        })
        .collect();

    for (stop, time, pointer) in updates {
        store.improve(round, stop, time, pointer);
    }

    // Phase C: relax footpaths from every stop reached by transit this
    // round. Walking never advances the round counter.
    let reached_by_transit = store.marked_snapshot();
    let mut walk_updates: Vec<(u32, Time, BackPointer)> = Vec::new();
    for stop in reached_by_transit {
        let departure = store.label(round, stop);
        for transfer in repository.transfers_from_stop(stop) {
            let arrival = departure + transfer.duration;
            if arrival >= tau_star {
                continue;
            }
            walk_updates.push((
                transfer.to_stop_idx,
                arrival,
                BackPointer::Walk {
                    from: stop,
                    to: transfer.to_stop_idx,
                    duration: transfer.duration,
                    arrive: arrival,
                },
            ));
        }
    }
    for (stop, time, pointer) in walk_updates {
        store.improve(round, stop, time, pointer);
    }

    store.has_marked()
}

/// Scans a route forward from `board_pos`, re-evaluating the boarding point
/// at every stop along the way (not just `board_pos` itself): per §4.2, a
/// stop whose own `label[k-1]` is strictly earlier than what the currently
/// held boarding point implies downstream means an earlier effective
/// boarding exists and takes over. Phase A only keeps the earliest marked
/// position per route precisely because this re-check recovers the rest.
fn scan_route(
    repository: &Repository,
    store: &LabelStore,
    prev_round: usize,
    route_idx: u32,
    board_pos: u32,
    tau_star: Time,
    change_time: Duration,
) -> Vec<(u32, Time, BackPointer)> {
    let route = &repository.raptor_routes[route_idx as usize];
    let trip: std::sync::Arc<str> =
        format!("{}_0", repository.routes[route.route_idx as usize].id).into();

    // The stop currently boarded on this synthetic trip, its boarding time,
    // and its offset. `board_time - board_offset` is the trip's effective
    // start-of-route anchor: the smaller it is, the earlier every
    // downstream arrival becomes.
    let mut boarded: Option<(u32, Time, Duration)> = None;
    let mut updates = Vec::new();

    for i in (board_pos as usize)..route.stops.len() {
        let stop = route.stops[i];
        let offset = route.offsets[i];

        let own_label = store.label(prev_round, stop);
        if own_label.is_reachable() {
            let candidate_time = own_label + change_time;
            let is_earlier_anchor = match boarded {
                None => true,
                Some((_, board_time, board_offset)) => (candidate_time - offset) < (board_time - board_offset),
            };
            if is_earlier_anchor {
                boarded = Some((stop, candidate_time, offset));
            }
        }

        let Some((board_stop, board_time, board_offset)) = boarded else {
            continue;
        };
        if stop == board_stop {
            continue;
        }

        let arrival = board_time + (offset - board_offset);
        if arrival >= tau_star || arrival >= store.best(stop) {
            continue;
        }
        updates.push((
            stop,
            arrival,
            BackPointer::Ride {
                board_time,
                board_stop,
                alight_stop: stop,
                alight_time: arrival,
                trip: trip.clone(),
            },
        ));
    }
    updates
}
