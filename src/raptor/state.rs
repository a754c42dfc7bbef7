use std::sync::Arc;

use crate::shared::time::{Duration, Time};

/// How a stop's label in a given round was produced. Riding costs a round;
/// walking a footpath does not.
#[derive(Debug, Clone)]
pub enum BackPointer {
    Walk {
        from: u32,
        to: u32,
        duration: Duration,
        arrive: Time,
    },
    Ride {
        board_time: Time,
        board_stop: u32,
        alight_stop: u32,
        alight_time: Time,
        trip: Arc<str>,
    },
}

impl BackPointer {
    pub fn is_ride(&self) -> bool {
        matches!(self, BackPointer::Ride { .. })
    }

    pub fn from_stop(&self) -> u32 {
        match self {
            BackPointer::Walk { from, .. } => *from,
            BackPointer::Ride { board_stop, .. } => *board_stop,
        }
    }

    pub fn to_stop(&self) -> u32 {
        match self {
            BackPointer::Walk { to, .. } => *to,
            BackPointer::Ride { alight_stop, .. } => *alight_stop,
        }
    }
}

/// The per-query label store: `label[k][p]`, `best[p]`, `pi[k][p]`, and the
/// marked-stop queue that drives the next round's route collection.
pub struct LabelStore {
    rounds: usize,
    num_stops: usize,
    label: Vec<Vec<Time>>,
    best: Vec<Time>,
    pointer: Vec<Vec<Option<BackPointer>>>,
    marked: Vec<u32>,
    marked_mask: Vec<bool>,
}

impl LabelStore {
    pub fn new(num_stops: usize, rounds: usize) -> Self {
        Self {
            rounds,
            num_stops,
            label: vec![vec![Time::INF; num_stops]; rounds],
            best: vec![Time::INF; num_stops],
            pointer: (0..rounds)
                .map(|_| (0..num_stops).map(|_| None).collect())
                .collect(),
            marked: Vec::new(),
            marked_mask: vec![false; num_stops],
        }
    }

    pub fn rounds(&self) -> usize {
        self.rounds
    }

    pub fn num_stops(&self) -> usize {
        self.num_stops
    }

    /// Seeds round 0 with the departure stop and time.
    pub fn init(&mut self, source: u32, d_time: Time) {
        self.label[0][source as usize] = d_time;
        self.best[source as usize] = d_time;
        self.mark(source);
    }

    pub fn label(&self, round: usize, stop: u32) -> Time {
        self.label[round][stop as usize]
    }

    pub fn best(&self, stop: u32) -> Time {
        self.best[stop as usize]
    }

    pub fn pointer(&self, round: usize, stop: u32) -> Option<&BackPointer> {
        self.pointer[round][stop as usize].as_ref()
    }

    /// Idempotent; a stop already marked this round is not re-queued.
    pub fn mark(&mut self, stop: u32) {
        if !self.marked_mask[stop as usize] {
            self.marked_mask[stop as usize] = true;
            self.marked.push(stop);
        }
    }

    /// Returns and clears the marked set.
    pub fn drain(&mut self) -> Vec<u32> {
        let drained = std::mem::take(&mut self.marked);
        for stop in &drained {
            self.marked_mask[*stop as usize] = false;
        }
        drained
    }

    /// A snapshot of the currently marked stops, without draining them.
    pub fn marked_snapshot(&self) -> Vec<u32> {
        self.marked.clone()
    }

    pub fn has_marked(&self) -> bool {
        !self.marked.is_empty()
    }

    /// Applies a candidate improvement at `(round, stop)`, updating `best`
    /// and marking the stop for the next phase. No-op if not an improvement.
    pub fn improve(&mut self, round: usize, stop: u32, time: Time, pointer: BackPointer) -> bool {
        if time >= self.label[round][stop as usize] {
            return false;
        }
        self.label[round][stop as usize] = time;
        if time < self.best[stop as usize] {
            self.best[stop as usize] = time;
        }
        self.pointer[round][stop as usize] = Some(pointer);
        self.mark(stop);
        true
    }
}

#[test]
fn improve_updates_best_and_marks_stop() {
    let mut store = LabelStore::new(4, 3);
    store.init(0, Time::from_epoch_seconds(0));
    assert_eq!(store.best(0), Time::from_epoch_seconds(0));

    let improved = store.improve(
        1,
        2,
        Time::from_epoch_seconds(100),
        BackPointer::Walk {
            from: 0,
            to: 2,
            duration: Duration::from_seconds(100),
            arrive: Time::from_epoch_seconds(100),
        },
    );
    assert!(improved);
    assert_eq!(store.best(2), Time::from_epoch_seconds(100));
    assert_eq!(store.drain(), vec![2]);
}

#[test]
fn improve_rejects_non_improving_candidate() {
    let mut store = LabelStore::new(2, 2);
    store.improve(
        0,
        1,
        Time::from_epoch_seconds(50),
        BackPointer::Walk {
            from: 0,
            to: 1,
            duration: Duration::from_seconds(50),
            arrive: Time::from_epoch_seconds(50),
        },
    );
    let improved = store.improve(
        0,
        1,
        Time::from_epoch_seconds(60),
        BackPointer::Walk {
            from: 0,
            to: 1,
            duration: Duration::from_seconds(60),
            arrive: Time::from_epoch_seconds(60),
        },
    );
    assert!(!improved);
    assert_eq!(store.best(1), Time::from_epoch_seconds(50));
}
