use transit_skim_core::{
    gtfs::Gtfs,
    raptor::{self, Leg},
    repository::{Money, Repository},
    shared::time::{Duration, Time},
};

fn toy_repository() -> Repository {
    let fixture_dir = format!("{}/tests/fixtures/toy_gtfs", env!("CARGO_MANIFEST_DIR"));
    let mut gtfs = Gtfs::new().from_directory(fixture_dir);
    Repository::from_gtfs(&mut gtfs, Time::from_epoch_seconds(0)).expect("toy fixture loads")
}

fn d_time() -> Time {
    Time::from_epoch_seconds(1000)
}

#[test]
fn direct_ride_is_the_only_a_to_c_journey() {
    let repository = toy_repository();
    let a = repository.stop_idx_by_id("A").unwrap();
    let c = repository.stop_idx_by_id("C").unwrap();

    let (report, _trips) = raptor::raptor(
        &repository,
        a,
        c,
        d_time(),
        2,
        Some(Duration::from_seconds(1)),
        Duration::ZERO,
    );

    assert_eq!(report.journeys.len(), 1);
    let journey = &report.journeys[0];
    assert_eq!(journey.metrics.end_time, Time::from_epoch_seconds(1600));
    assert_eq!(journey.metrics.num_transfers, 0);
    assert_eq!(journey.metrics.ivtt, Duration::from_seconds(600));
    assert_eq!(journey.metrics.metro_fare.clone().unwrap(), Money(10.0));
}

#[test]
fn a_to_d_pareto_frontier_has_two_non_dominating_journeys() {
    let repository = toy_repository();
    let a = repository.stop_idx_by_id("A").unwrap();
    let d = repository.stop_idx_by_id("D").unwrap();

    let (report, _trips) = raptor::raptor(
        &repository,
        a,
        d,
        d_time(),
        2,
        Some(Duration::from_seconds(1)),
        Duration::ZERO,
    );

    assert_eq!(report.journeys.len(), 2);

    let zero_transfer = &report.journeys[0];
    assert_eq!(zero_transfer.metrics.num_transfers, 0);
    assert_eq!(zero_transfer.metrics.end_time, Time::from_epoch_seconds(1720));
    assert!(matches!(zero_transfer.legs.as_slice(), [Leg::Ride { .. }, Leg::Walk { .. }]));

    let one_transfer = &report.journeys[1];
    assert_eq!(one_transfer.metrics.num_transfers, 1);
    assert_eq!(one_transfer.metrics.end_time, Time::from_epoch_seconds(1700));
    assert_eq!(one_transfer.metrics.metro_fare.clone().unwrap(), Money(12.0));
    assert!(matches!(one_transfer.legs.as_slice(), [Leg::Ride { .. }, Leg::Ride { .. }]));

    assert_eq!(report.fastest().unwrap().metrics.num_transfers, 1);
}

#[test]
fn trivial_same_stop_query_yields_an_empty_journey() {
    let repository = toy_repository();
    let a = repository.stop_idx_by_id("A").unwrap();

    let (report, _trips) = raptor::raptor(&repository, a, a, d_time(), 2, None, Duration::ZERO);

    assert_eq!(report.journeys.len(), 1);
    let journey = &report.journeys[0];
    assert!(journey.legs.is_empty());
    assert_eq!(journey.metrics.num_transfers, 0);
    assert_eq!(journey.metrics.end_time, d_time());
}

#[test]
fn destination_with_no_reverse_edge_is_unreachable() {
    let repository = toy_repository();
    let a = repository.stop_idx_by_id("A").unwrap();
    let c = repository.stop_idx_by_id("C").unwrap();

    let (report, _trips) = raptor::raptor(&repository, c, a, d_time(), 2, None, Duration::ZERO);
    assert!(report.journeys.is_empty());
}

#[test]
fn one_to_many_builds_one_frontier_per_destination_and_unions_trips() {
    let repository = toy_repository();
    let a = repository.stop_idx_by_id("A").unwrap();
    let c = repository.stop_idx_by_id("C").unwrap();
    let d = repository.stop_idx_by_id("D").unwrap();

    let (reports, trips) = raptor::raptor_one_to_many(
        &repository,
        a,
        &[c, d],
        d_time(),
        2,
        Some(Duration::from_seconds(1)),
        Duration::ZERO,
    );

    assert_eq!(reports.len(), 2);
    assert!(!reports[&c].journeys.is_empty());
    assert!(!reports[&d].journeys.is_empty());

    // R1 carries every A->C and A->D itinerary; R2 only the one-transfer A->D ride.
    assert!(trips.iter().any(|trip| trip.starts_with("R1")));
    assert!(trips.iter().any(|trip| trip.starts_with("R2")));
}
