use std::{path::PathBuf, process, time::Instant};

use clap::Parser;
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};
use transit_skim_core::{
    gtfs::Gtfs,
    raptor,
    repository::Repository,
    shared::time::{Duration, Time},
    wards::{self, WardSite},
};

/// Computes a ward-to-ward Pareto-optimal transit skim matrix from a GTFS feed.
#[derive(Parser, Debug)]
#[command(name = "transit-skim", version, about)]
struct Args {
    /// GTFS feed directory or zip archive.
    #[arg(long)]
    gtfs: PathBuf,

    /// Ward CSV with columns `ward_no,ward_lat,ward_lon`.
    #[arg(long)]
    wards: PathBuf,

    /// Departure time of day, `HH:MM:SS`, applied to every ward pair.
    #[arg(long, default_value = "08:00:00")]
    departure: String,

    /// Output CSV path.
    #[arg(long)]
    output: PathBuf,

    /// Maximum number of vehicle boardings to explore per query.
    #[arg(long, default_value_t = 6)]
    max_transfers: u32,

    /// Minimum dwell time added before boarding, in seconds.
    #[arg(long, default_value_t = 0)]
    change_time_sec: i64,
}

#[derive(Error, Debug)]
enum Error {
    #[error(transparent)]
    Gtfs(#[from] transit_skim_core::gtfs::Error),
    #[error(transparent)]
    Repository(#[from] transit_skim_core::repository::source::Error),
    #[error(transparent)]
    Wards(#[from] wards::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid --departure time: {0}")]
    InvalidDeparture(String),
}

#[derive(Debug, Serialize)]
struct SkimRow {
    source_ward: String,
    destination_ward: String,
    source_metro_station: String,
    destination_metro_station: String,
    ivtt: f64,
    ovtt: f64,
    waiting_time: f64,
    transfer_time: f64,
    metro_fare: f64,
    access_time: f64,
    egress_time: f64,
    num_transfer: u32,
}

fn main() {
    tracing_subscriber::fmt().init();

    let args = Args::parse();
    if let Err(err) = run(args) {
        error!("{err}");
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), self::Error> {
    info!("Loading GTFS feed from {:?}...", args.gtfs);
    let now = Instant::now();
    let mut gtfs = if args.gtfs.extension().is_some_and(|ext| ext == "zip") {
        Gtfs::new().from_zip(&args.gtfs)?
    } else {
        Gtfs::new().from_directory(&args.gtfs)
    };

    let service_day = Time::from_epoch_seconds(0);
    let repository = Repository::from_gtfs(&mut gtfs, service_day)?;
    info!(
        "Loaded {} stops, {} routes in {:?}",
        repository.stops.len(),
        repository.routes.len(),
        now.elapsed()
    );

    let departure_offset = Duration::from_hms(&args.departure)
        .ok_or_else(|| self::Error::InvalidDeparture(args.departure.clone()))?;
    let departure = service_day + departure_offset;

    info!("Loading wards from {:?}...", args.wards);
    let wards = wards::load_wards(&args.wards)?;
    let sites = wards::site_wards(&repository, &wards);
    info!("Sited {}/{} wards to a nearest stop", sites.len(), wards.len());

    info!("Computing skim over {} ward pairs...", sites.len() * sites.len());
    let now = Instant::now();
    let rows: Vec<SkimRow> = sites
        .par_iter()
        .flat_map_iter(|origin| {
            sites
                .iter()
                .filter(move |destination| destination.stop.index != origin.stop.index)
                .flat_map(move |destination| skim_pair(&repository, origin, destination, departure, &args))
        })
        .collect();
    info!("Computed {} itineraries in {:?}", rows.len(), now.elapsed());

    let mut writer = csv::Writer::from_path(&args.output)?;
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    info!("Wrote {} rows to {:?}", rows.len(), args.output);

    Ok(())
}

fn skim_pair(
    repository: &Repository,
    origin: &WardSite<'_>,
    destination: &WardSite<'_>,
    departure: Time,
    args: &Args,
) -> Vec<SkimRow> {
    let d_time = departure + origin.access_egress_time;
    let (report, _trips) = raptor::raptor(
        repository,
        origin.stop.index,
        destination.stop.index,
        d_time,
        args.max_transfers,
        None,
        Duration::from_seconds(args.change_time_sec),
    );

    report
        .journeys
        .iter()
        .map(|journey| {
            let metro_fare = journey.metrics.metro_fare.clone().unwrap_or_else(|err| {
                warn!(
                    "{} -> {}: {err}, recording fare as 0",
                    origin.ward.ward_no, destination.ward.ward_no
                );
                transit_skim_core::repository::Money::default()
            });
            SkimRow {
                source_ward: origin.ward.ward_no.clone(),
                destination_ward: destination.ward.ward_no.clone(),
                source_metro_station: origin.stop.id.to_string(),
                destination_metro_station: destination.stop.id.to_string(),
                ivtt: minutes(journey.metrics.ivtt),
                // Door-to-door out-of-vehicle time: in-network walk/wait plus
                // the access and egress legs outside the transit network,
                // matching the original's `ovtt/60 + access_time + egress_time`.
                ovtt: round2(
                    journey.metrics.ovtt.as_minutes()
                        + origin.access_egress_time.as_minutes()
                        + destination.access_egress_time.as_minutes(),
                ),
                waiting_time: minutes(journey.metrics.wait_time),
                transfer_time: minutes(journey.metrics.walk_time),
                metro_fare: (metro_fare.0 * 100.0).round() / 100.0,
                access_time: minutes(origin.access_egress_time),
                egress_time: minutes(destination.access_egress_time),
                num_transfer: journey.metrics.num_transfers,
            }
        })
        .collect()
}

fn minutes(duration: Duration) -> f64 {
    round2(duration.as_minutes())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
