//! Sites external points (ward centroids) against the transit network:
//! finds each ward's nearest stop and the walking access/egress time to
//! reach it. Grounded on `build_nearest_metro_station_dict` in the original
//! Python dict-builder module.

use std::{fs::File, io::BufReader, path::Path};

use serde::Deserialize;
use thiserror::Error;

use crate::{
    repository::{Repository, Stop},
    shared::{geo::Coordinate, time::Duration},
};

/// Average unobstructed walking speed used to convert access/egress
/// distance into time, matching the original's siting assumption.
pub const WALKING_SPEED_M_PER_MIN: f32 = 1.34 * 60.0;

#[derive(Debug, Deserialize)]
struct WardRecord {
    ward_no: String,
    ward_lat: f32,
    ward_lon: f32,
}

/// A ward (or other named zone) centroid to be sited against the network.
#[derive(Debug, Clone)]
pub struct Ward {
    pub ward_no: String,
    pub coordinate: Coordinate,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// Reads a ward CSV with columns `ward_no,ward_lat,ward_lon`.
pub fn load_wards<P: AsRef<Path>>(path: P) -> Result<Vec<Ward>, self::Error> {
    let file = File::open(path)?;
    let reader = BufReader::with_capacity(128 * 1024, file);
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut wards = Vec::new();
    for result in csv_reader.deserialize() {
        let record: WardRecord = result?;
        wards.push(Ward {
            ward_no: record.ward_no,
            coordinate: Coordinate::new(record.ward_lat, record.ward_lon),
        });
    }
    Ok(wards)
}

/// A ward with its nearest stop and the walking time to/from it.
#[derive(Debug, Clone)]
pub struct WardSite<'a> {
    pub ward: &'a Ward,
    pub stop: &'a Stop,
    pub access_egress_time: Duration,
}

/// Sites every ward against its nearest stop in the repository.
///
/// `O(|wards| * |stops|)`: fine for the modest number of wards a skim batch
/// covers, reusing [`Repository::nearest_stop`]'s linear scan rather than
/// standing up a spatial index for a one-shot siting pass.
pub fn site_wards<'a>(repository: &'a Repository, wards: &'a [Ward]) -> Vec<WardSite<'a>> {
    wards
        .iter()
        .filter_map(|ward| {
            let (stop, distance) = repository.nearest_stop(&ward.coordinate)?;
            let minutes = distance.as_meters() / WALKING_SPEED_M_PER_MIN;
            Some(WardSite {
                ward,
                stop,
                access_egress_time: Duration::from_seconds((minutes * 60.0).round() as i64),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo_with_one_stop() -> Repository {
        let mut repo = Repository::new();
        repo.stops = vec![Stop {
            index: 0,
            id: "S1".into(),
            name: "Central".into(),
            coordinate: Coordinate::new(0.0, 0.0),
        }]
        .into();
        repo
    }

    #[test]
    fn sites_ward_to_nearest_stop() {
        let repository = repo_with_one_stop();
        let wards = vec![Ward {
            ward_no: "W1".to_string(),
            coordinate: Coordinate::new(0.01, 0.01),
        }];
        let sites = site_wards(&repository, &wards);
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].stop.id.as_ref(), "S1");
        assert!(sites[0].access_egress_time > Duration::ZERO);
    }
}
