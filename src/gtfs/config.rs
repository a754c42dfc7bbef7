/// File-name conventions for a GTFS-style feed. Overridable for feeds that
/// ship non-standard names while keeping the standard column layout.
pub struct Config {
    pub stops_path: String,
    pub routes_path: String,
    pub trips_path: String,
    pub stop_times_path: String,
    pub transfers_path: String,
    pub fare_rules_path: String,
    pub fare_attributes_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stops_path: "stops.txt".into(),
            routes_path: "routes.txt".into(),
            trips_path: "trips.txt".into(),
            stop_times_path: "stop_times.txt".into(),
            transfers_path: "transfers.txt".into(),
            fare_rules_path: "fare_rules.txt".into(),
            fare_attributes_path: "fare_attributes.txt".into(),
        }
    }
}
