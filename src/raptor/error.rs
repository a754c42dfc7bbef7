use thiserror::Error;

/// Fatal errors from a RAPTOR query. An unreachable destination is not one
/// of these: it is modeled as an empty journey list, ordinary control flow
/// rather than a failure.
#[derive(Error, Debug, Clone)]
pub enum RaptorError {
    #[error("stop or route id does not match any entry in the network: {0}")]
    UnknownStopOrRoute(String),
    #[error("no fare edge between stop {origin} and stop {destination}")]
    MissingFareEdge { origin: String, destination: String },
    #[error("trip {0} has inconsistent (non-monotonic) stop times")]
    InconsistentTrip(String),
}
