pub mod geo;
pub mod time;

pub use geo::*;
pub use time::*;

/// Implemented by network entities that carry a stable external id and a
/// display name, independent of how they're indexed internally.
pub trait Identifiable {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
}
