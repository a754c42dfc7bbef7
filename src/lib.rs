pub mod gtfs;
pub mod raptor;
pub mod repository;
pub mod shared;
pub mod wards;
