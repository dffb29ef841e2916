pub mod migrate;
pub mod reservations;
pub mod seed;
