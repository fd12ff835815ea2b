pub mod capture;
pub mod date;
pub mod geo;
pub mod period;
pub mod record;
pub mod store;
