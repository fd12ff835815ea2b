pub mod common;
pub mod expense;
pub mod import;
pub mod periods;
pub mod records;
pub mod revenue;
pub mod summary;
pub mod trip;
