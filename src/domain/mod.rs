pub mod errors;
pub mod health;
pub mod host;
pub mod logging;
pub mod meter;
