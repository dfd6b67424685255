pub mod aggregate;
pub mod config;
pub mod datasource;
pub mod domain;
pub mod enrich;
pub mod error;
pub mod logging;
pub mod region;
