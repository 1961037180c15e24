//! Centralized error type for the rackroute umbrella crate.
//!
//! Wraps the subsystem errors so `?` propagates naturally across crate
//! boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Schema: {0}")]
    Schema(#[from] rackroute_schema::SchemaError),

    #[error("Transport: {0}")]
    Transport(#[from] rackroute_midi::TransportError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
