pub mod archive;
pub mod cli;
pub mod cli_handlers;
pub mod db;
pub mod error;
pub mod fixture;
pub mod roundtrip;
pub mod schema;
pub mod seed;
pub mod verify;

pub use error::{FixtureError, Result};
