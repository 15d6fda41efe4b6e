//! Library entrypoint: re-export modules

pub mod errors;
pub mod feeds;
pub mod html;
pub mod index;
pub mod ingest;
pub mod limits;
pub mod query;
