//! Live departure board for two Tricity public transport stops.
//!
//! A background poller fetches departures for both stops from the ZTM
//! Gdańsk open-data API, normalizes them into Warsaw-time records and keeps
//! the latest snapshot per stop in memory. The web layer serves those
//! snapshots as JSON and as an auto-refreshing HTML page; the `board-cli`
//! binary renders the JSON in a terminal.

pub mod cli;
pub mod config;
pub mod domain;
pub mod logging;
pub mod poller;
pub mod server;
pub mod snapshot;
pub mod web;
pub mod ztm;
