//! Lease billing and occupancy engine for the Casaora rental platform.
//!
//! The `services` modules hold the pure billing rules plus the rent record
//! guard; `routes` exposes them over HTTP for the dashboard.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod repository;
pub mod routes;
pub mod schemas;
pub mod services;
pub mod state;
