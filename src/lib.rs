//! Linkcut - a URL shortener service
//!
//! Short-code resolution and lifecycle engine with user accounts: cached
//! redirects backed by a relational store, expiration enforcement, and
//! background reclamation of expired/inactive links.
//!
//! # Architecture
//! - `cache`: TTL redirect cache (redis / memory / null backends)
//! - `storage`: store traits and the SeaORM backend
//! - `services`: code assignment, redirect resolution, link CRUD,
//!   reclamation sweeps, accounts
//! - `api`: HTTP services (actix-web)
//! - `auth`: JWT issuance/validation and request identity extractors
//! - `config`: static configuration loading
//! - `errors`: crate-wide error taxonomy

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod errors;
pub mod logging;
pub mod services;
pub mod storage;
pub mod utils;
