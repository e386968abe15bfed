//! Profsite Server Library
//!
//! JSON API behind a faculty member's academic website: news with
//! representative/member grouping, publications, books and the admin surface
//! that manages them. Exposed as a library for the integration tests.

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod pagination;
pub mod routes;
pub mod services;
