//! Session-authenticated VIN attribute lookup against the RepairLink parts
//! portal.
//!
//! The portal exposes no public API, so the crate behaves like a
//! human-operated browser: it logs in with form credentials, persists the
//! issued cookies across invocations, and scrapes the attribute data out of
//! server-rendered HTML. The pipeline lives in
//! [`services::lookup::VinLookup`]; every invocation terminates in exactly
//! one [`domain::models::LookupResult`].

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
