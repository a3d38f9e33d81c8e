//! Shared data model layer (structs/constants only).
//!
//! Domain types are data-only: no filesystem or network side effects. Changes
//! here affect the `--json` output schema; keep them explicit and reviewable.

pub mod models;
