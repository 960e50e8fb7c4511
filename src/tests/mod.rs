//! Crate-internal test suites.
//!
//! - `common`: shared fixtures and an in-memory `RosterSource`
//! - `property`: proptest invariants for classification, aggregation, search
//! - `unit`: source, loader and end-to-end scenario tests

mod property;
mod unit;
