//! Roster Unit Tests
//!
//! Suites that need more setup than an inline `#[cfg(test)]` module:
//! - HTTP source behavior against a wiremock server
//! - Local directory source against temp fixtures
//! - Progressive loading through `LiveRoster`
//! - End-to-end lookup scenarios

mod live_roster_tests;
mod scenario_tests;
