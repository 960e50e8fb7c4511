/// Roster Lookup - student roster search
///
/// Core library that loads per-year student rosters and a pinyin initials
/// table, then resolves free-text queries (student ID, Chinese name, or
/// initials) against them.

pub mod config;
pub mod core;

#[cfg(test)]
mod tests;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
