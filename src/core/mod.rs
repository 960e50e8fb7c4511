pub mod logging;

// Roster lookup: dataset loading, query classification, matching
pub mod roster;
