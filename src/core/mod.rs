// studiolog - core/mod.rs
//
// Core analysis layer: everything between a log file path and a
// caller-facing result shape. Read-only, synchronous, and stateless;
// every call reopens and rescans the file.

pub mod context;
pub mod filter;
pub mod model;
pub mod noise;
pub mod parser;
pub mod retrieve;
pub mod reverse;
pub mod search;
pub mod time;
pub mod triage;
