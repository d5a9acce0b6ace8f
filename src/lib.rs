//! Companion tool for the Service Designer test-step page.
//!
//! Attaches to the live page through a Node.js sidecar session, discovers the
//! step's input rows with a set of reverse-engineered DOM heuristics, exposes
//! them as one JSON document, and writes edited values back while replaying
//! the event sequence the host framework's change detection expects.

pub mod browser;
pub mod cli;
pub mod designer;
pub mod scan;
pub mod sync;
pub mod trace;
