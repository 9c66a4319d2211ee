//! Command implementations for the crosscheck CLI.
//!
//! `correlate` runs the full ingest-merge-report pipeline over a set of
//! scanner reports; `tools` lists the adapters this build knows how to read.

pub mod correlate;
pub mod tools;
