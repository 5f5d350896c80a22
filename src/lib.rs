// Trust Guardian: four-signal content threat scoring
//
// This is the library root. Each module corresponds to a major subsystem:
// detectors produce per-category verdicts, scoring combines them under the
// user's steering settings, and db/pipeline record the results.

pub mod config;
pub mod db;
pub mod detectors;
pub mod mcp;
pub mod output;
pub mod pipeline;
pub mod scoring;
pub mod status;
pub mod steering;
