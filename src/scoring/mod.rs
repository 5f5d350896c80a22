// Scoring: strictness adjustment, aggregation, and the analyzer that runs
// the detectors for one content item.

pub mod aggregate;
pub mod analyzer;
pub mod haunt;
pub mod promotional;
pub mod strictness;

pub use aggregate::{aggregate, AggregateScore};
pub use analyzer::{Analysis, Analyzer};
