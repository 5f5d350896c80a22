// Pipelines that sit between scoring and storage: recording single
// analyses and scanning batches (e.g. an exported inbox).

pub mod batch;
pub mod record;

pub use record::Recorder;
