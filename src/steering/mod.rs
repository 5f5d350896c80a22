// Steering configuration: the user's detection settings.
//
// SteeringConfig is the value type. SteeringManager owns the persisted copy
// and broadcasts changes; scoring code never reads it ambiently, it takes a
// snapshot as an argument.

pub mod config;
pub mod manager;
pub mod store;

pub use config::{ActiveAgents, SteeringConfig, SteeringUpdate, UiTheme};
pub use manager::{SteeringManager, STORAGE_KEY};
pub use store::{MemoryStore, SettingsStore};
