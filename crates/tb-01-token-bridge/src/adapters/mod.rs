//! # Adapters
//!
//! Concrete implementations of the outbound ports.
//!
//! - `InMemoryTokenStore` - Token store without persistence
//! - `TracingStatusSink` / `RecordingStatusSink` - UI status sinks
//! - `SystemTimeSource` / `ManualTimeSource` - Clocks
//! - `TomlConfigLoader` - Config file and environment loading
//! - `InProcessHost` - Host environment over `shared-bus`

pub mod config;
pub mod host;
pub mod status;
pub mod time;
pub mod token_store;

pub use config::{TomlConfigLoader, ENV_CONFIG_PATH, ENV_DEBUG, ENV_SENDER_ORIGIN};
pub use host::InProcessHost;
pub use status::{RecordingStatusSink, TracingStatusSink};
pub use time::{ManualTimeSource, SystemTimeSource};
pub use token_store::InMemoryTokenStore;
