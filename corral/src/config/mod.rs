//! Configuration for the corral scheduler.
//!
//! Configuration selects the boot-provisioning variant and describes the
//! external collaborators the lifecycle engine drives: the boot-config
//! directory tree, the provisioning service, and the network isolation
//! command. It is consumed, not owned, by the core: the CLI loads it once
//! at startup and wires the backends from it.

mod loader;
mod schema;

pub use loader::{load_config, resolve_config_path};
pub use schema::{BootConfig, BootMode, Config, NetworkConfig};
