pub mod loader;
pub mod resolver;
pub mod types;

pub use loader::ConfigLoader;
pub use resolver::{resolve_env_vars, resolve_env_vars_strict};
pub use types::{ProbeConfig, Profile, Settings};
