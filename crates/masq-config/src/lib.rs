//! Configuration for Masquerade
//!
//! This crate turns the host's stored configuration into typed values:
//!
//! - [`Props`] - string-keyed device properties as the host persists them
//! - [`binding_from_props`] - validated conversion into a [`masq_core::Binding`]
//! - [`MasqueradeConfig`] - the `masquerade.yaml` file: plugin preferences,
//!   host fixture and masquerade devices
//!
//! `!env_var NAME` tags in the YAML file are substituted from the process
//! environment.
//!
//! # Example
//!
//! ```ignore
//! use masq_config::load_config;
//!
//! let config = load_config("masquerade.yaml")?;
//! let bindings = config.bindings()?;
//! ```

mod error;
mod loader;
mod prefs;
mod props;

pub use error::{LoadError, LoadResult};
pub use loader::{load_config, load_config_str};
pub use prefs::{BindingConfig, LogLevel, MasqueradeConfig, PluginConfig};
pub use props::{binding_from_props, keys, Props};
