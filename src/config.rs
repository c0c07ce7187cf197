use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::deploy_builder::DEFAULT_GAS_PRICE;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 40401;
pub const DEFAULT_INTERNAL_PORT: u16 = 40402;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
	#[serde(default)]
	pub node: NodeConfig,
	#[serde(default)]
	pub deploy: DeployConfig,
}

/// Where the node listens and how to reach it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
	pub host: String,
	/// Port of the external (casper) service.
	pub port: u16,
	/// Port of the internal (control) service.
	pub internal_port: u16,
	/// TLS server name of the node. Only used with `certificate_file`.
	pub node_id: Option<String>,
	/// PEM certificate to trust; switches the transport to TLS.
	pub certificate_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
	pub gas_price: u64,
}

impl Default for NodeConfig {
	fn default() -> Self {
		Self {
			host: DEFAULT_HOST.into(),
			port: DEFAULT_PORT,
			internal_port: DEFAULT_INTERNAL_PORT,
			node_id: None,
			certificate_file: None,
		}
	}
}

impl Default for DeployConfig {
	fn default() -> Self {
		Self {
			gas_price: DEFAULT_GAS_PRICE,
		}
	}
}

impl Config {
	/// Directory where client state is stored (~/.casper-client/).
	pub fn dir() -> PathBuf {
		dirs::home_dir()
			.unwrap_or_else(|| PathBuf::from("."))
			.join(".casper-client")
	}

	/// Path to the config file.
	pub fn path() -> PathBuf {
		Self::dir().join("config.toml")
	}

	/// Load config from disk, falling back to defaults if no file exists.
	pub fn load() -> anyhow::Result<Self> {
		let path = Self::path();
		if path.exists() {
			let content = std::fs::read_to_string(&path)?;
			Ok(toml::from_str(&content)?)
		} else {
			Ok(Self::default())
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_are_sensible() {
		let c = Config::default();
		assert_eq!(c.node.host, "127.0.0.1");
		assert_eq!(c.node.port, 40401);
		assert_eq!(c.node.internal_port, 40402);
		assert!(c.node.node_id.is_none());
		assert!(c.node.certificate_file.is_none());
		assert_eq!(c.deploy.gas_price, 10);
	}

	#[test]
	fn toml_roundtrip() {
		let mut c = Config::default();
		c.node.host = "node-0".into();
		c.node.node_id = Some("4d7f0e5c".into());
		c.node.certificate_file = Some(PathBuf::from("/etc/casper/node.crt"));

		let serialized = toml::to_string_pretty(&c).unwrap();
		let parsed: Config = toml::from_str(&serialized).unwrap();

		assert_eq!(parsed.node, c.node);
		assert_eq!(parsed.deploy, c.deploy);
	}

	#[test]
	fn partial_file_fills_in_defaults() {
		let parsed: Config = toml::from_str("[node]\nport = 50401\n").unwrap();
		assert_eq!(parsed.node.port, 50401);
		assert_eq!(parsed.node.host, "127.0.0.1");
		assert_eq!(parsed.deploy.gas_price, 10);
	}
}
