pub mod abi;
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod consensus;
pub mod crypto;
pub mod deploy_builder;
pub mod error;
pub mod rpc;
pub mod service;
pub mod state;

pub use client::{CasperApi, CasperClient};
pub use error::ClientError;
