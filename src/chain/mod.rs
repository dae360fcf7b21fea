//! Chain module - connection to the remote JSON-RPC node

pub mod provider;

pub use provider::{ChainProvider, GasPrice};
