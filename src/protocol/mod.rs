//! MCP protocol implementation
//!
//! This module contains the JSON-RPC envelopes and MCP message types the
//! server exchanges with its client.

pub mod messages;
pub mod methods;
pub mod types;

pub use messages::*;
pub use types::*;

pub use methods::{
    CANCELLED, INITIALIZE, INITIALIZED, PING, PROMPTS_GET, PROMPTS_LIST, TOOLS_CALL, TOOLS_LIST,
};

pub use types::error_codes;
pub use types::{JSONRPC_VERSION, LATEST_PROTOCOL_VERSION, SUPPORTED_PROTOCOL_VERSIONS};
