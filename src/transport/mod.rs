//! Transport layer implementations
//!
//! The server speaks newline-delimited JSON-RPC over stdio.

pub mod stdio;
pub mod traits;

pub use stdio::StdioServerTransport;
pub use traits::{ServerRequestHandler, ServerTransport, TransportConfig};
