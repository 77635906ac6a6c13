//! JSON-RPC access to an Odoo server.
//!
//! Every call is a `{"jsonrpc":"2.0","method":"call","params":{service,
//! method, args}}` envelope POSTed to `<schema>://<host>:<port>/jsonrpc`.

mod client;
mod envelope;
mod error;
#[cfg(test)]
pub(crate) mod mock;
mod queries;
mod transport;

pub use client::{OdooClient, Record};
pub use envelope::{RpcRequest, decode_response};
pub use error::{Result, RpcError};
pub use transport::{DEFAULT_TIMEOUT, HttpTransport, Transport};
