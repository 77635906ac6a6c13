//! Query, export and import records of an Odoo server over JSON-RPC.
//!
//! The [`domain`] module turns textual filters such as
//! `[('name','ilike','azure'),'!',('active','=','False')]` into the nested
//! value passed to `search`/`search_read`.

pub mod app;
pub mod config;
pub mod domain;
pub mod loader;
pub mod rpc;
pub mod sinks;
pub mod utils;
