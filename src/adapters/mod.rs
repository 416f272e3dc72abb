//! Adapters - Implementations of port interfaces.
//!
//! - `gateway` - HTTP and mock provider gateways
//! - `remote` - HTTP and in-memory remote stores
//! - `local` - file-backed and in-memory device stores
//! - `tiers` - persistence tiers over the stores
//! - `notify` - notifier sinks

pub mod gateway;
pub mod local;
pub mod notify;
pub mod remote;
pub mod tiers;
