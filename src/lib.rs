//! Assistant Orchestrator - conversation engine for a dashboard AI assistant.
//!
//! The crate follows a hexagonal layout:
//!
//! - `domain` holds pure types and rules (messages, routing, insights, export)
//! - `ports` declares the async seams (provider gateway, remote and local stores, notifier)
//! - `adapters` implements those seams (HTTP, file, in-memory)
//! - `application` wires everything into handlers and the [`AssistantSession`] facade
//!
//! [`AssistantSession`]: application::AssistantSession

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
