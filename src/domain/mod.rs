//! Domain layer - pure types and rules with no I/O.

pub mod conversation;
pub mod export;
pub mod foundation;
pub mod insight;
pub mod notification;
pub mod routing;
pub mod seed;
