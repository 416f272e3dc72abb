//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `ProviderGateway` - text generation
//! - `RemoteStore` - the remote source of truth for signed-in users
//! - `LocalStore` - device-local JSON lists
//! - `PersistenceTier` - one backend in the fallback chain
//! - `Notifier` - user-visible notifications

mod local_store;
mod notifier;
mod persistence_tier;
mod provider_gateway;
mod remote_store;

pub use local_store::LocalStore;
pub use notifier::Notifier;
pub use persistence_tier::{
    DurableWrite, PersistenceError, PersistenceTier, ReadQuery, ReadResult, TierKind,
    WriteReceipt,
};
pub use provider_gateway::{
    GenerationMetadata, GenerationRequest, GenerationResponse, ProviderError, ProviderGateway,
    TokenUsage,
};
pub use remote_store::RemoteStore;
