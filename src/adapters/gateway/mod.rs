//! Provider gateway adapters.

mod http_gateway;
mod mock_gateway;

pub use http_gateway::{HttpGatewayConfig, HttpProviderGateway};
pub use mock_gateway::MockProviderGateway;
