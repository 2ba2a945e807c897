pub mod client;
pub mod error;
pub mod types;

pub use client::RemovalClient;
pub use error::ApiError;
pub use types::{HealthResponse, RemovalRequest, RemovedImage};

/// Anything that can take an encoded image and hand back its cut-out.
#[allow(async_fn_in_trait)]
pub trait RemovalService {
    async fn remove_background(&self, req: &RemovalRequest) -> Result<RemovedImage, ApiError>;
}
