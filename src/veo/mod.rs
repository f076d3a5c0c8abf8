//! Veo Proxy Adapter
//!
//! Client-side adapter that forwards Vertex AI Veo video-generation calls
//! to a proxy server exposing simplified endpoints, and maps responses to
//! typed results or [`VeoError`](crate::error::VeoError) failures. The
//! [`proxy`] module serves those endpoints.
//!
//! # Example
//!
//! ```rust,no_run
//! use vemix_web::config::ProxyConfig;
//! use vemix_web::veo::{FetchOperationRequest, VeoClient, VeoModel, VideoGenerationRequest};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = VeoClient::new(ProxyConfig::from_env()?)?;
//!
//!     let request = VideoGenerationRequest::from_prompt("a paper boat drifting down a gutter");
//!     let operation = client.generate_video(VeoModel::Veo3Fast, &request).await?;
//!
//!     let status = client
//!         .fetch_operation(&FetchOperationRequest::new(operation.name))
//!         .await?;
//!     println!("done: {}", status.done);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod proxy;
pub mod types;

pub use client::VeoClient;
pub use proxy::{check_operation_handler, generate_video_handler, proxy_router, ProxyState};
pub use types::{
    FetchOperationRequest, GeneratedVideo, GenerationResult, ImageInput, LongRunningOperation,
    Operation, OperationError, OperationStatus, PersonGeneration, SimplifiedVideoRequest,
    VeoModel, VideoGenerationRequest, VideoInstance, VideoParameters, CHECK_OPERATION_PATH,
    GENERATE_VIDEO_PATH,
};
