//! Backend transports

pub mod chat_completions;
pub mod stream;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

// Re-export for convenience
pub use chat_completions::HttpTransport;
pub use stream::StreamAccumulator;

/// Performs one request against one backend and returns the raw model
/// text.
#[async_trait]
pub trait Transport: Send + Sync
{   /// Sends `prompt`, aborting at any phase once `cancel` fires.
    async fn send_with_cancel(
      &self
    , config: &crate::config::BackendConfig
    , prompt: &str
    , cancel: CancellationToken
    ) -> Result<String, crate::error::Error>;

    async fn send(
      &self
    , config: &crate::config::BackendConfig
    , prompt: &str
    ) -> Result<String, crate::error::Error>
    {   self.send_with_cancel(config, prompt, CancellationToken::new())
          .await
    }
}
