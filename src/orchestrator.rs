//! Turns a prompt into an `LlmResponse`, whatever the backends do

use std::sync::Arc;
use log::{debug, error, trace};
use tokio_util::sync::CancellationToken;
use crate::failover::{try_in_order, ExhaustionReason};
use crate::providers::{HttpTransport, Transport};
use crate::request::{codes, LlmResponse};

impl From<ExhaustionReason> for LlmResponse
{   fn from(reason: ExhaustionReason) -> Self
    {   match reason
        {   ExhaustionReason::AllBackendsFailed => {
              LlmResponse::invalid_input(codes::API_CONNECTION_ERROR)
            }
          , ExhaustionReason::Unparseable(_) => {
              LlmResponse::invalid_input(codes::JSON_PARSE_ERROR)
            }
          , ExhaustionReason::Cancelled => {
              LlmResponse::invalid_input(codes::REQUEST_CANCELLED)
            }
        }
    }
}

/// Sends prompts to the configured backends in priority order.
///
/// Cheap to clone; the backend list is shared and never mutated.
#[derive(Debug)]
pub struct Orchestrator<T = HttpTransport>
{   backends: Arc<[crate::config::BackendConfig]>
  , transport: T
}

impl<T: Clone> Clone for Orchestrator<T>
{   fn clone(&self) -> Self
    {   Orchestrator
        {   backends: Arc::clone(&self.backends)
          , transport: self.transport.clone()
        }
    }
}

impl Orchestrator<HttpTransport>
{   pub fn from_config(config: crate::config::AssistantConfig) -> Self
    {   Orchestrator::new(
          config.backends
        , HttpTransport::new(config.transport)
        )
    }
}

impl<T: Transport> Orchestrator<T>
{   pub fn new(
      backends: Vec<crate::config::BackendConfig>
    , transport: T
    ) -> Self
    {   debug!("Creating Orchestrator with {} backends", backends.len());
        Orchestrator
        {   backends: backends.into()
          , transport
        }
    }

    pub fn backends(&self) -> &[crate::config::BackendConfig]
    {   &self.backends
    }

    pub fn transport(&self) -> &T
    {   &self.transport
    }

    /// Never fails: errors become synthetic `INVALID_INPUT` outcomes.
    pub async fn ask(&self, prompt: &str) -> LlmResponse
    {   self.ask_with_cancel(prompt, CancellationToken::new()).await
    }

    pub async fn ask_with_cancel(
      &self
    , prompt: &str
    , cancel: CancellationToken
    ) -> LlmResponse
    {   let result = try_in_order(&self.backends[..], |config| {
          self.attempt(config, prompt, cancel.clone())
        }).await;

        match result
        {   Ok(response) => response
          , Err(reason) => {
              error!("No backend produced a response: {:?}", reason);
              LlmResponse::from(reason)
            }
        }
    }

    async fn attempt(
      &self
    , config: &crate::config::BackendConfig
    , prompt: &str
    , cancel: CancellationToken
    ) -> Result<LlmResponse, crate::error::Error>
    {   let raw = self.transport
          .send_with_cancel(config, prompt, cancel)
          .await?;
        trace!("Raw output from {}: {}", config.name, raw);

        let value = crate::extract::extract(&raw).map_err(|e| {
          debug!("Unparseable output from {}: {:?}", config.name, raw);
          e
        })?;
        LlmResponse::from_value(value)
    }
}
