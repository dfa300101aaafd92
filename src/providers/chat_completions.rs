use std::future::Future;
use std::time::Duration;
use async_trait::async_trait;
use log::{debug, trace, info, warn};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use crate::providers::stream::StreamAccumulator;

// ===== Message Types =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: String
  , pub content: String
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest
{   pub model: String
  , pub messages: Vec<ChatMessage>
  , pub temperature: f32
  , pub stream: bool
}

impl ChatCompletionRequest
{   /// Single user turn, streamed.
    pub fn streaming(
      model: &str
    , prompt: &str
    , temperature: f32
    ) -> Self
    {   ChatCompletionRequest
        {   model: model.to_string()
          , messages: vec![
              ChatMessage
              {   role: "user".to_string()
                , content: prompt.to_string()
              }
            ]
          , temperature
          , stream: true
        }
    }
}

// ===== HTTP Transport =====

/// Streams chat completions from OpenAI-compatible endpoints
#[derive(Debug, Clone)]
pub struct HttpTransport
{   http_client: reqwest::Client
  , settings: crate::config::TransportConfig
}

impl HttpTransport
{   pub fn new(settings: crate::config::TransportConfig) -> Self
    {   debug!("Creating HttpTransport");
        Self::with_client(reqwest::Client::new(), settings)
    }

    pub fn with_client(
      http_client: reqwest::Client
    , settings: crate::config::TransportConfig
    ) -> Self
    {   HttpTransport
        {   http_client
          , settings
        }
    }

    pub fn settings(&self) -> &crate::config::TransportConfig
    {   &self.settings
    }
}

impl Default for HttpTransport
{   fn default() -> Self
    {   HttpTransport::new(crate::config::TransportConfig::default())
    }
}

#[async_trait]
impl crate::providers::Transport for HttpTransport
{   async fn send_with_cancel(
      &self
    , config: &crate::config::BackendConfig
    , prompt: &str
    , cancel: CancellationToken
    ) -> Result<String, crate::error::Error>
    {   config.validate()?;
        debug!("Trying backend: {}", config.name);

        let request = ChatCompletionRequest::streaming(
          &config.model_id
        , prompt
        , self.settings.temperature
        );
        trace!("Chat request for {}: {:?}", config.name, request);

        let ttfb = self.settings.ttfb_timeout();
        let first_byte = async {
          let mut response = self.http_client
            .post(&config.endpoint_url)
            .header("Authorization", format!("Bearer {}", config.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(network_error)?;

          let status = response.status();
          trace!("{} response status: {}", config.name, status);
          if !status.is_success()
          {   return Err(crate::error::Error::Http
              {   status: status.as_u16()
                , body: status.canonical_reason()
                    .unwrap_or_default()
                    .to_string()
              });
          }

          let first = response.chunk().await.map_err(network_error)?;
          Ok::<_, crate::error::Error>((response, first))
        };

        // The deadline covers everything up to the first body chunk.
        let (mut response, first) = tokio::select!
        {   biased;
            _ = cancel.cancelled() => {
              debug!("{} cancelled before first byte", config.name);
              return Err(crate::error::Error::Cancelled);
            }
          , result = tokio::time::timeout(ttfb, first_byte) => {
              match result
              {   Ok(opened) => opened?
                , Err(_) => {
                    warn!(
                      "{} sent nothing within {}ms",
                      config.name,
                      ttfb.as_millis()
                    );
                    return Err(crate::error::Error::Timeout(ttfb));
                  }
              }
            }
        };

        let mut accumulator = StreamAccumulator::new();
        match first
        {   Some(bytes) => accumulator.push(&bytes)
          , None => {
              debug!("{} closed the stream without a body", config.name);
              return Ok(accumulator.finish());
            }
        }
        info!("{} started responding, streaming", config.name);

        let idle = self.settings.idle_timeout();
        loop
        {   let next = tokio::select!
            {   biased;
                _ = cancel.cancelled() => {
                  debug!("{} cancelled mid-stream", config.name);
                  return Err(crate::error::Error::Cancelled);
                }
              , next = within(idle, response.chunk()) => {
                  next?.map_err(network_error)?
                }
            };
            match next
            {   Some(bytes) => accumulator.push(&bytes)
              , None => break
            }
        }

        if accumulator.skipped_lines() > 0
        {   warn!(
              "{} produced {} malformed stream lines",
              config.name,
              accumulator.skipped_lines()
            );
        }
        let text = accumulator.finish();
        debug!("{} finished streaming {} bytes", config.name, text.len());
        Ok(text)
    }
}

/// Awaits `fut`, bounded by `limit` when one is set.
async fn within<F, T>(
  limit: Option<Duration>
, fut: F
) -> Result<T, crate::error::Error>
where
  F: Future<Output = T>
{   match limit
    {   Some(limit) => tokio::time::timeout(limit, fut)
          .await
          .map_err(|_| crate::error::Error::IdleTimeout(limit))
      , None => Ok(fut.await)
    }
}

fn network_error(e: reqwest::Error) -> crate::error::Error
{   crate::error::Error::Network(e.to_string())
}

#[cfg(test)]
mod tests
{   use super::*;

    #[tokio::test]
    async fn stalled_read_trips_idle_limit()
    {   let limit = Duration::from_millis(20);
        let result = within(Some(limit), std::future::pending::<()>()).await;
        assert_eq!(result, Err(crate::error::Error::IdleTimeout(limit)));
    }

    #[tokio::test]
    async fn reads_are_unbounded_without_a_limit()
    {   let slow = async {
          tokio::time::sleep(Duration::from_millis(30)).await;
          7
        };
        assert_eq!(within(None, slow).await, Ok(7));
    }

    #[test]
    fn request_body_matches_wire_protocol()
    {   let request = ChatCompletionRequest::streaming("m", "hi", 0.1);
        let wire = serde_json::to_string(&request).unwrap();
        let body: serde_json::Value = serde_json::from_str(&wire).unwrap();
        assert_eq!(body, serde_json::json!({
          "model": "m",
          "messages": [{"role": "user", "content": "hi"}],
          "temperature": 0.1,
          "stream": true
        }));
    }
}
