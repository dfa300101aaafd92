#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use notellm::providers::Transport;
use notellm::{BackendConfig, Error};

pub fn init_test_logging()
{   let _ = env_logger::builder().is_test(true).try_init();
}

pub fn backend(name: &str) -> BackendConfig
{   BackendConfig::new(
      name
    , format!("http://{}.invalid/v1/chat/completions", name)
    , "test-model"
    , "test-key"
    )
}

/// Model output for a compliant success.
pub fn success_json(text: &str) -> String
{   serde_json::json!({
      "outcome": {"status": "success", "code": "OK", "violation_category": null},
      "data": {"rewritten_text": text, "detected_language": "en"}
    }).to_string()
}

/// One `data:` line per piece, then the `[DONE]` sentinel.
pub fn sse_body(pieces: &[&str]) -> String
{   let mut body = String::new();
    for piece in pieces
    {   body.push_str(&format!(
          "data: {}\n\n",
          serde_json::json!({"choices": [{"delta": {"content": piece}}]})
        ));
    }
    body.push_str("data: [DONE]\n\n");
    body
}

/// Replies per backend name and records the order of calls.
#[derive(Clone, Default)]
pub struct ScriptedTransport
{   replies: Arc<HashMap<String, Result<String, Error>>>
  , calls: Arc<Mutex<Vec<String>>>
}

impl ScriptedTransport
{   pub fn new(replies: Vec<(&str, Result<String, Error>)>) -> Self
    {   ScriptedTransport
        {   replies: Arc::new(
              replies.into_iter()
                .map(|(name, reply)| (name.to_string(), reply))
                .collect()
            )
          , calls: Arc::default()
        }
    }

    pub fn calls(&self) -> Vec<String>
    {   self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport
{   async fn send_with_cancel(
      &self
    , config: &BackendConfig
    , _prompt: &str
    , _cancel: CancellationToken
    ) -> Result<String, Error>
    {   self.calls.lock().unwrap().push(config.name.clone());
        self.replies
          .get(&config.name)
          .cloned()
          .unwrap_or_else(|| Err(Error::Network("no script".to_string())))
    }
}

/// Never answers; returns only once cancelled.
#[derive(Clone, Default)]
pub struct HangingTransport
{   pub started: Arc<Notify>
}

#[async_trait]
impl Transport for HangingTransport
{   async fn send_with_cancel(
      &self
    , _config: &BackendConfig
    , _prompt: &str
    , cancel: CancellationToken
    ) -> Result<String, Error>
    {   self.started.notify_one();
        cancel.cancelled().await;
        Err(Error::Cancelled)
    }
}
