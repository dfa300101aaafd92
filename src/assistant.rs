//! The four task entry points used by the editor

use log::{info, warn};
use tokio_util::sync::CancellationToken;
use crate::orchestrator::Orchestrator;
use crate::providers::{HttpTransport, Transport};
use crate::request::{codes, Hat, LlmResponse, TaskRequest};

/// Task front end over an `Orchestrator`
#[derive(Debug)]
pub struct Assistant<T = HttpTransport>
{   orchestrator: Orchestrator<T>
}

impl<T: Clone> Clone for Assistant<T>
{   fn clone(&self) -> Self
    {   Assistant
        {   orchestrator: self.orchestrator.clone()
        }
    }
}

impl Assistant<HttpTransport>
{   pub fn from_config(config: crate::config::AssistantConfig) -> Self
    {   Assistant::new(Orchestrator::from_config(config))
    }

    /// Backends from `LLM_API_URL`, `LLM_MODEL` and `LLM_API_KEY`,
    /// followed by the built-in fallback.
    pub fn from_env() -> Result<Self, crate::error::Error>
    {   Ok(Self::from_config(crate::config::AssistantConfig::from_env()?))
    }
}

impl<T: Transport> Assistant<T>
{   pub fn new(orchestrator: Orchestrator<T>) -> Self
    {   Assistant
        {   orchestrator
        }
    }

    pub fn orchestrator(&self) -> &Orchestrator<T>
    {   &self.orchestrator
    }

    pub async fn run(&self, task: &TaskRequest) -> LlmResponse
    {   self.run_with_cancel(task, CancellationToken::new()).await
    }

    pub async fn run_with_cancel(
      &self
    , task: &TaskRequest
    , cancel: CancellationToken
    ) -> LlmResponse
    {   info!("Running {} task", task.kind());
        match crate::prompt::build_prompt(task)
        {   Ok(prompt) => {
              self.orchestrator.ask_with_cancel(&prompt, cancel).await
            }
          , Err(e) => {
              // Only unimplemented perspectives fail to build.
              warn!("No prompt for task: {}", e);
              LlmResponse::invalid_input(codes::HAT_NOT_IMPLEMENTED)
            }
        }
    }

    /// Shortens `text` by roughly `percentage` percent.
    pub async fn summarize(&self, text: &str, percentage: u8) -> LlmResponse
    {   self.run(&TaskRequest::Summarize
        {   text: text.to_string()
          , percentage
        }).await
    }

    /// Rewrites `text` according to a free-form criterion.
    pub async fn improve(&self, text: &str, criterion: &str) -> LlmResponse
    {   self.run(&TaskRequest::Improve
        {   text: text.to_string()
          , criterion: criterion.to_string()
        }).await
    }

    pub async fn translate(
      &self
    , text: &str
    , target_language: &str
    ) -> LlmResponse
    {   self.run(&TaskRequest::Translate
        {   text: text.to_string()
          , target_language: target_language.to_string()
        }).await
    }

    /// Six Hats critique from one perspective.
    pub async fn critique(&self, text: &str, perspective: Hat) -> LlmResponse
    {   self.run(&TaskRequest::Critique
        {   text: text.to_string()
          , perspective
        }).await
    }
}
