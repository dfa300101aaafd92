pub mod error;
pub mod config;
pub mod request;
pub mod prompt;
pub mod providers;
pub mod extract;
pub mod failover;
pub mod orchestrator;
pub mod assistant;
pub mod client;

pub use assistant::Assistant;
pub use client::AssistantBackend;
pub use config::{AssistantConfig, BackendConfig, TransportConfig};
pub use error::Error;
pub use orchestrator::Orchestrator;
pub use request::{
  Hat, LlmResponse, Outcome, OutcomeStatus, ResultData, TaskRequest
};

/*

notellm is the text-intelligence layer of a note editor. The editor asks
for one of four transformations (summarize, improve, translate, six-hats
critique) and always gets an LlmResponse back, never an error.

request flow:

  TaskRequest
    -> prompt::build_prompt        instruction + output schema
    -> Orchestrator::ask           backends in priority order
       -> Transport::send          streamed chat completion, first-byte deadline
       -> extract::extract         JSON object recovered from model text
       -> LlmResponse::from_value  outcome contract enforced
    -> LlmResponse

*/

/// Installs `env_logger`, honouring `RUST_LOG` (default `info`).
/// Safe to call more than once.
pub fn init_logging()
{   let _ = env_logger::Builder::from_env(
      env_logger::Env::default().default_filter_or("info")
    ).try_init();
}

/// NOTELLM ACTOR INTERFACE:

// ===== RunTask =====

pub type RunTaskReply = crate::request::LlmResponse;
pub type RunTaskReplySender
  = tokio::sync::mpsc::UnboundedSender<RunTaskReply>;

pub struct RunTaskArgs
{   pub task: crate::request::TaskRequest
  , pub reply: RunTaskReplySender
}

// ===== KillProcess =====

pub type KillProcessReply = Result<(), crate::error::Error>;
pub type KillProcessReplySender
  = tokio::sync::mpsc::UnboundedSender<KillProcessReply>;

pub struct KillProcessArgs
{   pub reply: KillProcessReplySender
}

// ===== AssistantHand (sender side) =====

pub struct AssistantHand
{   pub run_task_tx
      : tokio::sync::mpsc::UnboundedSender<RunTaskArgs>
  , pub kill_process_tx
      : tokio::sync::mpsc::UnboundedSender<KillProcessArgs>
}

// ===== AssistantFoot (receiver side) =====

pub struct AssistantFoot
{   pub run_task_rx
      : tokio::sync::mpsc::UnboundedReceiver<RunTaskArgs>
  , pub kill_process_rx
      : tokio::sync::mpsc::UnboundedReceiver<KillProcessArgs>
}
