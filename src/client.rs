use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use log::{debug, error, info};
use crate::AssistantFoot;

/// Public API for the assistant backend - owns the task
pub struct AssistantBackend
{   hand: crate::AssistantHand
  , _task_handle: tokio::task::JoinHandle<()>
}

impl AssistantBackend
{   /// Create and spawn a new assistant backend
    /// Returns immediately - spawns background task
    pub fn new<T>(assistant: crate::assistant::Assistant<T>) -> Self
    where
      T: crate::providers::Transport + Clone + 'static
    {   debug!("Creating AssistantBackend with task ownership");

        let (run_task_tx, run_task_rx)
          = mpsc::unbounded_channel();
        let (kill_process_tx, kill_process_rx)
          = mpsc::unbounded_channel();

        let hand = crate::AssistantHand
        {   run_task_tx
          , kill_process_tx
        };

        let foot = crate::AssistantFoot
        {   run_task_rx
          , kill_process_rx
        };

        let _task_handle = tokio::spawn(async move {
          run_backend_loop(foot, assistant).await
        });

        AssistantBackend
        {   hand
          , _task_handle
        }
    }

    /// Queue a task - returns almost immediately
    pub fn run_task(
      &self
    , task: crate::request::TaskRequest
    ) -> Result<
        mpsc::UnboundedReceiver<crate::RunTaskReply>,
        crate::error::Error
      >
    {   debug!("run_task queuing {} task", task.kind());
        let (reply_tx, reply_rx)
          = mpsc::unbounded_channel();

        let cmd = crate::RunTaskArgs
        {   task
          , reply: reply_tx
        };

        self.hand.run_task_tx
          .send(cmd)
          .map_err(|_| {
            error!("Backend channel closed");
            crate::error::Error::Other(
              "Backend disconnected".to_string()
            )
          })?;

        Ok(reply_rx)
    }

    /// Gracefully shutdown the backend, cancelling tasks in flight
    pub async fn shutdown(self)
      -> Result<(), crate::error::Error>
    {   debug!("Shutting down AssistantBackend");
        let (reply_tx, mut reply_rx)
          = mpsc::unbounded_channel();

        let cmd = crate::KillProcessArgs
        {   reply: reply_tx
        };

        self.hand.kill_process_tx
          .send(cmd)
          .map_err(|_| {
            error!("Backend channel already closed");
            crate::error::Error::Other(
              "Backend already shutdown".to_string()
            )
          })?;

        // Wait for shutdown confirmation
        if let Some(result) = reply_rx.recv().await
        {   debug!("Backend shutdown confirmed");
            result
        } else
        {   error!("Backend exited without confirming shutdown");
            Err(crate::error::Error::Other(
              "Backend exited without confirming shutdown".to_string()
            ))
        }
    }
}

/// Main backend event loop
///
/// tokio::select! only routes commands. Each task runs in its own
/// spawned future, so a slow backend never holds up other UI actions.
async fn run_backend_loop<T>(
  foot: crate::AssistantFoot
, assistant: crate::assistant::Assistant<T>
)
where
  T: crate::providers::Transport + Clone + 'static
{   debug!("Starting AssistantBackend event loop");
    let shutdown = CancellationToken::new();
    let AssistantFoot
    {   mut run_task_rx
      , mut kill_process_rx
    } = foot;

    loop
    { tokio::select!
      { Some(cmd) = run_task_rx.recv() => {
          debug!("Received RunTask: {}", cmd.task.kind());
          let assistant = assistant.clone();
          let cancel = shutdown.child_token();
          tokio::spawn(async move {
            let response = assistant
              .run_with_cancel(&cmd.task, cancel)
              .await;
            let _ = cmd.reply.send(response);
          });
        }
      , Some(cmd) = kill_process_rx.recv() => {
          debug!("Received KillProcess");
          shutdown.cancel();
          let _ = cmd.reply.send(Ok(()));
          info!("AssistantBackend shutting down");
          break;
        }
      , else => {
          debug!("All senders dropped");
          shutdown.cancel();
          break;
        }
      }
    }
}
