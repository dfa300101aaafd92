//! Failover across configured backends

use std::future::Future;
use log::{debug, error, warn};

/// Why every backend was given up on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExhaustionReason
{   /// No backend produced a response (transport failures or none listed)
    AllBackendsFailed
  , /// The last backend answered but its text broke the contract
    Unparseable(crate::error::Error)
  , /// The caller cancelled the request
    Cancelled
}

/// Position within the ordered backend list
#[derive(Debug, Clone)]
pub struct FailoverSequence<'a>
{   pub backends: &'a [crate::config::BackendConfig]
  , pub current_index: usize
}

impl<'a> FailoverSequence<'a>
{   /// Create a new failover sequence
    pub fn new(
      backends: &'a [crate::config::BackendConfig]
    ) -> Self
    {   debug!(
          "Creating failover sequence with {} backends",
          backends.len()
        );
        FailoverSequence
        {   backends
          , current_index: 0
        }
    }

    /// Get the current backend
    pub fn current(&self) -> Option<&'a crate::config::BackendConfig>
    {   self.backends.get(self.current_index)
    }

    /// Move to the next backend
    pub fn next(&mut self) -> Option<&'a crate::config::BackendConfig>
    {   self.current_index += 1;
        self.current()
    }

    /// Check if we have more backends to try
    pub fn has_next(&self) -> bool
    {   self.current_index + 1 < self.backends.len()
    }

    /// Whether the current backend is the final one in the list
    pub fn is_last(&self) -> bool
    {   !self.backends.is_empty() && !self.has_next()
    }
}

/// Runs `attempt` against each backend in order, one try apiece, and
/// returns the first success.
///
/// Transport failures always move on. Parse failures move on too, except
/// on the last backend, where they end the sequence with `Unparseable`.
/// Cancellation stops at once. Errors in neither class are logged as
/// unexpected and treated like a transport failure.
pub async fn try_in_order<'a, T, F, Fut>(
  backends: &'a [crate::config::BackendConfig]
, mut attempt: F
) -> Result<T, ExhaustionReason>
where
  F: FnMut(&'a crate::config::BackendConfig) -> Fut
, Fut: Future<Output = Result<T, crate::error::Error>>
{   let mut sequence = FailoverSequence::new(backends);
    let mut config = sequence.current();

    while let Some(current) = config
    {   match attempt(current).await
        {   Ok(value) => {
              debug!("Backend {} succeeded", current.name);
              return Ok(value);
            }
          , Err(crate::error::Error::Cancelled) => {
              debug!("Request cancelled while on {}", current.name);
              return Err(ExhaustionReason::Cancelled);
            }
          , Err(e) if e.is_parse() && sequence.is_last() => {
              warn!(
                "Last backend {} returned unusable output: {}",
                current.name, e
              );
              return Err(ExhaustionReason::Unparseable(e));
            }
          , Err(e) if e.is_parse() => {
              warn!(
                "Backend {} returned unusable output, trying next: {}",
                current.name, e
              );
            }
          , Err(e) if e.is_transport() => {
              warn!("Backend {} failed: {}", current.name, e);
            }
          , Err(e) => {
              error!(
                "Unexpected error from backend {}, trying next: {}",
                current.name, e
              );
            }
        }
        config = sequence.next();
    }

    Err(ExhaustionReason::AllBackendsFailed)
}
