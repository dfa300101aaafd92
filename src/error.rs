use std::fmt;
use std::time::Duration;

/// Custom error type for notellm operations
/// Implements Clone for sending through channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// Backend entry is missing its endpoint or model
    Config(String)
  , /// Configuration could not be loaded
    InvalidConfiguration(String)
  , /// Backend answered with a non-2xx status
    Http
    {   status: u16
      , body: String
    }
  , /// Connection or body read failure
    Network(String)
  , /// No byte arrived before the first-byte deadline
    Timeout(Duration)
  , /// Stream went silent longer than the idle limit
    IdleTimeout(Duration)
  , /// Caller cancelled the request
    Cancelled
  , /// No structured object could be recovered from model text
    Extraction(String)
  , /// Object recovered but it breaks the response contract
    Validation(String)
  , /// Critique perspective without a prompt
    HatNotImplemented(crate::request::Hat)
  , /// Generic error
    Other(String)
}

impl Error
{   /// Failures of the request itself; always fall through
    /// to the next backend.
    pub fn is_transport(&self) -> bool
    {   matches!(
          self
        , Error::Config(_)
          | Error::Http { .. }
          | Error::Network(_)
          | Error::Timeout(_)
          | Error::IdleTimeout(_)
        )
    }

    /// Failures to turn model text into a response.
    pub fn is_parse(&self) -> bool
    {   matches!(self, Error::Extraction(_) | Error::Validation(_))
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::Config(msg) => {
              write!(f, "Incomplete backend configuration: {}", msg)
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::Http { status, body } => {
              if body.is_empty()
              {   write!(f, "HTTP error: status {}", status)
              } else
              {   write!(f, "HTTP error: status {}: {}", status, body)
              }
            }
          , Error::Network(msg) => {
              write!(f, "Network error: {}", msg)
            }
          , Error::Timeout(limit) => {
              write!(f,
                "No response within {}ms of sending the request",
                limit.as_millis()
              )
            }
          , Error::IdleTimeout(limit) => {
              write!(f,
                "Stream stalled for more than {}ms",
                limit.as_millis()
              )
            }
          , Error::Cancelled => {
              write!(f, "Request cancelled")
            }
          , Error::Extraction(msg) => {
              write!(f, "Extraction error: {}", msg)
            }
          , Error::Validation(msg) => {
              write!(f, "Validation error: {}", msg)
            }
          , Error::HatNotImplemented(hat) => {
              write!(f, "Perspective not implemented: {}", hat)
            }
          , Error::Other(msg) => {
              write!(f, "Error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<String> for Error
{   fn from(s: String) -> Self
    {   Error::Other(s)
    }
}

impl From<&str> for Error
{   fn from(s: &str) -> Self
    {   Error::Other(s.to_string())
    }
}
