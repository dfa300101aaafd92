//! Task requests and the response contract shared by every caller

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Deserializer, Serialize};

/// Outcome codes emitted by the model or synthesized locally.
pub mod codes
{   pub const OK: &str = "OK";
    pub const EMPTY_TEXT: &str = "EMPTY_TEXT";
    pub const MANIPULATION_ATTEMPT: &str = "MANIPULATION_ATTEMPT";
    pub const ETHIC_REFUSAL: &str = "ETHIC_REFUSAL";
    pub const JSON_PARSE_ERROR: &str = "JSON_PARSE_ERROR";
    pub const API_CONNECTION_ERROR: &str = "API_CONNECTION_ERROR";
    pub const HAT_NOT_IMPLEMENTED: &str = "HAT_NOT_IMPLEMENTED";
    pub const REQUEST_CANCELLED: &str = "REQUEST_CANCELLED";
}

/// Language placed on synthesized responses.
pub const UNKNOWN_LANGUAGE: &str = "unknown";

/// Six Hats perspective for structured critique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hat
{   /// Facts and objectivity
    White
  , /// Emotions and gut reactions
    Red
  , /// Risks and weaknesses
    Black
  , /// Benefits and opportunities
    Yellow
  , /// Creative alternatives
    Green
  , /// Process and next steps
    Blue
}

impl Hat
{   pub const ALL: [Hat; 6] = [
      Hat::White
    , Hat::Red
    , Hat::Black
    , Hat::Yellow
    , Hat::Green
    , Hat::Blue
    ];
}

impl fmt::Display for Hat
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   let name = match self
        {   Hat::White => "White"
          , Hat::Red => "Red"
          , Hat::Black => "Black"
          , Hat::Yellow => "Yellow"
          , Hat::Green => "Green"
          , Hat::Blue => "Blue"
        };
        f.write_str(name)
    }
}

impl FromStr for Hat
{   type Err = crate::error::Error;

    /// Accepts English and Italian colour names, any case.
    fn from_str(s: &str) -> Result<Self, Self::Err>
    {   match s.trim().to_lowercase().as_str()
        {   "white" | "bianco" => Ok(Hat::White)
          , "red" | "rosso" => Ok(Hat::Red)
          , "black" | "nero" => Ok(Hat::Black)
          , "yellow" | "giallo" => Ok(Hat::Yellow)
          , "green" | "verde" => Ok(Hat::Green)
          , "blue" | "blu" => Ok(Hat::Blue)
          , other => Err(crate::error::Error::Other(
              format!("Unknown perspective: {}", other)
            ))
        }
    }
}

/// One user action, consumed once by the prompt builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TaskRequest
{   Summarize
    {   text: String
      , percentage: u8
    }
  , Improve
    {   text: String
      , criterion: String
    }
  , Translate
    {   text: String
      , target_language: String
    }
  , Critique
    {   text: String
      , perspective: Hat
    }
}

impl TaskRequest
{   /// Short label used in logs.
    pub fn kind(&self) -> &'static str
    {   match self
        {   TaskRequest::Summarize { .. } => "summarize"
          , TaskRequest::Improve { .. } => "improve"
          , TaskRequest::Translate { .. } => "translate"
          , TaskRequest::Critique { .. } => "critique"
        }
    }
}

/// How a request was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OutcomeStatus
{   #[serde(rename = "success")]
    Success
  , #[serde(rename = "refusal")]
    Refusal
  , #[serde(rename = "INVALID_INPUT")]
    InvalidInput
}

impl OutcomeStatus
{   pub fn as_str(&self) -> &'static str
    {   match self
        {   OutcomeStatus::Success => "success"
          , OutcomeStatus::Refusal => "refusal"
          , OutcomeStatus::InvalidInput => "INVALID_INPUT"
        }
    }
}

// Models are not consistent about casing, so match loosely.
impl<'de> Deserialize<'de> for OutcomeStatus
{   fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
      D: Deserializer<'de>
    {   let raw = String::deserialize(deserializer)?;
        match raw.trim().to_lowercase().as_str()
        {   "success" => Ok(OutcomeStatus::Success)
          , "refusal" => Ok(OutcomeStatus::Refusal)
          , "invalid_input" => Ok(OutcomeStatus::InvalidInput)
          , _ => Err(serde::de::Error::unknown_variant(
              &raw
            , &["success", "refusal", "INVALID_INPUT"]
            ))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome
{   pub status: OutcomeStatus
  , #[serde(default)]
    pub code: String
  , #[serde(default, skip_serializing_if = "Option::is_none")]
    pub violation_category: Option<String>
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultData
{   #[serde(default)]
    pub rewritten_text: Option<String>
  , #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_language: Option<String>
}

/// The single result contract returned to every caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmResponse
{   pub outcome: Outcome
  , #[serde(default)]
    pub data: Option<ResultData>
}

impl LlmResponse
{   /// Locally synthesized `INVALID_INPUT` response.
    pub fn invalid_input(code: &str) -> Self
    {   LlmResponse
        {   outcome: Outcome
            {   status: OutcomeStatus::InvalidInput
              , code: code.to_string()
              , violation_category: None
            }
          , data: Some(ResultData
            {   rewritten_text: None
              , detected_language: Some(UNKNOWN_LANGUAGE.to_string())
            })
        }
    }

    /// Builds a response from an extracted object, enforcing the
    /// outcome contract.
    pub fn from_value(
      value: serde_json::Value
    ) -> Result<Self, crate::error::Error>
    {   if value.get("outcome").map_or(true, |o| o.is_null())
        {   return Err(crate::error::Error::Validation(
              "missing outcome".to_string()
            ));
        }

        let mut response: LlmResponse
          = serde_json::from_value(value).map_err(|e| {
            crate::error::Error::Validation(e.to_string())
          })?;

        match response.outcome.status
        {   OutcomeStatus::Success => {
              if response.rewritten_text().is_none()
              {   return Err(crate::error::Error::Validation(
                    "success without rewritten_text".to_string()
                  ));
              }
            }
          , _ => {
              if let Some(data) = response.data.as_mut()
              {   data.rewritten_text = None;
              }
            }
        }
        Ok(response)
    }

    pub fn is_success(&self) -> bool
    {   self.outcome.status == OutcomeStatus::Success
    }

    pub fn rewritten_text(&self) -> Option<&str>
    {   self.data.as_ref()?.rewritten_text.as_deref()
    }

    pub fn detected_language(&self) -> Option<&str>
    {   self.data.as_ref()?.detected_language.as_deref()
    }

    /// Message a UI shows for this response.
    pub fn user_message(&self) -> String
    {   match self.outcome.status
        {   OutcomeStatus::Success => {
              self.rewritten_text()
                .unwrap_or("No text generated.")
                .to_string()
            }
          , OutcomeStatus::Refusal => {
              format!(
                "Request refused. Reason: {} ({}).",
                self.outcome.code,
                self.outcome.violation_category
                  .as_deref()
                  .unwrap_or("generic")
              )
            }
          , OutcomeStatus::InvalidInput => {
              format!("Invalid input. Code: {}", self.outcome.code)
            }
        }
    }
}
