//! Recovers a JSON object from raw model text
//!
//! Stages run left to right and the first one that yields an object wins:
//! direct parse, fence strip plus outermost braces, then the same
//! candidate with control characters escaped inside string literals.

use log::{debug, trace};
use serde_json::{Map, Value};

pub const NO_OBJECT_FOUND: &str = "no JSON object found";
pub const PARSE_FAILED: &str = "parse failed";

/// Recovers the structured object carried by `raw`.
pub fn extract(raw: &str) -> Result<Value, crate::error::Error>
{   if let Ok(object) = parse_object(raw)
    {   return Ok(Value::Object(object));
    }
    trace!("Direct parse failed, trying brace extraction");

    let candidate = brace_candidate(raw).ok_or_else(|| {
      crate::error::Error::Extraction(NO_OBJECT_FOUND.to_string())
    })?;
    if let Ok(object) = parse_object(&candidate)
    {   return Ok(Value::Object(object));
    }
    trace!("Candidate parse failed, trying sanitized candidate");

    parse_object(&escape_control_chars(&candidate))
      .map(Value::Object)
      .map_err(|e| {
        debug!("All extraction stages failed: {}", e);
        crate::error::Error::Extraction(
          format!("{}: {}", PARSE_FAILED, e)
        )
      })
}

/// Parses `text` and accepts only a JSON object.
fn parse_object(text: &str) -> Result<Map<String, Value>, String>
{   match serde_json::from_str::<Value>(text)
    {   Ok(Value::Object(object)) => Ok(object)
      , Ok(_) => Err("top-level value is not an object".to_string())
      , Err(e) => Err(e.to_string())
    }
}

/// Removes markdown code-fence markers and surrounding whitespace.
pub fn strip_fences(raw: &str) -> String
{   raw.replace("```json", "")
      .replace("```JSON", "")
      .replace("```", "")
      .trim()
      .to_string()
}

/// Slice from the first `{` to the last `}` of the fence-stripped text.
pub fn brace_candidate(raw: &str) -> Option<String>
{   let clean = strip_fences(raw);
    let start = clean.find('{')?;
    let end = clean.rfind('}')?;
    if end < start
    {   return None;
    }
    Some(clean[start..=end].to_string())
}

/// Escapes raw newlines, carriage returns, tabs and other control
/// characters that appear inside string literals. Text outside strings
/// is left alone.
pub fn escape_control_chars(candidate: &str) -> String
{   let mut out = String::with_capacity(candidate.len() + 16);
    let mut in_string = false;
    let mut escaped = false;

    for c in candidate.chars()
    {   if !in_string
        {   if c == '"'
            {   in_string = true;
            }
            out.push(c);
            continue;
        }

        if escaped
        {   escaped = false;
            out.push(c);
            continue;
        }

        match c
        {   '\\' => {
              escaped = true;
              out.push(c);
            }
          , '"' => {
              in_string = false;
              out.push(c);
            }
          , '\n' => out.push_str("\\n")
          , '\r' => out.push_str("\\r")
          , '\t' => out.push_str("\\t")
          , c if (c as u32) < 0x20 => {
              out.push_str(&format!("\\u{:04x}", c as u32));
            }
          , c => out.push(c)
        }
    }
    out
}
