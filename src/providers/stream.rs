//! Server-sent-event line buffering for streamed chat completions

use log::trace;
use serde::Deserialize;

const DONE_SENTINEL: &str = "[DONE]";

#[derive(Debug, Deserialize)]
struct StreamChunk
{   #[serde(default)]
    choices: Vec<StreamChoice>
}

#[derive(Debug, Deserialize)]
struct StreamChoice
{   #[serde(default)]
    delta: Option<Delta>
}

#[derive(Debug, Deserialize)]
struct Delta
{   #[serde(default)]
    content: Option<String>
}

/// Collects the incremental content of one in-flight request.
///
/// Network chunks may end mid-line (or mid-character), so bytes are kept
/// until a `\n` arrives and only whole lines are decoded.
#[derive(Debug, Default)]
pub struct StreamAccumulator
{   buffer: Vec<u8>
  , accumulated_text: String
  , skipped_lines: usize
}

impl StreamAccumulator
{   pub fn new() -> Self
    {   StreamAccumulator::default()
    }

    /// Feeds one network chunk.
    pub fn push(&mut self, chunk: &[u8])
    {   self.buffer.extend_from_slice(chunk);
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n')
        {   let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.consume_line(&line);
        }
    }

    /// Text accumulated so far.
    pub fn text(&self) -> &str
    {   &self.accumulated_text
    }

    /// Number of `data:` lines dropped as malformed.
    pub fn skipped_lines(&self) -> usize
    {   self.skipped_lines
    }

    /// Flushes a trailing unterminated line and returns the text.
    pub fn finish(mut self) -> String
    {   if !self.buffer.is_empty()
        {   let rest = std::mem::take(&mut self.buffer);
            self.consume_line(&rest);
        }
        self.accumulated_text
    }

    fn consume_line(&mut self, raw: &[u8])
    {   let line = String::from_utf8_lossy(raw);
        let line = line.trim();
        let payload = match line.strip_prefix("data:")
        {   Some(rest) => rest.trim_start()
          , None => return
        };
        if payload == DONE_SENTINEL
        {   return;
        }

        match serde_json::from_str::<StreamChunk>(payload)
        {   Ok(chunk) => {
              let content = chunk.choices
                .into_iter()
                .next()
                .and_then(|c| c.delta)
                .and_then(|d| d.content);
              if let Some(content) = content
              {   self.accumulated_text.push_str(&content);
              }
            }
          , Err(e) => {
              trace!("Skipping malformed stream line: {}", e);
              self.skipped_lines += 1;
            }
        }
    }
}
