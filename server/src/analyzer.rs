//! Speech analysis: ask a text model to split a speech into memorable chunks,
//! each paired with an image-generation prompt.

use std::{path::Path, time::Duration};

use anyhow::Context;

use llm_core::{ChatModel, ChatPrompt};
use serde::{ser::SerializeMap, Serialize, Serializer};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::sample::DREAM_SPEECH;

pub const SYSTEM_PROMPT: &str =
    "You are a helpful assistant that analyzes speeches and creates image generation prompts.";

pub const PARSE_FAILED: &str = "Failed to parse response";
pub const NOT_A_MAPPING: &str = "Response is not a dictionary";
pub const NON_STRING_VALUES: &str = "Response values are not all strings";

/// Ordered chunk -> image prompt pairs, in the order the model emitted them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkPromptMap(Vec<(String, String)>);

impl ChunkPromptMap {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(chunk, prompt)| (chunk.as_str(), prompt.as_str()))
    }

    pub fn chunks(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(chunk, _)| chunk.as_str())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ChunkPromptMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl Serialize for ChunkPromptMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (chunk, prompt) in &self.0 {
            map.serialize_entry(chunk, prompt)?;
        }
        map.end()
    }
}

/// Outcome of analyzing a speech.
///
/// A reply the model got wrong is not an error: it becomes [`Analysis::Failed`],
/// which serializes as the single-key mapping `{"error": message}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Analysis {
    Points(ChunkPromptMap),
    Failed(String),
}

impl Analysis {
    pub fn points(&self) -> Option<&ChunkPromptMap> {
        match self {
            Analysis::Points(points) => Some(points),
            Analysis::Failed(_) => None,
        }
    }
}

impl Serialize for Analysis {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Analysis::Points(points) => points.serialize(serializer),
            Analysis::Failed(message) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("error", message)?;
                map.end()
            }
        }
    }
}

pub fn build_prompt(text: &str) -> ChatPrompt {
    let user = format!(
        "Split up this speech into individual chunks for the purpose of creating a memory palace. \
         Convert each of these into highly detailed and memorable descriptions for image generation \
         (eg with DALL-E). Return the response as a JSON object of {{\"text_chunk\": \"image_gen_prompt\"}}. \
         Only the JSON object, nothing else. Here's the speech:\n\n{text}"
    );
    ChatPrompt::new(SYSTEM_PROMPT, user)
}

/// Parse the model's reply as a JSON object of string values.
///
/// Never evaluates the reply; anything other than such an object yields [`Analysis::Failed`].
pub fn parse_reply(reply: &str) -> Analysis {
    let value: Value = match serde_json::from_str(strip_code_fence(reply)) {
        Ok(value) => value,
        Err(err) => {
            warn!(%err, raw = reply, "failed to parse analysis reply as JSON");
            return Analysis::Failed(PARSE_FAILED.to_string());
        }
    };

    let Value::Object(object) = value else {
        warn!(raw = reply, "analysis reply is not a JSON object");
        return Analysis::Failed(NOT_A_MAPPING.to_string());
    };

    let mut points = Vec::with_capacity(object.len());
    for (chunk, prompt) in object {
        let Value::String(prompt) = prompt else {
            warn!(raw = reply, chunk = %chunk, "analysis reply has a non-string prompt");
            return Analysis::Failed(NON_STRING_VALUES.to_string());
        };
        if chunk.trim().is_empty() {
            debug!("dropping empty chunk from analysis reply");
            continue;
        }
        points.push((chunk, prompt));
    }

    Analysis::Points(ChunkPromptMap(points))
}

/// Models often fence JSON in Markdown even when told not to.
fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(body) = trimmed
        .strip_prefix("```")
        .and_then(|rest| rest.strip_suffix("```"))
    else {
        return trimmed;
    };
    // Skip the info string (e.g. `json`) on the opening line.
    match body.split_once('\n') {
        Some((_, inner)) => inner.trim(),
        None => body.trim(),
    }
}

/// Run one analysis round-trip: exactly one model call, no retry.
///
/// Transport and API failures propagate; malformed replies do not.
pub async fn analyze_speech(
    model: &dyn ChatModel,
    text: &str,
    timeout: Duration,
) -> Result<Analysis, ApiError> {
    let prompt = build_prompt(text);
    info!(speech_len = text.len(), "analyzing speech");

    let reply = tokio::time::timeout(timeout, model.complete(&prompt))
        .await
        .map_err(|_| ApiError::Timeout {
            stage: "speech analysis",
            secs: timeout.as_secs(),
        })??;

    let analysis = parse_reply(&reply);
    if let Analysis::Points(points) = &analysis {
        info!(chunks = points.len(), "speech analysis complete");
    }
    Ok(analysis)
}

/// One-shot analysis for the command line: the speech in `file`, or the built-in sample.
pub async fn analyze_sample(
    model: &dyn ChatModel,
    file: Option<&Path>,
    timeout: Duration,
) -> anyhow::Result<Analysis> {
    let speech = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read speech from {}", path.display()))?,
        None => DREAM_SPEECH.to_string(),
    };
    Ok(analyze_speech(model, &speech, timeout).await?)
}
