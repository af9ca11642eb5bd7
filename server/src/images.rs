//! Image generation for analyzed speech chunks.

use std::time::Duration;

use llm_core::ImageModel;
use serde::Serialize;
use tracing::{info, warn};

use crate::analyzer::ChunkPromptMap;

/// One generated image and the speech chunk it illustrates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageResult {
    pub point: String,
    pub image_url: String,
}

pub fn image_prompt(prompt: &str) -> String {
    format!("A vivid, memorable image representing: {prompt}")
}

/// Generate one image per chunk, in map order.
///
/// The image API sees each chunk's generated prompt; each result is labelled with
/// the chunk itself. A failed or timed-out image is logged and skipped, so the
/// output may be shorter than `points`.
pub async fn generate_images(
    model: &dyn ImageModel,
    points: &ChunkPromptMap,
    timeout: Duration,
) -> Vec<ImageResult> {
    let mut images = Vec::with_capacity(points.len());

    for (chunk, prompt) in points.iter() {
        let request = image_prompt(prompt);
        match tokio::time::timeout(timeout, model.generate_image(&request)).await {
            Ok(Ok(image_url)) => images.push(ImageResult {
                point: chunk.to_string(),
                image_url,
            }),
            Ok(Err(e)) => warn!(point = chunk, "Error generating image: {e:#}"),
            Err(_) => warn!(
                point = chunk,
                "Image generation timed out after {} seconds",
                timeout.as_secs()
            ),
        }
    }

    info!(
        requested = points.len(),
        generated = images.len(),
        "image generation complete"
    );
    images
}
