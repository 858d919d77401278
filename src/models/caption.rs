//! Image captioning

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use image::{DynamicImage, ImageOutputFormat};
use serde_json::json;
use tracing::info;

use super::gemini::GeminiClient;
use super::ModelError;

const CAPTION_PROMPT: &str = "Describe this photo in one short sentence. \
If it shows a well-known landmark or city, name it.";
const JPEG_QUALITY: u8 = 85;

#[async_trait]
pub trait ImageCaptioner: Send + Sync {
    /// Human readable model name.
    fn name(&self) -> &str;

    /// Produce a single caption sentence for the encoded image.
    async fn caption(&self, image: &[u8]) -> Result<String, ModelError>;
}

/// Decode any supported raster format, drop alpha/palette by converting to
/// RGB, and re-encode as JPEG for upload.
pub fn prepare_image(data: &[u8]) -> Result<Vec<u8>, ModelError> {
    let img = image::load_from_memory(data).map_err(|e| ModelError::Image(e.to_string()))?;
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());

    let mut jpeg_bytes = Vec::new();
    rgb.write_to(
        &mut std::io::Cursor::new(&mut jpeg_bytes),
        ImageOutputFormat::Jpeg(JPEG_QUALITY),
    )
    .map_err(|e| ModelError::Image(e.to_string()))?;

    Ok(jpeg_bytes)
}

pub struct GeminiCaptioner {
    client: GeminiClient,
    name: String,
}

impl GeminiCaptioner {
    pub fn new(client: GeminiClient) -> Self {
        let name = format!("Google Gemini ({})", client.model());
        Self { client, name }
    }
}

#[async_trait]
impl ImageCaptioner for GeminiCaptioner {
    fn name(&self) -> &str {
        &self.name
    }

    async fn caption(&self, image: &[u8]) -> Result<String, ModelError> {
        let jpeg = prepare_image(image)?;
        let image_base64 = general_purpose::STANDARD.encode(&jpeg);

        let parts = vec![
            json!({ "text": CAPTION_PROMPT }),
            json!({
                "inline_data": {
                    "mime_type": "image/jpeg",
                    "data": image_base64
                }
            }),
        ];

        let caption = self.client.generate(parts, false).await?;
        info!(caption = %caption, "Generated caption");
        Ok(caption)
    }
}
