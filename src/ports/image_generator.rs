//! Image generator port for the external image generation API.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AtelierError;

/// Output shape requested from the generation API.
///
/// When one or more reference images are attached to a request the ratio is
/// advisory only: the API infers the output shape from the references, and
/// the live adapter omits it from the call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    /// 1:1 square output.
    #[default]
    #[serde(rename = "1:1")]
    Square,
    /// 9:16 portrait output.
    #[serde(rename = "9:16")]
    Portrait,
    /// 16:9 landscape output.
    #[serde(rename = "16:9")]
    Landscape,
}

impl AspectRatio {
    /// The ratio in the `"W:H"` form the API expects.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Portrait => "9:16",
            Self::Landscape => "16:9",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1:1" => Ok(Self::Square),
            "9:16" => Ok(Self::Portrait),
            "16:9" => Ok(Self::Landscape),
            other => Err(format!("Unsupported aspect ratio '{other}'. Valid: 1:1, 9:16, 16:9")),
        }
    }
}

/// A user-supplied reference image attached to a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceImage {
    /// Opaque identifier, unique within the request.
    pub id: String,
    /// Display name (usually the source file name).
    pub name: String,
    /// Raw image bytes.
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
    /// MIME type of the image (e.g., `"image/png"`).
    pub mime_type: String,
}

/// A request to generate one image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The text prompt describing the desired image.
    pub prompt: String,
    /// Reference images guiding the generation, in attachment order.
    #[serde(default)]
    pub reference_images: Vec<ReferenceImage>,
    /// Requested output shape. Ignored by the API when reference images
    /// are attached.
    pub aspect_ratio: AspectRatio,
}

/// A generated image as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedImage {
    /// Raw image bytes (decoded from base64).
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
    /// MIME type of the image (e.g., `"image/jpeg"`).
    pub mime_type: String,
}

/// Boxed future type returned by [`ImageGenerator::generate`].
pub type GenerateFuture<'a> =
    Pin<Box<dyn Future<Output = Result<GeneratedImage, AtelierError>> + Send + 'a>>;

/// Generates an image from a text prompt via an external API.
pub trait ImageGenerator: Send + Sync {
    /// Generate an image for the given request.
    fn generate(&self, request: &GenerationRequest) -> GenerateFuture<'_>;
}

/// Serde helper for serializing `Vec<u8>` as base64 strings in cassettes
/// and in the persisted history log.
pub(crate) mod base64_bytes {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize bytes as base64 string.
    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(data);
        serializer.serialize_str(&encoded)
    }

    /// Deserialize base64 string to bytes.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}
