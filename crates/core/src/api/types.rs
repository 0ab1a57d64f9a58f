//! Wire types for the image generation endpoint.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ApiError;

/// Rendering quality tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageQuality {
    #[default]
    Standard,
    Hd,
}

/// How the API delivers the generated image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    /// A short-lived URL to download the image from.
    #[default]
    Url,
    /// The image inlined as base64.
    B64Json,
}

/// Output resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageSize {
    #[serde(rename = "256x256")]
    Square256,
    #[serde(rename = "512x512")]
    Square512,
    #[default]
    #[serde(rename = "1024x1024")]
    Square1024,
    #[serde(rename = "1024x1792")]
    Portrait1792,
    #[serde(rename = "1792x1024")]
    Landscape1792,
}

impl ImageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Square256 => "256x256",
            Self::Square512 => "512x512",
            Self::Square1024 => "1024x1024",
            Self::Portrait1792 => "1024x1792",
            Self::Landscape1792 => "1792x1024",
        }
    }
}

/// Visual style requested from the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageStyle {
    #[default]
    Vivid,
    Natural,
}

impl ImageStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vivid => "vivid",
            Self::Natural => "natural",
        }
    }
}

impl fmt::Display for ImageStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vivid" => Ok(Self::Vivid),
            "natural" => Ok(Self::Natural),
            other => Err(format!(
                "unknown style '{}', expected 'vivid' or 'natural'",
                other
            )),
        }
    }
}

/// Body of one generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Number of images; always 1, each job makes its own call.
    pub n: u32,
    pub model: String,
    pub prompt: String,
    pub quality: ImageQuality,
    pub response_format: ResponseFormat,
    pub size: ImageSize,
    pub style: ImageStyle,
    /// Opaque end-user tag.
    pub user: String,
}

/// Reply from the generation endpoint.
///
/// Every field is optional on the wire: a success carries `data`, a failure
/// carries `error`. Use [`into_first_entry`](Self::into_first_entry) to
/// interpret it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub created: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<ImageData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiErrorBody>,
}

/// One generated image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageData {
    /// Prompt as rewritten by the model (empty when the model does not rewrite).
    #[serde(default, deserialize_with = "null_as_default")]
    pub revised_prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b64_json: Option<String>,
}

/// Error descriptor returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default)]
    pub param: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// Reads an explicit JSON `null` as the type's default value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ApiErrorBody {
    /// Whether the descriptor actually says something.
    pub fn is_populated(&self) -> bool {
        !self.message.is_empty() || self.code.is_some() || self.kind.is_some()
    }
}

impl GenerationResponse {
    /// Returns the first image entry, or the failure the response describes.
    ///
    /// A populated error descriptor wins over any data. An empty data list is
    /// a failure even when no error descriptor is present.
    pub fn into_first_entry(self) -> Result<ImageData, ApiError> {
        if let Some(err) = self.error.filter(|e| e.is_populated()) {
            return Err(ApiError::Api {
                code: err.code,
                message: err.message,
                param: err.param,
                kind: err.kind,
            });
        }

        self.data.into_iter().next().ok_or(ApiError::EmptyData)
    }
}
