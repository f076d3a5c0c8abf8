//! Veo request and response types
//!
//! Wire shapes for Vertex AI long-running video generation, and the
//! flattened body the proxy's `/generate-video` endpoint accepts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Proxy path that accepts a flattened generation request
pub const GENERATE_VIDEO_PATH: &str = "/generate-video";

/// Proxy path that polls a long-running operation
pub const CHECK_OPERATION_PATH: &str = "/check-operation";

const PREDICT_LONG_RUNNING: &str = ":predictLongRunning";
const FETCH_PREDICT_OPERATION: &str = ":fetchPredictOperation";

/// Veo model variants the proxy supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VeoModel {
    /// `veo-2.0-generate-001`
    #[serde(rename = "veo-2.0-generate-001")]
    Veo2,
    /// `veo-3.0-generate-preview`
    #[serde(rename = "veo-3.0-generate-preview")]
    Veo3,
    /// `veo-3.0-fast-generate-001`
    #[default]
    #[serde(rename = "veo-3.0-fast-generate-001")]
    Veo3Fast,
}

impl VeoModel {
    /// Every supported model
    pub const ALL: [VeoModel; 3] = [Self::Veo2, Self::Veo3, Self::Veo3Fast];

    /// Vertex AI model id
    pub fn id(&self) -> &'static str {
        match self {
            Self::Veo2 => "veo-2.0-generate-001",
            Self::Veo3 => "veo-3.0-generate-preview",
            Self::Veo3Fast => "veo-3.0-fast-generate-001",
        }
    }

    /// Infer the model from a long-running operation name.
    ///
    /// Operation names embed the model path; anything unrecognised maps to
    /// the default fast model.
    pub fn from_operation_name(name: &str) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|m| *m != Self::Veo3Fast && name.contains(m.id()))
            .unwrap_or_default()
    }

    /// Endpoint path for starting a generation with this model
    pub fn predict_endpoint(&self, project_id: &str, region: &str) -> String {
        format!("{}{}", self.model_path(project_id, region), PREDICT_LONG_RUNNING)
    }

    /// Endpoint path for polling an operation started with this model
    pub fn fetch_endpoint(&self, project_id: &str, region: &str) -> String {
        format!(
            "{}{}",
            self.model_path(project_id, region),
            FETCH_PREDICT_OPERATION
        )
    }

    fn model_path(&self, project_id: &str, region: &str) -> String {
        format!(
            "/projects/{}/locations/{}/publishers/google/models/{}",
            project_id,
            region,
            self.id()
        )
    }
}

impl FromStr for VeoModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "veo2" | "veo-2.0-generate-001" => Ok(Self::Veo2),
            "veo3" | "veo-3.0-generate-preview" => Ok(Self::Veo3),
            "veo3-fast" | "veo-3.0-fast-generate-001" => Ok(Self::Veo3Fast),
            other => Err(format!("unknown Veo model: {}", other)),
        }
    }
}

impl fmt::Display for VeoModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Remote operation an outgoing request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation<'a> {
    /// Start a long-running video generation
    PredictLongRunning,
    /// Poll a long-running operation
    FetchPredictOperation,
    /// Anything else, forwarded to the original path
    Passthrough(&'a str),
}

impl<'a> Operation<'a> {
    /// Classify an endpoint path by the operation suffix it carries
    pub fn classify(endpoint: &'a str) -> Self {
        if endpoint.contains(PREDICT_LONG_RUNNING) {
            Self::PredictLongRunning
        } else if endpoint.contains(FETCH_PREDICT_OPERATION) {
            Self::FetchPredictOperation
        } else {
            Self::Passthrough(endpoint)
        }
    }

    /// Path on the proxy host the request is sent to
    pub fn proxy_path(&self) -> &'a str {
        match *self {
            Self::PredictLongRunning => GENERATE_VIDEO_PATH,
            Self::FetchPredictOperation => CHECK_OPERATION_PATH,
            Self::Passthrough(path) => path,
        }
    }
}

/// Whether people may appear in generated videos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonGeneration {
    /// Adults only (default)
    #[default]
    AllowAdult,
    /// No people
    DontAllow,
    /// Adults and children
    AllowAll,
}

impl FromStr for PersonGeneration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "allow_adult" => Ok(Self::AllowAdult),
            "dont_allow" => Ok(Self::DontAllow),
            "allow_all" => Ok(Self::AllowAll),
            other => Err(format!("unknown person generation policy: {}", other)),
        }
    }
}

/// Inline or Cloud Storage image used as the first frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInput {
    /// Base64-encoded image bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes_base64_encoded: Option<String>,
    /// `gs://` URI of the image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gcs_uri: Option<String>,
    /// MIME type, e.g. `image/png`
    pub mime_type: String,
}

/// One generation instance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoInstance {
    /// Text prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Optional first-frame image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageInput>,
}

/// Generation parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoParameters {
    /// `16:9` or `9:16`
    pub aspect_ratio: String,
    /// Clip length in seconds
    pub duration_seconds: u32,
    /// Let the model rewrite the prompt
    pub enhance_prompt: bool,
    /// Generate an audio track (Veo 3 only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_audio: Option<bool>,
    /// Whether people may appear
    pub person_generation: PersonGeneration,
    /// Number of videos to generate
    pub sample_count: u32,
    /// Content to steer away from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    /// Seed for reproducible output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u32>,
    /// `gs://` prefix to write results to instead of returning bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_uri: Option<String>,
}

impl Default for VideoParameters {
    fn default() -> Self {
        Self {
            aspect_ratio: "16:9".to_string(),
            duration_seconds: 8,
            enhance_prompt: true,
            generate_audio: None,
            person_generation: PersonGeneration::default(),
            sample_count: 1,
            negative_prompt: None,
            seed: None,
            storage_uri: None,
        }
    }
}

/// Full `:predictLongRunning` request body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoGenerationRequest {
    /// Prompts to generate from; the proxy only uses the first
    pub instances: Vec<VideoInstance>,
    /// Generation parameters, proxy defaults when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<VideoParameters>,
}

impl VideoGenerationRequest {
    /// Text-to-video request with default parameters
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            instances: vec![VideoInstance {
                prompt: Some(prompt.into()),
                image: None,
            }],
            parameters: Some(VideoParameters::default()),
        }
    }
}

/// Flattened body accepted by the proxy's `/generate-video` endpoint.
///
/// Absent fields are omitted from the serialized body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifiedVideoRequest {
    /// Text prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Base64-encoded first-frame image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// MIME type of `image`, `image/jpeg` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_mime_type: Option<String>,
    /// See [`VideoParameters::aspect_ratio`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    /// See [`VideoParameters::duration_seconds`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u32>,
    /// See [`VideoParameters::enhance_prompt`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enhance_prompt: Option<bool>,
    /// See [`VideoParameters::generate_audio`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_audio: Option<bool>,
    /// See [`VideoParameters::person_generation`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_generation: Option<PersonGeneration>,
    /// See [`VideoParameters::sample_count`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_count: Option<u32>,
    /// See [`VideoParameters::negative_prompt`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    /// See [`VideoParameters::seed`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u32>,
    /// See [`VideoParameters::storage_uri`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_uri: Option<String>,
}

impl From<&VideoGenerationRequest> for SimplifiedVideoRequest {
    /// Only the first instance is used; an image without inline bytes is dropped.
    fn from(request: &VideoGenerationRequest) -> Self {
        let mut simplified = Self::default();

        if let Some(instance) = request.instances.first() {
            simplified.prompt = instance.prompt.clone();

            if let Some(image) = &instance.image {
                if let Some(bytes) = &image.bytes_base64_encoded {
                    simplified.image = Some(bytes.clone());
                    simplified.image_mime_type = Some(image.mime_type.clone());
                }
            }
        }

        if let Some(params) = &request.parameters {
            simplified.aspect_ratio = Some(params.aspect_ratio.clone());
            simplified.duration_seconds = Some(params.duration_seconds);
            simplified.enhance_prompt = Some(params.enhance_prompt);
            simplified.generate_audio = params.generate_audio;
            simplified.person_generation = Some(params.person_generation);
            simplified.sample_count = Some(params.sample_count);
            simplified.negative_prompt = params.negative_prompt.clone();
            simplified.seed = params.seed;
            simplified.storage_uri = params.storage_uri.clone();
        }

        simplified
    }
}

impl SimplifiedVideoRequest {
    /// Expand back into a full generation request, filling proxy defaults
    /// for anything the caller left out.
    pub fn into_generation_request(self) -> VideoGenerationRequest {
        let defaults = VideoParameters::default();

        let image = self.image.map(|bytes| ImageInput {
            bytes_base64_encoded: Some(bytes),
            gcs_uri: None,
            mime_type: self
                .image_mime_type
                .unwrap_or_else(|| "image/jpeg".to_string()),
        });

        VideoGenerationRequest {
            instances: vec![VideoInstance {
                prompt: self.prompt,
                image,
            }],
            parameters: Some(VideoParameters {
                aspect_ratio: self.aspect_ratio.unwrap_or(defaults.aspect_ratio),
                duration_seconds: self.duration_seconds.unwrap_or(defaults.duration_seconds),
                enhance_prompt: self.enhance_prompt.unwrap_or(defaults.enhance_prompt),
                generate_audio: self.generate_audio,
                person_generation: self
                    .person_generation
                    .unwrap_or(defaults.person_generation),
                sample_count: self.sample_count.unwrap_or(defaults.sample_count),
                negative_prompt: self.negative_prompt,
                seed: self.seed,
                storage_uri: self.storage_uri,
            }),
        }
    }
}

/// `:fetchPredictOperation` request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchOperationRequest {
    /// Full operation name from [`LongRunningOperation::name`]
    pub operation_name: String,
}

impl FetchOperationRequest {
    /// Poll request for the given operation
    pub fn new(operation_name: impl Into<String>) -> Self {
        Self {
            operation_name: operation_name.into(),
        }
    }
}

/// Handle returned when a generation starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongRunningOperation {
    /// Full operation name, used for polling
    pub name: String,
}

/// State of a long-running generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationStatus {
    /// Operation name
    pub name: String,
    /// Set once the operation has finished, successfully or not
    #[serde(default)]
    pub done: bool,
    /// Result of a successful operation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<GenerationResult>,
    /// Failure of an unsuccessful operation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<OperationError>,
}

impl OperationStatus {
    /// Generated videos, empty until the operation completes
    pub fn videos(&self) -> &[GeneratedVideo] {
        self.response
            .as_ref()
            .map(|r| r.videos.as_slice())
            .unwrap_or_default()
    }
}

/// Payload of a completed operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    /// Protobuf type URL of the response
    #[serde(rename = "@type", default, skip_serializing_if = "Option::is_none")]
    pub type_url: Option<String>,
    /// Videos withheld by responsible-AI filters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rai_media_filtered_count: Option<u32>,
    /// Why videos were withheld
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rai_media_filtered_reasons: Option<Vec<String>>,
    /// Generated clips
    #[serde(default)]
    pub videos: Vec<GeneratedVideo>,
}

/// One generated clip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedVideo {
    /// Location under the request's `storageUri`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gcs_uri: Option<String>,
    /// Inline video when no `storageUri` was given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes_base64_encoded: Option<String>,
    /// Usually `video/mp4`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// Error reported by a failed operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationError {
    /// gRPC status code
    pub code: i32,
    /// Human-readable description
    pub message: String,
}
