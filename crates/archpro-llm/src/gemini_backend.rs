//! Gemini REST backend
//!
//! Text, diagram and cover calls use `models/{model}:generateContent`; video
//! uses `models/{model}:predictLongRunning` followed by operation polling.
//! The API key travels in the `x-goog-api-key` header and is read from the
//! credential source on every call, so a key selected mid-session is used
//! by the next request.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use archpro_config::{Credential, CredentialSource, ResolvedGemini};
use archpro_utils::error::GenerationError;
use archpro_utils::logging::{log_generation_complete, log_generation_start};
use archpro_utils::types::Phase;

use crate::http_client::HttpClient;
use crate::prompts::{cover_prompt, diagram_prompt, section_prompt, strip_code_fences, video_prompt};
use crate::types::{GenerationCapability, ImageRef, VideoRef};
use crate::video::{JobStatus, PollBudget, VideoOperations, run_video_job};

const PROVIDER_NAME: &str = "gemini";
const API_KEY_HEADER: &str = "x-goog-api-key";
const COVER_ASPECT_RATIO: &str = "16:9";
const VIDEO_ASPECT_RATIO: &str = "16:9";
const VIDEO_RESOLUTION: &str = "720p";

pub struct GeminiBackend {
    http: HttpClient,
    settings: ResolvedGemini,
    credentials: Arc<dyn CredentialSource>,
    budget: PollBudget,
}

impl GeminiBackend {
    /// # Errors
    ///
    /// Returns `GenerationError::Misconfiguration` if the HTTP client cannot be constructed
    pub fn new(
        settings: ResolvedGemini,
        credentials: Arc<dyn CredentialSource>,
        budget: PollBudget,
    ) -> Result<Self, GenerationError> {
        let http = HttpClient::with_max_timeout(settings.request_timeout)?;
        Ok(Self {
            http,
            settings,
            credentials,
            budget,
        })
    }

    fn credential(&self) -> Result<Credential, GenerationError> {
        self.credentials.current().ok_or_else(|| {
            GenerationError::Unavailable(format!(
                "no usable API key ({})",
                self.credentials.describe()
            ))
        })
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!(
            "{}/models/{model}:{method}",
            self.settings.base_url.trim_end_matches('/')
        )
    }

    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GenerationError> {
        let key = self.credential()?;
        let builder = self
            .http
            .post(&self.model_url(model, "generateContent"))
            .header(API_KEY_HEADER, key.expose())
            .json(request);

        let response = self
            .http
            .execute_with_retry(builder, self.settings.request_timeout, PROVIDER_NAME)
            .await?;

        response.json::<GenerateContentResponse>().await.map_err(|e| {
            GenerationError::Transport(format!("Failed to parse {PROVIDER_NAME} response: {e}"))
        })
    }
}

#[async_trait]
impl GenerationCapability for GeminiBackend {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn is_live(&self) -> bool {
        self.credentials.current().is_some()
    }

    async fn produce_section(
        &self,
        topic_id: &str,
        topic_name: &str,
        phase: Phase,
        prompt: &str,
    ) -> Result<String, GenerationError> {
        log_generation_start(topic_id, "section", PROVIDER_NAME);
        let start = Instant::now();

        let request = GenerateContentRequest::text(section_prompt(topic_name, phase, prompt))
            .with_config(GenerationConfig {
                thinking_config: Some(ThinkingConfig {
                    thinking_budget: self.settings.thinking_budget,
                }),
                ..GenerationConfig::default()
            });
        let response = self
            .generate_content(&self.settings.text_model, &request)
            .await?;

        let text = response.text().ok_or_else(|| {
            GenerationError::EmptyResponse(format!("no text for {topic_id}/{}", phase.slug()))
        })?;
        log_generation_complete(topic_id, "section", start.elapsed());
        Ok(text)
    }

    async fn produce_diagram(
        &self,
        topic_id: &str,
        topic_name: &str,
    ) -> Result<String, GenerationError> {
        log_generation_start(topic_id, "diagram", PROVIDER_NAME);
        let start = Instant::now();

        let request = GenerateContentRequest::text(diagram_prompt(topic_name));
        let response = self
            .generate_content(&self.settings.diagram_model, &request)
            .await?;

        let diagram = response
            .text()
            .map(|text| strip_code_fences(&text))
            .filter(|text| !text.is_empty())
            .ok_or_else(|| GenerationError::EmptyResponse(format!("no diagram for {topic_id}")))?;
        log_generation_complete(topic_id, "diagram", start.elapsed());
        Ok(diagram)
    }

    async fn produce_cover(
        &self,
        topic_id: &str,
        topic_name: &str,
    ) -> Result<Option<ImageRef>, GenerationError> {
        log_generation_start(topic_id, "cover", PROVIDER_NAME);
        let start = Instant::now();

        let request = GenerateContentRequest::text(cover_prompt(topic_name)).with_config(
            GenerationConfig {
                response_modalities: Some(vec!["IMAGE".to_string()]),
                image_config: Some(ImageConfig {
                    aspect_ratio: COVER_ASPECT_RATIO.to_string(),
                }),
                ..GenerationConfig::default()
            },
        );
        let response = self
            .generate_content(&self.settings.image_model, &request)
            .await?;

        log_generation_complete(topic_id, "cover", start.elapsed());
        Ok(response.inline_image())
    }

    async fn produce_video(&self, topic_name: &str) -> Result<VideoRef, GenerationError> {
        log_generation_start(topic_name, "video", PROVIDER_NAME);
        let start = Instant::now();

        let uri = run_video_job(self, &video_prompt(topic_name), self.budget).await?;
        let key = self.credential()?;
        let video = VideoRef::with_key(&uri, key.expose());

        debug!(uri = %video.redacted(), "Video ready");
        log_generation_complete(topic_name, "video", start.elapsed());
        Ok(video)
    }
}

#[async_trait]
impl VideoOperations for GeminiBackend {
    async fn submit(&self, prompt: &str) -> Result<String, GenerationError> {
        let key = self.credential()?;
        let builder = self
            .http
            .post(&self.model_url(&self.settings.video_model, "predictLongRunning"))
            .header(API_KEY_HEADER, key.expose())
            .json(&PredictRequest::video(prompt));

        let response = self
            .http
            .execute_with_retry(builder, self.settings.request_timeout, PROVIDER_NAME)
            .await?;
        let operation: Operation = response.json().await.map_err(|e| {
            GenerationError::Transport(format!("Failed to parse video submission: {e}"))
        })?;

        if let Some(error) = operation.error {
            return Err(GenerationError::JobFailed(error.message));
        }
        operation
            .name
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                GenerationError::EmptyResponse("video submission returned no operation".into())
            })
    }

    async fn poll(&self, operation: &str) -> Result<JobStatus, GenerationError> {
        let key = self.credential()?;
        let url = format!(
            "{}/{}",
            self.settings.base_url.trim_end_matches('/'),
            operation.trim_start_matches('/')
        );
        let builder = self.http.get(&url).header(API_KEY_HEADER, key.expose());

        let response = self
            .http
            .execute_with_retry(builder, self.settings.request_timeout, PROVIDER_NAME)
            .await?;
        let operation: Operation = response.json().await.map_err(|e| {
            GenerationError::Transport(format!("Failed to parse video operation: {e}"))
        })?;
        Ok(operation.status())
    }
}

// Wire types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    fn text(prompt: String) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: None,
        }
    }

    fn with_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = Some(config);
        self
    }
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<ThinkingConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_config: Option<ImageConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    aspect_ratio: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

impl GenerateContentResponse {
    fn parts(&self) -> impl Iterator<Item = &ResponsePart> {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| content.parts.iter())
            .into_iter()
            .flatten()
    }

    /// Concatenated answer text, skipping thought summaries. `None` if blank.
    fn text(&self) -> Option<String> {
        let text: String = self
            .parts()
            .filter(|part| !part.thought)
            .filter_map(|part| part.text.as_deref())
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }

    fn inline_image(&self) -> Option<ImageRef> {
        self.parts()
            .find_map(|part| part.inline_data.as_ref())
            .map(|inline| ImageRef::Inline {
                mime_type: inline.mime_type.clone(),
                data: inline.data.clone(),
            })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictRequest {
    instances: Vec<PredictInstance>,
    parameters: VideoParameters,
}

#[derive(Debug, Serialize)]
struct PredictInstance {
    prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoParameters {
    aspect_ratio: &'static str,
    resolution: &'static str,
    sample_count: u32,
}

impl PredictRequest {
    fn video(prompt: &str) -> Self {
        Self {
            instances: vec![PredictInstance {
                prompt: prompt.to_string(),
            }],
            parameters: VideoParameters {
                aspect_ratio: VIDEO_ASPECT_RATIO,
                resolution: VIDEO_RESOLUTION,
                sample_count: 1,
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Operation {
    name: Option<String>,
    #[serde(default)]
    done: bool,
    error: Option<OperationError>,
    response: Option<OperationResponse>,
}

#[derive(Debug, Deserialize)]
struct OperationError {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationResponse {
    generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateVideoResponse {
    #[serde(default)]
    generated_samples: Vec<GeneratedSample>,
}

#[derive(Debug, Deserialize)]
struct GeneratedSample {
    video: Option<VideoFile>,
}

#[derive(Debug, Deserialize)]
struct VideoFile {
    uri: Option<String>,
}

impl Operation {
    fn status(self) -> JobStatus {
        if let Some(error) = self.error {
            return JobStatus::Failed {
                message: error.message,
            };
        }
        if !self.done {
            return JobStatus::Pending;
        }
        let uri = self
            .response
            .and_then(|response| response.generate_video_response)
            .and_then(|video| video.generated_samples.into_iter().next())
            .and_then(|sample| sample.video)
            .and_then(|file| file.uri);
        JobStatus::Done { uri }
    }
}
