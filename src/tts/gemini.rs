//! Gemini TTS provider over the Generative Language REST API.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::{Language, ProviderError, SpeechProvider};
use crate::audio::{DEFAULT_SAMPLE_RATE, RawAudioStream, rate_from_mime};
use crate::config::AppConfig;

/// Finish reasons that still carry usable audio.
const ACCEPTED_FINISH_REASONS: &[&str] = &["STOP", "MAX_TOKENS"];

/// Gemini text-to-speech client.
pub struct GeminiTts {
    http: Client,     // Shared HTTP client with request timeout
    endpoint: String, // Full generateContent URL for the model
    api_key: String,  // Sent as x-goog-api-key
    model: String,    // Model name, for logs
}

impl GeminiTts {
    /// Create a new Gemini TTS client.
    ///
    /// # Arguments
    /// * `config` - Application configuration
    ///
    /// # Errors
    /// Returns an error if the API key is missing or the HTTP client cannot be built.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let api_key = config.api_key().context("GEMINI_API_KEY is not set")?.to_string();

        let http = Client::builder().timeout(Duration::from_secs(config.timeout)).build().context("Failed to create HTTP client")?;

        let endpoint = format!("{}/models/{}:generateContent", config.api_base.trim_end_matches('/'), urlencoding::encode(&config.model));

        info!("Using Gemini model: {}", config.model);
        debug!("Gemini endpoint: {}", endpoint);

        Ok(Self { http, endpoint, api_key, model: config.model.clone() })
    }
}

#[async_trait]
impl SpeechProvider for GeminiTts {
    async fn synthesize(&self, prompt: &str, voice: &str, language: Language) -> Result<RawAudioStream, ProviderError> {
        debug!("Requesting {} speech from {} with voice {} ({} chars)", language, self.model, voice, prompt.chars().count());

        let request = GenerateContentRequest::speech(prompt, voice);
        let response = self.http.post(&self.endpoint).header("x-goog-api-key", &self.api_key).json(&request).send().await.map_err(transport_error)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport_error)?;

        if !(200..300).contains(&status) {
            return Err(classify_status(status, &body));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| ProviderError::Malformed(format!("invalid JSON: {}", e)))?;
        extract_audio(parsed)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

fn transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Transport(format!("request timed out: {}", e))
    } else {
        ProviderError::Transport(e.to_string())
    }
}

/// Map a non-success HTTP status to a provider error.
fn classify_status(status: u16, body: &str) -> ProviderError {
    let api_status = serde_json::from_str::<ApiErrorBody>(body).ok().and_then(|b| b.error.status).unwrap_or_default();
    let body = body.trim().to_string();

    match status {
        429 => ProviderError::RateLimited(body),
        _ if api_status == "RESOURCE_EXHAUSTED" => ProviderError::RateLimited(body),
        400 | 401 | 403 | 404 => ProviderError::Rejected { status, body },
        _ => ProviderError::Server { status, body },
    }
}

/// Pull the PCM payload out of a successful response.
fn extract_audio(response: GenerateContentResponse) -> Result<RawAudioStream, ProviderError> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        let feedback = response.prompt_feedback.map(|v| v.to_string()).unwrap_or_else(|| "none".to_string());
        return Err(ProviderError::Empty(format!("no candidates, prompt_feedback={}", feedback)));
    };

    if let Some(reason) = candidate.finish_reason.as_deref()
        && !ACCEPTED_FINISH_REASONS.contains(&reason)
    {
        return Err(ProviderError::Blocked(reason.to_string()));
    }

    let inline = candidate.content.and_then(|c| c.parts.into_iter().find_map(|p| p.inline_data)).ok_or_else(|| {
        ProviderError::Empty(format!(
            "no audio part, finish_reason={}, safety_ratings={}",
            candidate.finish_reason.as_deref().unwrap_or("none"),
            candidate.safety_ratings.map(|v| v.to_string()).unwrap_or_else(|| "none".to_string())
        ))
    })?;

    let bytes = BASE64.decode(inline.data.as_bytes()).map_err(|e| ProviderError::Malformed(format!("invalid base64 audio: {}", e)))?;
    let rate = inline.mime_type.as_deref().and_then(rate_from_mime).unwrap_or(DEFAULT_SAMPLE_RATE);

    let audio = RawAudioStream::from_pcm_s16le(&bytes, rate).map_err(|e| ProviderError::Malformed(e.to_string()))?;
    if audio.is_empty() {
        return Err(ProviderError::Empty("audio part has no samples".to_string()));
    }
    Ok(audio)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

impl<'a> GenerateContentRequest<'a> {
    fn speech(prompt: &'a str, voice: &'a str) -> Self {
        Self {
            contents: vec![Content { parts: vec![TextPart { text: prompt }] }],
            generation_config: GenerationConfig {
                response_modalities: ["AUDIO"],
                speech_config: SpeechConfig { voice_config: VoiceConfig { prebuilt_voice_config: PrebuiltVoiceConfig { voice_name: voice } } },
            },
        }
    }
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<TextPart<'a>>,
}

#[derive(Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_modalities: [&'static str; 1],
    speech_config: SpeechConfig<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig<'a> {
    voice_config: VoiceConfig<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig<'a> {
    prebuilt_voice_config: PrebuiltVoiceConfig<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig<'a> {
    voice_name: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
    safety_ratings: Option<Value>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    inline_data: Option<InlineData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: Option<String>,
    data: String,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    status: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn parse(value: Value) -> GenerateContentResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_request_wire_format() {
        let request = GenerateContentRequest::speech("Say hi", "Kore");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "contents": [{ "parts": [{ "text": "Say hi" }] }],
                "generationConfig": {
                    "responseModalities": ["AUDIO"],
                    "speechConfig": { "voiceConfig": { "prebuiltVoiceConfig": { "voiceName": "Kore" } } }
                }
            })
        );
    }

    #[test]
    fn test_extract_audio() {
        let pcm: Vec<u8> = [100i16, -100, 2000, -2000].iter().flat_map(|s| s.to_le_bytes()).collect();
        let response = parse(json!({
            "candidates": [{
                "content": { "parts": [{ "inlineData": { "mimeType": "audio/L16;codec=pcm;rate=16000", "data": BASE64.encode(&pcm) } }] },
                "finishReason": "STOP"
            }]
        }));

        let audio = extract_audio(response).unwrap();
        assert_eq!(audio.sample_rate(), 16000);
        assert_eq!(audio.samples(), &[100, -100, 2000, -2000]);
    }

    #[test]
    fn test_missing_rate_defaults_to_24k() {
        let response = parse(json!({
            "candidates": [{ "content": { "parts": [{ "inlineData": { "data": BASE64.encode([1u8, 0]) } }] } }]
        }));
        assert_eq!(extract_audio(response).unwrap().sample_rate(), DEFAULT_SAMPLE_RATE);
    }

    #[test]
    fn test_blocked_and_empty_responses() {
        let blocked = parse(json!({ "candidates": [{ "finishReason": "SAFETY" }] }));
        assert!(matches!(extract_audio(blocked), Err(ProviderError::Blocked(reason)) if reason == "SAFETY"));

        let no_candidates = parse(json!({ "promptFeedback": { "blockReason": "OTHER" } }));
        assert!(matches!(extract_audio(no_candidates), Err(ProviderError::Empty(msg)) if msg.contains("OTHER")));

        let no_parts = parse(json!({ "candidates": [{ "content": { "parts": [] }, "finishReason": "STOP" }] }));
        assert!(matches!(extract_audio(no_parts), Err(ProviderError::Empty(_))));

        let odd = parse(json!({ "candidates": [{ "content": { "parts": [{ "inlineData": { "data": BASE64.encode([1u8, 2, 3]) } }] } }] }));
        assert!(matches!(extract_audio(odd), Err(ProviderError::Malformed(_))));
    }

    #[test]
    fn test_classify_status() {
        assert!(classify_status(429, "{}").is_rate_limit());

        let quota = r#"{"error":{"code":403,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        assert!(classify_status(403, quota).is_rate_limit());

        let bad_key = r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#;
        assert!(matches!(classify_status(400, bad_key), ProviderError::Rejected { status: 400, .. }));

        let unavailable = classify_status(503, "overloaded");
        assert!(matches!(unavailable, ProviderError::Server { status: 503, .. }));
        assert!(unavailable.is_retryable());
    }
}
