use std::time::Instant;

use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use crate::config::CONFIG;
use crate::llm::media::ImagePayload;
use crate::llm::GenerateError;
use crate::prompt::{response_schema, VideoPrompt};
use crate::utils::http::get_http_client;

const SYSTEM_INSTRUCTION: &str = "You are a visual-to-video prompt generator AI. Your task is to analyze a user-provided set of images and create a single, coherent JSON object describing how to turn them into a short, realistic video scene. The generated scene should logically combine elements and subjects from all the images provided into one cohesive narrative or setting.

Your JSON output must strictly follow this structure:
- \"scene_description\": Describe what is visible in the combined scene.
- \"camera_movement\": Explain how the camera should move (e.g., zoom in, pan left, rotate, drone shot).
- \"camera_angle\": Describe the perspective (e.g., eye level, top view, low angle).
- \"lighting\": Describe the lighting setup (e.g., natural daylight, cinematic, neon glow).
- \"environment\": Describe the synthesized surroundings or background.
- \"subject_action\": Suggest what movement or action could happen, potentially involving subjects from different images interacting.
- \"mood_tone\": Describe the emotional tone or atmosphere.
- \"video_style\": Describe the style (e.g., cinematic, documentary, anime, futuristic).
- \"duration\": Suggest an ideal video length in seconds.
- \"recommended_prompt\": Combine all the above into one natural-language prompt usable in a video generation model.

Rules:
- Synthesize a single, coherent scene from ALL provided images.
- Always generate JSON only.
- The output should help create a short, camera-realistic video.
- Be detailed, creative, and cinematic.";

const USER_DIRECTIVE: &str =
    "Generate a single, coherent video prompt that incorporates elements from all of these images.";

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    parts: Option<Vec<GeminiPart>>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

fn redact_gemini_api_key(text: &str) -> String {
    let key = CONFIG.gemini_api_key.trim();
    if key.is_empty() {
        return text.to_string();
    }
    text.replace(key, "[redacted]")
}

fn require_api_key(key: &str) -> Result<&str, GenerateError> {
    let key = key.trim();
    if key.is_empty() {
        return Err(GenerateError::MissingApiKey);
    }
    Ok(key)
}

fn build_safety_settings() -> Vec<Value> {
    let profile = CONFIG.gemini_safety_settings.as_str();
    let threshold = match profile {
        "standard" => "BLOCK_MEDIUM_AND_ABOVE",
        _ => "OFF",
    };

    vec![
        json!({ "category": "HARM_CATEGORY_HARASSMENT", "threshold": threshold }),
        json!({ "category": "HARM_CATEGORY_HATE_SPEECH", "threshold": threshold }),
        json!({ "category": "HARM_CATEGORY_SEXUALLY_EXPLICIT", "threshold": threshold }),
        json!({ "category": "HARM_CATEGORY_DANGEROUS_CONTENT", "threshold": threshold }),
        json!({ "category": "HARM_CATEGORY_CIVIC_INTEGRITY", "threshold": threshold }),
    ]
}

fn truncate_for_log(value: &str, limit: usize) -> String {
    if value.chars().count() <= limit {
        return value.to_string();
    }
    let truncated: String = value.chars().take(limit).collect();
    format!("{truncated}... (truncated)")
}

/// Image parts first, in input order, then the text directive. Matches the
/// part order the model was tuned against for multi-image synthesis.
fn build_parts(images: &[ImagePayload]) -> Vec<Value> {
    let mut parts: Vec<Value> = images
        .iter()
        .map(|image| {
            json!({
                "inlineData": {
                    "mimeType": image.mime_type,
                    "data": image.data
                }
            })
        })
        .collect();
    parts.push(json!({ "text": USER_DIRECTIVE }));
    parts
}

fn build_payload(images: &[ImagePayload]) -> Value {
    json!({
        "systemInstruction": { "parts": [{ "text": SYSTEM_INSTRUCTION }] },
        "contents": [{ "role": "user", "parts": build_parts(images) }],
        "generationConfig": {
            "temperature": CONFIG.gemini_temperature,
            "topK": CONFIG.gemini_top_k,
            "topP": CONFIG.gemini_top_p,
            "maxOutputTokens": CONFIG.gemini_max_output_tokens,
            "responseMimeType": "application/json",
            "responseSchema": response_schema(),
        },
        "safetySettings": build_safety_settings(),
    })
}

fn summarize_parts(parts: &[Value]) -> Vec<Value> {
    parts
        .iter()
        .map(|part| {
            if let Some(text) = part.get("text").and_then(|value| value.as_str()) {
                json!({ "text": truncate_for_log(text, 200) })
            } else if let Some(inline_data) = part.get("inlineData") {
                let mime_type = inline_data
                    .get("mimeType")
                    .and_then(|value| value.as_str())
                    .unwrap_or("unknown");
                let data_len = inline_data
                    .get("data")
                    .and_then(|value| value.as_str())
                    .map(|value| value.len())
                    .unwrap_or(0);
                json!({ "inlineData": { "mimeType": mime_type, "dataLen": data_len } })
            } else {
                json!({ "unknownPart": true })
            }
        })
        .collect()
}

fn summarize_payload(payload: &Value) -> Value {
    let mut summary = Map::new();

    if payload.pointer("/systemInstruction").is_some() {
        summary.insert(
            "systemInstruction".to_string(),
            Value::String("video_prompt_system_instruction".to_string()),
        );
    }

    if let Some(contents) = payload.get("contents").and_then(|value| value.as_array()) {
        let summarized: Vec<Value> = contents
            .iter()
            .map(|content| {
                let role = content
                    .get("role")
                    .and_then(|value| value.as_str())
                    .unwrap_or("user");
                let parts = content
                    .get("parts")
                    .and_then(|value| value.as_array())
                    .map(|parts| summarize_parts(parts))
                    .unwrap_or_default();
                json!({ "role": role, "parts": parts })
            })
            .collect();
        summary.insert("contents".to_string(), Value::Array(summarized));
    }

    if let Some(config) = payload.pointer("/generationConfig/responseMimeType") {
        summary.insert("responseMimeType".to_string(), config.clone());
    }

    Value::Object(summary)
}

fn summarize_error_body(body: &str) -> (Option<String>, String) {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return (None, "empty response body".to_string());
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        let message = value
            .pointer("/error/message")
            .and_then(|v| v.as_str())
            .map(|v| v.to_string())
            .or_else(|| {
                value
                    .get("message")
                    .and_then(|v| v.as_str())
                    .map(|v| v.to_string())
            });
        return (message, truncate_for_log(&value.to_string(), 2000));
    }

    (None, truncate_for_log(trimmed, 2000))
}

fn extract_text_from_response(response: GeminiResponse) -> String {
    let mut text_parts = Vec::new();
    for candidate in response.candidates.unwrap_or_default() {
        if let Some(content) = candidate.content {
            for part in content.parts.unwrap_or_default() {
                if let Some(text) = part.text {
                    if !text.trim().is_empty() {
                        text_parts.push(text);
                    }
                }
            }
        }
    }
    text_parts.join("\n")
}

/// Single-shot call to `generateContent`. Errors are terminal; a failed
/// attempt is never retried here, the user retriggers manually.
async fn call_gemini_api(model: &str, payload: Value) -> Result<GeminiResponse, GenerateError> {
    let api_key = require_api_key(&CONFIG.gemini_api_key)?;
    let client = get_http_client();
    let url = format!(
        "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
        model, api_key
    );

    if tracing::enabled!(tracing::Level::DEBUG) {
        debug!(target: "llm.gemini", model = model, payload = %summarize_payload(&payload));
    }

    let response = match client.post(&url).json(&payload).send().await {
        Ok(response) => response,
        Err(err) => {
            let err_text = redact_gemini_api_key(&err.to_string());
            warn!(
                "Gemini request failed to send: {} (timeout={}, connect={})",
                err_text,
                err.is_timeout(),
                err.is_connect()
            );
            return Err(GenerateError::Request(err_text));
        }
    };

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let (message, body_summary) = summarize_error_body(&body);
        warn!("Gemini API error: status={}, body={}", status, body_summary);
        let detail = message.unwrap_or(body_summary);
        return Err(GenerateError::Api {
            status: status.to_string(),
            detail: redact_gemini_api_key(&detail),
        });
    }

    response
        .json::<GeminiResponse>()
        .await
        .map_err(|err| GenerateError::MalformedResponse(redact_gemini_api_key(&err.to_string())))
}

/// One full generation attempt from already-encoded images to a validated
/// [`VideoPrompt`]. Image order in `images` is preserved in the request.
pub async fn generate_video_prompt(
    images: Vec<ImagePayload>,
) -> Result<VideoPrompt, GenerateError> {
    require_api_key(&CONFIG.gemini_api_key)?;

    let model = CONFIG.gemini_model.as_str();
    let payload = build_payload(&images);
    let started = Instant::now();

    let response = call_gemini_api(model, payload).await?;
    let text = extract_text_from_response(response);
    if text.trim().is_empty() {
        return Err(GenerateError::EmptyResponse);
    }

    if tracing::enabled!(tracing::Level::DEBUG) {
        debug!(target: "llm.gemini", response_text = %truncate_for_log(&text, 400));
    }

    let prompt = VideoPrompt::from_json_text(&text)
        .map_err(|err| GenerateError::MalformedResponse(err.to_string()))?;

    info!(
        "Generated video prompt from {} image(s) in {} ms (model: {})",
        images.len(),
        started.elapsed().as_millis(),
        model
    );

    Ok(prompt)
}
