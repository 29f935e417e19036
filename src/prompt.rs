use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Structured description of a single synthesized video scene.
///
/// All ten fields are required; a Gemini response missing any of them is
/// rejected during parsing. Field order here is the order used for the
/// response schema and for pretty-printed output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoPrompt {
    pub scene_description: String,
    pub camera_movement: String,
    pub camera_angle: String,
    pub lighting: String,
    pub environment: String,
    pub subject_action: String,
    pub mood_tone: String,
    pub video_style: String,
    pub duration: String,
    pub recommended_prompt: String,
}

pub const REQUIRED_FIELDS: [&str; 10] = [
    "scene_description",
    "camera_movement",
    "camera_angle",
    "lighting",
    "environment",
    "subject_action",
    "mood_tone",
    "video_style",
    "duration",
    "recommended_prompt",
];

/// Gemini `responseSchema` constraining generation to the ten-field record.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "scene_description": { "type": "STRING", "description": "Description of the image scene." },
            "camera_movement": { "type": "STRING", "description": "Suggested camera movement." },
            "camera_angle": { "type": "STRING", "description": "Suggested camera angle." },
            "lighting": { "type": "STRING", "description": "Description of the lighting." },
            "environment": { "type": "STRING", "description": "Description of the environment." },
            "subject_action": { "type": "STRING", "description": "Action the subject could perform." },
            "mood_tone": { "type": "STRING", "description": "The mood and tone of the video." },
            "video_style": { "type": "STRING", "description": "The visual style of the video." },
            "duration": { "type": "STRING", "description": "Suggested duration in seconds." },
            "recommended_prompt": { "type": "STRING", "description": "A consolidated prompt for a video model." },
        },
        "required": REQUIRED_FIELDS,
    })
}

impl VideoPrompt {
    /// Strict parse of the model's response text. Missing fields or non-JSON
    /// input are both parse errors; no partial result is ever produced.
    pub fn from_json_text(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text.trim())
    }

    /// Pretty-printed JSON with keys in declared field order. This exact text
    /// is what the result pane shows and what the copy action places on the
    /// clipboard.
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> String {
        let fields: Vec<String> = REQUIRED_FIELDS
            .iter()
            .map(|name| format!("\"{name}\": \"value for {name}\""))
            .collect();
        format!("{{ {} }}", fields.join(", "))
    }

    #[test]
    fn parses_a_complete_response() {
        let prompt = VideoPrompt::from_json_text(&sample_json()).expect("should parse");
        assert_eq!(prompt.scene_description, "value for scene_description");
        assert_eq!(prompt.recommended_prompt, "value for recommended_prompt");
    }

    #[test]
    fn rejects_a_response_missing_a_field() {
        let text = sample_json().replace("\"duration\"", "\"unrelated\"");
        let err = VideoPrompt::from_json_text(&text).unwrap_err();
        assert!(err.to_string().contains("duration"), "error was: {err}");
    }

    #[test]
    fn rejects_non_json_text() {
        assert!(VideoPrompt::from_json_text("Here is your prompt!").is_err());
        assert!(VideoPrompt::from_json_text("").is_err());
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        let text = format!("\n  {}\n", sample_json());
        assert!(VideoPrompt::from_json_text(&text).is_ok());
    }

    #[test]
    fn pretty_output_keeps_declared_key_order() {
        let prompt = VideoPrompt::from_json_text(&sample_json()).expect("should parse");
        let pretty = prompt.to_pretty_json().expect("should serialize");

        let mut last = 0;
        for field in REQUIRED_FIELDS {
            let needle = format!("\"{field}\"");
            let position = pretty[last..]
                .find(&needle)
                .unwrap_or_else(|| panic!("{field} missing or out of order"));
            last += position;
        }
    }

    #[test]
    fn pretty_output_round_trips_byte_identically() {
        let prompt = VideoPrompt::from_json_text(&sample_json()).expect("should parse");
        let pretty = prompt.to_pretty_json().expect("should serialize");
        let reparsed = VideoPrompt::from_json_text(&pretty).expect("should reparse");
        assert_eq!(reparsed, prompt);
        assert_eq!(reparsed.to_pretty_json().expect("should serialize"), pretty);
    }

    #[test]
    fn schema_requires_exactly_the_ten_fields() {
        let schema = response_schema();
        let required = schema["required"].as_array().expect("required array");
        assert_eq!(required.len(), REQUIRED_FIELDS.len());

        let properties = schema["properties"].as_object().expect("properties map");
        assert_eq!(properties.len(), REQUIRED_FIELDS.len());
        for field in REQUIRED_FIELDS {
            assert!(properties.contains_key(field), "schema missing {field}");
            assert_eq!(properties[field]["type"], "STRING");
        }
    }
}
