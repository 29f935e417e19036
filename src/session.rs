use std::path::PathBuf;

use iced::widget::image;
use tracing::warn;

use crate::llm::GenerateError;
use crate::prompt::VideoPrompt;

/// One selected image: its source path plus the preview handle the UI renders.
/// The handle is the only local resource tied to a selection; dropping the
/// asset releases it, so replacement and clearing free previews exactly once.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    pub path: PathBuf,
    pub preview: image::Handle,
}

impl ImageAsset {
    pub fn from_path(path: PathBuf) -> Self {
        let preview = image::Handle::from_path(&path);
        Self { path, preview }
    }
}

/// Display state of the generation cycle. At most one of in-progress, error
/// or result is ever active.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Generating,
    Succeeded {
        prompt: VideoPrompt,
        pretty: String,
    },
    Failed(String),
}

/// Session-scoped state: the current image set and the generation phase.
/// Owned exclusively by the UI loop; every mutation goes through the
/// operations below, nothing else touches the preview handles.
#[derive(Debug, Default)]
pub struct SessionContext {
    images: Vec<ImageAsset>,
    phase: Phase,
}

impl SessionContext {
    pub fn images(&self) -> &[ImageAsset] {
        &self.images
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_generating(&self) -> bool {
        matches!(self.phase, Phase::Generating)
    }

    /// Replaces the current image set. The previous assets (and their preview
    /// handles) are dropped before the new ones are installed; an empty list
    /// is ignored. Any displayed result or error is reset.
    pub fn set_images(&mut self, assets: Vec<ImageAsset>) {
        if assets.is_empty() {
            return;
        }
        self.images = assets;
        self.phase = Phase::Idle;
    }

    /// Empties the image set and resets the display to the placeholder state.
    pub fn clear(&mut self) {
        self.images.clear();
        self.phase = Phase::Idle;
    }

    /// Starts a generation attempt, clearing any prior result or error.
    /// Returns false (and changes nothing) when the set is empty or an
    /// attempt is already in flight.
    pub fn begin_generation(&mut self) -> bool {
        if self.images.is_empty() || self.is_generating() {
            return false;
        }
        self.phase = Phase::Generating;
        true
    }

    /// Resolves the in-flight attempt to its terminal state. Results arriving
    /// outside a generation phase are stale and dropped.
    pub fn finish(&mut self, result: Result<VideoPrompt, GenerateError>) {
        if !self.is_generating() {
            warn!("Dropping generation result received outside an attempt");
            return;
        }

        self.phase = match result {
            Ok(prompt) => match prompt.to_pretty_json() {
                Ok(pretty) => Phase::Succeeded { prompt, pretty },
                Err(err) => Phase::Failed(format!("Failed to render result: {err}")),
            },
            Err(err) => Phase::Failed(err.to_string()),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(name: &str) -> ImageAsset {
        ImageAsset {
            path: PathBuf::from(name),
            preview: image::Handle::from_bytes(vec![0u8; 4]),
        }
    }

    fn sample_prompt() -> VideoPrompt {
        VideoPrompt {
            scene_description: "a cat on a beach".to_string(),
            camera_movement: "slow pan".to_string(),
            camera_angle: "eye level".to_string(),
            lighting: "golden hour".to_string(),
            environment: "sandy shore".to_string(),
            subject_action: "the cat walks along the surf".to_string(),
            mood_tone: "serene".to_string(),
            video_style: "cinematic".to_string(),
            duration: "8 seconds".to_string(),
            recommended_prompt: "a cinematic shot of a cat on a beach".to_string(),
        }
    }

    #[test]
    fn set_images_replaces_instead_of_appending() {
        let mut session = SessionContext::default();
        session.set_images(vec![asset("a.png"), asset("b.png")]);
        session.set_images(vec![asset("c.png")]);

        assert_eq!(session.images().len(), 1);
        assert_eq!(session.images()[0].path, PathBuf::from("c.png"));
    }

    #[test]
    fn set_images_ignores_an_empty_list() {
        let mut session = SessionContext::default();
        session.set_images(vec![asset("a.png")]);
        session.set_images(Vec::new());
        assert_eq!(session.images().len(), 1);
    }

    #[test]
    fn set_images_resets_a_displayed_error() {
        let mut session = SessionContext::default();
        session.set_images(vec![asset("a.png")]);
        assert!(session.begin_generation());
        session.finish(Err(GenerateError::EmptyResponse));
        assert!(matches!(session.phase(), Phase::Failed(_)));

        session.set_images(vec![asset("b.png")]);
        assert_eq!(session.phase(), &Phase::Idle);
    }

    #[test]
    fn clear_empties_the_set_and_resets_the_display() {
        let mut session = SessionContext::default();
        session.set_images(vec![asset("a.png")]);
        assert!(session.begin_generation());
        session.finish(Ok(sample_prompt()));

        session.clear();
        assert!(session.images().is_empty());
        assert_eq!(session.phase(), &Phase::Idle);
    }

    #[test]
    fn generation_with_no_images_is_a_no_op() {
        let mut session = SessionContext::default();
        assert!(!session.begin_generation());
        assert_eq!(session.phase(), &Phase::Idle);
    }

    #[test]
    fn generation_while_generating_is_a_no_op() {
        let mut session = SessionContext::default();
        session.set_images(vec![asset("a.png")]);
        assert!(session.begin_generation());
        assert!(!session.begin_generation());
        assert!(session.is_generating());
    }

    #[test]
    fn a_new_attempt_clears_the_previous_result() {
        let mut session = SessionContext::default();
        session.set_images(vec![asset("a.png")]);
        assert!(session.begin_generation());
        session.finish(Ok(sample_prompt()));
        assert!(matches!(session.phase(), Phase::Succeeded { .. }));

        assert!(session.begin_generation());
        assert!(session.is_generating());
    }

    #[test]
    fn success_renders_the_pretty_text_once() {
        let mut session = SessionContext::default();
        session.set_images(vec![asset("a.png")]);
        assert!(session.begin_generation());

        let prompt = sample_prompt();
        let expected = prompt.to_pretty_json().expect("should serialize");
        session.finish(Ok(prompt));

        match session.phase() {
            Phase::Succeeded { pretty, .. } => assert_eq!(pretty, &expected),
            other => panic!("unexpected phase: {other:?}"),
        }
    }

    #[test]
    fn failure_keeps_the_message_verbatim() {
        let mut session = SessionContext::default();
        session.set_images(vec![asset("a.png")]);
        assert!(session.begin_generation());
        session.finish(Err(GenerateError::MissingApiKey));

        assert_eq!(
            session.phase(),
            &Phase::Failed("GEMINI_API_KEY environment variable is not set.".to_string())
        );
    }

    #[test]
    fn stale_results_outside_an_attempt_are_dropped() {
        let mut session = SessionContext::default();
        session.set_images(vec![asset("a.png")]);
        session.finish(Ok(sample_prompt()));
        assert_eq!(session.phase(), &Phase::Idle);
    }
}
