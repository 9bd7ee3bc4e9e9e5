//! `archpro video`

use anyhow::{Context, Result};
use serde::Serialize;

use archpro_engine::{CredentialHook, TerminalCredentialHook};

use crate::{App, ArchProError, VideoRef, emit_jcs};

#[derive(Debug, Clone, Serialize)]
pub struct VideoOutput {
    pub topic_id: String,
    /// Playable URI, including the key parameter when the provider needs it
    pub video: VideoRef,
}

pub async fn execute_video_command(app: &App, topic_id: &str, json: bool) -> Result<()> {
    let hook = TerminalCredentialHook::new(app.credentials.clone());
    let output = match video_output(app, topic_id, &hook).await {
        Ok(output) => output,
        Err(err) => {
            if let Some(ArchProError::Generation(gen_err)) = err.downcast_ref::<ArchProError>()
                && gen_err.is_entity_not_found()
            {
                eprintln!(
                    "The API key from {} cannot reach the video model. Choose a key with video access.",
                    app.config.credential_source().var()
                );
            }
            return Err(err);
        }
    };

    if json {
        let json_output = emit_jcs(&output).context("Failed to emit video JSON")?;
        println!("{json_output}");
    } else {
        println!("{}", video_text(&output.video));
    }
    Ok(())
}

/// Generate the explainer video for `topic_id`.
///
/// `hook` is asked for a credential first when none is selected.
///
/// # Errors
///
/// `ArchProError::UnknownTopic` for an unknown id, `ArchProError::Generation`
/// when the provider fails.
pub async fn video_output(
    app: &App,
    topic_id: &str,
    hook: &dyn CredentialHook,
) -> Result<VideoOutput> {
    let topic = app.topic(topic_id)?;

    if !hook.has_selected_credential().await {
        hook.open_selection().await;
    }

    let video = app
        .studio
        .generate_explainer_video(&topic.name)
        .await
        .map_err(ArchProError::Generation)?;
    Ok(VideoOutput {
        topic_id: topic.id,
        video,
    })
}

/// Terminal line for a finished video.
///
/// The printed link never carries the key; when one was removed the line
/// points at `--json` for the playable URI.
#[must_use]
pub fn video_text(video: &VideoRef) -> String {
    let shown = video.redacted();
    if shown == video.uri {
        format!("Explainer video ready: {shown}")
    } else {
        format!(
            "Explainer video ready: {shown}\n  \
             (API key removed from the link; run with --json for the playable URI)"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_text_points_to_json_when_key_removed() {
        let video = VideoRef::with_key(
            "https://generativelanguage.googleapis.com/v1beta/files/abc:download?alt=media",
            "AIzaSyRealKey123",
        );
        let text = video_text(&video);
        assert!(!text.contains("AIzaSyRealKey123"));
        assert!(text.contains("key=[REDACTED]"));
        assert!(text.contains("--json for the playable URI"));
    }

    #[test]
    fn test_video_text_keyless_uri_is_printed_as_is() {
        let video = VideoRef::new("https://cdn.example.com/explainer.mp4");
        assert_eq!(
            video_text(&video),
            "Explainer video ready: https://cdn.example.com/explainer.mp4"
        );
    }
}
