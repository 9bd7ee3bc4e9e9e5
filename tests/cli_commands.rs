//! Command output and configuration discovery tests

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use archpro::cli::commands::{config_output, render_output, topics_output, video_output};
use archpro::{
    App, ArchProError, CliArgs, Config, GenerationError, Phase, StaticFallbackStore, StepOutcome,
    TopicCatalog, View, emit_jcs,
};
use archpro_config::{CONFIG_DIR_NAME, SelectedCredentialSource, StaticCredential};
use archpro_engine::{ContentReader, TerminalCredentialHook};

fn static_app() -> App {
    App::from_config(Config::builder().provider("static").build().unwrap()).unwrap()
}

fn write_config(dir: &Path, content: &str) {
    let config_dir = dir.join(CONFIG_DIR_NAME);
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), content).unwrap();
    // Stop discovery at the temp dir.
    fs::create_dir_all(dir.join(".git")).unwrap();
}

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn config_file_values_are_attributed() {
    let temp = TempDir::new().unwrap();
    write_config(
        temp.path(),
        r#"
[defaults]
view_mode = "blog"

[llm]
provider = "static"

[video]
poll_interval = 3
max_polls = 4
"#,
    );

    let config = Config::discover_with_env(temp.path(), &CliArgs::default(), no_env).unwrap();
    assert_eq!(config.poll_interval(), Duration::from_secs(3));
    assert_eq!(config.max_polls(), 4);

    let output = config_output(&config);
    assert_eq!(output.values["view_mode"].value, "blog");
    assert_eq!(output.values["view_mode"].source, "config");
    assert_eq!(output.values["llm_provider"].value, "static");
    assert!(output.config_path.unwrap().ends_with("config.toml"));
}

#[test]
fn cli_overrides_env_and_file() {
    let temp = TempDir::new().unwrap();
    write_config(temp.path(), "[llm]\nprovider = \"gemini\"\n");

    let from_env = Config::discover_with_env(temp.path(), &CliArgs::default(), |key| {
        (key == "ARCHPRO_LLM_PROVIDER").then(|| "static".to_string())
    })
    .unwrap();
    assert_eq!(config_output(&from_env).values["llm_provider"].source, "env");

    let args = CliArgs {
        llm_provider: Some("gemini".to_string()),
        max_polls: Some(7),
        ..CliArgs::default()
    };
    let from_cli = Config::discover_with_env(temp.path(), &args, |key| {
        (key == "ARCHPRO_LLM_PROVIDER").then(|| "static".to_string())
    })
    .unwrap();
    let output = config_output(&from_cli);
    assert_eq!(output.values["llm_provider"].value, "gemini");
    assert_eq!(output.values["llm_provider"].source, "cli");
    assert_eq!(output.values["max_polls"].value, "7");
}

#[test]
fn invalid_provider_is_rejected() {
    let temp = TempDir::new().unwrap();
    write_config(temp.path(), "[llm]\nprovider = \"openai\"\n");
    assert!(Config::discover_with_env(temp.path(), &CliArgs::default(), no_env).is_err());
}

#[test]
fn topics_list_the_catalog_in_order() {
    let app = static_app();
    let topics = topics_output(&app);
    assert_eq!(topics.len(), 9);
    assert_eq!(topics[0].id, "uber");
    assert_eq!(
        topics[0].fallback_phases,
        vec![
            Phase::Requirements,
            Phase::MachineCoding,
            Phase::DeepDivesScaling
        ]
    );
    assert!(topics.iter().any(|t| t.id == "spotify" && t.fallback_phases.is_empty()));
}

#[tokio::test]
async fn render_workspace_shows_last_requested_phase() {
    let app = static_app();
    let output = render_output(
        &app,
        "uber",
        &["requirements".to_string(), "hld".to_string()],
        false,
    )
    .await
    .unwrap();

    assert_eq!(output.reports.len(), 2);
    assert_eq!(output.reports[0].phase, Phase::Requirements);
    assert_eq!(output.reports[1].report.diagram, StepOutcome::Populated);
    let View::Workspace(view) = &output.view else {
        panic!("expected workspace view");
    };
    assert_eq!(view.active_phase, Phase::HighLevelDesign);
    assert!(view.diagram.is_some());
    assert!(!output.live);
}

#[tokio::test]
async fn render_blog_follows_phase_order_not_request_order() {
    let app = static_app();
    let output = render_output(
        &app,
        "uber",
        &[
            "deep-dives".to_string(),
            "requirements".to_string(),
            "hld".to_string(),
        ],
        true,
    )
    .await
    .unwrap();

    let View::Blog(blog) = &output.view else {
        panic!("expected blog view");
    };
    let sections: Vec<&str> = blog.body.split("\n\n---\n\n").collect();
    assert_eq!(sections.len(), 3);
    assert_eq!(
        sections[0],
        app.store.section("uber", Phase::Requirements).unwrap()
    );
    assert!(sections[1].contains("coming soon"));
    assert_eq!(
        sections[2],
        app.store.section("uber", Phase::DeepDivesScaling).unwrap()
    );
    assert_eq!(blog.title, "Designing Uber: An SDE-3 Deep Dive");
}

#[tokio::test]
async fn render_json_is_canonical() {
    let app = static_app();
    let output = render_output(&app, "zomato", &["requirements".to_string()], false)
        .await
        .unwrap();
    let json = emit_jcs(&output).unwrap();

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["topic_id"], "zomato");
    assert_eq!(value["view"]["view"], "workspace");
    assert_eq!(value["reports"][0]["phase"], "requirements");
    assert_eq!(value["reports"][0]["section"]["outcome"], "populated");
    // JCS sorts keys and emits no insignificant whitespace.
    assert!(json.starts_with("{\"live\":false,"));
}

#[tokio::test]
async fn unknown_topic_and_phase_generate_nothing() {
    let app = static_app();

    let err = render_output(&app, "myspace", &["requirements".to_string()], false)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ArchProError>(),
        Some(ArchProError::UnknownTopic { .. })
    ));

    let err = render_output(&app, "uber", &["capacity".to_string()], false)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ArchProError>(),
        Some(ArchProError::UnknownPhase { .. })
    ));
    assert_eq!(app.studio.stats().misses, 0);
}

fn keyless_app() -> App {
    let credentials = Arc::new(SelectedCredentialSource::new(Arc::new(
        StaticCredential::none(),
    )));
    App::new(
        Config::builder().provider("static").build().unwrap(),
        credentials,
        Arc::new(TopicCatalog::builtin()),
        Arc::new(StaticFallbackStore::builtin()),
    )
    .unwrap()
}

#[tokio::test]
async fn video_asks_for_a_key_before_generating() {
    let app = keyless_app();
    let hook = TerminalCredentialHook::new(app.credentials.clone());

    let err = video_output(&app, "uber", &hook).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ArchProError>(),
        Some(ArchProError::Generation(GenerationError::Unsupported(_)))
    ));
    assert_eq!(hook.prompts(), 1);
    assert!(app.studio.video().is_none());
}

#[tokio::test]
async fn video_skips_the_prompt_once_a_key_is_selected() {
    let app = keyless_app();
    assert!(app.credentials.select("AIza-selected-key"));
    let hook = TerminalCredentialHook::new(app.credentials.clone());

    // The static provider has no video model either way.
    assert!(video_output(&app, "uber", &hook).await.is_err());
    assert_eq!(hook.prompts(), 0);
}

#[tokio::test]
async fn video_for_unknown_topic_does_not_prompt() {
    let app = keyless_app();
    let hook = TerminalCredentialHook::new(app.credentials.clone());

    let err = video_output(&app, "myspace", &hook).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ArchProError>(),
        Some(ArchProError::UnknownTopic { .. })
    ));
    assert_eq!(hook.prompts(), 0);
}
