//! `archpro topics`

use anyhow::{Context, Result};
use serde::Serialize;

use crate::{App, Phase, emit_jcs};

#[derive(Debug, Clone, Serialize)]
pub struct TopicEntry {
    pub id: String,
    pub name: String,
    pub icon: String,
    /// Phases with bundled fallback content
    pub fallback_phases: Vec<Phase>,
}

pub fn topics_output(app: &App) -> Vec<TopicEntry> {
    app.catalog
        .iter()
        .map(|topic| TopicEntry {
            id: topic.id.clone(),
            name: topic.name.clone(),
            icon: topic.icon.clone(),
            fallback_phases: app.store.covered_phases(&topic.id),
        })
        .collect()
}

pub fn execute_topics_command(app: &App, json: bool) -> Result<()> {
    let topics = topics_output(app);

    if json {
        let json_output = emit_jcs(&topics).context("Failed to emit topics JSON")?;
        println!("{json_output}");
        return Ok(());
    }

    for topic in &topics {
        println!("{} {:<16} {}", topic.icon, topic.id, topic.name);
    }
    Ok(())
}
