//! `archpro render`

use anyhow::{Context, Result};
use serde::Serialize;

use archpro_engine::{BlogView, View, WorkspaceView};

use super::common::{parse_phases, report_notes};
use crate::{App, EnsureReport, Phase, emit_jcs};

#[derive(Debug, Clone, Serialize)]
pub struct PhaseReport {
    pub phase: Phase,
    #[serde(flatten)]
    pub report: EnsureReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderOutput {
    pub topic_id: String,
    pub provider: &'static str,
    pub live: bool,
    /// One entry per requested phase, in request order
    pub reports: Vec<PhaseReport>,
    pub view: View,
}

/// Ensure each phase in order, then build the requested view.
///
/// # Errors
///
/// Unknown topic or phase names fail before anything is generated.
pub async fn render_output(
    app: &App,
    topic_id: &str,
    phase_names: &[String],
    blog: bool,
) -> Result<RenderOutput> {
    let topic = app.topic(topic_id)?;
    let phases = parse_phases(phase_names)?;

    let mut reports = Vec::with_capacity(phases.len());
    for phase in &phases {
        let report = app.studio.ensure_content(&topic, *phase).await;
        reports.push(PhaseReport {
            phase: *phase,
            report,
        });
    }

    let view = if blog {
        View::Blog(BlogView::build(app.studio.as_ref(), &topic))
    } else {
        let last = phases.last().copied().unwrap_or(Phase::Requirements);
        View::Workspace(WorkspaceView::build(app.studio.as_ref(), &topic, last))
    };

    Ok(RenderOutput {
        topic_id: topic.id,
        provider: app.studio.provider_name(),
        live: app.studio.is_live(),
        reports,
        view,
    })
}

pub async fn execute_render_command(
    app: &App,
    topic_id: &str,
    phase_names: &[String],
    blog: bool,
    json: bool,
) -> Result<()> {
    let output = render_output(app, topic_id, phase_names, blog).await?;

    if json {
        let json_output = emit_jcs(&output).context("Failed to emit render JSON")?;
        println!("{json_output}");
        return Ok(());
    }

    for entry in &output.reports {
        for note in report_notes(entry.phase, &entry.report) {
            eprintln!("{note}");
        }
    }
    print!("{}", output.view.to_markdown());
    Ok(())
}
