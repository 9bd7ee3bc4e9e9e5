//! `archpro session`: interactive workspace on stdin
//!
//! One command per line. Output after each command is the rendered view
//! or a short status line.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use archpro_config::SelectedCredentialSource;
use archpro_engine::{Session, VideoOutcome};
use archpro_utils::types::ViewMode;

use super::common::{parse_phase, report_notes};
use crate::App;

const PROMPT: &str = "archpro> ";

const HELP: &str = "\
Commands:
  topics          list the catalog
  select <id>     open a topic at Requirements
  phase <p>       switch phase (requirements, hld, data-model, lld,
                  machine-coding, deep-dives, follow-ups)
  blog            show every generated phase as one article
  workspace       show the active phase
  publish         toggle between workspace and blog
  video           generate the explainer video
  key <value>     use this API key for the rest of the session
  show            render the current view again
  stats           cache statistics
  help            this text
  quit            leave the session
";

/// One parsed session line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Empty,
    Topics,
    Select(String),
    Phase(String),
    Blog,
    Workspace,
    Publish,
    Video,
    Key(String),
    Show,
    Stats,
    Help,
    Quit,
}

impl ReplCommand {
    /// Parse one input line.
    ///
    /// # Errors
    ///
    /// Returns a message for unknown commands or missing arguments.
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let needs_arg = |usage: &str, make: fn(String) -> Self| {
            if rest.is_empty() {
                Err(format!("Usage: {usage}"))
            } else {
                Ok(make(rest.to_string()))
            }
        };

        match word.to_ascii_lowercase().as_str() {
            "" => Ok(Self::Empty),
            "topics" => Ok(Self::Topics),
            "select" => needs_arg("select <id>", Self::Select),
            "phase" => needs_arg("phase <p>", Self::Phase),
            "blog" => Ok(Self::Blog),
            "workspace" => Ok(Self::Workspace),
            "publish" => Ok(Self::Publish),
            "video" => Ok(Self::Video),
            "key" => needs_arg("key <value>", Self::Key),
            "show" => Ok(Self::Show),
            "stats" => Ok(Self::Stats),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(format!("Unknown command '{other}'. Type 'help' for commands.")),
        }
    }
}

pub async fn execute_session_command(app: &App) -> Result<()> {
    let mut session = app.session();
    let input = tokio::io::BufReader::new(tokio::io::stdin());
    let mut output = tokio::io::stdout();
    run_repl(&mut session, &app.credentials, input, &mut output).await
}

/// Read commands from `input` until `quit` or end of input.
pub async fn run_repl<R, W>(
    session: &mut Session,
    credentials: &SelectedCredentialSource,
    input: R,
    output: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    write_out(output, &session.render().to_markdown()).await?;
    write_out(output, PROMPT).await?;

    let mut lines = input.lines();
    while let Some(line) = lines
        .next_line()
        .await
        .context("Failed to read session input")?
    {
        let reply = match ReplCommand::parse(&line) {
            Ok(ReplCommand::Quit) => break,
            Ok(command) => handle(session, credentials, command).await,
            Err(message) => format!("{message}\n"),
        };
        write_out(output, &reply).await?;
        write_out(output, PROMPT).await?;
    }
    Ok(())
}

async fn write_out<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> Result<()> {
    output
        .write_all(text.as_bytes())
        .await
        .context("Failed to write session output")?;
    output.flush().await.context("Failed to flush session output")
}

async fn handle(
    session: &mut Session,
    credentials: &SelectedCredentialSource,
    command: ReplCommand,
) -> String {
    match command {
        ReplCommand::Empty | ReplCommand::Quit => String::new(),
        ReplCommand::Help => HELP.to_string(),
        ReplCommand::Topics => session
            .catalog()
            .iter()
            .map(|topic| format!("{} {:<16} {}\n", topic.icon, topic.id, topic.name))
            .collect(),
        ReplCommand::Select(id) => match session.select_topic(&id).await {
            Ok(report) => with_notes(
                report_notes(session.active_phase(), &report),
                session.render().to_markdown(),
            ),
            Err(err) => err.display_for_user(),
        },
        ReplCommand::Phase(name) => {
            let phase = match parse_phase(&name) {
                Ok(phase) => phase,
                Err(err) => return err.display_for_user(),
            };
            match session.change_phase(phase).await {
                Some(report) => with_notes(
                    report_notes(phase, &report),
                    session.render().to_markdown(),
                ),
                None => format!(
                    "Phase set to {}. Select a topic to generate content.\n",
                    phase.label()
                ),
            }
        }
        ReplCommand::Blog => {
            session.set_view(ViewMode::Blog);
            session.render().to_markdown()
        }
        ReplCommand::Workspace => {
            session.set_view(ViewMode::Workspace);
            session.render().to_markdown()
        }
        ReplCommand::Publish => {
            session.toggle_view();
            session.render().to_markdown()
        }
        ReplCommand::Show => session.render().to_markdown(),
        ReplCommand::Video => match session.request_video().await {
            VideoOutcome::NoTopic => "Select a topic first.\n".to_string(),
            VideoOutcome::Ready { video } => {
                format!("Explainer video ready: {}\n", video.redacted())
            }
            VideoOutcome::Failed {
                reason,
                reselect_requested,
            } => {
                let mut out = format!("Video generation failed: {reason}\n");
                if reselect_requested {
                    out.push_str("Choose a different key with: key <value>\n");
                }
                out
            }
        },
        ReplCommand::Key(value) => {
            if credentials.select(&value) {
                "Key selected for this session.\n".to_string()
            } else {
                "Key rejected: value is empty, undefined or too short.\n".to_string()
            }
        }
        ReplCommand::Stats => {
            let stats = session.studio().stats();
            format!(
                "hits {} · misses {} · writes {} · failures {} · joins {} · hit ratio {:.2}\n",
                stats.hits,
                stats.misses,
                stats.writes,
                stats.failures,
                stats.joins,
                stats.hit_ratio()
            )
        }
    }
}

fn with_notes(notes: Vec<String>, body: String) -> String {
    if notes.is_empty() {
        return body;
    }
    let mut out = notes.join("\n");
    out.push_str("\n\n");
    out.push_str(&body);
    out
}
