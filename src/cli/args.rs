//! CLI argument definitions and parsing structures
//!
//! This module defines the command-line interface structure using clap,
//! including the main `Cli` struct and the subcommand enum.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// archpro - system-design workspace with cached generation
#[derive(Parser, Debug)]
#[command(name = "archpro")]
#[command(about = "Generate, cache and publish system-design write-ups")]
#[command(long_about = r#"
archpro generates phase-by-phase system-design write-ups for a catalog of
topics. Every artifact is generated at most once per process; without a usable
API key, bundled static content is served instead (demo mode).

EXAMPLES:
  # List the catalog
  archpro topics

  # Generate requirements and the high level design, show the latter
  archpro render uber --phase requirements --phase hld

  # Same content composed as a single article
  archpro render uber --phase requirements --phase hld --blog

  # Generate an explainer video (requires a key with video access)
  archpro video uber

  # Interactive workspace
  archpro session

CONFIGURATION:
  Precedence: CLI flags > environment > config file > defaults
  The config file is discovered by searching upward from CWD for .archpro/config.toml
  The API key is read from the variable named by --api-key-env (default API_KEY)

PHASES:
  requirements, hld, data-model, lld, machine-coding, deep-dives, follow-ups
"#)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Generation provider: gemini or static
    #[arg(long = "provider", global = true)]
    pub llm_provider: Option<String>,

    /// Environment variable holding the API key
    #[arg(long, global = true)]
    pub api_key_env: Option<String>,

    /// Seconds between video job status polls
    #[arg(long, global = true)]
    pub poll_interval: Option<u64>,

    /// Maximum number of video job status polls
    #[arg(long, global = true)]
    pub max_polls: Option<u32>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the topic catalog
    Topics {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Ensure content for a topic and render it
    Render {
        /// Topic id (see `archpro topics`)
        topic: String,

        /// Phase to ensure; repeatable, ensured in the given order
        #[arg(long = "phase", default_value = "requirements")]
        phases: Vec<String>,

        /// Render every cached phase as one article
        #[arg(long)]
        blog: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate the explainer video for a topic
    Video {
        /// Topic id (see `archpro topics`)
        topic: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Interactive session on stdin
    Session,

    /// Run environment health checks
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration and where each value came from
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    /// Operation name for error context.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Topics { .. } => "topics",
            Self::Render { .. } => "render",
            Self::Video { .. } => "video",
            Self::Session => "session",
            Self::Doctor { .. } => "doctor",
            Self::Config { .. } => "config",
        }
    }
}
