//! archpro - System-design workspace with cached, fallback-backed generation
//!
//! archpro generates phase-by-phase system-design write-ups for a catalog of
//! topics, caches every artifact for the lifetime of the process, and serves
//! bundled static content whenever live generation is unavailable.
//!
//! # Quick Start (CLI)
//!
//! ```bash
//! # List the catalog
//! archpro topics
//!
//! # Generate and show the High Level Design of a topic
//! archpro render uber --phase requirements --phase hld
//!
//! # Compose every generated phase as one article
//! archpro render uber --phase requirements --phase hld --blog
//!
//! # Interactive workspace
//! archpro session
//!
//! # Environment health checks
//! archpro doctor --json
//! ```
//!
//! # Quick Start (Library)
//!
//! ```rust,no_run
//! use archpro::{App, Config};
//! use archpro_utils::types::Phase;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let app = App::from_config(Config::builder().provider("static").build()?)?;
//! let topic = app.topic("uber")?;
//! let report = app.studio.ensure_content(&topic, Phase::Requirements).await;
//! assert!(report.section.is_available());
//! # Ok(())
//! # }
//! ```
//!
//! # JSON Contracts
//!
//! Every `--json` output is emitted in JCS (RFC 8785) canonical form through
//! [`emit_jcs`].

mod app;
pub mod cli;
pub mod doctor;

pub use app::App;
pub use doctor::{CheckStatus, DoctorCheck, DoctorOutput};

pub use archpro_config::{CliArgs, Config, ConfigBuilder, ProviderKind};
pub use archpro_content::{StaticFallbackStore, Topic, TopicCatalog};
pub use archpro_engine::{
    BlogView, CacheStats, EnsureReport, Session, StepOutcome, Studio, VideoOutcome, View,
    WorkspaceView,
};
pub use archpro_llm::{GenerationCapability, ImageRef, VideoRef};
pub use archpro_utils::canonicalization::emit_jcs;
pub use archpro_utils::error::{ArchProError, ConfigError, GenerationError};
pub use archpro_utils::exit_codes::ExitCode;
pub use archpro_utils::types::{Phase, ViewMode};
