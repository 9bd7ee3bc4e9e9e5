//! Cache and orchestration layer for archpro
//!
//! [`Studio`] owns the content caches and decides, per request, whether to
//! serve from cache or call the generation capability. Presentation views
//! read from it through [`ContentReader`]; [`Session`] layers the
//! interactive state (selected topic, phase, view mode) on top.

pub mod cache;
pub mod hook;
mod inflight;
pub mod presentation;
pub mod session;
pub mod studio;

pub use cache::{CacheKey, CacheStats, ContentCache};
pub use hook::{CredentialHook, TerminalCredentialHook};
pub use presentation::{BlogView, ContentReader, Tab, TopicHeader, WelcomeView, WorkspaceView};
pub use session::{Session, VideoOutcome, View};
pub use studio::{EnsureReport, StepOutcome, Studio};
