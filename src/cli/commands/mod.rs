//! CLI command implementations (facade).
//!
//! Each command has an `execute_*` handler that prints, and where the
//! output is worth testing, a pure `*_output` function that builds it.

mod common;
mod config;
mod doctor;
mod render;
mod session;
mod topics;
mod video;

pub use common::{parse_phase, parse_phases, report_notes};
pub use config::{ConfigOutput, ConfigValue, config_output, execute_config_command};
pub use doctor::execute_doctor_command;
pub use render::{PhaseReport, RenderOutput, execute_render_command, render_output};
pub use session::{ReplCommand, execute_session_command, run_repl};
pub use topics::{TopicEntry, execute_topics_command, topics_output};
pub use video::{VideoOutput, execute_video_command, video_output, video_text};
