//! `archpro config`

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::{Config, emit_jcs};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigValue {
    pub value: String,
    pub source: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigOutput {
    pub config_path: Option<String>,
    pub values: BTreeMap<String, ConfigValue>,
}

#[must_use]
pub fn config_output(config: &Config) -> ConfigOutput {
    ConfigOutput {
        config_path: config
            .config_path
            .as_ref()
            .map(|path| path.display().to_string()),
        values: config
            .effective_config()
            .into_iter()
            .map(|(key, (value, source))| (key, ConfigValue { value, source }))
            .collect(),
    }
}

pub fn execute_config_command(config: &Config, json: bool) -> Result<()> {
    let output = config_output(config);

    if json {
        let json_output = emit_jcs(&output).context("Failed to emit config JSON")?;
        println!("{json_output}");
        return Ok(());
    }

    match &output.config_path {
        Some(path) => println!("Config file: {path}\n"),
        None => println!("Config file: none (built-in defaults)\n"),
    }
    for (key, entry) in &output.values {
        println!("  {key} = {} [{}]", entry.value, entry.source);
    }
    Ok(())
}
