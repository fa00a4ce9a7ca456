use anyhow::Result;
use serde::Serialize;

/// Human-readable lines by default, one JSON document with `--json`.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn emit<T: Serialize>(&self, value: &T, human: impl FnOnce(&T)) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            human(value);
        }
        Ok(())
    }

    pub fn note(&self, message: &str) {
        if !self.json && !message.is_empty() {
            println!("{message}");
        }
    }
}
