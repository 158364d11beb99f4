use anyhow::Result;
use askama::Template;
use serde::{Deserialize, Serialize};

/// The shape hints are requested in, matching the problem entries of the
/// practice app that consumes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub id: u32,
    pub statement: String,
    pub topic: String,
    pub hints: Vec<String>,
    pub difficulty: u32,
}

#[derive(Debug, Template)]
#[template(path = "hint_prompt.txt.j2", escape = "none")]
pub struct HintPrompt<'a> {
    pub problem: &'a Problem,
}

impl Problem {
    /// A placeholder instance showing the model what to fill in.
    pub fn shape(id: u32, statement: impl Into<String>) -> Self {
        Self {
            id,
            statement: statement.into(),
            topic: "<one-word topic>".to_string(),
            hints: vec!["hint1".into(), "hint2".into(), "hint3".into()],
            difficulty: 5,
        }
    }

    pub fn prompt(&self) -> Result<String> {
        Ok(HintPrompt { problem: self }.render()?)
    }
}
