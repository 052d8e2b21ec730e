use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use wa_sdk::{Element, Session};

use crate::Globals;

#[derive(Debug, Deserialize)]
pub(crate) struct BatchCall {
    pub element: String,
    #[serde(default)]
    pub inputs: Option<Value>,
}

/// Run every call in `file` through one session, in order. Stops at the
/// first failure.
pub async fn run(ctx: &Globals, file: PathBuf, state_token: Option<String>) -> Result<()> {
    let calls = load_calls(&file)?;
    let client = ctx.client()?;

    let mut session = match state_token {
        Some(token) => Session::with_state_token(&client, token),
        None => client.session(),
    };

    for (i, call) in calls.iter().enumerate() {
        let element = Element::parse(&call.element)
            .with_context(|| format!("call #{} in {}", i + 1, file.display()))?;
        tracing::info!(step = i + 1, element = %element, "running batch call");

        let response = session
            .run(&element, call.inputs.as_ref())
            .await
            .with_context(|| format!("call #{} ({element}) failed", i + 1))?;
        println!("{}", serde_json::to_string_pretty(&response)?);
    }
    Ok(())
}

pub(crate) fn load_calls(file: &Path) -> Result<Vec<BatchCall>> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON list of calls", file.display()))
}
