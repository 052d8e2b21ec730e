use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};
use wa_sdk::Element;

use crate::Globals;

pub async fn run(
    ctx: &Globals,
    element: String,
    input: Vec<String>,
    inputs: Option<String>,
    state_token: Option<String>,
) -> Result<()> {
    let client = ctx.client()?;
    let element = Element::parse(&element)?;
    let inputs = collect_inputs(&input, inputs.as_deref())?;

    let response = client
        .run(&element, inputs.as_ref(), state_token.as_deref())
        .await?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

/// Merge `--inputs` JSON with repeated `--input key=value` pairs.
///
/// Pairs win over keys from the JSON. A non-object `--inputs` is passed
/// through untouched when there are no pairs, so the client reports it.
pub(crate) fn collect_inputs(pairs: &[String], json: Option<&str>) -> Result<Option<Value>> {
    let base = match json {
        Some(raw) => Some(
            serde_json::from_str::<Value>(raw).context("--inputs is not valid JSON")?,
        ),
        None => None,
    };

    if pairs.is_empty() {
        return Ok(base);
    }

    let mut map = match base {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map,
        Some(_) => bail!("--inputs must be a JSON object when combined with --input"),
    };
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .with_context(|| format!("input `{pair}` is not in the form key=value"))?;
        if key.is_empty() {
            bail!("input `{pair}` has an empty key");
        }
        map.insert(key.to_string(), Value::String(value.to_string()));
    }
    Ok(Some(Value::Object(map)))
}
