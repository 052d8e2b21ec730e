use anyhow::Result;
use wa_sdk::ApiKey;

use crate::Globals;

pub fn run(ctx: &Globals) -> Result<()> {
    let config = ctx.load_config()?;
    let host = ctx.effective_host(&config)?;

    match ctx.api_key.as_ref().or(config.api.key.as_ref()) {
        Some(raw) => match ApiKey::parse(raw) {
            Ok(key) => println!("Using API key {} on {}", key.redacted(), host),
            Err(_) => println!("Configured API key is malformed (host {})", host),
        },
        None => println!("No API key configured. Run `wrap login <key>` to save one."),
    }
    Ok(())
}
