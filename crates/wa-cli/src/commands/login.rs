use anyhow::Result;
use wa_sdk::ApiKey;

use crate::Globals;

pub fn run(ctx: &Globals, key: String) -> Result<()> {
    let key = ApiKey::parse(&key)?;

    let mut config = ctx.load_config()?;
    config.api.key = Some(key.as_str().to_string());
    if let Some(host) = &ctx.host {
        config.api.host = Some(host.clone());
    }
    config.save(&ctx.config_path)?;

    println!("Saved API key {} to {}", key.redacted(), ctx.config_path.display());
    Ok(())
}
