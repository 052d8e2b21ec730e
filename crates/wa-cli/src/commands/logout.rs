use anyhow::Result;

use crate::Globals;

pub fn run(ctx: &Globals) -> Result<()> {
    let mut config = ctx.load_config()?;
    if config.api.key.take().is_none() {
        println!("No API key saved.");
        return Ok(());
    }
    config.save(&ctx.config_path)?;
    println!("Removed API key from {}", ctx.config_path.display());
    Ok(())
}
