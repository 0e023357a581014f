//! Config command: print settings or their location.

use anyhow::{Result, bail};

use super::Context;
use crate::ConfigArgs;

pub fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.action.as_str() {
        "show" => {
            println!("{}", ctx.settings.to_ron()?);
        }
        "path" => match &ctx.settings_path {
            Some(p) => println!("{}", p.display()),
            None => bail!("No config directory on this platform"),
        },
        other => bail!("Unknown config action: {other} (use show or path)"),
    }
    Ok(())
}
