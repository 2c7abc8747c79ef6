//! Configuration management commands

use super::ConfigArgs;
use crate::config::Config;
use anyhow::Result;

pub async fn execute(args: ConfigArgs) -> Result<()> {
    if args.show {
        let mut shown = Config::load().await?.resolved();
        if shown.gemini.api_key.is_some() {
            shown.gemini.api_key = Some("<REDACTED>".to_string());
        }
        println!("{}", toml::to_string_pretty(&shown)?);
        return Ok(());
    }

    if args.init {
        Config::init_default().await?;
        println!("Configuration initialized");
        return Ok(());
    }

    if let Some(kv) = args.set {
        let Some((key, value)) = kv.split_once('=') else {
            anyhow::bail!("Invalid format. Use: --set key=value");
        };
        Config::set(key, value).await?;
        if key == "gemini.api_key" {
            println!("Set {key}");
        } else {
            println!("Set {key} = {value}");
        }
        return Ok(());
    }

    // Default: show help
    println!("Use --show, --init, or --set key=value");
    Ok(())
}
