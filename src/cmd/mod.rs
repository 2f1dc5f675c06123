use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

mod probe;
pub use probe::*;
mod notify;
pub use notify::*;

use crate::{
    conf::{self, Conf},
    get_env_or_default,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Dry notification mode
    #[arg(short = 'd', long, default_value_t = get_env_or_default("PROBE_DRY", "false")=="true")]
    dry_notify: bool,

    /// Configuration file
    #[arg(short = 'f', long, default_value_t = get_env_or_default("PROBE_CONFIG", "config.yaml"))]
    yaml_file: String,

    /// Show JSON schema
    #[arg(short = 'j', long, default_value_t = false)]
    json_schema: bool,
}

/// Runs every configured probe once. Returns whether all of them passed.
pub async fn start() -> Result<bool> {
    logforth::stdout().apply();

    let args = Args::parse();
    if args.json_schema {
        println!("{}", conf::json_schema()?);
        return Ok(true);
    }

    let c = Conf::load(&args.yaml_file)?;
    log::debug!("{:?}", c);

    let alerter = config_alerter(c.alert.clone(), args.dry_notify);
    let probes = config_probes(&c, Arc::clone(&alerter));
    log::info!(
        "{} - running {} probes",
        c.settings.name,
        probes.len()
    );

    let failed = run_probes(probes).await;
    Ok(failed == 0)
}
