use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    if !probekit::cmd::start().await? {
        std::process::exit(1);
    }
    Ok(())
}
