//! blockhole - merge domain blocklists and push them to Mastodon instances

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    blockhole_cli::run().await
}
