use anyhow::{Context, Result};
use std::env;
use std::path::Path;
use tracing_subscriber::EnvFilter;

use claims_builder::{
    parse_balance_map, write_campaign_claims, Campaign, ClaimsMap, CLAIMS_FILE, MERKLE_FILE, VERSION,
};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("claims_builder=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() > 1 && args[1] == "merkle" {
        run_merkle()?;
    } else {
        run_claims()?;
    }

    Ok(())
}

fn run_claims() -> Result<()> {
    let campaign = Campaign::active();
    let work_dir = env::current_dir().context("Failed to resolve working directory")?;

    println!("🎟️  claims-builder v{} - campaign '{}'", VERSION, campaign.name);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // Load, filter, union, then write (nothing written if any source fails)
    println!("\n📂 Loading {} source(s)...", campaign.sources.len());
    let (claims, digest) = write_campaign_claims(&campaign, &work_dir, &work_dir.join(CLAIMS_FILE))
        .with_context(|| format!("Failed to build {} for campaign '{}'", CLAIMS_FILE, campaign.name))?;
    println!("✓ {} eligible addresses", claims.len());
    println!("\n💾 Wrote {} (sha256 {})", CLAIMS_FILE, digest);

    Ok(())
}

fn run_merkle() -> Result<()> {
    println!("🌳 Building distribution from {}", CLAIMS_FILE);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let claims = ClaimsMap::from_file(Path::new(CLAIMS_FILE))
        .with_context(|| format!("Failed to read {} (run without arguments first)", CLAIMS_FILE))?;

    let info = parse_balance_map(claims.balances()).context("Failed to build balance tree")?;
    info.write(Path::new(MERKLE_FILE))
        .with_context(|| format!("Failed to write {}", MERKLE_FILE))?;

    println!("✓ {} claims, token total {}", info.claims.len(), info.token_total);
    println!("✓ Merkle root {}", info.merkle_root);
    println!("\n💾 Wrote {}", MERKLE_FILE);

    Ok(())
}
