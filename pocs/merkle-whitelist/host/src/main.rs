//! Merkle whitelist CLI
//!
//! Builds the whitelist tree from a TOML file, hands out proofs, and checks
//! them off-chain. `demo` runs the five-signer scenario end to end against an
//! in-process verifier contract.
//!
//! Run with:
//!   cargo run --bin merkle-whitelist -- --config whitelist.toml root
//!   cargo run --bin merkle-whitelist -- demo

use std::path::{Path, PathBuf};

use alloy_primitives::{address, Address, B256, U256};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use merkle_whitelist_host::adapters::local_chain::LocalChain;
use merkle_whitelist_host::config::WhitelistConfig;
use merkle_whitelist_host::leaf::{parse_address, parse_amount, WhitelistEntry};
use merkle_whitelist_host::merkle::MerkleProof;
use merkle_whitelist_host::ports::chain::WhitelistChain as _;
use merkle_whitelist_host::whitelist::Whitelist;

#[derive(Parser)]
#[command(name = "merkle-whitelist", about = "Merkle whitelist tree and proof tool")]
struct Cli {
    /// Path to the TOML whitelist file.
    #[arg(long, global = true, default_value = "./whitelist.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the tree and print its root
    Root,

    /// Print the claim for one address as JSON
    Prove {
        #[arg(long)]
        address: String,
    },

    /// Write every claim, plus the root, to a JSON file
    Export {
        #[arg(long)]
        out: PathBuf,
    },

    /// Check a proof off-chain
    Verify {
        #[arg(long)]
        address: String,
        /// Amount in wei (decimal or 0x hex)
        #[arg(long)]
        amount: String,
        /// Comma-separated 32-byte hex siblings; empty for a single-leaf tree
        #[arg(long, value_delimiter = ',', default_value = "")]
        proof: Vec<String>,
        /// Root to check against; defaults to the root built from --config
        #[arg(long)]
        root: Option<B256>,
    },

    /// Run the five-signer scenario against an in-process chain
    Demo,
}

/// Hardhat's first five default accounts.
const SIGNERS: [Address; 5] = [
    address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266"),
    address!("70997970C51812dc3A010C7d01b50e0d17dc79C8"),
    address!("3C44CdDdB6a900fa2b585dd299e03d12FA4293BC"),
    address!("90F79bf6EB2c4f870365E785982E1f101E93b906"),
    address!("15d34AAf54267DB7D7c367839AAf71A00a2C6A65"),
];

fn step(n: u8, total: u8, msg: &str) {
    info!("");
    info!("┌─[{n}/{total}] {msg}");
}

fn load(config: &Path) -> Result<(WhitelistConfig, Whitelist)> {
    let cfg = WhitelistConfig::load(config)
        .with_context(|| format!("loading whitelist from {}", config.display()))?;
    let whitelist = cfg.to_whitelist()?;
    Ok((cfg, whitelist))
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    // No timestamps or level prefix so output stays readable in a terminal.
    tracing_subscriber::fmt()
        .without_time()
        .with_target(false)
        .with_level(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Root => {
            let (cfg, whitelist) = load(&cli.config)?;
            let tree = whitelist.build_tree()?;
            cfg.check_root(tree.root())?;
            info!(leaves = tree.leaf_count(), depth = tree.depth(), "tree built");
            println!("{}", tree.root());
        }

        Commands::Prove { address } => {
            let (_, whitelist) = load(&cli.config)?;
            let tree = whitelist.build_tree()?;
            let claim = whitelist.claim_for(&tree, &parse_address(&address)?)?;
            println!("{}", serde_json::to_string_pretty(&claim)?);
        }

        Commands::Export { out } => {
            let (cfg, whitelist) = load(&cli.config)?;
            let tree = whitelist.build_tree()?;
            cfg.check_root(tree.root())?;
            let bundle = whitelist.proof_bundle(&tree)?;
            std::fs::write(&out, serde_json::to_string_pretty(&bundle)?)
                .with_context(|| format!("writing {}", out.display()))?;
            info!(
                claims = bundle.claims.len(),
                root = %bundle.root,
                path = %out.display(),
                "exported proofs"
            );
        }

        Commands::Verify {
            address,
            amount,
            proof,
            root,
        } => {
            let entry = WhitelistEntry::new(parse_address(&address)?, parse_amount(&amount)?);
            let siblings: Vec<&str> = proof
                .iter()
                .map(String::as_str)
                .filter(|s| !s.is_empty())
                .collect();
            let proof = MerkleProof::from_hex(&siblings)?;
            let root = match root {
                Some(root) => root,
                None => load(&cli.config)?.1.build_tree()?.root(),
            };
            println!("{}", proof.verify(entry.leaf_hash(), root));
        }

        Commands::Demo => demo().await?,
    }

    Ok(())
}

async fn demo() -> Result<()> {
    let amount = U256::from(5_000_000_000_000_000_000u64);
    let total = 5;

    // ── Step 1: Build the whitelist ──
    step(1, total, "Building whitelist of five signers at 5 ETH each");
    let whitelist: Whitelist = SIGNERS
        .iter()
        .map(|signer| WhitelistEntry::new(*signer, amount))
        .collect();
    let tree = whitelist.build_tree()?;
    info!("│  Root:   {}", tree.root());
    info!("│  Leaves: {}, depth {}", tree.leaf_count(), tree.depth());

    // ── Step 2: Deploy the verifier ──
    step(2, total, "Deploying WhitelistVerifier");
    let chain = LocalChain::new(SIGNERS[0]);
    let contract = chain.deploy(tree.root()).await?;
    let onchain_root = chain.merkle_root(contract).await?;
    if onchain_root != tree.root() {
        bail!("deployed root {onchain_root} does not match tree root {}", tree.root());
    }
    info!("│  Contract: {contract}");

    // ── Step 3: Whitelisted claimant ──
    step(3, total, "Signer #2 claims with its own proof");
    let claimant = SIGNERS[2];
    let claim = whitelist.claim_for(&tree, &claimant)?;
    info!("│  Leaf:  {}", claim.leaf);
    for sibling in &claim.proof {
        info!("│  Proof: {sibling}");
    }
    let ok = chain
        .verify_in_whitelist(contract, claimant, &claim.proof, claim.amount)
        .await?;
    info!("└─ verifyInWhitelist from {claimant}: {ok}");
    if !ok {
        bail!("whitelisted claimant was rejected");
    }

    // ── Step 4: Replayed proof ──
    step(4, total, "Signer #3 submits signer #2's proof");
    let intruder = SIGNERS[3];
    let ok = chain
        .verify_in_whitelist(contract, intruder, &claim.proof, claim.amount)
        .await?;
    info!("└─ verifyInWhitelist from {intruder}: {ok}");
    if ok {
        bail!("proof was accepted for a different sender");
    }

    // ── Step 5: Inflated amount ──
    step(5, total, "Signer #2 asks for more than its allocation");
    let inflated = claim.amount * U256::from(2u64);
    let ok = chain
        .verify_in_whitelist(contract, claimant, &claim.proof, inflated)
        .await?;
    info!("└─ verifyInWhitelist for {inflated} wei: {ok}");
    if ok {
        bail!("proof was accepted for a different amount");
    }

    info!("");
    info!("Demo complete");
    Ok(())
}
