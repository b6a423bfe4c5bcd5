//! Print a stored sale order the way the marketplace sees it:
//! normalised JSON, what it sells, what it costs, and its order hash.
//!
//! Usage: inspect_order <order.json> [chain_id]

use std::fs;

use anyhow::{bail, Context, Result};
use serde_json::Value;

use seaport_market::chain::{order_hash, seaport_domain};
use seaport_market::config::Config;
use seaport_market::order::{extract_order, to_json_safe};
use seaport_market::price::Wei;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        bail!("usage: inspect_order <order.json> [chain_id]");
    };
    let config = Config::load("config.toml")?;
    let chain_id = match args.next() {
        Some(raw) => raw.parse::<u64>().with_context(|| format!("chain id '{}'", raw))?,
        None => config.chain.id,
    };

    let text = fs::read_to_string(&path).with_context(|| format!("reading {}", path))?;
    let raw: Value = serde_json::from_str(&text).unwrap_or(Value::String(text));
    let order = extract_order(Some(&raw))?;
    let params = &order.parameters;

    println!("{}", serde_json::to_string_pretty(&to_json_safe(&order)?)?);
    println!();
    println!("offerer:      {}", params.offerer);
    match params.offered_token() {
        Some((token, id)) => println!("sells:        {} #{}", token, id),
        None => println!("sells:        (no ERC-721 in offer)"),
    }
    println!(
        "price:        {} {}",
        Wei(params.native_payment_total()?),
        config.chain.currency_symbol
    );
    println!("window:       {} .. {}", params.start_time, params.end_time);
    println!("conduit key:  {}", params.conduit_key);
    println!("order hash:   {}", order_hash(params));
    println!(
        "domain:       {} (chain {}, {})",
        seaport_domain(chain_id, config.contracts.marketplace).separator(),
        chain_id,
        config.contracts.marketplace
    );
    Ok(())
}
