/// Example taking crypto buys and sells to determine average cost, realized gains and
/// break-even price per symbol.
///
/// cargo run --example cryptogains -- [trades.csv] [config.toml]
use anyhow::Context;
use avgbasis::engine::Engine;
use avgbasis::transaction::Transaction;
use avgbasis::EngineConfig;
use std::fs::File;
use std::io::{self, BufRead};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let trades_path = args.next().unwrap_or_else(|| "./demos/CRYPTO_TRANS.csv".to_string());
    let config = match args.next() {
        Some(path) => EngineConfig::load(&path).with_context(|| format!("loading {}", path))?,
        None => EngineConfig::default(),
    };

    let f = File::open(&trades_path).with_context(|| format!("opening {}", trades_path))?;

    // csv in format: timestamp,asset,type,quantity,price,fee
    let transactions = get_transactions(f)?;
    println!("TRANSACTIONS LOADED: {}", transactions.len());

    let engine = Engine::new(config)?;
    let metrics = engine.compute_metrics(&transactions);

    println!("-------------------------------------------------------------");
    for (symbol, result) in metrics.iter() {
        match result {
            Ok(report) => println!("{}", report),
            Err(e) => println!("SYMBOL: {} __ SKIPPED: {}", symbol, e),
        }
    }
    println!("-------------------------------------------------------------");

    let reports: Vec<_> = metrics.values().filter_map(|r| r.as_ref().ok()).collect();
    println!("{}", serde_json::to_string_pretty(&reports)?);

    Ok(())
}

fn get_transactions(f: File) -> anyhow::Result<Vec<Transaction>> {
    let mut transactions = Vec::new();
    for (n, line) in io::BufReader::new(f).lines().enumerate().skip(1) {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let trans = line
            .parse::<Transaction>()
            .with_context(|| format!("line {}", n + 1))?;
        transactions.push(trans);
    }
    // records of a symbol must reach the engine in time order
    transactions.sort_by_key(|t| t.timestamp);
    Ok(transactions)
}
