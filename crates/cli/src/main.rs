//! Command line interface for the CPMM engine.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cpmm_api::{ApiServer, AppState, ServerConfig};
use cpmm_data::{Database, PgStore};
use cpmm_domain::{Amount, TokenId, UserId};
use cpmm_engine::{AmmEngine, EngineConfig, InMemoryStore, RangeQuery, Store};
use dotenv::dotenv;
use tracing::info;

#[derive(Parser)]
#[command(name = "cpmm")]
#[command(about = "Constant-product AMM engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1:8080")]
        bind: SocketAddr,

        /// PostgreSQL connection string; omit to run on in-memory storage
        #[arg(long, env = "DATABASE_URL")]
        database_url: Option<String>,
    },
    /// Seed an in-memory pool and walk through a deposit, swaps and a
    /// withdrawal
    Demo,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { bind, database_url } => serve(bind, database_url).await,
        Commands::Demo => demo().await,
    }
}

async fn serve(bind: SocketAddr, database_url: Option<String>) -> Result<()> {
    let store: Arc<dyn Store> = match database_url {
        Some(url) => {
            let db = Database::connect(&url)
                .await
                .context("connecting to database")?;
            db.migrate().await.context("running migrations")?;
            Arc::new(PgStore::new(db))
        }
        None => {
            info!("no DATABASE_URL set, state will not survive restarts");
            Arc::new(InMemoryStore::new())
        }
    };

    let engine = Arc::new(AmmEngine::new(store, EngineConfig::default()));
    let server = ApiServer::new(ServerConfig { bind });
    server
        .run(AppState::new(engine))
        .await
        .context("serving api")
}

async fn demo() -> Result<()> {
    let engine = AmmEngine::new(Arc::new(InMemoryStore::new()), EngineConfig::default());

    let alice = UserId(1);
    let bob = UserId(2);

    let pair = engine.create_pair(TokenId(1), TokenId(2), None).await?;
    println!(
        "🆕 pair {} for tokens ({}, {})",
        pair.id.0,
        pair.key.token_low().0,
        pair.key.token_high().0
    );

    let deposit = engine
        .add_liquidity(
            alice,
            pair.id,
            Amount::new(1_000_000_000),
            Amount::new(4_000_000_000),
        )
        .await?;
    println!(
        "💧 alice deposited {} / {} and received {} shares",
        deposit.amount_low.raw(),
        deposit.amount_high.raw(),
        deposit.minted.raw()
    );

    for amount_in in [50_000_000u128, 25_000_000, 10_000_000] {
        let quote = engine
            .quote(pair.id, TokenId(1), Amount::new(amount_in))
            .await?;
        let receipt = engine
            .execute_swap(
                bob,
                pair.id,
                TokenId(1),
                Amount::new(amount_in),
                quote.amount_out,
            )
            .await?;
        println!(
            "🔄 bob swapped {} -> {} (fee {}, impact {})",
            receipt.record.amount_in.raw(),
            receipt.record.amount_out.raw(),
            receipt.record.fee.raw(),
            receipt.record.price_impact
        );
    }

    let overview = engine.pool_overview(pair.id).await?;
    println!(
        "📊 reserves {} / {}, spot price {}, 24h volume {}",
        overview.pool.reserve_low.raw(),
        overview.pool.reserve_high.raw(),
        overview
            .spot_price_low
            .map_or_else(|| "-".to_string(), |p| p.to_string()),
        overview.volume_24h.raw()
    );

    let view = engine.position(alice, overview.pool.id).await?;
    println!(
        "💼 alice holds {} shares worth {} / {}",
        view.position.shares.raw(),
        view.valuation.value_low.raw(),
        view.valuation.value_high.raw()
    );

    let withdrawal = engine
        .remove_liquidity(alice, pair.id, view.position.shares)
        .await?;
    println!(
        "💸 alice withdrew {} / {} by burning {} shares",
        withdrawal.amount_low.raw(),
        withdrawal.amount_high.raw(),
        withdrawal.burned.raw()
    );

    let swaps = engine.swap_history(pair.id, RangeQuery::default()).await?;
    println!("🧾 swap log holds {} entries", swaps.items.len());

    Ok(())
}
