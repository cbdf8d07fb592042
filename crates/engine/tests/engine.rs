//! End-to-end engine scenarios against the in-memory store.

use chrono::{Duration, Utc};
use cpmm_domain::math::liquidity::MINIMUM_LIQUIDITY;
use cpmm_domain::{Amount, AmmError, FeeRate, Shares, TokenId, UserId};
use cpmm_engine::{AmmEngine, EngineConfig, InMemoryStore, RangeQuery, Store, SwapEffect};
use rust_decimal_macros::dec;
use std::sync::Arc;

const TOKEN_LOW: TokenId = TokenId(1);
const TOKEN_HIGH: TokenId = TokenId(2);
const ALICE: UserId = UserId(10);
const BOB: UserId = UserId(20);

fn engine() -> AmmEngine {
    AmmEngine::new(Arc::new(InMemoryStore::new()), EngineConfig::default())
}

async fn funded_pool(engine: &AmmEngine, low: u128, high: u128) -> cpmm_domain::PairId {
    let pair = engine
        .create_pair(TOKEN_LOW, TOKEN_HIGH, None)
        .await
        .expect("pair");
    engine
        .add_liquidity(ALICE, pair.id, Amount::new(low), Amount::new(high))
        .await
        .expect("first deposit");
    pair.id
}

#[tokio::test]
async fn pair_creation_is_order_independent_and_unique() {
    let engine = engine();
    let pair = engine
        .create_pair(TOKEN_HIGH, TOKEN_LOW, None)
        .await
        .unwrap();
    assert_eq!(pair.key.token_low(), TOKEN_LOW);
    assert_eq!(pair.key.token_high(), TOKEN_HIGH);

    let dup = engine.create_pair(TOKEN_LOW, TOKEN_HIGH, None).await;
    assert_eq!(dup.unwrap_err(), AmmError::DuplicatePair);

    let found = engine.get_pair(TOKEN_HIGH, TOKEN_LOW).await.unwrap();
    assert_eq!(found.id, pair.id);

    let missing = engine.get_pair(TokenId(8), TokenId(9)).await;
    assert_eq!(missing.unwrap_err(), AmmError::NotFound("pair"));

    let same = engine.create_pair(TOKEN_LOW, TOKEN_LOW, None).await;
    assert!(matches!(same.unwrap_err(), AmmError::Validation(_)));
}

#[tokio::test]
async fn scenario_a_first_deposit_sets_price_and_mints_sqrt_shares() {
    let engine = engine();
    let pair = engine
        .create_pair(TOKEN_LOW, TOKEN_HIGH, None)
        .await
        .unwrap();
    let outcome = engine
        .add_liquidity(
            ALICE,
            pair.id,
            Amount::new(100_000_000),
            Amount::new(400_000_000),
        )
        .await
        .unwrap();

    // isqrt(100e6 * 400e6) = 200e6, minus the permanently locked floor.
    assert_eq!(outcome.pool.total_shares, Shares::new(200_000_000));
    assert_eq!(
        outcome.minted,
        Shares::new(200_000_000 - MINIMUM_LIQUIDITY)
    );
    assert_eq!(outcome.pool.spot_price_low().unwrap(), dec!(4));
    assert_eq!(outcome.pool.spot_price_high().unwrap(), dec!(0.25));
}

#[tokio::test]
async fn first_deposit_below_lock_is_rejected() {
    let engine = engine();
    let pair = engine
        .create_pair(TOKEN_LOW, TOKEN_HIGH, None)
        .await
        .unwrap();
    let result = engine
        .add_liquidity(ALICE, pair.id, Amount::new(100), Amount::new(400))
        .await;
    assert!(matches!(result.unwrap_err(), AmmError::Validation(_)));

    // Nothing was applied: the pool is still empty.
    let overview = engine.pool_overview(pair.id).await.unwrap();
    assert!(overview.pool.is_empty());
}

#[tokio::test]
async fn proportional_deposit_respects_ratio_and_slippage_bound() {
    let engine = engine();
    let pair_id = funded_pool(&engine, 1_000_000, 4_000_000).await;

    // Ratio is 4:1, so 100_000 low requires 400_000 high.
    let outcome = engine
        .add_liquidity(BOB, pair_id, Amount::new(100_000), Amount::new(450_000))
        .await
        .unwrap();
    assert_eq!(outcome.amount_high, Amount::new(400_000));
    // 10% of the low reserve mints 10% of the shares.
    assert_eq!(outcome.minted, Shares::new(200_000));

    // A cap below the required amount is a retryable slippage failure.
    let capped = engine
        .add_liquidity(BOB, pair_id, Amount::new(100_000), Amount::new(399_999))
        .await;
    let err = capped.unwrap_err();
    assert_eq!(
        err,
        AmmError::SlippageExceeded {
            bound: 399_999,
            actual: 400_000,
        }
    );
    assert!(err.is_retryable());
}

#[tokio::test]
async fn scenario_b_swap_pricing_and_invariant() {
    let engine = engine();
    let pair_id = funded_pool(&engine, 1_000_000, 1_000_000).await;

    let quote = engine
        .quote(pair_id, TOKEN_LOW, Amount::new(100_000))
        .await
        .unwrap();
    // effective_in = 99_700; out = 1e6 * 99_700 / 1_099_700 = 90_661.
    assert_eq!(quote.amount_out, Amount::new(90_661));
    assert_eq!(quote.fee, Amount::new(300));
    assert_eq!(quote.spot_price_before, dec!(1));
    assert!(quote.price_impact > dec!(0.09));
    assert!(quote.price_impact < dec!(0.10));

    let receipt = engine
        .execute_swap(BOB, pair_id, TOKEN_LOW, Amount::new(100_000), Amount::ZERO)
        .await
        .unwrap();
    assert_eq!(receipt.record.amount_out, Amount::new(90_661));
    assert_eq!(receipt.reserve_low_after, Amount::new(1_100_000));
    assert_eq!(receipt.reserve_high_after, Amount::new(909_339));

    // k grew: 1_100_000 * 909_339 > 1_000_000 * 1_000_000.
    let overview = engine.pool_overview(pair_id).await.unwrap();
    let k_after = overview.pool.k();
    assert!(k_after >= cpmm_domain::math::constant_product::k(
        Amount::new(1_000_000),
        Amount::new(1_000_000)
    ));
}

#[tokio::test]
async fn quote_is_idempotent_and_never_mutates() {
    let engine = engine();
    let pair_id = funded_pool(&engine, 1_000_000, 1_000_000).await;

    let before = engine.pool_overview(pair_id).await.unwrap();
    let q1 = engine
        .quote(pair_id, TOKEN_LOW, Amount::new(50_000))
        .await
        .unwrap();
    let q2 = engine
        .quote(pair_id, TOKEN_LOW, Amount::new(50_000))
        .await
        .unwrap();
    let after = engine.pool_overview(pair_id).await.unwrap();
    assert_eq!(q1, q2);
    assert_eq!(before.pool, after.pool);
}

#[tokio::test]
async fn execute_revalidates_against_live_state() {
    let engine = engine();
    let pair_id = funded_pool(&engine, 1_000_000, 1_000_000).await;

    let quote = engine
        .quote(pair_id, TOKEN_LOW, Amount::new(100_000))
        .await
        .unwrap();

    // Someone else trades first; the quoted output is now stale.
    engine
        .execute_swap(ALICE, pair_id, TOKEN_LOW, Amount::new(500_000), Amount::ZERO)
        .await
        .unwrap();

    let result = engine
        .execute_swap(BOB, pair_id, TOKEN_LOW, Amount::new(100_000), quote.amount_out)
        .await;
    let err = result.unwrap_err();
    assert!(matches!(err, AmmError::SlippageExceeded { .. }));
    assert!(err.is_retryable());

    // The failed execution left no trace in the log.
    let history = engine
        .swap_history(pair_id, RangeQuery::default())
        .await
        .unwrap();
    assert_eq!(history.items.len(), 1);
}

#[tokio::test]
async fn swap_validation_errors() {
    let engine = engine();
    let pair_id = funded_pool(&engine, 1_000_000, 1_000_000).await;

    let zero = engine
        .execute_swap(BOB, pair_id, TOKEN_LOW, Amount::ZERO, Amount::ZERO)
        .await;
    assert!(matches!(zero.unwrap_err(), AmmError::Validation(_)));

    let foreign = engine
        .quote(pair_id, TokenId(99), Amount::new(1_000))
        .await;
    assert!(matches!(foreign.unwrap_err(), AmmError::Validation(_)));

    // Dust input that buys nothing is rejected at execution.
    let dust = engine
        .execute_swap(BOB, pair_id, TOKEN_LOW, Amount::new(1), Amount::ZERO)
        .await;
    assert_eq!(dust.unwrap_err(), AmmError::InsufficientLiquidity);
}

#[tokio::test]
async fn empty_pool_cannot_quote_or_swap() {
    let engine = engine();
    let pair = engine
        .create_pair(TOKEN_LOW, TOKEN_HIGH, None)
        .await
        .unwrap();
    let quote = engine.quote(pair.id, TOKEN_LOW, Amount::new(1_000)).await;
    assert_eq!(quote.unwrap_err(), AmmError::InsufficientLiquidity);
    let swap = engine
        .execute_swap(BOB, pair.id, TOKEN_LOW, Amount::new(1_000), Amount::ZERO)
        .await;
    assert_eq!(swap.unwrap_err(), AmmError::InsufficientLiquidity);
}

#[tokio::test]
async fn scenario_c_round_trip_returns_deposit_minus_locked_floor() {
    let engine = engine();
    let pair = engine
        .create_pair(TOKEN_LOW, TOKEN_HIGH, None)
        .await
        .unwrap();
    let deposit = engine
        .add_liquidity(
            ALICE,
            pair.id,
            Amount::new(1_000_000),
            Amount::new(4_000_000),
        )
        .await
        .unwrap();
    assert_eq!(deposit.minted, Shares::new(2_000_000 - MINIMUM_LIQUIDITY));

    let withdrawal = engine
        .remove_liquidity(ALICE, pair.id, deposit.minted)
        .await
        .unwrap();

    // The only loss is the permanently locked floor's slice.
    assert_eq!(withdrawal.amount_low, Amount::new(999_500));
    assert_eq!(withdrawal.amount_high, Amount::new(3_998_000));
    assert_eq!(withdrawal.remaining_shares, Shares::ZERO);

    // The pool keeps the locked floor and its price memory; it can never
    // be fully drained.
    let overview = engine.pool_overview(pair.id).await.unwrap();
    assert_eq!(overview.pool.total_shares, Shares::new(MINIMUM_LIQUIDITY));
    assert_eq!(overview.pool.reserve_low, Amount::new(500));
    assert_eq!(overview.pool.reserve_high, Amount::new(2_000));
    assert!(!overview.pool.is_empty());
    assert_eq!(overview.pool.spot_price_low().unwrap(), dec!(4));

    // The position is gone.
    let view = engine.position(ALICE, overview.pool.id).await;
    assert_eq!(view.unwrap_err(), AmmError::NotFound("position"));
}

#[tokio::test]
async fn withdrawal_beyond_position_is_rejected() {
    let engine = engine();
    let pair_id = funded_pool(&engine, 1_000_000, 1_000_000).await;

    let err = engine
        .remove_liquidity(ALICE, pair_id, Shares::new(u128::MAX))
        .await
        .unwrap_err();
    assert!(matches!(err, AmmError::InsufficientShares { .. }));
    assert!(!err.is_retryable());

    // A user with no position at all gets the same class of error.
    let err = engine
        .remove_liquidity(BOB, pair_id, Shares::new(1))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        AmmError::InsufficientShares {
            requested: 1,
            owned: 0
        }
    );
}

#[tokio::test]
async fn scenario_d_opposite_swaps_lose_to_fees() {
    let engine = engine();
    let pair_id = funded_pool(&engine, 10_000_000, 10_000_000).await;

    let first = engine
        .execute_swap(BOB, pair_id, TOKEN_LOW, Amount::new(1_000_000), Amount::ZERO)
        .await
        .unwrap();
    let second = engine
        .execute_swap(
            BOB,
            pair_id,
            TOKEN_HIGH,
            first.record.amount_out,
            Amount::ZERO,
        )
        .await
        .unwrap();

    // Strictly worse off than break-even after the round trip.
    assert!(second.record.amount_out < Amount::new(1_000_000));
}

#[tokio::test]
async fn position_valuation_is_live_not_deposit_time() {
    let engine = engine();
    let pair_id = funded_pool(&engine, 1_000_000, 1_000_000).await;
    let pool_id = engine.pool_overview(pair_id).await.unwrap().pool.id;

    let before = engine.position(ALICE, pool_id).await.unwrap();

    // Trading moves reserves; the same shares now value differently.
    engine
        .execute_swap(BOB, pair_id, TOKEN_LOW, Amount::new(200_000), Amount::ZERO)
        .await
        .unwrap();

    let after = engine.position(ALICE, pool_id).await.unwrap();
    assert_eq!(before.position.shares, after.position.shares);
    assert!(after.valuation.value_low > before.valuation.value_low);
    assert!(after.valuation.value_high < before.valuation.value_high);
    // Deposit-time amounts are untouched.
    assert_eq!(
        before.position.deposited_low,
        after.position.deposited_low
    );
}

#[tokio::test]
async fn history_pages_are_ordered_and_restartable() {
    let engine = engine();
    let pair_id = funded_pool(&engine, 10_000_000, 10_000_000).await;

    for _ in 0..5 {
        engine
            .execute_swap(BOB, pair_id, TOKEN_LOW, Amount::new(10_000), Amount::ZERO)
            .await
            .unwrap();
    }

    let first = engine
        .price_history(
            pair_id,
            RangeQuery {
                limit: Some(2),
                ..RangeQuery::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(first.items.len(), 2);
    let cursor = first.next.expect("more pages");

    // Resuming from the cursor continues exactly where the scan stopped.
    let second = engine
        .price_history(
            pair_id,
            RangeQuery {
                after: Some(cursor),
                limit: Some(10),
                ..RangeQuery::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(second.items.len(), 3);
    assert!(second.next.is_none());
    assert!(second.items[0].recorded_at >= first.items[1].recorded_at);

    let all = engine
        .price_history(pair_id, RangeQuery::default())
        .await
        .unwrap();
    assert_eq!(all.items.len(), 5);
    assert!(
        all.items
            .windows(2)
            .all(|w| w[0].recorded_at <= w[1].recorded_at)
    );

    let swaps = engine
        .swap_history(pair_id, RangeQuery::default())
        .await
        .unwrap();
    assert_eq!(swaps.items.len(), 5);
}

#[tokio::test]
async fn volume_ages_out_of_the_window() {
    let engine = engine();
    let pair_id = funded_pool(&engine, 10_000_000, 10_000_000).await;

    engine
        .execute_swap(BOB, pair_id, TOKEN_LOW, Amount::new(50_000), Amount::ZERO)
        .await
        .unwrap();

    let overview = engine.pool_overview(pair_id).await.unwrap();
    assert_eq!(overview.volume_24h, Amount::new(50_000));

    // Seed a swap that happened two days ago straight through the store;
    // it must not count toward the rolling window.
    let mut effect = SwapEffect {
        pool: overview.pool.clone(),
        record: engine
            .swap_history(pair_id, RangeQuery::default())
            .await
            .unwrap()
            .items[0]
            .clone(),
        price_point: cpmm_domain::PricePoint::sample(pair_id, dec!(1), dec!(1)),
    };
    effect.record.id = uuid::Uuid::new_v4();
    effect.record.amount_in = Amount::new(999_999);
    effect.record.executed_at = Utc::now() - Duration::days(2);
    engine.store().apply_swap(&effect).await.unwrap();

    let overview = engine.pool_overview(pair_id).await.unwrap();
    assert_eq!(overview.volume_24h, Amount::new(50_000));
}

#[tokio::test]
async fn opposite_direction_swap_counts_low_token_output() {
    let engine = engine();
    let pair_id = funded_pool(&engine, 10_000_000, 10_000_000).await;

    let receipt = engine
        .execute_swap(BOB, pair_id, TOKEN_HIGH, Amount::new(40_000), Amount::ZERO)
        .await
        .unwrap();

    // High-token input: the low-token side of the trade is the output.
    let overview = engine.pool_overview(pair_id).await.unwrap();
    assert_eq!(overview.volume_24h, receipt.record.amount_out);
}

#[tokio::test]
async fn custom_fee_pool() {
    let engine = engine();
    let pair = engine
        .create_pair(TOKEN_LOW, TOKEN_HIGH, Some(FeeRate::ZERO))
        .await
        .unwrap();
    engine
        .add_liquidity(
            ALICE,
            pair.id,
            Amount::new(1_000_000),
            Amount::new(1_000_000),
        )
        .await
        .unwrap();

    let quote = engine
        .quote(pair.id, TOKEN_LOW, Amount::new(100_000))
        .await
        .unwrap();
    // No fee: out = 1e6 * 100_000 / 1_100_000 = 90_909.
    assert_eq!(quote.amount_out, Amount::new(90_909));
    assert_eq!(quote.fee, Amount::ZERO);
}
