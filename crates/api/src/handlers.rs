//! Request handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use cpmm_domain::{FeeRate, PairId, PoolId, TokenId, UserId};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{
    CreatePairRequest, DepositRequest, DepositResponse, HealthResponse, HistoryParams,
    PageResponse, PairResponse, PoolResponse, PositionResponse, PricePointBody, QuoteRequest,
    QuoteResponse, SwapRecordBody, SwapRequest, SwapResponse, WithdrawRequest, WithdrawResponse,
};
use crate::models::{parse_amount, parse_shares};
use crate::state::AppState;

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// `POST /pairs`
pub async fn create_pair(
    State(state): State<AppState>,
    Json(req): Json<CreatePairRequest>,
) -> Result<(StatusCode, Json<PairResponse>), ApiError> {
    let fee = req.fee_bps.map(FeeRate::from_bps).transpose()?;
    let pair = state
        .engine
        .create_pair(TokenId(req.token_a), TokenId(req.token_b), fee)
        .await?;
    Ok((StatusCode::CREATED, Json(pair.into())))
}

/// `GET /pairs/{token_a}/{token_b}`
pub async fn get_pair(
    State(state): State<AppState>,
    Path((token_a, token_b)): Path<(i64, i64)>,
) -> Result<Json<PairResponse>, ApiError> {
    let pair = state
        .engine
        .get_pair(TokenId(token_a), TokenId(token_b))
        .await?;
    Ok(Json(pair.into()))
}

/// `GET /pools`
pub async fn list_pools(
    State(state): State<AppState>,
) -> Result<Json<Vec<PoolResponse>>, ApiError> {
    let pools = state.engine.list_pools().await?;
    let mut out = Vec::with_capacity(pools.len());
    for pool in pools {
        let overview = state.engine.pool_overview(pool.pair_id).await?;
        out.push(overview.into());
    }
    Ok(Json(out))
}

/// `GET /pools/{pair_id}`
pub async fn get_pool(
    State(state): State<AppState>,
    Path(pair_id): Path<Uuid>,
) -> Result<Json<PoolResponse>, ApiError> {
    let overview = state.engine.pool_overview(PairId(pair_id)).await?;
    Ok(Json(overview.into()))
}

/// `POST /pools/{pair_id}/deposits`
pub async fn deposit(
    State(state): State<AppState>,
    Path(pair_id): Path<Uuid>,
    Json(req): Json<DepositRequest>,
) -> Result<(StatusCode, Json<DepositResponse>), ApiError> {
    let amount_low = parse_amount("amount_low", &req.amount_low)?;
    let max_high = parse_amount("max_amount_high", &req.max_amount_high)?;
    let outcome = state
        .engine
        .add_liquidity(UserId(req.user_id), PairId(pair_id), amount_low, max_high)
        .await?;
    Ok((StatusCode::CREATED, Json(outcome.into())))
}

/// `POST /pools/{pair_id}/withdrawals`
pub async fn withdraw(
    State(state): State<AppState>,
    Path(pair_id): Path<Uuid>,
    Json(req): Json<WithdrawRequest>,
) -> Result<(StatusCode, Json<WithdrawResponse>), ApiError> {
    let shares = parse_shares("shares", &req.shares)?;
    let outcome = state
        .engine
        .remove_liquidity(UserId(req.user_id), PairId(pair_id), shares)
        .await?;
    Ok((StatusCode::CREATED, Json(outcome.into())))
}

/// `POST /pools/{pair_id}/quote`
pub async fn quote(
    State(state): State<AppState>,
    Path(pair_id): Path<Uuid>,
    Json(req): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>, ApiError> {
    let amount_in = parse_amount("amount_in", &req.amount_in)?;
    let quote = state
        .engine
        .quote(PairId(pair_id), TokenId(req.token_in), amount_in)
        .await?;
    Ok(Json(quote.into()))
}

/// `POST /pools/{pair_id}/swaps`
pub async fn swap(
    State(state): State<AppState>,
    Path(pair_id): Path<Uuid>,
    Json(req): Json<SwapRequest>,
) -> Result<(StatusCode, Json<SwapResponse>), ApiError> {
    let amount_in = parse_amount("amount_in", &req.amount_in)?;
    let min_out = parse_amount("min_amount_out", &req.min_amount_out)?;
    let receipt = state
        .engine
        .execute_swap(
            UserId(req.user_id),
            PairId(pair_id),
            TokenId(req.token_in),
            amount_in,
            min_out,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(receipt.into())))
}

/// `GET /pools/{pair_id}/history`
pub async fn price_history(
    State(state): State<AppState>,
    Path(pair_id): Path<Uuid>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<PageResponse<PricePointBody>>, ApiError> {
    let query = params.into_query()?;
    let page = state.engine.price_history(PairId(pair_id), query).await?;
    Ok(Json(page.into()))
}

/// `GET /pools/{pair_id}/swaps`
pub async fn swap_history(
    State(state): State<AppState>,
    Path(pair_id): Path<Uuid>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<PageResponse<SwapRecordBody>>, ApiError> {
    let query = params.into_query()?;
    let page = state.engine.swap_history(PairId(pair_id), query).await?;
    Ok(Json(page.into()))
}

/// `GET /positions/{user_id}/{pool_id}`
pub async fn get_position(
    State(state): State<AppState>,
    Path((user_id, pool_id)): Path<(i64, Uuid)>,
) -> Result<Json<PositionResponse>, ApiError> {
    let view = state
        .engine
        .position(UserId(user_id), PoolId(pool_id))
        .await?;
    Ok(Json(PositionResponse::new(view.position, view.valuation)))
}
