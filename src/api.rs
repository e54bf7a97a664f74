//! HTTP API
//!
//! Thin JSON layer over [`BiddingEngine`]. The engine is blocking, so every
//! call runs on tokio's blocking pool.
use crate::{
    auction::{Amount, AutoBidRegistration, Bid, ItemId, RecordId, UserId},
    engine::{BidError, BiddingEngine},
};
use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::{future::Future, net::SocketAddr, sync::Arc};
use tracing::{error, info};
use uuid::Uuid;

#[derive(Deserialize, Debug)]
pub struct CreateBidRequest {
    pub bid_item_uuid: ItemId,
    pub bidder_uuid: UserId,
    pub bid_price_in_usd: Amount,
}

#[derive(Deserialize, Debug)]
pub struct RegisterAutoBidRequest {
    pub bid_item_uuid: ItemId,
    pub bidder_uuid: UserId,
    #[serde(default)]
    pub max_bid_amount_in_usd: Option<Amount>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct BidRecord {
    pub bid_id: RecordId,
    pub bid_uuid: Uuid,
    pub bid_price_in_usd: Amount,
    pub bid_item_uuid: ItemId,
    pub bidder_uuid: UserId,
}

impl From<Bid> for BidRecord {
    fn from(bid: Bid) -> Self {
        Self {
            bid_id: bid.id,
            bid_uuid: bid.uuid,
            bid_price_in_usd: bid.price,
            bid_item_uuid: bid.item,
            bidder_uuid: bid.bidder,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct AutoBidRecord {
    pub auto_bid_id: RecordId,
    pub auto_bid_uuid: Uuid,
    pub bid_item_uuid: ItemId,
    pub bidder_uuid: UserId,
}

impl From<AutoBidRegistration> for AutoBidRecord {
    fn from(registration: AutoBidRegistration) -> Self {
        Self {
            auto_bid_id: registration.id,
            auto_bid_uuid: registration.uuid,
            bid_item_uuid: registration.item,
            bidder_uuid: registration.bidder,
        }
    }
}

#[derive(Serialize)]
struct Message {
    message: String,
}

pub struct ApiError(BidError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            BidError::NotFound { .. } => StatusCode::NOT_FOUND,
            BidError::PriceTooLow { .. } | BidError::AlreadyRegistered { .. } => {
                StatusCode::BAD_REQUEST
            }
            BidError::AuctionClosed(_) => StatusCode::CONFLICT,
            BidError::Internal(e) => {
                error!(error = ?e, "request failed");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(Message {
                        message: "internal error".to_owned(),
                    }),
                )
                    .into_response();
            }
        };
        (
            status,
            Json(Message {
                message: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, BidError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError(BidError::Internal(e.into())))?
        .map_err(ApiError)
}

async fn create_bid(
    State(engine): State<Arc<BiddingEngine>>,
    Json(request): Json<CreateBidRequest>,
) -> Result<Json<BidRecord>, ApiError> {
    let bid = run_blocking(move || {
        engine.place_bid(
            &request.bid_item_uuid,
            &request.bidder_uuid,
            request.bid_price_in_usd,
        )
    })
    .await?;
    Ok(Json(bid.into()))
}

async fn register_auto_bid(
    State(engine): State<Arc<BiddingEngine>>,
    Json(request): Json<RegisterAutoBidRequest>,
) -> Result<Json<AutoBidRecord>, ApiError> {
    let registration = run_blocking(move || {
        engine.register_auto_bid(
            &request.bid_item_uuid,
            &request.bidder_uuid,
            request.max_bid_amount_in_usd,
        )
    })
    .await?;
    Ok(Json(registration.into()))
}

async fn item_bids(
    State(engine): State<Arc<BiddingEngine>>,
    Path(item_id): Path<ItemId>,
) -> Result<Json<Vec<BidRecord>>, ApiError> {
    let bids = run_blocking(move || engine.bids(&item_id)).await?;
    Ok(Json(bids.into_iter().map(BidRecord::from).collect()))
}

pub fn router(engine: Arc<BiddingEngine>) -> Router {
    Router::new()
        .route("/create/bid", post(create_bid))
        .route("/register/auto/bid", post(register_auto_bid))
        .route("/item/:item_id/bids", get(item_bids))
        .with_state(engine)
}

pub async fn serve(
    addr: SocketAddr,
    engine: Arc<BiddingEngine>,
    shutdown: impl Future<Output = ()>,
) -> Result<()> {
    let server = axum::Server::try_bind(&addr)?.serve(router(engine).into_make_service());
    info!(addr = %server.local_addr(), "listening");
    server.with_graceful_shutdown(shutdown).await?;
    Ok(())
}
