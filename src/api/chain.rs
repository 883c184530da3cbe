use actix_web::{HttpResponse, Responder, get, post, web};
use chrono::Utc;
use log::{info, warn};

use super::models::{AppState, ErrorResponse, StatusResponse, SubmitBlockRequest};
use crate::blockchain::Block;

/// Chain status: height, next admission index, tail hash and the result
/// of a full integrity walk.
#[get("/status/")]
pub async fn get_status(state: web::Data<AppState>) -> impl Responder {
    let bc = state.blockchain.lock().expect("mutex poisoned");
    let resp = StatusResponse {
        height: bc.len(),
        next_index: bc.next_index,
        is_valid: bc.is_valid(),
        last_block_hash: bc.last_block().hash.clone(),
    };
    HttpResponse::Ok().json(resp)
}

/// Job descriptor for an external miner: index, previous hash and the
/// difficulty the submitted block will be checked against.
#[get("/blocks/next/")]
pub async fn get_next_block(state: web::Data<AppState>) -> impl Responder {
    let bc = state.blockchain.lock().expect("mutex poisoned");
    HttpResponse::Ok().json(bc.next_block_info())
}

/// Look up a block by index (numeric key) or hash (anything else).
#[get("/blocks/{key}/")]
pub async fn get_block(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let key = path.into_inner();
    let bc = state.blockchain.lock().expect("mutex poisoned");

    let found = match key.parse::<u64>() {
        Ok(index) => bc.get_block_by_index(index),
        Err(_) => bc.get_block(&key),
    };

    match found {
        Some(block) => HttpResponse::Ok().json(block),
        None => HttpResponse::NotFound().json(ErrorResponse {
            error: format!("block {key} not found"),
        }),
    }
}

/// Submit a mined candidate block for admission.
/// - body missing required fields -> 422
/// - structural/proof-of-work rejection -> 400 with the reason
/// - admitted -> 201 with the stored block
#[post("/blocks/")]
pub async fn submit_block(
    state: web::Data<AppState>,
    body: web::Json<SubmitBlockRequest>,
) -> impl Responder {
    let payload = body.into_inner();
    let (Some(index), Some(data), Some(previous_hash), Some(hash)) =
        (payload.index, payload.data, payload.previous_hash, payload.hash)
    else {
        return HttpResponse::UnprocessableEntity().json(ErrorResponse {
            error: "block must carry index, data, previous_hash and hash".into(),
        });
    };

    let candidate = Block {
        index,
        timestamp: payload.timestamp.unwrap_or_else(|| Utc::now().timestamp()),
        data,
        previous_hash,
        nonce: payload.nonce,
        miner: payload.miner,
        hash,
    };

    let mut bc = state.blockchain.lock().expect("mutex poisoned");
    let validation = bc.add_block(candidate);
    if !validation.success {
        warn!("rejected block #{index}: {}", validation.message);
        return HttpResponse::BadRequest().json(validation);
    }

    let admitted = bc.last_block();
    info!("admitted block #{} (hash={})", admitted.index, admitted.hash);
    HttpResponse::Created().json(admitted)
}
