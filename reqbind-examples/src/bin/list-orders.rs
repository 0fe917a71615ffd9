//! Example: Order service
//!
//! Binds path, query and body values into typed records with the
//! `Decoded` extractor. Decoding failures are rejected with a JSON error
//! body and a status matching the failure.
//!
//! Run with: cargo run --bin list-orders
//! Test with:
//!   curl "http://localhost:3000/orders?filterType=pending,approved&clientId=4&filterClientIds=1|2|3"
//!   curl "http://localhost:3000/orders/7?fields=id,item"
//!   curl -X POST "http://localhost:3000/orders?dryRun=true" -H 'Content-Type: application/json' -d '{"item": "pen", "quantity": 2}'

use axum::{Json, Router, routing::get};
use reqbind::prelude::*;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

#[derive(Debug, Default, Record)]
struct ListOrders {
    #[bind("filterType,form")]
    pub filter_type: Vec<String>,
    #[bind("clientId,required")]
    pub client_id: i64,
    #[bind("filterClientIds,pipeDelimited")]
    pub filter_client_ids: Vec<u32>,
    #[bind("createdAt,deepObject")]
    pub created_at: Option<Range>,
    #[bind("limit")]
    pub limit: Option<u16>,
}

#[derive(Debug, Default, Serialize, Record)]
struct Range {
    pub gt: Option<u64>,
    pub lt: Option<u64>,
}

#[derive(Serialize)]
struct OrderList {
    client_id: i64,
    statuses: Vec<String>,
    client_ids: Vec<u32>,
    created_at: Option<Range>,
    limit: u16,
}

async fn list_orders(Decoded(req): Decoded<ListOrders>) -> Json<OrderList> {
    tracing::info!(client_id = req.client_id, "listing orders");
    Json(OrderList {
        client_id: req.client_id,
        statuses: req.filter_type,
        client_ids: req.filter_client_ids,
        created_at: req.created_at,
        limit: req.limit.unwrap_or(50),
    })
}

#[derive(Debug, Default, Record)]
struct GetOrder {
    #[bind("id,path")]
    pub id: u64,
    #[bind("fields,form")]
    pub fields: Vec<String>,
}

async fn get_order(Decoded(req): Decoded<GetOrder>) -> Json<serde_json::Value> {
    let mut order = serde_json::Map::new();
    order.insert("id".into(), req.id.into());
    for field in req.fields.iter().filter(|f| f.as_str() != "id") {
        order.insert(field.clone(), serde_json::Value::Null);
    }
    Json(order.into())
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct NewOrder {
    item: String,
    quantity: u32,
}

#[derive(Debug, Default, Record)]
struct CreateOrder {
    #[bind("dryRun")]
    pub dry_run: bool,
    #[bind(",body")]
    pub order: NewOrder,
}

async fn create_order(Decoded(req): Decoded<CreateOrder>) -> Json<serde_json::Value> {
    tracing::info!(item = %req.order.item, dry_run = req.dry_run, "creating order");
    Json(serde_json::json!({
        "created": !req.dry_run,
        "order": req.order,
    }))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let decoder = Decoder::builder()
        .body_limits(reqbind::BodyLimits::new(64 * 1024))
        .build();

    let router = Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/{id}", get(get_order))
        .layer(DecoderLayer::new(decoder));

    let addr: SocketAddr = "0.0.0.0:3000".parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    println!("=== Order Service Example ===");
    println!("Server listening on http://{}", addr);
    println!();
    println!("Routes:");
    println!("  - GET  /orders       list orders (query binding)");
    println!("  - GET  /orders/{{id}}  fetch one order (path + query)");
    println!("  - POST /orders       create an order (query + JSON body)");

    axum::serve(listener, router).await?;
    Ok(())
}
