//! Storefront handlers: catalog, order creation and lookup.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use kanau::processor::Processor;
use kasir_core::entities::StoreError;
use kasir_core::entities::invoice_status::GetInvoiceStatus;
use kasir_core::entities::order_records::{CreateOrderRecord, GetOrderRecordById};
use kasir_sdk::invoice::{InvoiceId, ThreadRandom};
use kasir_sdk::objects::{CreateOrderRequest, Product};

use super::{ApiError, resolve_invoice_id};
use crate::state::AppState;

/// Attempts at generating an unused invoice id before giving up.
const INVOICE_ID_ATTEMPTS: usize = 3;

/// `GET /api/products`: list the catalog.
pub(super) async fn list_products(state: State<AppState>) -> Json<Vec<Product>> {
    Json(state.config.catalog.read().await.products.clone())
}

/// `POST /api/orders`: create a `PENDING` order for a catalog product.
///
/// Amount and product name are copied from the catalog.
pub(super) async fn create_order(
    state: State<AppState>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload.map_err(ApiError::InvalidBody)?;
    if payload.customer.name.trim().is_empty() || payload.customer.email.trim().is_empty() {
        return Err(ApiError::InvalidPayload("customer name and email are required"));
    }

    let product = state
        .config
        .catalog
        .read()
        .await
        .find(&payload.product_id)
        .cloned()
        .ok_or(ApiError::NotFound("product not found"))?;

    let processor = state.store();
    let mut rng = ThreadRandom;
    let mut attempt = 0;
    let record = loop {
        attempt += 1;
        let invoice_id = InvoiceId::generate(&mut rng);
        let result = processor
            .process(CreateOrderRecord {
                invoice_id: invoice_id.clone(),
                product_id: product.id.clone(),
                product_name: product.name.clone(),
                amount: product.price,
                customer: payload.customer.clone(),
            })
            .await;
        match result {
            Ok(record) => break record,
            Err(StoreError::Duplicate) if attempt < INVOICE_ID_ATTEMPTS => {
                tracing::warn!(%invoice_id, attempt, "invoice id collision, regenerating");
            }
            Err(e) => return Err(e.into()),
        }
    };

    tracing::info!(
        invoice_id = %record.invoice_id,
        product_id = %record.product_id,
        amount = record.amount,
        "order created"
    );
    Ok((StatusCode::CREATED, Json(record.to_response(None))))
}

/// `GET /api/orders/{invoice_id}`: fetch an order.
///
/// The status is projected from the latest payment status when one exists.
pub(super) async fn get_order(
    state: State<AppState>,
    Path(invoice_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let invoice_id = resolve_invoice_id(&invoice_id)?;
    let processor = state.store();

    let record = processor
        .process(GetOrderRecordById {
            invoice_id: invoice_id.clone(),
        })
        .await?
        .ok_or(ApiError::NotFound("order not found"))?;
    let latest = processor.process(GetInvoiceStatus { invoice_id }).await?;

    Ok(Json(record.to_response(latest.as_ref().map(|s| &s.status))))
}
