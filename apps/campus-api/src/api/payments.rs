//! Payments API routes
//!
//! Wires the payment workflow to Razorpay and to the events domain, which
//! acts as the seat ledger for verified payments.

use axum::Router;
use domain_events::{EventService, MongoEventRepository, MongoUserDirectory};
use domain_payments::{MongoPaymentRepository, PaymentService, RazorpayGateway, handlers};
use mongodb::Database;

use crate::state::AppState;

/// Create the payments router with the gateway and the event ledger
pub fn router(state: &AppState) -> Router {
    let events = EventService::new(
        MongoEventRepository::new(state.db.clone()),
        MongoUserDirectory::new(state.db.clone()),
    );

    let razorpay = &state.config.razorpay;
    let gateway = match &razorpay.base_url {
        Some(base_url) => RazorpayGateway::with_base_url(
            razorpay.key_id.clone(),
            razorpay.key_secret.clone(),
            base_url.clone(),
        ),
        None => RazorpayGateway::new(razorpay.key_id.clone(), razorpay.key_secret.clone()),
    };

    let service = PaymentService::new(
        MongoPaymentRepository::new(state.db.clone()),
        gateway,
        events,
        razorpay.key_secret.clone(),
    );

    handlers::router(service)
}

/// Create MongoDB indexes for the payments collection
pub async fn init_indexes(db: &Database) -> eyre::Result<()> {
    let repository = MongoPaymentRepository::new(db.clone());
    repository.create_indexes().await?;
    Ok(())
}
