//! MongoDB implementation of the payment repository

use async_trait::async_trait;
use chrono::Utc;
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};
use mongodb::{
    Collection, Database,
    bson::{Bson, doc, to_bson},
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::PaymentResult;
use crate::models::Payment;
use crate::repository::PaymentRepository;

/// MongoDB implementation of the PaymentRepository
pub struct MongoPaymentRepository {
    collection: Collection<Payment>,
}

impl MongoPaymentRepository {
    /// Create a new MongoPaymentRepository
    ///
    /// # Example
    /// ```ignore
    /// let client = Client::with_uri_str("mongodb://localhost:27017").await?;
    /// let db = client.database("campus");
    /// let repo = MongoPaymentRepository::new(db);
    /// ```
    pub fn new(db: Database) -> Self {
        let collection = db.collection::<Payment>("payments");
        Self { collection }
    }

    /// Create a new MongoPaymentRepository with a custom collection name
    pub fn with_collection(db: Database, collection_name: &str) -> Self {
        let collection = db.collection::<Payment>(collection_name);
        Self { collection }
    }

    /// Get the underlying collection for advanced operations
    pub fn collection(&self) -> &Collection<Payment> {
        &self.collection
    }

    /// Create indexes for efficient querying and uniqueness constraints
    pub async fn create_indexes(&self) -> PaymentResult<()> {
        use mongodb::IndexModel;
        use mongodb::options::IndexOptions;

        let indexes = vec![
            // Callback lookups come in by gateway order id
            IndexModel::builder()
                .keys(doc! { "order_id": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build(),
            // At most one completed payment per user per event; open and
            // failed attempts do not count against the constraint
            IndexModel::builder()
                .keys(doc! { "user_id": 1, "event_id": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .partial_filter_expression(doc! { "status": "paid" })
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        Ok(())
    }
}

#[async_trait]
impl PaymentRepository for MongoPaymentRepository {
    #[instrument(skip(self, payment), fields(payment_id = %payment.id, order_id = %payment.order_id))]
    async fn insert(&self, payment: &Payment) -> PaymentResult<()> {
        self.collection.insert_one(payment).await?;

        tracing::info!("Payment record created");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_order_id(&self, order_id: &str) -> PaymentResult<Option<Payment>> {
        let filter = doc! { "order_id": order_id };
        let payment = self.collection.find_one(filter).await?;
        Ok(payment)
    }

    #[instrument(skip(self))]
    async fn find_paid_for_event(
        &self,
        user_id: Uuid,
        event_id: Uuid,
    ) -> PaymentResult<Option<Payment>> {
        let filter = doc! {
            "user_id": to_bson(&user_id).unwrap_or(Bson::Null),
            "event_id": to_bson(&event_id).unwrap_or(Bson::Null),
            "status": "paid",
        };
        let payment = self.collection.find_one(filter).await?;
        Ok(payment)
    }

    #[instrument(skip(self, signature))]
    async fn mark_paid(
        &self,
        id: Uuid,
        gateway_payment_id: &str,
        signature: &str,
    ) -> PaymentResult<Option<Payment>> {
        // The status condition makes this a one-way gate: a payment that
        // already settled no longer matches
        let filter = doc! {
            "_id": to_bson(&id).unwrap_or(Bson::Null),
            "status": { "$in": ["created", "pending"] },
        };
        let update = doc! {
            "$set": {
                "status": "paid",
                "payment_id": gateway_payment_id,
                "signature": signature,
                "verified_at": to_bson(&Utc::now()).map_err(mongodb::error::Error::from)?,
                "updated_at": to_bson(&Utc::now()).map_err(mongodb::error::Error::from)?,
            },
        };

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = self
            .collection
            .find_one_and_update(filter, update)
            .with_options(options)
            .await?;

        if updated.is_none() {
            tracing::debug!(payment_id = %id, "Payment already settled, mark_paid skipped");
        }
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn mark_failed(&self, id: Uuid) -> PaymentResult<Option<Payment>> {
        let filter = doc! {
            "_id": to_bson(&id).unwrap_or(Bson::Null),
            "status": { "$in": ["created", "pending"] },
        };
        let update = doc! {
            "$set": {
                "status": "failed",
                "updated_at": to_bson(&Utc::now()).map_err(mongodb::error::Error::from)?,
            },
        };

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = self
            .collection
            .find_one_and_update(filter, update)
            .with_options(options)
            .await?;

        Ok(updated)
    }
}
