//! MongoDB implementations of the event repository and user directory

use async_trait::async_trait;
use chrono::Utc;
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use mongodb::{
    Collection, Database,
    bson::{Bson, Document, doc, to_bson},
};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use crate::directory::{DirectoryUser, UserDirectory};
use crate::error::EventResult;
use crate::models::{Attendee, Event, EventFilter, EventType};
use crate::repository::EventRepository;

/// MongoDB implementation of the EventRepository
pub struct MongoEventRepository {
    collection: Collection<Event>,
}

impl MongoEventRepository {
    /// Create a new MongoEventRepository
    ///
    /// # Example
    /// ```ignore
    /// let client = Client::with_uri_str("mongodb://localhost:27017").await?;
    /// let db = client.database("campus");
    /// let repo = MongoEventRepository::new(db);
    /// ```
    pub fn new(db: Database) -> Self {
        let collection = db.collection::<Event>("events");
        Self { collection }
    }

    /// Create a new MongoEventRepository with a custom collection name
    pub fn with_collection(db: Database, collection_name: &str) -> Self {
        let collection = db.collection::<Event>(collection_name);
        Self { collection }
    }

    /// Get the underlying collection for advanced operations
    pub fn collection(&self) -> &Collection<Event> {
        &self.collection
    }

    /// Create indexes for efficient querying
    pub async fn create_indexes(&self) -> EventResult<()> {
        use mongodb::IndexModel;

        let indexes = vec![
            // Listing sorts by event date
            IndexModel::builder().keys(doc! { "date": 1 }).build(),
            // Visibility predicate arms match on the policy tag
            IndexModel::builder()
                .keys(doc! { "visibility.type": 1 })
                .build(),
            // Roster membership lookups
            IndexModel::builder()
                .keys(doc! { "attendees.user_id": 1 })
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        Ok(())
    }

    /// Build a MongoDB filter document from EventFilter plus an optional
    /// visibility predicate
    fn build_filter(filter: &EventFilter, visibility: Option<Document>) -> Document {
        let mut doc = doc! {};

        if let Some(ref category) = filter.category {
            doc.insert("category", category);
        }

        if let Some(event_type) = filter.event_type {
            doc.insert("is_team_event", event_type == EventType::Team);
        }

        let mut date = doc! {};
        if let Some(from) = filter.date_from {
            date.insert("$gte", to_bson(&from).unwrap_or(Bson::Null));
        }
        if let Some(to) = filter.date_to {
            date.insert("$lt", to_bson(&to).unwrap_or(Bson::Null));
        }
        if !date.is_empty() {
            doc.insert("date", date);
        }

        if let Some(vis) = visibility {
            // The predicate carries its own $or; keep it in a clause of
            // its own so it cannot collide with filter keys
            doc.insert("$and", vec![vis]);
        }

        doc
    }
}

#[async_trait]
impl EventRepository for MongoEventRepository {
    #[instrument(skip(self, event), fields(event_id = %event.id, event_name = %event.name))]
    async fn insert(&self, event: &Event) -> EventResult<()> {
        self.collection.insert_one(event).await?;

        tracing::info!("Event created successfully");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> EventResult<Option<Event>> {
        let filter = doc! { "_id": to_bson(&id).unwrap_or(Bson::Null) };
        let event = self.collection.find_one(filter).await?;
        Ok(event)
    }

    #[instrument(skip(self, visibility))]
    async fn list(
        &self,
        filter: &EventFilter,
        visibility: Option<Document>,
    ) -> EventResult<Vec<Event>> {
        use futures_util::TryStreamExt;

        let mongo_filter = Self::build_filter(filter, visibility);

        let page = u64::from(filter.page.max(1));
        let per_page = u64::from(filter.per_page);
        let options = FindOptions::builder()
            .limit(per_page as i64)
            .skip((page - 1) * per_page)
            .sort(doc! { "date": 1 })
            .build();

        let cursor = self
            .collection
            .find(mongo_filter)
            .with_options(options)
            .await?;
        let events: Vec<Event> = cursor.try_collect().await?;

        Ok(events)
    }

    #[instrument(skip(self, visibility))]
    async fn count(&self, filter: &EventFilter, visibility: Option<Document>) -> EventResult<u64> {
        let mongo_filter = Self::build_filter(filter, visibility);
        let count = self.collection.count_documents(mongo_filter).await?;
        Ok(count)
    }

    #[instrument(skip(self, attendees), fields(attendee_count = attendees.len()))]
    async fn apply_roster(
        &self,
        event_id: Uuid,
        expected_revision: i64,
        attendees: Vec<Attendee>,
        available_seats: u32,
    ) -> EventResult<Option<Event>> {
        // The revision in the filter makes this a compare-and-swap: a
        // roster changed since the caller read it no longer matches
        let filter = doc! {
            "_id": to_bson(&event_id).unwrap_or(Bson::Null),
            "revision": expected_revision,
        };
        let update = doc! {
            "$set": {
                "attendees": to_bson(&attendees).map_err(mongodb::error::Error::from)?,
                "available_seats": i64::from(available_seats),
                "updated_at": to_bson(&Utc::now()).map_err(mongodb::error::Error::from)?,
            },
            "$inc": { "revision": 1_i64 },
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
            tracing::debug!(event_id = %event_id, expected_revision, "Roster write lost the race");
        }
        Ok(updated)
    }
}

/// Projection of the campus users collection used for email resolution
#[derive(Debug, Deserialize)]
struct DirectoryDoc {
    #[serde(rename = "_id", alias = "id")]
    id: Uuid,
    email: String,
}

/// MongoDB implementation of the UserDirectory backed by the shared
/// campus users collection
pub struct MongoUserDirectory {
    collection: Collection<DirectoryDoc>,
}

impl MongoUserDirectory {
    pub fn new(db: Database) -> Self {
        let collection = db.collection::<DirectoryDoc>("users");
        Self { collection }
    }

    pub fn with_collection(db: Database, collection_name: &str) -> Self {
        let collection = db.collection::<DirectoryDoc>(collection_name);
        Self { collection }
    }
}

#[async_trait]
impl UserDirectory for MongoUserDirectory {
    #[instrument(skip(self, emails), fields(email_count = emails.len()))]
    async fn resolve_emails(&self, emails: &[String]) -> EventResult<Vec<DirectoryUser>> {
        use futures_util::TryStreamExt;

        if emails.is_empty() {
            return Ok(Vec::new());
        }

        let filter = doc! { "email": { "$in": emails.to_vec() } };
        let cursor = self.collection.find(filter).await?;
        let docs: Vec<DirectoryDoc> = cursor.try_collect().await?;

        Ok(docs
            .into_iter()
            .map(|d| DirectoryUser {
                id: d.id,
                email: d.email,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_build_filter_empty() {
        let filter = EventFilter::default();
        let doc = MongoEventRepository::build_filter(&filter, None);
        assert!(doc.is_empty());
    }

    #[test]
    fn test_build_filter_with_category_and_type() {
        let filter = EventFilter {
            category: Some("tech".to_string()),
            event_type: Some(EventType::Team),
            ..Default::default()
        };
        let doc = MongoEventRepository::build_filter(&filter, None);
        assert_eq!(doc.get_str("category").unwrap(), "tech");
        assert!(doc.get_bool("is_team_event").unwrap());
    }

    #[test]
    fn test_build_filter_with_date_range() {
        let filter = EventFilter {
            date_from: Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()),
            date_to: Some(Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap()),
            ..Default::default()
        };
        let doc = MongoEventRepository::build_filter(&filter, None);
        let range = doc.get_document("date").unwrap();
        assert!(range.contains_key("$gte"));
        assert!(range.contains_key("$lt"));
    }

    #[test]
    fn test_build_filter_merges_visibility_clause() {
        let filter = EventFilter {
            category: Some("tech".to_string()),
            ..Default::default()
        };
        let vis = doc! { "$or": [ { "visibility.type": "all" } ] };
        let doc = MongoEventRepository::build_filter(&filter, Some(vis));

        assert!(doc.contains_key("category"));
        let clauses = doc.get_array("$and").unwrap();
        assert_eq!(clauses.len(), 1);
    }
}
