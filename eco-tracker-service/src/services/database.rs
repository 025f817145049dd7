use super::store::{inserted_id, EcoStore};
use crate::models::{
    Challenge, ChallengeFilter, ChallengeUpdate, Enrollment, EnrollmentUpdate, Event, Tip,
    UpdateOutcome, User,
};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    error::{ErrorKind, WriteFailure},
    options::{ClientOptions, FindOptions, IndexOptions, ServerApi, ServerApiVersion},
    Client as MongoClient, Collection, Database, IndexModel,
};
use serde::de::DeserializeOwned;
use service_core::error::AppError;

const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Clone)]
pub struct MongoStore {
    client: MongoClient,
    db: Database,
}

impl MongoStore {
    /// Connects with the Stable API v1 (strict) and pings the deployment
    /// before returning.
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!("Connecting to MongoDB");
        let mut options = ClientOptions::parse(uri).await.map_err(|e| {
            tracing::error!("Invalid MongoDB connection string: {}", e);
            AppError::from(e)
        })?;
        options.server_api = Some(
            ServerApi::builder()
                .version(ServerApiVersion::V1)
                .strict(true)
                .deprecation_errors(true)
                .build(),
        );

        let client = MongoClient::with_options(options).map_err(|e| {
            tracing::error!("Failed to create MongoDB client: {}", e);
            AppError::from(e)
        })?;
        let db = client.database(database);

        let store = Self { client, db };
        store.health_check().await?;
        tracing::info!(database = %database, "Pinged deployment, connected to MongoDB");
        Ok(store)
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for eco-tracker-service");

        // One account per email
        create_index(
            &self.users(),
            doc! { "email": 1 },
            IndexOptions::builder()
                .name("email_unique".to_string())
                .unique(true)
                .build(),
        )
        .await?;

        // At most one enrollment per (user, challenge); closes the join race
        create_index(
            &self.enrollments(),
            doc! { "userId": 1, "challengeId": 1 },
            IndexOptions::builder()
                .name("user_challenge_unique".to_string())
                .unique(true)
                .build(),
        )
        .await?;

        create_index(
            &self.enrollments(),
            doc! { "userId": 1, "joinDate": -1 },
            IndexOptions::builder()
                .name("user_join_date_idx".to_string())
                .build(),
        )
        .await?;

        create_index(
            &self.challenges(),
            doc! { "createdAt": -1 },
            IndexOptions::builder()
                .name("created_at_idx".to_string())
                .build(),
        )
        .await?;

        create_index(
            &self.challenges(),
            doc! { "createdBy": 1 },
            IndexOptions::builder()
                .name("created_by_idx".to_string())
                .build(),
        )
        .await?;

        create_index(
            &self.events(),
            doc! { "date": 1 },
            IndexOptions::builder().name("date_idx".to_string()).build(),
        )
        .await?;

        create_index(
            &self.tips(),
            doc! { "createdAt": -1 },
            IndexOptions::builder()
                .name("created_at_idx".to_string())
                .build(),
        )
        .await?;

        tracing::info!("Successfully created all MongoDB indexes");
        Ok(())
    }

    pub fn users(&self) -> Collection<User> {
        self.db.collection("users")
    }

    pub fn challenges(&self) -> Collection<Challenge> {
        self.db.collection("challenges")
    }

    pub fn enrollments(&self) -> Collection<Enrollment> {
        self.db.collection("user_challenges")
    }

    pub fn tips(&self) -> Collection<Tip> {
        self.db.collection("tips")
    }

    pub fn events(&self) -> Collection<Event> {
        self.db.collection("events")
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

async fn create_index<T>(
    collection: &Collection<T>,
    keys: Document,
    options: IndexOptions,
) -> Result<(), AppError>
where
    T: Send + Sync,
{
    let model = IndexModel::builder().keys(keys).options(options).build();
    collection.create_index(model, None).await.map_err(|e| {
        tracing::error!(
            collection = %collection.name(),
            "Failed to create index: {}",
            e
        );
        AppError::from(e)
    })?;
    Ok(())
}

/// Documents that no longer decode into `T` are logged and left out so one
/// bad record cannot take a whole list down.
async fn find_sorted<T>(
    collection: &Collection<T>,
    filter: Document,
    sort: Document,
    limit: Option<i64>,
) -> Result<Vec<T>, AppError>
where
    T: DeserializeOwned + Send + Sync,
{
    let find_options = FindOptions::builder().sort(sort).limit(limit).build();

    let cursor = collection
        .clone_with_type::<Document>()
        .find(filter, find_options)
        .await
        .map_err(|e| {
            tracing::error!(collection = %collection.name(), "Find failed: {}", e);
            AppError::from(e)
        })?;

    let documents: Vec<Document> = cursor.try_collect().await.map_err(|e| {
        tracing::error!(collection = %collection.name(), "Cursor iteration failed: {}", e);
        AppError::from(e)
    })?;

    Ok(documents
        .into_iter()
        .filter_map(|document| decode_listed(collection.name(), document))
        .collect())
}

fn decode_listed<T: DeserializeOwned>(collection: &str, document: Document) -> Option<T> {
    let id = document.get("_id").cloned();
    match mongodb::bson::from_document(document) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(
                collection = %collection,
                id = ?id,
                error = %e,
                "Skipping document that does not decode"
            );
            None
        }
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY_CODE
    )
}

fn insert_error(err: mongodb::error::Error, what: &str) -> AppError {
    if is_duplicate_key(&err) {
        AppError::Conflict(anyhow::anyhow!("{} already exists", what))
    } else {
        tracing::error!("Failed to insert {}: {}", what, err);
        AppError::from(err)
    }
}

#[async_trait]
impl EcoStore for MongoStore {
    async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }

    async fn list_challenges(&self, filter: &ChallengeFilter) -> Result<Vec<Challenge>, AppError> {
        find_sorted(
            &self.challenges(),
            filter.to_document(),
            doc! { "createdAt": -1 },
            None,
        )
        .await
    }

    async fn recent_challenges(&self, limit: i64) -> Result<Vec<Challenge>, AppError> {
        find_sorted(
            &self.challenges(),
            doc! {},
            doc! { "createdAt": -1 },
            Some(limit),
        )
        .await
    }

    async fn challenges_created_by(&self, email: &str) -> Result<Vec<Challenge>, AppError> {
        find_sorted(
            &self.challenges(),
            doc! { "createdBy": email },
            doc! { "createdAt": -1 },
            None,
        )
        .await
    }

    async fn find_challenge(&self, id: ObjectId) -> Result<Option<Challenge>, AppError> {
        self.challenges()
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| {
                tracing::error!(challenge_id = %id, "Failed to find challenge: {}", e);
                AppError::from(e)
            })
    }

    async fn insert_challenge(&self, challenge: &Challenge) -> Result<ObjectId, AppError> {
        self.challenges()
            .insert_one(challenge, None)
            .await
            .map_err(|e| insert_error(e, "Challenge"))?;
        inserted_id(challenge.id)
    }

    async fn update_challenge(
        &self,
        id: ObjectId,
        update: &ChallengeUpdate,
    ) -> Result<UpdateOutcome, AppError> {
        let result = self
            .challenges()
            .update_one(
                doc! { "_id": id },
                doc! { "$set": update.to_set_document() },
                None,
            )
            .await
            .map_err(|e| {
                tracing::error!(challenge_id = %id, "Failed to update challenge: {}", e);
                AppError::from(e)
            })?;

        Ok(UpdateOutcome {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    async fn delete_challenge(&self, id: ObjectId) -> Result<u64, AppError> {
        let result = self
            .challenges()
            .delete_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| {
                tracing::error!(challenge_id = %id, "Failed to delete challenge: {}", e);
                AppError::from(e)
            })?;
        Ok(result.deleted_count)
    }

    async fn increment_participants(&self, id: ObjectId) -> Result<bool, AppError> {
        let result = self
            .challenges()
            .update_one(
                doc! { "_id": id },
                doc! { "$inc": { "participants": 1 } },
                None,
            )
            .await
            .map_err(|e| {
                tracing::error!(challenge_id = %id, "Failed to increment participants: {}", e);
                AppError::from(e)
            })?;
        Ok(result.matched_count > 0)
    }

    async fn find_enrollment(
        &self,
        user_id: &str,
        challenge_id: &str,
    ) -> Result<Option<Enrollment>, AppError> {
        self.enrollments()
            .find_one(doc! { "userId": user_id, "challengeId": challenge_id }, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to look up enrollment: {}", e);
                AppError::from(e)
            })
    }

    async fn insert_enrollment(&self, enrollment: &Enrollment) -> Result<ObjectId, AppError> {
        self.enrollments()
            .insert_one(enrollment, None)
            .await
            .map_err(|e| insert_error(e, "Enrollment"))?;
        inserted_id(enrollment.id)
    }

    async fn enrollments_for_user(&self, user_id: &str) -> Result<Vec<Enrollment>, AppError> {
        find_sorted(
            &self.enrollments(),
            doc! { "userId": user_id },
            doc! { "joinDate": -1 },
            None,
        )
        .await
    }

    async fn update_enrollment(
        &self,
        id: ObjectId,
        update: &EnrollmentUpdate,
    ) -> Result<UpdateOutcome, AppError> {
        let result = self
            .enrollments()
            .update_one(
                doc! { "_id": id },
                doc! { "$set": update.to_set_document() },
                None,
            )
            .await
            .map_err(|e| {
                tracing::error!(enrollment_id = %id, "Failed to update enrollment: {}", e);
                AppError::from(e)
            })?;

        Ok(UpdateOutcome {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    async fn delete_enrollment(&self, id: ObjectId) -> Result<u64, AppError> {
        let result = self
            .enrollments()
            .delete_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| {
                tracing::error!(enrollment_id = %id, "Failed to delete enrollment: {}", e);
                AppError::from(e)
            })?;
        Ok(result.deleted_count)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.users()
            .find_one(doc! { "email": email }, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to look up user by email: {}", e);
                AppError::from(e)
            })
    }

    async fn insert_user(&self, user: &User) -> Result<ObjectId, AppError> {
        self.users()
            .insert_one(user, None)
            .await
            .map_err(|e| insert_error(e, "User"))?;
        inserted_id(user.id)
    }

    async fn list_events(&self) -> Result<Vec<Event>, AppError> {
        find_sorted(&self.events(), doc! {}, doc! { "date": 1 }, None).await
    }

    async fn upcoming_events(&self, from: &str, limit: i64) -> Result<Vec<Event>, AppError> {
        find_sorted(
            &self.events(),
            doc! { "date": { "$gte": from } },
            doc! { "date": 1 },
            Some(limit),
        )
        .await
    }

    async fn list_tips(&self) -> Result<Vec<Tip>, AppError> {
        find_sorted(&self.tips(), doc! {}, doc! { "createdAt": -1 }, None).await
    }

    async fn recent_tips(&self, limit: i64) -> Result<Vec<Tip>, AppError> {
        find_sorted(&self.tips(), doc! {}, doc! { "createdAt": -1 }, Some(limit)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::Bson;

    #[test]
    fn undecodable_documents_are_skipped() {
        let good = doc! { "_id": ObjectId::new(), "title": "LED bulbs" };
        let bad = doc! { "_id": ObjectId::new(), "title": ["not", "a", "string"] };

        assert!(decode_listed::<Tip>("tips", good).is_some());
        assert!(decode_listed::<Tip>("tips", bad).is_none());
    }

    #[test]
    fn loose_numbers_still_decode() {
        let tip = decode_listed::<Tip>("tips", doc! { "upvotes": Bson::Double(12.0) });
        assert_eq!(tip.and_then(|t| t.upvotes), Some(12));
    }
}
