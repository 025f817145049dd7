use super::store::{inserted_id, EcoStore};
use crate::models::{
    Challenge, ChallengeFilter, ChallengeUpdate, Enrollment, EnrollmentUpdate, Event, Tip,
    UpdateOutcome, User,
};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use service_core::error::AppError;
use std::cmp::Reverse;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct Collections {
    users: Vec<User>,
    challenges: Vec<Challenge>,
    enrollments: Vec<Enrollment>,
    tips: Vec<Tip>,
    events: Vec<Event>,
}

/// In-process store with the same ordering and uniqueness rules as the
/// MongoDB collections. Backs tests and `STORE_BACKEND=memory`.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<Collections>,
    fail_increments: AtomicBool,
    miss_increments: AtomicBool,
    miss_lookups: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent participant increment fail with a database
    /// error.
    pub fn set_increment_failure(&self, fail: bool) {
        self.fail_increments.store(fail, Ordering::SeqCst);
    }

    /// Makes participant increments match nothing, as if the challenge was
    /// deleted right before the update.
    pub fn set_increment_misses(&self, miss: bool) {
        self.miss_increments.store(miss, Ordering::SeqCst);
    }

    /// Makes the existence checks for enrollments and users report a miss,
    /// the way a concurrent request sees the collection before the other
    /// insert lands. Inserts still enforce uniqueness.
    pub fn set_lookup_misses(&self, miss: bool) {
        self.miss_lookups.store(miss, Ordering::SeqCst);
    }

    pub fn add_tip(&self, mut tip: Tip) -> Result<ObjectId, AppError> {
        let id = *tip.id.get_or_insert_with(ObjectId::new);
        self.write()?.tips.push(tip);
        Ok(id)
    }

    pub fn add_event(&self, mut event: Event) -> Result<ObjectId, AppError> {
        let id = *event.id.get_or_insert_with(ObjectId::new);
        self.write()?.events.push(event);
        Ok(id)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Collections>, AppError> {
        self.collections
            .read()
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("Memory store lock poisoned: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Collections>, AppError> {
        self.collections
            .write()
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("Memory store lock poisoned: {}", e)))
    }
}

fn newest_challenges_first(challenges: &mut [Challenge]) {
    challenges.sort_by_key(|c| Reverse(c.created_at));
}

fn soonest_events_first(events: &mut [Event]) {
    // Missing dates sort first, as they do in MongoDB
    events.sort_by(|a, b| a.date.cmp(&b.date));
}

fn newest_tips_first(tips: &mut [Tip]) {
    tips.sort_by_key(|t| Reverse(t.created_at));
}

fn truncate<T>(mut items: Vec<T>, limit: i64) -> Vec<T> {
    items.truncate(usize::try_from(limit).unwrap_or(0));
    items
}

#[async_trait]
impl EcoStore for MemoryStore {
    async fn health_check(&self) -> Result<(), AppError> {
        self.read().map(|_| ())
    }

    async fn list_challenges(&self, filter: &ChallengeFilter) -> Result<Vec<Challenge>, AppError> {
        let mut challenges: Vec<Challenge> = self
            .read()?
            .challenges
            .iter()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();
        newest_challenges_first(&mut challenges);
        Ok(challenges)
    }

    async fn recent_challenges(&self, limit: i64) -> Result<Vec<Challenge>, AppError> {
        let mut challenges = self.read()?.challenges.clone();
        newest_challenges_first(&mut challenges);
        Ok(truncate(challenges, limit))
    }

    async fn challenges_created_by(&self, email: &str) -> Result<Vec<Challenge>, AppError> {
        let mut challenges: Vec<Challenge> = self
            .read()?
            .challenges
            .iter()
            .filter(|c| c.created_by.as_deref() == Some(email))
            .cloned()
            .collect();
        newest_challenges_first(&mut challenges);
        Ok(challenges)
    }

    async fn find_challenge(&self, id: ObjectId) -> Result<Option<Challenge>, AppError> {
        Ok(self
            .read()?
            .challenges
            .iter()
            .find(|c| c.id == Some(id))
            .cloned())
    }

    async fn insert_challenge(&self, challenge: &Challenge) -> Result<ObjectId, AppError> {
        let id = inserted_id(challenge.id)?;
        let mut collections = self.write()?;
        if collections.challenges.iter().any(|c| c.id == Some(id)) {
            return Err(AppError::Conflict(anyhow::anyhow!("Challenge already exists")));
        }
        collections.challenges.push(challenge.clone());
        Ok(id)
    }

    async fn update_challenge(
        &self,
        id: ObjectId,
        update: &ChallengeUpdate,
    ) -> Result<UpdateOutcome, AppError> {
        let mut collections = self.write()?;
        let outcome = match collections.challenges.iter_mut().find(|c| c.id == Some(id)) {
            Some(challenge) => UpdateOutcome {
                matched: 1,
                modified: u64::from(update.apply(challenge)),
            },
            None => UpdateOutcome::default(),
        };
        Ok(outcome)
    }

    async fn delete_challenge(&self, id: ObjectId) -> Result<u64, AppError> {
        let mut collections = self.write()?;
        let before = collections.challenges.len();
        collections.challenges.retain(|c| c.id != Some(id));
        Ok((before - collections.challenges.len()) as u64)
    }

    async fn increment_participants(&self, id: ObjectId) -> Result<bool, AppError> {
        if self.fail_increments.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "Simulated participant increment failure"
            )));
        }

        if self.miss_increments.load(Ordering::SeqCst) {
            return Ok(false);
        }

        let mut collections = self.write()?;
        match collections.challenges.iter_mut().find(|c| c.id == Some(id)) {
            Some(challenge) => {
                challenge.participants += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_enrollment(
        &self,
        user_id: &str,
        challenge_id: &str,
    ) -> Result<Option<Enrollment>, AppError> {
        if self.miss_lookups.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(self
            .read()?
            .enrollments
            .iter()
            .find(|e| e.user_id == user_id && e.challenge_id == challenge_id)
            .cloned())
    }

    async fn insert_enrollment(&self, enrollment: &Enrollment) -> Result<ObjectId, AppError> {
        let id = inserted_id(enrollment.id)?;
        let mut collections = self.write()?;
        let duplicate = collections.enrollments.iter().any(|e| {
            e.id == Some(id)
                || (e.user_id == enrollment.user_id && e.challenge_id == enrollment.challenge_id)
        });
        if duplicate {
            return Err(AppError::Conflict(anyhow::anyhow!("Enrollment already exists")));
        }
        collections.enrollments.push(enrollment.clone());
        Ok(id)
    }

    async fn enrollments_for_user(&self, user_id: &str) -> Result<Vec<Enrollment>, AppError> {
        let mut enrollments: Vec<Enrollment> = self
            .read()?
            .enrollments
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        enrollments.sort_by_key(|e| Reverse(e.join_date));
        Ok(enrollments)
    }

    async fn update_enrollment(
        &self,
        id: ObjectId,
        update: &EnrollmentUpdate,
    ) -> Result<UpdateOutcome, AppError> {
        let mut collections = self.write()?;
        let outcome = match collections.enrollments.iter_mut().find(|e| e.id == Some(id)) {
            Some(enrollment) => UpdateOutcome {
                matched: 1,
                modified: u64::from(update.apply(enrollment)),
            },
            None => UpdateOutcome::default(),
        };
        Ok(outcome)
    }

    async fn delete_enrollment(&self, id: ObjectId) -> Result<u64, AppError> {
        let mut collections = self.write()?;
        let before = collections.enrollments.len();
        collections.enrollments.retain(|e| e.id != Some(id));
        Ok((before - collections.enrollments.len()) as u64)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        if self.miss_lookups.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(self
            .read()?
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn insert_user(&self, user: &User) -> Result<ObjectId, AppError> {
        let id = inserted_id(user.id)?;
        let mut collections = self.write()?;
        if collections
            .users
            .iter()
            .any(|u| u.id == Some(id) || u.email == user.email)
        {
            return Err(AppError::Conflict(anyhow::anyhow!("User already exists")));
        }
        collections.users.push(user.clone());
        Ok(id)
    }

    async fn list_events(&self) -> Result<Vec<Event>, AppError> {
        let mut events = self.read()?.events.clone();
        soonest_events_first(&mut events);
        Ok(events)
    }

    async fn upcoming_events(&self, from: &str, limit: i64) -> Result<Vec<Event>, AppError> {
        let mut events: Vec<Event> = self
            .read()?
            .events
            .iter()
            .filter(|e| e.date.as_deref().is_some_and(|d| d >= from))
            .cloned()
            .collect();
        soonest_events_first(&mut events);
        Ok(truncate(events, limit))
    }

    async fn list_tips(&self) -> Result<Vec<Tip>, AppError> {
        let mut tips = self.read()?.tips.clone();
        newest_tips_first(&mut tips);
        Ok(tips)
    }

    async fn recent_tips(&self, limit: i64) -> Result<Vec<Tip>, AppError> {
        let mut tips = self.read()?.tips.clone();
        newest_tips_first(&mut tips);
        Ok(truncate(tips, limit))
    }
}
