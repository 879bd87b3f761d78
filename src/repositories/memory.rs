//! In-memory repositories for tests and local experiments.
//!
//! They mirror the Postgres behaviour the handlers rely on: unique usernames
//! and emails, newest-first ordering and sequential ids.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::anyhow;
use async_trait::async_trait;
use embryotech_core::{AppError, SharedClock};
use embryotech_models::{
    AuditLog, AuditLogId, AuditQuery, NewAuditLog, NewParameter, NewReading, NewUser, Parameter,
    ParameterId, Reading, ReadingId, ReadingQuery, User, UserId,
};

use super::{AuditRepository, ParameterRepository, ReadingRepository, UserRepository};

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

fn next_id(len: usize) -> i64 {
    i64::try_from(len).unwrap_or(i64::MAX - 1) + 1
}

pub struct MemoryUserRepository {
    users: RwLock<Vec<User>>,
    clock: SharedClock,
}

impl MemoryUserRepository {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            users: RwLock::new(Vec::new()),
            clock,
        }
    }

    fn modify(&self, id: UserId, change: impl FnOnce(&mut User)) -> Option<User> {
        let now = self.clock.now();
        let mut users = write(&self.users);
        let user = users.iter_mut().find(|u| u.id == id)?;
        change(user);
        user.updated_at = now;
        Some(user.clone())
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, AppError> {
        Ok(read(&self.users).iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(read(&self.users)
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        Ok(read(&self.users).clone())
    }

    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let now = self.clock.now();
        let mut users = write(&self.users);

        if users.iter().any(|u| u.username == user.username) {
            return Err(AppError::conflict("Username already exists"));
        }
        if users.iter().any(|u| u.email == user.email) {
            return Err(AppError::conflict("Email already registered"));
        }

        let created = User {
            id: UserId::new(next_id(users.len())),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            is_admin: user.is_admin,
            created_at: now,
            updated_at: now,
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn update_password(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<Option<User>, AppError> {
        Ok(self.modify(id, |user| user.password_hash = password_hash.to_string()))
    }

    async fn set_admin(&self, id: UserId, is_admin: bool) -> Result<Option<User>, AppError> {
        Ok(self.modify(id, |user| user.is_admin = is_admin))
    }
}

#[derive(Default)]
pub struct MemoryReadingRepository {
    readings: RwLock<Vec<Reading>>,
    issued: AtomicUsize,
}

impl MemoryReadingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        read(&self.readings).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ReadingRepository for MemoryReadingRepository {
    async fn create_many(&self, readings: Vec<NewReading>) -> Result<Vec<Reading>, AppError> {
        let mut stored = write(&self.readings);
        let created: Vec<Reading> = readings
            .into_iter()
            .map(|new| {
                let seq = self.issued.fetch_add(1, Ordering::SeqCst);
                Reading {
                    id: ReadingId::new(next_id(seq)),
                    humidity: new.humidity,
                    temperature: new.temperature,
                    pressure: new.pressure,
                    batch: new.batch,
                    started_at: new.started_at,
                    ended_at: new.ended_at,
                }
            })
            .collect();
        stored.extend(created.iter().cloned());
        Ok(created)
    }

    async fn list(&self, query: &ReadingQuery) -> Result<Vec<Reading>, AppError> {
        let mut matching: Vec<Reading> = read(&self.readings)
            .iter()
            .filter(|r| query.matches(r))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.started_at.cmp(&a.started_at).then(b.id.cmp(&a.id)));
        if let Some(limit) = query.limit {
            matching.truncate(usize::try_from(limit).unwrap_or(0));
        }
        Ok(matching)
    }

    async fn find(&self, id: ReadingId) -> Result<Option<Reading>, AppError> {
        Ok(read(&self.readings).iter().find(|r| r.id == id).cloned())
    }

    async fn update(&self, reading: &Reading) -> Result<Option<Reading>, AppError> {
        let mut stored = write(&self.readings);
        let Some(slot) = stored.iter_mut().find(|r| r.id == reading.id) else {
            return Ok(None);
        };
        *slot = reading.clone();
        Ok(Some(reading.clone()))
    }

    async fn delete(&self, id: ReadingId) -> Result<bool, AppError> {
        let mut stored = write(&self.readings);
        let before = stored.len();
        stored.retain(|r| r.id != id);
        Ok(stored.len() < before)
    }
}

pub struct MemoryParameterRepository {
    parameters: RwLock<Vec<Parameter>>,
    issued: AtomicUsize,
    clock: SharedClock,
}

impl MemoryParameterRepository {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            parameters: RwLock::new(Vec::new()),
            issued: AtomicUsize::new(0),
            clock,
        }
    }
}

#[async_trait]
impl ParameterRepository for MemoryParameterRepository {
    async fn create(&self, parameter: NewParameter) -> Result<Parameter, AppError> {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst);
        let created = Parameter {
            id: ParameterId::new(next_id(seq)),
            company: parameter.company,
            batch: parameter.batch,
            ideal_temperature: parameter.ideal_temperature,
            ideal_humidity: parameter.ideal_humidity,
            ideal_pressure: parameter.ideal_pressure,
            lumens: parameter.lumens,
            room_id: parameter.room_id,
            egg_stage: parameter.egg_stage,
            created_at: self.clock.now(),
        };
        write(&self.parameters).push(created.clone());
        Ok(created)
    }

    async fn find_by_company_batch(
        &self,
        company: &str,
        batch: &str,
    ) -> Result<Vec<Parameter>, AppError> {
        let mut matching: Vec<Parameter> = read(&self.parameters)
            .iter()
            .filter(|p| p.company == company && p.batch == batch)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(matching)
    }

    async fn find(&self, id: ParameterId) -> Result<Option<Parameter>, AppError> {
        Ok(read(&self.parameters).iter().find(|p| p.id == id).cloned())
    }

    async fn update(&self, parameter: &Parameter) -> Result<Option<Parameter>, AppError> {
        let mut stored = write(&self.parameters);
        let Some(slot) = stored.iter_mut().find(|p| p.id == parameter.id) else {
            return Ok(None);
        };
        *slot = parameter.clone();
        Ok(Some(parameter.clone()))
    }

    async fn delete(&self, id: ParameterId) -> Result<bool, AppError> {
        let mut stored = write(&self.parameters);
        let before = stored.len();
        stored.retain(|p| p.id != id);
        Ok(stored.len() < before)
    }

    async fn companies(&self) -> Result<Vec<String>, AppError> {
        let mut companies: Vec<String> = read(&self.parameters)
            .iter()
            .map(|p| p.company.clone())
            .collect();
        companies.sort();
        companies.dedup();
        Ok(companies)
    }

    async fn batches(&self, company: Option<&str>) -> Result<Vec<String>, AppError> {
        let mut batches: Vec<String> = read(&self.parameters)
            .iter()
            .filter(|p| company.is_none_or(|c| p.company == c))
            .map(|p| p.batch.clone())
            .collect();
        batches.sort();
        batches.dedup();
        Ok(batches)
    }
}

#[derive(Default)]
pub struct MemoryAuditRepository {
    entries: RwLock<Vec<AuditLog>>,
}

impl MemoryAuditRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every entry in insertion order.
    pub fn entries(&self) -> Vec<AuditLog> {
        read(&self.entries).clone()
    }
}

#[async_trait]
impl AuditRepository for MemoryAuditRepository {
    async fn append(&self, entry: NewAuditLog) -> Result<AuditLog, AppError> {
        let mut entries = write(&self.entries);
        let stored = AuditLog {
            id: AuditLogId::new(next_id(entries.len())),
            actor_id: entry.actor_id,
            actor_name: entry.actor_name,
            action: entry.action.as_str().to_string(),
            target_type: entry.target_type,
            target_id: entry.target_id,
            detail: entry.detail,
            ip_address: entry.ip_address,
            status: entry.status,
            occurred_at: entry.occurred_at,
        };
        entries.push(stored.clone());
        Ok(stored)
    }

    async fn query(&self, query: &AuditQuery) -> Result<Vec<AuditLog>, AppError> {
        let mut matching: Vec<AuditLog> = read(&self.entries)
            .iter()
            .filter(|e| query.matches(e))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at).then(b.id.cmp(&a.id)));
        matching.truncate(usize::try_from(query.limit).unwrap_or(0));
        Ok(matching)
    }
}

/// Audit store that rejects every call, counting the attempts.
#[derive(Default)]
pub struct FailingAuditRepository {
    attempts: AtomicUsize,
}

impl FailingAuditRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuditRepository for FailingAuditRepository {
    async fn append(&self, _entry: NewAuditLog) -> Result<AuditLog, AppError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(AppError::database(anyhow!("audit store unavailable")))
    }

    async fn query(&self, _query: &AuditQuery) -> Result<Vec<AuditLog>, AppError> {
        Err(AppError::database(anyhow!("audit store unavailable")))
    }
}

/// Credential store whose every call fails like an unreachable database.
#[derive(Default)]
pub struct FailingUserRepository;

impl FailingUserRepository {
    pub fn new() -> Self {
        Self
    }
}

fn users_down() -> AppError {
    AppError::database(anyhow!("connection refused to users store"))
}

#[async_trait]
impl UserRepository for FailingUserRepository {
    async fn find_by_id(&self, _id: UserId) -> Result<Option<User>, AppError> {
        Err(users_down())
    }

    async fn find_by_username(&self, _username: &str) -> Result<Option<User>, AppError> {
        Err(users_down())
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        Err(users_down())
    }

    async fn create(&self, _user: NewUser) -> Result<User, AppError> {
        Err(users_down())
    }

    async fn update_password(
        &self,
        _id: UserId,
        _password_hash: &str,
    ) -> Result<Option<User>, AppError> {
        Err(users_down())
    }

    async fn set_admin(&self, _id: UserId, _is_admin: bool) -> Result<Option<User>, AppError> {
        Err(users_down())
    }
}

/// Reading store that rejects every call, counting the attempts.
#[derive(Default)]
pub struct FailingReadingRepository {
    attempts: AtomicUsize,
}

impl FailingReadingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    fn fail(&self) -> AppError {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        AppError::database(anyhow!("connection refused to readings store"))
    }
}

#[async_trait]
impl ReadingRepository for FailingReadingRepository {
    async fn create_many(&self, _readings: Vec<NewReading>) -> Result<Vec<Reading>, AppError> {
        Err(self.fail())
    }

    async fn list(&self, _query: &ReadingQuery) -> Result<Vec<Reading>, AppError> {
        Err(self.fail())
    }

    async fn find(&self, _id: ReadingId) -> Result<Option<Reading>, AppError> {
        Err(self.fail())
    }

    async fn update(&self, _reading: &Reading) -> Result<Option<Reading>, AppError> {
        Err(self.fail())
    }

    async fn delete(&self, _id: ReadingId) -> Result<bool, AppError> {
        Err(self.fail())
    }
}
