// hackhub-service/src/utils/store.rs
//
// Typed record storage. Every operation reads or writes a single row, so a
// row write is atomic but nothing spans several rows.
use crate::models::{
    Application, ApplicationStatus, Hackathon, Notification, Profile, ServiceError, Team,
    TeamMember, TeamRole, User,
};
use derive_more::Display;
use log::{error, warn};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

pub const USERS: &str = "users";
pub const PROFILES: &str = "profiles";
pub const HACKATHONS: &str = "hackathons";
pub const TEAMS: &str = "teams";
pub const TEAM_MEMBERS: &str = "team_members";
pub const APPLICATIONS: &str = "applications";
pub const NOTIFICATIONS: &str = "notifications";

lazy_static::lazy_static! {
    static ref ROW_KEY: Regex = Regex::new(r"^[A-Za-z0-9_-]{1,128}$").unwrap();
}

#[derive(Debug, Display, Clone, PartialEq)]
pub enum StoreError {
    #[display(fmt = "storage backend error: {}", _0)]
    Backend(String),
    #[display(fmt = "malformed record: {}", _0)]
    Serialization(String),
    #[display(fmt = "{} row not found: {}", table, id)]
    NotFound { table: String, id: String },
    #[display(fmt = "invalid row key: {}", _0)]
    InvalidKey(String),
}

impl std::error::Error for StoreError {}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => ServiceError::NotFound,
            StoreError::InvalidKey(key) => {
                ServiceError::BadRequest(format!("Invalid identifier: {}", key))
            }
            other => {
                error!("❌ Storage failure: {}", other);
                ServiceError::Storage(other.to_string())
            }
        }
    }
}

/// Raw row access keyed by table name and row id.
pub trait TableBackend: Send + Sync {
    fn read_row(&self, table: &str, id: &str) -> Result<Option<Value>, StoreError>;
    fn write_row(&self, table: &str, id: &str, row: &Value) -> Result<(), StoreError>;
    fn delete_row(&self, table: &str, id: &str) -> Result<bool, StoreError>;
    fn scan(&self, table: &str) -> Result<Vec<Value>, StoreError>;
}

#[derive(Clone)]
pub struct Store {
    backend: Arc<dyn TableBackend>,
}

impl Store {
    pub fn new(backend: Arc<dyn TableBackend>) -> Self {
        Self { backend }
    }

    pub fn memory() -> Self {
        Self::new(Arc::new(super::memory_backend::MemoryBackend::new()))
    }

    fn check_key(id: &str) -> Result<(), StoreError> {
        if ROW_KEY.is_match(id) {
            Ok(())
        } else {
            Err(StoreError::InvalidKey(id.to_string()))
        }
    }

    fn get<T: DeserializeOwned>(&self, table: &str, id: &str) -> Result<Option<T>, StoreError> {
        Self::check_key(id)?;
        match self.backend.read_row(table, id)? {
            Some(row) => serde_json::from_value(row)
                .map(Some)
                .map_err(|e| StoreError::Serialization(e.to_string())),
            None => Ok(None),
        }
    }

    fn put<T: Serialize>(&self, table: &str, id: &str, record: &T) -> Result<(), StoreError> {
        Self::check_key(id)?;
        let row = serde_json::to_value(record).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.backend.write_row(table, id, &row)
    }

    fn remove(&self, table: &str, id: &str) -> Result<bool, StoreError> {
        Self::check_key(id)?;
        self.backend.delete_row(table, id)
    }

    // Equality filters are expressed as a predicate over the typed row
    fn select<T, F>(&self, table: &str, filter: F) -> Result<Vec<T>, StoreError>
    where
        T: DeserializeOwned,
        F: Fn(&T) -> bool,
    {
        let mut rows = Vec::new();
        for raw in self.backend.scan(table)? {
            match serde_json::from_value::<T>(raw) {
                Ok(row) if filter(&row) => rows.push(row),
                Ok(_) => {}
                Err(e) => warn!("Skipping malformed row in {}: {:?}", table, e),
            }
        }
        Ok(rows)
    }

    fn update<T, F>(&self, table: &str, id: &str, apply: F) -> Result<T, StoreError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut T),
    {
        let mut record: T = self.get(table, id)?.ok_or_else(|| StoreError::NotFound {
            table: table.to_string(),
            id: id.to_string(),
        })?;
        apply(&mut record);
        self.put(table, id, &record)?;
        Ok(record)
    }

    // Users

    pub fn save_user(&self, user: &User) -> Result<(), StoreError> {
        self.put(USERS, &user.id, user)
    }

    pub fn find_user_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        self.get(USERS, id)
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let email = email.to_lowercase();
        Ok(self
            .select::<User, _>(USERS, |u| u.email.to_lowercase() == email)?
            .into_iter()
            .next())
    }

    // Profiles

    pub fn save_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        self.put(PROFILES, &profile.user_id, profile)
    }

    pub fn find_profile(&self, user_id: &str) -> Result<Option<Profile>, StoreError> {
        self.get(PROFILES, user_id)
    }

    pub fn find_profiles(&self, user_ids: &[String]) -> Result<Vec<Profile>, StoreError> {
        self.select(PROFILES, |p: &Profile| user_ids.contains(&p.user_id))
    }

    // Hackathons

    pub fn save_hackathon(&self, hackathon: &Hackathon) -> Result<(), StoreError> {
        self.put(HACKATHONS, &hackathon.id, hackathon)
    }

    pub fn find_hackathon(&self, id: &str) -> Result<Option<Hackathon>, StoreError> {
        self.get(HACKATHONS, id)
    }

    // Teams

    pub fn save_team(&self, team: &Team) -> Result<(), StoreError> {
        self.put(TEAMS, &team.id, team)
    }

    pub fn find_team(&self, id: &str) -> Result<Option<Team>, StoreError> {
        self.get(TEAMS, id)
    }

    /// Teams where the user holds an accepted membership.
    pub fn teams_for_user(&self, user_id: &str) -> Result<Vec<Team>, StoreError> {
        let mut teams = Vec::new();
        for membership in self.memberships_for_user(user_id)? {
            if let Some(team) = self.find_team(&membership.team_id)? {
                teams.push(team);
            }
        }
        teams.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(teams)
    }

    pub fn update_team_owner(&self, team_id: &str, owner_id: Option<&str>) -> Result<Team, StoreError> {
        self.update(TEAMS, team_id, |team: &mut Team| {
            team.owner_id = owner_id.map(str::to_string)
        })
    }

    pub fn delete_team(&self, team_id: &str) -> Result<bool, StoreError> {
        self.remove(TEAMS, team_id)
    }

    // Team members

    pub fn insert_member(&self, member: &TeamMember) -> Result<(), StoreError> {
        self.put(TEAM_MEMBERS, &member.id, member)
    }

    pub fn find_member(&self, member_id: &str) -> Result<Option<TeamMember>, StoreError> {
        self.get(TEAM_MEMBERS, member_id)
    }

    /// All rows for a team, pending invites included, oldest first.
    pub fn list_members(&self, team_id: &str) -> Result<Vec<TeamMember>, StoreError> {
        let mut members = self.select(TEAM_MEMBERS, |m: &TeamMember| m.team_id == team_id)?;
        members.sort_by(|a, b| a.invited_at.cmp(&b.invited_at));
        Ok(members)
    }

    pub fn memberships_for_user(&self, user_id: &str) -> Result<Vec<TeamMember>, StoreError> {
        self.select(TEAM_MEMBERS, |m: &TeamMember| {
            m.accepted && m.user_id.as_deref() == Some(user_id)
        })
    }

    pub fn pending_invitations_for_email(&self, email: &str) -> Result<Vec<TeamMember>, StoreError> {
        let email = email.to_lowercase();
        self.select(TEAM_MEMBERS, |m: &TeamMember| {
            !m.accepted && m.email.to_lowercase() == email
        })
    }

    /// Sets `to` on every row of the team currently holding `from`.
    /// Rows are written one by one; returns how many were changed.
    pub fn update_role_where(
        &self,
        team_id: &str,
        from: TeamRole,
        to: TeamRole,
    ) -> Result<usize, StoreError> {
        let matching = self.select(TEAM_MEMBERS, |m: &TeamMember| {
            m.team_id == team_id && m.role == from
        })?;
        for mut member in matching.iter().cloned() {
            member.role = to;
            self.put(TEAM_MEMBERS, &member.id, &member)?;
        }
        Ok(matching.len())
    }

    pub fn update_member_role(&self, member_id: &str, role: TeamRole) -> Result<TeamMember, StoreError> {
        self.update(TEAM_MEMBERS, member_id, |m: &mut TeamMember| m.role = role)
    }

    pub fn accept_member(&self, member_id: &str, user_id: &str) -> Result<TeamMember, StoreError> {
        self.update(TEAM_MEMBERS, member_id, |m: &mut TeamMember| {
            m.accepted = true;
            m.user_id = Some(user_id.to_string());
            m.joined_at = Some(chrono::Utc::now());
        })
    }

    pub fn delete_member(&self, member_id: &str) -> Result<bool, StoreError> {
        self.remove(TEAM_MEMBERS, member_id)
    }

    pub fn delete_team_members(&self, team_id: &str) -> Result<usize, StoreError> {
        let mut deleted = 0;
        for member in self.list_members(team_id)? {
            if self.delete_member(&member.id)? {
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    // Applications

    pub fn save_application(&self, application: &Application) -> Result<(), StoreError> {
        self.put(APPLICATIONS, &application.id, application)
    }

    pub fn find_application(&self, id: &str) -> Result<Option<Application>, StoreError> {
        self.get(APPLICATIONS, id)
    }

    pub fn applications_for_hackathon(&self, hackathon_id: &str) -> Result<Vec<Application>, StoreError> {
        let mut applications =
            self.select(APPLICATIONS, |a: &Application| a.hackathon_id == hackathon_id)?;
        applications.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at));
        Ok(applications)
    }

    pub fn application_for_team(&self, team_id: &str) -> Result<Option<Application>, StoreError> {
        Ok(self
            .select::<Application, _>(APPLICATIONS, |a| a.team_id == team_id)?
            .into_iter()
            .next())
    }

    pub fn update_application_status(
        &self,
        id: &str,
        status: ApplicationStatus,
        reviewer_id: &str,
    ) -> Result<Application, StoreError> {
        self.update(APPLICATIONS, id, |a: &mut Application| {
            a.status = status;
            a.reviewed_at = Some(chrono::Utc::now());
            a.reviewed_by = Some(reviewer_id.to_string());
        })
    }

    pub fn delete_team_applications(&self, team_id: &str) -> Result<usize, StoreError> {
        let mut deleted = 0;
        for application in self.select::<Application, _>(APPLICATIONS, |a| a.team_id == team_id)? {
            if self.remove(APPLICATIONS, &application.id)? {
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    // Notifications

    pub fn insert_notification(&self, notification: &Notification) -> Result<(), StoreError> {
        self.put(NOTIFICATIONS, &notification.id, notification)
    }

    /// Newest first.
    pub fn notifications_for_user(&self, user_id: &str) -> Result<Vec<Notification>, StoreError> {
        let mut notifications =
            self.select(NOTIFICATIONS, |n: &Notification| n.user_id == user_id)?;
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notifications)
    }

    pub fn mark_notification_read(&self, id: &str, user_id: &str) -> Result<bool, StoreError> {
        match self.get::<Notification>(NOTIFICATIONS, id)? {
            Some(n) if n.user_id == user_id => {
                self.update(NOTIFICATIONS, id, |n: &mut Notification| n.read = true)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
