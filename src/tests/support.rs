use crate::config::AppConfig;
use crate::models::{Hackathon, OutgoingEmail, Profile, Team, TeamMember, TeamRole, User};
use crate::services::email_service::{EmailError, EmailSender};
use crate::state::AppState;
use crate::utils::jwt;
use crate::utils::memory_backend::MemoryBackend;
use crate::utils::store::{Store, StoreError, TableBackend};
use actix_web::web;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

type RowPredicate = Box<dyn Fn(&Value) -> bool + Send + Sync>;

struct FailRule {
    table: String,
    remaining: Option<u32>,
    predicate: RowPredicate,
}

/// Memory tables that log every write attempt and can be told to fail some.
#[derive(Default)]
pub struct FaultyBackend {
    inner: MemoryBackend,
    attempts: Mutex<Vec<(String, Value)>>,
    rules: Mutex<Vec<FailRule>>,
}

impl FaultyBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Fail writes to `table` whose row matches; `times: None` fails forever.
    pub fn fail_writes<F>(&self, table: &str, times: Option<u32>, predicate: F)
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.rules.lock().unwrap().push(FailRule {
            table: table.to_string(),
            remaining: times,
            predicate: Box::new(predicate),
        });
    }

    pub fn attempts(&self) -> Vec<(String, Value)> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn attempts_on(&self, table: &str) -> usize {
        self.attempts().iter().filter(|(t, _)| t == table).count()
    }

    pub fn clear_log(&self) {
        self.attempts.lock().unwrap().clear();
    }

    fn injected_failure(&self, table: &str, row: &Value) -> bool {
        let mut rules = self.rules.lock().unwrap();
        for rule in rules.iter_mut() {
            if rule.table != table || rule.remaining == Some(0) || !(rule.predicate)(row) {
                continue;
            }
            if let Some(n) = rule.remaining.as_mut() {
                *n -= 1;
            }
            return true;
        }
        false
    }
}

impl TableBackend for FaultyBackend {
    fn read_row(&self, table: &str, id: &str) -> Result<Option<Value>, StoreError> {
        self.inner.read_row(table, id)
    }

    fn write_row(&self, table: &str, id: &str, row: &Value) -> Result<(), StoreError> {
        self.attempts.lock().unwrap().push((table.to_string(), row.clone()));
        if self.injected_failure(table, row) {
            return Err(StoreError::Backend(format!("injected failure writing {}/{}", table, id)));
        }
        self.inner.write_row(table, id, row)
    }

    fn delete_row(&self, table: &str, id: &str) -> Result<bool, StoreError> {
        self.attempts.lock().unwrap().push((table.to_string(), Value::Null));
        self.inner.delete_row(table, id)
    }

    fn scan(&self, table: &str) -> Result<Vec<Value>, StoreError> {
        self.inner.scan(table)
    }
}

/// Records outgoing email instead of sending it.
#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<OutgoingEmail>>,
    failing: AtomicBool,
}

impl RecordingSender {
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl EmailSender for RecordingSender {
    async fn send(&self, email: &OutgoingEmail) -> Result<Value, EmailError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(EmailError::SendFailed("provider unavailable".to_string()));
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(email.clone());
        Ok(json!({ "id": format!("test-email-{}", sent.len()) }))
    }
}

pub struct TestContext {
    pub state: web::Data<AppState>,
    pub backend: Arc<FaultyBackend>,
    pub mailer: Arc<RecordingSender>,
}

impl TestContext {
    pub fn new() -> Self {
        let backend = FaultyBackend::new();
        let mailer = Arc::new(RecordingSender::default());
        let state = AppState::new(
            AppConfig::for_tests(),
            Store::new(backend.clone()),
            mailer.clone(),
        );
        Self {
            state: web::Data::new(state),
            backend,
            mailer,
        }
    }

    pub fn store(&self) -> &Store {
        &self.state.store
    }

    /// A registered user with a profile, plus a bearer header for them.
    pub fn user(&self, email: &str, full_name: &str) -> (User, String) {
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.to_string(),
            password_hash: String::new(),
            created_at: Utc::now(),
        };
        self.store().save_user(&user).unwrap();
        self.store()
            .save_profile(&Profile {
                user_id: user.id.clone(),
                full_name: full_name.to_string(),
                avatar_url: None,
                updated_at: Utc::now(),
            })
            .unwrap();
        let token = jwt::generate_token(&user, &self.state.config.jwt_secret, 1).unwrap();
        (user, format!("Bearer {}", token))
    }

    pub fn hackathon(&self, organizer: &User) -> Hackathon {
        let hackathon = Hackathon {
            id: uuid::Uuid::new_v4().to_string(),
            name: "Rust Jam".to_string(),
            organizer_id: organizer.id.clone(),
            created_at: Utc::now(),
        };
        self.store().save_hackathon(&hackathon).unwrap();
        hackathon
    }

    pub fn team(&self, hackathon: &Hackathon, leader: &User) -> (Team, TeamMember) {
        let team = Team {
            id: uuid::Uuid::new_v4().to_string(),
            name: "Borrow Checkers".to_string(),
            hackathon_id: hackathon.id.clone(),
            owner_id: Some(leader.id.clone()),
            created_at: Utc::now(),
        };
        self.store().save_team(&team).unwrap();
        let leader_row = TeamMember::founding_leader(&team.id, &leader.id, &leader.email);
        self.store().insert_member(&leader_row).unwrap();
        (team, leader_row)
    }

    pub fn accepted_member(&self, team: &Team, user: &User) -> TeamMember {
        let mut member = TeamMember::invited(&team.id, &user.email, Some(user.id.clone()));
        member.accepted = true;
        member.joined_at = Some(Utc::now());
        self.store().insert_member(&member).unwrap();
        member
    }

    pub fn accepted_leaders(&self, team_id: &str) -> Vec<TeamMember> {
        self.store()
            .list_members(team_id)
            .unwrap()
            .into_iter()
            .filter(|m| m.accepted && m.role == TeamRole::Leader)
            .collect()
    }
}

/// Team T with leader L and accepted member M (user U), as used by the
/// leadership transfer scenarios. The write log starts empty.
pub struct TransferScenario {
    pub ctx: TestContext,
    pub hackathon: Hackathon,
    pub team: Team,
    pub leader_user: User,
    pub leader_token: String,
    pub leader: TeamMember,
    pub member_user: User,
    pub member_token: String,
    pub member: TeamMember,
}

impl TransferScenario {
    pub fn new() -> Self {
        let ctx = TestContext::new();
        let (organizer, _) = ctx.user("organizer@example.com", "Olive Organizer");
        let (leader_user, leader_token) = ctx.user("leader@example.com", "Lena Leader");
        let (member_user, member_token) = ctx.user("member@example.com", "Milo Member");
        let hackathon = ctx.hackathon(&organizer);
        let (team, leader) = ctx.team(&hackathon, &leader_user);
        let member = ctx.accepted_member(&team, &member_user);
        ctx.backend.clear_log();

        Self {
            ctx,
            hackathon,
            team,
            leader_user,
            leader_token,
            leader,
            member_user,
            member_token,
            member,
        }
    }
}
