// hackhub-service/src/services/leadership_transfer.rs
//
// Hands team leadership to another accepted member.
//
// The three writes are independent single-row updates with no transaction
// around them. The leader is demoted before the new one is promoted, so a
// failure in between leaves the team without a leader rather than with two.
// Nothing is rolled back; a failed step reports which steps had already
// committed.
use crate::models::{
    MemberWithProfile, Notification, NotificationDelivery, NotificationKind, ServiceError,
    TeamRole,
};
use crate::services::membership;
use crate::services::notification_service::NotificationService;
use crate::state::AppState;
use crate::utils::store::{Store, StoreError};
use crate::utils::team_lock::TeamLockRegistry;
use crate::utils::view_cache::TeamViewCache;
use derive_more::Display;
use log::{error, info};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum TransferStep {
    #[display(fmt = "demote current leader")]
    DemoteLeader,
    #[display(fmt = "promote selected member")]
    PromoteMember,
    #[display(fmt = "update team owner")]
    UpdateTeamOwner,
}

#[derive(Debug, Display)]
pub enum TransferError {
    #[display(fmt = "Please select a member to transfer leadership to")]
    NoSelection,
    #[display(fmt = "Selected member is no longer eligible for leadership: {}", _0)]
    StaleSelection(String),
    #[display(fmt = "Team not found: {}", _0)]
    TeamNotFound(String),
    #[display(fmt = "User {} is not the leader of this team", _0)]
    NotOwner(String),
    #[display(fmt = "Failed to {}: {}", step, source)]
    StepFailed {
        step: TransferStep,
        completed: Vec<TransferStep>,
        source: StoreError,
    },
    #[display(fmt = "{}", _0)]
    Store(StoreError),
}

impl std::error::Error for TransferError {}

impl From<StoreError> for TransferError {
    fn from(err: StoreError) -> Self {
        TransferError::Store(err)
    }
}

impl From<TransferError> for ServiceError {
    fn from(err: TransferError) -> Self {
        match err {
            TransferError::NoSelection | TransferError::StaleSelection(_) => {
                ServiceError::BadRequest(err.to_string())
            }
            TransferError::TeamNotFound(_) => ServiceError::NotFound,
            TransferError::NotOwner(_) => ServiceError::Forbidden,
            TransferError::StepFailed { .. } => ServiceError::Storage(err.to_string()),
            TransferError::Store(e) => e.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub team_id: String,
    /// User asking for the transfer; must own the team when the lock is held.
    pub requested_by: String,
    pub hackathon_id: String,
    pub member_id: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NewLeader {
    pub member_id: String,
    pub user_id: Option<String>,
    pub email: String,
    pub display_name: String,
}

impl From<&MemberWithProfile> for NewLeader {
    fn from(m: &MemberWithProfile) -> Self {
        Self {
            member_id: m.member.id.clone(),
            user_id: m.member.user_id.clone(),
            email: m.member.email.clone(),
            display_name: m.display_name.clone(),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TransferOutcome {
    pub team_id: String,
    pub new_leader: NewLeader,
    pub demoted: usize,
    pub notification: NotificationDelivery,
}

pub struct LeadershipTransfer<'a> {
    store: &'a Store,
    notifier: &'a NotificationService,
    locks: &'a TeamLockRegistry,
    views: &'a TeamViewCache,
}

impl<'a> LeadershipTransfer<'a> {
    pub fn new(
        store: &'a Store,
        notifier: &'a NotificationService,
        locks: &'a TeamLockRegistry,
        views: &'a TeamViewCache,
    ) -> Self {
        Self {
            store,
            notifier,
            locks,
            views,
        }
    }

    pub fn from_state(state: &'a AppState) -> Self {
        Self::new(&state.store, &state.notifier, &state.locks, &state.views)
    }

    /// Members that can receive leadership right now.
    pub fn candidates(&self, team_id: &str) -> Result<Vec<MemberWithProfile>, StoreError> {
        membership::eligible_members(self.store, team_id)
    }

    pub async fn transfer(&self, request: &TransferRequest) -> Result<TransferOutcome, TransferError> {
        let result = self.run(request).await;
        // Partial completion is possible, so cached views are stale either way
        self.views.invalidate(&request.team_id);
        result
    }

    async fn run(&self, request: &TransferRequest) -> Result<TransferOutcome, TransferError> {
        let member_id = request
            .member_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or(TransferError::NoSelection)?;

        let _guard = self.locks.acquire(&request.team_id).await;

        let team = self
            .store
            .find_team(&request.team_id)?
            .ok_or_else(|| TransferError::TeamNotFound(request.team_id.clone()))?;

        // Ownership may have moved while this request waited on the lock
        if !team.is_owned_by(&request.requested_by) {
            error!(
                "❌ User: {} is no longer the leader of team: {}",
                request.requested_by, team.id
            );
            return Err(TransferError::NotOwner(request.requested_by.clone()));
        }

        let target = self
            .candidates(&team.id)?
            .into_iter()
            .find(|m| m.member.id == member_id)
            .ok_or_else(|| TransferError::StaleSelection(member_id.to_string()))?;

        info!(
            "👑 Transferring leadership of team {} to member {}",
            team.id, target.member.id
        );

        let mut completed = Vec::new();

        let demoted = checked(
            TransferStep::DemoteLeader,
            &completed,
            self.store
                .update_role_where(&team.id, TeamRole::Leader, TeamRole::Member),
        )?;
        completed.push(TransferStep::DemoteLeader);

        checked(
            TransferStep::PromoteMember,
            &completed,
            self.store.update_member_role(&target.member.id, TeamRole::Leader),
        )?;
        completed.push(TransferStep::PromoteMember);

        checked(
            TransferStep::UpdateTeamOwner,
            &completed,
            self.store
                .update_team_owner(&team.id, target.member.user_id.as_deref()),
        )?;

        let notification = self
            .notifier
            .notify(target.member.user_id.as_deref(), |user_id| {
                Notification::new(
                    user_id,
                    NotificationKind::LeadershipTransferred,
                    "🎉 You're the new team leader!",
                    &format!("You are now the leader of {}.", team.name),
                )
                .with_meta("team_id", team.id.clone())
                .with_meta("hackathon_id", request.hackathon_id.clone())
            })
            .await;

        info!(
            "✅ Leadership of team {} transferred to {} ({} demoted)",
            team.id, target.display_name, demoted
        );

        Ok(TransferOutcome {
            team_id: team.id.clone(),
            new_leader: NewLeader::from(&target),
            demoted,
            notification,
        })
    }
}

fn checked<T>(
    step: TransferStep,
    completed: &[TransferStep],
    result: Result<T, StoreError>,
) -> Result<T, TransferError> {
    result.map_err(|source| {
        error!(
            "❌ Leadership transfer aborted at '{}' after {:?}: {}",
            step, completed, source
        );
        TransferError::StepFailed {
            step,
            completed: completed.to_vec(),
            source,
        }
    })
}
