use crate::models::{MemberWithProfile, Team};
use log::debug;
use moka::sync::Cache;
use std::sync::Arc;
use std::time::Duration;

/// Cached team-detail and team-member views.
///
/// Anything that changes a team's membership or leader must call
/// [`TeamViewCache::invalidate`] before returning, whether it succeeded or not.
#[derive(Clone)]
pub struct TeamViewCache {
    details: Cache<String, Team>,
    members: Cache<String, Arc<Vec<MemberWithProfile>>>,
}

impl TeamViewCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            details: Cache::builder().max_capacity(10_000).time_to_live(ttl).build(),
            members: Cache::builder().max_capacity(10_000).time_to_live(ttl).build(),
        }
    }

    pub fn team(&self, team_id: &str) -> Option<Team> {
        self.details.get(team_id)
    }

    pub fn put_team(&self, team: &Team) {
        self.details.insert(team.id.clone(), team.clone());
    }

    pub fn members(&self, team_id: &str) -> Option<Arc<Vec<MemberWithProfile>>> {
        self.members.get(team_id)
    }

    pub fn put_members(&self, team_id: &str, members: Vec<MemberWithProfile>) -> Arc<Vec<MemberWithProfile>> {
        let members = Arc::new(members);
        self.members.insert(team_id.to_string(), members.clone());
        members
    }

    pub fn invalidate(&self, team_id: &str) {
        debug!("Invalidating cached views for team: {}", team_id);
        self.details.invalidate(team_id);
        self.members.invalidate(team_id);
    }
}
