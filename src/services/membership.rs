// hackhub-service/src/services/membership.rs
use crate::models::{MemberWithProfile, Profile, TeamMember, TeamRole};
use crate::utils::get_username_from_email;
use crate::utils::store::{Store, StoreError};
use std::collections::HashMap;

pub fn display_name(member: &TeamMember, profile: Option<&Profile>) -> String {
    match profile {
        Some(profile) if !profile.full_name.trim().is_empty() => profile.full_name.clone(),
        _ => get_username_from_email(&member.email),
    }
}

/// Joins members to profiles by user id. Members without an account or
/// without a profile row get `profile: None`.
pub fn join_profiles(members: Vec<TeamMember>, profiles: Vec<Profile>) -> Vec<MemberWithProfile> {
    let mut by_user: HashMap<String, Profile> = profiles
        .into_iter()
        .map(|p| (p.user_id.clone(), p))
        .collect();

    members
        .into_iter()
        .map(|member| {
            let profile = member.user_id.as_ref().and_then(|id| by_user.remove(id));
            MemberWithProfile {
                display_name: display_name(&member, profile.as_ref()),
                member,
                profile,
            }
        })
        .collect()
}

pub fn members_with_profiles(store: &Store, team_id: &str) -> Result<Vec<MemberWithProfile>, StoreError> {
    let members = store.list_members(team_id)?;
    let user_ids: Vec<String> = members.iter().filter_map(|m| m.user_id.clone()).collect();
    let profiles = store.find_profiles(&user_ids)?;
    Ok(join_profiles(members, profiles))
}

pub fn is_eligible_for_leadership(member: &TeamMember) -> bool {
    member.accepted && member.role != TeamRole::Leader
}

/// Accepted non-leader members, read fresh from the store.
pub fn eligible_members(store: &Store, team_id: &str) -> Result<Vec<MemberWithProfile>, StoreError> {
    Ok(members_with_profiles(store, team_id)?
        .into_iter()
        .filter(|m| is_eligible_for_leadership(&m.member))
        .collect())
}

pub fn accepted_membership(
    store: &Store,
    team_id: &str,
    user_id: &str,
) -> Result<Option<TeamMember>, StoreError> {
    Ok(store
        .list_members(team_id)?
        .into_iter()
        .find(|m| m.accepted && m.user_id.as_deref() == Some(user_id)))
}
