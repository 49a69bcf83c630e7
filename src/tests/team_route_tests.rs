use super::support::{TestContext, TransferScenario};
use crate::models::{NotificationKind, TeamRole};
use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::{json, Value};

#[actix_rt::test]
async fn create_team_makes_caller_leader() {
    let ctx = TestContext::new();
    let (organizer, _) = ctx.user("org@example.com", "Org");
    let (_, token) = ctx.user("ada@example.com", "Ada Lovelace");
    let hackathon = ctx.hackathon(&organizer);
    let app = test_app!(ctx.state);

    let req = test::TestRequest::post()
        .uri(&format!("/hackathons/{}/teams", hackathon.id))
        .insert_header(("Authorization", token.clone()))
        .set_json(json!({ "name": "  Analytical Engines  " }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let team: Value = test::read_body_json(resp).await;
    assert_eq!(team["name"], "Analytical Engines");

    let team_id = team["id"].as_str().unwrap();
    let leaders = ctx.accepted_leaders(team_id);
    assert_eq!(leaders.len(), 1);
    assert_eq!(leaders[0].email, "ada@example.com");

    // One team per hackathon
    let req = test::TestRequest::post()
        .uri(&format!("/hackathons/{}/teams", hackathon.id))
        .insert_header(("Authorization", token))
        .set_json(json!({ "name": "Second" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_rt::test]
async fn requests_without_token_are_unauthorized() {
    let s = TransferScenario::new();
    let app = test_app!(s.ctx.state);

    let req = test::TestRequest::get().uri("/teams").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/teams")
        .insert_header(("Authorization", "Bearer not-a-jwt"))
        .to_request();
    let status = match test::try_call_service(&app, req).await {
        Ok(resp) => resp.status(),
        Err(err) => err.error_response().status(),
    };
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn leader_transfers_leadership_over_http() {
    let s = TransferScenario::new();
    let app = test_app!(s.ctx.state);

    // Warm the member view so the transfer has something to invalidate
    let req = test::TestRequest::get()
        .uri(&format!("/teams/{}/members", s.team.id))
        .insert_header(("Authorization", s.leader_token.clone()))
        .to_request();
    let members: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(members.as_array().unwrap().len(), 2);

    let req = test::TestRequest::post()
        .uri(&format!("/teams/{}/leadership", s.team.id))
        .insert_header(("Authorization", s.leader_token.clone()))
        .set_json(json!({ "member_id": s.member.id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Milo Member is now the team leader");
    assert_eq!(body["new_leader"]["user_id"], Value::String(s.member_user.id.clone()));
    assert_eq!(body["notification"]["status"], "delivered");

    let req = test::TestRequest::get()
        .uri(&format!("/teams/{}/members", s.team.id))
        .insert_header(("Authorization", s.member_token.clone()))
        .to_request();
    let members: Value = test::call_and_read_body_json(&app, req).await;
    let leader = members
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["role"] == "leader")
        .unwrap();
    assert_eq!(leader["id"], Value::String(s.member.id.clone()));
    assert_eq!(leader["display_name"], "Milo Member");

    // The former leader has lost owner rights
    let req = test::TestRequest::post()
        .uri(&format!("/teams/{}/leadership", s.team.id))
        .insert_header(("Authorization", s.leader_token.clone()))
        .set_json(json!({ "member_id": s.leader.id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_rt::test]
async fn only_owner_may_transfer() {
    let s = TransferScenario::new();
    let app = test_app!(s.ctx.state);

    let req = test::TestRequest::post()
        .uri(&format!("/teams/{}/leadership", s.team.id))
        .insert_header(("Authorization", s.member_token.clone()))
        .set_json(json!({ "member_id": s.member.id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(s.ctx.backend.attempts().is_empty());
}

#[actix_rt::test]
async fn queued_transfer_from_former_leader_is_refused() {
    let s = TransferScenario::new();
    let (second_user, _) = s.ctx.user("second@example.com", "Sam Second");
    let second = s.ctx.accepted_member(&s.team, &second_user);
    let app = test_app!(s.ctx.state);

    let transfer_to = |member_id: &str| {
        test::TestRequest::post()
            .uri(&format!("/teams/{}/leadership", s.team.id))
            .insert_header(("Authorization", s.leader_token.clone()))
            .set_json(json!({ "member_id": member_id }))
            .to_request()
    };

    // Both requests pass the route's owner check, then queue on the team lock
    let guard = s.ctx.state.locks.acquire(&s.team.id).await;
    let release = async move {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        drop(guard);
    };
    let (first, other, _) = futures::join!(
        test::call_service(&app, transfer_to(&s.member.id)),
        test::call_service(&app, transfer_to(&second.id)),
        release
    );

    let mut statuses = vec![first.status(), other.status()];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::OK, StatusCode::FORBIDDEN]);

    let winner = if first.status() == StatusCode::OK {
        (&s.member, &s.member_user)
    } else {
        (&second, &second_user)
    };
    let team = s.ctx.store().find_team(&s.team.id).unwrap().unwrap();
    assert_eq!(team.owner_id.as_deref(), Some(winner.1.id.as_str()));
    let leaders = s.ctx.accepted_leaders(&s.team.id);
    assert_eq!(leaders.len(), 1);
    assert_eq!(leaders[0].id, winner.0.id);
}

#[actix_rt::test]
async fn transfer_without_selection_is_bad_request() {
    let s = TransferScenario::new();
    let app = test_app!(s.ctx.state);

    let req = test::TestRequest::post()
        .uri(&format!("/teams/{}/leadership", s.team.id))
        .insert_header(("Authorization", s.leader_token.clone()))
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(s.ctx.backend.attempts().is_empty());
}

#[actix_rt::test]
async fn failed_transfer_step_is_a_server_error() {
    let s = TransferScenario::new();
    s.ctx
        .backend
        .fail_writes(crate::utils::store::TEAMS, None, |_| true);
    let app = test_app!(s.ctx.state);

    let req = test::TestRequest::post()
        .uri(&format!("/teams/{}/leadership", s.team.id))
        .insert_header(("Authorization", s.leader_token.clone()))
        .set_json(json!({ "member_id": s.member.id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("update team owner"));
}

#[actix_rt::test]
async fn candidates_endpoint_lists_eligible_members() {
    let s = TransferScenario::new();
    let app = test_app!(s.ctx.state);

    let req = test::TestRequest::get()
        .uri(&format!("/teams/{}/leadership/candidates", s.team.id))
        .insert_header(("Authorization", s.leader_token.clone()))
        .to_request();
    let candidates: Value = test::call_and_read_body_json(&app, req).await;
    let candidates = candidates.as_array().unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0]["id"], Value::String(s.member.id.clone()));
    assert_eq!(candidates[0]["profile"]["full_name"], "Milo Member");
}

#[actix_rt::test]
async fn leader_removes_member_and_member_is_told() {
    let s = TransferScenario::new();
    let app = test_app!(s.ctx.state);

    let req = test::TestRequest::delete()
        .uri(&format!("/teams/{}/members/{}", s.team.id, s.member.id))
        .insert_header(("Authorization", s.leader_token.clone()))
        .set_json(json!({ "reason": "Inactive" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    assert!(s.ctx.store().find_member(&s.member.id).unwrap().is_none());
    let notifications = s.ctx.store().notifications_for_user(&s.member_user.id).unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, NotificationKind::MemberRemoved);

    let sent = s.ctx.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, vec!["member@example.com".to_string()]);
    assert!(sent[0].html.contains("Inactive"));
}

#[actix_rt::test]
async fn member_can_leave_but_not_remove_others() {
    let s = TransferScenario::new();
    let (third_user, _) = s.ctx.user("third@example.com", "Theo Third");
    let third = s.ctx.accepted_member(&s.team, &third_user);
    let app = test_app!(s.ctx.state);

    let req = test::TestRequest::delete()
        .uri(&format!("/teams/{}/members/{}", s.team.id, third.id))
        .insert_header(("Authorization", s.member_token.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::delete()
        .uri(&format!("/teams/{}/members/{}", s.team.id, s.member.id))
        .insert_header(("Authorization", s.member_token.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Leaving is silent
    assert!(s.ctx.mailer.sent().is_empty());
    assert!(s
        .ctx
        .store()
        .notifications_for_user(&s.member_user.id)
        .unwrap()
        .is_empty());
}

#[actix_rt::test]
async fn leader_row_cannot_be_removed() {
    let s = TransferScenario::new();
    let app = test_app!(s.ctx.state);

    let req = test::TestRequest::delete()
        .uri(&format!("/teams/{}/members/{}", s.team.id, s.leader.id))
        .insert_header(("Authorization", s.leader_token.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let leader = s.ctx.store().find_member(&s.leader.id).unwrap().unwrap();
    assert_eq!(leader.role, TeamRole::Leader);
}

#[actix_rt::test]
async fn deleting_team_removes_its_rows() {
    let s = TransferScenario::new();
    let app = test_app!(s.ctx.state);

    let req = test::TestRequest::delete()
        .uri(&format!("/teams/{}", s.team.id))
        .insert_header(("Authorization", s.member_token.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::delete()
        .uri(&format!("/teams/{}", s.team.id))
        .insert_header(("Authorization", s.leader_token.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    assert!(s.ctx.store().find_team(&s.team.id).unwrap().is_none());
    assert!(s.ctx.store().list_members(&s.team.id).unwrap().is_empty());
}
