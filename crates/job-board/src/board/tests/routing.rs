use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use super::common::*;
use crate::board::domain::Role;

#[tokio::test]
async fn register_route_returns_user_and_token() {
    let (board, _) = build_board();
    let (router, tokens) = router_for(board);

    let response = router
        .oneshot(json_request(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({
                "name": "Ada",
                "email": "ada@example.com",
                "password": "analytical",
                "phone": "555-0100-22",
                "role": "seeker"
            })),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json_body(response).await;
    assert_eq!(body["user"]["email"], json!("ada@example.com"));
    assert!(body["user"].get("passwordHash").is_none());
    let token = body["token"].as_str().expect("token string");
    let claims = tokens.verify(token).expect("token verifies");
    assert_eq!(claims.sub, body["user"]["id"].as_str().expect("id"));
}

#[tokio::test]
async fn malformed_json_is_a_validation_error() {
    let (board, _) = build_board();
    let (router, _) = router_for(board);

    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/auth/login")
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from("{not json"))
        .expect("request");
    let response = router.oneshot(request).await.expect("router responds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json_body(response).await;
    assert!(body["fields"].is_array());
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let (board, _) = build_board();
    let (router, _) = router_for(board);

    let missing = router
        .clone()
        .oneshot(json_request(Method::GET, "/seeker/view-jobs", None, None))
        .await
        .expect("router responds");
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let forged = router
        .oneshot(json_request(
            Method::GET,
            "/seeker/view-jobs",
            Some("Bearer not-a-token"),
            None,
        ))
        .await
        .expect("router responds");
    assert_eq!(forged.status(), StatusCode::UNAUTHORIZED);
    let body = read_json_body(forged).await;
    assert_eq!(body["error"], json!("invalid token"));
}

#[tokio::test]
async fn roles_are_gated_per_route() {
    let (board, store) = build_board();
    let seeker = seed_user(&*store, "Ada", Role::Seeker);
    let employer = seed_user(&*store, "Wile", Role::Employer);
    let admin = seed_user(&*store, "Ops", Role::Admin);
    let (router, tokens) = router_for(board);

    let cases = [
        (Method::POST, "/employer/create-job", bearer(&tokens, &seeker)),
        (Method::GET, "/seeker/saved-jobs", bearer(&tokens, &employer)),
        (Method::GET, "/admin/statistics", bearer(&tokens, &employer)),
        (Method::GET, "/admin/getAllUsers", bearer(&tokens, &admin)),
    ];
    for (method, uri, token) in cases {
        let body = (method == Method::POST).then(|| json!({}));
        let response = router
            .clone()
            .oneshot(json_request(method, uri, Some(token.as_str()), body))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{uri}");
    }
}

#[tokio::test]
async fn apply_flow_over_http() {
    let (board, _) = build_board();
    let (employer, _) = employer_with_profile(&board, "Wile", "Acme");
    let (seeker, profile) = seeker_with_profile(&board, "Ada");
    let job = post_job(&board, &employer, "Backend Engineer");
    let (router, tokens) = router_for(board);
    let seeker_token = bearer(&tokens, &seeker);
    let employer_token = bearer(&tokens, &employer);

    let apply_uri = format!("/seeker/apply/{}", job.id);
    let applied = router
        .clone()
        .oneshot(json_request(Method::POST, &apply_uri, Some(seeker_token.as_str()), None))
        .await
        .expect("router responds");
    assert_eq!(applied.status(), StatusCode::OK);
    let body = read_json_body(applied).await;
    assert_eq!(body["message"], json!("Job applied successfully"));

    let again = router
        .clone()
        .oneshot(json_request(Method::POST, &apply_uri, Some(seeker_token.as_str()), None))
        .await
        .expect("router responds");
    assert_eq!(again.status(), StatusCode::BAD_REQUEST);

    let status_uri = format!("/employer/{}/applicants/{}/status", job.id, profile.id);
    let invalid = router
        .clone()
        .oneshot(json_request(
            Method::PUT,
            &status_uri,
            Some(employer_token.as_str()),
            Some(json!({ "status": "hired" })),
        ))
        .await
        .expect("router responds");
    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

    let updated = router
        .clone()
        .oneshot(json_request(
            Method::PUT,
            &status_uri,
            Some(employer_token.as_str()),
            Some(json!({ "status": "accepted" })),
        ))
        .await
        .expect("router responds");
    assert_eq!(updated.status(), StatusCode::OK);
    let body = read_json_body(updated).await;
    assert_eq!(body["message"], json!("Status updated"));
    assert_eq!(body["job"]["applications"][0]["status"], json!("accepted"));

    let applied_jobs = router
        .clone()
        .oneshot(json_request(
            Method::GET,
            "/seeker/applied-jobs",
            Some(seeker_token.as_str()),
            None,
        ))
        .await
        .expect("router responds");
    let body = read_json_body(applied_jobs).await;
    assert_eq!(body[0]["id"], json!(job.id.as_str()));
    assert_eq!(body[0]["status"], json!("applied"));

    let applicants = router
        .oneshot(json_request(
            Method::GET,
            &format!("/employer/{}/applicants", job.id),
            Some(employer_token.as_str()),
            None,
        ))
        .await
        .expect("router responds");
    let body = read_json_body(applicants).await;
    assert_eq!(body[0]["seeker"]["user"]["name"], json!("Ada"));
}

#[tokio::test]
async fn other_employers_cannot_touch_a_job() {
    let (board, _) = build_board();
    let (owner, _) = employer_with_profile(&board, "Wile", "Acme");
    let (rival, _) = employer_with_profile(&board, "Hank", "Globex");
    let job = post_job(&board, &owner, "Backend Engineer");
    let (router, tokens) = router_for(board);
    let rival_token = bearer(&tokens, &rival);

    let update = router
        .clone()
        .oneshot(json_request(
            Method::PUT,
            &format!("/employer/update-job/{}", job.id),
            Some(rival_token.as_str()),
            Some(json!({ "title": "Hijacked" })),
        ))
        .await
        .expect("router responds");
    assert_eq!(update.status(), StatusCode::FORBIDDEN);

    let delete = router
        .oneshot(json_request(
            Method::DELETE,
            &format!("/employer/delete-job/{}", job.id),
            Some(rival_token.as_str()),
            None,
        ))
        .await
        .expect("router responds");
    assert_eq!(delete.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn view_jobs_accepts_query_filters() {
    let (board, _) = build_board();
    let (employer, _) = employer_with_profile(&board, "Wile", "Acme");
    let (seeker, _) = seeker_with_profile(&board, "Ada");
    let mut cheap = job_draft("Junior Engineer");
    cheap.salary = Some(40_000);
    board.create_job(&employer.id, cheap).expect("posted");
    let senior = post_job(&board, &employer, "Senior Engineer");
    let (router, tokens) = router_for(board);

    let response = router
        .oneshot(json_request(
            Method::GET,
            "/seeker/view-jobs?keyword=engineer&minSalary=50000&maxSalary=",
            Some(bearer(&tokens, &seeker).as_str()),
            None,
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    let jobs = body.as_array().expect("array");
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0]["id"], json!(senior.id.as_str()));
}

#[tokio::test]
async fn moderation_routes_for_the_super_admin() {
    let (board, _) = build_board();
    let admin = board
        .ensure_super_admin(&super_admin_seed())
        .expect("seeded");
    let (seeker, _) = seeker_with_profile(&board, "Ada");
    let (router, tokens) = router_for(board);
    let admin_token = bearer(&tokens, &admin);
    let seeker_token = bearer(&tokens, &seeker);

    let self_ban = router
        .clone()
        .oneshot(json_request(
            Method::PATCH,
            &format!("/admin/banUser/{}", admin.id),
            Some(admin_token.as_str()),
            None,
        ))
        .await
        .expect("router responds");
    assert_eq!(self_ban.status(), StatusCode::FORBIDDEN);

    let ban = router
        .clone()
        .oneshot(json_request(
            Method::PATCH,
            &format!("/admin/banUser/{}", seeker.id),
            Some(admin_token.as_str()),
            None,
        ))
        .await
        .expect("router responds");
    assert_eq!(ban.status(), StatusCode::OK);

    let stale = router
        .clone()
        .oneshot(json_request(
            Method::GET,
            "/seeker/saved-jobs",
            Some(seeker_token.as_str()),
            None,
        ))
        .await
        .expect("router responds");
    assert_eq!(stale.status(), StatusCode::UNAUTHORIZED);

    let stats = router
        .oneshot(json_request(
            Method::GET,
            "/admin/statistics",
            Some(admin_token.as_str()),
            None,
        ))
        .await
        .expect("router responds");
    let body = read_json_body(stats).await;
    assert_eq!(body, json!({ "totalJobs": 0, "totalUsers": 1, "totalApplications": 0 }));
}

#[tokio::test]
async fn create_job_without_profile_is_a_bad_request() {
    let (board, store) = build_board();
    let employer = seed_user(&*store, "Wile", Role::Employer);
    let (router, tokens) = router_for(board);
    let token = bearer(&tokens, &employer);

    let draft = json!({
        "title": "Backend Engineer",
        "description": "Build the platform",
        "location": "New York, NY",
        "salary": 90000,
        "jobType": "Full-time",
        "expiryDate": "2030-01-31"
    });
    let response = router
        .oneshot(json_request(
            Method::POST,
            "/employer/create-job",
            Some(token.as_str()),
            Some(draft),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json_body(response).await;
    assert_eq!(body["fields"], json!(["employer profile not found"]));
}

#[tokio::test]
async fn status_update_checks_ownership_before_the_body() {
    let (board, _) = build_board();
    let (owner, _) = employer_with_profile(&board, "Wile", "Acme");
    let (rival, _) = employer_with_profile(&board, "Hank", "Globex");
    let (seeker, profile) = seeker_with_profile(&board, "Ada");
    let job = post_job(&board, &owner, "Backend Engineer");
    let (router, tokens) = router_for(board);

    let uri = format!("/employer/{}/applicants/{}/status", job.id, profile.id);
    for caller in [&seeker, &rival] {
        let token = bearer(&tokens, caller);
        let response = router
            .clone()
            .oneshot(json_request(
                Method::PUT,
                &uri,
                Some(token.as_str()),
                Some(json!({ "status": "hired" })),
            ))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{}", caller.name);
    }

    let token = bearer(&tokens, &owner);
    let response = router
        .oneshot(json_request(
            Method::PUT,
            &uri,
            Some(token.as_str()),
            Some(json!({ "status": "hired" })),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
