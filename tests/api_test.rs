mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{TestApp, ADMIN_PHONE, TEST_PASSWORD};
use gym_backend::domain::models::user::Role;
use serde_json::json;

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new().await;
    let (status, _) = app.send("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_rejects_bad_password() {
    let app = TestApp::new().await;
    app.seed_login_user(ADMIN_PHONE, Role::Admin).await;

    let (status, body) = app.send("POST", "/api/v1/auth/login", None, Some(json!({
        "phone": ADMIN_PHONE,
        "password": "wrong"
    }))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn test_login_returns_profile_and_csrf() {
    let app = TestApp::new().await;
    let admin = app.seed_login_user(ADMIN_PHONE, Role::Admin).await;

    let (status, body) = app.send("POST", "/api/v1/auth/login", None, Some(json!({
        "phone": ADMIN_PHONE,
        "password": TEST_PASSWORD
    }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], admin.id.as_str());
    assert_eq!(body["user"]["role"], "ADMIN");
    assert!(!body["csrf_token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_courses_require_session() {
    let app = TestApp::new().await;
    let (status, _) = app.send("GET", "/api/v1/courses", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_write_without_csrf_is_forbidden() {
    let app = TestApp::new().await;
    app.seed_login_user("m-1", Role::Member).await;
    let (_, course) = app.seed_trainer_course(3).await;
    let mut auth = app.login("m-1", TEST_PASSWORD).await;
    auth.csrf_token = "forged".to_string();

    let (status, _) = app.send("POST", &format!("/api/v1/courses/{}/book", course.id), Some(&auth), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(app.course(&course.id).await.occupancy, 0);
}

#[tokio::test]
async fn test_admin_creates_trainer_and_course() {
    let app = TestApp::new().await;
    app.seed_login_user(ADMIN_PHONE, Role::Admin).await;
    let admin = app.login(ADMIN_PHONE, TEST_PASSWORD).await;

    let (status, trainer) = app.send("POST", "/api/v1/users", Some(&admin), Some(json!({
        "phone": "t-100",
        "password": "trainer-pass",
        "role": "trainer",
        "name": "Coach Kim"
    }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(trainer["role"], "TRAINER");
    let trainer_id = trainer["id"].as_str().unwrap();

    let (status, dup) = app.send("POST", "/api/v1/users", Some(&admin), Some(json!({
        "phone": "t-100",
        "password": "other",
        "role": "MEMBER"
    }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(dup["error"].is_string());

    let schedule = (Utc::now() + Duration::days(2)).to_rfc3339();
    let (status, course) = app.send("POST", "/api/v1/courses", Some(&admin), Some(json!({
        "name": "  Yoga  ",
        "schedule_time": schedule,
        "trainer_id": trainer_id,
        "max_capacity": 12
    }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(course["name"], "Yoga");
    assert_eq!(course["occupancy"], 0);
    assert_eq!(course["max_capacity"], 12);

    let (status, stats) = app.send("GET", "/api/v1/admin/stats", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["course_count"], 1);
}

#[tokio::test]
async fn test_course_creation_validates_input() {
    let app = TestApp::new().await;
    app.seed_login_user(ADMIN_PHONE, Role::Admin).await;
    let member = app.seed_user("m-9", None, Role::Member).await;
    let trainer = app.seed_user("t-9", None, Role::Trainer).await;
    let admin = app.login(ADMIN_PHONE, TEST_PASSWORD).await;
    let schedule = (Utc::now() + Duration::days(1)).to_rfc3339();

    let cases = [
        json!({ "name": "Box", "schedule_time": schedule, "trainer_id": trainer.id, "max_capacity": 0 }),
        json!({ "name": " ", "schedule_time": schedule, "trainer_id": trainer.id, "max_capacity": 5 }),
        json!({ "name": "Box", "schedule_time": schedule, "trainer_id": member.id, "max_capacity": 5 }),
        json!({ "name": "Box", "schedule_time": schedule, "trainer_id": "nobody", "max_capacity": 5 }),
    ];

    for payload in cases {
        let (status, body) = app.send("POST", "/api/v1/courses", Some(&admin), Some(payload.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {} -> {}", payload, body);
    }

    let (_, stats) = app.send("GET", "/api/v1/admin/stats", Some(&admin), None).await;
    assert_eq!(stats["course_count"], 0);
}

#[tokio::test]
async fn test_member_cannot_manage_courses() {
    let app = TestApp::new().await;
    app.seed_login_user("m-2", Role::Member).await;
    let (trainer, course) = app.seed_trainer_course(3).await;
    let member = app.login("m-2", TEST_PASSWORD).await;

    let (status, _) = app.send("POST", "/api/v1/courses", Some(&member), Some(json!({
        "name": "Sneaky",
        "schedule_time": Utc::now().to_rfc3339(),
        "trainer_id": trainer.id,
        "max_capacity": 5
    }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send("GET", &format!("/api/v1/courses/{}/members", course.id), Some(&member), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send("POST", &format!("/api/v1/courses/{}/reconcile", course.id), Some(&member), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_member_books_lists_and_cancels() {
    let app = TestApp::new().await;
    let user = app.seed_login_user("m-3", Role::Member).await;
    let (_, course) = app.seed_trainer_course(1).await;
    let auth = app.login("m-3", TEST_PASSWORD).await;
    let book_uri = format!("/api/v1/courses/{}/book", course.id);

    let (status, listed) = app.send("GET", "/api/v1/courses", Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, booking) = app.send("POST", &book_uri, Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(booking["user_id"], user.id.as_str());
    let booking_id = booking["id"].as_str().unwrap().to_string();

    let (status, body) = app.send("POST", &book_uri, Some(&auth), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Course is full");

    // Full courses drop out of the catalogue.
    let (_, listed) = app.send("GET", "/api/v1/courses", Some(&auth), None).await;
    assert!(listed.as_array().unwrap().is_empty());

    let (status, mine) = app.send("GET", "/api/v1/bookings", Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine[0]["course_name"], "Spin");

    let (status, _) = app.send("DELETE", &format!("/api/v1/bookings/{}", booking_id), Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.course(&course.id).await.occupancy, 0);

    let (status, _) = app.send("DELETE", &format!("/api/v1/bookings/{}", booking_id), Some(&auth), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duplicate_booking_over_http() {
    let app = TestApp::new().await;
    app.seed_login_user("m-4", Role::Member).await;
    let (_, course) = app.seed_trainer_course(5).await;
    let auth = app.login("m-4", TEST_PASSWORD).await;
    let book_uri = format!("/api/v1/courses/{}/book", course.id);

    let (status, _) = app.send("POST", &book_uri, Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = app.send("POST", &book_uri, Some(&auth), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "You have already booked this course");
    assert_eq!(app.course(&course.id).await.occupancy, 1);
}

#[tokio::test]
async fn test_member_cannot_cancel_someone_elses_booking() {
    let app = TestApp::new().await;
    let owner = app.seed_login_user("m-5", Role::Member).await;
    app.seed_login_user("m-6", Role::Member).await;
    app.seed_login_user(ADMIN_PHONE, Role::Admin).await;
    let (_, course) = app.seed_trainer_course(5).await;
    let booking = app.state.booking_service.book(&owner.id, &course.id).await.unwrap();
    let uri = format!("/api/v1/bookings/{}", booking.id);

    let intruder = app.login("m-6", TEST_PASSWORD).await;
    let (status, _) = app.send("DELETE", &uri, Some(&intruder), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(app.course(&course.id).await.occupancy, 1);

    let admin = app.login(ADMIN_PHONE, TEST_PASSWORD).await;
    let (status, _) = app.send("DELETE", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.course(&course.id).await.occupancy, 0);
}

#[tokio::test]
async fn test_trainer_sees_only_own_roster() {
    let app = TestApp::new().await;
    let trainer = app.seed_login_user("t-1", Role::Trainer).await;
    let rival = app.seed_user("t-2", None, Role::Trainer).await;
    let member = app.seed_user("m-7", Some("Mina"), Role::Member).await;
    let schedule = Utc::now() + Duration::days(1);
    let own = app.seed_course("Own", &trainer.id, 4, schedule).await;
    let foreign = app.seed_course("Foreign", &rival.id, 4, schedule).await;
    app.state.booking_service.book(&member.id, &own.id).await.unwrap();

    let auth = app.login("t-1", TEST_PASSWORD).await;

    let (status, roster) = app.send("GET", &format!("/api/v1/courses/{}/members", own.id), Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(roster["course"]["id"], own.id.as_str());
    assert_eq!(roster["members"][0]["display_name"], "Mina");

    let (status, _) = app.send("GET", &format!("/api/v1/courses/{}/members", foreign.id), Some(&auth), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, mine) = app.send("GET", "/api/v1/trainer/courses", Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().unwrap().len(), 1);

    let date = schedule.date_naive();
    let (status, stats) = app.send("GET", &format!("/api/v1/trainer/stats?date={}", date), Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["course_count"], 1);
    assert_eq!(stats["bookings_on_date"], 1);
    assert_eq!(stats["unique_students"], 1);
}

#[tokio::test]
async fn test_trainer_cannot_book() {
    let app = TestApp::new().await;
    app.seed_login_user("t-3", Role::Trainer).await;
    let (_, course) = app.seed_trainer_course(5).await;
    let auth = app.login("t-3", TEST_PASSWORD).await;

    let (status, _) = app.send("POST", &format!("/api/v1/courses/{}/book", course.id), Some(&auth), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_updates_and_reconciles_course() {
    let app = TestApp::new().await;
    app.seed_login_user(ADMIN_PHONE, Role::Admin).await;
    let member = app.seed_user("m-8", None, Role::Member).await;
    let (trainer, course) = app.seed_trainer_course(4).await;
    app.state.booking_service.book(&member.id, &course.id).await.unwrap();
    let admin = app.login(ADMIN_PHONE, TEST_PASSWORD).await;
    let uri = format!("/api/v1/courses/{}", course.id);

    let (status, updated) = app.send("PUT", &uri, Some(&admin), Some(json!({
        "name": "Spin XL",
        "schedule_time": course.schedule_time.to_rfc3339(),
        "trainer_id": trainer.id,
        "max_capacity": 8
    }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["max_capacity"], 8);
    assert_eq!(updated["occupancy"], 1);

    app.state.course_service.set_occupancy(&course.id, 3).await.unwrap();
    let (status, repaired) = app.send("POST", &format!("{}/reconcile", uri), Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(repaired["occupancy"], 1);

    let (status, _) = app.send("GET", "/api/v1/courses/missing", Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_trainer_cancels_only_on_own_course() {
    let app = TestApp::new().await;
    let trainer = app.seed_login_user("t-20", Role::Trainer).await;
    let rival = app.seed_user("t-21", None, Role::Trainer).await;
    let member = app.seed_user("m-20", None, Role::Member).await;
    let schedule = Utc::now() + Duration::days(1);
    let own = app.seed_course("Own", &trainer.id, 4, schedule).await;
    let foreign = app.seed_course("Foreign", &rival.id, 4, schedule).await;
    let on_own = app.state.booking_service.book(&member.id, &own.id).await.unwrap();
    let on_foreign = app.state.booking_service.book(&member.id, &foreign.id).await.unwrap();
    let auth = app.login("t-20", TEST_PASSWORD).await;

    let (status, body) = app.send("DELETE", &format!("/api/v1/bookings/{}", on_foreign.id), Some(&auth), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{}", body);
    assert_eq!(app.course(&foreign.id).await.occupancy, 1);

    let (status, body) = app.send("DELETE", &format!("/api/v1/bookings/{}", on_own.id), Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["status"], "cancelled");
    assert_eq!(app.course(&own.id).await.occupancy, 0);
    assert_eq!(app.booking_rows(&own.id).await, 0);
}

#[tokio::test]
async fn test_trainer_lists_bookings_across_own_courses() {
    let app = TestApp::new().await;
    let trainer = app.seed_login_user("t-30", Role::Trainer).await;
    let rival = app.seed_user("t-31", None, Role::Trainer).await;
    let ann = app.seed_user("m-30", Some("Ann"), Role::Member).await;
    let ben = app.seed_user("m-31", None, Role::Member).await;
    app.seed_profile(&ben.id, Some("Benny"), Some("555-0131")).await;
    let now = Utc::now();
    let later = app.seed_course("Later", &trainer.id, 4, now + Duration::days(2)).await;
    let sooner = app.seed_course("Sooner", &trainer.id, 4, now + Duration::days(1)).await;
    let foreign = app.seed_course("Foreign", &rival.id, 4, now + Duration::days(1)).await;

    let svc = &app.state.booking_service;
    svc.book(&ann.id, &later.id).await.unwrap();
    svc.book(&ben.id, &sooner.id).await.unwrap();
    svc.book(&ann.id, &foreign.id).await.unwrap();

    let auth = app.login("t-30", TEST_PASSWORD).await;
    let (status, rows) = app.send("GET", "/api/v1/trainer/bookings", Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["course_name"], "Sooner");
    assert_eq!(rows[0]["display_name"], "Benny");
    assert_eq!(rows[0]["phone"], "555-0131");
    assert_eq!(rows[1]["course_id"], later.id.as_str());
    assert_eq!(rows[1]["display_name"], "Ann");

    let member = app.seed_login_user("m-32", Role::Member).await;
    let member_auth = app.login(&member.phone, TEST_PASSWORD).await;
    let (status, _) = app.send("GET", "/api/v1/trainer/bookings", Some(&member_auth), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_member_self_registers_and_books() {
    let app = TestApp::new().await;
    let (_, course) = app.seed_trainer_course(2).await;

    let (status, created) = app.send("POST", "/api/v1/auth/register", None, Some(json!({
        "phone": " 555-7000 ",
        "password": "walk-in-pass",
        "name": "Walk In"
    }))).await;
    assert_eq!(status, StatusCode::OK, "{}", created);
    assert_eq!(created["role"], "MEMBER");
    assert_eq!(created["phone"], "555-7000");

    let (status, _) = app.send("POST", "/api/v1/auth/register", None, Some(json!({
        "phone": "555-7000",
        "password": "again"
    }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.send("POST", "/api/v1/auth/register", None, Some(json!({
        "phone": "  ",
        "password": "x"
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let auth = app.login("555-7000", "walk-in-pass").await;
    let (status, booking) = app.send("POST", &format!("/api/v1/courses/{}/book", course.id), Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(booking["user_id"], created["id"]);
}
