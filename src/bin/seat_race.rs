use chrono::{Duration as ChronoDuration, Utc};
use colored::*;
use governor::{Quota, RateLimiter};
use hdrhistogram::Histogram;
use reqwest::{header, Client, StatusCode};
use serde_json::{json, Value};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use uuid::Uuid;

const BASE_URL: &str = "http://localhost:3000";
const SEATS: i32 = 10;
const MEMBERS: usize = 200;
const RPS: u32 = 500;

/// Logged-in session: the access token cookie value plus its CSRF companion.
struct Session {
    client: Client,
    access_token: String,
    csrf_token: String,
}

impl Session {
    fn post(&self, url: String) -> reqwest::RequestBuilder {
        self.client.post(url)
            .header(header::COOKIE, format!("access_token={}", self.access_token))
            .header("X-CSRF-Token", &self.csrf_token)
    }

    fn get(&self, url: String) -> reqwest::RequestBuilder {
        self.client.get(url)
            .header(header::COOKIE, format!("access_token={}", self.access_token))
    }
}

#[tokio::main]
async fn main() {
    println!("{}", "Starting seat race".bold().green());
    println!("Target URL: {}", BASE_URL);

    let admin_phone = std::env::var("ADMIN_PHONE").unwrap_or_else(|_| "13800138000".to_string());
    let admin_password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "123456".to_string());

    let client = Client::builder()
        .pool_max_idle_per_host(1000)
        .timeout(Duration::from_secs(10))
        .build()
        .expect("Failed to build HTTP client");

    let admin = match login(&client, &admin_phone, &admin_password).await {
        Some(admin) => admin,
        None => {
            eprintln!("{}", "Admin login failed. Is the server running with ADMIN_PHONE/ADMIN_PASSWORD set?".red().bold());
            return;
        }
    };

    println!("\n{}", "Setting up race data...".yellow());
    let trainer_id = create_user(&admin, &format!("t-{}", Uuid::new_v4()), "TRAINER").await;
    let course_id = create_course(&admin, &trainer_id).await;

    let mut members = Vec::with_capacity(MEMBERS);
    for _ in 0..MEMBERS {
        let phone = format!("m-{}", Uuid::new_v4());
        create_user(&admin, &phone, "MEMBER").await;
        match login(&client, &phone, "race-password").await {
            Some(m) => members.push(m),
            None => panic!("Member login failed for {}", phone),
        }
    }
    println!("{}", "Data created.".green());
    println!("   Course: {} ({} seats, {} members)", course_id, SEATS, MEMBERS);

    let limiter = Arc::new(RateLimiter::direct(
        Quota::per_second(NonZeroU32::new(RPS).expect("RPS must be non-zero"))
    ));

    let (tx, mut rx) = mpsc::channel(MEMBERS);
    let url = format!("{}/api/v1/courses/{}/book", BASE_URL, course_id);

    for member in members {
        limiter.until_ready().await;
        let tx = tx.clone();
        let url = url.clone();
        tokio::spawn(async move {
            let req_start = Instant::now();
            let res = member.post(url).send().await;
            let status = res.map(|r| r.status()).ok();
            let _ = tx.send((req_start.elapsed(), status)).await;
        });
    }
    drop(tx);

    let mut histogram = Histogram::<u64>::new(3).expect("histogram");
    let mut booked = 0;
    let mut rejected = 0;
    let mut failed = 0;

    while let Some((latency, status)) = rx.recv().await {
        let _ = histogram.record(latency.as_micros() as u64);
        match status {
            Some(StatusCode::OK) => booked += 1,
            Some(StatusCode::CONFLICT) => rejected += 1,
            _ => failed += 1,
        }
    }

    println!("\n{:<10} | {:<10} | {:<10} | {:<12} | {:<12}", "Booked", "Full", "Errors", "Mean (ms)", "P99 (ms)");
    println!("{:-<10}-+-{:-<10}-+-{:-<10}-+-{:-<12}-+-{:-<12}", "", "", "", "", "");
    println!(
        "{:<10} | {:<10} | {:<10} | {:<12.2} | {:<12.2}",
        booked,
        rejected,
        failed,
        histogram.mean() / 1000.0,
        histogram.value_at_quantile(0.99) as f64 / 1000.0
    );

    let course: Value = admin.get(format!("{}/api/v1/courses/{}", BASE_URL, course_id))
        .send().await.expect("Failed to fetch course")
        .json().await.expect("Failed to parse course");
    let occupancy = course["occupancy"].as_i64().unwrap_or(-1);

    if booked == SEATS && occupancy == SEATS as i64 {
        println!("{}", format!("Capacity held: {} bookings, occupancy {}", booked, occupancy).green().bold());
    } else {
        println!("{}", format!("Capacity violated: {} bookings, occupancy {}", booked, occupancy).red().bold());
        std::process::exit(1);
    }
}

async fn login(client: &Client, phone: &str, password: &str) -> Option<Session> {
    let res = client.post(format!("{}/api/v1/auth/login", BASE_URL))
        .json(&json!({ "phone": phone, "password": password }))
        .send()
        .await
        .ok()?;

    if !res.status().is_success() {
        return None;
    }

    let access_token = res.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .find_map(|c| c.strip_prefix("access_token="))
        .and_then(|rest| rest.split(';').next())?
        .to_string();

    let body: Value = res.json().await.ok()?;
    let csrf_token = body["csrf_token"].as_str()?.to_string();
    Some(Session { client: client.clone(), access_token, csrf_token })
}

async fn create_user(admin: &Session, phone: &str, role: &str) -> String {
    let res = admin.post(format!("{}/api/v1/users", BASE_URL))
        .json(&json!({ "phone": phone, "password": "race-password", "role": role }))
        .send()
        .await
        .expect("Failed to create user");

    if !res.status().is_success() {
        panic!("Failed to create user. Status: {}", res.status());
    }

    let body: Value = res.json().await.expect("Failed to parse user response");
    body["id"].as_str().expect("No user id").to_string()
}

async fn create_course(admin: &Session, trainer_id: &str) -> String {
    let res = admin.post(format!("{}/api/v1/courses", BASE_URL))
        .json(&json!({
            "name": "Seat Race Spin",
            "schedule_time": (Utc::now() + ChronoDuration::days(1)).to_rfc3339(),
            "trainer_id": trainer_id,
            "max_capacity": SEATS
        }))
        .send()
        .await
        .expect("Failed to create course");

    if !res.status().is_success() {
        let status = res.status();
        let txt = res.text().await.unwrap_or_default();
        panic!("Failed to create course. Status: {}. Body: {}", status, txt);
    }

    let body: Value = res.json().await.expect("Failed to parse course response");
    body["id"].as_str().expect("No course id").to_string()
}
