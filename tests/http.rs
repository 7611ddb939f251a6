use once_cell::sync::Lazy;
use reqwest::Client;
use serde_json::{json, Value};
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("nutrition_app_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/chat/status")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_path = unique_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_nutrition_app"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", data_path)
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

fn filled_answers(daily_weight: &str) -> Value {
    json!({
        "daily_weight": daily_weight,
        "sleep_hours": "7-8",
        "sleep_quality": "4",
        "sleep_time": "23:30",
        "wake_time": "07:00",
        "appetite": "3",
        "water_intake": "2.5",
        "water_unit": "liters",
        "mood": "4",
        "energy": "3",
        "recovery": "4"
    })
}

#[tokio::test]
async fn http_record_weight_updates_current_weight() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let view: Value = client
        .post(format!("{}/api/weight", server.base_url))
        .json(&json!({ "weight": 67.9, "time": "בוקר", "notes": "אחרי אימון" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(view["current_weight"], json!(67.9));
    assert_eq!(view["target_weight"], json!(66.0));

    let reread: Value = client
        .get(format!("{}/api/weight", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(reread["current_weight"], json!(67.9));
}

#[tokio::test]
async fn http_record_weight_requires_time_of_day() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/weight", server.base_url))
        .json(&json!({ "weight": 67.5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn http_chart_window_has_exactly_seven_points() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let chart: Value = client
        .get(format!("{}/api/weight/chart/7", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(chart["labels"].as_array().unwrap().len(), 7);
    assert_eq!(chart["weights"].as_array().unwrap().len(), 7);
    assert_eq!(chart["targets"].as_array().unwrap().len(), 7);

    let bad = client
        .get(format!("{}/api/weight/chart/0", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(bad.status(), 400);
}

#[tokio::test]
async fn http_assessment_draft_round_trips() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let mut answers = filled_answers("68.4");
    answers["supplements"] = json!(["magnesium", "omega3"]);
    answers["additional_notes"] = json!("שבוע עמוס באימונים");
    answers["mood"] = Value::Null;

    let saved: Value = client
        .post(format!("{}/api/assessment/save", server.base_url))
        .json(&json!({ "answers": answers }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(saved["saved"], json!(true));

    let view: Value = client
        .get(format!("{}/api/assessment", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(view["answers"]["daily_weight"], json!("68.4"));
    assert_eq!(view["answers"]["supplements"], json!(["magnesium", "omega3"]));
    assert_eq!(view["answers"]["additional_notes"], json!("שבוע עמוס באימונים"));
    assert_eq!(view["answers"]["sleep_time"], json!("23:30"));

    // 13/14 with mood blank: past the soft gate, still submittable by
    // percentage but not by the hard validation.
    assert_eq!(view["progress"]["satisfied"], json!(13));
    assert_eq!(view["progress"]["submit_enabled"], json!(true));

    let rejected = client
        .post(format!("{}/api/assessment/submit", server.base_url))
        .json(&json!({ "answers": answers }))
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status(), 400);
}

#[tokio::test]
async fn http_assessment_submit_propagates_weight() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let submitted: Value = client
        .post(format!("{}/api/assessment/submit", server.base_url))
        .json(&json!({ "answers": filled_answers("66.8") }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(submitted["submitted"], json!(true));

    let view: Value = client
        .get(format!("{}/api/assessment", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view["submitted"], json!(true));
    // Submitting cleared the week's draft.
    assert_eq!(view["answers"]["daily_weight"], Value::Null);

    let weight: Value = client
        .get(format!("{}/api/weight", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(weight["current_weight"], json!(66.8));
}

#[tokio::test]
async fn http_send_to_nutritionist_requires_weight_only() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let rejected = client
        .post(format!("{}/api/assessment/send", server.base_url))
        .json(&json!({ "answers": {} }))
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status(), 400);

    let sent: Value = client
        .post(format!("{}/api/assessment/send", server.base_url))
        .json(&json!({ "answers": { "daily_weight": "67.1" } }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(sent["sent"], json!(true));
}

#[tokio::test]
async fn http_chat_seeds_welcome_and_flags_urgent_replies() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let view: Value = client
        .get(format!("{}/api/chat/messages", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let seeded = view["messages"].as_array().unwrap().len();
    assert!(seeded >= 2, "empty thread seeds welcome messages");

    let sent: Value = client
        .post(format!("{}/api/chat/send", server.base_url))
        .json(&json!({ "content": "יש לי כאב בברך אחרי האימון" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(sent["from"], json!("athlete"));
    assert_eq!(sent["status"], json!("sent"));

    // The simulated reply lands after the randomized typing delays.
    let deadline = Instant::now() + Duration::from_secs(15);
    let mut urgent_reply = None;
    while Instant::now() < deadline {
        let view: Value = client
            .get(format!("{}/api/chat/messages", server.base_url))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let messages = view["messages"].as_array().unwrap().clone();
        if let Some(reply) = messages
            .iter()
            .find(|m| m["from"] == json!("nutritionist") && m["urgent"] == json!(true))
        {
            urgent_reply = Some(reply.clone());
            break;
        }
        sleep(Duration::from_millis(400)).await;
    }
    let reply = urgent_reply.expect("a pain keyword always yields an urgent reply");
    assert!(reply["content"].as_str().unwrap().contains("מצטערת לשמוע"));
}

#[tokio::test]
async fn http_console_lists_roster_and_marks_read() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let console: Value = client
        .get(format!("{}/api/console/athletes", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let athletes = console["athletes"].as_array().unwrap();
    assert_eq!(athletes.len(), 3);
    assert_eq!(console["templates"].as_array().unwrap().len(), 8);

    // The seeded demo exchange leaves one unread athlete message.
    let maya = athletes
        .iter()
        .find(|a| a["id"] == json!("maya_israeli"))
        .unwrap();
    assert_eq!(maya["unread"], json!(1));

    // Opening the thread marks it read.
    let thread: Value = client
        .get(format!("{}/api/console/maya_israeli/messages", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(thread["messages"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|m| m["from"] == json!("athlete"))
        .all(|m| m["read"] == json!(true)));

    let console: Value = client
        .get(format!("{}/api/console/athletes", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let maya = console["athletes"]
        .as_array()
        .unwrap()
        .iter()
        .find(|a| a["id"] == json!("maya_israeli"))
        .unwrap()
        .clone();
    assert_eq!(maya["unread"], json!(0));

    let missing = client
        .get(format!("{}/api/console/unknown/messages", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), 404);
}

#[tokio::test]
async fn http_unknown_tab_defaults_to_home() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let view: Value = client
        .post(format!("{}/api/tab/switch", server.base_url))
        .json(&json!({ "tab": "settings" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view["tab"], json!("home"));
    assert!(view["content"]["tasks"].as_array().unwrap().len() >= 5);

    let weight_tab: Value = client
        .post(format!("{}/api/tab/switch", server.base_url))
        .json(&json!({ "tab": "weight" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(weight_tab["tab"], json!("weight"));
    assert_eq!(weight_tab["changed"], json!(true));

    // Switching to the already-active tab is a no-op.
    let same: Value = client
        .post(format!("{}/api/tab/switch", server.base_url))
        .json(&json!({ "tab": "weight" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(same["changed"], json!(false));
}
