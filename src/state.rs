use crate::chat;
use crate::models::AssessmentAnswers;
use crate::storage::Store;
use crate::tabs::Navigator;
use crate::tasks::TaskRegistry;
use chrono::Local;
use std::collections::HashSet;
use std::{path::PathBuf, sync::Arc, time::Duration};
use tokio::sync::Mutex;
use tracing::debug;

/// Nutritionist availability as shown on both chat surfaces. Recomputed by
/// the minute sweep and settable from the console.
#[derive(Debug, Clone)]
pub struct Availability {
    pub online: bool,
    pub label: String,
    pub last_seen: String,
}

impl Default for Availability {
    fn default() -> Self {
        Self {
            online: true,
            label: "זמינה".to_string(),
            last_seen: Local::now().to_rfc3339(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub store: Arc<Mutex<Store>>,
    pub nav: Arc<Mutex<Navigator>>,
    /// Thread keys whose simulated counterpart is currently "typing".
    pub typing: Arc<Mutex<HashSet<String>>>,
    pub availability: Arc<Mutex<Availability>>,
    /// Working copy of assessment answers awaiting the autosave debounce.
    pub pending_draft: Arc<Mutex<Option<AssessmentAnswers>>>,
    pub tasks: Arc<TaskRegistry>,
}

impl AppState {
    pub fn new(data_path: PathBuf, store: Store) -> Self {
        Self {
            data_path,
            store: Arc::new(Mutex::new(store)),
            nav: Arc::new(Mutex::new(Navigator::default())),
            typing: Arc::new(Mutex::new(HashSet::new())),
            availability: Arc::new(Mutex::new(Availability::default())),
            pending_draft: Arc::new(Mutex::new(None)),
            tasks: Arc::new(TaskRegistry::new()),
        }
    }

    /// Recompute nutritionist availability from the local hour once a
    /// minute, mirroring the working-hours simulation.
    pub fn start_status_sweep(&self) {
        let state = self.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(60));
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let roll = rand::random::<f64>();
                let (online, label) = chat::availability_now(roll);
                let mut availability = state.availability.lock().await;
                availability.online = online;
                availability.label = label.to_string();
                availability.last_seen = Local::now().to_rfc3339();
                debug!("status sweep: online={online} label={label}");
            }
        });
        self.tasks.replace("status:sweep", handle);
    }
}
