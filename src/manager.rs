use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;

use crate::media::{recording::Recording, types::RecordingConfig};

/// Registry of running recordings, keyed by id
#[derive(Default)]
pub struct RecordingManager {
    recordings: RwLock<HashMap<String, Arc<Recording>>>,
}

impl RecordingManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add(&self, config: RecordingConfig, update_if_exists: bool) -> anyhow::Result<()> {
        let mut recordings = self.recordings.write().await;
        if recordings.contains_key(&config.id) {
            if !update_if_exists {
                return Err(anyhow::anyhow!("Recording already exists"));
            } else if let Some(recording) = recordings.remove(&config.id) {
                recording.cancel();
            }
        }
        let id = config.id.clone();
        let recording = Arc::new(Recording::new(config));
        recordings.insert(id, Arc::clone(&recording));

        tokio::spawn(async move {
            recording.start().await;
        });
        Ok(())
    }

    /// Returns false if no recording had this id
    pub async fn remove(&self, id: &str) -> bool {
        let mut recordings = self.recordings.write().await;
        match recordings.remove(id) {
            Some(recording) => {
                recording.cancel();
                true
            }
            None => false,
        }
    }

    pub async fn get(&self, id: &str) -> Option<Arc<Recording>> {
        self.recordings.read().await.get(id).cloned()
    }

    pub async fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.recordings.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub async fn cancel_all(&self) {
        let mut recordings = self.recordings.write().await;
        for (_, recording) in recordings.drain() {
            recording.cancel();
        }
    }
}
