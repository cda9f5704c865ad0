//! Sample data and its in-memory store.
//!
//! The sample API exists to exercise the request-logging pipeline; the store
//! is a primitive prefilled list, not a persistence layer.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SampleData {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SampleRequest {
    pub name: String,
    pub created_by: Uuid,
}

const SEED_NAMES: [&str; 12] = [
    "Kautzer-Boehm",
    "Nader Group",
    "Bartoletti Inc",
    "Hirthe-Langworth",
    "Schoen Sons",
    "Gusikowski Ltd",
    "Rowe-Jaskolski",
    "Dietrich LLC",
    "O'Conner Partners",
    "Zulauf Brothers",
    "Monahan-Torp",
    "Kerluke Holdings",
];

/// Primitive repository to get and create samples.
pub struct SampleStore {
    samples: RwLock<Vec<SampleData>>,
    next_id: AtomicU64,
}

impl SampleStore {
    /// Store prefilled with a deterministic sample set.
    pub fn with_seed_data() -> Self {
        let samples = SEED_NAMES
            .iter()
            .enumerate()
            .map(|(id, name)| SampleData {
                id: id as u64,
                name: (*name).to_owned(),
            })
            .collect::<Vec<_>>();

        Self {
            next_id: AtomicU64::new(samples.len() as u64),
            samples: RwLock::new(samples),
        }
    }

    pub async fn all(&self) -> Vec<SampleData> {
        self.samples.read().await.clone()
    }

    pub async fn get(&self, id: u64) -> Option<SampleData> {
        self.samples
            .read()
            .await
            .iter()
            .find(|sample| sample.id == id)
            .cloned()
    }

    pub async fn create(&self, name: String) -> SampleData {
        let sample = SampleData {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            name,
        };
        self.samples.write().await.push(sample.clone());
        sample
    }
}
