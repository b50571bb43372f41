use super::{matches_workload, WorkloadPresence};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Answers the same for every workload
#[derive(Debug, Clone, Copy)]
pub struct StaticPresence(pub bool);

#[async_trait]
impl WorkloadPresence for StaticPresence {
    async fn is_present(&self, _name: &str) -> bool {
        self.0
    }
}

/// In-memory set of running workloads for testing
#[derive(Debug, Clone, Default)]
pub struct MockPresence {
    running: Arc<RwLock<HashSet<String>>>,
}

impl MockPresence {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn start(&self, name: impl Into<String>) {
        let name = name.into();
        debug!("Mock: workload started: {}", name);
        self.running.write().await.insert(name);
    }

    pub async fn stop(&self, name: &str) {
        debug!("Mock: workload stopped: {}", name);
        self.running.write().await.remove(name);
    }
}

#[async_trait]
impl WorkloadPresence for MockPresence {
    async fn is_present(&self, name: &str) -> bool {
        self.running
            .read()
            .await
            .iter()
            .any(|candidate| matches_workload(candidate, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_presence() {
        assert!(StaticPresence(true).is_present("anything").await);
        assert!(!StaticPresence(false).is_present("anything").await);
    }

    #[tokio::test]
    async fn test_mock_presence_tracks_workloads() {
        let presence = MockPresence::new();
        assert!(!presence.is_present("koha_docker").await);

        presence.start("/koha_docker").await;
        assert!(presence.is_present("koha_docker").await);

        presence.stop("/koha_docker").await;
        assert!(!presence.is_present("koha_docker").await);
    }
}
