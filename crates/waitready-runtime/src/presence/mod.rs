pub mod cli;
pub mod mock;

pub use cli::CliPresence;
pub use mock::{MockPresence, StaticPresence};

use async_trait::async_trait;

/// Answers whether the expected workload is currently running
///
/// Implementations must not fail: a runtime that cannot be queried counts
/// as "not present".
#[async_trait]
pub trait WorkloadPresence: Send + Sync {
    async fn is_present(&self, name: &str) -> bool;
}

/// Runtime-reported `candidate` names `expected`, with or without one leading `/`
pub fn matches_workload(candidate: &str, expected: &str) -> bool {
    candidate == expected || candidate.strip_prefix('/') == Some(expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_workload() {
        assert!(matches_workload("koha_docker", "koha_docker"));
        assert!(matches_workload("/koha_docker", "koha_docker"));
        assert!(!matches_workload("//koha_docker", "koha_docker"));
        assert!(!matches_workload("koha_docker_1", "koha_docker"));
        assert!(!matches_workload("", "koha_docker"));
    }
}
