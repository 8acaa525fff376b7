/// Integration test suite for the catalog admin
///
/// Drives the dashboard state and the HTTP client together against a
/// wiremock catalog service.

mod e2e;

// Re-export test harness for convenience
pub use test_harness::*;

/// Test utilities module
pub mod test_utils {
    use std::time::Duration;

    use chem_catalog_ui::CatalogStateManager;

    /// Poll the dashboard state the way the frame loop does until idle.
    pub async fn settle(state: &mut CatalogStateManager) {
        for _ in 0..400 {
            state.update_from_async();
            if !state.has_pending() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("background calls did not finish");
    }
}
