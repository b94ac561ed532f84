//! One-shot credential validation pass

use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

use super::traits::ProviderAdapter;

/// Probes every candidate's credentials concurrently and returns the
/// survivors in their original order. One bad credential never aborts the
/// others; each failure is logged with the vendor name and detail.
pub async fn validate_adapters(
    candidates: Vec<Arc<dyn ProviderAdapter>>,
) -> Vec<Arc<dyn ProviderAdapter>> {
    let probes = candidates
        .iter()
        .map(|adapter| adapter.validate_credentials());
    let results = join_all(probes).await;

    candidates
        .into_iter()
        .zip(results)
        .filter_map(|(adapter, result)| match result {
            Ok(()) => {
                info!(provider = adapter.name(), "Provider credentials validated");
                Some(adapter)
            }
            Err(error) => {
                warn!(
                    provider = adapter.name(),
                    %error,
                    "Dropping provider after failed credential validation"
                );
                None
            }
        })
        .collect()
}
