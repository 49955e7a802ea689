use async_trait::async_trait;

use crate::error::ProviderError;

/// An extraction provider maps document text to a raw completion that is
/// expected to contain a JSON event array.
///
/// The trait deliberately returns the completion text untouched: parsing
/// and validation live in the contract module, so a fixture provider for
/// tests is a one-liner and never needs the network.
#[async_trait]
pub trait Provider: Send + Sync {
    async fn extract(&self, text: &str) -> Result<String, ProviderError>;
}
