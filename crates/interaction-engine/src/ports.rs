use async_trait::async_trait;

use element_finder::{ElementDescriptor, ElementFinder, FinderError, Resolution};

/// Resolution seam; the engine never talks to the finder concretely so tests
/// can script resolutions without a page.
#[async_trait]
pub trait FinderPort: Send + Sync {
    async fn resolve(&self, descriptor: &ElementDescriptor) -> Result<Resolution, FinderError>;
}

#[async_trait]
impl FinderPort for ElementFinder {
    async fn resolve(&self, descriptor: &ElementDescriptor) -> Result<Resolution, FinderError> {
        ElementFinder::resolve(self, descriptor).await
    }
}
