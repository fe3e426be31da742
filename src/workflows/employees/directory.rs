use async_trait::async_trait;

use super::domain::Company;

/// Read-only source of the company reference list. Fetched once per form
/// session; entries back both the selection field and the foreign-key rule.
#[async_trait]
pub trait CompanyDirectory: Send + Sync {
    async fn companies(&self) -> Result<Vec<Company>, DirectoryError>;
}

/// Reference-data fetch failure.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("company directory unavailable: {0}")]
    Unavailable(String),
}
