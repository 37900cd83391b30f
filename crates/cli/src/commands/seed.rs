//! Seed reference data: branches, categories and suppliers.
//!
//! Reads a YAML file (or the bundled `seed/default.yaml`) and inserts every
//! record that doesn't exist yet. Re-running is safe: duplicates are skipped.
//!
//! ```bash
//! stockroom-cli seed --actor priya
//! stockroom-cli seed --actor priya --file fixtures/stores.yaml
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use stockroom_admin::db::{
    AdminUserRepository, BranchRepository, CategoryRepository, RepositoryError,
    SupplierRepository,
};
use stockroom_admin::models::{CategoryInput, CreateBranchInput, SupplierInput};

use super::{ConnectError, connect};

const DEFAULT_SEED: &str = include_str!("../../seed/default.yaml");

#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Failed to read {0}: {1}")]
    Read(String, std::io::Error),

    #[error("Invalid seed file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Admin user not found: {0}")]
    UnknownActor(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Records to seed.
#[derive(Debug, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub branches: Vec<CreateBranchInput>,
    #[serde(default)]
    pub categories: Vec<CategoryInput>,
    #[serde(default)]
    pub suppliers: Vec<SupplierInput>,
}

/// Counts of inserted and skipped records.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub inserted: usize,
    pub skipped: usize,
}

impl SeedSummary {
    /// Tally one insert attempt; conflicts count as skipped.
    fn record<T>(
        &mut self,
        kind: &str,
        label: &str,
        result: Result<T, RepositoryError>,
    ) -> Result<(), RepositoryError> {
        match result {
            Ok(_) => {
                info!("Seeded {kind}: {label}");
                self.inserted += 1;
                Ok(())
            }
            Err(RepositoryError::Conflict(reason)) => {
                warn!("Skipped {kind} {label}: {reason}");
                self.skipped += 1;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

/// Parse seed data from YAML.
///
/// # Errors
///
/// Returns `SeedError::Parse` if the YAML doesn't match the expected shape.
pub fn parse(content: &str) -> Result<SeedData, SeedError> {
    Ok(serde_yaml::from_str(content)?)
}

/// Seed reference data, recording `actor` as the creator.
///
/// # Errors
///
/// Returns `SeedError` if the file can't be read or parsed, the actor
/// doesn't exist, or the database fails.
pub async fn run(actor: &str, file: Option<&str>) -> Result<SeedSummary, SeedError> {
    let data = match file {
        Some(path) => {
            info!(path, "Loading seed data from file");
            let content = tokio::fs::read_to_string(Path::new(path))
                .await
                .map_err(|e| SeedError::Read(path.to_owned(), e))?;
            parse(&content)?
        }
        None => parse(DEFAULT_SEED)?,
    };

    let pool = connect().await?;

    let actor_id = AdminUserRepository::new(&pool)
        .get_login(actor)
        .await?
        .map(|login| login.user.id)
        .ok_or_else(|| SeedError::UnknownActor(actor.to_owned()))?;

    let mut summary = SeedSummary::default();

    let branches = BranchRepository::new(&pool);
    for branch in &data.branches {
        summary.record("branch", &branch.name, branches.create(branch).await)?;
    }

    let categories = CategoryRepository::new(&pool);
    for category in &data.categories {
        summary.record(
            "category",
            &category.name,
            categories.create(actor_id, category).await,
        )?;
    }

    let suppliers = SupplierRepository::new(&pool);
    for supplier in &data.suppliers {
        summary.record(
            "supplier",
            &supplier.name,
            suppliers.create(actor_id, supplier).await,
        )?;
    }

    info!(
        inserted = summary.inserted,
        skipped = summary.skipped,
        "Seeding complete"
    );
    Ok(summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_default_seed_parses() {
        let data = parse(DEFAULT_SEED).unwrap();
        assert_eq!(data.branches.len(), 1);
        assert_eq!(data.categories.len(), 2);
        assert_eq!(data.suppliers[0].mobile.as_str(), "+919845012345");
    }

    #[test]
    fn test_sections_are_optional() {
        let data = parse("categories:\n  - name: Tools\n").unwrap();
        assert!(data.branches.is_empty());
        assert!(data.suppliers.is_empty());
        assert_eq!(data.categories[0].description, None);
    }

    #[test]
    fn test_bad_mobile_rejected() {
        let yaml = "suppliers:\n  - {name: A, company: B, code: C, mobile: call me}\n";
        assert!(matches!(parse(yaml), Err(SeedError::Parse(_))));
    }

    #[test]
    fn test_conflicts_are_skipped() {
        let mut summary = SeedSummary::default();
        summary
            .record("category", "Tools", Ok::<_, RepositoryError>(()))
            .unwrap();
        summary
            .record::<()>(
                "category",
                "Tools",
                Err(RepositoryError::Conflict("duplicate".to_string())),
            )
            .unwrap();
        assert_eq!(summary, SeedSummary { inserted: 1, skipped: 1 });

        assert!(
            summary
                .record::<()>("category", "Tools", Err(RepositoryError::NotFound))
                .is_err()
        );
    }
}
