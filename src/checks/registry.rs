use crate::errors::AuditError;
use crate::models::Category;
use super::*;

/// Ordered set of checks for one audit. At most one check per category; the
/// declaration order is the run order and the report order.
pub struct CheckRegistry {
    checks: Vec<Box<dyn Check>>,
}

/// The built-in check for a category.
pub fn check_for(category: Category) -> Box<dyn Check> {
    match category {
        Category::Storage => Box::new(StorageExposureCheck),
        Category::Network => Box::new(NetworkExposureCheck),
        Category::Identity => Box::new(IdentityMfaCheck),
        Category::Database => Box::new(DatabaseExposureCheck),
        Category::Compute => Box::new(ComputeRoleCheck),
    }
}

impl CheckRegistry {
    /// All five checks in standard order: storage, network, identity, database, compute.
    pub fn standard() -> Self {
        Self {
            checks: Category::ALL.iter().map(|c| check_for(*c)).collect(),
        }
    }

    /// Built-in checks for the given categories, in the given order.
    pub fn select(categories: &[Category]) -> Result<Self, AuditError> {
        if categories.is_empty() {
            return Err(AuditError::Config("no checks selected".into()));
        }
        Self::from_checks(categories.iter().map(|c| check_for(*c)).collect())
    }

    /// Registry over arbitrary check implementations. Rejects two checks for one category.
    pub fn from_checks(checks: Vec<Box<dyn Check>>) -> Result<Self, AuditError> {
        let mut seen: Vec<Category> = Vec::with_capacity(checks.len());
        for check in &checks {
            let category = check.category();
            if seen.contains(&category) {
                return Err(AuditError::Config(format!(
                    "duplicate check for category '{}'",
                    category
                )));
            }
            seen.push(category);
        }
        Ok(Self { checks })
    }

    pub fn categories(&self) -> Vec<Category> {
        self.checks.iter().map(|c| c.category()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Check> + '_ {
        self.checks.iter().map(|c| c.as_ref())
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

impl Default for CheckRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
