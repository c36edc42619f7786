use serde::{Deserialize, Serialize};

use backoffice_core::{CategoryId, DomainError, DomainResult, Entity};

/// Product category. Created once at ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub cat_id: CategoryId,
    pub cat_name: String,
}

impl Category {
    pub fn new(cat_id: CategoryId, cat_name: impl Into<String>) -> DomainResult<Self> {
        let category = Self {
            cat_id,
            cat_name: cat_name.into(),
        };
        category.validate()?;
        Ok(category)
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.cat_name.trim().is_empty() {
            return Err(DomainError::validation(format!(
                "category {} has an empty name",
                self.cat_id
            )));
        }
        Ok(())
    }
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> CategoryId {
        self.cat_id
    }
}
