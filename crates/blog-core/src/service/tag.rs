//! Tag CRUD.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::Tag;
use crate::error::{DomainError, FieldError};
use crate::ports::TagRepository;

use super::check_required_string;

pub struct TagService {
    tags: Arc<dyn TagRepository>,
}

impl TagService {
    pub fn new(tags: Arc<dyn TagRepository>) -> Self {
        Self { tags }
    }

    pub async fn list(&self) -> Result<Vec<Tag>, DomainError> {
        Ok(self.tags.find_all().await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Tag, DomainError> {
        self.tags
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound {
                entity_type: "Tag",
                id,
            })
    }

    pub async fn create(&self, name: String) -> Result<Tag, DomainError> {
        let mut errors = Vec::new();
        check_required_string(&mut errors, "name", &name);
        if errors.is_empty() && self.tags.find_by_name(&name).await?.is_some() {
            errors.push(FieldError::new("name", "The name has already been taken."));
        }
        if !errors.is_empty() {
            return Err(DomainError::Validation(errors));
        }

        Ok(self.tags.create(Tag::new(name)).await?)
    }

    pub async fn update(&self, id: Uuid, name: Option<String>) -> Result<Tag, DomainError> {
        let mut tag = self.get(id).await?;

        if let Some(name) = name {
            let mut errors = Vec::new();
            check_required_string(&mut errors, "name", &name);
            if errors.is_empty()
                && let Some(existing) = self.tags.find_by_name(&name).await?
                && existing.id != id
            {
                errors.push(FieldError::new("name", "The name has already been taken."));
            }
            if !errors.is_empty() {
                return Err(DomainError::Validation(errors));
            }

            tag.name = name;
            tag.updated_at = Utc::now();
            tag = self.tags.update(tag).await?;
        }

        Ok(tag)
    }

    /// Delete a tag. Existing post associations never block this; the
    /// association rows are cascaded by the datastore.
    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        self.get(id).await?;
        self.tags.delete(id).await?;
        Ok(())
    }
}
