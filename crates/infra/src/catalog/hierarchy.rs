use chrono::Utc;
use tracing::instrument;

use catalog_categories::{
    Category, CategoryPatch, NewCategory, NewSubcategory, Subcategory, SubcategoryPatch, ensure_valid_parent,
};
use catalog_core::{CategoryId, DomainError, SubcategoryId};

use super::{CatalogResult, CatalogService, not_found, slug_conflict};

impl CatalogService {
    pub async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        Ok(self.store.list_categories().await?)
    }

    pub async fn list_active_categories(&self) -> CatalogResult<Vec<Category>> {
        Ok(self.store.list_active_categories().await?)
    }

    /// A blank term lists everything.
    pub async fn search_categories(&self, term: &str) -> CatalogResult<Vec<Category>> {
        if term.trim().is_empty() {
            return self.list_categories().await;
        }
        Ok(self.store.search_categories(term.trim()).await?)
    }

    pub async fn get_category(&self, id: CategoryId) -> CatalogResult<Category> {
        self.store.get_category(id).await?.ok_or_else(not_found)
    }

    pub async fn get_category_by_slug(&self, slug: &str) -> CatalogResult<Category> {
        self.store.get_category_by_slug(slug).await?.ok_or_else(not_found)
    }

    #[instrument(skip(self, input), fields(name = %input.name), err)]
    pub async fn create_category(&self, input: NewCategory) -> CatalogResult<Category> {
        let draft = input.into_draft()?;
        if self.store.get_category_by_slug(&draft.slug).await?.is_some() {
            return Err(DomainError::duplicate_slug("category", draft.slug).into());
        }

        let slug = draft.slug.clone();
        let category = self
            .store
            .insert_category(draft, Utc::now())
            .await
            .map_err(slug_conflict("category", &slug))?;
        tracing::info!(category_id = %category.id, slug = %category.slug, "category created");
        Ok(category)
    }

    #[instrument(skip(self, patch), fields(category_id = %id), err)]
    pub async fn update_category(&self, id: CategoryId, patch: CategoryPatch) -> CatalogResult<Category> {
        let mut category = self.get_category(id).await?;

        if let Some(slug) = patch.target_slug()? {
            if slug != category.slug {
                if let Some(other) = self.store.get_category_by_slug(&slug).await? {
                    if other.id != id {
                        return Err(DomainError::duplicate_slug("category", slug).into());
                    }
                }
            }
        }

        patch.apply(&mut category, Utc::now())?;
        let slug = category.slug.clone();
        self.store
            .update_category(&category)
            .await
            .map_err(slug_conflict("category", &slug))?
            .ok_or_else(not_found)
    }

    /// Refuses while any product still names the category's slug.
    #[instrument(skip(self), fields(category_id = %id), err)]
    pub async fn delete_category(&self, id: CategoryId) -> CatalogResult<()> {
        let category = self.get_category(id).await?;
        let count = self.store.count_products_in_category(&category.slug).await?;
        if count > 0 {
            return Err(DomainError::HasDependents { count }.into());
        }
        if !self.store.delete_category(id).await? {
            return Err(not_found());
        }
        tracing::info!(category_id = %id, slug = %category.slug, "category deleted");
        Ok(())
    }

    pub async fn list_subcategories(&self, category_id: CategoryId) -> CatalogResult<Vec<Subcategory>> {
        self.get_category(category_id).await?;
        Ok(self.store.list_subcategories(category_id).await?)
    }

    pub async fn list_child_subcategories(&self, parent_id: SubcategoryId) -> CatalogResult<Vec<Subcategory>> {
        self.get_subcategory(parent_id).await?;
        Ok(self.store.list_child_subcategories(parent_id).await?)
    }

    pub async fn get_subcategory(&self, id: SubcategoryId) -> CatalogResult<Subcategory> {
        self.store.get_subcategory(id).await?.ok_or_else(not_found)
    }

    pub async fn get_subcategory_by_slug(&self, category_id: CategoryId, slug: &str) -> CatalogResult<Subcategory> {
        self.store
            .get_subcategory_by_slug(category_id, slug)
            .await?
            .ok_or_else(not_found)
    }

    #[instrument(skip(self, input), fields(category_id = %input.category_id, name = %input.name), err)]
    pub async fn create_subcategory(&self, input: NewSubcategory) -> CatalogResult<Subcategory> {
        let draft = input.into_draft()?;
        self.get_category(draft.category_id).await?;

        if let Some(parent_id) = draft.parent_subcategory_id {
            let parent = self.existing_parent(parent_id).await?;
            ensure_valid_parent(None, draft.category_id, &parent, false)?;
        }
        if self
            .store
            .get_subcategory_by_slug(draft.category_id, &draft.slug)
            .await?
            .is_some()
        {
            return Err(DomainError::duplicate_slug("subcategory", draft.slug).into());
        }

        let slug = draft.slug.clone();
        let subcategory = self
            .store
            .insert_subcategory(draft, Utc::now())
            .await
            .map_err(slug_conflict("subcategory", &slug))?;
        tracing::info!(subcategory_id = %subcategory.id, slug = %subcategory.slug, "subcategory created");
        Ok(subcategory)
    }

    #[instrument(skip(self, patch), fields(subcategory_id = %id), err)]
    pub async fn update_subcategory(&self, id: SubcategoryId, patch: SubcategoryPatch) -> CatalogResult<Subcategory> {
        let mut subcategory = self.get_subcategory(id).await?;

        if let Some(slug) = patch.target_slug()? {
            if slug != subcategory.slug {
                if let Some(other) = self
                    .store
                    .get_subcategory_by_slug(subcategory.category_id, &slug)
                    .await?
                {
                    if other.id != id {
                        return Err(DomainError::duplicate_slug("subcategory", slug).into());
                    }
                }
            }
        }

        if let Some(Some(parent_id)) = patch.target_parent() {
            let parent = self.existing_parent(parent_id).await?;
            let has_children = self.store.has_children(id).await?;
            ensure_valid_parent(Some(id), subcategory.category_id, &parent, has_children)?;
        }

        patch.apply(&mut subcategory, Utc::now())?;
        let slug = subcategory.slug.clone();
        self.store
            .update_subcategory(&subcategory)
            .await
            .map_err(slug_conflict("subcategory", &slug))?
            .ok_or_else(not_found)
    }

    /// Children of the removed subcategory become top-level.
    #[instrument(skip(self), fields(subcategory_id = %id), err)]
    pub async fn delete_subcategory(&self, id: SubcategoryId) -> CatalogResult<()> {
        if !self.store.delete_subcategory(id).await? {
            return Err(not_found());
        }
        Ok(())
    }

    async fn existing_parent(&self, parent_id: SubcategoryId) -> CatalogResult<Subcategory> {
        self.store.get_subcategory(parent_id).await?.ok_or_else(|| {
            DomainError::invariant(format!("parent subcategory {parent_id} does not exist")).into()
        })
    }
}
