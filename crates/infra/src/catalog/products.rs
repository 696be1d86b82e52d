use chrono::Utc;
use tracing::instrument;

use catalog_core::ProductId;
use catalog_products::{NewProduct, Product, ProductPatch, ProductStatus};

use super::{CatalogResult, CatalogService, not_found};

impl CatalogService {
    pub async fn list_products(&self) -> CatalogResult<Vec<Product>> {
        Ok(self.store.list_products().await?)
    }

    /// A blank query lists everything.
    pub async fn search_products(&self, query: &str) -> CatalogResult<Vec<Product>> {
        if query.trim().is_empty() {
            return self.list_products().await;
        }
        Ok(self.store.search_products(query.trim()).await?)
    }

    pub async fn list_products_by_category(&self, slug: &str) -> CatalogResult<Vec<Product>> {
        Ok(self.store.list_products_by_category(slug).await?)
    }

    pub async fn list_products_by_status(&self, status: ProductStatus) -> CatalogResult<Vec<Product>> {
        Ok(self.store.list_products_by_status(status).await?)
    }

    pub async fn get_product(&self, id: ProductId) -> CatalogResult<Product> {
        self.store.get_product(id).await?.ok_or_else(not_found)
    }

    pub async fn count_products_in_category(&self, slug: &str) -> CatalogResult<u64> {
        Ok(self.store.count_products_in_category(slug).await?)
    }

    /// Blank text collapses to NULL and blank features are dropped; nothing
    /// else is checked here.
    #[instrument(skip(self, input), fields(category = %input.category), err)]
    pub async fn create_product(&self, input: NewProduct) -> CatalogResult<Product> {
        let product = self.store.insert_product(input.normalized(), Utc::now()).await?;
        tracing::info!(product_id = %product.id, status = %product.status, "product created");
        Ok(product)
    }

    #[instrument(skip(self, patch), fields(product_id = %id), err)]
    pub async fn update_product(&self, id: ProductId, patch: ProductPatch) -> CatalogResult<Product> {
        let mut product = self.get_product(id).await?;
        patch.apply(&mut product, Utc::now());
        self.store.update_product(&product).await?.ok_or_else(not_found)
    }

    /// Stored files are left in place.
    #[instrument(skip(self), fields(product_id = %id), err)]
    pub async fn delete_product(&self, id: ProductId) -> CatalogResult<()> {
        if !self.store.delete_product(id).await? {
            return Err(not_found());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::catalog::CatalogError;
    use crate::store::InMemoryCatalogStore;
    use catalog_core::DomainError;
    use catalog_products::ProductData;

    fn service() -> CatalogService {
        CatalogService::new(Arc::new(InMemoryCatalogStore::new()))
    }

    fn pump() -> NewProduct {
        NewProduct {
            name: "VS Pump".to_string(),
            description: Some("Variable speed".to_string()),
            category: "pumps".to_string(),
            subcategory: Some("residential".to_string()),
            status: None,
            data: ProductData {
                features: vec!["Quiet".to_string(), " ".to_string()],
                images: vec!["https://cdn/p.png".to_string()],
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn create_defaults_to_draft_and_drops_blank_features() {
        let svc = service();
        let product = svc.create_product(pump()).await.unwrap();

        assert_eq!(product.status, ProductStatus::Draft);
        assert_eq!(product.data.features, vec!["Quiet".to_string()]);
        assert_eq!(svc.get_product(product.id).await.unwrap(), product);
    }

    #[tokio::test]
    async fn partial_update_keeps_unspecified_fields() {
        let svc = service();
        let created = svc.create_product(pump()).await.unwrap();

        let patch: ProductPatch = serde_json::from_str(r#"{"name": "VS Pump Pro", "subcategory": ""}"#).unwrap();
        let updated = svc.update_product(created.id, patch).await.unwrap();

        assert_eq!(updated.name, "VS Pump Pro");
        assert_eq!(updated.subcategory, None);
        assert_eq!(updated.description, created.description);
        assert_eq!(updated.category, created.category);
        assert_eq!(updated.data, created.data);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn missing_product_is_not_found() {
        let svc = service();
        let err = svc
            .update_product(ProductId::new(77), ProductPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Domain(DomainError::NotFound)));
        assert!(matches!(
            svc.delete_product(ProductId::new(77)).await.unwrap_err(),
            CatalogError::Domain(DomainError::NotFound)
        ));
    }

    #[tokio::test]
    async fn filters_by_category_status_and_search() {
        let svc = service();
        svc.create_product(pump()).await.unwrap();
        svc.create_product(NewProduct {
            name: "Gas Heater".to_string(),
            category: "heaters".to_string(),
            status: Some(ProductStatus::Active),
            ..Default::default()
        })
        .await
        .unwrap();

        assert_eq!(svc.list_products_by_category("heaters").await.unwrap().len(), 1);
        assert_eq!(svc.list_products_by_status(ProductStatus::Draft).await.unwrap().len(), 1);
        assert_eq!(svc.search_products("variable").await.unwrap()[0].name, "VS Pump");
        assert_eq!(svc.search_products("HEAT").await.unwrap()[0].name, "Gas Heater");
        assert_eq!(svc.search_products("").await.unwrap().len(), 2);
        assert_eq!(svc.count_products_in_category("pumps").await.unwrap(), 1);
    }
}
