use chrono::Utc;
use tracing::instrument;

use catalog_core::{DomainError, LeadId};
use catalog_leads::{CatalogueRequest, NewCatalogueRequest, NewsletterEmail, PageInfo, PageRequest, normalize_email};

use super::{CatalogError, CatalogResult, CatalogService, not_found};

impl CatalogService {
    /// Newest first.
    pub async fn list_leads(&self, page: PageRequest) -> CatalogResult<(Vec<CatalogueRequest>, PageInfo)> {
        let (leads, total) = self.store.list_leads(page).await?;
        Ok((leads, page.info(total)))
    }

    #[instrument(skip(self, input), err)]
    pub async fn record_lead(&self, input: NewCatalogueRequest) -> CatalogResult<CatalogueRequest> {
        let lead = self.store.record_lead(input.validated()?, Utc::now()).await?;
        tracing::info!(lead_id = %lead.id, product_id = ?lead.product_id, "catalogue request recorded");
        Ok(lead)
    }

    #[instrument(skip(self), fields(lead_id = %id), err)]
    pub async fn delete_lead(&self, id: LeadId) -> CatalogResult<()> {
        if !self.store.delete_lead(id).await? {
            return Err(not_found());
        }
        Ok(())
    }

    pub async fn list_newsletter_emails(&self) -> CatalogResult<Vec<NewsletterEmail>> {
        Ok(self.store.list_newsletter_emails().await?)
    }

    /// An address can only be subscribed once.
    #[instrument(skip(self, email), err)]
    pub async fn subscribe(&self, email: &str) -> CatalogResult<NewsletterEmail> {
        let email = normalize_email(email)?;
        self.store.subscribe(&email, Utc::now()).await.map_err(|e| {
            if e.is_unique_violation() {
                CatalogError::from(DomainError::validation(format!("{email} is already subscribed")))
            } else {
                e.into()
            }
        })
    }
}
