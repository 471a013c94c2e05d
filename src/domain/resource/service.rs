use super::error::ResourceError;
use super::model::{FileResource, ResourceKind, WebsiteUrl};
use crate::domain::plan::FeatureKind;
use crate::domain::subscription::SubscriptionService;
use crate::infrastructure::repositories::{
    PlanRepository, ResourceRepository, StorageRepository,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Outcome of a credit-metered upload
#[derive(Debug, Clone)]
pub struct UploadReceipt {
    pub credits_left: i64,
}

/// Access resource registry: owns the per-user file and URL collections
/// and the "at most one active entry per kind" invariant.
///
/// Uploads are credit-metered: the deduction commits before the side
/// effect, so a rejected balance check never stores anything. When the
/// side effect fails after the deduction, the refund policy decides
/// whether the credits come back.
pub struct ResourceService {
    resource_repo: Arc<dyn ResourceRepository>,
    storage_repo: Arc<dyn StorageRepository>,
    plan_repo: Arc<dyn PlanRepository>,
    subscription_service: Arc<SubscriptionService>,
    refund_on_failure: bool,
}

impl ResourceService {
    pub fn new(
        resource_repo: Arc<dyn ResourceRepository>,
        storage_repo: Arc<dyn StorageRepository>,
        plan_repo: Arc<dyn PlanRepository>,
        subscription_service: Arc<SubscriptionService>,
        refund_on_failure: bool,
    ) -> Self {
        Self {
            resource_repo,
            storage_repo,
            plan_repo,
            subscription_service,
            refund_on_failure,
        }
    }

    /// Upload a file under the given plan, deducting the plan's
    /// file-upload credit cost
    pub async fn upload_file(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        name: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<(FileResource, UploadReceipt), ResourceError> {
        if name.is_empty() {
            return Err(ResourceError::Invalid("file name is required".to_string()));
        }
        if bytes.is_empty() {
            return Err(ResourceError::Invalid("file is empty".to_string()));
        }

        let cost = self.unit_cost(plan_id, FeatureKind::FileUpload).await?;
        let credits_left = self
            .subscription_service
            .authorize_and_deduct(user_id, plan_id, cost)
            .await?;

        let storage_key = match self.storage_repo.store(name, bytes).await {
            Ok(key) => key,
            Err(e) => {
                self.maybe_refund(user_id, plan_id, cost).await;
                return Err(ResourceError::Dependency(e));
            }
        };

        let file = FileResource {
            id: Uuid::new_v4(),
            user_id,
            name: name.to_string(),
            storage_key,
            content_type: content_type.to_string(),
            is_active: false,
            uploaded_at: Utc::now(),
        };

        if let Err(e) = self.resource_repo.insert_file(&file).await {
            self.maybe_refund(user_id, plan_id, cost).await;
            return Err(ResourceError::from(e));
        }

        tracing::info!(
            user_id = %user_id,
            file = %file.name,
            credits_left,
            "File uploaded"
        );

        Ok((file, UploadReceipt { credits_left }))
    }

    /// Register a website URL under the given plan, deducting the plan's
    /// url-upload credit cost
    pub async fn add_url(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        url: &str,
    ) -> Result<(WebsiteUrl, UploadReceipt), ResourceError> {
        self.validate_url(url)?;

        let cost = self.unit_cost(plan_id, FeatureKind::UrlUpload).await?;
        let credits_left = self
            .subscription_service
            .authorize_and_deduct(user_id, plan_id, cost)
            .await?;

        let entry = WebsiteUrl {
            id: Uuid::new_v4(),
            user_id,
            url: url.to_string(),
            is_active: false,
            added_at: Utc::now(),
        };

        if let Err(e) = self.resource_repo.insert_url(&entry).await {
            self.maybe_refund(user_id, plan_id, cost).await;
            return Err(ResourceError::from(e));
        }

        tracing::info!(
            user_id = %user_id,
            url = %entry.url,
            credits_left,
            "URL registered"
        );

        Ok((entry, UploadReceipt { credits_left }))
    }

    /// Mark one entry active and deactivate its siblings of the same kind.
    /// The repository does this in a single write; the other kind is
    /// never touched.
    pub async fn set_active(
        &self,
        user_id: Uuid,
        kind: ResourceKind,
        identifier: &str,
    ) -> Result<(), ResourceError> {
        if identifier.is_empty() {
            return Err(ResourceError::Invalid(
                "an identifier is required".to_string(),
            ));
        }

        let found = self
            .resource_repo
            .set_active(user_id, kind, identifier)
            .await
            .map_err(ResourceError::from)?;

        if !found {
            return Err(ResourceError::NotFound);
        }

        tracing::info!(user_id = %user_id, kind = %kind, identifier, "Resource activated");
        Ok(())
    }

    /// Delete an entry together with its stored payload.
    ///
    /// For files the payload is removed first: a payload that is already
    /// gone fails the whole delete, so a record never silently disappears
    /// while its storage is unaccounted for.
    pub async fn delete(
        &self,
        user_id: Uuid,
        kind: ResourceKind,
        identifier: &str,
    ) -> Result<(), ResourceError> {
        if kind == ResourceKind::File {
            let file = self
                .resource_repo
                .find_file(user_id, identifier)
                .await
                .map_err(ResourceError::from)?
                .ok_or(ResourceError::NotFound)?;

            let deleted = self
                .storage_repo
                .delete(&file.storage_key)
                .await
                .map_err(ResourceError::Dependency)?;

            if !deleted {
                return Err(ResourceError::NotFound);
            }
        }

        let removed = self
            .resource_repo
            .remove(user_id, kind, identifier)
            .await
            .map_err(ResourceError::from)?;

        if !removed {
            return Err(ResourceError::NotFound);
        }

        tracing::info!(user_id = %user_id, kind = %kind, identifier, "Resource deleted");
        Ok(())
    }

    pub async fn list_files(&self, user_id: Uuid) -> Result<Vec<FileResource>, ResourceError> {
        self.resource_repo
            .list_files(user_id)
            .await
            .map_err(ResourceError::from)
    }

    pub async fn list_urls(&self, user_id: Uuid) -> Result<Vec<WebsiteUrl>, ResourceError> {
        self.resource_repo
            .list_urls(user_id)
            .await
            .map_err(ResourceError::from)
    }
}

impl ResourceService {
    async fn unit_cost(&self, plan_id: Uuid, kind: FeatureKind) -> Result<i64, ResourceError> {
        let plan = self
            .plan_repo
            .find_by_id(plan_id)
            .await
            .map_err(ResourceError::from)?
            .ok_or_else(|| ResourceError::Invalid("unknown plan".to_string()))?;

        plan.unit_cost(kind).ok_or_else(|| {
            ResourceError::Invalid(format!("plan {} does not include {}", plan.name, kind))
        })
    }

    fn validate_url(&self, url: &str) -> Result<(), ResourceError> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ResourceError::Invalid("Invalid URL format".to_string()));
        }
        Ok(())
    }

    async fn maybe_refund(&self, user_id: Uuid, plan_id: Uuid, cost: i64) {
        if !self.refund_on_failure {
            return;
        }
        if let Err(e) = self
            .subscription_service
            .refund_active(user_id, plan_id, cost)
            .await
        {
            tracing::warn!(user_id = %user_id, error = %e, "Refund after failed upload did not apply");
        }
    }
}
