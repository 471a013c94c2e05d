use super::error::ChatError;
use crate::domain::plan::FeatureKind;
use crate::domain::resource::{FileResource, WebsiteUrl};
use crate::domain::subscription::SubscriptionService;
use crate::infrastructure::repositories::{
    PlanRepository, ResourceRepository, RetrievalRepository, ScrapeRepository, StorageRepository,
};
use html2text::from_read;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ChatAnswer {
    pub answer: String,
    pub credits_left: i64,
}

/// Credit-gated wrapper around the retrieval pipeline.
///
/// The order of operations is fixed: resolve the active resource, deduct
/// credits, then - and only then - do the external work (payload
/// loading, scraping, embedding, generation). A rejected credit check
/// never reaches the network.
pub struct ChatService {
    resource_repo: Arc<dyn ResourceRepository>,
    storage_repo: Arc<dyn StorageRepository>,
    scrape_repo: Arc<dyn ScrapeRepository>,
    retrieval_repo: Arc<dyn RetrievalRepository>,
    plan_repo: Arc<dyn PlanRepository>,
    subscription_service: Arc<SubscriptionService>,
    cache: Option<Cache<String, String>>,
    refund_on_failure: bool,
}

/// The selected context source; files take precedence over URLs
enum ActiveResource {
    File(FileResource),
    Url(WebsiteUrl),
}

impl ActiveResource {
    fn cache_key(&self, user_id: Uuid, question: &str) -> String {
        match self {
            ActiveResource::File(file) => format!("file:{}:{}:{}", user_id, file.name, question),
            ActiveResource::Url(entry) => format!("url:{}:{}:{}", user_id, entry.url, question),
        }
    }
}

impl ChatService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        resource_repo: Arc<dyn ResourceRepository>,
        storage_repo: Arc<dyn StorageRepository>,
        scrape_repo: Arc<dyn ScrapeRepository>,
        retrieval_repo: Arc<dyn RetrievalRepository>,
        plan_repo: Arc<dyn PlanRepository>,
        subscription_service: Arc<SubscriptionService>,
        cache_enabled: bool,
        refund_on_failure: bool,
    ) -> Self {
        let cache = if cache_enabled {
            Some(
                Cache::builder()
                    .max_capacity(100)
                    .time_to_idle(Duration::from_secs(30 * 60)) // 30 minutes, refreshes on access
                    .build(),
            )
        } else {
            None
        };

        Self {
            resource_repo,
            storage_repo,
            scrape_repo,
            retrieval_repo,
            plan_repo,
            subscription_service,
            cache,
            refund_on_failure,
        }
    }

    /// Answer a question against the user's active resource, billed under
    /// the given plan
    pub async fn ask(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        question: &str,
    ) -> Result<ChatAnswer, ChatError> {
        if question.trim().is_empty() {
            return Err(ChatError::Invalid("question cannot be empty".to_string()));
        }

        tracing::info!(
            user_id = %user_id,
            question_length = question.len(),
            "AI query request"
        );

        // 1. The active resource must exist before anything is billed
        let active = self.resolve_active(user_id).await?;

        // 2. Credit check and deduction - before any external call
        let cost = self.unit_cost(plan_id).await?;
        let credits_left = self
            .subscription_service
            .authorize_and_deduct(user_id, plan_id, cost)
            .await?;

        // 3. Cache lookup; a hit still counts as a billed attempt
        let cache_key = active.cache_key(user_id, question);
        if let Some(cache) = &self.cache {
            if let Some(answer) = cache.get(&cache_key).await {
                tracing::info!(user_id = %user_id, "Answer cache hit");
                return Ok(ChatAnswer {
                    answer,
                    credits_left,
                });
            }
        }

        // 4. Materialize the context and run the retrieval pipeline
        let answer = match self.answer_against(&active, question).await {
            Ok(answer) => answer,
            Err(e) => {
                self.maybe_refund(user_id, plan_id, cost).await;
                return Err(e);
            }
        };

        if let Some(cache) = &self.cache {
            cache.insert(cache_key, answer.clone()).await;
        }

        Ok(ChatAnswer {
            answer,
            credits_left,
        })
    }
}

impl ChatService {
    /// Find the active resource. Files take precedence over URLs when
    /// both kinds have an active entry.
    async fn resolve_active(&self, user_id: Uuid) -> Result<ActiveResource, ChatError> {
        if let Some(file) = self
            .resource_repo
            .find_active_file(user_id)
            .await
            .map_err(ChatError::from)?
        {
            return Ok(ActiveResource::File(file));
        }

        if let Some(entry) = self
            .resource_repo
            .find_active_url(user_id)
            .await
            .map_err(ChatError::from)?
        {
            return Ok(ActiveResource::Url(entry));
        }

        Err(ChatError::NoActiveResource)
    }

    /// Load the resource text and run the retrieval pipeline over it
    async fn answer_against(
        &self,
        active: &ActiveResource,
        question: &str,
    ) -> Result<String, ChatError> {
        let text = match active {
            ActiveResource::File(file) => {
                let bytes = self
                    .storage_repo
                    .load(&file.storage_key)
                    .await
                    .map_err(ChatError::Dependency)?;
                extract_text(&file.content_type, &bytes)?
            }
            ActiveResource::Url(entry) => self
                .scrape_repo
                .fetch_text(&entry.url)
                .await
                .map_err(ChatError::Dependency)?,
        };

        self.retrieval_repo
            .answer(&text, question)
            .await
            .map_err(ChatError::Dependency)
    }

    async fn unit_cost(&self, plan_id: Uuid) -> Result<i64, ChatError> {
        let plan = self
            .plan_repo
            .find_by_id(plan_id)
            .await
            .map_err(|e| ChatError::Dependency(e.to_string()))?
            .ok_or_else(|| ChatError::Invalid("unknown plan".to_string()))?;

        plan.unit_cost(FeatureKind::AiMessage).ok_or_else(|| {
            ChatError::Invalid(format!("plan {} does not include ai messages", plan.name))
        })
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
            tracing::warn!(user_id = %user_id, error = %e, "Refund after failed query did not apply");
        }
    }
}

/// Decode stored file bytes into plain text. Text extraction for binary
/// formats lives outside this service; only text-bearing content types
/// are accepted here.
fn extract_text(content_type: &str, bytes: &[u8]) -> Result<String, ChatError> {
    let text = if content_type.contains("html") {
        from_read(bytes, 120)
    } else if content_type.starts_with("text/")
        || content_type.contains("json")
        || content_type.contains("markdown")
    {
        String::from_utf8_lossy(bytes).into_owned()
    } else {
        return Err(ChatError::Invalid(format!(
            "content type {} is not supported for retrieval",
            content_type
        )));
    };

    // Collapse runs of whitespace so chunking sees clean text
    let whitespace = regex::Regex::new(r"\s+").unwrap();
    Ok(whitespace.replace_all(text.trim(), " ").into_owned())
}
