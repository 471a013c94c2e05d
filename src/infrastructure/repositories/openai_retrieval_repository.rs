use super::retrieval_repository::RetrievalRepository;
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, CreateEmbeddingRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use sha2::{Digest, Sha256};
use std::sync::Arc;

const EMBEDDING_MODEL: &str = "text-embedding-3-small";
const EMBEDDING_DIMENSIONS: u32 = 1024;
const CHAT_MODEL: &str = "gpt-4.1-mini";
const CHUNK_SIZE: usize = 1000;
const CHUNK_OVERLAP: usize = 200;
const TOP_K: usize = 4;

/// OpenAI + Pinecone implementation of the retrieval pipeline:
/// chunk the context, embed the chunks, upsert them into a
/// per-document Pinecone namespace, search with the embedded question
/// and answer with a chat completion over the retrieved chunks.
pub struct OpenAiRetrievalRepository {
    openai_client: Arc<Client<OpenAIConfig>>,
    http_client: reqwest::Client,
    pinecone_api_key: String,
    pinecone_index_host: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
    metadata: Option<serde_json::Value>,
}

impl OpenAiRetrievalRepository {
    pub fn new(
        openai_client: Arc<Client<OpenAIConfig>>,
        pinecone_api_key: String,
        pinecone_index_host: String,
    ) -> Self {
        Self {
            openai_client,
            http_client: reqwest::Client::new(),
            pinecone_api_key,
            pinecone_index_host,
        }
    }

    /// Stable namespace per document so different resources never mix
    fn namespace_for(context: &str) -> String {
        let digest = Sha256::digest(context.as_bytes());
        format!("doc-{}", hex::encode(&digest[..16]))
    }

    /// Fixed-size character chunks with overlap, cut on char boundaries
    fn split_into_chunks(text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        if chars.len() <= CHUNK_SIZE {
            return vec![text.to_string()];
        }

        let step = CHUNK_SIZE - CHUNK_OVERLAP;
        let mut chunks = Vec::new();
        let mut start = 0;
        while start < chars.len() {
            let end = (start + CHUNK_SIZE).min(chars.len());
            chunks.push(chars[start..end].iter().collect());
            if end == chars.len() {
                break;
            }
            start += step;
        }
        chunks
    }

    async fn embed(&self, inputs: Vec<String>) -> Result<Vec<Vec<f32>>, String> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(EMBEDDING_MODEL)
            .dimensions(EMBEDDING_DIMENSIONS)
            .input(inputs)
            .build()
            .map_err(|e| format!("failed to build embedding request: {}", e))?;

        let response = self
            .openai_client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| format!("embedding request failed: {}", e))?;

        let mut embeddings: Vec<(u32, Vec<f32>)> = response
            .data
            .into_iter()
            .map(|e| (e.index, e.embedding))
            .collect();
        embeddings.sort_by_key(|(index, _)| *index);

        Ok(embeddings.into_iter().map(|(_, e)| e).collect())
    }

    async fn upsert_chunks(
        &self,
        namespace: &str,
        chunks: &[String],
        embeddings: &[Vec<f32>],
    ) -> Result<(), String> {
        let vectors: Vec<serde_json::Value> = chunks
            .iter()
            .zip(embeddings.iter())
            .enumerate()
            .map(|(i, (chunk, embedding))| {
                json!({
                    "id": format!("{}-{}", namespace, i),
                    "values": embedding,
                    "metadata": { "text": chunk },
                })
            })
            .collect();

        let response = self
            .http_client
            .post(format!("{}/vectors/upsert", self.pinecone_index_host))
            .header("Api-Key", &self.pinecone_api_key)
            .json(&json!({ "vectors": vectors, "namespace": namespace }))
            .send()
            .await
            .map_err(|e| format!("Pinecone upsert failed: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("Pinecone upsert failed: HTTP {}", response.status()));
        }
        Ok(())
    }

    async fn search(
        &self,
        namespace: &str,
        query_embedding: &[f32],
    ) -> Result<Vec<String>, String> {
        let response = self
            .http_client
            .post(format!("{}/query", self.pinecone_index_host))
            .header("Api-Key", &self.pinecone_api_key)
            .json(&json!({
                "vector": query_embedding,
                "topK": TOP_K,
                "includeMetadata": true,
                "namespace": namespace,
            }))
            .send()
            .await
            .map_err(|e| format!("Pinecone query failed: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("Pinecone query failed: HTTP {}", response.status()));
        }

        let body: QueryResponse = response
            .json()
            .await
            .map_err(|e| format!("failed to parse Pinecone response: {}", e))?;

        Ok(body
            .matches
            .into_iter()
            .filter_map(|m| {
                m.metadata
                    .and_then(|meta| meta.get("text").and_then(|t| t.as_str().map(String::from)))
            })
            .collect())
    }

    async fn generate(&self, context: &str, question: &str) -> Result<String, String> {
        let system = ChatCompletionRequestSystemMessageArgs::default()
            .content(format!(
                "You are a helpful assistant. Use the following context to answer \
                 the question:\n\n{}\n\nAnswer concisely.",
                context
            ))
            .build()
            .map_err(|e| format!("failed to build system message: {}", e))?;

        let user = ChatCompletionRequestUserMessageArgs::default()
            .content(question.to_string())
            .build()
            .map_err(|e| format!("failed to build user message: {}", e))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(CHAT_MODEL)
            .messages([system.into(), user.into()])
            .build()
            .map_err(|e| format!("failed to build chat request: {}", e))?;

        let response = self
            .openai_client
            .chat()
            .create(request)
            .await
            .map_err(|e| format!("chat completion failed: {}", e))?;

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| "chat completion returned no content".to_string())
    }
}

#[async_trait]
impl RetrievalRepository for OpenAiRetrievalRepository {
    async fn answer(&self, context: &str, question: &str) -> Result<String, String> {
        let namespace = Self::namespace_for(context);
        let chunks = Self::split_into_chunks(context);

        tracing::info!(
            namespace = %namespace,
            chunk_count = chunks.len(),
            question_length = question.len(),
            "Running retrieval pipeline"
        );

        let chunk_embeddings = self.embed(chunks.clone()).await?;
        self.upsert_chunks(&namespace, &chunks, &chunk_embeddings)
            .await?;

        let question_embedding = self
            .embed(vec![question.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| "embedding response was empty".to_string())?;

        let retrieved = self.search(&namespace, &question_embedding).await?;
        let retrieved_context = retrieved.join("\n");

        self.generate(&retrieved_context, question).await
    }
}
