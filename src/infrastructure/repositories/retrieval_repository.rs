use async_trait::async_trait;

/// Repository for retrieval-augmented answering.
/// Abstracts the chunk/embed/store/search/generate pipeline behind a
/// single call so the chat service stays a thin credit-gated wrapper.
///
/// Implementations are responsible for:
/// - Splitting the context text into chunks
/// - Embedding chunks and the question
/// - Vector storage and similarity search
/// - Prompting the chat model with the retrieved context
#[async_trait]
pub trait RetrievalRepository: Send + Sync {
    /// Answer a question against the given context text
    ///
    /// # Errors
    /// Returns error if any stage of the pipeline fails or a provider is
    /// unavailable
    async fn answer(&self, context: &str, question: &str) -> Result<String, String>;
}
