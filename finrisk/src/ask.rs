//! Grounded query service.
//!
//! Serializes the master risk snapshot into a textual context block and asks
//! the model provider to answer strictly from it. Grounding is enforced at
//! the instruction level only; the service never verifies the answer against
//! the context, so tests verify prompt construction, not model obedience.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::ai::ModelProvider;
use crate::catalog;
use crate::config::QueryConfig;
use crate::error::StoreResult;
use crate::store::{Record, TableStore};

/// Answer returned for an empty or whitespace-only question.
pub const EMPTY_QUESTION_ANSWER: &str = "Please ask a finance risk question.";

/// Fixed directive: names the permitted risk domains and pins the model to
/// the supplied dataset.
const SYSTEM_DIRECTIVE: &str = "You are AI FIN RISK.\n\
You analyze loan default, fraud, ESG, market, liquidity and compliance risk.\n\
You must answer ONLY from the dataset.";

/// Answers free-text risk questions from the current dataset snapshot.
///
/// Always produces an answer string for its caller: provider failures come
/// back as an `"AI error: ..."` answer. Only a store failure while reading
/// the snapshot is surfaced as an error.
pub struct GroundedQueryService {
    store: Arc<dyn TableStore>,
    provider: Arc<dyn ModelProvider>,
    config: QueryConfig,
}

impl GroundedQueryService {
    /// Create a query service over the given collaborators.
    pub fn new(
        store: Arc<dyn TableStore>,
        provider: Arc<dyn ModelProvider>,
        config: QueryConfig,
    ) -> Self {
        Self {
            store,
            provider,
            config,
        }
    }

    /// Answer a free-text risk question.
    pub async fn answer(&self, question: &str) -> StoreResult<String> {
        let question = question.trim();
        if question.is_empty() {
            return Ok(EMPTY_QUESTION_ANSWER.to_string());
        }

        let records = self
            .store
            .read_table(catalog::MASTER_RISK_TABLE)
            .await?
            .records();
        let prompt = self.build_prompt(&records, question);

        debug!(
            records = records.len(),
            prompt_chars = prompt.len(),
            "submitting grounded query"
        );

        match self.provider.complete(&prompt).await {
            Ok(answer) => Ok(answer),
            Err(e) => {
                warn!("model provider call failed: {e}");
                Ok(format!("AI error: {e}"))
            }
        }
    }

    /// Assemble directive, context block, and question into one instruction.
    ///
    /// Records are serialized one per line, in set order, up to the
    /// configured record limit.
    fn build_prompt(&self, records: &[Record], question: &str) -> String {
        let limit = self.config.max_context_records;
        if records.len() > limit {
            warn!(
                total = records.len(),
                limit, "risk context truncated to record limit"
            );
        }

        let mut dataset = String::new();
        for record in records.iter().take(limit) {
            dataset.push_str(&record.to_string());
            dataset.push('\n');
        }

        format!("{SYSTEM_DIRECTIVE}\n\nDATA:\n{dataset}\nQuestion: {question}")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::error::{AiError, AiResult};
    use crate::store::MemoryStore;

    /// Scripted provider that records every prompt it receives.
    struct FakeProvider {
        response: AiResult<String>,
        calls: AtomicUsize,
        last_prompt: Mutex<Option<String>>,
    }

    impl FakeProvider {
        fn answering(answer: &str) -> Self {
            Self {
                response: Ok(answer.to_string()),
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(None),
            }
        }

        fn failing() -> Self {
            Self {
                response: Err(AiError::Api {
                    status: 429,
                    message: "quota exceeded".to_string(),
                }),
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(None),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn last_prompt(&self) -> String {
            self.last_prompt
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl ModelProvider for FakeProvider {
        async fn complete(&self, prompt: &str) -> AiResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
            match &self.response {
                Ok(answer) => Ok(answer.clone()),
                Err(AiError::Api { status, message }) => Err(AiError::Api {
                    status: *status,
                    message: message.clone(),
                }),
                Err(_) => Err(AiError::InvalidResponse("unexpected".to_string())),
            }
        }
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn risk_store() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::new().with_table(
            catalog::MASTER_RISK_TABLE,
            strings(&["loan_id", "risk_band", "final_risk_score"]),
            vec![
                strings(&["L-1", "HIGH", "91"]),
                strings(&["L-2", "LOW", "12"]),
            ],
        ))
    }

    fn service(
        store: Arc<MemoryStore>,
        provider: Arc<FakeProvider>,
        config: QueryConfig,
    ) -> GroundedQueryService {
        GroundedQueryService::new(store, provider, config)
    }

    #[tokio::test]
    async fn test_empty_question_skips_provider() {
        let provider = Arc::new(FakeProvider::answering("unused"));
        let svc = service(risk_store(), provider.clone(), QueryConfig::default());

        let answer = svc.answer("   \n\t ").await.unwrap();
        assert_eq!(answer, EMPTY_QUESTION_ANSWER);
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_prompt_contains_records_and_question() {
        let provider = Arc::new(FakeProvider::answering("L-1 looks risky."));
        let svc = service(risk_store(), provider.clone(), QueryConfig::default());

        let answer = svc.answer("Which loan defaults first?").await.unwrap();
        // The answer is the provider's raw response, verbatim.
        assert_eq!(answer, "L-1 looks risky.");
        assert_eq!(provider.call_count(), 1);

        let prompt = provider.last_prompt();
        assert!(prompt.contains("answer ONLY from the dataset"));
        assert!(prompt.contains("loan_id=L-1, risk_band=HIGH, final_risk_score=91"));
        assert!(prompt.contains("loan_id=L-2, risk_band=LOW, final_risk_score=12"));
        assert!(prompt.contains("Question: Which loan defaults first?"));
        // Records keep their set order.
        let first = prompt.find("loan_id=L-1").unwrap();
        let second = prompt.find("loan_id=L-2").unwrap();
        assert!(first < second);
    }

    #[tokio::test]
    async fn test_context_record_limit() {
        let provider = Arc::new(FakeProvider::answering("ok"));
        let config = QueryConfig::default().with_max_context_records(1);
        let svc = service(risk_store(), provider.clone(), config);

        svc.answer("anything").await.unwrap();
        let prompt = provider.last_prompt();
        assert!(prompt.contains("loan_id=L-1"));
        assert!(!prompt.contains("loan_id=L-2"));
    }

    #[tokio::test]
    async fn test_provider_failure_becomes_answer() {
        let provider = Arc::new(FakeProvider::failing());
        let svc = service(risk_store(), provider, QueryConfig::default());

        let answer = svc.answer("Which loan defaults first?").await.unwrap();
        assert!(answer.starts_with("AI error: "));
        assert!(answer.contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let provider = Arc::new(FakeProvider::answering("unused"));
        let svc = service(
            Arc::new(MemoryStore::new()),
            provider.clone(),
            QueryConfig::default(),
        );

        assert!(svc.answer("anything").await.is_err());
        assert_eq!(provider.call_count(), 0);
    }
}
