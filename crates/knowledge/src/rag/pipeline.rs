//! Query answering: classify, retrieve and gate, respond.

use crate::rag::classify::{classify, QueryKind, GREETING};
use crate::rag::gate::GateDecision;
use crate::rag::sources::summarize;
use crate::rag::types::{PipelineResponse, QueryOptions};
use crate::store::VectorStore;
use crate::types::RetrievalResult;
use std::sync::Arc;
use tracing::Instrument;
use vidya_core::config::{GateConfig, GenerationConfig, RetrievalConfig};
use vidya_core::AppResult;
use vidya_llm::TextGenerator;
use vidya_prompt::{format_context, PromptAssembler};

/// Answers teacher queries over a loaded (or absent) embedding index.
///
/// Holds no per-request state; share one instance through `Arc`.
pub struct RagPipeline {
    store: Arc<VectorStore>,
    generator: Arc<dyn TextGenerator>,
    prompts: Arc<PromptAssembler>,
    top_k: usize,
    gate: GateConfig,
    generation: GenerationConfig,
}

impl RagPipeline {
    pub fn new(
        store: Arc<VectorStore>,
        generator: Arc<dyn TextGenerator>,
        prompts: Arc<PromptAssembler>,
        retrieval: &RetrievalConfig,
        generation: &GenerationConfig,
    ) -> Self {
        Self {
            store,
            generator,
            prompts,
            top_k: retrieval.top_k,
            gate: retrieval.gate,
            generation: generation.clone(),
        }
    }

    /// Answer `user_query`.
    ///
    /// Retrieval failures degrade to an ungrounded answer. Generation and
    /// translation failures are returned to the caller.
    pub async fn query(
        &self,
        user_query: &str,
        options: &QueryOptions,
    ) -> AppResult<PipelineResponse> {
        let span = tracing::info_span!("query", language = %options.language);

        async {
            if classify(user_query) == QueryKind::Casual {
                tracing::info!("Casual query, answering with greeting");
                let answer = self
                    .generator
                    .translate(GREETING, &options.language)
                    .await?;
                return Ok(PipelineResponse::answer_only(answer));
            }

            let results = self.retrieve(user_query).await;
            let decision = GateDecision::evaluate(&results, &self.gate);
            tracing::info!(
                passed = decision.passed,
                top_score = ?decision.top_score,
                reason = %decision.reason,
                threshold = self.gate.threshold,
                comparison = self.gate.comparison.symbol(),
                "Retrieval gate"
            );

            let answer = if decision.passed {
                let context = format_context(results.iter().map(|r| r.text.as_str()));
                let prompt = self.prompts.build_grounded_prompt(user_query, &context)?;
                self.generator
                    .generate(&prompt, self.generation.grounded)
                    .await?
            } else {
                let prompt = self.prompts.build_ungrounded_prompt(user_query)?;
                self.generator
                    .generate(&prompt, self.generation.ungrounded)
                    .await?
            };

            let answer = self.generator.translate(&answer, &options.language).await?;

            let sources = if !options.return_sources {
                None
            } else if decision.passed {
                Some(summarize(&results))
            } else {
                Some(Vec::new())
            };

            Ok(PipelineResponse { answer, sources })
        }
        .instrument(span)
        .await
    }

    async fn retrieve(&self, user_query: &str) -> Vec<RetrievalResult> {
        match self.store.search(user_query, self.top_k).await {
            Ok(results) => {
                tracing::debug!(results = results.len(), "Retrieved passages");
                results
            }
            Err(e) => {
                tracing::warn!(error = %e, "Retrieval failed, answering without context");
                Vec::new()
            }
        }
    }
}
