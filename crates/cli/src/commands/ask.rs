//! Ask command handler.
//!
//! Runs one query through the answering pipeline.

use clap::Args;
use std::sync::Arc;
use std::time::Duration;
use vidya_core::{config::AppConfig, AppError, AppResult};
use vidya_knowledge::{create_provider, PipelineResponse, QueryOptions, RagPipeline, VectorStore};
use vidya_llm::{create_client, LlmGenerator};
use vidya_prompt::{PromptAssembler, PromptLibrary};

/// Answer a teacher's question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub query: String,

    /// Language of the answer
    #[arg(short, long, default_value = "English")]
    pub language: String,

    /// Show the passages the answer was grounded on
    #[arg(short, long)]
    pub sources: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        if self.query.trim().is_empty() {
            return Err(AppError::Config("No query provided".to_string()));
        }
        config.validate()?;

        let pipeline = build_pipeline(config)?;
        let options = QueryOptions::in_language(self.language.as_str()).with_sources(self.sources);

        let response = pipeline.query(&self.query, &options).await?;

        if self.json {
            let json = serde_json::to_string_pretty(&response)?;
            println!("{}", json);
        } else {
            print_response(&response);
        }

        Ok(())
    }
}

/// Wire the store, prompts and generator described by `config`.
fn build_pipeline(config: &AppConfig) -> AppResult<RagPipeline> {
    let embedder = create_provider(&config.embedding)?;
    let store = VectorStore::open(&config.index_dir(), embedder)?;
    tracing::debug!(stats = ?store.stats(), "Opened vector store");

    let library = PromptLibrary::load(config.prompts_dir().as_deref())?;
    let prompts = Arc::new(PromptAssembler::new(&library)?);

    let api_key = config.resolve_api_key();
    let client = create_client(
        &config.llm.provider,
        config.llm.endpoint.as_deref(),
        api_key.as_deref(),
        Duration::from_secs(config.llm.timeout_secs),
    )?;
    let generator = LlmGenerator::new(
        client,
        config.llm.model.as_str(),
        Arc::clone(&prompts),
        &config.generation,
    )?;
    tracing::debug!(
        provider = generator.provider_name(),
        model = %config.llm.model,
        "Created generator"
    );

    Ok(RagPipeline::new(
        Arc::new(store),
        Arc::new(generator),
        prompts,
        &config.retrieval,
        &config.generation,
    ))
}

fn print_response(response: &PipelineResponse) {
    println!("{}", response.answer);

    if let Some(sources) = &response.sources {
        println!();
        if sources.is_empty() {
            println!("Sources: none (general guidance)");
        } else {
            println!("Sources:");
            for (i, source) in sources.iter().enumerate() {
                let origin = source
                    .metadata
                    .get("source")
                    .map(String::as_str)
                    .unwrap_or("unknown");
                println!("  [{}] {} (score {:.3})", i + 1, origin, source.score);
                println!("      {}", source.text);
            }
        }
    }
}
