//! Index command handler.
//!
//! Builds the embedding index from the ingestion corpus and reports on it.

use clap::{Args, Subcommand};
use std::path::PathBuf;
use std::time::Instant;
use vidya_core::{config::AppConfig, AppError, AppResult};
use vidya_knowledge::{create_provider, load_corpus, EmbeddingIndex, VectorStore};

/// Build and inspect the embedding index
#[derive(Args, Debug)]
pub struct IndexCommand {
    #[command(subcommand)]
    pub action: IndexAction,
}

#[derive(Subcommand, Debug)]
pub enum IndexAction {
    /// Embed the corpus and write the index
    Build(IndexBuildCommand),
    /// Show index statistics
    Stats(IndexStatsCommand),
}

impl IndexCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        config.validate_retrieval()?;

        match &self.action {
            IndexAction::Build(cmd) => cmd.execute(config).await,
            IndexAction::Stats(cmd) => cmd.execute(config),
        }
    }
}

/// Embed the corpus and write the index
#[derive(Args, Debug)]
pub struct IndexBuildCommand {
    /// Corpus JSON (default: retrieval.corpusPath)
    #[arg(long)]
    pub corpus: Option<PathBuf>,

    /// Output directory (default: retrieval.indexDir)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IndexBuildCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let corpus_path = self.corpus.clone().unwrap_or_else(|| config.corpus_path());
        let out_dir = self.out.clone().unwrap_or_else(|| config.index_dir());

        tracing::info!(
            corpus = %corpus_path.display(),
            out = %out_dir.display(),
            "Executing index build command"
        );

        let start = Instant::now();
        let provider = create_provider(&config.embedding)?;
        let chunks = load_corpus(&corpus_path)?;

        let index = EmbeddingIndex::build(chunks, provider.as_ref()).await?;
        index.persist(&out_dir)?;
        let duration = start.elapsed();

        if self.json {
            let output = serde_json::json!({
                "indexDir": out_dir,
                "chunkCount": index.len(),
                "dimension": index.dimension(),
                "model": index.model(),
                "durationSecs": duration.as_secs_f64(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!(
                "Indexed {} chunks ({} dimensions, {}) in {:.2}s",
                index.len(),
                index.dimension(),
                index.model(),
                duration.as_secs_f64()
            );
            println!("Wrote {}", out_dir.display());
        }

        Ok(())
    }
}

/// Show index statistics
#[derive(Args, Debug)]
pub struct IndexStatsCommand {
    /// Index directory (default: retrieval.indexDir)
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IndexStatsCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let dir = self.dir.clone().unwrap_or_else(|| config.index_dir());
        tracing::info!(dir = %dir.display(), "Executing index stats command");

        let provider = create_provider(&config.embedding)?;
        let store = VectorStore::open(&dir, provider)?;
        let stats = store.stats();

        if !stats.loaded {
            return Err(AppError::NotFound(format!(
                "No index at {}. Run 'vidya index build' first.",
                dir.display()
            )));
        }

        if self.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else {
            println!("Index:      {}", dir.display());
            println!("Chunks:     {}", stats.chunk_count);
            println!("Dimensions: {}", stats.dimension);
            println!("Model:      {}", stats.model.as_deref().unwrap_or("unknown"));
            if let Some(built_at) = stats.built_at {
                println!("Built:      {}", built_at.to_rfc3339());
            }
        }

        Ok(())
    }
}
