//! Ask command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::openai;
use crate::rag::SegmentKind;
use crate::session::Session;
use anyhow::Result;
use console::style;
use std::collections::BTreeSet;

/// Run the ask command.
pub async fn run_ask(question: &str, model: Option<String>, mut settings: Settings) -> Result<()> {
    // the chat model is always OpenAI, whatever the embedding provider
    if let Err(e) = openai::ensure_api_key() {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    if let Some(model) = model {
        settings.rag.model = model;
    }

    let session = Session::new(settings)?;
    let engine = session.engine();

    let spinner = Output::spinner("Consultando la base de transcritos...");

    match engine.ask(question).await {
        Ok(response) => {
            spinner.finish_and_clear();

            println!();
            for segment in &response.answer.segments {
                match segment.kind {
                    SegmentKind::Normal => println!("{}\n", segment.content),
                    SegmentKind::Emphasis => {
                        println!("{}\n", style(&segment.content).magenta().bold())
                    }
                }
            }

            if !response.sources.is_empty() {
                let names: BTreeSet<String> = response
                    .sources
                    .iter()
                    .map(|doc| engine.formatter().clean_source(&doc.source))
                    .collect();

                Output::header("Fuentes consultadas");
                for name in names {
                    Output::kv("Fuente", &name);
                }
            }
            Ok(())
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to generate answer: {}", e));
            Err(e.into())
        }
    }
}
