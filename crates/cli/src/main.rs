use anyhow::Context;
use api_rest::{AppConfig, AppState};
use api_shared::{ModelRes, SuggestCidRes};
use clap::{Args, Parser, Subcommand};
use cid_core::constants::{DEFAULT_BLOCKLIST_DIR, GIVEN_NAMES_FILENAME, SURNAMES_FILENAME};
use cid_core::{Blocklist, SuggestionRequest};
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cid")]
#[command(about = "CID-10 suggestion service CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the models offered by the provider, best first
    Models,
    /// Check a clinical text against the personal-name blocklist
    Screen {
        #[command(flatten)]
        input: TextInput,
        /// Directory holding nomes.txt and sobrenomes.txt
        #[arg(long, env = "CID_BLOCKLIST_DIR", default_value = DEFAULT_BLOCKLIST_DIR)]
        blocklist_dir: PathBuf,
    },
    /// Ask the model for ICD-10 suggestions
    Suggest {
        #[command(flatten)]
        input: TextInput,
        /// Medical specialty (optional)
        #[arg(long)]
        specialty: Option<String>,
        /// Model id as listed by `cid models`
        #[arg(long)]
        model: Option<String>,
    },
}

/// Clinical text source; stdin when neither flag is given.
#[derive(Args)]
struct TextInput {
    /// Clinical text
    #[arg(long, conflicts_with = "file")]
    text: Option<String>,
    /// File containing the clinical text
    #[arg(long)]
    file: Option<PathBuf>,
}

impl TextInput {
    fn read(self) -> anyhow::Result<String> {
        match (self.text, self.file) {
            (Some(text), _) => Ok(text),
            (None, Some(path)) => std::fs::read_to_string(&path)
                .with_context(|| format!("cannot read {}", path.display())),
            (None, None) => {
                let mut text = String::new();
                std::io::stdin().read_to_string(&mut text)?;
                Ok(text)
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Models) => {
            let state = AppState::from_config(&AppConfig::from_env()?)?;
            match state.service.catalog().get_available_models().await {
                Ok(models) if models.is_empty() => println!("No models found."),
                Ok(models) => {
                    for model in models.iter().map(ModelRes::from) {
                        println!("{}\t{}", model.id, model.name);
                    }
                }
                Err(e) => eprintln!("Error listing models: {}", e),
            }
        }
        Some(Commands::Screen {
            input,
            blocklist_dir,
        }) => {
            let text = input.read()?;
            let blocklist = Blocklist::load_files(&[
                blocklist_dir.join(GIVEN_NAMES_FILENAME),
                blocklist_dir.join(SURNAMES_FILENAME),
            ])?;
            if blocklist.contains_blocked_token(&text).is_some() {
                println!("Blocked: the text contains a listed personal name.");
                std::process::exit(1);
            }
            println!("Clear: no listed personal names found.");
        }
        Some(Commands::Suggest {
            input,
            specialty,
            model,
        }) => {
            let cfg = AppConfig::from_env()?;
            let model_id = model.or_else(|| Some(cfg.suggest.default_model().to_string()));
            let state = AppState::from_config(&cfg)?;
            let req = SuggestionRequest {
                clinical_text: input.read()?,
                specialty,
                model_id,
            };
            match state.service.suggest(req).await {
                Ok(result) => {
                    let res = SuggestCidRes::from(result);
                    println!("{}", serde_json::to_string_pretty(&res)?);
                }
                Err(e) => eprintln!("Error requesting suggestions: {}", e),
            }
        }
        None => {
            println!("Use 'cid --help' for commands");
        }
    }

    Ok(())
}
