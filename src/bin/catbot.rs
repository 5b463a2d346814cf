//! catbot CLI: operator interface to the catbot chat service.

use catbot_rs::character::CharacterStore;
use catbot_rs::chat::{ChatDeps, ChatService};
use catbot_rs::config::secrets::ExposeSecret;
use catbot_rs::config::{Config, PipelineConfig};
use catbot_rs::db::Db;
use catbot_rs::insight::HeuristicInsightExtractor;
use catbot_rs::llm::{AnthropicCompletion, anthropic_client};
use catbot_rs::memory::MemoryStore;
use catbot_rs::model::{ChatRequest, MemoryKey, SpontaneousThought};
use catbot_rs::prompt::relationship_label;
use catbot_rs::telemetry::{TelemetryConfig, init_telemetry};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "catbot", about = "Chat with catbots that remember you")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the chat endpoint
    Serve {
        /// Pipeline tuning TOML
        #[arg(long)]
        pipeline: Option<PathBuf>,
    },
    /// Run a single turn through the full pipeline and print the reply
    Chat {
        /// Catbot ID
        #[arg(long)]
        catbot: String,
        /// User ID (omit for an anonymous turn)
        #[arg(long)]
        user: Option<String>,
        /// Pipeline tuning TOML
        #[arg(long)]
        pipeline: Option<PathBuf>,
        /// The user's message
        message: String,
    },
    /// Relationship memory operations
    Memory {
        #[command(subcommand)]
        action: MemoryAction,
    },
    /// Spontaneous thought catalog operations
    Thought {
        #[command(subcommand)]
        action: ThoughtAction,
    },
}

#[derive(Subcommand)]
enum MemoryAction {
    /// Show the memory profile and active threads for a user/catbot pair
    Show {
        #[arg(long)]
        user: String,
        #[arg(long)]
        catbot: String,
    },
}

#[derive(Subcommand)]
enum ThoughtAction {
    /// Add a thought to the catalog
    Add {
        /// Personality this thought suits
        personality: String,
        /// Category (e.g. "musing", "memory", "observation")
        category: String,
        /// The thought itself
        content: String,
    },
    /// List thoughts
    List {
        /// Filter by personality
        #[arg(long)]
        personality: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Command::Serve { pipeline } => cmd_serve(config, pipeline).await,
        Command::Chat {
            catbot,
            user,
            pipeline,
            message,
        } => cmd_chat(config, catbot, user, pipeline, message).await,
        Command::Memory { action } => {
            let db = connect(&config).await?;
            match action {
                MemoryAction::Show { user, catbot } => cmd_memory_show(&db, user, catbot).await,
            }
        }
        Command::Thought { action } => {
            let db = connect(&config).await?;
            match action {
                ThoughtAction::Add {
                    personality,
                    category,
                    content,
                } => cmd_thought_add(&db, personality, category, content).await,
                ThoughtAction::List { personality } => {
                    cmd_thought_list(&db, personality.as_deref()).await
                }
            }
        }
    }
}

async fn connect(config: &Config) -> anyhow::Result<Db> {
    let db = Db::connect(config.database_url.expose_secret()).await?;
    db.migrate().await?;
    Ok(db)
}

async fn build_service(
    config: &Config,
    pipeline: Option<PathBuf>,
) -> anyhow::Result<Arc<ChatService>> {
    let pipeline = match pipeline {
        Some(path) => PipelineConfig::load(&path)?,
        None => PipelineConfig::default(),
    };

    let db = Arc::new(connect(config).await?);
    let client = anthropic_client(&config.anthropic_api_key)?;

    Ok(ChatService::start(ChatDeps {
        characters: Arc::clone(&db) as Arc<dyn CharacterStore>,
        memory: db as Arc<dyn MemoryStore>,
        completion: Arc::new(AnthropicCompletion::new(client)),
        insights: Arc::new(HeuristicInsightExtractor),
        completion_settings: config.completion.clone(),
        pipeline,
    }))
}

async fn cmd_serve(config: Config, pipeline: Option<PathBuf>) -> anyhow::Result<()> {
    let _guard = init_telemetry(TelemetryConfig {
        endpoint: config.otel_endpoint.clone(),
        service_name: "catbot".to_string(),
        log_level: config.log_level.clone(),
    })?;

    let service = build_service(&config, pipeline).await?;
    catbot_rs::server::serve(service, config.bind_addr, async {
        tokio::signal::ctrl_c().await.ok();
    })
    .await?;
    Ok(())
}

async fn cmd_chat(
    config: Config,
    catbot: String,
    user: Option<String>,
    pipeline: Option<PathBuf>,
    message: String,
) -> anyhow::Result<()> {
    let _guard = init_telemetry(TelemetryConfig {
        endpoint: None,
        service_name: "catbot".to_string(),
        log_level: "warn".to_string(),
    })?;
    let service = build_service(&config, pipeline).await?;

    let reply = service
        .handle_turn(ChatRequest {
            catbot_id: catbot,
            user_message: message,
            conversation_history: Vec::new(),
            user_id: user,
        })
        .await;

    // Let the background merge land before exiting.
    service.shutdown().await;

    let reply = reply?;
    println!("{}", reply.response);
    if !reply.success {
        eprintln!("(completion service unavailable, fallback reply)");
    }
    Ok(())
}

async fn cmd_memory_show(db: &Db, user: String, catbot: String) -> anyhow::Result<()> {
    let key = MemoryKey::new(user, catbot);

    let Some(profile) = db.get_profile(&key).await? else {
        println!("No memory for {key}.");
        return Ok(());
    };

    println!("Key:         {}", profile.key);
    println!(
        "Depth:       {} ({})",
        profile.relationship_depth,
        relationship_label(profile.relationship_depth)
    );
    println!("Interests:   {}", list_or_dash(&profile.interests));
    println!("Traits:      {}", list_or_dash(&profile.personality_traits));
    if let Some(state) = profile.current_emotional_state {
        println!(
            "Feeling:     {} (intensity {:.1}, {} energy)",
            state.emotion, state.intensity, state.energy
        );
    }
    println!("History:     {} entries", profile.emotional_history.len());
    println!("Updated:     {}", profile.updated_at.format("%Y-%m-%d %H:%M"));

    if !profile.mentioned_problems.is_empty() {
        println!("---");
        for problem in &profile.mentioned_problems {
            println!(
                "Problem:     [{}] {} ({:?})",
                problem.urgency, problem.description, problem.status
            );
        }
    }
    for event in &profile.important_events {
        println!("Event:       {} ({:?})", event.event, event.significance);
    }

    let threads = db.active_threads(&key, 20).await?;
    if !threads.is_empty() {
        println!("---");
        println!("{:<4}  {:<12}  DESCRIPTION", "PRI", "TYPE");
        for thread in &threads {
            println!(
                "{:<4}  {:<12}  {}",
                thread.thread_priority,
                thread.context_type.as_str(),
                thread.context_data.description
            );
        }
    }

    Ok(())
}

async fn cmd_thought_add(
    db: &Db,
    personality: String,
    category: String,
    content: String,
) -> anyhow::Result<()> {
    let thought = SpontaneousThought::new(content, personality, category);
    db.insert_thought(&thought).await?;
    println!("Added: {}", &thought.id.to_string()[..8]);
    Ok(())
}

async fn cmd_thought_list(db: &Db, personality: Option<&str>) -> anyhow::Result<()> {
    let thoughts = db.list_thoughts(personality).await?;
    if thoughts.is_empty() {
        println!("No thoughts found.");
        return Ok(());
    }

    println!(
        "{:<8}  {:<10}  {:<12}  {:<5}  CONTENT",
        "ID", "PERSONA", "CATEGORY", "USED"
    );
    println!("{}", "-".repeat(80));
    for thought in &thoughts {
        println!(
            "{:<8}  {:<10}  {:<12}  {:<5}  {}",
            &thought.id.to_string()[..8],
            thought.personality_match,
            thought.thought_category,
            thought.usage_count,
            thought.thought_content
        );
    }
    println!("\n{} thought(s)", thoughts.len());
    Ok(())
}

fn list_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}
