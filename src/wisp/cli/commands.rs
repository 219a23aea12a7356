//! # CLI Layer
//!
//! One possible UI client for wisp. This is the only place that knows about
//! stdout, stderr and exit codes.
//!
//! - `run()`: parses arguments, installs logging, dispatches
//! - `init_context()`: resolves the config directory and builds the API
//! - `handle_*()`: per-command handlers that call the API and print the result
//!
//! Every command that names a prompt or collection loads the session first, so
//! ids can be given as unique prefixes of what `list` shows.

use super::print::{
    print_collections, print_config, print_full_prompt, print_messages, print_prompts, print_tags,
};
use super::setup::{Cli, CollectionCommands, Commands};
use clap::Parser;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use wisp::api::WispApi;
use wisp::commands::config::ConfigAction;
use wisp::config::WispConfig;
use wisp::error::{Result, WispError};
use wisp::gateway::HttpGateway;
use wisp::model::{CollectionInsert, PromptInsert, PromptUpdate, Visibility};
use wisp::view::{CollectionFilter, ViewQuery};

const ENV_CONFIG_DIR: &str = "WISP_CONFIG_DIR";

struct AppContext {
    api: WispApi<HttpGateway>,
    config: WispConfig,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_dir = config_dir()?;

    // Config does not need the API
    if let Some(Commands::Config { key, value }) = &cli.command {
        return handle_config(&config_dir, key.clone(), value.clone());
    }

    let ctx = init_context(&config_dir)?;

    match cli.command {
        Some(Commands::List {
            filter,
            search,
            tags,
            collection,
        }) => handle_list(&ctx, filter, search, tags, collection).await,
        Some(Commands::View { id }) => handle_view(&ctx, &id).await,
        Some(Commands::Create {
            title,
            content,
            description,
            tags,
            visibility,
        }) => {
            let insert = PromptInsert {
                title,
                description,
                content,
                tags,
                visibility,
                collections: Vec::new(),
            };
            handle_create(&ctx, insert).await
        }
        Some(Commands::Edit {
            id,
            title,
            content,
            description,
            tags,
            visibility,
        }) => {
            let update = PromptUpdate {
                title,
                description,
                content,
                tags: if tags.is_empty() { None } else { Some(tags) },
                visibility,
                collections: None,
            };
            handle_edit(&ctx, &id, update).await
        }
        Some(Commands::Delete { id }) => handle_delete(&ctx, &id).await,
        Some(Commands::Restore { id }) => handle_restore(&ctx, &id).await,
        Some(Commands::Favorite { id }) => handle_favorite(&ctx, &id).await,
        Some(Commands::Save { id }) => handle_save(&ctx, &id).await,
        Some(Commands::Tags) => handle_tags(&ctx).await,
        Some(Commands::Collections { filter, search }) => {
            handle_collections(&ctx, &filter, &search).await
        }
        Some(Commands::Collection(cmd)) => match cmd {
            CollectionCommands::Create {
                title,
                description,
                tags,
                visibility,
            } => handle_collection_create(&ctx, title, description, tags, visibility).await,
            CollectionCommands::Delete { id } => handle_collection_delete(&ctx, &id).await,
            CollectionCommands::Add { collection, prompt } => {
                handle_collection_add(&ctx, &collection, &prompt).await
            }
            CollectionCommands::Remove { collection, prompt } => {
                handle_collection_remove(&ctx, &collection, &prompt).await
            }
            CollectionCommands::Available { collection } => {
                handle_collection_available(&ctx, &collection).await
            }
        },
        Some(Commands::Config { .. }) => Ok(()),
        None => handle_list(&ctx, None, None, Vec::new(), None).await,
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("wisp=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wisp=warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        return Ok(PathBuf::from(dir));
    }
    ProjectDirs::from("com", "wisp", "wisp")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| WispError::Config("Could not determine config dir".to_string()))
}

fn init_context(config_dir: &Path) -> Result<AppContext> {
    let config = WispConfig::load(config_dir)?.with_env_overrides();
    tracing::debug!(api_url = %config.api_url, "using backend");
    let gateway = HttpGateway::from_config(&config)?;
    Ok(AppContext {
        api: WispApi::new(gateway),
        config,
    })
}

async fn handle_list(
    ctx: &AppContext,
    filter: Option<String>,
    search: Option<String>,
    tags: Vec<String>,
    collection: Option<String>,
) -> Result<()> {
    ctx.api.refresh().await;
    let key = filter.unwrap_or_else(|| ctx.config.default_filter.clone());
    let mut query = ViewQuery::new()
        .with_search(search.unwrap_or_default())
        .with_tags(tags);
    if let Some(collection) = collection {
        query = query.with_collection(ctx.api.resolve_collection_id(&collection)?);
    }
    print_prompts(&ctx.api.prompts_by_key(&key, &query));
    Ok(())
}

async fn handle_view(ctx: &AppContext, id: &str) -> Result<()> {
    ctx.api.refresh().await;
    let id = ctx.api.resolve_prompt_id(id)?;
    ctx.api.select_prompt(Some(&id));
    match ctx.api.selected_prompt() {
        Some(view) => {
            print_full_prompt(&view);
            Ok(())
        }
        None => Err(WispError::NotFound(format!("Prompt {}", id))),
    }
}

async fn handle_create(ctx: &AppContext, insert: PromptInsert) -> Result<()> {
    let result = ctx.api.create_prompt(insert).await;
    print_messages(&result.messages);
    Ok(())
}

async fn handle_edit(ctx: &AppContext, id: &str, update: PromptUpdate) -> Result<()> {
    ctx.api.refresh().await;
    let id = ctx.api.resolve_prompt_id(id)?;
    let result = ctx.api.update_prompt(&id, update).await;
    print_messages(&result.messages);
    Ok(())
}

async fn handle_delete(ctx: &AppContext, id: &str) -> Result<()> {
    ctx.api.refresh().await;
    let id = ctx.api.resolve_prompt_id(id)?;
    let result = ctx.api.delete_prompt(&id, None).await;
    print_messages(&result.messages);
    Ok(())
}

async fn handle_restore(ctx: &AppContext, id: &str) -> Result<()> {
    ctx.api.refresh().await;
    let id = ctx.api.resolve_prompt_id(id)?;
    let result = ctx.api.restore_prompt(&id, None).await;
    print_messages(&result.messages);
    Ok(())
}

async fn handle_favorite(ctx: &AppContext, id: &str) -> Result<()> {
    ctx.api.refresh().await;
    let id = ctx.api.resolve_prompt_id(id)?;
    let result = ctx.api.toggle_favorite(&id, None).await;
    print_messages(&result.messages);
    Ok(())
}

async fn handle_save(ctx: &AppContext, id: &str) -> Result<()> {
    ctx.api.refresh().await;
    let id = ctx.api.resolve_prompt_id(id)?;
    let result = ctx.api.toggle_save(&id, None).await;
    print_messages(&result.messages);
    Ok(())
}

async fn handle_tags(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.tags().await;
    print_tags(&result.tags);
    print_messages(&result.messages);
    Ok(())
}

async fn handle_collections(ctx: &AppContext, filter: &str, search: &str) -> Result<()> {
    ctx.api.refresh().await;
    let collections = match filter.parse::<CollectionFilter>() {
        Ok(filter) => ctx.api.collections(filter, search),
        Err(e) => {
            tracing::debug!(error = %e, "empty view for unrecognized filter");
            Vec::new()
        }
    };
    print_collections(&collections);
    Ok(())
}

async fn handle_collection_create(
    ctx: &AppContext,
    title: String,
    description: String,
    tags: Vec<String>,
    visibility: Visibility,
) -> Result<()> {
    let insert = CollectionInsert {
        title,
        description,
        tags,
        images: Vec::new(),
        visibility,
    };
    let result = ctx.api.create_collection(insert).await;
    print_messages(&result.messages);
    Ok(())
}

async fn handle_collection_delete(ctx: &AppContext, id: &str) -> Result<()> {
    ctx.api.refresh().await;
    let id = ctx.api.resolve_collection_id(id)?;
    let result = ctx.api.delete_collection(&id).await;
    print_messages(&result.messages);
    Ok(())
}

async fn handle_collection_add(ctx: &AppContext, collection: &str, prompt: &str) -> Result<()> {
    ctx.api.refresh().await;
    let collection = ctx.api.resolve_collection_id(collection)?;
    let prompt = ctx.api.resolve_prompt_id(prompt)?;
    let result = ctx.api.add_to_collection(&collection, &prompt).await;
    print_messages(&result.messages);
    Ok(())
}

async fn handle_collection_remove(ctx: &AppContext, collection: &str, prompt: &str) -> Result<()> {
    ctx.api.refresh().await;
    let collection = ctx.api.resolve_collection_id(collection)?;
    let prompt = ctx.api.resolve_prompt_id(prompt)?;
    let result = ctx.api.remove_from_collection(&collection, &prompt).await;
    print_messages(&result.messages);
    Ok(())
}

async fn handle_collection_available(ctx: &AppContext, collection: &str) -> Result<()> {
    ctx.api.refresh().await;
    let collection = ctx.api.resolve_collection_id(collection)?;
    let views: Vec<_> = ctx
        .api
        .available_for_collection(&collection)
        .iter()
        .filter_map(|p| ctx.api.prompt(&p.id))
        .collect();
    print_prompts(&views);
    Ok(())
}

fn handle_config(config_dir: &Path, key: Option<String>, value: Option<String>) -> Result<()> {
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(key), None) => ConfigAction::ShowKey(key),
        (Some(key), Some(value)) => ConfigAction::Set(key, value),
    };

    let result = wisp::commands::config::run(config_dir, action)?;
    if result.messages.is_empty() {
        if let Some(config) = &result.config {
            print_config(config);
        }
    }
    print_messages(&result.messages);
    if result.has_errors() {
        return Err(WispError::Config("invalid config request".to_string()));
    }
    Ok(())
}
