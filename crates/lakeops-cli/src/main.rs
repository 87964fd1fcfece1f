//! LakeOps CLI
//!
//! The `lakeops` command drives document mutations and the content release
//! lifecycle against a hosted content lake.
//!
//! ## Commands
//!
//! - `context`: Show project context and active releases
//! - `document`: Create, edit, publish, unpublish, delete and replace drafts
//! - `version`: Create, discard and schedule unpublishing of release versions
//! - `release`: Manage releases and their membership
//!
//! Configuration comes from `SANITY_*` environment variables (a `.env` file is
//! read first); the global flags override them. Every command prints its
//! result as pretty JSON on stdout, logs go to stderr.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use lake_state::{Content, HttpLake, LakeConfig, ReleaseType};
use lakeops_core::{
    ContextApi, CreateOptions, CreateReleaseOptions, DeleteOptions, DocumentsApi, IfExists,
    InitialContextGate, OneOrMany, PatchOperations, ReleaseUpdate, ReleasesApi,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, Level};

#[derive(Parser)]
#[command(name = "lakeops")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Document mutations and content releases for a hosted content lake", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(flatten)]
    lake: LakeArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Overrides for the `SANITY_*` environment configuration.
#[derive(Args)]
struct LakeArgs {
    /// Project ID (overrides SANITY_PROJECT_ID)
    #[arg(long, global = true)]
    project: Option<String>,

    /// Dataset (overrides SANITY_DATASET)
    #[arg(long, global = true)]
    dataset: Option<String>,

    /// API version, e.g. 2024-05-23 (overrides SANITY_API_VERSION)
    #[arg(long, global = true)]
    api_version: Option<String>,

    /// API token (overrides SANITY_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show project context, usage notes and active releases
    Context,

    /// Document operations
    Document {
        #[command(subcommand)]
        action: DocumentAction,
    },

    /// Release version operations
    Version {
        #[command(subcommand)]
        action: VersionAction,
    },

    /// Release lifecycle and membership
    Release {
        #[command(subcommand)]
        action: ReleaseAction,
    },
}

#[derive(Subcommand)]
enum DocumentAction {
    /// Create one document (JSON object) or many (JSON array) as drafts
    Create {
        /// Document JSON, or @path to read it from a file
        documents: String,

        /// Skip documents whose ID already exists
        #[arg(long)]
        ignore_existing: bool,
    },

    /// Apply patch operations to the drafts of one or more documents
    Edit {
        /// Document IDs
        #[arg(required = true)]
        ids: Vec<String>,

        /// Patch operations JSON ({"set": {...}, "unset": [...], ...}), or @path
        #[arg(short, long)]
        patch: String,
    },

    /// Publish the drafts of one or more documents
    Publish {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Unpublish one or more documents, keeping a draft
    Unpublish {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Delete documents together with their drafts
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,

        /// Additional draft IDs to delete in the same transaction
        #[arg(long = "include-draft")]
        include_drafts: Vec<String>,

        /// Remove from history as well
        #[arg(long)]
        purge: bool,
    },

    /// Replace draft content wholesale (documents must carry _id)
    ReplaceDraft {
        /// Document JSON, or @path
        documents: String,
    },
}

#[derive(Subcommand)]
enum VersionAction {
    /// Create versions of documents inside a release
    Create {
        /// Release ID
        release: String,

        #[arg(required = true)]
        ids: Vec<String>,

        /// Content to use instead of the current document content (JSON or @path)
        #[arg(long)]
        content: Option<String>,
    },

    /// Discard version documents by full version ID
    Discard {
        #[arg(required = true)]
        version_ids: Vec<String>,

        #[arg(long)]
        purge: bool,
    },

    /// Mark documents for unpublishing when a release publishes
    UnpublishWithRelease {
        release: String,

        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(Subcommand)]
enum ReleaseAction {
    /// Create a release
    Create {
        /// Release ID
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// asap or scheduled
        #[arg(long)]
        release_type: Option<ReleaseType>,

        /// Intended publish time (RFC 3339); required for scheduled releases
        #[arg(long)]
        publish_at: Option<String>,
    },

    /// Add documents to a release
    Add {
        release: String,

        #[arg(required = true)]
        ids: Vec<String>,

        /// Content to use instead of the current document content (JSON or @path)
        #[arg(long)]
        content: Option<String>,
    },

    /// Remove documents from a release
    Remove {
        release: String,

        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// List the documents in a release
    Documents { release: String },

    /// Publish every document in a release
    Publish { id: String },

    /// List all releases
    List,

    /// Show one release
    Get { id: String },

    /// Update release metadata
    Update {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        release_type: Option<ReleaseType>,

        #[arg(long)]
        publish_at: Option<String>,
    },

    /// Schedule a release to publish at a time (RFC 3339)
    Schedule { id: String, publish_at: String },

    /// Return a scheduled release to active
    Unschedule { id: String },

    /// Archive a release
    Archive { id: String },

    /// Restore an archived release
    Unarchive { id: String },

    /// Delete an archived release
    Delete { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    lakeops_core::init_tracing(cli.json, level);

    let allow_missing_project = matches!(cli.command, Commands::Context);
    let config = load_config(&cli.lake, allow_missing_project)?;
    debug!(
        project = %config.project_id,
        dataset = %config.dataset,
        api_version = %config.api_version,
        "loaded lake configuration"
    );
    let lake = Arc::new(HttpLake::new(config.clone()).context("Failed to create lake client")?);

    match cli.command {
        Commands::Context => cmd_context(lake, &config).await,
        Commands::Document { action } => cmd_document(DocumentsApi::new(lake), action).await,
        Commands::Version { action } => cmd_version(DocumentsApi::new(lake), action).await,
        Commands::Release { action } => cmd_release(ReleasesApi::new(lake, &config), action).await,
    }
}

/// Environment configuration with flag overrides applied.
fn load_config(args: &LakeArgs, allow_missing_project: bool) -> Result<LakeConfig> {
    let base = match &args.project {
        Some(project) => LakeConfig::from_env()
            .map(|config| LakeConfig {
                project_id: project.clone(),
                ..config
            })
            .unwrap_or_else(|_| env_overrides(LakeConfig::new(project.clone()))),
        None => match LakeConfig::from_env() {
            Ok(config) => config,
            Err(_) if allow_missing_project => env_overrides(LakeConfig::new("")),
            Err(err) => {
                return Err(err)
                    .context("Set SANITY_PROJECT_ID in your environment or pass --project")
            }
        },
    };

    let mut config = base;
    if let Some(dataset) = &args.dataset {
        config = config.with_dataset(dataset.clone());
    }
    if let Some(version) = &args.api_version {
        config = config.with_api_version(version.clone());
    }
    if let Some(token) = &args.token {
        config = config.with_token(token.clone());
    }
    Ok(config)
}

/// Non-project settings from the environment, for configs built without one.
fn env_overrides(mut config: LakeConfig) -> LakeConfig {
    let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
    if let Some(dataset) = var("SANITY_DATASET") {
        config = config.with_dataset(dataset);
    }
    if let Some(version) = var("SANITY_API_VERSION") {
        config = config.with_api_version(version);
    }
    if let Some(token) = var("SANITY_TOKEN") {
        config = config.with_token(token);
    }
    if let Some(host) = var("SANITY_API_HOST") {
        config = config.with_api_host(host);
    }
    config
}

async fn cmd_context(lake: Arc<HttpLake>, config: &LakeConfig) -> Result<()> {
    let api = ContextApi::new(lake, config, Arc::new(InitialContextGate::new()));
    print_json(&api.initial_context().await)
}

async fn cmd_document(api: DocumentsApi<Arc<HttpLake>>, action: DocumentAction) -> Result<()> {
    match action {
        DocumentAction::Create {
            documents,
            ignore_existing,
        } => {
            let documents = documents_arg(&documents)?;
            let options = CreateOptions {
                if_exists: if ignore_existing {
                    IfExists::Ignore
                } else {
                    IfExists::Fail
                },
            };
            print_json(&api.create(documents, options).await?)
        }
        DocumentAction::Edit { ids, patch } => {
            let operations: PatchOperations = serde_json::from_value(json_arg(&patch)?)
                .context("Failed to parse patch operations")?;
            let outcome = api.edit(ids_arg(ids), &operations).await;
            print_json(&outcome)?;
            if !outcome.is_success() {
                bail!("{}", outcome.message());
            }
            Ok(())
        }
        DocumentAction::Publish { ids } => print_json(&api.publish(ids_arg(ids)).await?),
        DocumentAction::Unpublish { ids } => print_json(&api.unpublish(ids_arg(ids)).await?),
        DocumentAction::Delete {
            ids,
            include_drafts,
            purge,
        } => {
            let options = DeleteOptions {
                include_drafts,
                purge,
            };
            print_json(&api.delete(ids_arg(ids), options).await?)
        }
        DocumentAction::ReplaceDraft { documents } => {
            print_json(&api.replace_draft(documents_arg(&documents)?).await?)
        }
    }
}

async fn cmd_version(api: DocumentsApi<Arc<HttpLake>>, action: VersionAction) -> Result<()> {
    match action {
        VersionAction::Create {
            release,
            ids,
            content,
        } => {
            let content = content.as_deref().map(content_arg).transpose()?;
            print_json(&api.create_version(&release, ids_arg(ids), content).await?)
        }
        VersionAction::Discard { version_ids, purge } => {
            print_json(&api.discard_version(ids_arg(version_ids), purge).await?)
        }
        VersionAction::UnpublishWithRelease { release, ids } => {
            print_json(&api.unpublish_with_release(&release, ids_arg(ids)).await?)
        }
    }
}

async fn cmd_release(api: ReleasesApi<Arc<HttpLake>>, action: ReleaseAction) -> Result<()> {
    match action {
        ReleaseAction::Create {
            id,
            title,
            description,
            release_type,
            publish_at,
        } => {
            let options = CreateReleaseOptions {
                description,
                release_type,
                intended_publish_at: publish_at,
            };
            print_json(&api.create_release(&id, title, options).await?)
        }
        ReleaseAction::Add {
            release,
            ids,
            content,
        } => {
            let content = content.as_deref().map(content_arg).transpose()?;
            print_json(
                &api.add_document_to_release(&release, ids_arg(ids), content)
                    .await?,
            )
        }
        ReleaseAction::Remove { release, ids } => {
            print_json(&api.remove_document_from_release(&release, ids_arg(ids)).await?)
        }
        ReleaseAction::Documents { release } => {
            print_json(&api.list_release_documents(&release).await?)
        }
        ReleaseAction::Publish { id } => print_json(&api.publish_release(&id).await?),
        ReleaseAction::List => print_json(&api.list_releases().await?),
        ReleaseAction::Get { id } => print_json(&api.get_release(&id).await?),
        ReleaseAction::Update {
            id,
            title,
            description,
            release_type,
            publish_at,
        } => {
            let update = ReleaseUpdate {
                title,
                description,
                release_type,
                intended_publish_at: publish_at,
            };
            print_json(&api.update_release(&id, update).await?)
        }
        ReleaseAction::Schedule { id, publish_at } => {
            print_json(&api.schedule_release(&id, &publish_at).await?)
        }
        ReleaseAction::Unschedule { id } => print_json(&api.unschedule_release(&id).await?),
        ReleaseAction::Archive { id } => print_json(&api.archive_release(&id).await?),
        ReleaseAction::Unarchive { id } => print_json(&api.unarchive_release(&id).await?),
        ReleaseAction::Delete { id } => print_json(&api.delete_release(&id).await?),
    }
}

// ========== Argument helpers ==========

/// A single ID keeps the singular response shape.
fn ids_arg(mut ids: Vec<String>) -> OneOrMany<String> {
    if ids.len() == 1 {
        if let Some(id) = ids.pop() {
            return OneOrMany::One(id);
        }
    }
    OneOrMany::Many(ids)
}

/// Parse inline JSON, or read it from a file when prefixed with `@`.
fn json_arg(raw: &str) -> Result<Value> {
    match raw.strip_prefix('@') {
        Some(path) => read_json_file(Path::new(path)),
        None => serde_json::from_str(raw).context("Failed to parse JSON argument"),
    }
}

fn read_json_file(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read JSON file: {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse JSON in {:?}", path))
}

fn content_arg(raw: &str) -> Result<Content> {
    match json_arg(raw)? {
        Value::Object(content) => Ok(content),
        other => bail!("Expected a JSON object, got {}", other),
    }
}

/// A JSON object is one document, a JSON array is many.
fn documents_arg(raw: &str) -> Result<OneOrMany<Content>> {
    match json_arg(raw)? {
        Value::Object(content) => Ok(OneOrMany::One(content)),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(content) => Ok(content),
                _ => bail!("Document at index {} is not a JSON object", index),
            })
            .collect::<Result<Vec<_>>>()
            .map(OneOrMany::Many),
        other => bail!("Expected a JSON object or array of objects, got {}", other),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn single_id_keeps_singular_shape() {
        assert_eq!(ids_arg(vec!["a".into()]), OneOrMany::One("a".to_string()));
        assert_eq!(
            ids_arg(vec!["a".into(), "b".into()]),
            OneOrMany::Many(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn documents_arg_accepts_object_or_array() {
        assert!(matches!(
            documents_arg(r#"{"_type": "post"}"#).unwrap(),
            OneOrMany::One(_)
        ));
        match documents_arg(r#"[{"_type": "post"}, {"_type": "author"}]"#).unwrap() {
            OneOrMany::Many(docs) => assert_eq!(docs.len(), 2),
            other => panic!("unexpected shape: {:?}", other),
        }
        assert!(documents_arg(r#"[{"_type": "post"}, 3]"#).is_err());
        assert!(documents_arg("42").is_err());
    }

    #[test]
    fn parses_release_commands() {
        let cli = Cli::try_parse_from([
            "lakeops",
            "--project",
            "proj123",
            "release",
            "create",
            "spring",
            "--release-type",
            "scheduled",
            "--publish-at",
            "2030-03-01T09:00:00Z",
        ])
        .unwrap();
        assert_eq!(cli.lake.project.as_deref(), Some("proj123"));
        match cli.command {
            Commands::Release {
                action:
                    ReleaseAction::Create {
                        id, release_type, ..
                    },
            } => {
                assert_eq!(id, "spring");
                assert_eq!(release_type, Some(ReleaseType::Scheduled));
            }
            _ => panic!("expected release create"),
        }
    }
}
