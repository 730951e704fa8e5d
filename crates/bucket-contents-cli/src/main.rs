//! Command line front end for the bucket contents engine.
//!
//! State lives in a JSON snapshot file (`--store`): every invocation loads
//! the snapshot into an in-process store, runs one operation through the
//! contents manager, and writes the snapshot back.

mod error;

use std::path::{Path, PathBuf};

use base64::{engine::general_purpose, Engine as _};
use clap::{Parser, Subcommand};
use snafu::ResultExt;

use bucket_contents_core::manager::ContentsManager;
use bucket_contents_core::model::{ContentModel, Format};
use bucket_contents_core::storage::memory::MemoryStore;

use crate::error::{
    CliResult, ParseNotebookSnafu, ReadInputSnafu, ReadStoreSnafu, SnapshotSnafu, WriteStoreSnafu,
};

#[derive(Debug, Subcommand)]
enum CheckpointCommand {
    /// Capture the current content of a file as a new checkpoint
    Create { path: String },

    /// List checkpoints of a file, newest first
    List { path: String },

    /// Restore a file from one of its checkpoints
    Restore { id: String, path: String },

    /// Delete one checkpoint
    Delete { id: String, path: String },
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the children of a directory (empty path lists the containers)
    Ls {
        #[arg(default_value = "")]
        path: String,
    },

    /// Print the content stored at a path
    Get { path: String },

    /// Upload a local file (notebooks by extension, text, or base64 when
    /// the input is not UTF-8)
    Put { file: PathBuf, path: String },

    /// Create a directory, or a container when the path has no `/`
    Mkdir { path: String },

    /// Delete a file, a directory tree, or a whole container
    Rm { path: String },

    /// Move a file or directory, bridging its checkpoints along
    Mv { old_path: String, new_path: String },

    /// Checkpoint operations
    Checkpoint {
        #[command(subcommand)]
        cmd: CheckpointCommand,
    },
}

#[derive(Debug, Parser)]
struct Cli {
    /// JSON snapshot file holding the store state
    #[arg(long)]
    store: PathBuf,

    #[command(subcommand)]
    cmd: Command,
}

fn load_store(path: &Path) -> CliResult<MemoryStore> {
    if !path.exists() {
        return Ok(MemoryStore::new());
    }
    let snapshot = std::fs::read_to_string(path).context(ReadStoreSnafu { path })?;
    MemoryStore::from_snapshot_json(&snapshot).context(SnapshotSnafu { path })
}

fn save_store(manager: &ContentsManager<MemoryStore>, path: &Path) -> CliResult<()> {
    let snapshot = manager.store().snapshot_json().context(SnapshotSnafu { path })?;
    std::fs::write(path, snapshot).context(WriteStoreSnafu { path })
}

fn type_tag(model: &ContentModel) -> &'static str {
    match model {
        ContentModel::File(_) => "file",
        ContentModel::Notebook(_) => "notebook",
        ContentModel::Directory(_) => "directory",
    }
}

fn print_listing(model: &ContentModel) {
    match model {
        ContentModel::Directory(dir) => {
            for child in dir.content.as_deref().unwrap_or_default() {
                println!("{}\t{}", type_tag(child), child.path());
            }
        }
        other => println!("{}\t{}", type_tag(other), other.path()),
    }
}

async fn cmd_ls(manager: &ContentsManager<MemoryStore>, path: &str) -> CliResult<()> {
    let model = manager.get(path, true, None, None).await?;
    print_listing(&model);
    Ok(())
}

async fn cmd_get(manager: &ContentsManager<MemoryStore>, path: &str) -> CliResult<()> {
    let model = manager.get(path, true, None, None).await?;
    match &model {
        ContentModel::File(file) => {
            if let Some(content) = &file.content {
                println!("{content}");
            }
        }
        ContentModel::Notebook(nb) => {
            if let Some(doc) = &nb.content {
                println!("{doc}");
            }
        }
        ContentModel::Directory(_) => print_listing(&model),
    }
    Ok(())
}

async fn cmd_put(
    manager: &ContentsManager<MemoryStore>,
    file: &Path,
    path: &str,
) -> CliResult<()> {
    let bytes = std::fs::read(file).context(ReadInputSnafu { path: file })?;
    let model = if path.ends_with(".ipynb") {
        let doc = serde_json::from_slice(&bytes).context(ParseNotebookSnafu { path: file })?;
        ContentModel::notebook_for_save(doc)
    } else {
        match String::from_utf8(bytes) {
            Ok(text) => ContentModel::file_for_save(text, Format::Text),
            Err(e) => ContentModel::file_for_save(
                general_purpose::STANDARD.encode(e.as_bytes()),
                Format::Base64,
            ),
        }
    };
    let saved = manager.save(&model, path).await?;
    println!("Saved {} ({})", saved.path(), type_tag(&saved));
    Ok(())
}

async fn cmd_mv(
    manager: &ContentsManager<MemoryStore>,
    old_path: &str,
    new_path: &str,
) -> CliResult<()> {
    manager.rename(old_path, new_path).await?;
    // Checkpoints do not move with their file; bridge them for file paths.
    if !old_path.ends_with('/') && old_path.contains('/') {
        manager.rename_all_checkpoints(old_path, new_path).await?;
    }
    println!("Moved {old_path} -> {new_path}");
    Ok(())
}

async fn cmd_checkpoint(
    manager: &ContentsManager<MemoryStore>,
    cmd: CheckpointCommand,
) -> CliResult<()> {
    match cmd {
        CheckpointCommand::Create { path } => {
            let checkpoint = manager.create_checkpoint(&path).await?;
            println!("{}", checkpoint.id);
        }
        CheckpointCommand::List { path } => {
            for checkpoint in manager.list_checkpoints(&path).await? {
                println!("{}\t{}", checkpoint.id, checkpoint.last_modified.to_rfc3339());
            }
        }
        CheckpointCommand::Restore { id, path } => {
            manager.restore_checkpoint(&id, &path).await?;
            println!("Restored {path} from {id}");
        }
        CheckpointCommand::Delete { id, path } => {
            manager.delete_checkpoint(&id, &path).await?;
            println!("Deleted checkpoint {id} of {path}");
        }
    }
    Ok(())
}

async fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let store = load_store(&cli.store)?;
    let manager = ContentsManager::new(store);

    match cli.cmd {
        Command::Ls { path } => cmd_ls(&manager, &path).await?,
        Command::Get { path } => cmd_get(&manager, &path).await?,
        Command::Put { file, path } => cmd_put(&manager, &file, &path).await?,
        Command::Mkdir { path } => {
            manager
                .save(&ContentModel::directory_for_save(), &path)
                .await?;
            println!("Created {path}");
        }
        Command::Rm { path } => {
            manager.delete(&path).await?;
            println!("Deleted {path}");
        }
        Command::Mv { old_path, new_path } => cmd_mv(&manager, &old_path, &new_path).await?,
        Command::Checkpoint { cmd } => cmd_checkpoint(&manager, cmd).await?,
    }

    save_store(&manager, &cli.store)
}

#[tokio::main]
async fn main() {
    env_logger::init();
    if let Err(e) = run().await {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
