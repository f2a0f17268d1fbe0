use std::io::Write;
use std::path::PathBuf;

use aerofs_core::{AeroError, Api, Entity, File, Folder};
use anyhow::Context;
use clap::Subcommand;
use serde::Serialize;
use tracing::info;

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print file metadata
    File { id: String },
    /// Print folder metadata
    Folder { id: String },
    /// List the files and subfolders of a folder
    Ls { folder_id: String },
    /// Print the ancestors of a file or folder
    Path {
        id: String,
        #[arg(long)]
        folder: bool,
    },
    /// Write file content to stdout
    Cat { file_id: String },
    /// Replace file content with a local file
    Put {
        file_id: String,
        source: PathBuf,
        /// Fail if the file changed since it was last read
        #[arg(long)]
        matching: bool,
    },
    /// Create an empty file
    Touch { parent_id: String, name: String },
    /// Create a folder
    Mkdir { parent_id: String, name: String },
    /// Rename a file or folder, failing if it changed concurrently
    Rename {
        id: String,
        name: String,
        #[arg(long)]
        folder: bool,
    },
    /// Move a file or folder under another folder, keeping its name
    Mv {
        id: String,
        parent_id: String,
        #[arg(long)]
        folder: bool,
        /// Fail if the entry changed since it was last read
        #[arg(long)]
        matching: bool,
    },
    /// Delete a file or folder
    Rm {
        id: String,
        #[arg(long)]
        folder: bool,
        /// Fail if the entry changed since it was last read
        #[arg(long)]
        matching: bool,
    },
    /// Share a folder
    Share { folder_id: String },
}

#[derive(Debug, Serialize)]
struct FileSummary {
    id: Option<String>,
    name: Option<String>,
    parent: Option<String>,
    last_modified: Option<String>,
    size: Option<u64>,
    mime_type: Option<String>,
    content_state: Option<String>,
    etag: Option<String>,
}

impl FileSummary {
    async fn collect<A: Api + ?Sized>(file: &mut File<'_, A>) -> Result<Self, AeroError> {
        Ok(Self {
            id: file.id().await?.map(str::to_string),
            name: file.name().await?.map(str::to_string),
            parent: file.parent().await?.and_then(remote_id),
            last_modified: file.last_modified().await?.map(str::to_string),
            size: file.size().await?,
            mime_type: file.mime_type().await?.map(str::to_string),
            content_state: file.content_state().await?.map(|state| state.to_string()),
            etag: file.etag().await?.if_match().map(str::to_string),
        })
    }
}

#[derive(Debug, Serialize)]
struct FolderSummary {
    id: Option<String>,
    name: Option<String>,
    parent: Option<String>,
    is_shared: Option<bool>,
    shared_folder: Option<String>,
    etag: Option<String>,
}

impl FolderSummary {
    async fn collect<A: Api + ?Sized>(folder: &mut Folder<'_, A>) -> Result<Self, AeroError> {
        Ok(Self {
            id: folder.id().await?.map(str::to_string),
            name: folder.name().await?.map(str::to_string),
            parent: folder.parent().await?.and_then(remote_id),
            is_shared: folder.is_shared().await?,
            shared_folder: folder
                .shared_folder()
                .await?
                .map(|shared| shared.id().to_string()),
            etag: folder.etag().await?.if_match().map(str::to_string),
        })
    }
}

#[derive(Debug, Serialize)]
struct Listing {
    files: Vec<FileSummary>,
    folders: Vec<FolderSummary>,
}

fn remote_id<A: Api + ?Sized>(folder: &Folder<'_, A>) -> Option<String> {
    folder.remote_id().map(str::to_string)
}

fn print_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

pub async fn run<A, W>(api: &A, command: Command, out: &mut W) -> anyhow::Result<()>
where
    A: Api + ?Sized,
    W: Write,
{
    match command {
        Command::File { id } => {
            let mut file = File::referenced(api, id);
            print_json(out, &FileSummary::collect(&mut file).await?)
        }
        Command::Folder { id } => {
            let mut folder = Folder::referenced(api, id);
            print_json(out, &FolderSummary::collect(&mut folder).await?)
        }
        Command::Ls { folder_id } => {
            let mut folder = Folder::referenced(api, folder_id);
            folder.load_children().await?;
            let (files, folders) = folder
                .take_children()
                .context("folder listing was not loaded")?
                .into_parts();
            let mut listing = Listing {
                files: Vec::with_capacity(files.len()),
                folders: Vec::with_capacity(folders.len()),
            };
            for mut file in files {
                listing.files.push(FileSummary::collect(&mut file).await?);
            }
            for mut folder in folders {
                listing
                    .folders
                    .push(FolderSummary::collect(&mut folder).await?);
            }
            listing.files.sort_by(|a, b| a.name.cmp(&b.name));
            listing.folders.sort_by(|a, b| a.name.cmp(&b.name));
            print_json(out, &listing)
        }
        Command::Path { id, folder } => {
            let mut ancestors = Vec::new();
            if folder {
                let mut entry = Folder::referenced(api, id);
                entry.load_path().await?;
                ancestors.extend(entry.path().await?.unwrap_or_default().iter().map(remote_id));
            } else {
                let mut entry = File::referenced(api, id);
                entry.load_path().await?;
                ancestors.extend(entry.path().await?.unwrap_or_default().iter().map(remote_id));
            }
            print_json(out, &ancestors)
        }
        Command::Cat { file_id } => {
            let mut file = File::referenced(api, file_id);
            file.load_content().await?;
            out.write_all(file.content().await?.unwrap_or_default())?;
            Ok(())
        }
        Command::Put {
            file_id,
            source,
            matching,
        } => {
            let content = tokio::fs::read(&source)
                .await
                .with_context(|| format!("failed to read {}", source.display()))?;
            let mut file = File::referenced(api, file_id.clone());
            if matching {
                file.load().await?;
            }
            file.set_content(content);
            file.save_content(matching).await?;
            info!(file_id = %file_id, "content uploaded");
            print_json(out, &FileSummary::collect(&mut file).await?)
        }
        Command::Touch { parent_id, name } => {
            let mut file = File::new(api);
            file.create(&parent_id, &name).await?;
            print_json(out, &FileSummary::collect(&mut file).await?)
        }
        Command::Mkdir { parent_id, name } => {
            let mut folder = Folder::new(api);
            folder.create(&parent_id, &name).await?;
            print_json(out, &FolderSummary::collect(&mut folder).await?)
        }
        Command::Rename { id, name, folder } => {
            if folder {
                let mut entry = Folder::referenced(api, id);
                entry.load().await?;
                entry.set_name(name);
                entry.save_name().await?;
                print_json(out, &FolderSummary::collect(&mut entry).await?)
            } else {
                let mut entry = File::referenced(api, id);
                entry.load().await?;
                entry.set_name(name);
                entry.save_name().await?;
                print_json(out, &FileSummary::collect(&mut entry).await?)
            }
        }
        Command::Mv {
            id,
            parent_id,
            folder,
            matching,
        } => {
            if folder {
                let mut entry = Folder::referenced(api, id);
                let name = entry
                    .name()
                    .await?
                    .context("folder has no name")?
                    .to_string();
                entry.move_to(&parent_id, &name, matching).await?;
                print_json(out, &FolderSummary::collect(&mut entry).await?)
            } else {
                let mut entry = File::referenced(api, id);
                let name = entry
                    .name()
                    .await?
                    .context("file has no name")?
                    .to_string();
                entry.move_to(&parent_id, &name, matching).await?;
                print_json(out, &FileSummary::collect(&mut entry).await?)
            }
        }
        Command::Rm {
            id,
            folder,
            matching,
        } => {
            if folder {
                let mut entry = Folder::referenced(api, id.clone());
                if matching {
                    entry.load().await?;
                }
                entry.delete(matching).await?;
            } else {
                let mut entry = File::referenced(api, id.clone());
                if matching {
                    entry.load().await?;
                }
                entry.delete(matching).await?;
            }
            info!(id = %id, "deleted");
            Ok(())
        }
        Command::Share { folder_id } => {
            let mut folder = Folder::referenced(api, folder_id);
            folder.share().await?;
            print_json(out, &FolderSummary::collect(&mut folder).await?)
        }
    }
}
