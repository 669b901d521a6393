//! cset CLI - edit a working tree through changeset branches

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cset::fs::{Backing, Node, VersionedTree};
use cset::ops::{finalize, fsck, log};
use cset::{Encoding, Error, Repo};

#[derive(Parser)]
#[command(name = "cset")]
#[command(about = "content-addressed changesets over a working tree")]
#[command(version)]
struct Cli {
    /// working tree root
    #[arg(short = 'C', long, default_value = ".")]
    root: PathBuf,

    /// changeset branch; without one, reads use the default branch and
    /// tracked writes are refused
    #[arg(short, long, global = true)]
    branch: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// initialize a store in a working tree
    Init {
        /// working tree root
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// write a file; content comes from --data, --file or stdin
    Write {
        path: String,

        /// content as text, decoded with --encoding
        #[arg(short, long, conflicts_with = "file")]
        data: Option<String>,

        /// read content from a local file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// how --data is decoded: utf8 (default), binary or hex
        #[arg(short, long, requires = "data")]
        encoding: Option<String>,
    },

    /// create a directory
    Mkdir { path: String },

    /// remove a file or directory
    Rm { path: String },

    /// copy a file or directory
    Cp { source: String, destination: String },

    /// move a file or directory
    Mv { source: String, destination: String },

    /// list a directory
    Ls {
        #[arg(default_value = "")]
        path: String,
    },

    /// print file content
    Cat { path: String },

    /// show kind, size and modification time of a path
    Stat { path: String },

    /// show commit log for a branch
    Log {
        /// maximum number of commits to show
        #[arg(short = 'n', long)]
        max_count: Option<usize>,
    },

    /// turn the pending commit into a final one
    Finalize {
        #[arg(short, long)]
        message: String,
    },

    /// list branches and their tips
    Branches,

    /// verify repository integrity
    Fsck,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("CSET_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> cset::Result<ExitCode> {
    if let Commands::Init { path } = &cli.command {
        Repo::init(path)?;
        println!("initialized cset store in {}", path.display());
        return Ok(ExitCode::SUCCESS);
    }

    let repo = Repo::open(&cli.root)?;
    let tree = VersionedTree::new(repo, cli.branch.as_deref());

    match cli.command {
        Commands::Init { .. } => {}

        Commands::Write {
            path,
            data,
            file,
            encoding,
        } => {
            let content = match (data, file) {
                (Some(text), _) => {
                    let encoding = match encoding {
                        Some(name) => name.parse::<Encoding>()?,
                        None => Encoding::default(),
                    };
                    encoding.decode(&text)?
                }
                (None, Some(file)) => std::fs::read(&file).map_err(|e| stdio_error(&file, e))?,
                (None, None) => {
                    let mut buf = Vec::new();
                    io::stdin()
                        .read_to_end(&mut buf)
                        .map_err(|e| stdio_error("stdin", e))?;
                    buf
                }
            };
            write(&tree, &path, &content)?;
        }

        Commands::Mkdir { path } => {
            let (parent, name) = parent_and_name(&path);
            directory(&tree, parent)?.create_directory(name)?;
        }

        Commands::Rm { path } => {
            tree.node(&path)?.delete()?;
        }

        Commands::Cp {
            source,
            destination,
        } => {
            tree.copy(&source, &destination)?;
        }

        Commands::Mv {
            source,
            destination,
        } => {
            tree.rename(&source, &destination)?;
        }

        Commands::Ls { path } => {
            for child in directory(&tree, &path)?.children()? {
                let suffix = if child.is_directory() { "/" } else { "" };
                println!("{} {}{}", backing_name(child.backing()), child.name(), suffix);
            }
        }

        Commands::Cat { path } => {
            let Some(file) = tree.node(&path)?.into_file() else {
                return Err(Error::IsADirectory(path));
            };
            io::stdout()
                .write_all(&file.get()?)
                .map_err(|e| stdio_error("stdout", e))?;
        }

        Commands::Stat { path } => {
            let node = tree.node(&path)?;
            let kind = if node.is_directory() { "directory" } else { "file" };
            println!("path: {}", node.path());
            println!("kind: {}", kind);
            println!("backing: {}", backing_name(node.backing()));
            if let Node::File(file) = &node {
                println!("size: {}", file.get_size()?);
            }
            println!("modified: {}", node.get_last_modified()?);
        }

        Commands::Log { max_count } => {
            for entry in log(tree.repo(), tree.branch(), max_count)? {
                println!("{}", entry);
            }
        }

        Commands::Finalize { message } => {
            let Some(branch) = tree.selected_branch() else {
                return Err(Error::Locked("finalize needs --branch".to_string()));
            };
            let hash = finalize(tree.repo(), branch, &message, None)?;
            println!("{}", hash);
        }

        Commands::Branches => {
            for name in cset::list_refs(tree.repo())? {
                let hash = cset::read_ref(tree.repo(), &name)?;
                println!("{} {}", hash, name);
            }
        }

        Commands::Fsck => {
            let report = fsck(tree.repo())?;

            println!("objects checked: {}", report.objects_checked);

            if !report.corrupt_objects.is_empty() {
                println!("\ncorrupt objects:");
                for obj in &report.corrupt_objects {
                    println!("  {} {}: {}", obj.object_type, obj.hash, obj.message);
                }
            }

            if !report.missing_objects.is_empty() {
                println!("\nmissing objects:");
                for obj in &report.missing_objects {
                    println!(
                        "  {} {} (referenced by {})",
                        obj.object_type, obj.hash, obj.referenced_by
                    );
                }
            }

            if !report.dangling_objects.is_empty() {
                println!("\ndangling objects: {}", report.dangling_objects.len());
            }

            if report.is_ok() {
                println!("\nrepository is healthy");
            } else {
                println!("\nrepository has issues");
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// overwrite an existing file or create it in its parent directory
fn write(tree: &VersionedTree, path: &str, content: &[u8]) -> cset::Result<()> {
    match tree.node(path) {
        Ok(Node::File(file)) => file.put(content),
        Ok(Node::Directory(_)) => Err(Error::IsADirectory(path.to_string())),
        Err(e) if e.is_not_found() => {
            let (parent, name) = parent_and_name(path);
            directory(tree, parent)?.create_file(name, content)
        }
        Err(e) => Err(e),
    }
}

fn directory<'a>(tree: &'a VersionedTree, path: &str) -> cset::Result<cset::fs::Directory<'a>> {
    tree.node(path)?
        .into_directory()
        .ok_or_else(|| Error::NotADirectory(path.to_string()))
}

fn parent_and_name(path: &str) -> (&str, &str) {
    let path = path.trim_matches('/');
    path.rsplit_once('/').unwrap_or(("", path))
}

fn backing_name(backing: Backing) -> &'static str {
    match backing {
        Backing::Store => "store",
        Backing::Disk => "disk",
    }
}

fn stdio_error(path: impl Into<PathBuf>, source: io::Error) -> Error {
    Error::StorageUnavailable {
        path: path.into(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_needs_data() {
        let cli = Cli::try_parse_from(["cset", "-b", "cs1", "write", "f", "-d", "6f6b", "-e", "hex"])
            .unwrap();
        match cli.command {
            Commands::Write { data, encoding, .. } => {
                assert_eq!(data.as_deref(), Some("6f6b"));
                assert_eq!(encoding.as_deref(), Some("hex"));
            }
            _ => panic!("expected write"),
        }

        assert!(Cli::try_parse_from(["cset", "write", "f", "--file", "x", "-e", "hex"]).is_err());
        assert!(Cli::try_parse_from(["cset", "write", "f", "-e", "hex"]).is_err());
    }
}
