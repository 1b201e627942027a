//! # pitchdesk CLI (`pd`)
//!
//! The `pd` binary is the interface to pitchdesk. It manages a workspace of
//! sales documents, extracts their text locally, and drives Claude to draft
//! collateral.
//!
//! ## Usage
//!
//! ```bash
//! pd --config ./pitchdesk.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `pd init` | Create the workspace directory layout |
//! | `pd files scan` | Inventory and classify documents under `data/` |
//! | `pd files organize --apply` | Move classified files into category directories |
//! | `pd files list` | List library contents per category |
//! | `pd analysis` | Product analysis (optionally against a competitor) |
//! | `pd pitch` | Sales pitch script in a chosen tone |
//! | `pd presentation` | Customer presentation outline |
//! | `pd recommend` | Product recommendation for a customer |
//! | `pd email` | Sales email for a purpose |
//! | `pd vault encrypt/decrypt/lock` | Password-based file encryption |
//!
//! ## Examples
//!
//! ```bash
//! # Set up a workspace and pull in documents
//! pd init
//! pd files scan
//! pd files organize --apply
//!
//! # Generate collateral (reads ANTHROPIC_API_KEY)
//! pd analysis --product data/product/plan.xlsx
//! pd pitch --tone consultative
//! pd email --purpose follow-up
//!
//! # Encrypt customer files at rest (reads PITCHDESK_PASSWORD)
//! pd vault lock data/customer
//! ```

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use pitchdesk::assistant::{EmailPurpose, PitchTone, PresentationKind};
use pitchdesk::config::{self, Config};
use pitchdesk::generate;
use pitchdesk::library::{self, Category, Library};
use pitchdesk::vault::Vault;

/// pitchdesk — generate sales collateral from the documents you already have.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. Every setting has a default, so the file is optional.
#[derive(Parser)]
#[command(
    name = "pd",
    about = "pitchdesk — sales collateral from your own product, competitor, and customer documents",
    version,
    long_about = "pitchdesk extracts text from office documents (xlsx, docx, pptx, pdf) locally, \
    then drives Claude to draft product analyses, pitch scripts, presentation outlines, \
    recommendations, and outreach emails. Source files can be encrypted at rest."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./pitchdesk.toml`. Built-in defaults apply when the
    /// file does not exist.
    #[arg(long, global = true, default_value = "./pitchdesk.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Create the workspace directory layout.
    ///
    /// Creates `data/` with one directory per category plus `encrypted/`,
    /// and `output/` with one directory per task. Idempotent.
    Init,

    /// Manage the document library under `data/`.
    Files {
        #[command(subcommand)]
        action: FilesAction,
    },

    /// Analyze a product, optionally against a competitor document.
    ///
    /// Omitted paths fall back to the newest file in the matching category
    /// directory. The competitor document is optional; without one the
    /// analysis covers the product on its own.
    Analysis {
        /// Product document (xlsx, docx, pptx, or pdf).
        #[arg(long)]
        product: Option<PathBuf>,

        /// Competitor document.
        #[arg(long)]
        competitor: Option<PathBuf>,

        /// Output file name (defaults to a timestamped name).
        #[arg(long)]
        output: Option<String>,
    },

    /// Draft a sales pitch script.
    Pitch {
        /// Product document.
        #[arg(long)]
        product: Option<PathBuf>,

        /// Customer profile document (optional).
        #[arg(long)]
        customer: Option<PathBuf>,

        /// Tone: `professional`, `friendly`, or `consultative`.
        #[arg(long, default_value = "professional")]
        tone: PitchTone,

        /// Output file name (defaults to a timestamped name).
        #[arg(long)]
        output: Option<String>,
    },

    /// Draft a customer presentation outline.
    ///
    /// Requires both a product document and a customer profile.
    Presentation {
        /// Product document.
        #[arg(long)]
        product: Option<PathBuf>,

        /// Customer profile document.
        #[arg(long)]
        customer: Option<PathBuf>,

        /// Kind: `standard`, `detailed`, or `executive`.
        #[arg(long, default_value = "standard")]
        kind: PresentationKind,

        /// Output file name (defaults to a timestamped name).
        #[arg(long)]
        output: Option<String>,
    },

    /// Recommend products from a catalog for a customer.
    Recommend {
        /// Customer profile document.
        #[arg(long)]
        customer: Option<PathBuf>,

        /// Product catalog document.
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Output file name (defaults to a timestamped name).
        #[arg(long)]
        output: Option<String>,
    },

    /// Draft a sales email.
    Email {
        /// Purpose: `introduction`, `follow-up`, `proposal`, or `thank-you`.
        #[arg(long, default_value = "introduction")]
        purpose: EmailPurpose,

        /// Product document.
        #[arg(long)]
        product: Option<PathBuf>,

        /// Recipient profile document (optional).
        #[arg(long)]
        recipient: Option<PathBuf>,

        /// Output file name (defaults to a timestamped name).
        #[arg(long)]
        output: Option<String>,
    },

    /// Encrypt and decrypt files with a password-derived key.
    ///
    /// The password comes from the `PITCHDESK_PASSWORD` environment
    /// variable. Encrypted files carry the `.pdv` extension.
    Vault {
        #[command(subcommand)]
        action: VaultAction,
    },
}

/// Library management subcommands.
#[derive(Subcommand)]
enum FilesAction {
    /// Inventory and classify every supported document under `data/`.
    Scan,

    /// Move classified files into their category directories.
    ///
    /// Dry run by default: shows what would move without touching anything.
    /// Collisions get a numeric suffix; nothing is overwritten.
    Organize {
        /// Actually move files instead of showing the plan.
        #[arg(long)]
        apply: bool,
    },

    /// List library contents, newest first.
    List {
        /// Restrict to one category: `product`, `competitor`, `customer`,
        /// or `catalog`.
        category: Option<Category>,
    },
}

/// Vault subcommands.
#[derive(Subcommand)]
enum VaultAction {
    /// Encrypt a single file. Default output appends `.pdv`.
    Encrypt {
        /// File to encrypt.
        path: PathBuf,

        /// Output path.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Decrypt a single `.pdv` file. Default output strips `.pdv`.
    Decrypt {
        /// File to decrypt.
        path: PathBuf,

        /// Output path.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Encrypt every supported document under a directory.
    ///
    /// Files that already carry `.pdv` are skipped. Originals are left in
    /// place; remove them once the encrypted copies are verified.
    Lock {
        /// Directory to lock.
        dir: PathBuf,
    },
}

/// Load the config file, or fall back to defaults when it does not exist.
/// A present-but-invalid file is still an error.
fn load_or_default(path: &Path) -> anyhow::Result<Config> {
    if path.exists() {
        config::load_config(path)
    } else {
        Ok(Config::minimal())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = load_or_default(&cli.config)?;

    match cli.command {
        Commands::Init => {
            cfg.workspace.ensure_layout()?;
            println!(
                "Workspace initialized at {}",
                cfg.workspace.root.display()
            );
        }
        Commands::Files { action } => match action {
            FilesAction::Scan => {
                let library = Library::new(&cfg)?;
                let files = library.scan()?;
                for file in &files {
                    let category = file
                        .category
                        .map(|c| c.dir_name())
                        .unwrap_or("unclassified");
                    println!("{:<12} {}", category, file.relative);
                }
                println!("{} supported files found.", files.len());
            }
            FilesAction::Organize { apply } => {
                let library = Library::new(&cfg)?;
                let summary = library.organize(apply)?;
                for (from, to) in &summary.moved {
                    let verb = if apply { "moved" } else { "would move" };
                    println!("{} {} -> {}", verb, from.display(), to.display());
                }
                for path in &summary.unclassified {
                    println!("unclassified: {}", path.display());
                }
                println!(
                    "{} moved, {} already organized, {} unclassified.{}",
                    summary.moved.len(),
                    summary.already_organized.len(),
                    summary.unclassified.len(),
                    if apply { "" } else { " (dry run; pass --apply)" }
                );
            }
            FilesAction::List { category } => {
                let library = Library::new(&cfg)?;
                match category {
                    Some(category) => {
                        let files = library.files_by_mtime(category)?;
                        if files.is_empty() {
                            println!("No {} found.", category.label());
                        }
                        for path in files {
                            println!("{}", path.display());
                        }
                    }
                    None => library::print_summary(&library)?,
                }
            }
        },
        Commands::Analysis {
            product,
            competitor,
            output,
        } => {
            generate::run_analysis(&cfg, product, competitor, output).await?;
        }
        Commands::Pitch {
            product,
            customer,
            tone,
            output,
        } => {
            generate::run_pitch(&cfg, product, customer, tone, output).await?;
        }
        Commands::Presentation {
            product,
            customer,
            kind,
            output,
        } => {
            generate::run_presentation(&cfg, product, customer, kind, output).await?;
        }
        Commands::Recommend {
            customer,
            catalog,
            output,
        } => {
            generate::run_recommendation(&cfg, customer, catalog, output).await?;
        }
        Commands::Email {
            purpose,
            product,
            recipient,
            output,
        } => {
            generate::run_email(&cfg, purpose, product, recipient, output).await?;
        }
        Commands::Vault { action } => {
            let vault = Vault::from_env(cfg.vault.iterations)?;
            match action {
                VaultAction::Encrypt { path, output } => {
                    let out = vault.encrypt_file(&path, output.as_deref())?;
                    println!("encrypted {} -> {}", path.display(), out.display());
                }
                VaultAction::Decrypt { path, output } => {
                    let out = vault.decrypt_file(&path, output.as_deref())?;
                    println!("decrypted {} -> {}", path.display(), out.display());
                }
                VaultAction::Lock { dir } => {
                    let count = vault.encrypt_dir(&dir)?;
                    println!("{} files encrypted under {}", count, dir.display());
                }
            }
        }
    }

    Ok(())
}
