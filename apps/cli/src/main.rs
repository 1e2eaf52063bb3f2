//! Command line front end: resolve FHIR profiles and print their element trees
//!
//! Usage:
//!   ferrum-profile --builtins <core-definitions-dir> <profile.json|dir>... [--differential]

mod logging;
mod outline;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use ferrum_context::{install_builtins, loader, BuiltinRegistry, FallbackFhirContext};
use ferrum_profile_tree::{SnapshotTreeBuilder, TreeOptions};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[clap(name = "ferrum-profile")]
#[clap(about = "Resolve FHIR StructureDefinition profiles into element trees")]
struct Args {
    /// Profile files, or directories of them
    #[clap(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory of core definitions (base resources and data types)
    #[clap(short, long)]
    builtins: Option<PathBuf>,

    /// Only render the definition with this canonical URL
    #[clap(short, long)]
    url: Option<String>,

    /// Show only the elements each profile changes
    #[clap(long)]
    differential: bool,

    /// Leave out elements with a zero upper cardinality
    #[clap(long)]
    hide_removed: bool,

    /// Do not graft data type elements under complex-typed elements
    #[clap(long)]
    no_expand: bool,

    /// JSON file with tree options; flags override it
    #[clap(long)]
    options: Option<PathBuf>,

    #[clap(short, long, value_enum, default_value = "text")]
    format: Format,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn tree_options(&self) -> Result<TreeOptions> {
        let mut options = match &self.options {
            Some(path) => {
                let contents = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read options file {}", path.display()))?;
                serde_json::from_str(&contents)
                    .with_context(|| format!("Invalid options file {}", path.display()))?
            }
            None => TreeOptions::default(),
        };
        if self.hide_removed {
            options.include_removed = false;
        }
        if self.no_expand {
            options.expand_complex_types = false;
        }
        Ok(options)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_logging(args.verbose).context("Failed to initialize logging")?;

    let options = args.tree_options()?;

    if let Some(dir) = &args.builtins {
        let registry = loader::load_paths(&[dir])
            .with_context(|| format!("Failed to load core definitions from {}", dir.display()))?;
        tracing::info!(definitions = registry.len(), "installing core definitions");
        install_builtins(registry).context("Failed to install core definitions")?;
    }

    let profiles = loader::load_paths(args.inputs.as_slice()).context("Failed to load profiles")?;
    let ctx = FallbackFhirContext::new(profiles, BuiltinRegistry);

    let selected: Vec<_> = ctx
        .primary()
        .definitions()
        .filter(|sd| args.url.as_deref().map_or(true, |url| sd.url == url))
        .cloned()
        .collect();
    if selected.is_empty() {
        anyhow::bail!("No matching StructureDefinitions found");
    }

    for sd in selected {
        tracing::info!(url = %sd.url, "resolving");
        let builder = SnapshotTreeBuilder::new(&sd, &ctx)
            .with_context(|| format!("Failed to resolve ancestors of {}", sd.url))?
            .with_options(options);
        let tree = if args.differential {
            builder.differential_tree()
        } else {
            builder.snapshot_tree()
        }
        .with_context(|| format!("Failed to resolve {}", sd.url))?;

        match args.format {
            Format::Text => {
                println!("# {} ({})", sd.display_name(), sd.url);
                print!("{}", outline::render_text(&tree));
                println!();
            }
            Format::Json => println!("{}", outline::render_json(&tree)?),
        }
    }

    Ok(())
}
