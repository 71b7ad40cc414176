use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use mmprofiler_common::Config;
use mmprofiler_core::{
    load_dataset, print_summary, Collaborators, ColumnOverrides, ColumnSummary, ProfileAggregator,
    ProfilerOptions,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "mmprofiler", version, about = "Multimodal dataset profiler")]
struct Cli {
    /// default log filter; RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Profile a CSV or Parquet dataset and write an HTML report
    Profile {
        input: PathBuf,
        #[arg(long, value_delimiter = ',')]
        text_cols: Option<Vec<String>>,
        #[arg(long, value_delimiter = ',')]
        image_cols: Option<Vec<String>>,
        #[arg(long, value_delimiter = ',')]
        numeric_cols: Option<Vec<String>>,
        #[arg(long, value_delimiter = ',')]
        audio_cols: Option<Vec<String>>,
        /// report path; defaults to [export] output_dir/report_name
        #[arg(long)]
        out: Option<PathBuf>,
        /// also write the profile as JSON
        #[arg(long)]
        json: Option<PathBuf>,
        #[arg(long, conflicts_with = "all_images")]
        sample_images: Option<usize>,
        /// resolve every image cell
        #[arg(long)]
        all_images: bool,
        /// skip http(s) image references
        #[arg(long)]
        no_download: bool,
    },
    /// Per-column dtype, missing and unique counts
    Summary {
        input: PathBuf,
        #[arg(long)]
        save: bool,
    },
    /// Print shell completions
    Completions { shell: Shell },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);
    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "falling back to default config");
        Config::default()
    });
    match cli.command {
        Commands::Profile {
            input,
            text_cols,
            image_cols,
            numeric_cols,
            audio_cols,
            out,
            json,
            sample_images,
            all_images,
            no_download,
        } => {
            let overrides = ColumnOverrides {
                text: text_cols,
                image: image_cols,
                numeric: numeric_cols,
                audio: audio_cols,
            };
            let mut options = ProfilerOptions::from(&config);
            if all_images {
                options.sample_images = None;
            } else if sample_images.is_some() {
                options.sample_images = sample_images;
            }
            if no_download {
                options.download_remote_images = false;
            }
            let out = out.unwrap_or_else(|| config.report_path());
            run_profile(&input, &overrides, options, &out, json.as_deref())?
        }
        Commands::Summary { input, save } => run_summary(&input, save, &config)?,
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "mmprofiler", &mut std::io::stdout());
        }
    }
    Ok(())
}

fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run_profile(
    input: &Path,
    overrides: &ColumnOverrides,
    options: ProfilerOptions,
    out: &Path,
    json: Option<&Path>,
) -> anyhow::Result<()> {
    let dataset = load_dataset(input).map_err(|e| anyhow::anyhow!("{}: {e}", input.display()))?;
    let collaborators = if options.download_remote_images {
        Collaborators::default()
    } else {
        Collaborators::offline()
    };
    let mut aggregator = ProfileAggregator::new(dataset)
        .with_options(options)
        .with_collaborators(collaborators);
    let profile = aggregator.run(overrides);
    print_summary(&profile);
    let report = aggregator.export_html(out)?;
    println!("Report written to {}", report.display());
    if let Some(json) = json {
        let path = aggregator.export_json(json)?;
        println!("Profile saved to {}", path.display());
    }
    Ok(())
}

fn run_summary(input: &Path, save: bool, config: &Config) -> anyhow::Result<()> {
    let dataset = load_dataset(input).map_err(|e| anyhow::anyhow!("{}: {e}", input.display()))?;
    let rows = dataset.row_count();
    let summary = ProfileAggregator::new(dataset).summarize_tabular(true);
    print_tabular(rows, &summary);
    if save {
        let out_dir = Path::new(&config.export.output_dir);
        std::fs::create_dir_all(out_dir)?;
        let out_path = out_dir.join("summary.json");
        let doc = serde_json::json!({ "rows": rows, "columns": summary });
        std::fs::write(&out_path, serde_json::to_string_pretty(&doc)?)?;
        println!("Summary saved to {}", out_path.display());
    }
    Ok(())
}

fn print_tabular(rows: usize, summary: &BTreeMap<String, ColumnSummary>) {
    println!("{:<16} {}", "Rows:", rows);
    println!("{:<16} {}", "Columns:", summary.len());
    println!("{:<24} {:<8} {:>8} {:>8}", "column", "dtype", "missing", "unique");
    for (name, col) in summary {
        println!("{:<24} {:<8} {:>8} {:>8}", name, col.dtype, col.missing, col.unique);
    }
}
