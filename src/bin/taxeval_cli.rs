use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::error::Error;
use std::path::PathBuf;

use taxeval_rs::external::{check_index_files, inspect_taxonomy, run_classifier};
use taxeval_rs::taxdb::TaxonomyIndex;
use taxeval_rs::{evaluate, EvalConfig, DEFAULT_RANKS};

#[derive(Parser)]
#[command(name = "taxeval-rs")]
#[command(version)]
#[command(about = "Score a taxonomic read classifier against simulated ground truth")]
struct Cli {
    /// Taxonomy tree file (taxid, _, parent, _, rank)
    #[arg(long, conflicts_with = "inspect_bin")]
    taxonomy: Option<PathBuf>,

    /// Classifier index base, e.g. indexes/b_compressed
    #[arg(long)]
    index_base: Option<String>,

    /// Index inspection tool used to dump the taxonomy tree of --index-base
    #[arg(long, requires = "index_base")]
    inspect_bin: Option<PathBuf>,

    /// Classifier binary; when given, --reads is classified into --classification first
    #[arg(long, requires_all = ["index_base", "reads"])]
    classifier_bin: Option<PathBuf>,

    /// FASTA reads to classify
    #[arg(long)]
    reads: Option<PathBuf>,

    /// Classifier threads
    #[arg(long, default_value_t = 1)]
    threads: usize,

    /// Classifier output (header line, then one hit per line)
    #[arg(long)]
    classification: PathBuf,

    /// Ground truth (`@` headers, then id, read name, taxid)
    #[arg(long)]
    truth: PathBuf,

    /// Comma-separated list of ranks
    #[arg(long = "rank-list", default_value_t = DEFAULT_RANKS.join(","))]
    ranks: String,

    /// Skip the strain rank (compressed indexes)
    #[arg(long)]
    skip_strain: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn spinner(color: &str, msg: &'static str) -> Result<ProgressBar, Box<dyn Error>> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&[
                "⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏",
            ])
            .template(&format!("{{spinner:.{color}}} {{msg}}"))?,
    );
    spinner.set_message(msg);
    Ok(spinner)
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    // 1. Taxonomy tree, from a file or from the index
    let spinner_tax = spinner("blue", "Reading taxonomy tree...")?;
    let taxonomy = match (&cli.taxonomy, &cli.inspect_bin, &cli.index_base) {
        (Some(path), _, _) => TaxonomyIndex::from_file(path)?,
        (None, Some(inspect_bin), Some(index_base)) => {
            check_index_files(index_base)?;
            inspect_taxonomy(inspect_bin, index_base)?
        }
        _ => return Err("either --taxonomy or --inspect-bin with --index-base is required".into()),
    };
    spinner_tax.finish_with_message(format!("Loaded {} taxa.", taxonomy.len()));

    // 2. Optionally run the classifier
    if let (Some(classifier_bin), Some(index_base), Some(reads)) =
        (&cli.classifier_bin, &cli.index_base, &cli.reads)
    {
        let spinner_cls = spinner("green", "Classifying reads...")?;
        check_index_files(index_base)?;
        run_classifier(classifier_bin, index_base, reads, cli.threads, &cli.classification)?;
        spinner_cls.finish_with_message("Classification finished.");
    }

    // 3. Score every rank
    let config = EvalConfig {
        skip_strain: cli.skip_strain,
        ..EvalConfig::default()
    }
    .with_rank_list(&cli.ranks);

    let spinner_eval = spinner("yellow", "Scoring ranks...")?;
    let results = evaluate(&taxonomy, &cli.classification, &cli.truth, &config)?;
    spinner_eval.finish_with_message("Scoring finished.");

    eprint!("{}", results.get_report());

    let degenerate = results.degenerate_ranks();
    if !degenerate.is_empty() {
        eprintln!("undefined metrics at: {}", degenerate.join(", "));
    }
    Ok(())
}
