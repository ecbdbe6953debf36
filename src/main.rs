//! fmtree - Scrape a directory tree and render it as text, Markdown or HTML.
//!
//! Usage:
//!   fmtree render [PATH]       Render the tree (tree, indent, markdown, github, html, ...)
//!   fmtree export [PATH]       Export the tree as JSON records
//!   fmtree snapshot [PATH]     Record the tree shape to a snapshot file
//!   fmtree replay SNAP DIR     Recreate a recorded shape under DIR
//!   fmtree duplicates [PATH]   Find files with identical content
//!   fmtree --help              Show help

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, bail, eyre};
use tracing_subscriber::EnvFilter;

use fmtree_analyze::{DuplicateConfig, DuplicateFinder};
use fmtree_core::{
    DottedNumeric, Node, PatternMode, ScrapeConfig, ScrapeError, SortStrategy, Sorter,
    TreeSnapshot, TreeStats,
};
use fmtree_format::{DirLinkMode, FormatKind, Formatter, GithubOptions, OutputTarget, Render};
use fmtree_scan::{Filter, Scraper};

#[derive(Parser)]
#[command(
    name = "fmtree",
    version,
    about = "Scrape a directory tree and render it",
    long_about = "fmtree walks a directory, filters and orders its entries, and renders \
                  the result as an ASCII tree, an indented list, Markdown, a GitHub \
                  table of contents or an HTML list."
)]
struct Cli {
    /// Log debug output to stderr (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a directory tree
    Render {
        #[command(flatten)]
        scrape: ScrapeArgs,

        /// Output format
        #[arg(short, long, default_value_t = FormatKind::Tree)]
        format: FormatKind,

        /// Order siblings below directories with this name as dotted integers (1.2 < 1.10)
        #[arg(long, value_name = "DIR_NAME")]
        dotted: Option<String>,

        #[command(flatten)]
        output: OutputArgs,

        #[command(flatten)]
        github: GithubArgs,
    },

    /// Export the tree as JSON records
    Export {
        #[command(flatten)]
        scrape: ScrapeArgs,

        /// Spaces per indentation level
        #[arg(long, default_value = "2")]
        indent: usize,

        /// Emit a single line
        #[arg(long, conflicts_with = "indent")]
        compact: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Record the tree shape to a snapshot file
    Snapshot {
        #[command(flatten)]
        scrape: ScrapeArgs,

        /// Snapshot file to write
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Recreate a recorded tree shape as empty files and directories
    Replay {
        /// Snapshot file to read
        snapshot: PathBuf,

        /// Directory to create the tree under
        target: PathBuf,
    },

    /// Find files with identical content
    Duplicates {
        /// Directory to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Only consider image files
        #[arg(long)]
        images: bool,

        /// Minimum file size to consider (e.g., "1KB", "1MB")
        #[arg(short, long, default_value = "1B")]
        min_size: String,

        /// Glob patterns for files to skip
        #[arg(short = 'x', long = "exclude", value_name = "GLOB")]
        exclude: Vec<String>,

        /// Hash whole files without the partial-hash prefilter
        #[arg(long)]
        full: bool,

        /// Number of hashing threads
        #[arg(short = 'j', long)]
        jobs: Option<usize>,

        /// Maximum number of duplicate groups to show
        #[arg(short = 'n', long, default_value = "20")]
        top: usize,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

/// Traversal and filtering options shared by every tree command.
#[derive(Args)]
struct ScrapeArgs {
    /// Root directory (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Maximum depth to descend
    #[arg(short, long)]
    depth: Option<u32>,

    /// Keep directories without any matching file
    #[arg(short = 'e', long)]
    keep_empty: bool,

    /// Skip symbolic links instead of following them
    #[arg(long)]
    no_follow: bool,

    /// Only keep files with these extensions (e.g., ".md")
    #[arg(long = "ext", value_name = "EXT")]
    extensions: Vec<String>,

    /// Only keep files whose absolute path starts with a match of one of these regular expressions
    #[arg(long = "regex", value_name = "REGEX")]
    regexes: Vec<String>,

    /// Only keep Markdown files
    #[arg(long)]
    markdown: bool,

    /// Only keep image files
    #[arg(long)]
    images: bool,

    /// Root-relative regular expressions for the pattern pre-pass
    #[arg(short, long = "pattern", value_name = "REGEX")]
    patterns: Vec<String>,

    /// Whether --pattern entries are dropped or are the only ones kept
    #[arg(long, default_value = "ignore", value_name = "ignore|accept")]
    pattern_mode: PatternMode,
}

#[derive(Args)]
struct OutputArgs {
    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Append to --output instead of replacing it
    #[arg(long, requires = "output")]
    append: bool,

    /// Write to stderr instead of stdout
    #[arg(long, conflicts_with = "output")]
    stderr: bool,
}

#[derive(Args)]
struct GithubArgs {
    /// Which directories get links (github format)
    #[arg(long, default_value = "if-readme")]
    dir_links: DirLinks,

    /// Link README.md files instead of showing them in bold (github format)
    #[arg(long)]
    readme_links: bool,

    /// Link directories to themselves rather than their README.md (github format)
    #[arg(long)]
    no_readme_target: bool,

    /// Keep the .md extension in displayed names (github format)
    #[arg(long)]
    keep_md_ext: bool,

    /// Omit the root bullet (github format)
    #[arg(long)]
    skip_root: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum DirLinks {
    None,
    #[default]
    IfReadme,
    Always,
}

impl From<DirLinks> for DirLinkMode {
    fn from(mode: DirLinks) -> Self {
        match mode {
            DirLinks::None => DirLinkMode::None,
            DirLinks::IfReadme => DirLinkMode::IfReadme,
            DirLinks::Always => DirLinkMode::Always,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Render {
            scrape,
            format,
            dotted,
            output,
            github,
        } => run_render(&scrape, format, dotted, &output, &github),
        Command::Export {
            scrape,
            indent,
            compact,
            output,
        } => run_export(&scrape, (!compact).then_some(indent), &output),
        Command::Snapshot { scrape, output } => run_snapshot(&scrape, &output),
        Command::Replay { snapshot, target } => run_replay(&snapshot, &target),
        Command::Duplicates {
            path,
            images,
            min_size,
            exclude,
            full,
            jobs,
            top,
            format,
        } => {
            let mut builder = DuplicateConfig::builder();
            builder
                .min_size(parse_size(&min_size)?)
                .exclude_patterns(exclude)
                .quick_compare(!full)
                .max_groups(top);
            if let Some(jobs) = jobs {
                builder.num_workers(jobs.max(1));
            }
            let config = builder.build().context("Invalid duplicate options")?;
            run_duplicates(&path, images, config, format)
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Scrape according to the shared options and print a summary to stderr.
fn scrape_tree(args: &ScrapeArgs) -> Result<Node> {
    let mut builder = ScrapeConfig::builder();
    builder
        .root(args.path.clone())
        .keep_empty_dirs(args.keep_empty)
        .max_depth(args.depth)
        .follow_symlinks(!args.no_follow)
        .ignore_patterns(args.patterns.clone())
        .pattern_mode(args.pattern_mode);
    let config = builder.build().context("Invalid scrape options")?;

    let mut filters = Vec::new();
    if !args.extensions.is_empty() {
        filters.push(Filter::extensions(&args.extensions));
    }
    if !args.regexes.is_empty() {
        filters.push(Filter::regex(&args.regexes)?);
    }
    if args.markdown {
        filters.push(Filter::markdown());
    }
    if args.images {
        filters.push(Filter::image());
    }

    run_scraper(config, filters)
}

fn run_scraper(config: ScrapeConfig, filters: Vec<Filter>) -> Result<Node> {
    let mut scraper = Scraper::new(config)
        .context("Invalid path")?
        .with_filters(filters);

    eprintln!("Scraping {}...", scraper.root().display());
    let mut progress_rx = scraper.subscribe();
    scraper.run().context("Scrape failed")?;

    // The last update is sent after the root finishes.
    let mut last = None;
    while let Ok(progress) = progress_rx.try_recv() {
        last = Some(progress);
    }

    let warnings = scraper.warnings().len();
    let tree = scraper
        .into_tree()
        .ok_or_else(|| eyre!("scrape finished without a tree"))?;

    let stats = TreeStats::collect(&tree);
    eprintln!(
        "{} files, {} directories, {} (max depth {})",
        stats.total_files,
        stats.total_dirs,
        format_size(stats.total_size),
        stats.max_depth
    );
    if let Some(progress) = last {
        eprintln!(
            "Scraped in {:.2?} ({:.0} files/s)",
            progress.elapsed,
            progress.files_per_second()
        );
    }
    if warnings > 0 {
        eprintln!("{warnings} warning(s) during scrape");
    }

    Ok(tree)
}

/// Render the tree in the requested format.
fn run_render(
    args: &ScrapeArgs,
    format: FormatKind,
    dotted: Option<String>,
    output: &OutputArgs,
    github: &GithubArgs,
) -> Result<()> {
    let tree = scrape_tree(args)?;

    let strategy = match dotted {
        Some(parent) => SortStrategy::DottedNumeric(DottedNumeric::new(parent)),
        None => SortStrategy::Name,
    };
    let tree = Sorter::new(strategy).sort(&tree).context("Sort failed")?;

    let formatter = match format {
        FormatKind::Github => Formatter::github(github_options(github)?),
        kind => Formatter::new(kind),
    };
    let text = formatter.generate(&tree).context("Render failed")?;
    tracing::debug!(%format, bytes = text.len(), "rendered tree");

    output_target(output).write(&text)?;
    Ok(())
}

/// Export the tree as JSON records.
fn run_export(args: &ScrapeArgs, indent: Option<usize>, output: &OutputArgs) -> Result<()> {
    let tree = scrape_tree(args)?;
    let mut json = tree.to_json(indent)?;
    json.push('\n');

    let target = output_target(output);
    target.write(&json)?;
    if !matches!(target, OutputTarget::Stdout) {
        eprintln!("Exported to {target}");
    }
    Ok(())
}

/// Record the tree shape to a snapshot file.
fn run_snapshot(args: &ScrapeArgs, output: &Path) -> Result<()> {
    let tree = scrape_tree(args)?;
    TreeSnapshot::new(tree)
        .save(output)
        .with_context(|| format!("Failed to write snapshot {}", output.display()))?;
    eprintln!("Snapshot written to {}", output.display());
    Ok(())
}

/// Recreate a snapshot under `target`.
fn run_replay(snapshot: &Path, target: &Path) -> Result<()> {
    let snapshot = TreeSnapshot::load(snapshot)
        .with_context(|| format!("Failed to read snapshot {}", snapshot.display()))?;
    let base = snapshot.replay(target).context("Replay failed")?;
    println!("{}", base.display());
    Ok(())
}

/// Run duplicate detection.
fn run_duplicates(
    path: &Path,
    images: bool,
    config: DuplicateConfig,
    format: OutputFormat,
) -> Result<()> {
    if !path.is_dir() {
        return Err(ScrapeError::NotADirectory {
            path: path.to_path_buf(),
        }
        .into());
    }

    let filters = if images { vec![Filter::image()] } else { Vec::new() };
    let tree = run_scraper(ScrapeConfig::new(path), filters)?;

    eprintln!(
        "Finding duplicates (min size: {})...",
        format_size(config.min_size)
    );
    let finder = DuplicateFinder::with_config(config);
    let report = finder.find_duplicates(&tree).context("Duplicate search failed")?;

    match format {
        OutputFormat::Text => {
            println!();
            println!("{}", "─".repeat(70));
            println!(" Duplicate File Report");
            println!("{}", "─".repeat(70));
            println!();

            if report.groups.is_empty() {
                println!(" No duplicate files found.");
            } else {
                println!(
                    " Found {} duplicate groups ({} files)",
                    report.group_count, report.files_with_duplicates
                );
                println!(
                    " Total wasted space: {}",
                    format_size(report.total_wasted_space)
                );
                println!();

                for (i, group) in report.groups.iter().enumerate() {
                    println!(
                        " Group {} ({} files, {} each, {} wasted)",
                        i + 1,
                        group.count(),
                        format_size(group.size),
                        format_size(group.wasted_bytes)
                    );
                    for path in &group.paths {
                        println!("   {}", path.display());
                    }
                    println!();
                }
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn github_options(args: &GithubArgs) -> Result<GithubOptions> {
    GithubOptions::builder()
        .dir_link(DirLinkMode::from(args.dir_links))
        .suppress_readme_link(!args.readme_links)
        .link_to_readme(!args.no_readme_target)
        .strip_md_extension(!args.keep_md_ext)
        .skip_root(args.skip_root)
        .build()
        .context("Invalid GitHub options")
}

fn output_target(args: &OutputArgs) -> OutputTarget {
    match (&args.output, args.stderr) {
        (Some(path), _) if args.append => OutputTarget::append(path),
        (Some(path), _) => OutputTarget::file(path),
        (None, true) => OutputTarget::Stderr,
        (None, false) => OutputTarget::Stdout,
    }
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Parse a size string (e.g., "1KB", "10MB", "1GB").
fn parse_size(s: &str) -> Result<u64> {
    let s = s.trim().to_uppercase();
    let digits = s.trim_end_matches(|c: char| !c.is_ascii_digit() && c != '.');
    let multiplier: u64 = match &s[digits.len()..] {
        "" | "B" => 1,
        "K" | "KB" => 1024,
        "M" | "MB" => 1024 * 1024,
        "G" | "GB" => 1024 * 1024 * 1024,
        unit => bail!("Unknown size unit {unit:?} in {s:?}"),
    };
    let num: f64 = digits
        .parse()
        .with_context(|| format!("Invalid size {s:?}"))?;
    Ok((num * multiplier as f64) as u64)
}
