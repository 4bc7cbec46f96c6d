//! pdfsect CLI - PDF outline and section extraction tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfsect::batch::{collect_inputs, load_lines, outline_file_names, MANIFEST_FILE};
use pdfsect::render::{self, JsonFormat, Manifest};
use pdfsect::{BatchProcessor, OutlineExtractor, ParseOptions, StructureOptions};

#[derive(Parser)]
#[command(name = "pdfsect")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Infer PDF titles, heading outlines and sections", long_about = None)]
struct Cli {
    /// Structure thresholds as JSON
    #[arg(long, global = true, value_name = "FILE", env = "PDFSECT_CONFIG")]
    config: Option<PathBuf>,

    /// Fail a document on the first unreadable page
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the title and heading outline
    Outline {
        /// Input PDF or line-stream JSON
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Print the titled body sections
    Sections {
        /// Input PDF or line-stream JSON
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Process many documents in parallel
    Batch {
        /// Input files or directories of PDFs
        #[arg(value_name = "PATH", required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,

        /// Worker threads (defaults to the number of CPUs)
        #[arg(short, long, env = "PDFSECT_JOBS")]
        jobs: Option<usize>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show document and classifier information
    Info {
        /// Input PDF or line-stream JSON
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = run(cli);

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let extractor = load_extractor(cli.config.as_deref())?;
    let parse_options = if cli.strict {
        ParseOptions::new()
    } else {
        // Keep going past damaged pages; the outline of the rest is still useful
        ParseOptions::new().lenient()
    };

    match cli.command {
        Commands::Outline {
            input,
            output,
            compact,
        } => cmd_outline(&extractor, &parse_options, &input, output.as_deref(), compact),
        Commands::Sections {
            input,
            output,
            compact,
        } => cmd_sections(&extractor, &parse_options, &input, output.as_deref(), compact),
        Commands::Batch {
            inputs,
            output,
            jobs,
            compact,
        } => cmd_batch(extractor, parse_options, &inputs, &output, jobs, compact),
        Commands::Info { input } => cmd_info(&extractor, &parse_options, &input),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    }
}

fn load_extractor(config: Option<&Path>) -> Result<OutlineExtractor, Box<dyn std::error::Error>> {
    let options = match config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .map_err(|e| format!("cannot read config {}: {}", path.display(), e))?;
            log::debug!("structure options from {}", path.display());
            StructureOptions::from_json(&json)?
        }
        None => StructureOptions::default(),
    };
    Ok(OutlineExtractor::with_options(options))
}

fn json_format(compact: bool) -> JsonFormat {
    if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    }
}

fn emit(json: &str, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = output {
        fs::write(path, json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }
    Ok(())
}

fn cmd_outline(
    extractor: &OutlineExtractor,
    parse_options: &ParseOptions,
    input: &Path,
    output: Option<&Path>,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = load_lines(input, parse_options)?;
    let outline = extractor.extract(&doc);
    let json = render::outline_to_json(&outline, json_format(compact))?;
    emit(&json, output)
}

fn cmd_sections(
    extractor: &OutlineExtractor,
    parse_options: &ParseOptions,
    input: &Path,
    output: Option<&Path>,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = load_lines(input, parse_options)?;
    let analysis = extractor.analyze(&doc);
    let json = render::sections_to_json(&analysis.sections, json_format(compact))?;
    emit(&json, output)
}

fn cmd_batch(
    extractor: OutlineExtractor,
    parse_options: ParseOptions,
    inputs: &[PathBuf],
    output: &Path,
    jobs: Option<usize>,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let files = collect_inputs(inputs)?;
    if files.is_empty() {
        return Err("no input documents found".into());
    }
    fs::create_dir_all(output)?;

    let mut processor = BatchProcessor::new(extractor).with_parse_options(parse_options);
    if let Some(jobs) = jobs {
        processor = processor.with_jobs(jobs);
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let format = json_format(compact);
    let names = outline_file_names(&files);
    let mut reports = Vec::with_capacity(files.len());
    for report in processor.run_streaming(files)? {
        pb.set_message(report.document.clone());
        if let Ok(analysis) = &report.outcome {
            let json = render::outline_to_json(&analysis.outline, format)?;
            fs::write(output.join(&names[report.index]), json)?;
        }
        reports.push(report);
        pb.inc(1);
    }
    pb.finish_with_message("Done!");

    reports.sort_by_key(|r| r.index);
    let mut manifest = Manifest::now();
    let mut failed = 0;
    for report in reports {
        match report.outcome {
            Ok(analysis) => manifest.add_analysis(analysis),
            Err(e) => {
                eprintln!("{} {}: {}", "Failed".red(), report.document, e);
                manifest.add_failure(report.document, e);
                failed += 1;
            }
        }
    }
    fs::write(output.join(MANIFEST_FILE), manifest.to_json(format)?)?;

    println!(
        "\n{} {} documents, {} sections, {} failed",
        "Done!".green().bold(),
        manifest.documents.len(),
        manifest.sections.len(),
        failed
    );
    println!("{} {}", "Output:".green(), output.display());

    Ok(())
}

fn cmd_info(
    extractor: &OutlineExtractor,
    parse_options: &ParseOptions,
    input: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = load_lines(input, parse_options)?;
    let profile = extractor.profile(&doc);
    let analysis = extractor.analyze(&doc);

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Pages".bold(), doc.page_count);
    println!("{}: {}", "Lines".bold(), doc.lines.len());
    if let Some(ref title) = doc.metadata_title {
        println!("{}: {}", "Metadata title".bold(), title);
    }
    println!("{}: {}", "Title".bold(), analysis.outline.title);

    println!();
    println!("{}", "Font Sizes".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {:.1}pt", "Body size".bold(), profile.body_size());
    for (size, level) in profile.level_map() {
        println!("  {} {:.1}pt", format!("{level}").bold(), size);
    }

    println!();
    println!("{}", "Structure".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "Headings".bold(), analysis.outline.len());
    if let Some(level) = pdfsect::structure::section_level(&analysis.outline, extractor.options()) {
        println!("{}: {}", "Section level".bold(), level);
    }
    println!("{}: {}", "Sections".bold(), analysis.sections.len());

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfsect".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF outline and section extraction tool");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/pdfsect".dimmed());
    println!("License: MIT");
}
