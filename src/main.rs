//! docsweep command-line interface
//!
//! Operates on an extracted container directory: content surgery by
//! default, orphan and cruft removal with `--deep`.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Arg, ArgAction, ArgMatches, Command, ValueEnum};
use docsweep::analyzer::{diagnose, FormattingSummary};
use docsweep::cleaner::{CleanResult, ProcessingResult};
use docsweep::report::formatter::ReportFormat;
use docsweep::utils::init_logging;
use docsweep::{
    CleanCategory, CleanOptions, ContentKind, DetectionConfig, PartStore, Pipeline,
    PipelineConfig, PipelineOutcome, ReportFormatter,
};
use tracing::{error, info};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Markdown,
}

fn main() {
    let matches = build_cli().get_matches();

    let log_level = matches
        .get_one::<LogLevel>("verbose")
        .copied()
        .unwrap_or(LogLevel::Warn);
    if let Err(e) = init_logging(log_level.as_str(), matches.get_flag("quiet")) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let Some(input) = matches.get_one::<PathBuf>("input") else {
        error!("No input directory given");
        process::exit(2);
    };
    if !input.is_dir() {
        error!("Input is not a directory: {}", input.display());
        process::exit(1);
    }

    if matches.get_flag("diagnose") {
        let search = matches.get_one::<String>("search").map(String::as_str);
        if let Err(e) = run_diagnose(input, search) {
            error!("Diagnosis failed: {}", e);
            process::exit(1);
        }
        return;
    }

    let detection = match matches.get_one::<PathBuf>("config") {
        Some(path) => match DetectionConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load config file: {}", e);
                process::exit(1);
            }
        },
        None => DetectionConfig::default(),
    };

    let deep_only = matches.get_flag("deep-only");
    let config = PipelineConfig {
        detection,
        options: clean_options(&matches),
        dry_run: matches.get_flag("dry-run"),
        content: !deep_only,
        deep: deep_only || matches.get_flag("deep"),
    };

    let pipeline = match Pipeline::new(config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            error!("Invalid detection configuration: {}", e);
            process::exit(1);
        }
    };

    info!("Processing {}", input.display());
    let outcome = match pipeline.run_dir(input) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Processing failed: {}", e);
            process::exit(1);
        }
    };

    let format = matches
        .get_one::<OutputFormat>("format")
        .copied()
        .unwrap_or(OutputFormat::Text);
    print_outcome(&outcome, format, pipeline.config().dry_run, matches.get_flag("details"));

    if let Some(path) = matches.get_one::<PathBuf>("report") {
        if let Err(e) = write_report(&outcome, path) {
            error!("Failed to write report: {}", e);
            process::exit(1);
        }
        info!("Report written to {}", path.display());
    }

    if !outcome.success() {
        process::exit(1);
    }
}

fn build_cli() -> Command {
    let mut command = Command::new("docsweep")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Removes unused resources, authoring cruft and boilerplate from Word documents")
        .long_about(
            "Works on an extracted .docx directory. By default removes specifier notes, \
             copyright boilerplate, hidden text and other configured content. With --deep \
             also removes orphaned media, relationships and styles plus revision ids, empty \
             runs, secondary-script fonts, legacy compatibility flags, internal bookmarks \
             and proofing state.",
        )
        .arg(
            Arg::new("input")
                .value_name("DIR")
                .help("Extracted container directory")
                .value_parser(clap::value_parser!(PathBuf))
                .required(true),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Detection configuration (JSON/YAML)"),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .action(ArgAction::SetTrue)
                .help("Report what would be removed without changing anything"),
        )
        .arg(
            Arg::new("deep")
                .long("deep")
                .action(ArgAction::SetTrue)
                .help("Also remove orphaned resources and cruft"),
        )
        .arg(
            Arg::new("deep-only")
                .long("deep-only")
                .action(ArgAction::SetTrue)
                .conflicts_with("deep")
                .help("Only remove orphaned resources and cruft"),
        )
        .arg(
            Arg::new("only")
                .long("only")
                .value_name("CATEGORY")
                .value_parser(|value: &str| value.parse::<CleanCategory>().map_err(|e| e.to_string()))
                .help("Run a single deep-clean category"),
        )
        .arg(
            Arg::new("report")
                .long("report")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Write the full results as JSON"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .value_parser(clap::value_parser!(OutputFormat))
                .default_value("text")
                .help("Orphan report format on stdout"),
        )
        .arg(
            Arg::new("details")
                .long("details")
                .action(ArgAction::SetTrue)
                .help("Show confidence and reason for every detection"),
        )
        .arg(
            Arg::new("diagnose")
                .long("diagnose")
                .action(ArgAction::SetTrue)
                .help("List paragraph formatting to help write a configuration"),
        )
        .arg(
            Arg::new("search")
                .long("search")
                .value_name("TEXT")
                .requires("diagnose")
                .help("Only diagnose paragraphs containing this text"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .value_parser(clap::value_parser!(LogLevel))
                .num_args(0..=1)
                .require_equals(true)
                .default_missing_value("debug")
                .help("Log level"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .action(ArgAction::SetTrue)
                .conflicts_with("verbose")
                .help("Only log errors"),
        );

    for category in CleanCategory::ORDERED {
        let flag: &'static str = match category {
            CleanCategory::Media => "no-media",
            CleanCategory::Relationships => "no-relationships",
            CleanCategory::Styles => "no-styles",
            CleanCategory::RevisionMarkers => "no-rsids",
            CleanCategory::EmptyElements => "no-empty",
            CleanCategory::FontScripts => "no-fonts",
            CleanCategory::CompatSettings => "no-compat",
            CleanCategory::InternalBookmarks => "no-bookmarks",
            CleanCategory::ProofState => "no-proof",
        };
        command = command.arg(
            Arg::new(flag)
                .long(flag)
                .action(ArgAction::SetTrue)
                .conflicts_with("only")
                .help(format!("Skip the {} category", category)),
        );
    }
    command
}

fn clean_options(matches: &ArgMatches) -> CleanOptions {
    if let Some(category) = matches.get_one::<CleanCategory>("only") {
        return CleanOptions::only(*category);
    }
    CleanCategory::ORDERED
        .into_iter()
        .filter(|category| matches.get_flag(&format!("no-{}", category)))
        .fold(CleanOptions::all(), CleanOptions::without)
}

fn run_diagnose(input: &Path, search: Option<&str>) -> docsweep::Result<()> {
    let store = PartStore::load_dir(input)?;
    let profiles = diagnose(&store, search);
    for profile in &profiles {
        println!("[{}] style={}", profile.index, profile.style.as_deref().unwrap_or("-"));
        println!("    {}", preview(&profile.text, 80));
        for run in &profile.runs {
            let f = &run.formatting;
            let mut flags = Vec::new();
            if f.bold {
                flags.push("bold".to_string());
            }
            if f.italic {
                flags.push("italic".to_string());
            }
            if f.hidden {
                flags.push("hidden".to_string());
            }
            flags.extend(f.color.as_ref().map(|c| format!("color={}", c)));
            flags.extend(f.highlight.as_ref().map(|h| format!("highlight={}", h)));
            flags.extend(f.font.as_ref().map(|n| format!("font={}", n)));
            flags.extend(f.size.map(|s| format!("size={}", s)));
            flags.extend(f.style.as_ref().map(|s| format!("style={}", s)));
            println!("      - {:?} {}", preview(&run.text, 40), flags.join(" "));
        }
    }

    let summary = FormattingSummary::from_profiles(&profiles);
    println!();
    println!("Paragraphs:       {}", profiles.len());
    println!("Italic:           {}", summary.italic_paragraphs);
    println!("Hidden:           {}", summary.hidden_paragraphs);
    println!("Paragraph styles: {}", join(&summary.paragraph_styles));
    println!("Run styles:       {}", join(&summary.character_styles));
    println!("Colors:           {}", join(&summary.colors));
    println!("Highlights:       {}", join(&summary.highlights));
    Ok(())
}

fn print_outcome(outcome: &PipelineOutcome, format: OutputFormat, dry_run: bool, details: bool) {
    if let Some(processing) = &outcome.processing {
        print_processing(processing, details);
    }
    if let Some(report) = &outcome.report {
        let format = match format {
            OutputFormat::Text => ReportFormat::PlainText,
            OutputFormat::Json => ReportFormat::Json,
            OutputFormat::Markdown => ReportFormat::Markdown,
        };
        match ReportFormatter::format(report, format) {
            Ok(text) => println!("{}", text),
            Err(e) => error!("Failed to format report: {}", e),
        }
    }
    if let Some(clean) = &outcome.clean {
        print_clean(clean, dry_run);
    }

    println!();
    match (outcome.success(), dry_run, outcome.committed) {
        (false, _, _) => println!("✗ Completed with errors; the directory was left unchanged."),
        (true, true, _) => println!("✓ Dry run complete; nothing was changed."),
        (true, false, true) => println!("✓ Processing completed successfully."),
        (true, false, false) => println!("✓ Nothing to write."),
    }
}

fn print_processing(result: &ProcessingResult, details: bool) {
    println!("Content Detections");
    println!("{}", "-".repeat(60));
    for error in &result.errors {
        println!("  ✗ {}", error);
    }

    let mut kinds: Vec<ContentKind> = result.detections.iter().map(|d| d.kind).collect();
    kinds.sort();
    kinds.dedup();
    for kind in kinds {
        let count = result.detections.iter().filter(|d| d.kind == kind).count();
        let status = if kind == ContentKind::Preserve { "preserved" } else { "removed" };
        println!("  • {}: {} ({})", kind.as_str(), count, status);
    }
    println!("Total content removed:   {}", result.removed_count);
    println!("Total content preserved: {}", result.preserved_count);
    println!("Elements removed:        {}", result.nodes_removed);

    for (i, detection) in result.detections.iter().enumerate() {
        if detection.is_preserve() && !details {
            continue;
        }
        println!("{:>4}. [{}] \"{}\"", i + 1, detection.kind.as_str(), preview(&detection.text, 80));
        if details {
            println!("      Confidence: {:.0}%", detection.confidence * 100.0);
            println!("      Reason: {}", detection.reason);
        }
    }
    println!();
}

fn print_clean(result: &CleanResult, dry_run: bool) {
    let stats = &result.statistics;
    println!("{}", if dry_run { "Deep Clean (projected)" } else { "Deep Clean" });
    println!("{}", "-".repeat(60));
    for category in CleanCategory::ORDERED {
        println!("  {:<15} {}", category.name(), stats.count(category));
    }
    println!(
        "  Estimated bytes saved: {} ({:.1} KB)",
        stats.bytes_saved,
        stats.bytes_saved as f64 / 1024.0
    );
    for warning in &result.warnings {
        println!("  warning: {}", warning);
    }
    for error in &result.errors {
        println!("  error: {}", error);
    }
}

fn write_report(outcome: &PipelineOutcome, path: &Path) -> docsweep::Result<()> {
    let json = serde_json::to_string_pretty(outcome)?;
    fs::write(path, json)?;
    Ok(())
}

fn preview(text: &str, limit: usize) -> String {
    let flat = text.replace('\n', "↵").replace('\r', "");
    if flat.chars().count() > limit {
        format!("{}...", flat.chars().take(limit).collect::<String>())
    } else {
        flat
    }
}

fn join(values: &std::collections::BTreeSet<String>) -> String {
    if values.is_empty() {
        "-".to_string()
    } else {
        values.iter().cloned().collect::<Vec<_>>().join(", ")
    }
}
