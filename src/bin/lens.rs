//! Lens CLI - Command-line interface for Classroom Lens
//!
//! Commands:
//! - gantt: Build the behavior timeline chart payload for a report
//! - summary: Print the report overview and time spent per core state
//! - validate: Check how much of a report can be placed on the timeline
//! - schema: Describe the input report and output chart formats

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use classroom_lens::digest::format_duration_readable;
use classroom_lens::report::parse_report;
use classroom_lens::timeline::{aggregate, CoreState, TimelineConfig, DEFAULT_END_PADDING_SEC};
use classroom_lens::view::ReportViewModel;
use classroom_lens::{GanttChartEncoder, ReportError, ReportProcessor, LENS_VERSION};

/// Lens - Presentation layer for classroom behavior analysis reports
#[derive(Parser)]
#[command(name = "lens")]
#[command(version = LENS_VERSION)]
#[command(about = "Turn behavior analysis reports into timeline charts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the Gantt chart payload for a report
    Gantt {
        /// Input report path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "json")]
        output_format: OutputFormat,

        /// Seconds added after the last event
        #[arg(long, default_value_t = DEFAULT_END_PADDING_SEC)]
        end_padding: f64,

        /// Use a batch's dominant behavior when it has no per-image highlights
        #[arg(long)]
        dominant_fallback: bool,
    },

    /// Print the report overview
    Summary {
        /// Input report path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check how much of a report can be placed on the timeline
    Validate {
        /// Input report path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,

        /// Output as JSON schema
        #[arg(long)]
        json_schema: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Input schema (behavior report)
    Input,
    /// Output schema (Gantt chart payload)
    Output,
}

fn main() -> ExitCode {
    // RUST_LOG overrides the default level
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), LensCliError> {
    match cli.command {
        Commands::Gantt {
            input,
            output,
            output_format,
            end_padding,
            dominant_fallback,
        } => cmd_gantt(
            &input,
            &output,
            output_format,
            TimelineConfig {
                end_padding_sec: end_padding,
                dominant_fallback,
            },
        ),

        Commands::Summary { input, json } => cmd_summary(&input, json),

        Commands::Validate { input, json } => cmd_validate(&input, json),

        Commands::Schema {
            schema_type,
            json_schema,
        } => cmd_schema(schema_type, json_schema),
    }
}

fn cmd_gantt(
    input: &Path,
    output: &Path,
    output_format: OutputFormat,
    config: TimelineConfig,
) -> Result<(), LensCliError> {
    if !config.end_padding_sec.is_finite() || config.end_padding_sec < 0.0 {
        return Err(LensCliError::InvalidArgument(format!(
            "--end-padding must be a non-negative number, got {}",
            config.end_padding_sec
        )));
    }

    let input_data = read_input(input)?;
    let processor = ReportProcessor::with_config(config);

    let output_data = match output_format {
        OutputFormat::Json => processor.process(&input_data)?,
        OutputFormat::JsonPretty => processor.process_pretty(&input_data)?,
    };

    if output.to_string_lossy() == "-" {
        println!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_summary(input: &Path, json: bool) -> Result<(), LensCliError> {
    let input_data = read_input(input)?;
    let report = parse_report(&input_data)?;
    let model = ReportViewModel::build(&report, &TimelineConfig::default(), &GanttChartEncoder::new());

    let summary = SummaryReport {
        student_id: model.student_id.clone(),
        report_time: model.report_time.clone(),
        report_date: model.digest.report_date.clone(),
        top_behavior: model.digest.top_behavior.clone(),
        top_behavior_percent: model.digest.top_behavior_percent,
        non_task_percent: model.digest.non_task_percent,
        time_per_state: CoreState::ORDERED
            .iter()
            .map(|&state| StateTime {
                state,
                seconds: model.timeline.total_duration(state),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Report Summary");
        println!("==============");
        println!("Student:        {}", summary.student_id);
        println!("Generated:      {}", summary.report_time);
        println!("Processed:      {}", model.processed_images);
        println!(
            "Top behavior:   {} ({}%)",
            summary.top_behavior, summary.top_behavior_percent
        );
        println!("Non-task:       {}%", summary.non_task_percent);

        if !model.statistics.is_empty() {
            println!("\nBehavior statistics:");
            for row in &model.statistics {
                println!(
                    "  - {}: {} ({}, confidence {})",
                    row.category, row.count, row.percentage, row.average_confidence
                );
            }
        }

        println!("\nTime per core state:");
        for entry in &summary.time_per_state {
            println!(
                "  - {}: {}",
                entry.state,
                format_duration_readable(entry.seconds)
            );
        }
    }

    Ok(())
}

fn cmd_validate(input: &Path, json: bool) -> Result<(), LensCliError> {
    let input_data = read_input(input)?;
    let report = parse_report(&input_data)?;
    let timeline = aggregate(&report.detailed_sequence_analysis, &TimelineConfig::default());
    let stats = &timeline.stats;

    let report = ValidationReport {
        total_batches: stats.batches,
        error_batches: stats.error_batches,
        highlights: stats.highlights,
        resolved_events: stats.resolved_events,
        skipped_highlights: stats.skipped_highlights,
        segments: timeline.segments.len(),
        errors: report
            .detailed_sequence_analysis
            .iter()
            .filter_map(|batch| {
                batch.error().map(|error| BatchErrorDetail {
                    batch_index: batch.batch_index,
                    error: error.to_string(),
                })
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total batches:      {}", report.total_batches);
        println!("Error batches:      {}", report.error_batches);
        println!("Highlights:         {}", report.highlights);
        println!("Resolved events:    {}", report.resolved_events);
        println!("Skipped highlights: {}", report.skipped_highlights);
        println!("Segments:           {}", report.segments);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!("  - Batch {}: {}", err.batch_index, err.error);
            }
        }
    }

    let problems = report.error_batches + report.skipped_highlights;
    if problems > 0 {
        Err(LensCliError::ValidationFailed(problems))
    } else {
        Ok(())
    }
}

fn cmd_schema(schema_type: SchemaType, json_schema: bool) -> Result<(), LensCliError> {
    match schema_type {
        SchemaType::Input => {
            if json_schema {
                println!("{}", get_input_json_schema());
            } else {
                println!("Input Schema: behavior report");
                println!();
                println!("- report_metadata: {{ student_id, report_generation_time, student_image_source_folder }}");
                println!("- overall_summary: {{ total_images_found, total_batches, total_images_analyzed,");
                println!("                     behavior_statistics, ai_summary_notes }}");
                println!("- detailed_sequence_analysis: Array of batches containing:");
                println!("  - batch_index, image_filenames_in_batch (HH-MM-SS[-mmm].ext)");
                println!("  - analysis: {{ error }} or {{ per_image_highlights, dominant_sustained_behaviors,");
                println!("                sequence_summary, sequence_analysis_confidence }}");
                println!();
                println!("Core states:");
                for state in CoreState::ORDERED {
                    println!("  - {}", state);
                }
            }
        }
        SchemaType::Output => {
            if json_schema {
                println!("{}", get_output_json_schema());
            } else {
                println!("Output Schema: gantt chart payload");
                println!();
                println!("- producer: {{ name, version, instance_id }}");
                println!("- yLabels: Core states in display order (empty when nothing was placed)");
                println!("- datasets: Array with one series containing:");
                println!("  - label");
                println!("  - data: {{ range: [start, end], category, metadata }} per segment");
                println!("  - backgroundColor: One color per segment, keyed by core state");
            }
        }
    }

    Ok(())
}

// Helper functions

fn read_input(input: &Path) -> Result<String, LensCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn get_input_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "behavior_report",
        "description": "Classroom behavior analysis report",
        "type": "object",
        "properties": {
            "report_metadata": {
                "type": "object",
                "properties": {
                    "student_id": { "type": "string" },
                    "report_generation_time": { "type": "string" },
                    "student_image_source_folder": { "type": "string" }
                }
            },
            "overall_summary": {
                "type": "object",
                "properties": {
                    "total_images_found": { "type": "integer" },
                    "total_batches": { "type": "integer" },
                    "total_images_analyzed": { "type": "integer" },
                    "behavior_statistics": { "type": "array", "items": { "type": "object" } },
                    "ai_summary_notes": { "type": "object" }
                }
            },
            "detailed_sequence_analysis": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "batch_index": { "type": "integer" },
                        "image_filenames_in_batch": { "type": "array", "items": { "type": "string" } },
                        "analysis": { "type": "object" }
                    }
                }
            }
        }
    })
    .to_string()
}

fn get_output_json_schema() -> String {
    let states: Vec<&str> = CoreState::axis_labels();
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "gantt_chart_payload",
        "description": "Behavior timeline chart payload",
        "type": "object",
        "required": ["producer", "yLabels", "datasets"],
        "properties": {
            "producer": {
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "version": { "type": "string" },
                    "instance_id": { "type": "string" }
                }
            },
            "yLabels": {
                "type": "array",
                "items": { "type": "string", "enum": states }
            },
            "datasets": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "label": { "type": "string" },
                        "data": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "range": { "type": "array", "items": { "type": "number" }, "minItems": 2, "maxItems": 2 },
                                    "category": { "type": "string", "enum": states },
                                    "metadata": { "type": "array", "items": { "type": "string" } }
                                }
                            }
                        },
                        "backgroundColor": { "type": "array", "items": { "type": "string" } }
                    }
                }
            }
        }
    })
    .to_string()
}

// Error types

#[derive(Debug)]
enum LensCliError {
    Io(io::Error),
    Report(ReportError),
    Json(serde_json::Error),
    InvalidArgument(String),
    ValidationFailed(u32),
}

impl From<io::Error> for LensCliError {
    fn from(e: io::Error) -> Self {
        LensCliError::Io(e)
    }
}

impl From<ReportError> for LensCliError {
    fn from(e: ReportError) -> Self {
        LensCliError::Report(e)
    }
}

impl From<serde_json::Error> for LensCliError {
    fn from(e: serde_json::Error) -> Self {
        LensCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<LensCliError> for CliError {
    fn from(e: LensCliError) -> Self {
        match e {
            LensCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            LensCliError::Report(ReportError::InvalidReport(message)) => CliError {
                code: "REPORT_ERROR".to_string(),
                message,
                hint: Some("The report service returned an error document".to_string()),
            },
            LensCliError::Report(e) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Ensure input is a behavior report ('lens schema input')".to_string()),
            },
            LensCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            LensCliError::InvalidArgument(message) => CliError {
                code: "INVALID_ARGUMENT".to_string(),
                message,
                hint: None,
            },
            LensCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} batch errors or unplaceable highlights", count),
                hint: Some("Run 'lens validate' for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct SummaryReport {
    student_id: String,
    report_time: String,
    report_date: String,
    top_behavior: String,
    top_behavior_percent: f64,
    non_task_percent: f64,
    time_per_state: Vec<StateTime>,
}

#[derive(serde::Serialize)]
struct StateTime {
    state: CoreState,
    seconds: f64,
}

#[derive(serde::Serialize)]
struct ValidationReport {
    total_batches: u32,
    error_batches: u32,
    highlights: u32,
    resolved_events: u32,
    skipped_highlights: u32,
    segments: usize,
    errors: Vec<BatchErrorDetail>,
}

#[derive(serde::Serialize)]
struct BatchErrorDetail {
    batch_index: i64,
    error: String,
}
