use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use clap::{ArgAction, Parser, Subcommand, ValueEnum, ValueHint};
use schedule_form::{
    build_submission, failure_message, interpret_response, render_results, text_report, FormState,
    InputMode, SelectedImage, Submission, ANALYZE_ENDPOINT, DEFAULT_TERM_ID, FIELD_SCHEDULE_IMAGE,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Schedule analyzer form tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate inputs and print the request that would be posted to /analyze
    Payload(PayloadArgs),
    /// Render a saved /analyze response as HTML or a plain-text report
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct PayloadArgs {
    /// Schedule screenshot to upload (image mode)
    #[arg(long, conflicts_with = "courses", value_hint = ValueHint::FilePath)]
    image: Option<PathBuf>,

    /// Course and section as ID:SECTION, repeatable (manual mode)
    #[arg(long = "course", value_name = "ID:SECTION")]
    courses: Vec<String>,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Term identifier
    #[arg(long, default_value = DEFAULT_TERM_ID)]
    term: String,

    /// Output path (`-` for stdout)
    #[arg(short, long, default_value = "-", value_hint = ValueHint::FilePath)]
    output: PathBuf,

    /// Verbose logging
    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Saved response body (JSON)
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// HTTP status the response was served with
    #[arg(long, default_value_t = 200)]
    status: u16,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Html)]
    format: Format,

    /// Output path (`-` for stdout)
    #[arg(short, long, default_value = "-", value_hint = ValueHint::FilePath)]
    output: PathBuf,

    /// Verbose logging
    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Format {
    Html,
    Text,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let verbose = match &cli.command {
        Command::Payload(args) => args.verbose,
        Command::Render(args) => args.verbose,
    };
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    match cli.command {
        Command::Payload(args) => handle_payload(args),
        Command::Render(args) => handle_render(args),
    }
}

fn handle_payload(args: PayloadArgs) -> Result<()> {
    let mut form = FormState::new();
    form.api_key = args.api_key.unwrap_or_default();
    form.term_id = args.term;

    if let Some(path) = &args.image {
        if !path.is_file() {
            return Err(anyhow!("image not found: {}", path.display()));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| anyhow!("image path has no file name: {}", path.display()))?;
        form.select_image(Some(SelectedImage { name }));
    } else if !args.courses.is_empty() {
        form.set_mode(InputMode::Manual);
        for (idx, spec) in args.courses.iter().enumerate() {
            let (course_id, section) = parse_course_arg(spec)?;
            let id = if idx == 0 {
                form.rows()[0].id
            } else {
                form.add_row()
            };
            form.set_course_id(id, course_id);
            form.set_section(id, section);
        }
    }

    let submission = build_submission(&form).map_err(|err| anyhow!("{err}"))?;
    let text = match &submission {
        Submission::Manual(request) => serde_json::to_string_pretty(request)?,
        Submission::Image(upload) => {
            let mut lines = vec![format!("{FIELD_SCHEDULE_IMAGE}: <file {}>", upload.file_name)];
            for (name, value) in upload.text_fields() {
                lines.push(format!("{name}: {value}"));
            }
            lines.join("\n")
        }
    };
    info!(
        "POST {} ({})",
        ANALYZE_ENDPOINT,
        submission.content_type().unwrap_or("multipart/form-data")
    );
    write_output(&args.output, &text)
}

/// Splits `CMSC132:0101`. Blank halves are left for validation to reject.
fn parse_course_arg(spec: &str) -> Result<(&str, &str)> {
    let (course_id, section) = spec
        .split_once(':')
        .ok_or_else(|| anyhow!("invalid course '{}': expected ID:SECTION", spec))?;
    Ok((course_id, section))
}

fn handle_render(args: RenderArgs) -> Result<()> {
    let body = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    debug!(bytes = body.len(), status = args.status, "loaded response");

    let result =
        interpret_response(args.status, &body).map_err(|err| anyhow!(failure_message(&err)))?;
    let text = match args.format {
        Format::Html => render_results(&result).to_html(),
        Format::Text => format!(
            "SCHEDULE ANALYSIS\nGenerated: {}\n\n{}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            text_report(&result)
        ),
    };
    info!("Rendered {} course(s)", result.courses().len());
    write_output(&args.output, &text)
}

fn write_output(path: &Path, text: &str) -> Result<()> {
    if path.as_os_str() == "-" {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{text}")?;
        return Ok(());
    }
    fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
    info!("Wrote {}", path.display());
    Ok(())
}
