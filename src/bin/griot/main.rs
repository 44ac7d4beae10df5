use std::io::Write;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use tracing_subscriber::EnvFilter;

use griot::config::Config;
use griot::error::GriotError;
use griot::record::{CATEGORIES, LANGUAGES, Record, Summary};
use griot::store::RecordStore;
use griot::submit::Submission;

#[derive(Parser)]
#[command(
    name = "griot",
    about = "Archive spoken knowledge before it is lost",
    long_about = "Griot collects spoken-knowledge submissions: an audio recording plus \
        optional companion media and metadata. Transcription, English translation, \
        and summarization are delegated to hosted AI services; the results are \
        recovered from the response text and archived as one JSON record per \
        submission in a flat on-disk store that can be listed and displayed later."
)]
struct Cli {
    /// Path to config file
    ///
    /// Defaults to ~/.config/griot/config.yaml if not specified.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    ///
    /// Sets the log level to debug for the griot crate, showing detailed
    /// information about API calls, extraction, and store operations.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Archive one audio recording
    ///
    /// Reads the audio file, delegates transcription, translation, and
    /// summarization to the configured hosted services, and writes the
    /// result as a new JSON record. Companion media passed with --attach
    /// is copied into the uploads tree and referenced from the record.
    /// The record is write-once: there is no update or delete.
    Submit {
        /// Path to the audio recording
        audio: PathBuf,

        /// Submitter name (stored as "Anonymous" when omitted)
        #[arg(long)]
        name: Option<String>,

        /// Latitude where the recording was made
        #[arg(long)]
        latitude: Option<String>,

        /// Longitude where the recording was made
        #[arg(long)]
        longitude: Option<String>,

        /// Category label for the submission
        #[arg(long, default_value = "Story")]
        category: String,

        /// Source language of the audio
        ///
        /// Defaults to submit.language from the config file.
        #[arg(long)]
        language: Option<String>,

        /// Companion media to attach (image/video/document); may repeat
        #[arg(long = "attach", value_name = "PATH")]
        attachments: Vec<PathBuf>,
    },

    /// List archived records, newest first
    ///
    /// Scans the data directory, parsing every record file to build its
    /// display line. Malformed files are reported individually and never
    /// abort the rest of the listing.
    List,

    /// Display one archived record
    ///
    /// Accepts a full record id or a unique short-id prefix as printed
    /// by `griot list`. Shows the transcript, translation, and summary;
    /// --prompt adds the exact prompt that was sent to the generative
    /// service, --json dumps the raw record instead.
    Show {
        /// Record id or unique prefix
        id: String,

        /// Also print the stored prompt audit copy
        #[arg(long)]
        prompt: bool,

        /// Print the raw record JSON instead of the formatted view
        #[arg(long, conflicts_with = "prompt")]
        json: bool,
    },

    /// Create a new configuration file
    ///
    /// Walks through an interactive setup for the submission pipeline,
    /// API keys, default source language, and data directory, and writes
    /// the result to the config file.
    Init,

    /// Generate shell completions
    ///
    /// Prints a completion script for the given shell to stdout.
    /// Source or install the output to enable tab completion.
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, elvish, powershell)
        shell: Shell,
    },
}

fn load_config(cli: &Cli) -> Result<Config, GriotError> {
    let path = cli.config.clone().unwrap_or_else(Config::default_path);
    Config::load(&path)
}

fn config_path(cli: &Cli) -> PathBuf {
    cli.config.clone().unwrap_or_else(Config::default_path)
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("griot=debug,info")
    } else {
        EnvFilter::new("griot=info,warn")
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() {
    install_completions_if_missing();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = run(cli);
    if let Err(e) = result {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

/// Auto-install shell completions for `$SHELL` if the completion file does not
/// already exist.  Runs silently — errors are ignored so that missing dirs or
/// unsupported shells never block normal operation.
fn install_completions_if_missing() {
    let Ok(shell_env) = std::env::var("SHELL") else {
        return;
    };

    let Some(home) = dirs::home_dir() else {
        return;
    };

    // Map $SHELL to a clap_complete Shell variant and a destination path.
    let (shell, path) = if shell_env.ends_with("/bash") {
        let dir = home.join(".local/share/bash-completion/completions");
        (Shell::Bash, dir.join("griot"))
    } else if shell_env.ends_with("/zsh") {
        (Shell::Zsh, home.join(".zfunc/_griot"))
    } else if shell_env.ends_with("/fish") {
        (Shell::Fish, home.join(".config/fish/completions/griot.fish"))
    } else {
        return;
    };

    if path.exists() {
        return;
    }

    // Create parent directory if needed.
    if let Some(parent) = path.parent()
        && std::fs::create_dir_all(parent).is_err()
    {
        return;
    }

    let mut buf = Vec::new();
    generate(shell, &mut Cli::command(), "griot", &mut buf);

    let _ = std::fs::write(&path, buf);
}

fn run(cli: Cli) -> Result<(), GriotError> {
    match cli.command {
        Command::Init => run_init(&cli),
        Command::Completions { shell } => {
            generate(shell, &mut Cli::command(), "griot", &mut std::io::stdout());
            Ok(())
        }
        _ => run_with_config(cli),
    }
}

fn run_with_config(cli: Cli) -> Result<(), GriotError> {
    let config = load_config(&cli)?;

    match cli.command {
        Command::Submit {
            audio,
            name,
            latitude,
            longitude,
            category,
            language,
            attachments,
        } => {
            let submission = Submission {
                audio,
                submitter: name,
                latitude,
                longitude,
                category,
                language: language.unwrap_or_else(|| config.submit.language.clone()),
                attachments,
            };

            let rt = tokio::runtime::Runtime::new()?;
            let record = rt.block_on(griot::submit::run_submission(&config, submission))?;

            println!("Archived record {}", record.short_id());
            println!();
            print_record(&record, false);
            Ok(())
        }
        Command::List => run_list(&config),
        Command::Show { id, prompt, json } => run_show(&config, &id, prompt, json),
        Command::Init | Command::Completions { .. } => unreachable!(),
    }
}

fn run_list(config: &Config) -> Result<(), GriotError> {
    let store = RecordStore::open(&config.store)?;
    let outcome = store.list()?;

    for error in &outcome.errors {
        tracing::warn!("skipping {}: {}", error.path.display(), error.message);
    }

    if outcome.records.is_empty() {
        println!("No records archived yet. Use `griot submit <audio>` to add one.");
        return Ok(());
    }

    for record in &outcome.records {
        println!("{}", record.display_label());
    }

    if !outcome.errors.is_empty() {
        println!();
        println!("({} malformed record file(s) skipped)", outcome.errors.len());
    }

    Ok(())
}

fn run_show(config: &Config, id: &str, with_prompt: bool, as_json: bool) -> Result<(), GriotError> {
    let store = RecordStore::open(&config.store)?;
    let record = store.find(id)?;

    if as_json {
        let json = serde_json::to_string_pretty(&record)
            .map_err(|e| GriotError::Other(format!("failed to serialize record: {e}")))?;
        println!("{json}");
        return Ok(());
    }

    print_record(&record, with_prompt);
    Ok(())
}

fn print_record(record: &Record, with_prompt: bool) {
    let time = record
        .timestamp
        .with_timezone(&chrono::Local)
        .format("%Y-%m-%d %H:%M:%S");

    println!("Record {} ({}, {})", record.id, record.category, record.language);
    println!("Submitted {time} by {}", record.submitter);
    if record.coordinates.latitude.is_some() || record.coordinates.longitude.is_some() {
        println!(
            "Location: {}, {}",
            record.coordinates.latitude.as_deref().unwrap_or("?"),
            record.coordinates.longitude.as_deref().unwrap_or("?")
        );
    }

    println!();
    println!("{} transcript:", record.language);
    println!("{}", record.transcript);
    println!();
    println!("English translation:");
    println!("{}", record.translation);

    match &record.summary {
        Some(Summary::Steps {
            title,
            category,
            instructions,
        }) => {
            println!();
            println!("Summary: {title} ({category})");
            for step in instructions {
                println!("  {step}");
            }
        }
        Some(Summary::Text {
            title,
            category,
            summary_text,
        }) => {
            println!();
            println!("Summary: {title} ({category})");
            println!("  {summary_text}");
        }
        Some(Summary::Other(value)) => {
            println!();
            println!("Summary (unrecognized shape):");
            println!("{value:#}");
        }
        None => {}
    }

    if !record.media.is_empty() {
        println!();
        println!("Media:");
        for path in record
            .media
            .audio
            .iter()
            .chain(&record.media.image)
            .chain(&record.media.video)
            .chain(&record.media.file)
        {
            println!("  {path}");
        }
    }

    if with_prompt {
        println!();
        println!("Prompt sent to the generative service:");
        println!("{}", record.prompt);
    }
}

// ---------------------------------------------------------------------------
// Prompt helpers
// ---------------------------------------------------------------------------

fn prompt(msg: &str) -> Result<String, GriotError> {
    print!("{msg}");
    std::io::stdout()
        .flush()
        .map_err(|e| GriotError::Other(format!("failed to flush stdout: {e}")))?;
    let mut buf = String::new();
    std::io::stdin()
        .read_line(&mut buf)
        .map_err(|e| GriotError::Other(format!("failed to read input: {e}")))?;
    Ok(buf.trim().to_string())
}

fn prompt_default(msg: &str, default: &str) -> Result<String, GriotError> {
    let input = prompt(&format!("{msg} [{default}]: "))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

fn prompt_yes_no(msg: &str, default_yes: bool) -> Result<bool, GriotError> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{msg} [{hint}]: "))?;
    if input.is_empty() {
        return Ok(default_yes);
    }
    match input.to_lowercase().as_str() {
        "y" | "yes" => Ok(true),
        "n" | "no" => Ok(false),
        _ => Ok(default_yes),
    }
}

fn prompt_choice(msg: &str, options: &[&str]) -> Result<usize, GriotError> {
    println!("{msg}");
    for (i, opt) in options.iter().enumerate() {
        println!("  {}: {opt}", i + 1);
    }
    let input = prompt(&format!("Select [1-{}]: ", options.len()))?;
    let choice: usize = input
        .parse()
        .map_err(|_| GriotError::Other("invalid selection: enter a number".to_string()))?;
    if choice < 1 || choice > options.len() {
        return Err(GriotError::Other(format!(
            "selection out of range: pick 1-{}",
            options.len()
        )));
    }
    Ok(choice - 1)
}

// ---------------------------------------------------------------------------
// YAML builder helper
// ---------------------------------------------------------------------------

fn yaml_section<'a>(
    root: &'a mut serde_yaml_ng::Mapping,
    key: &str,
) -> Result<&'a mut serde_yaml_ng::Mapping, GriotError> {
    let k = serde_yaml_ng::Value::String(key.to_string());
    root.entry(k)
        .or_insert_with(|| serde_yaml_ng::Value::Mapping(serde_yaml_ng::Mapping::new()))
        .as_mapping_mut()
        .ok_or_else(|| GriotError::Config(format!("{key} section is not a mapping")))
}

// ---------------------------------------------------------------------------
// griot init
// ---------------------------------------------------------------------------

#[allow(clippy::too_many_lines)]
fn run_init(cli: &Cli) -> Result<(), GriotError> {
    use serde_yaml_ng::{Mapping, Value};

    let path = config_path(cli);

    // 1. Config path check
    if path.exists() {
        let overwrite = prompt_yes_no(
            &format!("Config file already exists at {}. Overwrite?", path.display()),
            false,
        )?;
        if !overwrite {
            println!("Aborted.");
            return Ok(());
        }
    }

    let mut root = Mapping::new();

    // 2. Submission pipeline
    println!();
    let pipeline_idx = prompt_choice(
        "Submission pipeline:",
        &[
            "Combined — one multimodal generative call (default)",
            "Staged — transcription service, then a translation call",
        ],
    )?;
    if pipeline_idx == 1 {
        let submit = yaml_section(&mut root, "submit")?;
        submit.insert(
            Value::String("pipeline".to_string()),
            Value::String("staged".to_string()),
        );
    }

    // 3. Generative API key
    println!();
    let generate_key = prompt("Generative API key (Enter to rely on GEMINI_API_KEY): ")?;
    if !generate_key.is_empty() {
        let generate = yaml_section(&mut root, "generate")?;
        generate.insert(
            Value::String("api_key".to_string()),
            Value::String(generate_key),
        );
    }

    // 4. Transcription API key, only needed by the staged pipeline
    if pipeline_idx == 1 {
        let transcribe_key =
            prompt("Transcription API key (Enter to rely on OPENAI_API_KEY): ")?;
        if !transcribe_key.is_empty() {
            let transcribe = yaml_section(&mut root, "transcribe")?;
            transcribe.insert(
                Value::String("api_key".to_string()),
                Value::String(transcribe_key),
            );
        }
    }

    // 5. Default source language
    println!();
    let language = prompt_default("Default source language", "Telugu")?;
    if !LANGUAGES.contains(&language.as_str()) {
        println!(
            "Note: '{language}' is not in the supported list ({}).",
            LANGUAGES.join(", ")
        );
    }
    if language != "Telugu" {
        let submit = yaml_section(&mut root, "submit")?;
        submit.insert(
            Value::String("language".to_string()),
            Value::String(language),
        );
    }

    // 6. Data directory
    println!();
    let default_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("griot")
        .to_string_lossy()
        .to_string();
    let data_dir = prompt_default("Data directory", &default_dir)?;
    if data_dir != default_dir {
        let store = yaml_section(&mut root, "store")?;
        store.insert(
            Value::String("directory".to_string()),
            Value::String(data_dir),
        );
    }

    // 7. Write config
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            GriotError::Config(format!(
                "failed to create config directory {}: {e}",
                parent.display()
            ))
        })?;
    }

    let yaml = serde_yaml_ng::to_string(&Value::Mapping(root))
        .map_err(|e| GriotError::Config(format!("failed to serialize config: {e}")))?;

    std::fs::write(&path, &yaml).map_err(|e| {
        GriotError::Config(format!(
            "failed to write config file {}: {e}",
            path.display()
        ))
    })?;

    // 8. Summary
    println!();
    println!("Config written to {}", path.display());
    println!(
        "Run `griot submit <audio>` to archive a recording (categories: {}).",
        CATEGORIES.join(", ")
    );

    Ok(())
}
