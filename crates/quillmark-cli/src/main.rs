mod config;

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use quillmark_renderer::{Renderer, Theme, wrap_content};
use thiserror::Error;

use crate::config::{Config, ConfigError};

#[derive(Parser, Debug)]
#[command(name = "quillmark", version, about = "Render markdown to HTML", long_about = None)]
struct Cli {
    /// Markdown file to render; reads stdin when omitted
    input: Option<PathBuf>,

    /// Print the HTML fragment only, without the surrounding document
    #[arg(long)]
    raw: bool,

    /// Color theme of the embedded stylesheet
    #[arg(long, value_enum)]
    theme: Option<ThemeArg>,

    /// Extra class for the markdown-body container
    #[arg(long = "class", value_name = "NAME")]
    class_name: Option<String>,

    /// Write output here instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Config file; defaults to ./quillmark.toml when present
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write quillmark.css into DIR and link it instead of inlining
    #[arg(long, value_name = "DIR")]
    css_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ThemeArg {
    Auto,
    Light,
    Dark,
}

impl From<ThemeArg> for Theme {
    fn from(value: ThemeArg) -> Self {
        match value {
            ThemeArg::Auto => Theme::Auto,
            ThemeArg::Light => Theme::Light,
            ThemeArg::Dark => Theme::Dark,
        }
    }
}

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read {}: {source}", .path.display())]
    ReadInput { path: PathBuf, source: io::Error },

    #[error("failed to read stdin: {0}")]
    ReadStdin(#[source] io::Error),

    #[error("failed to write {}: {source}", .path.display())]
    WriteOutput { path: PathBuf, source: io::Error },

    #[error("failed to write stdout: {0}")]
    WriteStdout(#[source] io::Error),

    #[error("failed to write stylesheet into {}: {source}", .dir.display())]
    WriteStylesheet { dir: PathBuf, source: io::Error },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Flags merged over the config file.
#[derive(Debug)]
struct Options {
    raw: bool,
    theme: Theme,
    class_name: String,
}

impl Options {
    fn merge(cli: &Cli, config: &Config) -> Self {
        Self {
            raw: cli.raw || config.raw.unwrap_or(false),
            theme: cli
                .theme
                .map(Theme::from)
                .or(config.theme)
                .unwrap_or_default(),
            class_name: cli
                .class_name
                .clone()
                .or_else(|| config.class_name.clone())
                .unwrap_or_default(),
        }
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "render failed");
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let options = Options::merge(cli, &config);
    tracing::debug!(?options, "resolved options");

    let source = read_source(cli.input.as_ref())?;
    let fragment = quillmark_core::render(&source);

    let output = if options.raw {
        fragment
    } else {
        let renderer = config
            .vars
            .iter()
            .fold(Renderer::new(options.theme), |renderer, (key, value)| {
                renderer.with_var(key.as_str(), value.as_str())
            });
        if let Some(dir) = &cli.css_dir {
            renderer
                .generate_files(dir)
                .map_err(|source| CliError::WriteStylesheet {
                    dir: dir.clone(),
                    source,
                })?;
        }
        let body = wrap_content(&fragment, &options.class_name);
        renderer.embed_html(&body, cli.css_dir.is_none())
    };

    write_output(cli.output.as_ref(), &output)
}

fn load_config(cli: &Cli) -> Result<Config, CliError> {
    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            Config::discover(&cwd)?.unwrap_or_default()
        }
    };
    Ok(config)
}

fn read_source(input: Option<&PathBuf>) -> Result<String, CliError> {
    match input {
        Some(path) => fs::read_to_string(path).map_err(|source| CliError::ReadInput {
            path: path.clone(),
            source,
        }),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(CliError::ReadStdin)?;
            Ok(buffer)
        }
    }
}

fn write_output(path: Option<&PathBuf>, output: &str) -> Result<(), CliError> {
    match path {
        Some(path) => fs::write(path, output).map_err(|source| CliError::WriteOutput {
            path: path.clone(),
            source,
        }),
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(output.as_bytes())
                .and_then(|()| stdout.flush())
                .map_err(CliError::WriteStdout)
        }
    }
}
