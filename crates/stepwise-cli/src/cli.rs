//! Command-line interface for the stepwise utility
//!
//! Loads a walkthrough configuration and a rendered scene, then plays the
//! walkthrough scripted, interactively, or just checks it.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fmt;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::snapshot::Snapshot;
use crate::terminal;
use stepwise::controller::{check_selectors, Controller};
use stepwise::core::logging::init_logging;
use stepwise::{
    Command, Container, ControlPanel, GraphicDocument, Key, KeyPress, WalkthroughConfig,
};

/// Stepwise - step through a rendered diagram
#[derive(Parser)]
#[command(name = "stepwise")]
#[command(about = "Play step-by-step walkthroughs of rendered diagrams")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output (debug logging unless a level is given)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error); overrides STEPWISE_LOG_LEVEL
    #[arg(long, value_enum, global = true)]
    pub log_level: Option<LogLevel>,

    /// Set log format (compact|pretty|json); overrides STEPWISE_LOG_FORMAT
    #[arg(long, value_enum, global = true)]
    pub log_format: Option<LogFormat>,
}

/// Log level options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Play a scripted sequence of actions and print a snapshot after each
    Run {
        /// Walkthrough configuration (JSON, use - for stdin)
        #[arg(short, long)]
        config: PathBuf,

        /// Rendered scene (JSON)
        #[arg(short, long)]
        scene: PathBuf,

        /// Comma-separated actions: next, prev, reset, play, pause, toggle,
        /// key:<Name>, click:<control-id>, wait:<ms>
        #[arg(short, long, value_delimiter = ',')]
        actions: Vec<Action>,

        /// Print snapshots as JSON
        #[arg(long)]
        json: bool,

        /// When to use colors in output
        #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
        color: ColorChoice,
    },

    /// Step through the walkthrough interactively
    Play {
        #[arg(short, long)]
        config: PathBuf,

        #[arg(short, long)]
        scene: PathBuf,
    },

    /// Check every step's selectors against a scene
    Validate {
        #[arg(short, long)]
        config: PathBuf,

        #[arg(short, long)]
        scene: PathBuf,
    },

    /// List the steps of a configuration
    Steps {
        #[arg(short, long)]
        config: PathBuf,

        /// Show in JSON format
        #[arg(long)]
        json: bool,
    },
}

/// When to colorize output
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Use colors if stdout is a terminal and NO_COLOR is not set
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    fn enabled(self) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => {
                std::env::var_os("NO_COLOR").is_none()
                    && crossterm::tty::IsTty::is_tty(&io::stdout())
            }
        }
    }
}

/// One scripted action
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Command(Command),
    Key(Key),
    Click(String),
    Wait(Duration),
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        match s.split_once(':') {
            Some(("key", name)) => Ok(Action::Key(
                Key::from_str(name).unwrap_or_else(|never| match never {}),
            )),
            Some(("click", id)) if !id.is_empty() => Ok(Action::Click(id.to_string())),
            Some(("wait", ms)) => ms
                .parse::<u64>()
                .map(|ms| Action::Wait(Duration::from_millis(ms)))
                .map_err(|_| format!("Invalid wait duration: {}", ms)),
            Some(_) => Err(format!("Unknown action: {}", s)),
            None => Command::from_str(s).map(Action::Command),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Command(command) => write!(f, "{}", command),
            Action::Key(key) => write!(f, "key:{}", key),
            Action::Click(id) => write!(f, "click:{}", id),
            Action::Wait(duration) => write!(f, "wait:{}", duration.as_millis()),
        }
    }
}

/// Main CLI application
pub struct StepwiseApp {
    width: usize,
}

impl StepwiseApp {
    /// Create a new application instance with default settings
    pub fn new() -> Self {
        Self { width: 72 }
    }

    /// Run the application with the given CLI arguments
    pub fn run(&self, cli: Cli) -> Result<()> {
        let level = cli
            .log_level
            .map(|level| level.as_str())
            .or(cli.verbose.then_some("debug"));
        if let Err(e) = init_logging(level, cli.log_format.map(|f| f.as_str())) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("Stepwise v{}", env!("CARGO_PKG_VERSION"));
        }

        match cli.command {
            Commands::Run {
                config,
                scene,
                actions,
                json,
                color,
            } => self.run_command(&config, &scene, &actions, json, color),
            Commands::Play { config, scene } => self.play_command(&config, &scene),
            Commands::Validate { config, scene } => self.validate_command(&config, &scene),
            Commands::Steps { config, json } => self.steps_command(&config, json),
        }
    }

    /// Handle the run command
    fn run_command(
        &self,
        config: &Path,
        scene: &Path,
        actions: &[Action],
        json: bool,
        color: ColorChoice,
    ) -> Result<()> {
        let (config, scene) = self.load(config, scene)?;
        let snapshots = runtime()?.block_on(self.script(config, scene, actions))?;

        if json {
            println!("{}", serde_json::to_string_pretty(&snapshots)?);
        } else {
            let color = color.enabled();
            for snapshot in &snapshots {
                for line in snapshot.render(self.width, color) {
                    println!("{}", line);
                }
                println!();
            }
        }
        Ok(())
    }

    /// Apply `actions` in order, capturing a snapshot after readiness and after each
    pub async fn script(
        &self,
        config: WalkthroughConfig,
        scene: GraphicDocument,
        actions: &[Action],
    ) -> Result<Vec<Snapshot>> {
        let container = Container::new(config.container_id.clone());
        let panel = ControlPanel::for_controls(&config.controls);
        let mut controller = Controller::new(config, &container, panel)?;
        let binder = controller.subscribe();

        container.insert_rendered(scene);
        controller.process_pending();
        let mut snapshots = vec![Snapshot::capture(&controller, "ready")];

        for action in actions {
            debug!(%action, "Applying action");
            match action {
                Action::Command(command) => {
                    controller.dispatch(*command);
                }
                Action::Key(key) => {
                    let response = binder.key_press(&KeyPress::new(key.clone()));
                    if response.command.is_none() {
                        warn!(%key, "Key is not bound");
                    }
                    controller.process_pending();
                }
                Action::Click(id) => {
                    if !binder.click(id) {
                        warn!(control = %id, "Control is not bound");
                    }
                    controller.process_pending();
                }
                Action::Wait(duration) => {
                    drive_for(&mut controller, *duration).await;
                }
            }
            snapshots.push(Snapshot::capture(&controller, &action.to_string()));
        }
        Ok(snapshots)
    }

    /// Handle the play command
    fn play_command(&self, config: &Path, scene: &Path) -> Result<()> {
        let (config, scene) = self.load(config, scene)?;
        let container = Container::new(config.container_id.clone());
        let panel = ControlPanel::for_controls(&config.controls);
        let controller = Controller::new(config, &container, panel)?;
        container.insert_rendered(scene);
        runtime()?.block_on(terminal::play(controller))
    }

    /// Handle the validate command
    fn validate_command(&self, config: &Path, scene: &Path) -> Result<()> {
        let (config, scene) = self.load(config, scene)?;
        let failures = check_selectors(&config.steps, &scene);
        let selectors: usize = config.steps.iter().map(|step| step.elements.len()).sum();

        for failure in &failures {
            let mark = if failure.malformed { "✗" } else { "!" };
            println!(
                "{} step '{}' selector #{} '{}': {}",
                mark,
                failure.step,
                failure.position + 1,
                failure.selector,
                failure.message
            );
        }

        let malformed = failures.iter().filter(|f| f.malformed).count();
        if malformed > 0 {
            bail!("{} malformed selector(s)", malformed);
        }
        println!(
            "✓ {} steps, {} selectors, {} without matches",
            config.steps.len(),
            selectors,
            failures.len()
        );
        Ok(())
    }

    /// Handle the steps command
    fn steps_command(&self, config: &Path, json: bool) -> Result<()> {
        let config = self.load_config(config)?;
        if json {
            println!("{}", serde_json::to_string_pretty(&config.steps)?);
            return Ok(());
        }

        if config.steps.is_empty() {
            println!("No steps defined");
            return Ok(());
        }
        for (index, step) in config.steps.iter().enumerate() {
            println!("{:>3}. {}  {}", index + 1, step.id, step.elements.join(", "));
            for line in stepwise::wrap_text(&step.description, self.width.saturating_sub(5)) {
                println!("     {}", line);
            }
        }
        Ok(())
    }

    fn load(&self, config: &Path, scene: &Path) -> Result<(WalkthroughConfig, GraphicDocument)> {
        let config = self.load_config(config)?;
        let scene = GraphicDocument::from_json(&self.read_input(scene)?)
            .with_context(|| format!("Invalid scene '{}'", scene.display()))?;
        info!(steps = config.steps.len(), elements = scene.len(), "Walkthrough loaded");
        Ok((config, scene))
    }

    fn load_config(&self, path: &Path) -> Result<WalkthroughConfig> {
        WalkthroughConfig::from_json(&self.read_input(path)?)
            .with_context(|| format!("Invalid configuration '{}'", path.display()))
    }

    /// Read input from file or stdin (`-`)
    pub fn read_input(&self, path: &Path) -> Result<String> {
        if path.to_string_lossy() == "-" {
            let mut content = String::new();
            io::stdin().read_to_string(&mut content)?;
            return Ok(content);
        }
        fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read input file '{}': {}", path.display(), e))
    }
}

impl Default for StepwiseApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Drive the controller loop for `duration`
///
/// Returns false when the loop finished before the deadline.
async fn drive_for(
    controller: &mut Controller<GraphicDocument, ControlPanel>,
    duration: Duration,
) -> bool {
    match tokio::time::timeout(duration, controller.run()).await {
        Ok(()) => {
            debug!(?duration, "Controller loop ended before the wait elapsed");
            false
        }
        Err(_) => true,
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to start runtime")
}
