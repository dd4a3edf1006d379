use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use neuma::{
    format, parse, pitch_name, Clock, Config, Decoder, EventSink, Fraction, PitchEvent, Scale,
    Sequence, Sequencer, Span,
};
use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "neuma")]
#[command(about = "Parse, decode and play neumalang sequences", long_about = None)]
struct Cli {
    /// JSON config file (scale, decode and clock settings)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Notation given inline or read from a file
#[derive(clap::Args)]
struct Input {
    /// Notation to read
    #[arg(required_unless_present = "file")]
    pattern: Option<String>,

    /// Read notation from a file
    #[arg(short, long, conflicts_with = "pattern")]
    file: Option<PathBuf>,
}

/// Scale overrides for the config file
#[derive(clap::Args)]
struct ScaleArgs {
    /// Scale root, as a note name or MIDI number
    #[arg(long)]
    root: Option<String>,

    /// Scale mode (major, minor, dorian, pentatonic, ...)
    #[arg(long)]
    mode: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the notation parses
    Validate {
        #[command(flatten)]
        input: Input,
    },
    /// Print the notation in canonical form
    Fmt {
        #[command(flatten)]
        input: Input,
    },
    /// Print the parsed tree
    Ast {
        #[command(flatten)]
        input: Input,

        /// Output format (json or debug)
        #[arg(short, long, default_value = "debug")]
        output_format: String,
    },
    /// Decode the notation into pitch events
    Decode {
        #[command(flatten)]
        input: Input,

        #[command(flatten)]
        scale: ScaleArgs,

        /// Start offset in beats (e.g. 0, 3/2, 0.25)
        #[arg(short, long, default_value = "0")]
        start: Fraction,

        /// Output format (json or debug)
        #[arg(long, default_value = "debug")]
        format: String,
    },
    /// Play the notation on the logical clock, printing note messages
    Play {
        #[command(flatten)]
        input: Input,

        #[command(flatten)]
        scale: ScaleArgs,

        /// Clock resolution, overrides the config file
        #[arg(long)]
        ticks_per_beat: Option<u32>,

        /// Wall-clock milliseconds between ticks (0 runs as fast as possible)
        #[arg(long, default_value_t = 0)]
        tick_ms: u64,
    },
}

/// Sink that prints each message as it arrives
struct PrintSink;

impl EventSink for PrintSink {
    fn note_on(&mut self, tick: u64, event: &PitchEvent) -> Result<()> {
        println!("{:>6}  on   {:<5} vel {}", tick, pitch_name(event.pitch), event.velocity);
        Ok(())
    }

    fn note_off(&mut self, tick: u64, event: &PitchEvent) -> Result<()> {
        println!("{:>6}  off  {}", tick, pitch_name(event.pitch));
        Ok(())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Validate { input } => {
            parse_or_exit(&input.read()?);
            println!("✓ Sequence is valid");
            Ok(())
        }
        Commands::Fmt { input } => {
            let ast = parse_or_exit(&input.read()?);
            println!("{}", format(&ast));
            Ok(())
        }
        Commands::Ast { input, output_format } => {
            let ast = parse_or_exit(&input.read()?);
            match output_format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&ast)?),
                _ => println!("{:#?}", ast),
            }
            Ok(())
        }
        Commands::Decode { input, scale, start, format } => {
            let source = input.read()?;
            let ast = parse_or_exit(&source);
            scale.apply(&mut config);
            let scale = build_scale(&config)?;

            let events = decode_or_exit(&ast, &scale, &config, start, &source);
            match format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&events)?),
                _ => {
                    println!("Events: {}", events.len());
                    for (i, event) in events.iter().enumerate() {
                        println!("  [{}] {}", i, event);
                    }
                }
            }
            Ok(())
        }
        Commands::Play { input, scale, ticks_per_beat, tick_ms } => {
            let source = input.read()?;
            let ast = parse_or_exit(&source);
            scale.apply(&mut config);
            if let Some(ticks_per_beat) = ticks_per_beat {
                config.clock.ticks_per_beat = ticks_per_beat;
            }
            let scale = build_scale(&config)?;
            let events = decode_or_exit(&ast, &scale, &config, Fraction::ZERO, &source);
            play(&events, &config, tick_ms)
        }
    }
}

impl Input {
    fn read(&self) -> Result<String> {
        match (&self.pattern, &self.file) {
            (_, Some(path)) => fs::read_to_string(path)
                .with_context(|| format!("Failed to read file: {}", path.display())),
            (Some(pattern), None) => Ok(pattern.clone()),
            (None, None) => anyhow::bail!("No notation given"),
        }
    }
}

impl ScaleArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(root) = &self.root {
            config.scale.root = root.clone();
        }
        if let Some(mode) = &self.mode {
            config.scale.mode = mode.clone();
            config.scale.intervals = None;
        }
    }
}

fn parse_or_exit(source: &str) -> Sequence {
    match parse(source) {
        Ok(ast) => ast,
        Err(e) => {
            eprintln!("✗ Parse error: {}", e);
            eprintln!("{}", Span::point(e.offset()).underline(source));
            std::process::exit(1);
        }
    }
}

fn decode_or_exit(
    ast: &Sequence,
    scale: &Scale,
    config: &Config,
    start: Fraction,
    source: &str,
) -> Vec<PitchEvent> {
    match Decoder::new(config.decode.clone()).decode(ast, scale, start) {
        Ok(events) => events,
        Err(e) => {
            eprintln!("✗ Decode error: {}", e);
            eprintln!("{}", e.span().underline(source));
            std::process::exit(1);
        }
    }
}

fn build_scale(config: &Config) -> Result<Scale> {
    let scale = config.scale.build()?;
    debug!(root = scale.root(), mode = scale.mode(), "using scale");
    Ok(scale)
}

fn play(events: &[PitchEvent], config: &Config, tick_ms: u64) -> Result<()> {
    let sequencer = Sequencer::new(config.clock)?;
    let sink = Rc::new(RefCell::new(PrintSink));

    let mut clock = Clock::new();
    let scheduled = sequencer.bind(&mut clock, events, &sink)?;
    info!(events = events.len(), callbacks = scheduled, "starting playback");

    clock.run(None);
    while clock.pending() > 0 {
        clock.tick()?;
        if tick_ms > 0 {
            thread::sleep(Duration::from_millis(tick_ms));
        }
    }
    clock.terminate();

    println!("Finished at tick {}", clock.now());
    Ok(())
}
