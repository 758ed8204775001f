use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use pycall_extract::config::{ExtractionMode, HandlerConfig};
use pycall_extract::handler::PythonicHandler;
use pycall_extract::logging::{self, LoggingConfig};
use pycall_extract::prompt::{format_signatures, ChatMessage, FunctionInput};
use pycall_extract::tool_parser::{
    serialize_calls, ParserRegistry, ToolCall, ToolParser, TracingSink,
};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "pycall-extract")]
#[command(about = "Extract pythonic function calls from model output and build function-calling prompts")]
#[command(long_about = r#"
pycall-extract - pythonic function-call extraction for LLM output

Examples:
  # Canonical call strings, one per line
  pycall-extract decode output.txt

  # Only look inside the first ```python block, print OpenAI-style tool calls
  pycall-extract --mode fenced_block --fence-language python decode --json output.txt

  # Prompt for a conversation with the given functions
  pycall-extract prompt functions.json --messages messages.json
"#)]
struct CliArgs {
    /// JSON handler config file; flags below override its values
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Where to look for calls
    #[arg(long, global = true, value_parser = ["full_text", "fenced_block"])]
    mode: Option<String>,

    /// Only fenced blocks tagged with this language qualify
    #[arg(long, global = true)]
    fence_language: Option<String>,

    /// Log level
    #[arg(
        long,
        global = true,
        default_value = "warn",
        value_parser = ["trace", "debug", "info", "warn", "error"]
    )]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,

    /// Also write logs to daily files in this directory
    #[arg(long, global = true)]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode calls from model output read from a file or stdin
    Decode {
        /// Model output file; stdin when omitted or "-"
        input: Option<PathBuf>,

        /// Print OpenAI-style tool calls as JSON instead of call strings
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Pick the parser registered for this model name
        #[arg(long)]
        model: Option<String>,
    },
    /// Print the generation prompt for a conversation
    Prompt {
        /// JSON file holding one function schema or a list of them
        functions: PathBuf,

        /// JSON file holding a list of {role, content} messages
        #[arg(long)]
        messages: Option<PathBuf>,
    },
    /// Print the Python declarations for function schemas
    Signature {
        /// JSON file holding one function schema or a list of them
        functions: PathBuf,
    },
}

impl CliArgs {
    fn to_handler_config(&self) -> Result<HandlerConfig> {
        let base = match &self.config {
            Some(path) => HandlerConfig::from_file(path)?,
            None => HandlerConfig::default(),
        };

        let mut builder = base.to_builder();
        if let Some(mode) = &self.mode {
            builder = builder.mode(mode.parse::<ExtractionMode>()?);
        }
        if let Some(language) = &self.fence_language {
            builder = builder.fence_language(language.clone());
        }
        Ok(builder.build()?)
    }

    fn to_logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            json_format: self.log_json,
            log_dir: self.log_dir.clone(),
            ..LoggingConfig::with_level_name(&self.log_level)
        }
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            Ok(buffer)
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = read_input(Some(path))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn run_decode(
    handler: &PythonicHandler,
    input: Option<&Path>,
    json: bool,
    model: Option<&str>,
) -> Result<()> {
    let output = read_input(input)?;

    let calls = match model {
        Some(model) => {
            // Mode comes from the model mapping; limits and fence language from the config
            let registry = ParserRegistry::with_options(
                handler.config().pythonic_options(),
                Arc::new(TracingSink),
            );
            let parser = registry
                .get_parser(model)
                .ok_or_else(|| anyhow!("No parser registered for model '{}'", model))?;
            debug!(model, "Using registry parser");
            parser.parse_complete(&output)
        }
        None => handler.decode_calls(&output),
    };
    info!(count = calls.len(), "Decoded model output");

    if json {
        let tool_calls: Vec<ToolCall> = calls.iter().map(ToolCall::from).collect();
        println!("{}", serde_json::to_string_pretty(&tool_calls)?);
    } else {
        for line in serialize_calls(&calls) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    let _log_guard = logging::init_logging(args.to_logging_config());

    let config = args.to_handler_config()?;
    debug!(mode = %config.mode, "Loaded handler config");
    let handler = PythonicHandler::new(config)?;

    match &args.command {
        Command::Decode { input, json, model } => {
            if model.is_some() && args.mode.is_some() {
                bail!("--mode cannot be combined with --model, the model picks the mode");
            }
            run_decode(&handler, input.as_deref(), *json, model.as_deref())?
        }
        Command::Prompt {
            functions,
            messages,
        } => {
            let functions: FunctionInput = read_json(functions)?;
            let messages: Vec<ChatMessage> = match messages {
                Some(path) => read_json(path)?,
                None => Vec::new(),
            };
            print!("{}", handler.format_prompt(&messages, &functions)?);
        }
        Command::Signature { functions } => {
            let functions: FunctionInput = read_json(functions)?;
            println!("{}", format_signatures(functions.as_slice()));
        }
    }

    Ok(())
}
