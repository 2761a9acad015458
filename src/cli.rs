//! CLI argument parsing with clap.

use clap::{Args, Parser, Subcommand};

use crate::ports::image_generator::AspectRatio;

/// AI image generation studio - prompt-to-image with a durable local history.
#[derive(Parser, Debug)]
#[command(name = "atelier", version, about)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Config file path override.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate an image from a text prompt.
    Generate(GenerateArgs),

    /// Inspect and manage the local generation history.
    History {
        /// History operation.
        #[command(subcommand)]
        command: HistoryCommand,
    },
}

/// Arguments for the `generate` subcommand.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Text prompt describing the desired image.
    #[arg(conflicts_with = "prompt_file")]
    pub prompt: Option<String>,

    /// Path to a file containing the prompt text.
    #[arg(short = 'p', long, conflicts_with = "prompt")]
    pub prompt_file: Option<String>,

    /// Aspect ratio: 1:1, 9:16, 16:9. Ignored when reference images are
    /// attached (the API infers the shape from them).
    #[arg(short, long, default_value = "1:1")]
    pub aspect_ratio: AspectRatio,

    /// Reference image file (repeatable).
    #[arg(short = 'i', long = "image")]
    pub images: Vec<String>,

    /// Output file path (auto-generated from the prompt if not specified).
    #[arg(short, long)]
    pub output: Option<String>,
}

impl GenerateArgs {
    /// Resolve the prompt from either the positional argument or the file flag.
    ///
    /// # Errors
    ///
    /// Returns an error if neither prompt nor prompt-file is provided,
    /// or if the file cannot be read.
    pub fn resolve_prompt(&self) -> Result<String, std::io::Error> {
        if let Some(ref text) = self.prompt {
            Ok(text.clone())
        } else if let Some(ref path) = self.prompt_file {
            std::fs::read_to_string(path)
        } else {
            Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Provide a prompt string or use -p/--prompt-file",
            ))
        }
    }
}

/// Operations on the stored history.
#[derive(Subcommand, Debug)]
pub enum HistoryCommand {
    /// List stored generations, newest first.
    List,

    /// Save a stored image back out to a file.
    Save {
        /// Record identifier, as shown by `history list`.
        id: String,

        /// Output file path (defaults to `generated-image-<id>.jpg`).
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Remove a record by identifier.
    Remove {
        /// Record identifier, as shown by `history list`.
        id: String,
    },
}
