//! The `toonify models` command for inspecting the generator model.
//!
//! The model file is load-time configuration; there is no download step.
//! This command tells the user where the generator is expected and whether
//! it is there.

use clap::{Args, Subcommand};
use toonify_core::{CartoonEngine, Config};

/// Arguments for the `models` command.
#[derive(Args, Debug)]
pub struct ModelsArgs {
    #[command(subcommand)]
    pub command: ModelsCommand,
}

/// Subcommands for model management.
#[derive(Subcommand, Debug)]
pub enum ModelsCommand {
    /// Show the expected model path and whether the file is present
    Status,

    /// Show the expected model file path
    Path,

    /// Load the model to verify it is usable
    Check,
}

/// Execute the models command.
pub async fn execute(args: ModelsArgs, config: Config) -> anyhow::Result<()> {
    let model_dir = config.model_dir();
    let model_path = CartoonEngine::model_path(&config.model, &model_dir);

    match args.command {
        ModelsCommand::Status => {
            println!("Model:      {}", config.model.file_name());
            println!("Directory:  {}", model_dir.display());
            println!(
                "Input size: {}x{}",
                config.model.input_width, config.model.input_height
            );

            if CartoonEngine::model_exists(&config.model, &model_dir) {
                let size = std::fs::metadata(&model_path).map(|m| m.len()).unwrap_or(0);
                println!("Status:     present ({:.1} MB)", size as f64 / 1_048_576.0);
            } else {
                println!("Status:     missing");
                println!(
                    "\nPlace the generator at: {}\n(or adjust [model] / [general] in the config)",
                    model_path.display()
                );
            }
        }

        ModelsCommand::Path => {
            println!("{}", model_path.display());
        }

        ModelsCommand::Check => {
            // spawn_blocking: session construction parses the whole graph
            let model = config.model.clone();
            let engine = tokio::task::spawn_blocking(move || CartoonEngine::load(&model, &model_dir))
                .await??;
            let (width, height) = engine.input_size();
            println!("Model loads successfully ({}x{} input)", width, height);
        }
    }

    Ok(())
}
