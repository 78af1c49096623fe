use anyhow::Result;
use clap::Parser;
use livecap::cli::{Cli, Commands};
use livecap::config::Config;
use livecap::diagnostics::check_dependencies;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(Config::default_path);
    let config = cli.apply_to(Config::load_or_default(&config_path)?.with_env_overrides());

    match cli.command {
        None => {
            #[cfg(feature = "cpal-audio")]
            {
                livecap::app::run_caption_command(config, cli.quiet).await?;
            }
            #[cfg(not(feature = "cpal-audio"))]
            {
                anyhow::bail!("this build has no audio capture; rebuild with the cpal-audio feature");
            }
        }
        Some(Commands::Devices) => {
            list_audio_devices()?;
        }
        Some(Commands::Check) => {
            if !check_dependencies(&config.engine.program) {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

#[cfg(feature = "cpal-audio")]
fn list_audio_devices() -> Result<()> {
    let devices = livecap::audio::capture::list_devices()?;
    if devices.is_empty() {
        println!("No audio input devices found");
    } else {
        println!("Audio input devices:");
        for device in devices {
            println!("  {}", device);
        }
    }
    Ok(())
}

#[cfg(not(feature = "cpal-audio"))]
fn list_audio_devices() -> Result<()> {
    anyhow::bail!("this build has no audio capture; rebuild with the cpal-audio feature")
}
