use anyhow::Context;
use playbar::config::{self, Overrides};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let overrides = parse_args(std::env::args().skip(1).collect())?;
    let settings = overrides.apply(config::load_settings()?);
    init_logging()?;
    tracing::info!(songs_url = %settings.songs_url, "starting playbar");

    playbar::app::run(settings)
}

fn init_logging() -> anyhow::Result<()> {
    config::ensure_config_dir()?;
    let path = config::log_path()?;
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    Ok(())
}

fn parse_args(args: Vec<String>) -> anyhow::Result<Overrides> {
    let mut out = Overrides::default();
    let mut index = 0;
    while index < args.len() {
        let flag = args[index].as_str();
        match flag {
            "--url" | "--artist" | "--ext" => {
                index += 1;
                let Some(value) = args.get(index).map(|value| value.trim()) else {
                    anyhow::bail!("{flag} requires a value");
                };
                if value.is_empty() {
                    anyhow::bail!("{flag} cannot be empty");
                }
                let value = Some(value.to_string());
                match flag {
                    "--url" => out.songs_url = value,
                    "--artist" => out.artist = value,
                    _ => out.audio_extension = value,
                }
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            other => anyhow::bail!("unknown argument {other}"),
        }
        index += 1;
    }
    Ok(out)
}

fn print_help() {
    println!("playbar");
    println!("  --url <url>       Songs directory listing URL");
    println!("  --artist <name>   Artist shown for every track");
    println!("  --ext <ext>       Audio file extension to list (default mp3)");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn flags_fill_overrides() {
        let parsed = parse_args(args(&[
            "--url",
            "http://10.0.0.2/songs/",
            "--artist",
            " Band ",
        ]))
        .expect("parse");
        assert_eq!(parsed.songs_url.as_deref(), Some("http://10.0.0.2/songs/"));
        assert_eq!(parsed.artist.as_deref(), Some("Band"));
        assert_eq!(parsed.audio_extension, None);
    }

    #[test]
    fn missing_or_unknown_values_are_rejected() {
        assert!(parse_args(args(&["--url"])).is_err());
        assert!(parse_args(args(&["--ext", "  "])).is_err());
        assert!(parse_args(args(&["--volume", "3"])).is_err());
    }
}
