use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use ytm_dl::{Downloader, Installer, MusicApi, Painter, Session, YtDlp};

#[derive(Parser)]
#[command(name = "ytm-dl")]
#[command(version, about = "Search YouTube Music and download tracks as audio", long_about = None)]
struct Cli {
    /// Base directory for downloads
    #[arg(short, long, env = "YTM_DL_OUTPUT", default_value = "downloads")]
    output: PathBuf,

    /// Path to a yt-dlp binary (default: PATH, then the cached copy)
    #[arg(long = "yt-dlp", env = "YTM_DL_YT_DLP")]
    yt_dlp: Option<PathBuf>,

    /// Never download yt-dlp, fail if it cannot be found
    #[arg(long)]
    no_install: bool,

    /// Disable colored output (also honors NO_COLOR)
    #[arg(long)]
    no_color: bool,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let painter = if cli.no_color {
        Painter::plain()
    } else {
        Painter::from_env()
    };

    let binary = Installer::new()
        .with_binary(cli.yt_dlp)
        .with_install(!cli.no_install)
        .resolve()
        .await?;

    let mut downloader = Downloader::new(YtDlp::new(binary));
    downloader.set_output_dir(&cli.output);
    downloader.set_painter(painter);

    let api = MusicApi::new()?;

    let stdin = io::stdin();
    let mut session = Session::new(stdin.lock(), io::stdout(), painter);
    let outcome = session
        .run(|query| api.search_tracks(query), &downloader)
        .await?;

    if outcome.has_failures() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
