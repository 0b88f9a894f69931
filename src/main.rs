use tracing::{error, warn};
use tracing_subscriber::{fmt, EnvFilter};

use ifoto::app::IFoto;
use ifoto::config::Config;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ifoto=debug"));
    if let Err(e) = fmt().with_env_filter(filter).try_init() {
        eprintln!("tracing init failed: {e}");
    }

    let config = Config::load().unwrap_or_else(|e| {
        warn!("{e}, falling back to defaults");
        Config::default()
    });

    let (app, boot) = IFoto::new(config).map_err(|e| {
        error!("Failed to start: {e}");
        e
    })?;

    iced::application("iFoto", IFoto::update, IFoto::view)
        .theme(IFoto::theme)
        .subscription(IFoto::subscription)
        .centered()
        .run_with(move || (app, boot))?;

    Ok(())
}
