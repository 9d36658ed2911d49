use questioneer::app::AppBuilder;
use questioneer::{conf, erx, log};
use tracing::{error, info};

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("ctrl-c received, shutting down"),
        Err(e) => error!("ctrl-c handler failed: {}", e),
    }
}

async fn launch() -> erx::ResultEX {
    let (name, log_conf) = {
        let q = conf::questioneer().read().map_err(erx::smp)?;
        (q.name.clone(), q.log_or_default())
    };

    let _guards = log::logging_initialize(&name, &log_conf).await?;

    let app = AppBuilder::new()?.use_model().await?.build();
    app.run(shutdown_signal()).await
}

#[tokio::main]
async fn main() {
    if let Err(e) = launch().await {
        eprintln!("questioneer failed: {}", e);
        std::process::exit(1);
    }
}
