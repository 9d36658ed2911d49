use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::erx;

/// Discard is a writer that discards all data written to it.
struct Discard;

impl std::io::Write for Discard {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// install the global subscriber
///
/// Console output goes to stdout when `log.console` is set, file output goes to a daily
/// rolling `{app_name}_questioneer.log` under `log.dirs` when it is not empty.
/// The returned guards flush the non-blocking writers and must live as long as the app.
pub async fn logging_initialize(app_name: &str, log_conf: &crate::conf::Log) -> erx::ResultE<Vec<WorkerGuard>> {
    let mut guards: Vec<WorkerGuard> = vec![];

    let (discard, guard) = tracing_appender::non_blocking(Discard {});
    guards.push(guard);

    let (console, console_reload) =
        tracing_subscriber::reload::Layer::new(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(discard.clone()));

    let (persist, persist_reload) =
        tracing_subscriber::reload::Layer::new(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(discard.clone()));

    if log_conf.console {
        let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());
        guards.push(guard);
        console_reload.reload(tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(true)).map_err(erx::amp("console reload"))?;
    }

    let logs_dir = log_conf.dirs.trim();
    if !logs_dir.is_empty() {
        tokio::fs::create_dir_all(logs_dir).await.map_err(erx::amp(&format!("log dir {}", logs_dir)))?;
        let prefix = format!("{}_questioneer.log", app_name);

        let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(logs_dir, prefix));
        guards.push(guard);
        persist_reload.reload(tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false)).map_err(erx::amp("persist reload"))?;
    }

    let filter = tracing_subscriber::EnvFilter::try_new(&log_conf.level).map_err(erx::amp("log level"))?;
    tracing_subscriber::registry().with(console).with(persist).with(filter).try_init().map_err(erx::amp("subscriber init"))?;

    Ok(guards)
}
