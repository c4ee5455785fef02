use futures::{Future, FutureExt};
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub fn setup_tracing() {
    let filter_layer = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_line_number(true)
        .compact()
        .with_writer(std::io::stdout);

    // A second call (tests, embedded use) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init();
}

pub async fn run_with_tracing<F, Fut>(future: F)
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<(), anyhow::Error>> + Send + 'static,
{
    setup_tracing();

    let result = std::panic::AssertUnwindSafe(future()).catch_unwind().await;

    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            error!(error = ?e, "Application exited with error");
        }
        Err(e) => capture_panic_details(e),
    }
}

fn capture_panic_details(e: Box<dyn std::any::Any + Send>) {
    let backtrace = backtrace::Backtrace::new();
    if let Some(s) = e.downcast_ref::<&str>() {
        error!(panic_message = *s, backtrace = ?backtrace, "Panic occurred with message");
    } else if let Some(s) = e.downcast_ref::<String>() {
        error!(panic_message = s, backtrace = ?backtrace, "Panic occurred with message");
    } else {
        error!(backtrace = ?backtrace, "Panic occurred but the payload is not a string");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_tracing_can_be_called_twice() {
        setup_tracing();
        setup_tracing();
    }

    #[tokio::test]
    async fn run_with_tracing_survives_a_panicking_future() {
        run_with_tracing(|| async {
            if std::hint::black_box(true) {
                panic!("boom");
            }
            Ok(())
        })
        .await;
    }

    #[tokio::test]
    async fn run_with_tracing_logs_errors_without_panicking() {
        run_with_tracing(|| async { Err(anyhow::anyhow!("poll failed")) }).await;
    }
}
