use std::thread;
use std::time::Duration;

use pretty_log::{Level, PrettyLayer};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct Sample {
    a: &'static str,
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with(PrettyLayer::new().with_stacktrace_level(Level::Error))
        .init();

    tracing::debug!("debugging");
    tracing::info!(foo = "bar", "hello");
    thread::sleep(Duration::from_millis(250));
    tracing::info!("test");

    let span = tracing::info_span!("main", user = "u-1", attempt = 2u64);
    let _guard = span.enter();
    tracing::warn!(
        int = 10,
        flag = true,
        ratio = 1.1,
        text = "foo\nbar",
        sample = ?Sample { a: "hi" },
        "ohno"
    );

    let inner = tracing::info_span!("inner", step = "load");
    inner.in_scope(|| {
        tracing::info!(rows = 42u64, "loaded");
    });

    let err = std::io::Error::new(std::io::ErrorKind::Other, "bye");
    tracing::error!(error = %err, "wups");
}
