use parking_lot::Mutex;
use pretty_log::{EncoderPools, Field, Level, PrettyLayer};
use std::io;
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Capture {
    type Writer = CaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CaptureWriter(Arc::clone(&self.0))
    }
}

impl Capture {
    fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock())
            .split_inclusive('\n')
            .map(str::to_owned)
            .collect()
    }
}

fn key(name: &str) -> String {
    format!(" \x1b[32m{}\x1b[0m=", name)
}

fn quiet_layer(capture: &Capture) -> PrettyLayer<Capture> {
    PrettyLayer::new()
        .with_pools(Arc::new(EncoderPools::default()))
        .with_writer(capture.clone())
        .with_target(false)
        .with_caller(false)
}

fn run<F: FnOnce()>(layer: PrettyLayer<Capture>, body: F) {
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, body);
}

#[test]
fn test_event_message_and_fields() {
    let capture = Capture::default();
    run(quiet_layer(&capture), || {
        tracing::info!(foo = "bar", n = 10, u = 10u64, ok = true, "hello");
    });

    let lines = capture.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("|\x1b[36mINFO\x1b[0m| hello"));
    assert!(lines[0].ends_with(&format!(
        "| hello{}\"bar\"{}10{}0xa{}true\n",
        key("foo"),
        key("n"),
        key("u"),
        key("ok")
    )));
}

#[derive(Debug)]
struct Sample {
    a: &'static str,
}

#[test]
fn test_debug_values_are_unquoted() {
    let capture = Capture::default();
    run(quiet_layer(&capture), || {
        tracing::warn!(sample = ?Sample { a: "hi" }, "ohno");
    });

    let lines = capture.lines();
    assert!(lines[0].ends_with(&format!("| ohno{}Sample {{ a: \"hi\" }}\n", key("sample"))));
}

#[test]
fn test_trace_renders_as_debug() {
    let capture = Capture::default();
    run(quiet_layer(&capture), || {
        tracing::trace!("fine grained");
    });

    assert!(capture.lines()[0].contains("|\x1b[35mDEBU\x1b[0m| fine grained"));
}

#[test]
fn test_span_fields_follow_event_fields_order() {
    let capture = Capture::default();
    run(quiet_layer(&capture), || {
        let outer = tracing::info_span!("outer", user = "u-1");
        let _outer = outer.enter();
        tracing::info_span!("inner", step = 2).in_scope(|| {
            tracing::info!(rows = 3, "loaded");
        });
        tracing::info!("after");
    });

    let lines = capture.lines();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with(&format!(
        "| loaded{}\"u-1\"{}2{}3\n",
        key("user"),
        key("step"),
        key("rows")
    )));
    // The inner span's fields never leak into its parent.
    assert!(lines[1].ends_with(&format!("| after{}\"u-1\"\n", key("user"))));
}

#[test]
fn test_recorded_span_fields() {
    let capture = Capture::default();
    run(quiet_layer(&capture), || {
        let span = tracing::info_span!("req", user = tracing::field::Empty);
        span.record("user", "ann");
        span.in_scope(|| tracing::info!("served"));
    });

    assert!(capture.lines()[0].ends_with(&format!("| served{}\"ann\"\n", key("user"))));
}

#[test]
fn test_layer_context_fields() {
    let capture = Capture::default();
    let layer = quiet_layer(&capture).with_context(&[Field::string("service", "api")]);
    run(layer, || {
        tracing::info!(id = 1, "ping");
    });

    assert!(capture.lines()[0].ends_with(&format!("| ping{}\"api\"{}1\n", key("service"), key("id"))));
}

#[test]
fn test_target_and_caller() {
    let capture = Capture::default();
    let layer = quiet_layer(&capture).with_target(true).with_caller(true);
    run(layer, || {
        tracing::info!("located");
    });

    let line = &capture.lines()[0];
    assert!(line.contains(&format!("| located{}\"layer_tests\"", key("logger"))));
    assert!(line.contains(&format!("{}\"tests/layer_tests.rs:", key("caller"))));
}

#[test]
fn test_stacktrace_level() {
    let capture = Capture::default();
    let layer = quiet_layer(&capture).with_stacktrace_level(Level::Warn);
    run(layer, || {
        tracing::info!("calm");
        tracing::warn!("loud");
    });

    let lines = String::from_utf8_lossy(&capture.0.lock()).into_owned();
    let (calm, loud) = lines.split_once("| loud").expect("both events written");
    assert!(!calm.contains("stacktrace"));
    assert!(loud.starts_with(" \x1b[31mstacktrace\x1b[0m=\n"));
}

struct Broken;

impl std::fmt::Debug for Broken {
    fn fmt(&self, _f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Err(std::fmt::Error)
    }
}

#[test]
fn test_unprintable_debug_value_becomes_error_field() {
    let capture = Capture::default();
    run(quiet_layer(&capture), || {
        tracing::info!(bad = ?Broken, good = 1, "hello");
    });

    let lines = capture.lines();
    assert_eq!(lines.len(), 1);
    let line = &lines[0];
    assert!(line.contains("| hello"));
    assert!(line.contains(&key("badError")));
    assert!(line.ends_with(&format!("{}1\n", key("good"))));
}

#[test]
fn test_unprintable_debug_message_is_empty() {
    let capture = Capture::default();
    run(quiet_layer(&capture), || {
        tracing::info!(message = ?Broken, n = 2);
    });

    let lines = capture.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with(&format!("|\x1b[36mINFO\x1b[0m| {}2\n", key("n"))));
}

#[test]
fn test_child_spans_snapshot_parent_fields() {
    let capture = Capture::default();
    run(quiet_layer(&capture), || {
        let parent = tracing::info_span!("parent", user = tracing::field::Empty);
        let early = tracing::info_span!(parent: &parent, "early", step = 1);
        parent.record("user", "ann");
        let late = tracing::info_span!(parent: &parent, "late", step = 2);

        parent.in_scope(|| tracing::info!("in parent"));
        early.in_scope(|| tracing::info!("in early"));
        late.in_scope(|| tracing::info!("in late"));
    });

    let lines = capture.lines();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].ends_with(&format!("| in parent{}\"ann\"\n", key("user"))));
    assert!(lines[1].ends_with(&format!("| in early{}1\n", key("step"))));
    assert!(lines[2].ends_with(&format!("| in late{}\"ann\"{}2\n", key("user"), key("step"))));
}
