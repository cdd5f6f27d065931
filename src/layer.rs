use std::backtrace::Backtrace;
use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use tracing::field::{Field as TracingField, Visit};
use tracing::span::{Attributes, Id, Record};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

use crate::encoder::PrettyEncoder;
use crate::entry::{Caller, Entry, Level};
use crate::error::EncodeError;
use crate::field::{Field, FieldValue, Reflected};
use crate::pool::EncoderPools;

/// A span's context fields, rendered once when the span is created.
struct SpanContext(PrettyEncoder);

/// `tracing` layer that writes every event as one colorized line.
///
/// Span fields behave as context fields: each new span deep-clones the
/// encoder of its parent (or the layer's root encoder) and appends its own
/// attributes, so events inside the span carry every enclosing span's fields
/// after their message.
///
/// A child span snapshots its parent's fields when it is created. Values
/// recorded on the parent afterwards (`Span::record`) show up on events in
/// the parent itself and in spans created later, not in existing children.
///
/// # Examples
///
/// ```no_run
/// use pretty_log::PrettyLayer;
/// use tracing_subscriber::prelude::*;
///
/// tracing_subscriber::registry()
///     .with(PrettyLayer::new().with_target(false))
///     .init();
///
/// let span = tracing::info_span!("request", id = 7);
/// let _guard = span.enter();
/// tracing::info!(status = 200u64, "served");
/// ```
pub struct PrettyLayer<W = fn() -> io::Stderr> {
    root: PrettyEncoder,
    make_writer: W,
    with_target: bool,
    with_caller: bool,
    stacktrace_level: Option<Level>,
}

impl PrettyLayer {
    /// Layer writing to stderr, with targets and callers shown.
    pub fn new() -> Self {
        Self {
            root: PrettyEncoder::new(),
            make_writer: io::stderr,
            with_target: true,
            with_caller: true,
            stacktrace_level: None,
        }
    }
}

impl Default for PrettyLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> PrettyLayer<W> {
    pub fn with_writer<W2>(self, make_writer: W2) -> PrettyLayer<W2>
    where
        W2: for<'w> MakeWriter<'w> + 'static,
    {
        PrettyLayer {
            root: self.root,
            make_writer,
            with_target: self.with_target,
            with_caller: self.with_caller,
            stacktrace_level: self.stacktrace_level,
        }
    }

    /// Show the event target as the `logger` field.
    pub fn with_target(mut self, enabled: bool) -> Self {
        self.with_target = enabled;
        self
    }

    /// Show the event's `file:line` as the `caller` field.
    pub fn with_caller(mut self, enabled: bool) -> Self {
        self.with_caller = enabled;
        self
    }

    /// Attach a captured stack trace to events at `level` or above.
    pub fn with_stacktrace_level(mut self, level: Level) -> Self {
        self.stacktrace_level = Some(level);
        self
    }

    /// Draw buffers and encoders from `pools`. Resets the root context and
    /// start clock, so call it before [`PrettyLayer::with_context`].
    pub fn with_pools(mut self, pools: Arc<EncoderPools>) -> Self {
        self.root = PrettyEncoder::with_pools(pools);
        self
    }

    /// Context fields rendered on every event.
    pub fn with_context(mut self, fields: &[Field]) -> Self {
        self.root = self.root.with_fields(fields);
        self
    }

    fn entry_for(&self, level: Level, message: String, meta: &tracing::Metadata<'_>) -> Entry {
        let mut entry = Entry::new(level, message);
        if self.with_target {
            entry = entry.with_logger_name(meta.target());
        }
        if self.with_caller {
            if let (Some(file), Some(line)) = (meta.file(), meta.line()) {
                entry = entry.with_caller(Caller::new(file, line));
            }
        }
        if self.stacktrace_level.is_some_and(|min| level >= min) {
            entry = entry.with_stack(Backtrace::force_capture().to_string());
        }
        entry
    }
}

impl<S, W> Layer<S> for PrettyLayer<W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + 'static,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut visitor = FieldVisitor::for_span();
        attrs.record(&mut visitor);

        let encoder = {
            let parent = span.parent();
            let extensions = parent.as_ref().map(|parent| parent.extensions());
            let base = extensions
                .as_ref()
                .and_then(|ext| ext.get::<SpanContext>())
                .map(|context| &context.0)
                .unwrap_or(&self.root);
            base.with_fields(&visitor.fields)
        };
        span.extensions_mut().insert(SpanContext(encoder));
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut visitor = FieldVisitor::for_span();
        values.record(&mut visitor);

        let mut extensions = span.extensions_mut();
        if let Some(SpanContext(encoder)) = extensions.get_mut::<SpanContext>() {
            encoder.add_fields(&visitor.fields);
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let meta = event.metadata();
        let mut visitor = FieldVisitor::for_event();
        event.record(&mut visitor);

        let level = Level::from(*meta.level());
        let entry = self.entry_for(level, visitor.message.take().unwrap_or_default(), meta);

        let encoded = {
            let span = ctx.event_span(event);
            let extensions = span.as_ref().map(|span| span.extensions());
            let context = extensions
                .as_ref()
                .and_then(|ext| ext.get::<SpanContext>())
                .map(|context| &context.0)
                .unwrap_or(&self.root);
            context.encode_entry(&entry, &visitor.fields)
        };

        let mut writer = self.make_writer.make_writer_for(meta);
        if let Err(err) = writer.write_all(encoded.buffer.as_bytes()) {
            eprintln!("[pretty_log] failed to write event: {}", EncodeError::from(err));
        }
        self.root.pools().release_buffer(encoded.buffer);
    }
}

// Debug output that was already formatted while the borrowed value was alive.
// `None` records that the value's own `Debug` impl failed, so the encoder
// reports it as a failed field instead of rendering nothing.
struct Formatted(Option<String>);

impl Formatted {
    fn capture(value: &dyn fmt::Debug) -> Self {
        let mut out = String::new();
        match fmt::write(&mut out, format_args!("{:?}", value)) {
            Ok(()) => Formatted(Some(out)),
            Err(_) => Formatted(None),
        }
    }
}

impl fmt::Debug for Formatted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(text) => f.write_str(text),
            None => Err(fmt::Error),
        }
    }
}

/// Maps `tracing` field values onto encoder fields.
struct FieldVisitor {
    capture_message: bool,
    message: Option<String>,
    fields: Vec<Field>,
}

impl FieldVisitor {
    fn for_event() -> Self {
        Self {
            capture_message: true,
            message: None,
            fields: Vec::new(),
        }
    }

    fn for_span() -> Self {
        Self {
            capture_message: false,
            message: None,
            fields: Vec::new(),
        }
    }

    fn push(&mut self, field: &TracingField, value: FieldValue) {
        // Metadata normalized from `log` records is not a user field.
        if field.name().starts_with("log.") {
            return;
        }
        self.fields.push(Field::new(field.name(), value));
    }

    fn is_message(&self, field: &TracingField) -> bool {
        self.capture_message && field.name() == "message"
    }
}

impl Visit for FieldVisitor {
    fn record_bool(&mut self, field: &TracingField, value: bool) {
        self.push(field, value.into());
    }

    fn record_i64(&mut self, field: &TracingField, value: i64) {
        self.push(field, value.into());
    }

    fn record_u64(&mut self, field: &TracingField, value: u64) {
        self.push(field, value.into());
    }

    fn record_f64(&mut self, field: &TracingField, value: f64) {
        self.push(field, value.into());
    }

    fn record_str(&mut self, field: &TracingField, value: &str) {
        if self.is_message(field) {
            self.message = Some(value.to_owned());
        } else {
            self.push(field, value.into());
        }
    }

    fn record_error(&mut self, field: &TracingField, value: &(dyn std::error::Error + 'static)) {
        self.push(field, FieldValue::String(value.to_string()));
    }

    fn record_debug(&mut self, field: &TracingField, value: &dyn fmt::Debug) {
        let formatted = Formatted::capture(value);
        if self.is_message(field) {
            // An unprintable message leaves the entry with an empty one.
            self.message = formatted.0;
        } else {
            self.push(field, FieldValue::Reflected(Reflected::new(formatted)));
        }
    }
}
