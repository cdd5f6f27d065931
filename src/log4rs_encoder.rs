use std::io::Write as _;
use std::sync::Arc;

use log::Record;
use log4rs::encode::{Encode, Write};

use crate::encoder::PrettyEncoder;
use crate::entry::{Caller, Entry, Level};
use crate::error::EncodeError;
use crate::field::Field;
use crate::pool::EncoderPools;

/// Plugs the colorized encoder into any `log4rs` appender.
///
/// The record target becomes the `logger` field and `file:line` the
/// `caller` field. Context fields given to [`PrettyLog4rsEncoder::with_context`]
/// follow the message on every line. A failing writer surfaces as
/// [`EncodeError::Io`] inside the returned `anyhow::Error`.
///
/// # Examples
///
/// ```
/// use log4rs::append::console::ConsoleAppender;
/// use pretty_log::{Field, PrettyLog4rsEncoder};
///
/// let stdout = ConsoleAppender::builder()
///     .encoder(Box::new(
///         PrettyLog4rsEncoder::new().with_context(&[Field::string("service", "api")]),
///     ))
///     .build();
/// # let _ = stdout;
/// ```
#[derive(Debug)]
pub struct PrettyLog4rsEncoder {
    root: PrettyEncoder,
}

impl PrettyLog4rsEncoder {
    pub fn new() -> Self {
        Self {
            root: PrettyEncoder::new(),
        }
    }

    pub fn with_pools(pools: Arc<EncoderPools>) -> Self {
        Self {
            root: PrettyEncoder::with_pools(pools),
        }
    }

    /// Context fields rendered on every record.
    pub fn with_context(mut self, fields: &[Field]) -> Self {
        self.root = self.root.with_fields(fields);
        self
    }

    fn entry_for(record: &Record<'_>) -> Entry {
        let mut entry = Entry::new(Level::from(record.level()), record.args().to_string());
        if !record.target().is_empty() {
            entry = entry.with_logger_name(record.target());
        }
        if let (Some(file), Some(line)) = (record.file(), record.line()) {
            entry = entry.with_caller(Caller::new(file, line));
        }
        entry
    }
}

impl Default for PrettyLog4rsEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encode for PrettyLog4rsEncoder {
    fn encode(&self, w: &mut dyn Write, record: &Record<'_>) -> anyhow::Result<()> {
        let encoded = self.root.encode_entry(&Self::entry_for(record), &[]);
        let written = w.write_all(encoded.buffer.as_bytes());
        self.root.pools().release_buffer(encoded.buffer);
        written.map_err(EncodeError::from)?;
        Ok(())
    }
}
