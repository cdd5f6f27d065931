//! Core implementation of the colorized text encoder.
//!
//! This module provides [`PrettyEncoder`], which renders structured fields
//! and complete entries into ANSI-colored, human-readable lines.

use std::fmt::Write as _;
use std::mem::{self, ManuallyDrop};
use std::sync::Arc;

use chrono::SecondsFormat;

use crate::buffer::Buffer;
use crate::clock::StartClock;
use crate::color::{write_attributes, Attribute};
use crate::entry::{Entry, Level};
use crate::error::EncodeError;
use crate::field::{ArrayEncoder, Field, FieldValue, ObjectEncoder};
use crate::pool::{EncoderPools, EncoderShell};
use crate::repr::{self, ELAPSED_WIDTH};

/// A rendered entry together with the field failures met while rendering it.
///
/// A failed field never stops the entry: its `<key>Error` replacement is
/// already part of `buffer`.
#[derive(Debug)]
pub struct EncodedEntry {
    pub buffer: Buffer,
    pub errors: Vec<EncodeError>,
}

impl EncodedEntry {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_buffer(self) -> Buffer {
        self.buffer
    }
}

/// Encoder that renders fields as ` key=value` pairs, colored for a terminal.
///
/// A logger keeps one long-lived encoder holding its pre-rendered context
/// fields. Attaching more context deep-clones it ([`PrettyEncoder::with_fields`]);
/// rendering an entry works on a scratch clone
/// ([`PrettyEncoder::encode_entry`]), so the long-lived encoder's bytes never
/// change once built.
///
/// # Thread Safety
///
/// An encoder is used by one caller at a time. The pools it draws its
/// buffers and shells from are shared and thread-safe, so clones can be
/// moved to and used on other threads freely.
///
/// # Examples
///
/// ```
/// # use pretty_log::{Entry, Field, Level, PrettyEncoder};
/// let root = PrettyEncoder::new();
/// let scoped = root.with_fields(&[Field::string("request", "r-17")]);
///
/// let out = scoped.encode_entry(&Entry::new(Level::Info, "served"), &[Field::int("status", 200)]);
/// let line = out.buffer.to_string_lossy();
/// assert!(line.contains(" served"));
/// assert!(line.ends_with("\"r-17\" \x1b[32mstatus\x1b[0m=200\n"));
///
/// // The parent never sees the child's context
/// assert!(root.is_empty());
/// ```
pub struct PrettyEncoder {
    shell: ManuallyDrop<Box<EncoderShell>>,
    pools: Arc<EncoderPools>,
}

impl PrettyEncoder {
    /// Creates a root encoder drawing from the process-wide pools.
    pub fn new() -> Self {
        Self::with_pools(EncoderPools::shared())
    }

    /// Creates a root encoder drawing from `pools`. The start clock is
    /// captured here and inherited by every clone.
    pub fn with_pools(pools: Arc<EncoderPools>) -> Self {
        let mut shell = pools.encoders().acquire();
        shell.clock = StartClock::new();
        shell.buf = pools.acquire_buffer();
        Self {
            shell: ManuallyDrop::new(shell),
            pools,
        }
    }

    /// Clone sharing the start clock, with a fresh empty buffer.
    pub fn clone_empty(&self) -> Self {
        let mut shell = self.pools.encoders().acquire();
        shell.clock = self.shell.clock;
        shell.buf = self.pools.acquire_buffer();
        Self {
            shell: ManuallyDrop::new(shell),
            pools: Arc::clone(&self.pools),
        }
    }

    /// Clone that also copies the accumulated bytes.
    pub fn deep_clone(&self) -> Self {
        let mut clone = self.clone_empty();
        clone.shell.buf.append_bytes(self.shell.buf.as_bytes());
        clone
    }

    /// Returns a deep clone with `fields` appended as context.
    ///
    /// Fields that fail to render appear as `<key>Error` string fields.
    pub fn with_fields(&self, fields: &[Field]) -> Self {
        let mut clone = self.deep_clone();
        let errors = clone.add_fields(fields);
        if !errors.is_empty() {
            tracing::debug!(failed = errors.len(), "context fields failed to render");
        }
        clone
    }

    /// Adds `fields` in order, collecting the failures.
    pub fn add_fields(&mut self, fields: &[Field]) -> Vec<EncodeError> {
        let mut errors = Vec::new();
        for field in fields {
            if let Err(err) = field.add_to(self) {
                errors.push(err);
            }
        }
        errors
    }

    /// Bytes accumulated so far.
    pub fn as_bytes(&self) -> &[u8] {
        self.shell.buf.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.shell.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shell.buf.is_empty()
    }

    pub fn clock(&self) -> StartClock {
        self.shell.clock
    }

    pub fn pools(&self) -> &Arc<EncoderPools> {
        &self.pools
    }

    /// Consumes the encoder, handing its buffer to the caller. The shell goes
    /// back to the encoder pool.
    pub fn into_buffer(mut self) -> Buffer {
        mem::take(&mut self.shell.buf)
    }

    /// Renders one entry followed by this encoder's context and `fields`.
    ///
    /// Line layout:
    ///
    /// ```text
    /// <white>{elapsed:>13}<reset> |<level color>INFO<reset>| message logger="..." caller="..." <context> <fields> stacktrace=\n<trace>
    /// ```
    ///
    /// The returned buffer belongs to the caller, who should release it to
    /// [`EncoderPools::release_buffer`] once written.
    pub fn encode_entry(&self, entry: &Entry, fields: &[Field]) -> EncodedEntry {
        let mut last = self.clone_empty();

        last.add_attributes(&[Attribute::FgWhite]);
        let elapsed = repr::duration(last.shell.clock.elapsed());
        last.shell.buf.append_str(&repr::pad_left(&elapsed, ELAPSED_WIDTH));
        last.add_attributes(&[Attribute::Reset]);
        last.shell.buf.append_str(" |");

        last.add_attributes(entry.level.attributes());
        last.shell.buf.append_str(entry.level.tag());
        last.add_attributes(&[Attribute::Reset]);
        last.shell.buf.append_byte(b'|');

        last.shell.buf.append_byte(b' ');
        last.shell.buf.append_str(&entry.message);

        if let Some(name) = entry.logger_name.as_deref().filter(|name| !name.is_empty()) {
            last.add_key("logger");
            last.append_string(name.as_bytes());
        }

        if let Some(caller) = &entry.caller {
            last.add_key("caller");
            last.append_string(caller.trimmed().as_bytes());
        }

        // Context from earlier `with_fields` calls, already rendered.
        last.shell.buf.append_bytes(self.shell.buf.as_bytes());

        let errors = last.add_fields(fields);

        if let Some(stack) = entry.stack.as_deref().filter(|stack| !stack.is_empty()) {
            if entry.level != Level::Panic {
                last.shell.buf.append_byte(b' ');
                last.add_attributes(&[Attribute::FgRed]);
                last.shell.buf.append_str("stacktrace");
                last.add_attributes(&[Attribute::Reset]);
                last.shell.buf.append_str("=\n");
                last.shell.buf.append_str(stack);
            }
        }

        last.shell.buf.append_byte(b'\n');

        EncodedEntry {
            buffer: last.into_buffer(),
            errors,
        }
    }

    fn add_attributes(&mut self, attrs: &[Attribute]) {
        write_attributes(&mut self.shell.buf, attrs);
    }

    fn add_key(&mut self, key: &str) {
        self.shell.buf.append_byte(b' ');
        self.add_attributes(&[Attribute::FgGreen]);
        self.shell.buf.append_str(key);
        self.add_attributes(&[Attribute::Reset]);
        self.shell.buf.append_byte(b'=');
    }

    // No separator right after an opening or assigning byte.
    fn add_element_separator(&mut self) {
        match self.shell.buf.last_byte() {
            None | Some(b'{' | b'[' | b':' | b',' | b'=' | b' ') => {}
            Some(_) => self.shell.buf.append_str(", "),
        }
    }

    fn append_string(&mut self, s: &[u8]) {
        self.add_element_separator();
        let buf = &mut self.shell.buf;
        buf.append_byte(b'"');
        for &b in s {
            match b {
                b'\n' => buf.append_str("\\n"),
                b'\t' => buf.append_str("\\t"),
                b'\r' => buf.append_str("\\r"),
                _ => buf.append_byte(b),
            }
        }
        buf.append_byte(b'"');
    }

    fn append_plain(&mut self, s: &str) {
        self.add_element_separator();
        self.shell.buf.append_str(s);
    }

    fn append_value(&mut self, value: &FieldValue) -> Result<(), EncodeError> {
        match value {
            FieldValue::Bool(v) => self.append_plain(if *v { "true" } else { "false" }),
            FieldValue::Int(v) => self.append_plain(&repr::signed(*v)),
            FieldValue::Uint(v) => self.append_plain(&repr::unsigned(*v)),
            FieldValue::Float64(v) => self.append_plain(&repr::float64(*v)),
            FieldValue::Float32(v) => self.append_plain(&repr::float32(*v)),
            FieldValue::Complex128(re, im) => self.append_plain(&repr::complex128(*re, *im)),
            FieldValue::Complex64(re, im) => self.append_plain(&repr::complex64(*re, *im)),
            FieldValue::String(s) => self.append_string(s.as_bytes()),
            FieldValue::ByteString(b) => self.append_string(b),
            FieldValue::Binary(b) => {
                self.add_element_separator();
                self.shell.buf.append_str("0x");
                self.shell.buf.append_str(&hex::encode(b));
            }
            FieldValue::Duration(d) => self.append_plain(&repr::duration(*d)),
            FieldValue::Time(t) => self.append_plain(&t.to_rfc3339_opts(SecondsFormat::Secs, true)),
            FieldValue::Array(arr) => {
                self.add_element_separator();
                self.shell.buf.append_byte(b'[');
                let res = arr.marshal_log_array(self);
                self.shell.buf.append_byte(b']');
                return res;
            }
            FieldValue::Object(obj) => {
                self.add_element_separator();
                self.shell.buf.append_byte(b'{');
                let res = obj.marshal_log_object(self);
                self.shell.buf.append_byte(b'}');
                return res;
            }
            FieldValue::Reflected(r) => {
                self.add_element_separator();
                return write!(self.shell.buf, "{:?}", r.value()).map_err(|_| EncodeError::Reflect {
                    type_name: r.type_name(),
                });
            }
            FieldValue::Error(err) => self.append_string(err.to_string().as_bytes()),
            FieldValue::Namespace | FieldValue::Skip => {}
        }
        Ok(())
    }
}

impl ArrayEncoder for PrettyEncoder {
    fn append(&mut self, value: &FieldValue) -> Result<(), EncodeError> {
        self.append_value(value)
    }
}

impl ObjectEncoder for PrettyEncoder {
    fn add(&mut self, key: &str, value: &FieldValue) -> Result<(), EncodeError> {
        match value {
            FieldValue::Namespace => {
                self.open_namespace(key);
                Ok(())
            }
            FieldValue::Skip => Ok(()),
            _ => {
                self.add_key(key);
                self.append_value(value)
            }
        }
    }

    fn open_namespace(&mut self, _key: &str) {}
}

impl Default for PrettyEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for PrettyEncoder {
    fn clone(&self) -> Self {
        self.deep_clone()
    }
}

impl std::fmt::Debug for PrettyEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyEncoder")
            .field("clock", &self.shell.clock)
            .field("len", &self.shell.buf.len())
            .finish()
    }
}

impl Drop for PrettyEncoder {
    fn drop(&mut self) {
        // SAFETY: the shell is taken exactly once, here, and never touched again.
        let mut shell = unsafe { ManuallyDrop::take(&mut self.shell) };
        let buf = mem::take(&mut shell.buf);
        if buf.capacity() > 0 {
            self.pools.release_buffer(buf);
        }
        self.pools.encoders().release(shell);
    }
}
