//! # Pretty Log
//!
//! A structured log-record encoder that renders each entry as one
//! human-readable, ANSI-colorized line for a terminal:
//!
//! ```text
//!      1.234ms |INFO| hello logger="app" caller="src/main.rs:12" foo="bar" n=42
//! ```
//!
//! ## Key Features
//!
//! * Typed fields for every primitive kind plus arrays, objects, durations,
//!   timestamps, binary blobs and arbitrary `Debug` values
//! * Clone-on-write context fields: a child logger's fields are rendered once
//!   and never touch the parent's bytes
//! * Pooled buffers and encoder shells, safe to share across threads
//! * Elapsed time since the logger was built instead of wall-clock time
//!
//! ## Main Components
//!
//! * `PrettyEncoder`: the encoder, its clones, and the entry renderer
//! * `Field` / `FieldValue`: the values an encoder accepts
//! * `EncoderPools`: buffer and encoder pools shared by one logging setup
//! * `PrettyLayer`: a `tracing-subscriber` layer driving the encoder
//! * `PrettyLog4rsEncoder`: a `log4rs` encoder driving the encoder
//!
//! ## Quick Start
//!
//! ```
//! use pretty_log::{Entry, EncoderPools, Field, Level, PrettyEncoder};
//! use std::sync::Arc;
//!
//! let pools = Arc::new(EncoderPools::default());
//! let logger = PrettyEncoder::with_pools(pools.clone())
//!     .with_fields(&[Field::string("service", "billing")]);
//!
//! let out = logger.encode_entry(
//!     &Entry::new(Level::Warn, "slow request"),
//!     &[Field::duration("took", std::time::Duration::from_millis(250))],
//! );
//! assert!(out.buffer.to_string_lossy().ends_with("took\x1b[0m=250ms\n"));
//!
//! // Hand the buffer back once it has been written
//! pools.release_buffer(out.buffer);
//! ```

pub mod buffer;
pub mod clock;
pub mod color;
pub mod encoder;
pub mod entry;
pub mod error;
pub mod field;
pub mod layer;
pub mod log4rs_encoder;
pub mod pool;
pub mod repr;

pub use buffer::{Buffer, BufferPool};
pub use color::Attribute;
pub use encoder::{EncodedEntry, PrettyEncoder};
pub use entry::{Caller, Entry, Level, ParseLevelError};
pub use error::EncodeError;
pub use field::{ArrayEncoder, ArrayMarshaler, Field, FieldValue, ObjectEncoder, ObjectMarshaler, Reflected};
pub use layer::PrettyLayer;
pub use log4rs_encoder::PrettyLog4rsEncoder;
pub use pool::{EncoderPool, EncoderPools, PoolConfig};
