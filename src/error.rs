use thiserror::Error;

/// Failure to render one field value, or to write a rendered entry.
///
/// Only array, object and reflected values can fail to render. Such a
/// failure never aborts the entry being rendered; it is reported next to the
/// finished output. `Io` comes from the sink a finished entry is written to.
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("formatting {type_name} failed")]
    Reflect { type_name: &'static str },

    #[error("{0}")]
    Marshal(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EncodeError {
    /// Error for a marshaler that could not produce its value.
    pub fn marshal(msg: impl Into<String>) -> Self {
        EncodeError::Marshal(msg.into())
    }
}
