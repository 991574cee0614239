use thiserror::Error;

#[derive(Error, Debug)]
pub enum MessageError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Message is not valid UTF-8")]
    InvalidEncoding,

    #[error("Unknown message shape, fields: [{0}]")]
    UnknownShape(String),

    #[error("Message matches both output and queue depth shapes")]
    Ambiguous,
}

impl MessageError {
    pub fn unknown_shape<'a>(fields: impl IntoIterator<Item = &'a str>) -> Self {
        MessageError::UnknownShape(fields.into_iter().collect::<Vec<_>>().join(", "))
    }
}
