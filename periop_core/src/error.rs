use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("field {field} was already populated during this extraction")]
    FieldConflict { field: &'static str },

    #[error("{extractor} extractor cannot write field {field}")]
    ForeignField {
        extractor: &'static str,
        field: &'static str,
    },

    #[error("unknown field path: {0}")]
    UnknownField(String),
}
