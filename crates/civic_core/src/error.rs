use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown status `{0}` (expected unresolved, in-progress or resolved)")]
    Status(String),
    #[error("unknown severity `{0}` (expected Low, Medium or High)")]
    Severity(String),
    #[error("unknown sort key `{0}` (expected date, severity or upvotes)")]
    SortKey(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatasetError {
    #[error("duplicate issue id `{0}`")]
    DuplicateId(String),
    #[error("issue at position {0} has an empty id")]
    EmptyId(usize),
    #[error("unsupported dataset extension `{0}` (expected yaml, yml, json or toml)")]
    UnsupportedFormat(String),
}
