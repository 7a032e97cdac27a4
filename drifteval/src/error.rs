#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    #[error("degenerate segment for trace rows {start}..{end}: {source}")]
    DegenerateSegment {
        start: usize,
        end: usize,
        source: math::Error,
    },
    #[error("empty denominator: {0}")]
    EmptyDenominator(&'static str),
    #[error("length mismatch for {name}: {len} != {expected}")]
    LengthMismatch {
        name: String,
        len: usize,
        expected: usize,
    },
    #[error("missing data: {0}")]
    MissingData(&'static str),
    #[error("missing kind: {0}")]
    MissingKind(String),
    #[error("unsupported configs")]
    UnsupportedConfigs,
}
