#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("length mismatch: {0} != {1}")]
    LengthMismatch(usize, usize),
    #[error("not enough points: {0}")]
    NotEnoughPoints(usize),
    #[error("singular fit, all x values are equal")]
    SingularFit,
}
