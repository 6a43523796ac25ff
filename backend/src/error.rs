use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OptimizeError {
    #[error("no addresses to optimize")]
    EmptyInput,
    #[error("none of the addresses could be geocoded")]
    NoResolvedAddresses,
    #[error("start address could not be geocoded")]
    StartUnresolved,
}
