use thiserror::Error;

#[allow(missing_docs)]
pub type LayoutResult<T = ()> = Result<T, LayoutError>;

/// Reasons an account buffer cannot be decoded
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum LayoutError {
    #[error("Accessing {width} bytes at offset {offset} overruns a buffer of {len} bytes")]
    OutOfBounds {
        offset: usize,
        width: usize,
        len: usize,
    },
    #[error("The account data does not start with the \"serum\" padding")]
    InvalidMagic,
    #[error("The account data is {len} bytes long, at least {min} are required")]
    AccountTooSmall { len: usize, min: usize },
    #[error("Event queue length {len} does not fit a whole number of events")]
    InvalidQueueLength { len: usize },
    #[error("The mint account data could not be unpacked")]
    InvalidMint,
    #[error("Unknown {field} value {value}")]
    InvalidEnumValue { field: &'static str, value: u64 },
    #[error("The vault signer nonce does not produce a valid program address")]
    InvalidVaultSignerNonce,
}

impl LayoutError {
    /// True for errors caused by a buffer whose length cannot hold the expected layout.
    pub fn is_layout_size_error(&self) -> bool {
        matches!(
            self,
            LayoutError::AccountTooSmall { .. } | LayoutError::InvalidQueueLength { .. }
        )
    }
}
