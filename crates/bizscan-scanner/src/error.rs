use bizscan_core::BusinessType;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("register selector {selector} unavailable for {business_type}: {reason}")]
    RegisterUnavailable {
        business_type: BusinessType,
        selector: String,
        reason: String,
    },

    #[error("business type {business_type} not offered after {attempts} attempts")]
    BusinessTypeUnavailable {
        business_type: BusinessType,
        attempts: u32,
    },

    #[error("failed to open the search form: {0}")]
    FormUnavailable(String),

    #[error("Report I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Browser error: {0}")]
    Browser(#[from] bizscan_browser::BrowserError),

    #[error("Core error: {0}")]
    Core(#[from] bizscan_core::BizscanError),
}

pub type Result<T> = std::result::Result<T, ScanError>;
