//! Error taxonomy for the field-and-panel coupling engine.
//!
//! Grounded on `mux/src/error.rs` (`MuxError`) and `cli/src/error.rs`
//! (`ErrorCode`): a closed, plain enum with a hand-written `Display`, no
//! `thiserror`. `anyhow` is reserved for the fallible top-level entry points
//! (config loading, `Controller::run`) per §7.

use std::fmt;

/// Error kinds raised by the core engine (§7 Error Handling Design).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    /// A buffer operation referenced an area `>= N` (addressing fault).
    AreaOutOfRange,
    /// A transport operation (connect, transaction, timeout) failed.
    TransportFault,
    /// Every device on a gateway is failing.
    GatewayFault,
    /// Every gateway is persistently in fault; caller should hard-reset.
    SystemicFault,
    /// A declarative configuration entry was malformed.
    ConfigFault,
}

impl FieldError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AreaOutOfRange => "AREA_OUT_OF_RANGE",
            Self::TransportFault => "TRANSPORT_FAULT",
            Self::GatewayFault => "GATEWAY_FAULT",
            Self::SystemicFault => "SYSTEMIC_FAULT",
            Self::ConfigFault => "CONFIG_FAULT",
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::error::Error for FieldError {}

pub type FieldResult<T> = Result<T, FieldError>;
