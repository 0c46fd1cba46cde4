use crate::registry::Vendor;
use crate::transport::TransportError;
use thiserror::Error;

/// Unified error type for the gateway.
///
/// The first three kinds are detected before any network call is made. The vendor kinds are
/// only produced after a round trip and always name the vendor they came from.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Unknown model: no registry entry for deployment '{deployment_name}'")]
    UnknownModel { deployment_name: String },

    #[error("Unsupported parameter: '{parameter}' is not accepted by deployment '{deployment_name}'")]
    UnsupportedParameter {
        parameter: String,
        deployment_name: String,
    },

    #[error("Invalid parameter '{field}': {constraint}")]
    InvalidParameter { field: String, constraint: String },

    #[error("Vendor call failed ({vendor}): {cause}")]
    VendorCallFailed {
        vendor: Vendor,
        #[source]
        cause: TransportError,
    },

    #[error("Malformed vendor response ({vendor}): {reason}")]
    MalformedVendorResponse { vendor: Vendor, reason: String },

    #[error("Configuration error: {message}{}", .path.as_ref().map(|p| format!(" (at {})", p)).unwrap_or_default())]
    Configuration {
        message: String,
        path: Option<String>,
    },
}

impl Error {
    pub fn unknown_model(deployment_name: impl Into<String>) -> Self {
        Error::UnknownModel {
            deployment_name: deployment_name.into(),
        }
    }

    pub fn unsupported(parameter: impl Into<String>, deployment_name: impl Into<String>) -> Self {
        Error::UnsupportedParameter {
            parameter: parameter.into(),
            deployment_name: deployment_name.into(),
        }
    }

    pub fn invalid(field: impl Into<String>, constraint: impl Into<String>) -> Self {
        Error::InvalidParameter {
            field: field.into(),
            constraint: constraint.into(),
        }
    }

    pub fn vendor_call(vendor: Vendor, cause: TransportError) -> Self {
        Error::VendorCallFailed { vendor, cause }
    }

    pub fn malformed(vendor: Vendor, reason: impl Into<String>) -> Self {
        Error::MalformedVendorResponse {
            vendor,
            reason: reason.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
            path: None,
        }
    }

    /// Attach the config key or file path the error refers to.
    pub fn at(mut self, location: impl Into<String>) -> Self {
        if let Error::Configuration { ref mut path, .. } = self {
            *path = Some(location.into());
        }
        self
    }

    /// True for the kinds raised before any network traffic.
    pub fn is_preflight(&self) -> bool {
        matches!(
            self,
            Error::UnknownModel { .. }
                | Error::UnsupportedParameter { .. }
                | Error::InvalidParameter { .. }
        )
    }

    /// Vendor the error originated from, for post-call failures.
    pub fn vendor(&self) -> Option<Vendor> {
        match self {
            Error::VendorCallFailed { vendor, .. }
            | Error::MalformedVendorResponse { vendor, .. } => Some(*vendor),
            _ => None,
        }
    }
}
