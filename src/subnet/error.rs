//! Error types for subnet definition validation.

use thiserror::Error;

/// Configuration errors raised while validating a subnet definition.
///
/// The messages are surfaced verbatim to CPI callers, so they are part of the
/// contract and must not be reworded.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum SubnetError {
    /// Raised when `cloud_properties` is absent, not a map, or an empty map.
    #[error("cloud_properties must be provided")]
    MissingCloudProperties,
    /// Raised when a required cloud property is missing or blank.
    #[error("{property} cloud property can not be empty")]
    EmptyCloudProperty {
        /// Key of the offending cloud property.
        property: &'static str,
    },
    /// Raised when `range` is missing or empty.
    #[error("Incorrect subnet definition. Proper CIDR block range must be given")]
    MissingRange,
    /// Raised when `range` is present but does not parse as an IPv4 CIDR block.
    #[error("Incorrect subnet definition. Proper CIDR block range must be given: {reason}")]
    MalformedRange {
        /// Parser detail describing the rejection.
        reason: String,
    },
    /// Raised when `gateway` is missing, empty, or not a bare IPv4 address.
    #[error("Incorrect subnet definition. Proper gateway must be given")]
    InvalidGateway,
}
