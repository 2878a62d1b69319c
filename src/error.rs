//! Error type shared by every stage of the solver.

use std::fmt;

/// Errors raised while loading, validating or solving an MDVRP instance.
#[derive(Debug)]
pub enum SolverError {
    /// Reading or writing a file failed.
    Io {
        path: String,
        source: std::io::Error,
    },
    /// The input document is not valid JSON or misses required fields.
    Parse(serde_json::Error),
    /// A latitude/longitude pair is NaN, infinite or out of range.
    InvalidLocation { id: String, lat: f64, lng: f64 },
    /// A vehicle speed is zero, negative or not finite.
    InvalidSpeed { vehicle: String, speed: f64 },
    /// A demand quantity is negative or not finite.
    InvalidDemand { point: String, demand: f64 },
    /// A vehicle capacity is negative or not finite.
    InvalidCapacity { vehicle: String, capacity: f64 },
    /// Two entities share an identifier (or an identifier is empty).
    DuplicateId(String),
    /// A vehicle references a depot that does not exist.
    UnknownDepot { vehicle: String, depot: String },
    /// A distance was requested for an identifier the model does not know.
    UnknownLocation(String),
    /// Demand points were supplied without any depot to serve them.
    NoDepots,
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverError::Io { path, source } => write!(f, "I/O error on {}: {}", path, source),
            SolverError::Parse(e) => write!(f, "malformed input: {}", e),
            SolverError::InvalidLocation { id, lat, lng } => {
                write!(f, "invalid location for '{}': ({}, {})", id, lat, lng)
            }
            SolverError::InvalidSpeed { vehicle, speed } => {
                write!(f, "vehicle '{}' has non-positive speed {}", vehicle, speed)
            }
            SolverError::InvalidDemand { point, demand } => {
                write!(f, "demand point '{}' has invalid demand {}", point, demand)
            }
            SolverError::InvalidCapacity { vehicle, capacity } => {
                write!(f, "vehicle '{}' has invalid capacity {}", vehicle, capacity)
            }
            SolverError::DuplicateId(id) => write!(f, "duplicate or empty identifier '{}'", id),
            SolverError::UnknownDepot { vehicle, depot } => {
                write!(f, "vehicle '{}' references unknown depot '{}'", vehicle, depot)
            }
            SolverError::UnknownLocation(id) => write!(f, "unknown location '{}'", id),
            SolverError::NoDepots => write!(f, "demand points supplied without any depot"),
        }
    }
}

impl std::error::Error for SolverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SolverError::Io { source, .. } => Some(source),
            SolverError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SolverError {
    fn from(e: serde_json::Error) -> Self {
        SolverError::Parse(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offender() {
        let err = SolverError::InvalidSpeed { vehicle: "T1".to_string(), speed: 0.0 };
        assert!(err.to_string().contains("T1"));

        let err = SolverError::UnknownDepot { vehicle: "T2".to_string(), depot: "W9".to_string() };
        let msg = err.to_string();
        assert!(msg.contains("T2") && msg.contains("W9"));
    }

    #[test]
    fn test_parse_error_keeps_source() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: SolverError = json_err.into();
        assert!(std::error::Error::source(&err).is_some());
    }
}
