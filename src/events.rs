//! Structured events emitted while downgrading
//!
//! The resolution and mutation steps never log directly. They report to an
//! injected [`EventSink`]; the binary installs [`TracingSink`], tests use
//! [`MemorySink`].

use crate::domain::DependencyGroup;
use serde::Serialize;
use std::fmt;
use std::sync::Mutex;

/// Severity of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventLevel {
    Debug,
    Info,
    Warn,
}

/// Something worth reporting about one package or table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum DowngradeEvent {
    /// No compatible version exists; the dependency is deleted
    Removed {
        group: DependencyGroup,
        package: String,
    },
    /// The constraint was rewritten
    Downgraded {
        group: DependencyGroup,
        package: String,
        from: String,
        to: String,
    },
    /// The rewritten constraint equals the declared one
    AlreadyCompatible {
        group: DependencyGroup,
        package: String,
    },
    /// The registry could not be reached for a package
    FetchFailed { package: String, message: String },
    /// A git, path or url dependency that no registry can resolve
    SkippedNonRegistry {
        group: DependencyGroup,
        package: String,
    },
    /// A registry release key that is not a version
    UnparsableRelease { package: String, version: String },
    /// A release's runtime requirement that does not parse
    UnparsableRequirement {
        package: String,
        version: String,
        requirement: String,
    },
    /// The runtime constraint of a table was set to the target
    RuntimeStamped {
        group: DependencyGroup,
        constraint: String,
    },
}

impl DowngradeEvent {
    /// Level this event is reported at
    pub fn level(&self) -> EventLevel {
        match self {
            DowngradeEvent::Removed { .. } | DowngradeEvent::Downgraded { .. } => EventLevel::Info,
            DowngradeEvent::FetchFailed { .. } => EventLevel::Warn,
            DowngradeEvent::AlreadyCompatible { .. }
            | DowngradeEvent::SkippedNonRegistry { .. }
            | DowngradeEvent::UnparsableRelease { .. }
            | DowngradeEvent::UnparsableRequirement { .. }
            | DowngradeEvent::RuntimeStamped { .. } => EventLevel::Debug,
        }
    }

    /// Short machine-readable name
    pub fn kind(&self) -> &'static str {
        match self {
            DowngradeEvent::Removed { .. } => "removed",
            DowngradeEvent::Downgraded { .. } => "downgraded",
            DowngradeEvent::AlreadyCompatible { .. } => "already_compatible",
            DowngradeEvent::FetchFailed { .. } => "fetch_failed",
            DowngradeEvent::SkippedNonRegistry { .. } => "skipped_non_registry",
            DowngradeEvent::UnparsableRelease { .. } => "unparsable_release",
            DowngradeEvent::UnparsableRequirement { .. } => "unparsable_requirement",
            DowngradeEvent::RuntimeStamped { .. } => "runtime_stamped",
        }
    }

    /// The package this event concerns, if any
    pub fn package(&self) -> Option<&str> {
        match self {
            DowngradeEvent::Removed { package, .. }
            | DowngradeEvent::Downgraded { package, .. }
            | DowngradeEvent::AlreadyCompatible { package, .. }
            | DowngradeEvent::FetchFailed { package, .. }
            | DowngradeEvent::SkippedNonRegistry { package, .. }
            | DowngradeEvent::UnparsableRelease { package, .. }
            | DowngradeEvent::UnparsableRequirement { package, .. } => Some(package),
            DowngradeEvent::RuntimeStamped { .. } => None,
        }
    }
}

impl fmt::Display for DowngradeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DowngradeEvent::Removed { package, .. } => {
                write!(f, "Removing {} as no compatible version found", package)
            }
            DowngradeEvent::Downgraded {
                package, from, to, ..
            } => write!(f, "Downgrading {} from {} to {}", package, from, to),
            DowngradeEvent::AlreadyCompatible { package, .. } => {
                write!(f, "Package {} is already compatible", package)
            }
            DowngradeEvent::FetchFailed { package, message } => {
                write!(f, "Failed to fetch package info for {}: {}", package, message)
            }
            DowngradeEvent::SkippedNonRegistry { group, package } => write!(
                f,
                "Skipping {} in {}: not a registry dependency",
                package, group
            ),
            DowngradeEvent::UnparsableRelease { package, version } => {
                write!(f, "Ignoring release {} of {}: not a valid version", version, package)
            }
            DowngradeEvent::UnparsableRequirement {
                package,
                version,
                requirement,
            } => write!(
                f,
                "Ignoring requires_python '{}' of {} {}",
                requirement, package, version
            ),
            DowngradeEvent::RuntimeStamped { group, constraint } => {
                write!(f, "Setting python = \"{}\" in {}", constraint, group)
            }
        }
    }
}

/// Receiver of downgrade events
pub trait EventSink: Send + Sync {
    fn emit(&self, event: DowngradeEvent);
}

/// Forwards events to `tracing` at their level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: DowngradeEvent) {
        let kind = event.kind();
        let package = event.package().unwrap_or_default();
        match event.level() {
            EventLevel::Debug => tracing::debug!(event = kind, package, "{}", event),
            EventLevel::Info => tracing::info!(event = kind, package, "{}", event),
            EventLevel::Warn => tracing::warn!(event = kind, package, "{}", event),
        }
    }
}

/// Records events in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<DowngradeEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything recorded so far
    pub fn events(&self) -> Vec<DowngradeEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Returns the events at `level`
    pub fn at_level(&self, level: EventLevel) -> Vec<DowngradeEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.level() == level)
            .collect()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: DowngradeEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn removed() -> DowngradeEvent {
        DowngradeEvent::Removed {
            group: DependencyGroup::Main,
            package: "foo".to_string(),
        }
    }

    #[test]
    fn test_levels() {
        assert_eq!(removed().level(), EventLevel::Info);
        assert_eq!(
            DowngradeEvent::AlreadyCompatible {
                group: DependencyGroup::Main,
                package: "numpy".into()
            }
            .level(),
            EventLevel::Debug
        );
        assert_eq!(
            DowngradeEvent::FetchFailed {
                package: "numpy".into(),
                message: "timeout".into()
            }
            .level(),
            EventLevel::Warn
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            removed().to_string(),
            "Removing foo as no compatible version found"
        );
        let downgraded = DowngradeEvent::Downgraded {
            group: DependencyGroup::Main,
            package: "numpy".into(),
            from: "^2.0.0".into(),
            to: "1.24.4".into(),
        };
        assert_eq!(
            downgraded.to_string(),
            "Downgrading numpy from ^2.0.0 to 1.24.4"
        );
    }

    #[test]
    fn test_package_accessor() {
        assert_eq!(removed().package(), Some("foo"));
        let stamped = DowngradeEvent::RuntimeStamped {
            group: DependencyGroup::Main,
            constraint: "^3.8".into(),
        };
        assert_eq!(stamped.package(), None);
        assert_eq!(stamped.kind(), "runtime_stamped");
    }

    #[test]
    fn test_memory_sink_records_in_order() {
        let sink = MemorySink::new();
        sink.emit(removed());
        sink.emit(DowngradeEvent::FetchFailed {
            package: "bar".into(),
            message: "HTTP 500".into(),
        });

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], removed());
        assert_eq!(sink.at_level(EventLevel::Warn).len(), 1);
    }

    #[test]
    fn test_tracing_sink_accepts_every_level() {
        let sink = TracingSink;
        sink.emit(removed());
        sink.emit(DowngradeEvent::FetchFailed {
            package: "bar".into(),
            message: "HTTP 500".into(),
        });
        sink.emit(DowngradeEvent::UnparsableRelease {
            package: "bar".into(),
            version: "latest".into(),
        });
    }

    #[test]
    fn test_serialize_event() {
        let json = serde_json::to_value(removed()).unwrap();
        assert_eq!(json["event"], "removed");
        assert_eq!(json["package"], "foo");
    }
}
