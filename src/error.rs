//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ManifestError: Issues with reading, parsing or writing pyproject.toml
//! - ConstraintError: Malformed versions or version constraints
//! - RegistryError: Issues with package registry communication
//! - ConfigError: Issues with CLI configuration
//! - IoError: File system operation failures

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Manifest file related errors
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Version or constraint syntax errors
    #[error(transparent)]
    Constraint(#[from] ConstraintError),

    /// Package registry related errors
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// IO related errors
    #[error(transparent)]
    Io(#[from] IoError),
}

/// Errors related to manifest file operations
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Failed to read manifest file
    #[error("failed to read manifest file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write manifest file
    #[error("failed to write manifest file {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error
    #[error("failed to parse {path}: {message}. Ensure it's a valid TOML file")]
    TomlParseError { path: PathBuf, message: String },

    /// TOML serialization error
    #[error("failed to serialize manifest: {message}")]
    SerializeError { message: String },

    /// A dependency constraint could not be parsed
    #[error("invalid constraint for '{package}' in {table}: {source}")]
    InvalidDependency {
        package: String,
        table: String,
        #[source]
        source: ConstraintError,
    },
}

/// Errors raised while parsing versions and constraints
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstraintError {
    /// Text is not a valid version
    #[error("invalid version '{version}': {message}")]
    InvalidVersion { version: String, message: String },

    /// Text does not match any supported range grammar
    #[error("invalid constraint '{constraint}': {message}")]
    InvalidConstraint { constraint: String, message: String },
}

/// Errors related to package registry communication
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Package not found in registry
    #[error("package '{package}' not found in {registry} registry")]
    PackageNotFound { package: String, registry: String },

    /// Network request failed
    #[error("failed to fetch package '{package}' from {registry}: {message}")]
    NetworkError {
        package: String,
        registry: String,
        message: String,
    },

    /// Invalid response from registry
    #[error("invalid response from {registry} for '{package}': {message}")]
    InvalidResponse {
        package: String,
        registry: String,
        message: String,
    },

    /// Timeout
    #[error("timeout while fetching '{package}' from {registry}")]
    Timeout { package: String, registry: String },

    /// The HTTP client could not be built
    #[error("failed to create HTTP client: {message}")]
    ClientError { message: String },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The target Python version is not a version
    #[error("unsupported Python version '{value}': {message}")]
    InvalidTargetVersion { value: String, message: String },

    /// Invalid repository URL
    #[error("invalid repository URL '{value}': expected an http(s) URL")]
    InvalidRepository { value: String },
}

/// Errors related to IO operations
#[derive(Error, Debug)]
pub enum IoError {
    /// Writing to stdout failed
    #[error("failed to write output: {source}")]
    Stdout {
        #[source]
        source: std::io::Error,
    },
}

impl ManifestError {
    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new WriteError
    pub fn write_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::WriteError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new TomlParseError
    pub fn toml_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ManifestError::TomlParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new InvalidDependency error
    pub fn invalid_dependency(
        package: impl Into<String>,
        table: impl Into<String>,
        source: ConstraintError,
    ) -> Self {
        ManifestError::InvalidDependency {
            package: package.into(),
            table: table.into(),
            source,
        }
    }
}

impl ConstraintError {
    /// Creates a new InvalidVersion error
    pub fn invalid_version(version: impl Into<String>, message: impl Into<String>) -> Self {
        ConstraintError::InvalidVersion {
            version: version.into(),
            message: message.into(),
        }
    }

    /// Creates a new InvalidConstraint error
    pub fn invalid_constraint(constraint: impl Into<String>, message: impl Into<String>) -> Self {
        ConstraintError::InvalidConstraint {
            constraint: constraint.into(),
            message: message.into(),
        }
    }
}

impl RegistryError {
    /// Creates a new PackageNotFound error
    pub fn package_not_found(package: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::PackageNotFound {
            package: package.into(),
            registry: registry.into(),
        }
    }

    /// Creates a new NetworkError
    pub fn network_error(
        package: impl Into<String>,
        registry: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RegistryError::NetworkError {
            package: package.into(),
            registry: registry.into(),
            message: message.into(),
        }
    }

    /// Creates a new InvalidResponse error
    pub fn invalid_response(
        package: impl Into<String>,
        registry: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RegistryError::InvalidResponse {
            package: package.into(),
            registry: registry.into(),
            message: message.into(),
        }
    }

    /// Creates a new Timeout error
    pub fn timeout(package: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::Timeout {
            package: package.into(),
            registry: registry.into(),
        }
    }
}
