use thiserror::Error;

#[derive(Error, Debug)]
pub enum HostError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Failed to parse configuration '{source_name}': {message}")]
    ConfigParseError { source_name: String, message: String },

    #[error("Invalid value for '{field}' ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required secret '{key}': {hint}")]
    MissingSecretError { key: String, hint: String },

    #[error("Unknown resource '{name}' in {context}")]
    UnknownResourceError { name: String, context: String },

    #[error("Duplicate resource name: {name}")]
    DuplicateResourceError { name: String },

    #[error("Invalid resource name '{name}': {reason}")]
    InvalidResourceNameError { name: String, reason: String },

    #[error("Circular reference detected: {path}")]
    CircularReferenceError { path: String },

    #[error("Unknown service: {name}")]
    UnknownServiceError { name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Serialization,
    Config,
    Graph,
    Secret,
    Usage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl HostError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            HostError::IoError(_) => ErrorCategory::Io,
            HostError::SerializationError(_) => ErrorCategory::Serialization,
            HostError::ConfigParseError { .. } | HostError::InvalidConfigValueError { .. } => {
                ErrorCategory::Config
            }
            HostError::UnknownResourceError { .. }
            | HostError::DuplicateResourceError { .. }
            | HostError::InvalidResourceNameError { .. }
            | HostError::CircularReferenceError { .. } => ErrorCategory::Graph,
            HostError::MissingSecretError { .. } => ErrorCategory::Secret,
            HostError::UnknownServiceError { .. } => ErrorCategory::Usage,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            HostError::IoError(_) => ErrorSeverity::Critical,
            HostError::SerializationError(_) => ErrorSeverity::High,
            HostError::ConfigParseError { .. } => ErrorSeverity::High,
            HostError::InvalidConfigValueError { .. } => ErrorSeverity::Medium,
            HostError::MissingSecretError { .. } => ErrorSeverity::High,
            HostError::UnknownResourceError { .. }
            | HostError::DuplicateResourceError { .. }
            | HostError::InvalidResourceNameError { .. }
            | HostError::CircularReferenceError { .. } => ErrorSeverity::High,
            HostError::UnknownServiceError { .. } => ErrorSeverity::Medium,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            HostError::IoError(_) => {
                "Check file permissions and that the target directory exists".to_string()
            }
            HostError::SerializationError(_) => {
                "This is likely a bug; re-run with --verbose and report the output".to_string()
            }
            HostError::ConfigParseError { source_name, .. } => {
                format!("Check that '{}' is valid TOML", source_name)
            }
            HostError::InvalidConfigValueError { field, .. } => {
                format!("Correct the value of '{}' in the manifest", field)
            }
            HostError::MissingSecretError { hint, .. } => hint.clone(),
            HostError::UnknownResourceError { name, .. } => {
                format!("Declare resource '{}' before referencing it", name)
            }
            HostError::DuplicateResourceError { name } => {
                format!("Rename one of the resources called '{}'", name)
            }
            HostError::InvalidResourceNameError { .. } => {
                "Use lowercase letters, digits and hyphens for resource names".to_string()
            }
            HostError::CircularReferenceError { .. } => {
                "Remove one of the references in the cycle so startup order can be resolved"
                    .to_string()
            }
            HostError::UnknownServiceError { .. } => {
                "Run the 'plan' command to list the services this application defines".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            HostError::IoError(e) => format!("File operation failed: {}", e),
            HostError::SerializationError(_) => "Failed to serialize the startup plan".to_string(),
            HostError::ConfigParseError { source_name, .. } => {
                format!("The configuration file '{}' could not be parsed", source_name)
            }
            HostError::InvalidConfigValueError { field, value, .. } => {
                format!("Configuration value '{}' = '{}' is not valid", field, value)
            }
            HostError::MissingSecretError { key, .. } => {
                format!("The required secret '{}' is not available", key)
            }
            HostError::UnknownResourceError { name, context } => format!(
                "The application wires up '{}' ({}), but no resource with that name is declared",
                name, context
            ),
            HostError::DuplicateResourceError { name } => {
                format!("Two resources share the name '{}'", name)
            }
            HostError::InvalidResourceNameError { name, .. } => {
                format!("'{}' is not a valid resource name", name)
            }
            HostError::CircularReferenceError { path } => {
                format!("Services reference each other in a cycle: {}", path)
            }
            HostError::UnknownServiceError { name } => {
                format!("No service named '{}' is defined by this application", name)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, HostError>;
