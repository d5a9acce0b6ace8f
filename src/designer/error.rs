use std::fmt;

#[derive(Debug)]
pub enum DesignerError {
    /// Node.js sidecar failed to spawn (designer_server.js)
    SubprocessSpawn { script: String, source: std::io::Error },

    /// stdin/stdout pipe to the sidecar broke or returned garbage
    SessionIO(String),

    /// Sidecar answered but reported a command failure
    SessionProtocol { command: String, error: String },

    /// JSON parsing failed (sidecar output or user input)
    JsonParse { context: String, source: serde_json::Error },

    /// JSON serialization failed (request to the sidecar)
    JsonSerialize { context: String, source: serde_json::Error },

    /// DOM extraction returned an unexpected structure
    DomStructure(String),

    /// A host-page element the tool relies on is missing
    ElementNotFound { element: String, context: String },
}

impl fmt::Display for DesignerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DesignerError::SubprocessSpawn { script, source } => {
                write!(f, "Failed to spawn {} (is Node.js installed?): {}", script, source)
            }
            DesignerError::SessionIO(msg) => {
                write!(f, "Browser session I/O error: {}", msg)
            }
            DesignerError::SessionProtocol { command, error } => {
                write!(f, "Browser command '{}' failed: {}", command, error)
            }
            DesignerError::JsonParse { context, source } => {
                write!(f, "JSON parse error ({}): {}", context, source)
            }
            DesignerError::JsonSerialize { context, source } => {
                write!(f, "JSON serialize error ({}): {}", context, source)
            }
            DesignerError::DomStructure(msg) => {
                write!(f, "Unexpected DOM structure: {}", msg)
            }
            DesignerError::ElementNotFound { element, context } => {
                write!(f, "Element '{}' not found: {}", element, context)
            }
        }
    }
}

impl std::error::Error for DesignerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DesignerError::SubprocessSpawn { source, .. } => Some(source),
            DesignerError::JsonParse { source, .. } => Some(source),
            DesignerError::JsonSerialize { source, .. } => Some(source),
            _ => None,
        }
    }
}
