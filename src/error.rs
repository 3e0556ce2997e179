//! Render errors. Every variant is fatal and aborts the whole document.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("'{stanza}' can only appear in {}", quote_all(.allowed))]
    Structure { stanza: String, allowed: Vec<String> },

    #[error("Value for '{field}' in '{stanza}' is missing")]
    MissingRequiredValue { stanza: String, field: String },

    #[error("Unsupported value type for '{field}': {kind}")]
    UnsupportedValueType { field: String, kind: &'static str },

    #[error("Bad value for '{field}': '{value}' (expected one of {})", quote_all(.allowed))]
    InvalidEnumValue {
        field: String,
        value: String,
        allowed: Vec<String>,
    },

    #[error("Unknown field '{field}' in '{stanza}'")]
    UnknownField { stanza: String, field: String },

    #[error("Unknown package ID '{0}'")]
    UnknownArtifact(String),

    #[error("Unknown stanza '{0}'")]
    UnknownStanza(String),

    #[error("Invalid options for '{stanza}': {source}")]
    InvalidOptions {
        stanza: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type RenderResult<T> = Result<T, RenderError>;

fn quote_all(items: &[String]) -> String {
    items
        .iter()
        .map(|s| format!("'{}'", s))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structure_message_lists_parents() {
        let err = RenderError::Structure {
            stanza: "affinity".to_string(),
            allowed: vec!["job".to_string(), "group".to_string()],
        };
        assert_eq!(err.to_string(), "'affinity' can only appear in 'job', 'group'");
    }

    #[test]
    fn test_enum_message() {
        let err = RenderError::InvalidEnumValue {
            field: "type".to_string(),
            value: "cron".to_string(),
            allowed: vec!["batch".to_string(), "service".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Bad value for 'type': 'cron' (expected one of 'batch', 'service')"
        );
    }
}
