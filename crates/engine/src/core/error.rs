use thiserror::Error;

/// Error taxonomy of the correlation pipeline.
///
/// Per-file problems (`Parse`, `Read`, `UnsupportedTool`) are collected at
/// the adapter boundary and surface in the report's parse-failure list; only
/// a total absence of usable input is fatal to a run.
#[derive(Debug, Error)]
pub enum CorrelateError {
    #[error("malformed {tool} report: {reason}")]
    Parse { tool: String, reason: String },

    #[error("could not read {file}: {reason}")]
    Read { file: String, reason: String },

    #[error("no adapter registered for tool `{0}`")]
    UnsupportedTool(String),

    #[error("no input reports were supplied")]
    EmptyInput,

    #[error("none of the {supplied} supplied reports could be parsed")]
    NoUsableInput { supplied: usize },
}

impl CorrelateError {
    pub fn parse(tool: impl ToString, reason: impl ToString) -> Self {
        Self::Parse {
            tool: tool.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CorrelateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_tool_and_file() {
        let parse = CorrelateError::parse("tfsec", "expected value at line 1");
        assert_eq!(
            parse.to_string(),
            "malformed tfsec report: expected value at line 1"
        );

        let unsupported = CorrelateError::UnsupportedTool("sonarqube".to_string());
        assert!(unsupported.to_string().contains("sonarqube"));

        let starved = CorrelateError::NoUsableInput { supplied: 3 };
        assert!(starved.to_string().contains('3'));
    }
}
