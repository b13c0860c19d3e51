//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::ApiError;

/// One line per error, source chain appended.
pub fn map_error(e: &ApiError) -> String {
    let mut message = e.to_string();
    let mut source = std::error::Error::source(e);
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message.replace('\n', "; ")
}
