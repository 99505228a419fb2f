//! Wire contract for the stdio host.
//!
//! One request per line:
//!
//! ```json
//! {"id": "1", "command": "search", "query": "rust", "debug": true}
//! {"id": "2", "command": "autocomplete", "query": "ru"}
//! {"id": "3", "command": "plugin", "name": "hash", "options": {"text": "abc"}}
//! {"id": "4", "command": "shutdown"}
//! ```
//!
//! One response per request: `{"id", "ok", "payload", "error"}`.

use serde::{Deserialize, Serialize};

/// Request id used when a line could not be parsed at all.
pub const PARSE_ERROR_ID: &str = "parse-error";

/// A request envelope read from stdin.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Request {
    /// Caller-chosen id echoed in the response.
    pub id: String,
    /// What to do.
    #[serde(flatten)]
    pub command: Command,
}

/// Supported commands.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Full metasearch.
    Search {
        /// Query text.
        query: String,
        /// Time each engine and report it under `plugins.engine_timings`.
        #[serde(default)]
        debug: bool,
    },
    /// Fused completions for a partial query.
    Autocomplete {
        /// Partial query text.
        query: String,
    },
    /// Direct plugin invocation.
    Plugin {
        /// Registered plugin name.
        name: String,
        /// Plugin-specific options.
        #[serde(default)]
        options: serde_json::Value,
    },
    /// Stop serving after acknowledging.
    Shutdown,
}

/// A response envelope written to stdout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    /// Id of the request being answered, or `parse-error`.
    pub id: String,
    /// Whether the command succeeded.
    pub ok: bool,
    /// Command result; `null` on failure.
    pub payload: serde_json::Value,
    /// Failure message when `ok` is false.
    pub error: Option<String>,
}

impl Response {
    /// Build a successful response.
    #[must_use]
    pub fn ok(id: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            ok: true,
            payload,
            error: None,
        }
    }

    /// Build an error response.
    #[must_use]
    pub fn error(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ok: false,
            payload: serde_json::Value::Null,
            error: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn search_request_parses_with_default_debug() {
        let request: Request =
            serde_json::from_str(r#"{"id":"1","command":"search","query":"rust"}"#).expect("parse");
        assert_eq!(request.id, "1");
        assert_eq!(
            request.command,
            Command::Search {
                query: "rust".into(),
                debug: false
            }
        );
    }

    #[test]
    fn plugin_request_parses_options() {
        let request: Request = serde_json::from_str(
            r#"{"id":"p","command":"plugin","name":"hash","options":{"text":"abc"}}"#,
        )
        .expect("parse");
        assert_eq!(
            request.command,
            Command::Plugin {
                name: "hash".into(),
                options: json!({"text": "abc"})
            }
        );
    }

    #[test]
    fn unknown_command_rejected() {
        let parsed = serde_json::from_str::<Request>(r#"{"id":"1","command":"launch"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn error_response_is_well_formed() {
        let resp = Response::error(PARSE_ERROR_ID, "bad json");
        let value = serde_json::to_value(&resp).expect("serialize");
        assert_eq!(
            value,
            json!({"id": "parse-error", "ok": false, "payload": null, "error": "bad json"})
        );
    }
}
