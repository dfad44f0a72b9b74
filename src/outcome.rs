//! JSON result objects printed on standard output.
//!
//! Every invocation ends by serializing exactly one `Outcome` to stdout.
//! The `status` tag is `"success"`, `"processing"` or `"error"`; success
//! payloads are flattened wrapper-specific structs (audio path, video path,
//! provider metadata).

use serde::Serialize;

use crate::error::GenError;

/// Tagged outcome of one generation invocation.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome<T: Serialize> {
    Success {
        #[serde(flatten)]
        output: T,
    },
    /// Webhook mode: the job was submitted and the vendor will call back.
    Processing {
        video_id: String,
        callback_url: String,
    },
    Error {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        details: Option<String>,
    },
}

impl<T: Serialize> Outcome<T> {
    pub fn success(output: T) -> Self {
        Outcome::Success { output }
    }

    pub fn from_error(err: &GenError) -> Self {
        Outcome::Error {
            message: err.to_string(),
            details: err.details(),
        }
    }
}

/// Print an outcome as a single JSON line on stdout.
pub fn emit<T: Serialize>(outcome: &Outcome<T>) {
    match serde_json::to_string(outcome) {
        Ok(line) => println!("{}", line),
        Err(e) => {
            // Serialization of our own structs should never fail; emit a
            // last-resort error object so the caller still gets valid JSON.
            let fallback = serde_json::json!({
                "status": "error",
                "message": format!("Failed to serialize result: {}", e),
            });
            println!("{}", fallback);
        }
    }
}
