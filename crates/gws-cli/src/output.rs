//! JSON documents printed on stdout.

use serde_json::{json, Map, Value};

use gws_core::{ExitCode, GwsError};

/// A finished command: the document to print and the process exit code.
#[derive(Debug)]
pub struct Outcome {
    pub document: Value,
    pub exit: ExitCode,
}

impl Outcome {
    /// `{"status": "success", "operation": ..., <fields>}`
    pub fn success(operation: &str, fields: Value) -> Self {
        let mut document = Map::new();
        document.insert("status".into(), json!("success"));
        document.insert("operation".into(), json!(operation));
        if let Value::Object(fields) = fields {
            document.extend(fields);
        }
        Self {
            document: Value::Object(document),
            exit: ExitCode::Success,
        }
    }

    /// A report that is not an error document but still exits non-zero.
    pub fn report(document: Value, exit: ExitCode) -> Self {
        Self { document, exit }
    }

    pub fn from_error(operation: &str, err: &GwsError) -> Self {
        Self {
            document: error_document(operation, err),
            exit: err.code().exit_code(),
        }
    }
}

pub fn error_document(operation: &str, err: &GwsError) -> Value {
    let mut document = json!({
        "status": "error",
        "error_code": err.code().as_str(),
        "operation": operation,
        "message": err.to_string(),
    });
    if let Some(details) = err.details() {
        document["details"] = json!(details);
    }
    document
}
