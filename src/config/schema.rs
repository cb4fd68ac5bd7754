use serde_json::{json, Value};
use std::sync::LazyLock;

pub static CONFIG_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "provider": {
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "kind": { "type": "string", "enum": ["aws-cli", "snapshot"] },
                    "region": { "type": "string", "minLength": 1 },
                    "profile": { "type": "string" },
                    "access_key_id": { "type": "string" },
                    "secret_access_key": { "type": "string" },
                    "session_token": { "type": "string" },
                    "cli_path": { "type": "string" },
                    "snapshot_path": { "type": "string" },
                    "call_timeout_secs": { "type": "integer", "minimum": 1 }
                }
            },
            "audit": {
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "checks": {
                        "type": "array",
                        "items": {
                            "type": "string",
                            "enum": [
                                "storage", "network", "identity", "database", "compute",
                                "s3", "ec2", "iam", "rds", "lambda"
                            ]
                        },
                        "uniqueItems": true
                    },
                    "execution": { "type": "string", "enum": ["sequential", "parallel"] },
                    "max_concurrency": { "type": "integer", "minimum": 1 }
                }
            },
            "output": {
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "directory": { "type": "string" },
                    "formats": {
                        "type": "array",
                        "items": { "type": "string", "enum": ["json", "html", "terminal"] }
                    }
                }
            }
        }
    })
});
