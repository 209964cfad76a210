//! Task Types
//!
//! Logical execution identifiers and task endpoint wire types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::HttpMethod;

/// Identifier of one logical execution; every attempt of a run shares it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionId(String);

impl ExecutionId {
    /// Wrap an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        let bytes: [u8; 16] = rand::random();
        let hex: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
        Self(format!(
            "{}-{}-{}-{}-{}",
            &hex[0..8],
            &hex[8..12],
            &hex[12..16],
            &hex[16..20],
            &hex[20..32]
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExecutionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ExecutionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One task invocation request as issued by the orchestrator.
#[derive(Clone, Debug)]
pub struct TaskRequest {
    /// Target endpoint URL.
    pub endpoint: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Instruct the target to fail the first contact of a new execution.
    pub simulate_failure: bool,
    /// Logical execution this request belongs to.
    pub execution_id: ExecutionId,
    /// Arbitrary caller payload merged into the request body.
    pub payload: Map<String, Value>,
}

impl TaskRequest {
    /// Create a request with an empty payload.
    pub fn new(
        endpoint: impl Into<String>,
        method: HttpMethod,
        execution_id: ExecutionId,
        simulate_failure: bool,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            method,
            simulate_failure,
            execution_id,
            payload: Map::new(),
        }
    }

    /// Add a payload field.
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.payload.insert(key.into(), value);
        self
    }

    /// Build the JSON body sent to the task endpoint.
    pub fn to_body(&self) -> TaskRequestBody {
        TaskRequestBody {
            execution_id: self.execution_id.clone(),
            simulate_failure: self.simulate_failure,
            payload: self.payload.clone(),
        }
    }
}

/// Task endpoint request body.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRequestBody {
    pub execution_id: ExecutionId,
    #[serde(alias = "set401", default)]
    pub simulate_failure: bool,
    /// Remaining caller payload.
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

/// Task endpoint success body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStatusResponse {
    pub status: String,
}

impl TaskStatusResponse {
    pub fn ok() -> Self {
        Self {
            status: "OK".to_string(),
        }
    }
}
