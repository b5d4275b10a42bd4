use serde::{Deserialize, Serialize};
use serde_json::Value;

/// HTTP-style status attached to every controller response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Ok,
    Created,
    NoContent,
    BadRequest,
    NotFound,
}

impl Status {
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::Created => 201,
            Self::NoContent => 204,
            Self::BadRequest => 400,
            Self::NotFound => 404,
        }
    }

    #[must_use]
    pub const fn is_success(self) -> bool {
        self.code() < 400
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Uniform response body: `{"status":"success", ...}` or `{"status":"fail","message":...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ResponseEnvelope {
    Success {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        results: Option<usize>,
        data: Value,
    },
    Fail {
        message: Value,
    },
}

impl ResponseEnvelope {
    #[must_use]
    pub const fn success(data: Value) -> Self {
        Self::Success { results: None, data }
    }

    #[must_use]
    pub const fn listing(results: usize, data: Value) -> Self {
        Self::Success { results: Some(results), data }
    }

    #[must_use]
    pub const fn fail(message: Value) -> Self {
        Self::Fail { message }
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Exactly one of these is produced per controller call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: Status,
    pub body: ResponseEnvelope,
}

impl ApiResponse {
    #[must_use]
    pub const fn new(status: Status, body: ResponseEnvelope) -> Self {
        Self { status, body }
    }
}
