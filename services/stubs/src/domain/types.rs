use std::fmt;

use chrono::{DateTime, Utc};
use prost_reflect::MessageDescriptor;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::domain::predicate::Predicates;
use crate::domain::template::{self, RenderError, TemplateContext};

/// Scope assigned to stubs registered without one.
pub const DEFAULT_SCOPE: &str = "countdown";

/// Call budget assigned to stubs registered without `times`.
pub const DEFAULT_TIMES: u32 = 1;

/// Dispatch key of a gRPC method: the two halves of `/{service}/{method}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodRoute {
    pub service: String,
    pub method: String,
}

impl MethodRoute {
    pub fn new(service: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            method: method.into(),
        }
    }

    /// Route of a registered descriptor. A `method_name` that already carries the
    /// full `package.Service/Method` path wins over the separate `service` label.
    pub fn from_registration(service: &str, method_name: &str) -> Option<Self> {
        let (service, method) = match method_name.rsplit_once('/') {
            Some((service, method)) => (service.trim_start_matches('/'), method),
            None => (service, method_name),
        };
        if service.is_empty() || method.is_empty() {
            return None;
        }
        Some(Self::new(service, method))
    }

    /// Parse an HTTP/2 `:path` such as `/market_data.OTCMarketDataService/Countdown`.
    pub fn from_path(path: &str) -> Option<Self> {
        let (service, method) = path.strip_prefix('/')?.split_once('/')?;
        if service.is_empty() || method.is_empty() || method.contains('/') {
            return None;
        }
        Some(Self::new(service, method))
    }
}

impl fmt::Display for MethodRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.service, self.method)
    }
}

/// Streaming shape of a described method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionType {
    Unary,
    ClientStream,
    ServerStream,
    #[serde(alias = "BIDI")]
    BidiStream,
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unary => "UNARY",
            Self::ClientStream => "CLIENT_STREAM",
            Self::ServerStream => "SERVER_STREAM",
            Self::BidiStream => "BIDI_STREAM",
        })
    }
}

/// A registered gRPC method with its resolved message schemas. Immutable once stored.
#[derive(Debug, Clone)]
pub struct MethodDescription {
    pub id: String,
    pub description: String,
    pub service: String,
    pub method_name: String,
    pub route: MethodRoute,
    pub connection_type: ConnectionType,
    pub proxy_url: Option<String>,
    pub request_class: String,
    pub response_class: String,
    pub request_message: MessageDescriptor,
    pub response_message: MessageDescriptor,
    pub created_at: DateTime<Utc>,
}

/// How a stub turns its `data` into the reply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseMode {
    /// Substitute `${req.*}`, `${seed.*}` and `${state.*}` placeholders.
    #[default]
    Fill,
    /// Reply with `data` verbatim.
    Literal,
    /// Reply with an empty message.
    NoBody,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StubResponse {
    pub data: Value,
    pub mode: ResponseMode,
}

impl StubResponse {
    pub fn render(&self, ctx: &TemplateContext<'_>) -> Result<Value, RenderError> {
        match self.mode {
            ResponseMode::Fill => template::render(&self.data, ctx),
            ResponseMode::Literal => Ok(self.data.clone()),
            ResponseMode::NoBody => Ok(Value::Object(Map::new())),
        }
    }
}

/// Budget-limited rule mapping matching requests of one method to a response.
#[derive(Debug, Clone)]
pub struct Stub {
    pub id: Uuid,
    pub method_description_id: String,
    pub scope: String,
    pub name: String,
    /// Remaining calls; the stub is inactive at zero.
    pub times: u32,
    pub response: StubResponse,
    pub request_predicates: Predicates,
    pub state: Option<Predicates>,
    pub seed: Option<Value>,
    pub persist: Option<Value>,
    pub labels: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Stub {
    pub fn is_active(&self) -> bool {
        self.times > 0
    }
}

/// Filter for stub listings. Empty fields match everything.
#[derive(Debug, Clone, Default)]
pub struct StubFilter {
    pub method_description_id: Option<String>,
    pub scope: Option<String>,
    pub labels: Vec<String>,
}

impl StubFilter {
    pub fn accepts(&self, stub: &Stub) -> bool {
        self.method_description_id
            .as_deref()
            .is_none_or(|id| stub.method_description_id == id)
            && self.scope.as_deref().is_none_or(|scope| stub.scope == scope)
            && self.labels.iter().all(|label| stub.labels.contains(label))
    }
}

/// A persisted state object written by a stub's `persist` block.
#[derive(Debug, Clone, PartialEq)]
pub struct StateRecord {
    pub id: Uuid,
    /// Always a JSON object.
    pub data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
