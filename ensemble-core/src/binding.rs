//! State→argument marshaling.
//!
//! Binds a board's state snapshot to the arguments an agent callable
//! expects. Simple agents bind each declared parameter by name, with a
//! single-parameter fallback when the state has exactly one entry. Workflow
//! agents receive the whole state map and never fail to bind. Text values
//! are coerced into the declared scalar kind; non-text values pass through
//! unchanged.

use crate::agent::{AgentKind, AgentSpec};
use crate::error::BindError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Declared kind of one agent parameter, used to coerce textual state
/// values before the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    /// UTF-8 text; no coercion.
    Text,
    /// Integer scalar; text parses as `i64`.
    Int,
    /// Floating-point scalar; text parses as `f64`.
    Float,
    /// Boolean scalar; text parses as exactly `true`/`false`.
    Bool,
    /// Structured JSON; text values are rejected.
    Value,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamKind::Text => "text",
            ParamKind::Int => "int",
            ParamKind::Float => "float",
            ParamKind::Bool => "bool",
            ParamKind::Value => "value",
        };
        f.write_str(name)
    }
}

/// One declared parameter: the state key it binds to plus its kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// State key this parameter binds to.
    pub name: String,
    /// Declared kind, used for text coercion.
    pub kind: ParamKind,
}

impl ParamSpec {
    /// Declare a parameter of the given kind.
    pub fn new(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Declare a text parameter (the common case).
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Text)
    }
}

/// Marshal `state` into call arguments per `spec`.
pub(crate) fn bind_arguments(
    spec: &AgentSpec,
    state: &Map<String, Value>,
) -> Result<Vec<Value>, BindError> {
    match spec.kind() {
        AgentKind::Workflow => Ok(vec![Value::Object(state.clone())]),
        AgentKind::Simple => match spec.params() {
            [single] => {
                // Fall back to the sole state entry when the name misses.
                let fallback = state.values().next().filter(|_| state.len() == 1);
                let value = match state.get(&single.name).or(fallback) {
                    Some(value) => value.clone(),
                    None => {
                        return Err(BindError::AmbiguousBinding {
                            param: single.name.clone(),
                            entries: state.len(),
                        });
                    }
                };
                Ok(vec![coerce(value, single)?])
            }
            params => params
                .iter()
                .map(|param| {
                    let value = state
                        .get(&param.name)
                        .cloned()
                        .ok_or_else(|| BindError::MissingArgument(param.name.clone()))?;
                    coerce(value, param)
                })
                .collect(),
        },
    }
}

/// Coerce a bound value into the declared kind. Only text values are
/// coerced; everything else passes through unchanged.
fn coerce(value: Value, param: &ParamSpec) -> Result<Value, BindError> {
    let Value::String(text) = value else {
        return Ok(value);
    };
    let unsupported = || BindError::UnsupportedType {
        param: param.name.clone(),
        kind: param.kind,
    };
    match param.kind {
        ParamKind::Text => Ok(Value::String(text)),
        ParamKind::Int => text
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| unsupported()),
        ParamKind::Float => text
            .parse::<f64>()
            .map(Value::from)
            .map_err(|_| unsupported()),
        ParamKind::Bool => text
            .parse::<bool>()
            .map(Value::from)
            .map_err(|_| unsupported()),
        ParamKind::Value => Err(unsupported()),
    }
}
