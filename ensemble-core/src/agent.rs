//! Agent metadata: specs, marshaling variants, and planner cards.

use crate::binding::{self, ParamSpec};
use crate::error::BindError;
use crate::id::AgentName;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Marshaling variant for an agent's callable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    /// Receives one value per declared parameter, bound by name from state.
    Simple,
    /// Receives the entire state map as a single composite argument.
    Workflow,
}

/// Immutable metadata describing one invocable agent: name, description,
/// declared parameters, marshaling variant, and optional output binding.
///
/// Specs are declared explicitly at composition time — there is no runtime
/// discovery. A Simple spec lists the parameters its callable expects; a
/// Workflow spec ignores parameter declarations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSpec {
    name: AgentName,
    description: String,
    kind: AgentKind,
    #[serde(default)]
    params: Vec<ParamSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    output: Option<String>,
}

impl AgentSpec {
    /// Spec for a Simple agent. Declare parameters with [`AgentSpec::with_param`].
    pub fn simple(name: impl Into<AgentName>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind: AgentKind::Simple,
            params: Vec::new(),
            output: None,
        }
    }

    /// Spec for a Workflow agent (receives the whole state map).
    pub fn workflow(name: impl Into<AgentName>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind: AgentKind::Workflow,
            params: Vec::new(),
            output: None,
        }
    }

    /// Declare one parameter, appended in call order.
    pub fn with_param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    /// Bind the response into state under `key` after every invocation.
    pub fn with_output(mut self, key: impl Into<String>) -> Self {
        self.output = Some(key.into());
        self
    }

    /// Registered name.
    pub fn name(&self) -> &AgentName {
        &self.name
    }

    /// Human description, shown to planners.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Marshaling variant.
    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    /// Declared parameters, in call order.
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Output binding key, if declared.
    pub fn output_key(&self) -> Option<&str> {
        self.output.as_deref()
    }

    /// Marshal a state snapshot into call arguments per this spec.
    pub fn bind_args(&self, state: &Map<String, Value>) -> Result<Vec<Value>, BindError> {
        binding::bind_arguments(self, state)
    }

    /// One-line planner card: `{name: description, [params]}` for Simple
    /// agents, `{name: description}` for Workflow agents.
    pub fn card(&self) -> String {
        match self.kind {
            AgentKind::Workflow => format!("{{{}: {}}}", self.name, self.description),
            AgentKind::Simple => {
                let params: Vec<&str> = self.params.iter().map(|p| p.name.as_str()).collect();
                format!("{{{}: {}, [{}]}}", self.name, self.description, params.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::ParamSpec;

    #[test]
    fn simple_card_lists_parameters() {
        let spec = AgentSpec::simple("editStory", "edits a story to fit a style")
            .with_param(ParamSpec::text("story"))
            .with_param(ParamSpec::text("style"));
        assert_eq!(
            spec.card(),
            "{editStory: edits a story to fit a style, [story, style]}"
        );
    }

    #[test]
    fn workflow_card_omits_parameters() {
        let spec = AgentSpec::workflow("novelCreator", "drafts a novel from shared state");
        assert_eq!(spec.card(), "{novelCreator: drafts a novel from shared state}");
    }

    #[test]
    fn output_binding_is_optional() {
        let bare = AgentSpec::simple("writer", "writes");
        assert_eq!(bare.output_key(), None);
        let bound = bare.clone().with_output("story");
        assert_eq!(bound.output_key(), Some("story"));
        assert_eq!(bare.name(), bound.name());
    }

    #[test]
    fn specs_round_trip_through_serde() {
        let spec = AgentSpec::simple("scoreStyle", "scores style fit")
            .with_param(ParamSpec::text("story"))
            .with_output("score");
        let json = serde_json::to_string(&spec).unwrap();
        let back: AgentSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, spec);
    }
}
