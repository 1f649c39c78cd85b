//! Tool System
//!
//! Declarative tool definitions, the function-calling wire schema and the
//! registry the agent resolves calls against.

use std::collections::HashMap;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ToolError;
use crate::message::{ToolArguments, ToolCallRequest};
use crate::state::ConversationState;

/// Schema primitive a parameter is advertised as
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Integer,
    Number,
    Boolean,
    Array,
    String,
}

impl ParamType {
    /// Infer the primitive from a default value's JSON type
    pub fn infer(value: &Value) -> Self {
        match value {
            Value::Bool(_) => Self::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => Self::Integer,
            Value::Number(_) => Self::Number,
            Value::Array(_) => Self::Array,
            _ => Self::String,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::String => "string",
        }
    }
}

/// Parameter declaration supplied by the tool author
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Parameter name
    pub name: String,

    /// Declared type; inferred from `default` when absent
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub param_type: Option<ParamType>,

    /// Human-readable description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether this parameter is required
    #[serde(default)]
    pub required: bool,

    /// Default value if not provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Enum of allowed values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
}

impl ParameterSchema {
    /// A parameter without a default
    pub fn required(name: impl Into<String>, param_type: ParamType) -> Self {
        Self {
            name: name.into(),
            param_type: Some(param_type),
            description: None,
            required: true,
            default: None,
            enum_values: None,
        }
    }

    /// A parameter with a default; its type is inferred unless set explicitly
    pub fn optional(name: impl Into<String>, default: Value) -> Self {
        Self {
            name: name.into(),
            param_type: None,
            description: None,
            required: false,
            default: Some(default),
            enum_values: None,
        }
    }

    pub fn with_type(mut self, param_type: ParamType) -> Self {
        self.param_type = Some(param_type);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_enum(mut self, values: Vec<Value>) -> Self {
        self.enum_values = Some(values);
        self
    }

    /// Advertised type: explicit, else inferred from the default, else string
    pub fn resolved_type(&self) -> ParamType {
        self.param_type
            .or_else(|| self.default.as_ref().map(ParamType::infer))
            .unwrap_or(ParamType::String)
    }
}

/// Tool definition in the function-calling wire format:
/// `{type: "function", function: {name, description, parameters}}`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionSchema,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionSchema {
    pub name: String,
    pub description: String,
    pub parameters: ParametersSchema,
}

/// `properties` keeps declaration order
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParametersSchema {
    #[serde(rename = "type")]
    pub kind: String,
    pub properties: Map<String, Value>,
    pub required: Vec<String>,
}

impl ToolSchema {
    pub fn name(&self) -> &str {
        &self.function.name
    }
}

/// Outcome of one tool call, kept as a tagged value until it is rendered
/// into the transcript
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolResult {
    /// Tool that was called
    pub name: String,

    /// Call ID from the request
    pub call_id: Option<String>,

    /// Value returned by the handler, or why there is none
    pub outcome: std::result::Result<Value, ToolError>,
}

impl ToolResult {
    pub fn success(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            call_id: None,
            outcome: Ok(value),
        }
    }

    pub fn failure(name: impl Into<String>, error: ToolError) -> Self {
        Self {
            name: name.into(),
            call_id: None,
            outcome: Err(error),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.call_id = Some(id.into());
        self
    }

    pub const fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn error(&self) -> Option<&ToolError> {
        self.outcome.as_ref().err()
    }

    /// Text appended to the transcript as the tool message
    pub fn render(&self) -> String {
        match &self.outcome {
            Ok(value) => render_value(value),
            Err(err) => err.render(&self.name),
        }
    }
}

/// Strings are passed through verbatim, everything else as compact JSON
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Read-only view of the conversation handed to tool handlers
#[derive(Clone, Copy, Default)]
pub struct ToolContext<'a> {
    state: Option<&'a ConversationState>,
}

impl<'a> ToolContext<'a> {
    pub const fn new(state: &'a ConversationState) -> Self {
        Self { state: Some(state) }
    }

    /// Context with no conversation behind it
    pub const fn detached() -> Self {
        Self { state: None }
    }

    /// Last successful result of another tool in this conversation
    pub fn previous_result(&self, tool: &str) -> Option<&'a Value> {
        self.state.and_then(|s| s.tool_result(tool))
    }

    pub fn memory(&self, key: &str) -> Option<&'a Value> {
        self.state.and_then(|s| s.memory(key))
    }
}

/// Invocable body of a tool
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, args: &ToolArguments, ctx: &ToolContext<'_>) -> anyhow::Result<Value>;
}

/// Adapts a plain closure into a [`ToolHandler`].
///
/// The closure runs on the blocking pool so a tool timeout can abandon it.
pub struct FnHandler<F>(Arc<F>);

impl<F> FnHandler<F> {
    pub fn new(f: F) -> Self {
        Self(Arc::new(f))
    }
}

#[async_trait]
impl<F> ToolHandler for FnHandler<F>
where
    F: Fn(&ToolArguments) -> anyhow::Result<Value> + Send + Sync + 'static,
{
    async fn call(&self, args: &ToolArguments, _ctx: &ToolContext<'_>) -> anyhow::Result<Value> {
        let f = Arc::clone(&self.0);
        let args = args.clone();
        match tokio::task::spawn_blocking(move || f(&args)).await {
            Ok(result) => result,
            // Re-raise so `Tool::execute` reports it as a panic
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(err) => Err(anyhow::anyhow!("tool task cancelled: {err}")),
        }
    }
}

/// A named, schema-described, invocable capability
#[derive(Clone)]
pub struct Tool {
    name: String,
    description: String,
    parameters: Vec<ParameterSchema>,
    docs: Option<String>,
    handler: Arc<dyn ToolHandler>,
}

impl fmt::Debug for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

impl Tool {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        handler: impl ToolHandler + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
            docs: None,
            handler: Arc::new(handler),
        }
    }

    /// Build a tool around a synchronous closure
    pub fn from_fn<F>(name: impl Into<String>, description: impl Into<String>, f: F) -> Self
    where
        F: Fn(&ToolArguments) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self::new(name, description, FnHandler::new(f))
    }

    /// Declare a parameter
    pub fn param(mut self, parameter: ParameterSchema) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Attach a documentation block; parameters without an explicit
    /// description pick theirs from a `name: text` line in it
    pub fn docs(mut self, docs: impl Into<String>) -> Self {
        self.docs = Some(docs.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn parameters(&self) -> &[ParameterSchema] {
        &self.parameters
    }

    /// Derive the function-calling schema
    pub fn schema(&self) -> ToolSchema {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for param in &self.parameters {
            if param.required {
                required.push(param.name.clone());
            }

            let description = param
                .description
                .clone()
                .or_else(|| {
                    self.docs
                        .as_deref()
                        .and_then(|docs| scrape_description(docs, &param.name))
                })
                .unwrap_or_else(|| format!("Parameter: {}", param.name));

            let mut property = Map::new();
            property.insert("type".into(), Value::from(param.resolved_type().as_str()));
            property.insert("description".into(), Value::String(description));
            if let Some(values) = &param.enum_values {
                property.insert("enum".into(), Value::Array(values.clone()));
            }
            properties.insert(param.name.clone(), Value::Object(property));
        }

        ToolSchema {
            kind: "function".into(),
            function: FunctionSchema {
                name: self.name.clone(),
                description: self.description.clone(),
                parameters: ParametersSchema {
                    kind: "object".into(),
                    properties,
                    required,
                },
            },
        }
    }

    /// Check that every required parameter is present
    pub fn validate(&self, args: &ToolArguments) -> std::result::Result<(), ToolError> {
        for param in &self.parameters {
            if param.required && !args.contains_key(&param.name) {
                return Err(ToolError::invalid_arguments(format!(
                    "Missing required parameter: {}",
                    param.name
                )));
            }
        }
        Ok(())
    }

    /// Invoke the handler with declared defaults filled in.
    ///
    /// Handler errors and panics come back as [`ToolError`]s.
    pub async fn execute(
        &self,
        mut args: ToolArguments,
        ctx: &ToolContext<'_>,
    ) -> std::result::Result<Value, ToolError> {
        self.validate(&args)?;

        for param in &self.parameters {
            if let Some(default) = &param.default {
                args.entry(param.name.clone())
                    .or_insert_with(|| default.clone());
            }
        }

        match AssertUnwindSafe(self.handler.call(&args, ctx))
            .catch_unwind()
            .await
        {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(ToolError::execution(format!("{err:#}"))),
            Err(payload) => Err(ToolError::new(
                crate::error::ToolErrorKind::Panicked,
                panic_message(payload.as_ref()),
            )),
        }
    }
}

/// Best-effort lookup of the first line containing `param:` in a
/// documentation block; `ba:` does not count as `a:`
fn scrape_description(docs: &str, param: &str) -> Option<String> {
    let needle = format!("{param}:");
    docs.lines()
        .find_map(|line| {
            line.match_indices(needle.as_str())
                .find(|(idx, _)| {
                    !line[..*idx]
                        .chars()
                        .next_back()
                        .is_some_and(|c| c.is_alphanumeric() || c == '_')
                })
                .map(|(idx, _)| &line[idx + needle.len()..])
        })
        .map(|rest| rest.trim().to_string())
        .filter(|text| !text.is_empty())
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "handler panicked".into())
}

/// Decode tool arguments sent by a model.
///
/// Accepts an object or a JSON-encoded object string; anything else decodes
/// to no arguments.
pub fn parse_arguments(raw: &Value) -> ToolArguments {
    match raw {
        Value::Object(map) => map.clone().into_iter().collect(),
        Value::Null => ToolArguments::new(),
        Value::String(text) if text.trim().is_empty() => ToolArguments::new(),
        Value::String(text) => serde_json::from_str(text).unwrap_or_else(|e| {
            tracing::warn!(arguments = %text, error = %e, "Failed to parse tool arguments");
            ToolArguments::new()
        }),
        other => {
            tracing::warn!(arguments = %other, "Tool arguments are not an object");
            ToolArguments::new()
        }
    }
}

/// A bundle of related tools registered together
pub trait ToolProvider {
    /// Name recorded in the registry's provider history
    fn name(&self) -> &str;

    /// All tools provided by this bundle
    fn tools(&self) -> Vec<Tool>;
}

/// Registry for available tools
#[derive(Clone, Debug, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Tool>,
    order: Vec<String>,
    providers: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool; a later registration under the same name replaces
    /// the earlier one and keeps its position
    pub fn register_tool(&mut self, tool: Tool) -> Option<Tool> {
        let name = tool.name.clone();
        let previous = self.tools.insert(name.clone(), tool);

        if previous.is_some() {
            tracing::warn!(tool = %name, "Tool already registered. Overwriting.");
        } else {
            self.order.push(name.clone());
        }
        tracing::debug!(tool = %name, "Registered tool");

        previous
    }

    /// Register every tool of a provider
    pub fn register_provider(&mut self, provider: impl ToolProvider) {
        self.providers.push(provider.name().to_string());
        for tool in provider.tools() {
            self.register_tool(tool);
        }
    }

    /// Get a tool by name
    pub fn get_tool(&self, name: &str) -> Option<&Tool> {
        self.tools.get(name)
    }

    /// Schemas in registration order
    pub fn list_tools(&self) -> Vec<ToolSchema> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(Tool::schema)
            .collect()
    }

    /// Tool names in registration order
    pub fn tool_names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    /// Names of the providers absorbed so far
    pub fn providers(&self) -> &[String] {
        &self.providers
    }

    /// Resolve and run a tool call
    pub async fn execute(&self, call: &ToolCallRequest, ctx: &ToolContext<'_>) -> ToolResult {
        let result = match self.get_tool(&call.name) {
            Some(tool) => match tool.execute(call.arguments.clone(), ctx).await {
                Ok(value) => ToolResult::success(&call.name, value),
                Err(err) => ToolResult::failure(&call.name, err),
            },
            None => ToolResult::failure(&call.name, ToolError::not_found(&call.name)),
        };
        result.with_id(&call.id)
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::ToolErrorKind;

    fn add_tool() -> Tool {
        Tool::from_fn("add", "Add two integers", |args| {
            let a = args.get("a").and_then(Value::as_i64).unwrap_or(0);
            let b = args.get("b").and_then(Value::as_i64).unwrap_or(0);
            Ok(json!(a + b))
        })
        .param(ParameterSchema::required("a", ParamType::Integer))
        .param(ParameterSchema::required("b", ParamType::Integer))
    }

    fn args(value: Value) -> ToolArguments {
        parse_arguments(&value)
    }

    #[test]
    fn test_schema_required_and_types() {
        let tool = Tool::from_fn("t", "test", |_| Ok(Value::Null))
            .param(ParameterSchema::required("a", ParamType::Integer))
            .param(ParameterSchema::optional("b", json!("x")));

        let schema = tool.schema();
        let params = &schema.function.parameters;
        assert_eq!(params.required, vec!["a".to_string()]);
        assert_eq!(params.properties["a"]["type"], "integer");
        assert_eq!(params.properties["b"]["type"], "string");
    }

    #[test]
    fn test_type_inferred_from_default() {
        assert_eq!(ParamType::infer(&json!(3)), ParamType::Integer);
        assert_eq!(ParamType::infer(&json!(2.5)), ParamType::Number);
        assert_eq!(ParamType::infer(&json!(true)), ParamType::Boolean);
        assert_eq!(ParamType::infer(&json!([1, 2])), ParamType::Array);
        assert_eq!(ParamType::infer(&json!({"k": 1})), ParamType::String);

        let explicit = ParameterSchema::optional("n", json!(1)).with_type(ParamType::Number);
        assert_eq!(explicit.resolved_type(), ParamType::Number);
    }

    #[test]
    fn test_wire_format() {
        let schema = add_tool().schema();
        let wire = serde_json::to_value(&schema).unwrap();

        assert_eq!(wire["type"], "function");
        assert_eq!(wire["function"]["name"], "add");
        assert_eq!(wire["function"]["parameters"]["type"], "object");
        assert_eq!(wire["function"]["parameters"]["properties"]["a"]["type"], "integer");
        assert_eq!(wire["function"]["parameters"]["required"], json!(["a", "b"]));
        assert!(wire["function"]["parameters"]["properties"]["a"].get("enum").is_none());
    }

    #[test]
    fn test_descriptions_from_docs_or_placeholder() {
        let tool = Tool::from_fn("weather", "Weather", |_| Ok(Value::Null))
            .param(ParameterSchema::required("location", ParamType::String))
            .param(ParameterSchema::optional("unit", json!("celsius")))
            .param(
                ParameterSchema::optional("days", json!(1)).with_description("Forecast length"),
            )
            .docs("Get the weather.\n\nArgs:\n    location: City to look up\n");

        let props = tool.schema().function.parameters.properties;
        assert_eq!(props["location"]["description"], "City to look up");
        assert_eq!(props["unit"]["description"], "Parameter: unit");
        assert_eq!(props["days"]["description"], "Forecast length");
    }

    #[test]
    fn test_descriptions_found_anywhere_in_line() {
        let tool = Tool::from_fn("t", "test", |_| Ok(Value::Null))
            .param(ParameterSchema::required("location", ParamType::String))
            .param(ParameterSchema::required("a", ParamType::Integer))
            .docs("Args:\n  - location: City to look up\n  - ba: not for a\n  * a: First operand");

        let props = tool.schema().function.parameters.properties;
        assert_eq!(props["location"]["description"], "City to look up");
        assert_eq!(props["a"]["description"], "First operand");
    }

    #[test]
    fn test_properties_keep_declaration_order() {
        let tool = Tool::from_fn("t", "test", |_| Ok(Value::Null))
            .param(ParameterSchema::required("zeta", ParamType::String))
            .param(ParameterSchema::required("alpha", ParamType::String))
            .param(ParameterSchema::optional("mid", json!(1)));

        let wire = serde_json::to_string(&tool.schema()).unwrap();
        let zeta = wire.find("\"zeta\":{").unwrap();
        let alpha = wire.find("\"alpha\":{").unwrap();
        let mid = wire.find("\"mid\":{").unwrap();
        assert!(zeta < alpha && alpha < mid);
    }

    #[test]
    fn test_malformed_docs_do_not_fail_schema() {
        let tool = Tool::from_fn("t", "test", |_| Ok(Value::Null))
            .param(ParameterSchema::required("q", ParamType::String))
            .docs("q:\n::: broken");

        let props = tool.schema().function.parameters.properties;
        assert_eq!(props["q"]["description"], "Parameter: q");
    }

    #[tokio::test]
    async fn test_execute_fills_defaults() {
        let tool = Tool::from_fn("greet", "Greet", |args| {
            let name = args.get("name").and_then(Value::as_str).unwrap_or("?");
            Ok(json!(format!("hello {name}")))
        })
        .param(ParameterSchema::optional("name", json!("world")));

        let value = tool
            .execute(ToolArguments::new(), &ToolContext::detached())
            .await
            .unwrap();
        assert_eq!(value, json!("hello world"));
    }

    #[tokio::test]
    async fn test_execute_missing_required() {
        let err = add_tool()
            .execute(args(json!({"a": 1})), &ToolContext::detached())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ToolErrorKind::InvalidArguments);
        assert!(err.message.contains("b"));
    }

    #[tokio::test]
    async fn test_handler_error_and_panic_are_contained() {
        let failing = Tool::from_fn("fail", "Fails", |_| anyhow::bail!("boom"));
        let err = failing
            .execute(ToolArguments::new(), &ToolContext::detached())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ToolErrorKind::Execution);
        assert_eq!(err.message, "boom");

        let panicking = Tool::from_fn("panic", "Panics", |_| panic!("kaboom"));
        let err = panicking
            .execute(ToolArguments::new(), &ToolContext::detached())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ToolErrorKind::Panicked);
        assert_eq!(err.message, "kaboom");
    }

    #[tokio::test]
    async fn test_closure_runs_off_the_async_thread() {
        let tool = Tool::from_fn("slow", "Blocks", |_| {
            std::thread::sleep(std::time::Duration::from_millis(300));
            Ok(json!("finished"))
        });

        let started = std::time::Instant::now();
        let ctx = ToolContext::detached();
        let run = tool.execute(ToolArguments::new(), &ctx);
        let outcome = tokio::time::timeout(std::time::Duration::from_millis(20), run).await;

        assert!(outcome.is_err());
        assert!(started.elapsed() < std::time::Duration::from_millis(250));
    }

    #[test]
    fn test_registry_overwrite_keeps_last() {
        let mut registry = ToolRegistry::new();
        registry.register_tool(Tool::from_fn("echo", "first", |_| Ok(Value::Null)));
        let previous = registry.register_tool(Tool::from_fn("echo", "second", |_| Ok(Value::Null)));

        assert_eq!(previous.unwrap().description(), "first");
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get_tool("echo").unwrap().description(), "second");
        assert!(registry.get_tool("unknown").is_none());
    }

    #[test]
    fn test_list_tools_in_registration_order() {
        let mut registry = ToolRegistry::new();
        for name in ["zeta", "alpha", "mid"] {
            registry.register_tool(Tool::from_fn(name, name, |_| Ok(Value::Null)));
        }
        registry.register_tool(Tool::from_fn("alpha", "again", |_| Ok(Value::Null)));

        let names: Vec<_> = registry
            .list_tools()
            .iter()
            .map(|s| s.name().to_string())
            .collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert_eq!(registry.tool_names(), vec!["zeta", "alpha", "mid"]);
    }

    struct MathTools;

    impl ToolProvider for MathTools {
        fn name(&self) -> &str {
            "math"
        }

        fn tools(&self) -> Vec<Tool> {
            vec![add_tool()]
        }
    }

    #[tokio::test]
    async fn test_provider_registration_and_execute() {
        let mut registry = ToolRegistry::new();
        registry.register_provider(MathTools);
        assert_eq!(registry.providers(), ["math".to_string()]);

        let call = ToolCallRequest::new("add", args(json!({"a": 2, "b": 3}))).with_id("c1");
        let result = registry.execute(&call, &ToolContext::detached()).await;
        assert!(result.is_success());
        assert_eq!(result.call_id.as_deref(), Some("c1"));
        assert_eq!(result.render(), "5");

        let missing = ToolCallRequest::new("nope", ToolArguments::new());
        let result = registry.execute(&missing, &ToolContext::detached()).await;
        assert_eq!(result.error().unwrap().kind, ToolErrorKind::NotFound);
        assert!(result.render().contains("not found"));
    }

    #[test]
    fn test_parse_arguments() {
        assert_eq!(args(json!({"a": 1}))["a"], json!(1));
        assert_eq!(args(json!("{\"a\": 2}"))["a"], json!(2));
        assert!(args(json!("{not json")).is_empty());
        assert!(args(json!([1, 2])).is_empty());
        assert!(args(Value::Null).is_empty());
    }
}
