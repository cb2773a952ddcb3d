//! Tool descriptors: named, schema-validated, executable capabilities.
//!
//! Plugins build descriptors with [`define_tool`]; adapters convert them
//! into framework-native shapes and route invocations back through
//! [`ToolDescriptor::execute`], which always validates first.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;
use tracing::warn;

use crate::error::{ExecutionError, InvocationError};
use crate::schema::Schema;

/// Boxed async handler, bound to its wallet client at construction time.
pub type ToolMethod =
    Arc<dyn Fn(Value) -> BoxFuture<'static, Result<Value, ExecutionError>> + Send + Sync>;

/// A single capability exposed to an agent framework.
#[derive(Clone)]
pub struct ToolDescriptor {
    name: String,
    description: String,
    parameters: Schema,
    method: ToolMethod,
}

impl fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl ToolDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn parameters(&self) -> &Schema {
        &self.parameters
    }

    /// Validate `args` against the parameter schema, then run the bound
    /// method with the validated, defaulted arguments.
    ///
    /// The method is never invoked when validation fails, even if the
    /// calling framework claims to have validated already — some frameworks
    /// skip or weaken validation (notably those deferring execution to a
    /// client process).
    pub async fn execute(&self, args: Value) -> Result<Value, InvocationError> {
        let validated = self.parameters.validate(&args)?;
        let result = (self.method)(validated).await?;
        Ok(result)
    }
}

/// Build a tool descriptor from a name, description, parameter schema, and
/// async handler.
///
/// The handler receives arguments that already passed validation with
/// defaults applied. Names should be safe identifiers (see
/// [`is_safe_tool_name`]); unsafe names are kept but logged, since consuming
/// frameworks expose the name as a callable identifier.
pub fn define_tool<F, Fut>(
    name: &str,
    description: &str,
    parameters: Schema,
    handler: F,
) -> ToolDescriptor
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, ExecutionError>> + Send + 'static,
{
    if !is_safe_tool_name(name) {
        warn!(tool = name, "tool name contains unsafe characters");
    }
    ToolDescriptor {
        name: name.to_string(),
        description: description.to_string(),
        parameters,
        method: Arc::new(move |args| Box::pin(handler(args))),
    }
}

/// Whether `name` is safe to expose as a callable identifier
/// (ASCII alphanumerics, underscores, and hyphens only).
pub fn is_safe_tool_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Rewrite an arbitrary string (e.g. a remotely discovered endpoint name)
/// into a safe tool identifier.
pub fn sanitize_tool_name(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if sanitized.is_empty() {
        "tool".to_string()
    } else {
        sanitized
    }
}
