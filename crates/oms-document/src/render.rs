//! Rendering seam: context assembly and the renderer trait
//!
//! The real PDF engine lives outside this core. The engine hands it a
//! template body and a context map and gets bytes back; everything else
//! (fonts, page layout, the binary format) is the renderer's business.

use crate::RenderError;
use chrono::{DateTime, Utc};
use oms_types::{Actor, Project};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Fixed system-identity block stamped into every render context.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemIdentity {
    pub name: String,
    pub version: String,
    pub company: String,
}

impl Default for SystemIdentity {
    fn default() -> Self {
        Self {
            name: "Sumano Operations Management System".to_string(),
            version: "1.0.0".to_string(),
            company: "Sumano Tech".to_string(),
        }
    }
}

/// Everything a renderer gets to work with for one document.
#[derive(Clone, Debug)]
pub struct RenderContext {
    /// The raw generation data, verbatim.
    pub data: Map<String, Value>,
    pub generated_at: DateTime<Utc>,
    /// Username of the acting user, or `"system"`.
    pub generated_by: String,
    pub project_name: Option<String>,
    pub system: SystemIdentity,
    /// Additional signature context, when the caller supplies one.
    pub signature: Option<Map<String, Value>>,
}

impl RenderContext {
    pub fn new(
        data: Map<String, Value>,
        actor: Option<&Actor>,
        project: Option<&Project>,
        system: SystemIdentity,
    ) -> Self {
        Self {
            data,
            generated_at: Utc::now(),
            generated_by: actor.map_or_else(|| "system".to_string(), |a| a.username.clone()),
            project_name: project.map(|p| p.project_name.clone()),
            system,
            signature: None,
        }
    }

    pub fn with_signature(mut self, signature: Map<String, Value>) -> Self {
        self.signature = Some(signature);
        self
    }

    /// Flatten to string-keyed lookups for placeholder substitution.
    ///
    /// Data keys come through as-is; scalars are stringified, structured
    /// values serialized as JSON. Well-known keys (`generated_at`,
    /// `generated_by`, `project`, `system.*`, `signature.*`) are added on
    /// top and win over data keys of the same name.
    pub fn flatten(&self) -> BTreeMap<String, String> {
        let mut flat = BTreeMap::new();
        for (key, value) in &self.data {
            flat.insert(key.clone(), scalar_string(value));
        }
        if let Some(signature) = &self.signature {
            for (key, value) in signature {
                flat.insert(format!("signature.{key}"), scalar_string(value));
            }
        }
        flat.insert(
            "generated_at".to_string(),
            self.generated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        );
        flat.insert("generated_by".to_string(), self.generated_by.clone());
        if let Some(project) = &self.project_name {
            flat.insert("project".to_string(), project.clone());
        }
        flat.insert("system.name".to_string(), self.system.name.clone());
        flat.insert("system.version".to_string(), self.system.version.clone());
        flat.insert("system.company".to_string(), self.system.company.clone());
        flat
    }
}

fn scalar_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// The external rendering engine, seen from this core.
pub trait Renderer: Send + Sync {
    /// Render `body` with `context` into document bytes.
    fn render(&self, body: &str, context: &RenderContext) -> Result<Vec<u8>, RenderError>;
}

/// Plain-text placeholder renderer.
///
/// Substitutes `{{ key }}` occurrences from the flattened context; unknown
/// keys render as empty strings, matching the external engine's behavior.
/// Useful for tests and local runs where no PDF engine is wired up.
#[derive(Clone, Debug, Default)]
pub struct TextRenderer;

impl Renderer for TextRenderer {
    fn render(&self, body: &str, context: &RenderContext) -> Result<Vec<u8>, RenderError> {
        let flat = context.flatten();
        let mut out = String::with_capacity(body.len());
        let mut rest = body;
        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find("}}") {
                Some(end) => {
                    let key = after[..end].trim();
                    if let Some(value) = flat.get(key) {
                        out.push_str(value);
                    }
                    rest = &after[end + 2..];
                }
                None => {
                    return Err(RenderError::new(format!(
                        "unclosed placeholder at offset {start}"
                    )));
                }
            }
        }
        out.push_str(rest);
        Ok(out.into_bytes())
    }
}
