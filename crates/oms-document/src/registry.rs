//! Template registry: lookup of published templates by name

use crate::{DocumentError, DocumentResult, DocumentTemplate, TemplateType};

/// Holds the authored template set.
///
/// Templates are authored out-of-band (migrations, admin tooling) and are
/// long-lived; the registry only enforces `(name, version)` uniqueness and
/// hides anything that is not published.
#[derive(Clone, Debug, Default)]
pub struct TemplateRegistry {
    templates: Vec<DocumentTemplate>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template. Fails if `(name, version)` is already taken.
    pub fn insert(&mut self, template: DocumentTemplate) -> DocumentResult<()> {
        if self
            .templates
            .iter()
            .any(|t| t.name == template.name && t.version == template.version)
        {
            return Err(DocumentError::DuplicateTemplate {
                name: template.name,
                version: template.version,
            });
        }
        self.templates.push(template);
        Ok(())
    }

    /// Look up a published template by name.
    ///
    /// Draft and archived templates are treated as absent. If several
    /// versions of the same name are published, the highest version wins.
    pub fn lookup(&self, name: &str) -> DocumentResult<&DocumentTemplate> {
        self.templates
            .iter()
            .filter(|t| t.name == name && t.is_published())
            .max_by(|a, b| a.version.cmp(&b.version))
            .ok_or_else(|| DocumentError::TemplateNotFound(name.to_string()))
    }

    /// All published templates of a given type.
    pub fn published_of_type(&self, template_type: TemplateType) -> Vec<&DocumentTemplate> {
        self.templates
            .iter()
            .filter(|t| t.template_type == template_type && t.is_published())
            .collect()
    }

    /// Flip a draft template to published.
    pub fn publish(&mut self, name: &str, version: &str) -> DocumentResult<()> {
        let template = self
            .templates
            .iter_mut()
            .find(|t| t.name == name && t.version == version)
            .ok_or_else(|| DocumentError::TemplateNotFound(name.to_string()))?;
        *template = template.clone().published();
        template.timestamps.touch();
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_drafts() {
        let mut registry = TemplateRegistry::new();
        registry
            .insert(DocumentTemplate::new(
                "Intake Form",
                TemplateType::Intake,
                "body",
            ))
            .unwrap();

        assert!(matches!(
            registry.lookup("Intake Form"),
            Err(DocumentError::TemplateNotFound(_))
        ));

        registry.publish("Intake Form", "1.0").unwrap();
        assert!(registry.lookup("Intake Form").is_ok());
    }

    #[test]
    fn lookup_prefers_highest_published_version() {
        let mut registry = TemplateRegistry::new();
        registry
            .insert(
                DocumentTemplate::new("Intake Form", TemplateType::Intake, "v1")
                    .with_version("1.0")
                    .published(),
            )
            .unwrap();
        registry
            .insert(
                DocumentTemplate::new("Intake Form", TemplateType::Intake, "v2")
                    .with_version("2.0")
                    .published(),
            )
            .unwrap();

        assert_eq!(registry.lookup("Intake Form").unwrap().version, "2.0");
    }

    #[test]
    fn duplicate_name_version_is_rejected() {
        let mut registry = TemplateRegistry::new();
        let t = DocumentTemplate::new("Intake Form", TemplateType::Intake, "body");
        registry.insert(t.clone()).unwrap();
        assert!(matches!(
            registry.insert(t),
            Err(DocumentError::DuplicateTemplate { .. })
        ));
    }
}
