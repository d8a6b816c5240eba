//! Deployment request documents.
//!
//! A request bundles the target cluster and service with the task definition
//! document, in the shape the deployment API client consumes after key
//! normalization.

use crate::value::{Key, Mapping, NestedValue};

/// Target of a deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployRequest {
    /// Cluster name.
    pub cluster: String,
    /// Service name.
    pub service: String,
    /// Task definition family, if it should be set explicitly.
    pub family: Option<String>,
}

impl DeployRequest {
    /// Creates a request for a cluster and service.
    #[must_use]
    pub fn new(cluster: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            cluster: cluster.into(),
            service: service.into(),
            family: None,
        }
    }

    /// Sets the task definition family.
    #[must_use]
    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.family = Some(family.into());
        self
    }

    /// Builds the request document around `task_definition`.
    ///
    /// When a family is set it is written into the task definition too,
    /// provided the task definition is a mapping.
    #[must_use]
    pub fn build(&self, mut task_definition: NestedValue) -> NestedValue {
        let mut request = Mapping::with_capacity(4);
        request.insert(Key::string("cluster"), NestedValue::from(self.cluster.as_str()));
        request.insert(Key::string("service"), NestedValue::from(self.service.as_str()));

        if let Some(family) = &self.family {
            if let Some(mapping) = task_definition.as_mapping_mut() {
                let key = mapping
                    .key_named("family")
                    .cloned()
                    .unwrap_or_else(|| Key::string("family"));
                mapping.insert(key, NestedValue::from(family.as_str()));
            }
            request.insert(Key::string("family"), NestedValue::from(family.as_str()));
        }

        request.insert(Key::string("task_definition"), task_definition);
        NestedValue::Mapping(request)
    }
}
