//! Job Descriptions - Stanza Trees as Data
//!
//! A JSON form of the builder calls, so jobs can be rendered without
//! writing Rust:
//!
//! ```json
//! { "job": "web", "stanzas": [
//!     { "stanza": "datacenters", "value": ["dc1"] },
//!     { "stanza": "group", "name": "api", "count": 2, "children": [
//!         { "stanza": "task", "name": "server", "children": [
//!             { "stanza": "config", "values": { "command": "/bin/server" } }
//!         ] }
//!     ] }
//! ] }
//! ```
//!
//! Stanza fields sit directly on the node. Scalar stanzas take `value`,
//! map stanzas (`env`, `meta`, `config`) take `values`.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{RenderError, RenderResult};
use crate::render::Builder;
use crate::stanzas::{TaskOptions, DEFAULT_DRIVER};
use crate::value::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobDescription {
    pub job: String,
    #[serde(default)]
    pub stanzas: Vec<StanzaNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StanzaNode {
    pub stanza: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<IndexMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<StanzaNode>,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl JobDescription {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Replay the description's stanzas into the job block.
    pub fn apply(&self, b: &mut Builder<'_>) -> RenderResult<()> {
        apply_all(b, &self.stanzas, DEFAULT_DRIVER)
    }
}

fn apply_all(b: &mut Builder<'_>, nodes: &[StanzaNode], driver: &str) -> RenderResult<()> {
    nodes.iter().try_for_each(|node| node.apply(b, driver))
}

impl StanzaNode {
    fn unknown_field(&self, field: &str) -> RenderError {
        RenderError::UnknownField {
            stanza: self.stanza.clone(),
            field: field.to_string(),
        }
    }

    fn reject_children(&self) -> RenderResult<()> {
        if self.children.is_empty() {
            Ok(())
        } else {
            Err(self.unknown_field("children"))
        }
    }

    fn reject_fields(&self) -> RenderResult<()> {
        match self.fields.keys().next() {
            Some(field) => Err(self.unknown_field(field)),
            None => Ok(()),
        }
    }

    fn options<T: DeserializeOwned>(&self) -> RenderResult<T> {
        serde_json::from_value(serde_json::Value::Object(self.fields.clone())).map_err(|source| {
            RenderError::InvalidOptions {
                stanza: self.stanza.clone(),
                source,
            }
        })
    }

    fn leaf<T: DeserializeOwned>(&self) -> RenderResult<T> {
        self.reject_children()?;
        self.options()
    }

    fn scalar(&self) -> RenderResult<&Value> {
        self.reject_children()?;
        self.reject_fields()?;
        self.value
            .as_ref()
            .ok_or_else(|| RenderError::MissingRequiredValue {
                stanza: self.stanza.clone(),
                field: "value".to_string(),
            })
    }

    fn string(&self) -> RenderResult<&str> {
        let value = self.scalar()?;
        value.as_str().ok_or_else(|| self.unsupported(value))
    }

    fn strings(&self) -> RenderResult<Vec<String>> {
        self.scalar()?.to_string_list(&self.stanza)
    }

    fn entries(&self) -> RenderResult<IndexMap<String, Value>> {
        self.reject_children()?;
        self.reject_fields()?;
        Ok(self.values.clone().unwrap_or_default())
    }

    fn string_entries(&self) -> RenderResult<IndexMap<String, String>> {
        self.entries()?
            .into_iter()
            .map(|(k, v)| -> RenderResult<(String, String)> {
                let s = v.scalar_string(&k)?;
                Ok((k, s))
            })
            .collect()
    }

    fn required_name(&self) -> RenderResult<&str> {
        self.name
            .as_deref()
            .ok_or_else(|| RenderError::MissingRequiredValue {
                stanza: self.stanza.clone(),
                field: "name".to_string(),
            })
    }

    fn unsupported(&self, value: &Value) -> RenderError {
        RenderError::UnsupportedValueType {
            field: self.stanza.clone(),
            kind: value.kind(),
        }
    }

    fn apply(&self, b: &mut Builder<'_>, driver: &str) -> RenderResult<()> {
        let children = |b: &mut Builder<'_>| apply_all(b, &self.children, driver);

        match self.stanza.as_str() {
            "all_at_once" => match self.scalar()? {
                Value::Boolean(v) => b.all_at_once(*v),
                other => Err(self.unsupported(other)),
            },
            "datacenters" => b.datacenters(&self.strings()?),
            "namespace" => b.namespace(self.string()?),
            "priority" => match self.scalar()? {
                Value::Integer(v) => b.priority(*v),
                other => Err(self.unsupported(other)),
            },
            "region" => b.region(self.string()?),
            "type" => b.job_type(self.string()?),

            "job" => b.job(self.required_name()?, children),
            "group" => b.group(self.required_name()?, &self.options()?, children),
            "task" => {
                let opts: TaskOptions = self.options()?;
                let task_driver = opts.driver();
                b.task(self.required_name()?, &opts, |b| {
                    apply_all(b, &self.children, task_driver)
                })
            }
            "resources" => b.resources_with(&self.options()?, children),
            "network" => b.network_with(&self.options()?, children),
            "device" => b.device_with(self.name.as_deref(), &self.options()?, children),
            "service" => b.service_with(&self.options()?, children),
            "check" => b.check_with(&self.options()?, children),
            "spread" => b.spread_with(&self.options()?, children),

            "artifact" => b.artifact(&self.leaf()?),
            "affinity" => b.affinity(&self.leaf()?),
            "check_restart" => b.check_restart(&self.leaf()?),
            "config" => b.config(driver, &self.entries()?),
            "constraint" => b.constraint(&self.leaf()?),
            "dispatch_payload" => b.dispatch_payload(&self.leaf()?),
            "env" => b.env(&self.string_entries()?),
            "ephemeral_disk" => b.ephemeral_disk(&self.leaf()?),
            "header" => b.header(self.required_name()?, &self.strings()?),
            "logs" => b.logs(&self.leaf()?),
            "meta" => b.meta(&self.string_entries()?),
            "migrate" => b.migrate(&self.leaf()?),
            "parameterized" => b.parameterized(&self.leaf()?),
            "periodic" => b.periodic(&self.leaf()?),
            "port" => b.port(self.required_name()?, &self.leaf()?),
            "reschedule" => b.reschedule(&self.leaf()?),
            "restart" => b.restart(&self.leaf()?),
            "target" => b.target(self.name.as_deref(), &self.leaf()?),
            "template" => b.template(&self.leaf()?),
            "update" => b.update(&self.leaf()?),
            "vault" => b.vault(&self.leaf()?),

            "package" => b.package(self.string()?),
            "vault_aws_creds" => b.vault_aws_creds(self.required_name()?, &self.strings()?),
            "preloaded_vault_aws_creds" => {
                b.preloaded_vault_aws_creds(self.required_name()?, &self.strings()?)
            }
            "vault_consul_creds" => b.vault_consul_creds(self.required_name()?, &self.strings()?),
            "preloaded_vault_consul_creds" => {
                b.preloaded_vault_consul_creds(self.required_name()?, &self.strings()?)
            }

            other => Err(RenderError::UnknownStanza(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Renderer;
    use pretty_assertions::assert_eq;

    fn render_json(json: &str) -> RenderResult<String> {
        let description = JobDescription::from_json(json).unwrap();
        Renderer::default().render_description(&description)
    }

    #[test]
    fn test_minimal_job() {
        let out = render_json(
            r#"{"job": "web", "stanzas": [
                {"stanza": "datacenters", "value": ["dc1"]},
                {"stanza": "group", "name": "api", "count": 2, "children": [
                    {"stanza": "task", "name": "server", "children": [
                        {"stanza": "config", "values": {"command": "/bin/server", "args": ["-p", "80"]}},
                        {"stanza": "env", "values": {"PORT": 80, "MODE": "prod"}}
                    ]}
                ]}
            ]}"#,
        )
        .unwrap();
        let expected = concat!(
            "job \"web\" {\n",
            "  datacenters = [\"dc1\"]\n",
            "\n",
            "  group \"api\" {\n",
            "    count = 2\n",
            "\n",
            "    task \"server\" {\n",
            "      driver = \"exec\"\n",
            "\n",
            "      config {\n",
            "        command = \"/bin/server\"\n",
            "        args = [\"-p\",\"80\"]\n",
            "      }\n",
            "\n",
            "      env {\n",
            "        PORT = \"80\"\n",
            "        MODE = \"prod\"\n",
            "      }\n",
            "    }\n",
            "  }\n",
            "}\n",
        );
        assert_eq!(out, expected);
    }

    #[test]
    fn test_task_driver_threads_into_config() {
        let out = render_json(
            r#"{"job": "cache", "stanzas": [
                {"stanza": "group", "name": "g", "children": [
                    {"stanza": "task", "name": "redis", "driver": "docker", "children": [
                        {"stanza": "config", "values": {"image": "redis:7", "port": "6379"}}
                    ]}
                ]}
            ]}"#,
        )
        .unwrap();
        assert!(out.contains("        image = \"redis:7\"\n        port = 6379\n"));
    }

    #[test]
    fn test_unknown_stanza() {
        let err = render_json(
            r#"{"job": "x", "stanzas": [{"stanza": "vault_token", "value": "s3cr3t"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, RenderError::UnknownStanza(ref s) if s == "vault_token"));
    }

    #[test]
    fn test_bad_options_are_reported() {
        let err = render_json(
            r#"{"job": "x", "stanzas": [{"stanza": "periodic", "cron": "@daily", "cronn": "typo"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            RenderError::InvalidOptions { ref stanza, .. } if stanza == "periodic"
        ));
    }

    #[test]
    fn test_scalar_stanza_rejects_fields() {
        let err = render_json(
            r#"{"job": "x", "stanzas": [{"stanza": "region", "value": "eu", "zone": "a"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, RenderError::UnknownField { ref field, .. } if field == "zone"));
    }

    #[test]
    fn test_leaf_stanza_rejects_children() {
        let err = render_json(
            r#"{"job": "x", "stanzas": [{"stanza": "periodic", "children": [{"stanza": "region", "value": "eu"}]}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, RenderError::UnknownField { ref field, .. } if field == "children"));
    }

    #[test]
    fn test_priority_must_be_integer() {
        let err = render_json(
            r#"{"job": "x", "stanzas": [{"stanza": "priority", "value": "high"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, RenderError::UnsupportedValueType { kind: "string", .. }));
    }

    #[test]
    fn test_nested_job_is_structure_error() {
        let err = render_json(r#"{"job": "x", "stanzas": [{"stanza": "job", "name": "inner"}]}"#)
            .unwrap_err();
        match err {
            RenderError::Structure { stanza, allowed } => {
                assert_eq!(stanza, "job");
                assert_eq!(allowed, vec!["root".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_structure_errors_surface() {
        let err = render_json(
            r#"{"job": "x", "stanzas": [{"stanza": "task", "name": "t"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, RenderError::Structure { ref stanza, .. } if stanza == "task"));
    }
}
