//! Stanza Catalog - One Method Per Job-File Keyword
//!
//! Each method checks its parent context, then renders its fields in a
//! fixed order. Stanzas that may contain other stanzas take a body closure;
//! the `_with` variants are the body-taking forms of optional containers.
//!
//! `vault_token` is intentionally not supported.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::emitter::Emitter;
use crate::error::{RenderError, RenderResult};
use crate::render::Builder;
use crate::value::{one_of, Value};

pub const DEFAULT_DRIVER: &str = "exec";
pub const JOB_TYPES: &[&str] = &["batch", "service", "system"];
pub const PAYLOAD_MODES: &[&str] = &["optional", "required", "forbidden"];

const EXEC_CONFIG_FIELDS: &[&str] = &["command", "args"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArtifactOptions {
    pub source: Option<String>,
    pub destination: Option<String>,
    pub mode: Option<String>,
    pub options: Option<IndexMap<String, String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AffinityOptions {
    pub attribute: Option<String>,
    pub operator: Option<String>,
    pub value: Option<String>,
    pub weight: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckOptions {
    pub address_mode: Option<String>,
    pub args: Option<Vec<String>>,
    pub command: Option<String>,
    pub grpc_service: Option<String>,
    pub grpc_use_tls: Option<bool>,
    pub initial_status: Option<String>,
    pub interval: Option<String>,
    pub method: Option<String>,
    pub name: Option<String>,
    pub path: Option<String>,
    pub port: Option<String>,
    pub protocol: Option<String>,
    pub timeout: Option<String>,
    #[serde(rename = "type")]
    pub check_type: Option<String>,
    pub tls_skip_verify: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckRestartOptions {
    pub limit: Option<i64>,
    pub grace: Option<String>,
    pub ignore_warnings: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConstraintOptions {
    pub attribute: Option<String>,
    pub operator: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeviceOptions {
    pub count: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchPayloadOptions {
    pub file: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EphemeralDiskOptions {
    pub migrate: Option<bool>,
    pub size: Option<i64>,
    pub sticky: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GroupOptions {
    pub count: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogsOptions {
    pub max_files: Option<i64>,
    pub max_file_size: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MigrateOptions {
    pub max_parallel: Option<i64>,
    pub health_check: Option<String>,
    pub min_healthy_time: Option<String>,
    pub healthy_deadline: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkOptions {
    pub mbits: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParameterizedOptions {
    /// One of `optional` (the default), `required` or `forbidden`.
    pub payload: Option<String>,
    pub meta_optional: Option<Vec<String>>,
    pub meta_required: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PeriodicOptions {
    pub cron: Option<String>,
    pub prohibit_overlap: Option<bool>,
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PortOptions {
    #[serde(rename = "static")]
    pub static_port: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RescheduleOptions {
    pub attempts: Option<i64>,
    pub interval: Option<String>,
    pub delay: Option<String>,
    pub delay_function: Option<String>,
    pub max_delay: Option<String>,
    pub unlimited: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResourcesOptions {
    pub cpu: Option<i64>,
    pub iops: Option<i64>,
    pub memory: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RestartOptions {
    pub attempts: Option<i64>,
    pub delay: Option<String>,
    pub interval: Option<String>,
    pub mode: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceOptions {
    pub address_mode: Option<String>,
    pub canary_tags: Option<Vec<String>>,
    pub name: Option<String>,
    pub port: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpreadOptions {
    pub attribute: Option<String>,
    pub weight: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TargetOptions {
    pub value: Option<String>,
    pub percent: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TaskOptions {
    /// Defaults to `exec`. Selects the schema used by `config`.
    pub driver: Option<String>,
    pub kill_signal: Option<String>,
    pub kill_timeout: Option<String>,
    pub leader: Option<bool>,
    pub shutdown_delay: Option<String>,
    pub user: Option<String>,
}

impl TaskOptions {
    pub fn driver(&self) -> &str {
        self.driver.as_deref().unwrap_or(DEFAULT_DRIVER)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemplateOptions {
    pub change_mode: Option<String>,
    pub change_signal: Option<String>,
    /// Rendered verbatim as a heredoc.
    pub data: Option<String>,
    pub destination: Option<String>,
    pub env: Option<bool>,
    pub left_delimiter: Option<String>,
    pub perms: Option<String>,
    pub right_delimiter: Option<String>,
    pub source: Option<String>,
    pub splay: Option<String>,
    pub vault_grace: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UpdateOptions {
    pub max_parallel: Option<i64>,
    pub health_check: Option<String>,
    pub min_healthy_time: Option<String>,
    pub healthy_deadline: Option<String>,
    pub progress_deadline: Option<String>,
    pub auto_revert: Option<bool>,
    pub canary: Option<i64>,
    pub stagger: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VaultOptions {
    pub change_mode: Option<String>,
    pub change_token: Option<String>,
    pub env: Option<bool>,
    pub policies: Option<Vec<String>>,
}

fn no_children(_: &mut Builder<'_>) -> RenderResult<()> {
    Ok(())
}

impl<'a> Builder<'a> {
    // --- job-level scalars ---

    pub fn all_at_once(&mut self, value: bool) -> RenderResult<()> {
        self.only("all_at_once", &["job"])?;
        self.emitter.bool("all_at_once", Some(value));
        Ok(())
    }

    pub fn datacenters<S: AsRef<str>>(&mut self, datacenters: &[S]) -> RenderResult<()> {
        self.only("datacenters", &["job"])?;
        self.emitter.list_required("datacenters", Some(datacenters))
    }

    /// Nomad Enterprise only.
    pub fn namespace(&mut self, namespace: &str) -> RenderResult<()> {
        self.only("namespace", &["job"])?;
        self.emitter.str_required("namespace", Some(namespace))
    }

    pub fn priority(&mut self, priority: i64) -> RenderResult<()> {
        self.only("priority", &["job"])?;
        self.emitter.int_required("priority", Some(priority))
    }

    pub fn region(&mut self, region: &str) -> RenderResult<()> {
        self.only("region", &["job"])?;
        self.emitter.str_required("region", Some(region))
    }

    /// The job `type`: batch, service or system.
    pub fn job_type(&mut self, job_type: &str) -> RenderResult<()> {
        self.only("type", &["job"])?;
        one_of("type", job_type, JOB_TYPES)?;
        self.emitter.str_required("type", Some(job_type))
    }

    // --- containers ---

    pub fn group<F>(&mut self, name: &str, opts: &GroupOptions, body: F) -> RenderResult<()>
    where
        F: FnOnce(&mut Self) -> RenderResult<()>,
    {
        self.only("group", &["job"])?;
        self.block("group", Some(name), |b| {
            b.emitter.int("count", opts.count);
            body(b)
        })
    }

    pub fn task<F>(&mut self, name: &str, opts: &TaskOptions, body: F) -> RenderResult<()>
    where
        F: FnOnce(&mut Self) -> RenderResult<()>,
    {
        self.only("task", &["group"])?;
        self.block("task", Some(name), |b| {
            let e = &mut b.emitter;
            e.str("driver", Some(opts.driver()));
            e.str("kill_signal", opts.kill_signal.as_deref());
            e.str("kill_timeout", opts.kill_timeout.as_deref());
            e.bool("leader", opts.leader);
            e.str("shutdown_delay", opts.shutdown_delay.as_deref());
            e.str("user", opts.user.as_deref());
            body(b)
        })
    }

    pub fn resources(&mut self, opts: &ResourcesOptions) -> RenderResult<()> {
        self.resources_with(opts, no_children)
    }

    pub fn resources_with<F>(&mut self, opts: &ResourcesOptions, body: F) -> RenderResult<()>
    where
        F: FnOnce(&mut Self) -> RenderResult<()>,
    {
        self.only("resources", &["task"])?;
        self.block("resources", None, |b| {
            b.emitter.int("cpu", opts.cpu);
            b.emitter.int("iops", opts.iops);
            b.emitter.int("memory", opts.memory);
            body(b)
        })
    }

    pub fn network(&mut self, opts: &NetworkOptions) -> RenderResult<()> {
        self.network_with(opts, no_children)
    }

    pub fn network_with<F>(&mut self, opts: &NetworkOptions, body: F) -> RenderResult<()>
    where
        F: FnOnce(&mut Self) -> RenderResult<()>,
    {
        self.only("network", &["resources"])?;
        self.block("network", None, |b| {
            b.emitter.int("mbits", opts.mbits);
            body(b)
        })
    }

    pub fn device(&mut self, name: Option<&str>, opts: &DeviceOptions) -> RenderResult<()> {
        self.device_with(name, opts, no_children)
    }

    pub fn device_with<F>(
        &mut self,
        name: Option<&str>,
        opts: &DeviceOptions,
        body: F,
    ) -> RenderResult<()>
    where
        F: FnOnce(&mut Self) -> RenderResult<()>,
    {
        self.only("device", &["resources"])?;
        self.block("device", name, |b| {
            b.emitter.int("count", opts.count);
            body(b)
        })
    }

    pub fn service(&mut self, opts: &ServiceOptions) -> RenderResult<()> {
        self.service_with(opts, no_children)
    }

    pub fn service_with<F>(&mut self, opts: &ServiceOptions, body: F) -> RenderResult<()>
    where
        F: FnOnce(&mut Self) -> RenderResult<()>,
    {
        self.only("service", &["task"])?;
        self.block("service", None, |b| {
            let e = &mut b.emitter;
            e.str("address_mode", opts.address_mode.as_deref());
            e.list("canary_tags", opts.canary_tags.as_deref());
            e.str("name", opts.name.as_deref());
            e.str("port", opts.port.as_deref());
            e.list("tags", opts.tags.as_deref());
            body(b)
        })
    }

    pub fn check(&mut self, opts: &CheckOptions) -> RenderResult<()> {
        self.check_with(opts, no_children)
    }

    pub fn check_with<F>(&mut self, opts: &CheckOptions, body: F) -> RenderResult<()>
    where
        F: FnOnce(&mut Self) -> RenderResult<()>,
    {
        self.only("check", &["service"])?;
        self.block("check", None, |b| {
            let e = &mut b.emitter;
            e.str("address_mode", opts.address_mode.as_deref());
            e.list("args", opts.args.as_deref());
            e.str("command", opts.command.as_deref());
            e.str("grpc_service", opts.grpc_service.as_deref());
            e.bool("grpc_use_tls", opts.grpc_use_tls);
            e.str("initial_status", opts.initial_status.as_deref());
            e.str("interval", opts.interval.as_deref());
            e.str("method", opts.method.as_deref());
            e.str("name", opts.name.as_deref());
            e.str("path", opts.path.as_deref());
            e.str("port", opts.port.as_deref());
            e.str("protocol", opts.protocol.as_deref());
            e.str("timeout", opts.timeout.as_deref());
            e.str("type", opts.check_type.as_deref());
            e.bool("tls_skip_verify", opts.tls_skip_verify);
            body(b)
        })
    }

    pub fn spread(&mut self, opts: &SpreadOptions) -> RenderResult<()> {
        self.spread_with(opts, no_children)
    }

    pub fn spread_with<F>(&mut self, opts: &SpreadOptions, body: F) -> RenderResult<()>
    where
        F: FnOnce(&mut Self) -> RenderResult<()>,
    {
        self.only("spread", &["job", "group", "task"])?;
        self.block("spread", None, |b| {
            b.emitter.str_required("attribute", opts.attribute.as_deref())?;
            b.emitter.int("weight", opts.weight);
            body(b)
        })
    }

    // --- leaf blocks ---

    pub fn artifact(&mut self, opts: &ArtifactOptions) -> RenderResult<()> {
        self.only("artifact", &["task"])?;
        self.emitter.block("artifact", None, |e| {
            e.str_required("source", opts.source.as_deref())?;
            e.str("destination", opts.destination.as_deref());
            e.str("mode", opts.mode.as_deref());
            e.strmap("options", opts.options.as_ref());
            Ok(())
        })
    }

    pub fn affinity(&mut self, opts: &AffinityOptions) -> RenderResult<()> {
        self.only("affinity", &["job", "group", "task", "device"])?;
        self.emitter.block("affinity", None, |e| {
            e.str_required("attribute", opts.attribute.as_deref())?;
            e.str("operator", opts.operator.as_deref());
            e.str_required("value", opts.value.as_deref())?;
            e.int("weight", opts.weight);
            Ok(())
        })
    }

    pub fn check_restart(&mut self, opts: &CheckRestartOptions) -> RenderResult<()> {
        self.only("check_restart", &["service", "check"])?;
        self.emitter.block("check_restart", None, |e| {
            e.int("limit", opts.limit);
            e.str("grace", opts.grace.as_deref());
            e.bool("ignore_warnings", opts.ignore_warnings);
            Ok(())
        })
    }

    /// Driver configuration.
    ///
    /// The `exec` driver has a fixed schema (`command` required, `args`
    /// optional). Any other driver renders each entry by shape.
    pub fn config(&mut self, driver: &str, values: &IndexMap<String, Value>) -> RenderResult<()> {
        self.only("config", &["task"])?;
        if driver == DEFAULT_DRIVER {
            self.emitter.block("config", None, |e| exec_config(e, values))
        } else {
            self.emitter.block("config", None, |e| {
                values.iter().try_for_each(|(k, v)| e.any(k, Some(v)))
            })
        }
    }

    pub fn constraint(&mut self, opts: &ConstraintOptions) -> RenderResult<()> {
        self.only("constraint", &["job", "group", "task", "device"])?;
        self.emitter.block("constraint", None, |e| {
            e.str("attribute", opts.attribute.as_deref());
            e.str("operator", opts.operator.as_deref());
            e.str("value", opts.value.as_deref());
            Ok(())
        })
    }

    pub fn dispatch_payload(&mut self, opts: &DispatchPayloadOptions) -> RenderResult<()> {
        self.only("dispatch_payload", &["task"])?;
        self.emitter
            .block("dispatch_payload", None, |e| e.str_required("file", opts.file.as_deref()))
    }

    pub fn env(&mut self, vars: &IndexMap<String, String>) -> RenderResult<()> {
        self.only("env", &["task"])?;
        self.emitter.strmap("env", Some(vars));
        Ok(())
    }

    pub fn ephemeral_disk(&mut self, opts: &EphemeralDiskOptions) -> RenderResult<()> {
        self.only("ephemeral_disk", &["group"])?;
        self.emitter.block("ephemeral_disk", None, |e| {
            e.bool("migrate", opts.migrate);
            e.int("size", opts.size);
            e.bool("sticky", opts.sticky);
            Ok(())
        })
    }

    /// `header { <name> = [values] }` inside an HTTP check.
    pub fn header<S: AsRef<str>>(&mut self, name: &str, values: &[S]) -> RenderResult<()> {
        self.only("header", &["check"])?;
        self.emitter
            .block("header", None, |e| e.list_required(name, Some(values)))
    }

    pub fn logs(&mut self, opts: &LogsOptions) -> RenderResult<()> {
        self.only("logs", &["task"])?;
        self.emitter.block("logs", None, |e| {
            e.int("max_files", opts.max_files);
            e.int("max_file_size", opts.max_file_size);
            Ok(())
        })
    }

    pub fn meta(&mut self, values: &IndexMap<String, String>) -> RenderResult<()> {
        self.only("meta", &["job", "group", "task"])?;
        self.emitter.strmap("meta", Some(values));
        Ok(())
    }

    pub fn migrate(&mut self, opts: &MigrateOptions) -> RenderResult<()> {
        self.only("migrate", &["job", "group"])?;
        self.emitter.block("migrate", None, |e| {
            e.int("max_parallel", opts.max_parallel);
            e.str("health_check", opts.health_check.as_deref());
            e.str("min_healthy_time", opts.min_healthy_time.as_deref());
            e.str("healthy_deadline", opts.healthy_deadline.as_deref());
            Ok(())
        })
    }

    pub fn parameterized(&mut self, opts: &ParameterizedOptions) -> RenderResult<()> {
        self.only("parameterized", &["job"])?;
        let payload = opts.payload.as_deref().unwrap_or("optional");
        one_of("payload", payload, PAYLOAD_MODES)?;
        self.emitter.block("parameterized", None, |e| {
            e.str_required("payload", Some(payload))?;
            e.list("meta_optional", opts.meta_optional.as_deref());
            e.list("meta_required", opts.meta_required.as_deref());
            Ok(())
        })
    }

    pub fn periodic(&mut self, opts: &PeriodicOptions) -> RenderResult<()> {
        self.only("periodic", &["job"])?;
        self.emitter.block("periodic", None, |e| {
            e.str("cron", opts.cron.as_deref());
            e.bool("prohibit_overlap", opts.prohibit_overlap);
            e.str("time_zone", opts.time_zone.as_deref());
            Ok(())
        })
    }

    /// A dynamic port renders as the one-line `port "name" {}`.
    pub fn port(&mut self, name: &str, opts: &PortOptions) -> RenderResult<()> {
        self.only("port", &["network"])?;
        match opts.static_port {
            Some(port) => self.emitter.block("port", Some(name), |e| {
                e.int("static", Some(port));
                Ok(())
            }),
            None => {
                self.emitter.empty_block("port", Some(name));
                Ok(())
            }
        }
    }

    pub fn reschedule(&mut self, opts: &RescheduleOptions) -> RenderResult<()> {
        self.only("reschedule", &["job", "group"])?;
        self.emitter.block("reschedule", None, |e| {
            e.int("attempts", opts.attempts);
            e.str("interval", opts.interval.as_deref());
            e.str("delay", opts.delay.as_deref());
            e.str("delay_function", opts.delay_function.as_deref());
            e.str("max_delay", opts.max_delay.as_deref());
            e.bool("unlimited", opts.unlimited);
            Ok(())
        })
    }

    pub fn restart(&mut self, opts: &RestartOptions) -> RenderResult<()> {
        self.only("restart", &["group"])?;
        self.emitter.block("restart", None, |e| {
            e.int("attempts", opts.attempts);
            e.str("delay", opts.delay.as_deref());
            e.str("interval", opts.interval.as_deref());
            e.str("mode", opts.mode.as_deref());
            Ok(())
        })
    }

    pub fn target(&mut self, name: Option<&str>, opts: &TargetOptions) -> RenderResult<()> {
        self.only("target", &["spread"])?;
        self.emitter.block("target", name, |e| {
            e.str("value", opts.value.as_deref());
            e.int("percent", opts.percent);
            Ok(())
        })
    }

    pub fn template(&mut self, opts: &TemplateOptions) -> RenderResult<()> {
        self.only("template", &["task"])?;
        self.emitter.block("template", None, |e| {
            e.str("change_mode", opts.change_mode.as_deref());
            e.str("change_signal", opts.change_signal.as_deref());
            e.str_required("destination", opts.destination.as_deref())?;
            e.blob("data", opts.data.as_deref());
            e.bool("env", opts.env);
            e.str("left_delimiter", opts.left_delimiter.as_deref());
            e.str("perms", opts.perms.as_deref());
            e.str("right_delimiter", opts.right_delimiter.as_deref());
            e.str("source", opts.source.as_deref());
            e.str("splay", opts.splay.as_deref());
            e.str("vault_grace", opts.vault_grace.as_deref());
            Ok(())
        })
    }

    pub fn update(&mut self, opts: &UpdateOptions) -> RenderResult<()> {
        self.only("update", &["job", "group"])?;
        self.emitter.block("update", None, |e| {
            e.int("max_parallel", opts.max_parallel);
            e.str("health_check", opts.health_check.as_deref());
            e.str("min_healthy_time", opts.min_healthy_time.as_deref());
            e.str("healthy_deadline", opts.healthy_deadline.as_deref());
            e.str("progress_deadline", opts.progress_deadline.as_deref());
            e.bool("auto_revert", opts.auto_revert);
            e.int("canary", opts.canary);
            e.str("stagger", opts.stagger.as_deref());
            Ok(())
        })
    }

    pub fn vault(&mut self, opts: &VaultOptions) -> RenderResult<()> {
        self.only("vault", &["job", "group", "task"])?;
        self.emitter.block("vault", None, |e| {
            e.str("change_mode", opts.change_mode.as_deref());
            e.str("change_token", opts.change_token.as_deref());
            e.bool("env", opts.env);
            e.list("policies", opts.policies.as_deref());
            Ok(())
        })
    }

    /// Render the registered artifact `id`.
    pub fn package(&mut self, id: &str) -> RenderResult<()> {
        let artifacts = self.artifacts;
        let artifact = artifacts
            .get(id)
            .ok_or_else(|| RenderError::UnknownArtifact(id.to_string()))?;
        self.artifact(artifact)
    }
}

fn exec_config(e: &mut Emitter, values: &IndexMap<String, Value>) -> RenderResult<()> {
    if let Some(field) = values
        .keys()
        .find(|k| !EXEC_CONFIG_FIELDS.contains(&k.as_str()))
    {
        return Err(RenderError::UnknownField {
            stanza: "config".to_string(),
            field: field.clone(),
        });
    }

    match values.get("command") {
        Some(Value::String(command)) => e.str("command", Some(command)),
        Some(other) => {
            return Err(RenderError::UnsupportedValueType {
                field: "command".to_string(),
                kind: other.kind(),
            })
        }
        None => e.str_required("command", None)?,
    }
    e.list_value("args", values.get("args"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::ArtifactRegistry;
    use crate::render::{render, RenderOptions, Renderer};
    use pretty_assertions::assert_eq;

    fn task_body<F>(body: F) -> RenderResult<String>
    where
        F: FnOnce(&mut Builder<'_>) -> RenderResult<()>,
    {
        render("j", |b| {
            b.group("g", &GroupOptions::default(), |b| {
                b.task("t", &TaskOptions::default(), body)
            })
        })
    }

    #[test]
    fn test_job_scalars() {
        let out = render("web", |b| {
            b.region("global")?;
            b.datacenters(&["dc1", "dc2"])?;
            b.job_type("service")?;
            b.priority(50)?;
            b.all_at_once(false)
        })
        .unwrap();
        assert_eq!(
            out,
            "job \"web\" {\n  region = \"global\"\n  datacenters = [\"dc1\",\"dc2\"]\n  type = \"service\"\n  priority = 50\n  all_at_once = false\n}\n"
        );
    }

    #[test]
    fn test_bad_job_type() {
        let err = render("web", |b| b.job_type("daemon")).unwrap_err();
        match err {
            RenderError::InvalidEnumValue { field, value, allowed } => {
                assert_eq!(field, "type");
                assert_eq!(value, "daemon");
                assert_eq!(allowed.len(), 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_task_in_job_is_structure_error() {
        let err = render("web", |b| b.task("t", &TaskOptions::default(), |_| Ok(()))).unwrap_err();
        assert!(matches!(err, RenderError::Structure { ref stanza, .. } if stanza == "task"));
    }

    #[test]
    fn test_task_defaults_to_exec() {
        let out = task_body(|_| Ok(())).unwrap();
        assert_eq!(
            out,
            "job \"j\" {\n  group \"g\" {\n    task \"t\" {\n      driver = \"exec\"\n    }\n  }\n}\n"
        );
    }

    #[test]
    fn test_exec_config_schema() {
        let mut values = IndexMap::new();
        values.insert("command".to_string(), Value::from("/bin/run"));
        values.insert("args".to_string(), Value::from(vec!["-v", "--port=80"]));
        let out = task_body(|b| b.config(DEFAULT_DRIVER, &values)).unwrap();
        assert!(out.contains(
            "      config {\n        command = \"/bin/run\"\n        args = [\"-v\",\"--port=80\"]\n      }\n"
        ));
    }

    #[test]
    fn test_exec_config_requires_command() {
        let values = IndexMap::new();
        let err = task_body(|b| b.config(DEFAULT_DRIVER, &values)).unwrap_err();
        assert!(matches!(
            err,
            RenderError::MissingRequiredValue { ref stanza, ref field }
                if stanza == "config" && field == "command"
        ));
    }

    #[test]
    fn test_exec_config_rejects_unknown_field() {
        let mut values = IndexMap::new();
        values.insert("command".to_string(), Value::from("x"));
        values.insert("image".to_string(), Value::from("redis"));
        let err = task_body(|b| b.config(DEFAULT_DRIVER, &values)).unwrap_err();
        assert!(matches!(err, RenderError::UnknownField { ref field, .. } if field == "image"));
    }

    #[test]
    fn test_other_driver_config_infers() {
        let mut values = IndexMap::new();
        values.insert("image".to_string(), Value::from("redis:7"));
        values.insert("port_map".to_string(), {
            let mut ports = IndexMap::new();
            ports.insert("db".to_string(), Value::from("6379"));
            Value::Map(ports)
        });
        let out = task_body(|b| b.config("docker", &values)).unwrap();
        assert!(out.contains(
            "      config {\n        image = \"redis:7\"\n\n        port_map {\n          db = 6379\n        }\n      }\n"
        ));
    }

    #[test]
    fn test_network_ports() {
        let out = task_body(|b| {
            b.resources_with(
                &ResourcesOptions {
                    cpu: Some(500),
                    memory: Some(256),
                    ..Default::default()
                },
                |b| {
                    b.network_with(&NetworkOptions { mbits: Some(10) }, |b| {
                        b.port("http", &PortOptions::default())?;
                        b.port("admin", &PortOptions { static_port: Some(9000) })
                    })
                },
            )
        })
        .unwrap();
        let expected = concat!(
            "      resources {\n",
            "        cpu = 500\n",
            "        memory = 256\n",
            "\n",
            "        network {\n",
            "          mbits = 10\n",
            "          port \"http\" {}\n",
            "\n",
            "          port \"admin\" {\n",
            "            static = 9000\n",
            "          }\n",
            "        }\n",
            "      }\n",
        );
        assert!(out.contains(expected), "got:\n{out}");
    }

    #[test]
    fn test_port_outside_network() {
        let err = task_body(|b| b.port("http", &PortOptions::default())).unwrap_err();
        assert!(matches!(err, RenderError::Structure { .. }));
    }

    #[test]
    fn test_service_check_header() {
        let out = task_body(|b| {
            b.service_with(
                &ServiceOptions {
                    name: Some("api".to_string()),
                    tags: Some(vec!["http".to_string()]),
                    ..Default::default()
                },
                |b| {
                    b.check_with(
                        &CheckOptions {
                            check_type: Some("http".to_string()),
                            path: Some("/health".to_string()),
                            ..Default::default()
                        },
                        |b| b.header("Authorization", &["Basic xyz"]),
                    )
                },
            )
        })
        .unwrap();
        assert!(out.contains(concat!(
            "          type = \"http\"\n",
            "\n",
            "          header {\n",
            "            Authorization = [\"Basic xyz\"]\n",
            "          }\n",
        )));
    }

    #[test]
    fn test_parameterized_defaults_payload() {
        let out = render("j", |b| b.parameterized(&ParameterizedOptions::default())).unwrap();
        assert_eq!(
            out,
            "job \"j\" {\n  parameterized {\n    payload = \"optional\"\n  }\n}\n"
        );
        let err = render("j", |b| {
            b.parameterized(&ParameterizedOptions {
                payload: Some("sometimes".to_string()),
                ..Default::default()
            })
        })
        .unwrap_err();
        assert!(matches!(err, RenderError::InvalidEnumValue { .. }));
    }

    #[test]
    fn test_spread_targets() {
        let out = render("j", |b| {
            b.spread_with(
                &SpreadOptions {
                    attribute: Some("${node.datacenter}".to_string()),
                    weight: Some(100),
                },
                |b| {
                    b.target(
                        Some("us-east1"),
                        &TargetOptions {
                            percent: Some(60),
                            ..Default::default()
                        },
                    )
                },
            )
        })
        .unwrap();
        assert_eq!(
            out,
            "job \"j\" {\n  spread {\n    attribute = \"${node.datacenter}\"\n    weight = 100\n\n    target \"us-east1\" {\n      percent = 60\n    }\n  }\n}\n"
        );
    }

    #[test]
    fn test_package_uses_registry() {
        let mut registry = ArtifactRegistry::new();
        registry.register(
            "tool",
            ArtifactOptions {
                source: Some("https://example.com/tool.tgz".to_string()),
                ..Default::default()
            },
        );
        let renderer = Renderer::new(registry, RenderOptions::default());
        let out = renderer
            .render("j", |b| {
                b.group("g", &GroupOptions::default(), |b| {
                    b.task("t", &TaskOptions::default(), |b| b.package("tool"))
                })
            })
            .unwrap();
        assert!(
            out.contains("artifact {\n        source = \"https://example.com/tool.tgz\"\n      }")
        );

        let err = renderer
            .render("j", |b| {
                b.group("g", &GroupOptions::default(), |b| {
                    b.task("t", &TaskOptions::default(), |b| b.package("missing"))
                })
            })
            .unwrap_err();
        assert!(matches!(err, RenderError::UnknownArtifact(ref id) if id == "missing"));
    }

    #[test]
    fn test_template_required_destination() {
        let err = task_body(|b| b.template(&TemplateOptions::default())).unwrap_err();
        assert!(matches!(
            err,
            RenderError::MissingRequiredValue { ref field, .. } if field == "destination"
        ));
    }
}
