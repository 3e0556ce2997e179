//! Secret Templates - Vault Credential Snippets
//!
//! Template bodies that read credentials from Vault into an env file under
//! `secrets/`. The exported forms prefix each assignment with `export ` so
//! the file can be sourced; the preloaded forms set `env = true` instead.

use crate::error::RenderResult;
use crate::render::Builder;
use crate::stanzas::TemplateOptions;
use crate::value::json_string;

fn secret_args<S: AsRef<str>>(paths: &[S]) -> String {
    paths
        .iter()
        .map(|p| json_string(p.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn prefix(export: bool) -> &'static str {
    if export {
        "export "
    } else {
        ""
    }
}

/// AWS access key, secret key and (when present) session token.
pub fn aws_credentials<S: AsRef<str>>(paths: &[S], export: bool) -> String {
    let p = prefix(export);
    format!(
        "{{{{with secret {args}}}}}\n\
         {p}AWS_ACCESS_KEY_ID={{{{.Data.access_key}}}}\n\
         {p}AWS_SECRET_ACCESS_KEY={{{{.Data.secret_key}}}}\n\
         {{{{if .Data.security_token}}}}\n\
         {p}AWS_SESSION_TOKEN={{{{.Data.security_token}}}}\n\
         {{{{end}}}}\n\
         {{{{end}}}}\n",
        args = secret_args(paths),
    )
}

/// Consul ACL token.
pub fn consul_credentials<S: AsRef<str>>(paths: &[S], export: bool) -> String {
    let p = prefix(export);
    format!(
        "{{{{with secret {args}}}}}\n\
         {p}CONSUL_HTTP_TOKEN={{{{.Data.token}}}}\n\
         {{{{end}}}}\n",
        args = secret_args(paths),
    )
}

fn secrets_template(name: &str, data: String, preloaded: bool) -> TemplateOptions {
    TemplateOptions {
        data: Some(data),
        destination: Some(format!("secrets/{}.env", name)),
        env: preloaded.then_some(true),
        ..Default::default()
    }
}

impl<'a> Builder<'a> {
    pub fn vault_aws_creds<S: AsRef<str>>(
        &mut self,
        name: &str,
        paths: &[S],
    ) -> RenderResult<()> {
        self.template(&secrets_template(name, aws_credentials(paths, true), false))
    }

    pub fn preloaded_vault_aws_creds<S: AsRef<str>>(
        &mut self,
        name: &str,
        paths: &[S],
    ) -> RenderResult<()> {
        self.template(&secrets_template(name, aws_credentials(paths, false), true))
    }

    pub fn vault_consul_creds<S: AsRef<str>>(
        &mut self,
        name: &str,
        paths: &[S],
    ) -> RenderResult<()> {
        self.template(&secrets_template(name, consul_credentials(paths, true), false))
    }

    pub fn preloaded_vault_consul_creds<S: AsRef<str>>(
        &mut self,
        name: &str,
        paths: &[S],
    ) -> RenderResult<()> {
        self.template(&secrets_template(name, consul_credentials(paths, false), true))
    }
}
