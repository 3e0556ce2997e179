//! Document Render Pass - Single Entry Point
//!
//! Every render gets a fresh `Builder`. Nothing survives between documents,
//! and a failed render never hands back its partial text.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::artifacts::ArtifactRegistry;
use crate::context::ROOT;
use crate::description::JobDescription;
use crate::emitter::Emitter;
use crate::error::RenderResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Also write each finished document to stderr.
    #[serde(default)]
    pub echo: bool,
}

/// Handle passed to every stanza body.
///
/// Stanza methods live in [`crate::stanzas`]; each checks its parent
/// context before emitting anything.
pub struct Builder<'a> {
    pub(crate) emitter: Emitter,
    pub(crate) artifacts: &'a ArtifactRegistry,
}

impl<'a> Builder<'a> {
    pub fn new(artifacts: &'a ArtifactRegistry) -> Self {
        Self {
            emitter: Emitter::new(),
            artifacts,
        }
    }

    /// Direct access to the emitter for fields the catalog does not cover.
    pub fn emitter(&mut self) -> &mut Emitter {
        &mut self.emitter
    }

    pub(crate) fn only(&self, stanza: &str, allowed: &[&str]) -> RenderResult<()> {
        self.emitter.context().assert_context(stanza, allowed)
    }

    pub(crate) fn block<F>(
        &mut self,
        keyword: &str,
        name: Option<&str>,
        body: F,
    ) -> RenderResult<()>
    where
        F: FnOnce(&mut Self) -> RenderResult<()>,
    {
        self.emitter.open_block(keyword, name);
        let result = body(self);
        self.emitter.close_block(keyword);
        result
    }

    /// The outermost `job` block. Only legal at document scope.
    pub fn job<F>(&mut self, name: &str, body: F) -> RenderResult<()>
    where
        F: FnOnce(&mut Self) -> RenderResult<()>,
    {
        self.only("job", &[ROOT])?;
        self.block("job", Some(name), body)
    }

    pub fn finish(self) -> String {
        self.emitter.finish()
    }
}

/// Renders documents against a fixed artifact registry and options.
pub struct Renderer {
    artifacts: ArtifactRegistry,
    options: RenderOptions,
}

impl Renderer {
    pub fn new(artifacts: ArtifactRegistry, options: RenderOptions) -> Self {
        Self { artifacts, options }
    }

    pub fn artifacts(&self) -> &ArtifactRegistry {
        &self.artifacts
    }

    /// Render `job "<name>" { ... }` with `body` filling the job block.
    pub fn render<F>(&self, name: &str, body: F) -> RenderResult<String>
    where
        F: FnOnce(&mut Builder<'_>) -> RenderResult<()>,
    {
        debug!(job = name, "rendering job");
        let mut builder = Builder::new(&self.artifacts);
        builder.job(name, body)?;
        let document = builder.finish();

        if self.options.echo {
            eprint!("{}", document);
        }
        debug!(job = name, bytes = document.len(), "rendered job");
        Ok(document)
    }

    /// Render a job described as data.
    pub fn render_description(&self, description: &JobDescription) -> RenderResult<String> {
        self.render(&description.job, |b| description.apply(b))
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(ArtifactRegistry::default(), RenderOptions::default())
    }
}

/// Render with an empty artifact registry and default options.
pub fn render<F>(name: &str, body: F) -> RenderResult<String>
where
    F: FnOnce(&mut Builder<'_>) -> RenderResult<()>,
{
    Renderer::default().render(name, body)
}
