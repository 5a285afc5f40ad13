use tokio::sync::oneshot;

use crate::{
    config::EngineEntry,
    core::{
        domain::{CompileResult, Locator, SourceFile},
        errors::CompileError,
        traits::{
            adapter::{EngineSet, LanguageAdapter},
            engine::{CallbackOptions, CallbackOutcome},
        },
    },
};

/// SCSS and indented Sass share one engine; only the syntax flag differs.
#[derive(Debug, Clone)]
pub struct SassAdapter {
    tag: &'static str,
    engine: EngineEntry,
    options: CallbackOptions,
}

impl SassAdapter {
    pub fn scss(engine: EngineEntry) -> Self {
        Self {
            tag: "scss",
            engine,
            options: CallbackOptions::default(),
        }
    }

    pub fn sass(engine: EngineEntry) -> Self {
        Self {
            tag: "sass",
            engine,
            options: CallbackOptions {
                indented_syntax: true,
            },
        }
    }
}

#[async_trait::async_trait]
impl LanguageAdapter for SassAdapter {
    fn tag(&self) -> &str {
        self.tag
    }

    fn locators(&self) -> Vec<Locator> {
        vec![self.engine.locator.clone()]
    }

    #[tracing::instrument(skip(self, engines), fields(tag = self.tag))]
    async fn compile(
        &self,
        engines: &EngineSet,
        file: &SourceFile,
    ) -> Result<CompileResult, CompileError> {
        let sass = engines.callback(&self.engine.locator, &self.engine.export)?;

        let (done_tx, done_rx) = oneshot::channel();
        sass.compile(
            &file.content,
            &self.options,
            Box::new(move |outcome| {
                let _ = done_tx.send(outcome);
            }),
        );

        let outcome = done_rx
            .await
            .map_err(|_| CompileError::CompilationFailed {
                msg: format!(
                    "Compiler from {} finished without reporting a result",
                    self.engine.locator
                ),
            })?;
        into_result(outcome)
    }
}

/// A non-zero status or a non-empty message is a failure.
fn into_result(outcome: CallbackOutcome) -> Result<CompileResult, CompileError> {
    match (outcome.status, outcome.message.filter(|msg| !msg.is_empty())) {
        (_, Some(msg)) => Err(CompileError::CompilationFailed { msg }),
        (0, None) => Ok(CompileResult::code(outcome.text.unwrap_or_default())),
        (status, None) => Err(CompileError::CompilationFailed {
            msg: format!("Compilation failed with status {}", status),
        }),
    }
}
