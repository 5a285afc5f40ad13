//! Fake engines mimicking each native calling convention.
//!
//! They implement just enough of their language to exercise the adapters:
//! indentation-based stylesheets, brace checking, and line-level source maps.

use std::sync::Arc;

use itertools::Itertools;
use serde_json::json;

use crate::{
    constants::LIVESCRIPT_MODULE,
    core::{
        errors::{EngineException, NativeError},
        traits::engine::{
            AsyncRenderer, CallbackCompiler, CallbackOptions, CallbackOutcome, Completion,
            EngineExport, MapMode, ModuleRequire, RenderOutput, Renderer, ScriptCompiler,
            ScriptOptions, ScriptOutput, TransformOptions, TransformOutput, Transformer,
            TranspileOptions, TranspileOutput, Transpiler,
        },
    },
    stubs::mappings::LineMap,
};

/// Lowers `selector` / indented `property value` blocks into CSS.
fn render_indented(source: &str) -> Result<String, EngineException> {
    let mut css = String::new();
    let mut open = false;

    for (idx, line) in source.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let line_no = idx as u32 + 1;

        if !line.starts_with([' ', '\t']) {
            if open {
                css.push_str("}\n");
            }
            css.push_str(&format!("{} {{\n", line.trim()));
            open = true;
            continue;
        }

        if !open {
            return Err(EngineException::new("ParseError", "unexpected indent").at(line_no, 1));
        }
        let declaration = line.trim().trim_end_matches(';');
        let (property, value) = declaration
            .split_once(':')
            .or_else(|| declaration.split_once(char::is_whitespace))
            .ok_or_else(|| {
                EngineException::new(
                    "ParseError",
                    &format!("expected value for property `{}`", declaration),
                )
                .at(line_no, 3)
            })?;
        css.push_str(&format!("  {}: {};\n", property.trim(), value.trim()));
    }

    if open {
        css.push_str("}\n");
    }
    Ok(css)
}

/// First unbalanced bracket as `(line, column, bracket)`, 1-based.
fn unbalanced(source: &str) -> Option<(u32, u32, char)> {
    let mut stack = Vec::new();
    for (line_idx, line) in source.lines().enumerate() {
        for (col_idx, ch) in line.chars().enumerate() {
            let position = (line_idx as u32 + 1, col_idx as u32 + 1, ch);
            match ch {
                '{' | '(' | '[' => stack.push(position),
                '}' | ')' | ']' => {
                    let expected = match ch {
                        '}' => '{',
                        ')' => '(',
                        _ => '[',
                    };
                    match stack.pop() {
                        Some((_, _, open)) if open == expected => {}
                        _ => return Some(position),
                    }
                }
                _ => {}
            }
        }
    }
    stack.pop()
}

fn file_stem(name: &str) -> &str {
    name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(name)
}

#[derive(Clone, Debug, Default)]
pub struct StylusStub;

impl Renderer for StylusStub {
    fn render(&self, source: &str) -> Result<String, NativeError> {
        render_indented(source).map_err(NativeError::thrown)
    }
}

#[derive(Clone, Debug, Default)]
pub enum CallbackMode {
    #[default]
    Immediate,
    /// Completes from a separate thread.
    Threaded,
    /// Drops the completion without calling it.
    Never,
}

#[derive(Clone, Debug, Default)]
pub struct SassStub {
    pub mode: CallbackMode,
}

impl SassStub {
    pub fn new(mode: CallbackMode) -> Self {
        Self { mode }
    }

    fn outcome(source: &str, options: &CallbackOptions) -> CallbackOutcome {
        let rendered = if options.indented_syntax {
            render_indented(source).map_err(|e| (e.line.unwrap_or(0), e.message))
        } else {
            match unbalanced(source) {
                Some((line, _, ch)) => Err((line, format!("Invalid CSS: unmatched \"{}\"", ch))),
                None => Ok(source.trim().to_string() + "\n"),
            }
        };

        match rendered {
            Ok(text) => CallbackOutcome {
                status: 0,
                text: Some(text),
                message: None,
            },
            Err((line, message)) => CallbackOutcome {
                status: 1,
                text: None,
                message: Some(format!("{} on line {}", message, line)),
            },
        }
    }
}

impl CallbackCompiler for SassStub {
    fn compile(&self, source: &str, options: &CallbackOptions, done: Completion) {
        let outcome = Self::outcome(source, options);
        match self.mode {
            CallbackMode::Immediate => done(outcome),
            CallbackMode::Threaded => {
                std::thread::spawn(move || done(outcome));
            }
            CallbackMode::Never => drop(done),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct LessStub;

#[async_trait::async_trait]
impl AsyncRenderer for LessStub {
    async fn render(&self, source: &str) -> Result<RenderOutput, NativeError> {
        tokio::task::yield_now().await;

        if let Some((line, column, ch)) = unbalanced(source) {
            return Err(NativeError::Structured(json!({
                "type": "Parse",
                "message": format!("Unrecognised input near `{}`", ch),
                "line": line,
                "column": column,
            })));
        }

        let mut variables: Vec<(String, String)> = Vec::new();
        let mut css = String::new();
        for line in source.lines() {
            let trimmed = line.trim();
            if let Some(declaration) = trimmed.strip_prefix('@') {
                if let Some((name, value)) = declaration.trim_end_matches(';').split_once(':') {
                    variables.push((format!("@{}", name.trim()), value.trim().to_string()));
                    continue;
                }
            }
            let mut line = line.to_string();
            // Longest names first so `@a` never clobbers `@ab`.
            for (name, value) in variables
                .iter()
                .sorted_by_key(|(name, _)| std::cmp::Reverse(name.len()))
            {
                line = line.replace(name.as_str(), value);
            }
            css.push_str(&line);
            css.push('\n');
        }

        Ok(RenderOutput { css })
    }
}

#[derive(Clone, Debug, Default)]
pub struct TypeScriptStub;

impl Transpiler for TypeScriptStub {
    fn transpile_module(&self, source: &str, options: &TranspileOptions) -> TranspileOutput {
        let stem = file_stem(&options.file_name);
        let body: Vec<String> = source.lines().map(strip_annotations).collect();

        let mut output_text = String::from("\"use strict\";\n");
        for line in &body {
            output_text.push_str(line);
            output_text.push('\n');
        }

        let source_map_text = options.source_map.then(|| {
            output_text.push_str(&format!("//# sourceMappingURL={}.js.map", stem));
            LineMap::shifted(&format!("{}.js", stem), &options.file_name, body.len(), 1)
                .to_json()
                .to_string()
        });

        TranspileOutput {
            output_text,
            source_map_text,
        }
    }
}

/// Drops `: type` annotations from `let`/`const` bindings.
fn strip_annotations(line: &str) -> String {
    let trimmed = line.trim_start();
    if !(trimmed.starts_with("let ") || trimmed.starts_with("const ")) {
        return line.to_string();
    }
    match (line.find(':'), line.find('=')) {
        (Some(colon), Some(eq)) if colon < eq => {
            format!("{} {}", line[..colon].trim_end(), &line[eq..])
        }
        _ => line.to_string(),
    }
}

#[derive(Clone, Debug, Default)]
pub struct BabelStub;

impl Transformer for BabelStub {
    fn transform(
        &self,
        source: &str,
        options: &TransformOptions,
    ) -> Result<TransformOutput, NativeError> {
        if let Some((line, column, ch)) = unbalanced(source) {
            return Err(NativeError::thrown(
                EngineException::new(
                    "SyntaxError",
                    &format!(
                        "{}: Unexpected token `{}` ({}:{})",
                        options.source_file_name, ch, line, column
                    ),
                )
                .at(line, column),
            ));
        }

        let lowers_bindings = options.presets.iter().any(|p| p == "es2015");
        let body: Vec<String> = source
            .lines()
            .map(|line| {
                if lowers_bindings {
                    line.replacen("const ", "var ", 1).replacen("let ", "var ", 1)
                } else {
                    line.to_string()
                }
            })
            .collect();

        let mut code = String::from("\"use strict\";\n\n");
        code.push_str(&body.join("\n"));

        let map = options.source_maps.then(|| {
            let own = LineMap::shifted(
                &format!("{}.js", file_stem(&options.source_file_name)),
                &options.source_file_name,
                body.len(),
                2,
            );
            let input = options.input_source_map.as_ref().and_then(LineMap::from_json);
            match input {
                Some(input) => own.compose(&input).to_json(),
                None => own.to_json(),
            }
        });

        Ok(TransformOutput { code, map })
    }
}

/// Wraps the body in a top-level function, one generated line per source line.
fn wrap_in_closure(
    source: &str,
    options: &ScriptOptions,
    header: &str,
) -> Result<ScriptOutput, NativeError> {
    if let Some((line, column, ch)) = unbalanced(source) {
        return Err(NativeError::thrown(
            EngineException::new("SyntaxError", &format!("missing or unexpected `{}`", ch))
                .at(line, column),
        ));
    }

    let lines: Vec<&str> = source.lines().collect();
    let mut code = String::from(header);
    code.push('\n');
    for line in &lines {
        code.push_str("  ");
        code.push_str(&line.replace("->", "function() {}"));
        code.push('\n');
    }
    code.push_str("}).call(this);\n");

    let source_map = match options.map {
        MapMode::None => None,
        MapMode::Linked | MapMode::Embedded => Some(
            LineMap::shifted(
                &format!("{}.js", file_stem(&options.filename)),
                &options.filename,
                lines.len(),
                1,
            )
            .to_json()
            .to_string(),
        ),
    };

    Ok(ScriptOutput { code, source_map })
}

#[derive(Clone, Debug, Default)]
pub struct CoffeeScriptStub;

impl ScriptCompiler for CoffeeScriptStub {
    fn compile(&self, source: &str, options: &ScriptOptions) -> Result<ScriptOutput, NativeError> {
        wrap_in_closure(source, options, "(function() {")
    }
}

#[derive(Clone, Debug, Default)]
pub struct LiveScriptStub;

impl ScriptCompiler for LiveScriptStub {
    fn compile(&self, source: &str, options: &ScriptOptions) -> Result<ScriptOutput, NativeError> {
        wrap_in_closure(source, options, "(function(){")
    }
}

/// The browser build of LiveScript only publishes `require`.
#[derive(Clone, Debug, Default)]
pub struct LiveScriptRequire;

impl ModuleRequire for LiveScriptRequire {
    fn require(&self, module: &str) -> Option<EngineExport> {
        (module == LIVESCRIPT_MODULE).then(|| EngineExport::Script(Arc::new(LiveScriptStub)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_indented_block() {
        let css = render_indented("body\n  color red\n  margin: 0\n\na\n  color blue").unwrap();
        assert_eq!(
            css,
            "body {\n  color: red;\n  margin: 0;\n}\na {\n  color: blue;\n}\n"
        );
    }

    #[test]
    fn test_render_indented_rejects_orphan_property() {
        let err = render_indented("  color red").unwrap_err();
        assert_eq!(err.line, Some(1));
    }

    #[test]
    fn test_unbalanced_reports_position() {
        assert_eq!(unbalanced("a {\n  b: c;\n"), Some((1, 3, '{')));
        assert_eq!(unbalanced("f(x))"), Some((1, 5, ')')));
        assert_eq!(unbalanced("[{()}]"), None);
    }

    #[test]
    fn test_strip_annotations() {
        assert_eq!(strip_annotations("let x: number = 1;"), "let x = 1;");
        assert_eq!(strip_annotations("foo(a: 1)"), "foo(a: 1)");
    }

    #[tokio::test]
    async fn test_less_substitutes_variables() {
        let output = LessStub
            .render("@color: red;\n@color-dark: #300;\na { color: @color-dark; b: @color; }")
            .await
            .unwrap();
        assert_eq!(output.css, "a { color: #300; b: red; }\n");
    }
}
