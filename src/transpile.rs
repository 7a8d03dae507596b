//! The transpile entry point: lowers a parsed [`App`] through context
//! extraction, the resolvers, and both backends into a set of generated
//! files plus warnings and stats.

use crate::{
    ast::App,
    backend,
    context::{ContextError, extract_context},
    resolve::resolve_relations,
    seed, ui,
};

#[derive(Debug, Clone, Default)]
pub struct TranspileOptions {
    /// Promote unresolved mutations and target-less handler contracts
    /// from warnings to errors.
    pub strict: bool,
    /// Line count of the source document, when the caller has it.
    /// Feeds the expansion ratio in [`TranspileStats`].
    pub source_lines: Option<usize>,
}

/// One generated output file. Paths are relative and unique within a
/// single [`TranspileOutput`].
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedFile {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone, Default)]
pub struct TranspileStats {
    pub file_count: usize,
    pub generated_lines: usize,
    pub source_lines: Option<usize>,
    /// generated_lines / source_lines, when source_lines is known.
    pub expansion_ratio: Option<f64>,
    pub page_count: usize,
    pub model_count: usize,
    pub route_count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct TranspileOutput {
    pub files: Vec<GeneratedFile>,
    pub warnings: Vec<String>,
    /// Mutation names the UI invokes that matched no route. Always
    /// populated; strict mode additionally turns the first one into an
    /// error before output is built.
    pub unresolved_mutations: Vec<String>,
    pub stats: TranspileStats,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TranspileError {
    Context(ContextError),
    /// Strict mode: a UI mutation matched no route.
    UnresolvedMutation(String),
    /// Strict mode: a handler contract declares no executable target.
    HandlerWithoutTarget(String),
}

impl TranspileError {
    /// Stable machine-readable code, used by the CLI exit paths.
    pub fn code(&self) -> &'static str {
        match self {
            TranspileError::Context(_) => "context",
            TranspileError::UnresolvedMutation(_) => "unresolved-mutation",
            TranspileError::HandlerWithoutTarget(_) => "handler-without-target",
        }
    }
}

impl std::fmt::Display for TranspileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranspileError::Context(err) => write!(f, "{}", err),
            TranspileError::UnresolvedMutation(name) => {
                write!(f, "mutation '{}' matches no declared route", name)
            }
            TranspileError::HandlerWithoutTarget(name) => {
                write!(f, "handler contract '{}' declares no target", name)
            }
        }
    }
}

impl std::error::Error for TranspileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TranspileError::Context(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ContextError> for TranspileError {
    fn from(err: ContextError) -> Self {
        TranspileError::Context(err)
    }
}

/// Transpiles a parsed document into its generated file set.
///
/// Output is a pure function of the input: the same document and
/// options always produce byte-identical files in the same order.
pub fn transpile(app: &App, options: &TranspileOptions) -> Result<TranspileOutput, TranspileError> {
    let context = extract_context(app)?;

    if options.strict {
        if let Some(handler) = context.handlers.iter().find(|h| h.target.is_none()) {
            return Err(TranspileError::HandlerWithoutTarget(handler.name.clone()));
        }
    }

    let ui_output = ui::generate_component_tree(&context);

    if options.strict {
        if let Some(name) = ui_output.unresolved_mutations.first() {
            return Err(TranspileError::UnresolvedMutation(name.clone()));
        }
    }

    let mut warnings = Vec::new();
    let mut unresolved = Vec::new();
    for name in &ui_output.unresolved_mutations {
        warnings.push(format!("unresolved-mutation:{}", name));
        unresolved.push(name.clone());
    }
    for handler in &context.handlers {
        if !ui_output.used_handlers.contains(&handler.name) {
            warnings.push(format!("unused-handler-contract:{}", handler.name));
        }
    }

    let graph = resolve_relations(&context.models);
    for edge in &graph.broken_edges {
        warnings.push(format!(
            "relation-cycle-broken:{}.{}",
            edge.child_model, edge.fk_field
        ));
    }

    let mut files = Vec::new();
    push_file(
        &mut files,
        &context.app_name,
        "app/App.jsx",
        ui_output.code.clone(),
    );
    for (path, content) in backend::generate_backend(&context) {
        push_file(&mut files, &context.app_name, &path, content);
    }
    if !context.models.is_empty() {
        push_file(
            &mut files,
            &context.app_name,
            "prisma/seed.js",
            seed::generate_seed(&context, &graph),
        );
    }

    let generated_lines: usize = files.iter().map(|f| f.content.lines().count()).sum();
    let stats = TranspileStats {
        file_count: files.len(),
        generated_lines,
        source_lines: options.source_lines,
        expansion_ratio: options
            .source_lines
            .filter(|n| *n > 0)
            .map(|n| generated_lines as f64 / n as f64),
        page_count: ui_output.page_count,
        model_count: context.models.len(),
        route_count: context.expanded_routes.len(),
    };

    Ok(TranspileOutput {
        files,
        warnings,
        unresolved_mutations: unresolved,
        stats,
    })
}

/// Adds a file with its provenance header. A path collision keeps the
/// first writer; expansion order is fixed, so this is deterministic.
fn push_file(files: &mut Vec<GeneratedFile>, app_name: &str, path: &str, content: String) {
    if files.iter().any(|f| f.path == path) {
        return;
    }
    files.push(GeneratedFile {
        path: path.to_string(),
        content: format!(
            "// Generated from the \"{}\" app definition. Edits will be overwritten.\n\n{}",
            app_name, content
        ),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    const SOURCE: &str = "@app tasks\n@state\n  newTodo: str\n@db\n  Todo {\n    id: int: primary: auto\n    text: str: required\n    done: bool\n  }\n@api\n  CRUD:/todos>~db.Todo\n@ui\n  @page Home\n    input : newTodo\n    button : !add(newTodo) : \"Add\"\n    list > *(todos > #todo.text)\n";

    #[test]
    fn test_transpile_is_deterministic() {
        let app = parse(SOURCE).unwrap();
        let options = TranspileOptions::default();
        let a = transpile(&app, &options).unwrap();
        let b = transpile(&app, &options).unwrap();
        assert_eq!(a.files, b.files);
        assert_eq!(a.warnings, b.warnings);
    }

    #[test]
    fn test_every_file_carries_a_provenance_header() {
        let app = parse(SOURCE).unwrap();
        let output = transpile(&app, &TranspileOptions::default()).unwrap();
        assert!(!output.files.is_empty());
        for file in &output.files {
            assert!(
                file.content.starts_with("// Generated from"),
                "{} lacks a header",
                file.path
            );
        }
    }

    #[test]
    fn test_file_paths_are_unique() {
        let app = parse(SOURCE).unwrap();
        let output = transpile(&app, &TranspileOptions::default()).unwrap();
        let mut paths: Vec<&str> = output.files.iter().map(|f| f.path.as_str()).collect();
        let before = paths.len();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), before);
    }

    #[test]
    fn test_strict_mode_rejects_targetless_contract() {
        let source = "@app q\n@handlers\n  notifySlack(message: str)\n@ui\n  @page Home\n    text > \"hi\"\n";
        let app = parse(source).unwrap();
        let strict = TranspileOptions {
            strict: true,
            ..TranspileOptions::default()
        };
        let err = transpile(&app, &strict).unwrap_err();
        assert_eq!(err.code(), "handler-without-target");
        // Same document passes in the default mode, with a warning.
        let output = transpile(&app, &TranspileOptions::default()).unwrap();
        assert!(
            output
                .warnings
                .iter()
                .any(|w| w == "unused-handler-contract:notifySlack")
        );
    }

    #[test]
    fn test_expansion_ratio_uses_source_lines() {
        let app = parse(SOURCE).unwrap();
        let options = TranspileOptions {
            strict: false,
            source_lines: Some(SOURCE.lines().count()),
        };
        let output = transpile(&app, &options).unwrap();
        let ratio = output.stats.expansion_ratio.unwrap();
        assert!(ratio > 1.0);
    }
}
