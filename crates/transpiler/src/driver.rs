//! # Translation Driver
//!
//! Orchestrates the full run: parse every input (a parse failure is fatal
//! for that file only), collect intentions into one graph, freeze it, then
//! fan translation units out across scoped worker threads. Each worker owns
//! a mutable clone of its unit's intentions, reads the shared frozen graph
//! through the type system, and shares one overload-resolver cache.

use crate::collection::IntentionCollector;
use crate::emit::emit_file;
use crate::intentions::{FileIntention, IntentionGraph};
use crate::objc::{parse_objc_file, ObjcFile};
use crate::overload::{OverloadResolver, OverloadResolverCache};
use crate::passes::{ExpressionPassPipeline, PassContext};
use crate::type_system::IntentionTypeSystem;
use objswift_ast::{
    CompoundStatement, Diagnostics, Expression, Name, SourceFile, SourceRef, Statement, StmtKind,
    SwiftType,
};
use std::sync::Arc;

/// One emitted Swift file.
#[derive(Debug, Clone, PartialEq)]
pub struct TranspiledFile {
    pub name: String,
    pub swift_source: String,
}

/// The result of a whole run.
#[derive(Debug, Clone, PartialEq)]
pub struct TranspileOutput {
    pub files: Vec<TranspiledFile>,
    pub diagnostics: Diagnostics,
}

impl TranspileOutput {
    pub fn succeeded(&self) -> bool {
        !self.diagnostics.has_errors()
    }
}

#[derive(Debug, Default)]
pub struct Transpiler;

impl Transpiler {
    pub fn new() -> Self {
        Self
    }

    pub fn transpile(&self, sources: &[SourceFile]) -> TranspileOutput {
        let mut diagnostics = Diagnostics::new();

        // Parse. Siblings continue past a failing file.
        let mut parsed: Vec<ObjcFile> = Vec::new();
        for source in sources {
            match parse_objc_file(source) {
                Ok(file) => parsed.push(file),
                Err(error) => {
                    log::debug!("parse failed for {}: {}", source.name, error);
                    diagnostics.error(error.message.clone(), Some(error.source_ref()));
                }
            }
        }

        // Collect and freeze the graph.
        let graph = IntentionCollector::new().collect(&parsed);
        let units = plan_units(&graph);
        let graph = Arc::new(graph);

        let cache = Arc::new(OverloadResolverCache::new());
        cache.enable();

        // One worker per translation unit, all reading the frozen graph and
        // sharing the resolver cache.
        let results: Vec<(TranspiledFile, Diagnostics)> = std::thread::scope(|scope| {
            let handles: Vec<_> = units
                .into_iter()
                .map(|mut unit| {
                    let graph = Arc::clone(&graph);
                    let cache = Arc::clone(&cache);
                    scope.spawn(move || {
                        let mut unit_diagnostics = Diagnostics::new();
                        let type_system = IntentionTypeSystem::new(graph.as_ref());
                        let resolver = OverloadResolver::with_cache(cache);
                        let mut pipeline = ExpressionPassPipeline::with_default_passes();

                        rewrite_unit(
                            &mut unit,
                            &type_system,
                            &resolver,
                            &mut pipeline,
                            &mut unit_diagnostics,
                        );

                        let file = TranspiledFile {
                            name: swift_file_name(&unit.file_name),
                            swift_source: emit_file(&unit),
                        };
                        (file, unit_diagnostics)
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| handle.join().expect("translation worker panicked"))
                .collect()
        });

        cache.teardown();

        let mut files = Vec::new();
        for (file, unit_diagnostics) in results {
            diagnostics.merge(unit_diagnostics);
            files.push(file);
        }

        TranspileOutput { files, diagnostics }
    }
}

/// Group file records by stem so `A.h` and `A.m` fold into one `A.swift`
/// unit, and drop records with nothing to emit.
fn plan_units(graph: &IntentionGraph) -> Vec<FileIntention> {
    let mut units: Vec<FileIntention> = Vec::new();
    for record in &graph.files {
        if is_empty_record(record) {
            continue;
        }
        let stem = file_stem(&record.file_name).to_string();
        match units.iter().position(|u| file_stem(&u.file_name) == stem) {
            Some(index) => merge_records(&mut units[index], record.clone()),
            None => units.push(record.clone()),
        }
    }
    units
}

fn is_empty_record(record: &FileIntention) -> bool {
    record.classes.is_empty()
        && record.extensions.is_empty()
        && record.protocols.is_empty()
        && record.enums.is_empty()
        && record.structs.is_empty()
        && record.typedefs.is_empty()
        && record.global_variables.is_empty()
        && record.global_functions.is_empty()
        && record.preprocessor_directives.is_empty()
}

fn merge_records(unit: &mut FileIntention, incoming: FileIntention) {
    unit.preprocessor_directives
        .extend(incoming.preprocessor_directives);
    unit.classes.extend(incoming.classes);
    unit.extensions.extend(incoming.extensions);
    unit.protocols.extend(incoming.protocols);
    unit.enums.extend(incoming.enums);
    unit.structs.extend(incoming.structs);
    unit.typedefs.extend(incoming.typedefs);
    unit.global_variables.extend(incoming.global_variables);
    unit.global_functions.extend(incoming.global_functions);
}

fn file_stem(name: &str) -> &str {
    name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(name)
}

fn swift_file_name(name: &str) -> String {
    format!("{}.swift", file_stem(name))
}

/// Run the expression-pass pipeline over every body in one unit.
fn rewrite_unit(
    unit: &mut FileIntention,
    type_system: &IntentionTypeSystem<'_>,
    resolver: &OverloadResolver,
    pipeline: &mut ExpressionPassPipeline,
    diagnostics: &mut Diagnostics,
) {
    for class in &mut unit.classes {
        let self_type = SwiftType::type_name(class.name);
        let superclass_type = class.superclass.map(SwiftType::type_name);

        for method in &mut class.methods {
            if let Some(body) = &mut method.body {
                let self_type = if method.signature.is_static {
                    SwiftType::metatype_of(self_type.clone())
                } else {
                    self_type.clone()
                };
                let parameters = signature_parameters(&method.signature.parameters);
                run_pipeline(
                    pipeline,
                    type_system,
                    resolver,
                    diagnostics,
                    method.source.clone(),
                    Some(self_type),
                    superclass_type.clone(),
                    parameters,
                    body,
                );
            }
        }
        for init in &mut class.inits {
            if let Some(body) = &mut init.body {
                let parameters = signature_parameters(&init.parameters);
                run_pipeline(
                    pipeline,
                    type_system,
                    resolver,
                    diagnostics,
                    init.source.clone(),
                    Some(self_type.clone()),
                    superclass_type.clone(),
                    parameters,
                    body,
                );
            }
        }
        if let Some(deinit) = &mut class.deinit {
            if let Some(body) = &mut deinit.body {
                run_pipeline(
                    pipeline,
                    type_system,
                    resolver,
                    diagnostics,
                    deinit.source.clone(),
                    Some(self_type.clone()),
                    superclass_type.clone(),
                    vec![],
                    body,
                );
            }
        }
    }

    for extension in &mut unit.extensions {
        let self_type = SwiftType::type_name(extension.class_name);
        for method in &mut extension.methods {
            if let Some(body) = &mut method.body {
                let parameters = signature_parameters(&method.signature.parameters);
                run_pipeline(
                    pipeline,
                    type_system,
                    resolver,
                    diagnostics,
                    method.source.clone(),
                    Some(self_type.clone()),
                    None,
                    parameters,
                    body,
                );
            }
        }
    }

    for function in &mut unit.global_functions {
        if let Some(body) = &mut function.body {
            let parameters = signature_parameters(&function.signature.parameters);
            run_pipeline(
                pipeline,
                type_system,
                resolver,
                diagnostics,
                function.source.clone(),
                None,
                None,
                parameters,
                body,
            );
        }
    }

    for global in &mut unit.global_variables {
        if let Some(init) = &mut global.initializer {
            rewrite_expression(
                pipeline,
                type_system,
                resolver,
                diagnostics,
                global.source.clone(),
                init,
            );
        }
    }
}

fn signature_parameters(
    parameters: &[objswift_ast::ParameterSignature],
) -> Vec<(Name, SwiftType)> {
    parameters
        .iter()
        .map(|p| (p.name, p.ty.clone()))
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn run_pipeline(
    pipeline: &mut ExpressionPassPipeline,
    type_system: &IntentionTypeSystem<'_>,
    resolver: &OverloadResolver,
    diagnostics: &mut Diagnostics,
    source: SourceRef,
    self_type: Option<SwiftType>,
    superclass_type: Option<SwiftType>,
    parameters: Vec<(Name, SwiftType)>,
    body: &mut CompoundStatement,
) {
    let mut context = PassContext {
        type_system,
        resolver,
        diagnostics,
        source,
        self_type,
        superclass_type,
        parameters,
    };
    pipeline.run(&mut context, body);
}

/// Standalone expressions (global initializers) run through the same
/// pipeline inside a scratch body.
fn rewrite_expression(
    pipeline: &mut ExpressionPassPipeline,
    type_system: &IntentionTypeSystem<'_>,
    resolver: &OverloadResolver,
    diagnostics: &mut Diagnostics,
    source: SourceRef,
    exp: &mut Expression,
) {
    let mut body: CompoundStatement = vec![Statement::expression(exp.clone())].into();
    run_pipeline(
        pipeline,
        type_system,
        resolver,
        diagnostics,
        source,
        None,
        None,
        vec![],
        &mut body,
    );
    if let Some(statement) = body.statements.into_iter().next() {
        if let StmtKind::Expressions(mut exps) = statement.kind {
            if let Some(rewritten) = exps.drain(..).next() {
                *exp = rewritten;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_records_are_skipped_and_stems_merge() {
        let mut graph = IntentionGraph::new();
        let mut header = FileIntention::new("View.h");
        header
            .classes
            .push(crate::intentions::ClassIntention::new(
                "View".into(),
                SourceRef::synthesized(),
            ));
        let mut body_file = FileIntention::new("View.m");
        body_file.preprocessor_directives.push("#import \"View.h\"".into());
        graph.add_file(header);
        graph.add_file(body_file);
        graph.add_file(FileIntention::new("Empty.m"));

        let units = plan_units(&graph);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].classes.len(), 1);
        assert_eq!(units[0].preprocessor_directives.len(), 1);
        assert_eq!(swift_file_name(&units[0].file_name), "View.swift");
    }
}
