use std::any::Any;
use std::time::Instant;

use tracing::{info, warn};

use tagddl_core::{ModelIndex, Project, validate_model};

use crate::assemble::generate_tables;
use crate::database::{generate_database, generate_schemas, resolve_database_name};
use crate::diagnostics::{CountingSink, Diagnostic, DiagnosticSink};
use crate::errors::GenerationError;
use crate::model::GenerationReport;
use crate::naming::{artifact_scope, schema_name};
use crate::options::GenerateOptions;
use crate::output::{ArtifactWriter, FileSink};
use crate::routines::{RoutineKind, generate_routines};

/// State shared by every generation step of a run.
pub struct GenContext<'a> {
    pub options: &'a GenerateOptions,
    pub index: &'a ModelIndex<'a>,
    pub diagnostics: &'a mut dyn DiagnosticSink,
}

impl GenContext<'_> {
    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.report(diagnostic);
    }
}

/// Entry point for generating DDL scripts from a project.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    options: GenerateOptions,
}

impl Generator {
    pub fn new(options: GenerateOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Generate every script of `project` into `files`.
    ///
    /// A missing project is reported and fails the run before anything is
    /// written. Files written before a later failure are left in place.
    pub fn run(
        &self,
        project: Option<&Project>,
        files: &mut dyn FileSink,
        diagnostics: &mut dyn DiagnosticSink,
    ) -> Result<GenerationReport, GenerationError> {
        self.options.validate()?;

        let Some(project) = project else {
            diagnostics.report(Diagnostic::error(
                "missing_project",
                "no project found in the model; nothing generated",
            ));
            return Err(GenerationError::MissingProject);
        };

        let start = Instant::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        let mut report = GenerationReport::new(run_id.clone(), project.name.clone());
        let mut counting = CountingSink::new(diagnostics);
        let mut artifacts = ArtifactWriter::new(files, self.options.drop_statements, project);

        info!(run_id = %run_id, project = %project.name, "generation started");

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            self.generate(project, &mut artifacts, &mut counting, &mut report)
        }));
        report.files = artifacts.written().to_vec();

        let failure = match &outcome {
            Ok(Ok(())) => None,
            Ok(Err(err)) => Some(err.to_string()),
            Err(panic) => Some(panic_message(&**panic)),
        };
        if let Some(message) = failure {
            counting.report(Diagnostic::error(
                "generation_failed",
                format!("generation failed: {message}"),
            ));
        }
        report.warnings = counting.warnings;
        report.errors = counting.errors;

        match outcome {
            Ok(Ok(())) => {
                info!(
                    run_id = %run_id,
                    files = report.files.len(),
                    tables = report.tables.len(),
                    warnings = report.warnings,
                    errors = report.errors,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "generation completed"
                );
                Ok(report)
            }
            Ok(Err(err)) => {
                warn!(run_id = %run_id, error = %err, "generation failed");
                Err(err)
            }
            Err(_) => {
                warn!(run_id = %run_id, "generation panicked");
                Err(GenerationError::Failed(report))
            }
        }
    }

    fn generate(
        &self,
        project: &Project,
        artifacts: &mut ArtifactWriter<'_>,
        diagnostics: &mut dyn DiagnosticSink,
        report: &mut GenerationReport,
    ) -> Result<(), GenerationError> {
        for issue in validate_model(project) {
            diagnostics.report(
                Diagnostic::warning(issue.code, issue.message).for_element(issue.element),
            );
        }

        let index = ModelIndex::new(project);
        let mut ctx = GenContext {
            options: &self.options,
            index: &index,
            diagnostics,
        };
        self.generate_stages(project, &mut ctx, artifacts, report)
    }

    /// Database, schemas, then per data model functions, procedures and tables.
    fn generate_stages(
        &self,
        project: &Project,
        ctx: &mut GenContext<'_>,
        artifacts: &mut ArtifactWriter<'_>,
        report: &mut GenerationReport,
    ) -> Result<(), GenerationError> {
        match resolve_database_name(project) {
            Ok((name, mutation)) => {
                generate_database(project, &name, ctx, artifacts)?;
                report.mutations.extend(mutation);
                report.database = Some(name);
            }
            Err(err) => ctx.report(err.to_diagnostic()),
        }

        generate_schemas(project, ctx, artifacts)?;

        for data_model in &project.data_models {
            let scope = match artifact_scope(data_model) {
                Ok(scope) => scope,
                Err(err) => {
                    ctx.report(err.to_diagnostic());
                    ctx.report(
                        Diagnostic::warning(
                            "data_model_skipped",
                            format!(
                                "skipping routines and tables: '{}' cannot name output files",
                                err.candidate
                            ),
                        )
                        .for_element(err.element),
                    );
                    continue;
                }
            };
            let schema = match schema_name(data_model) {
                Ok(schema) => schema,
                Err(err) => {
                    ctx.report(
                        Diagnostic::warning(
                            "data_model_skipped",
                            format!(
                                "skipping routines and tables: invalid schema '{}'",
                                err.candidate
                            ),
                        )
                        .for_element(err.element),
                    );
                    continue;
                }
            };

            generate_routines(data_model, &scope, RoutineKind::Function, ctx, artifacts)?;
            generate_routines(data_model, &scope, RoutineKind::Procedure, ctx, artifacts)?;
            let tables = generate_tables(data_model, &scope, &schema, ctx, artifacts)?;
            report.tables.extend(tables);
        }

        Ok(())
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic during generation".to_string()
    }
}
