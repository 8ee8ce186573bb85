use std::fmt;
use std::rc::Rc;

use tracing::{debug, warn};

use combinate_core::{
    Candidate, Combination, CombinationKind, Record, Template, Value, deep_clone_record,
    display_record,
};

use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::model::{CloneMode, Expansion, ExpansionReport, FieldReport, GenerateOptions};

/// Expand a template into every combination of its field candidates.
///
/// Nested arrays and objects are shared between the returned records.
pub fn generate(template: &Template) -> Vec<Record> {
    GenerationEngine::default().generate(template)
}

/// Same as [`generate`], with every record deep-cloned.
///
/// If a value cannot be deep-cloned the error is reported and the shallow
/// records are returned instead.
pub fn generate_mutable(template: &Template) -> Vec<Record> {
    GenerationEngine::new(GenerateOptions {
        clone_mode: CloneMode::Deep,
        ..GenerateOptions::default()
    })
    .generate(template)
}

/// Expand `template` and offer each resulting object as one candidate.
pub fn nest(template: &Template) -> Combination {
    GenerationEngine::default().nest(template)
}

/// Entry point for expanding templates with explicit options.
pub struct GenerationEngine {
    options: GenerateOptions,
    sink: Rc<dyn DiagnosticSink>,
}

impl Default for GenerationEngine {
    fn default() -> Self {
        Self::new(GenerateOptions::default())
    }
}

impl fmt::Debug for GenerationEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationEngine")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl GenerationEngine {
    pub fn new(options: GenerateOptions) -> Self {
        Self {
            options,
            sink: Rc::new(TracingSink),
        }
    }

    /// Route diagnostics to `sink` instead of `tracing`.
    pub fn with_sink(mut self, sink: Rc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    pub fn generate(&self, template: &Template) -> Vec<Record> {
        self.run(template).results
    }

    pub fn nest(&self, template: &Template) -> Combination {
        let candidates = self
            .generate(template)
            .into_iter()
            .map(|record| Candidate::Set(Value::object(record)))
            .collect();
        Combination::from_candidates(CombinationKind::Nested, candidates)
    }

    pub fn run(&self, template: &Template) -> Expansion {
        let base = template.base_object();
        let fields: Vec<(&str, Vec<Candidate>)> = template
            .combinations()
            .map(|(name, combination)| (name, combination.candidates()))
            .collect();

        if self.options.log {
            self.record_inputs(&base, &fields);
        }

        let expected = fields
            .iter()
            .fold(1_usize, |total, (_, candidates)| {
                total.saturating_mul(candidates.len())
            });
        if let Some(threshold) = self.options.warn_threshold {
            if expected > threshold {
                warn!(
                    expected,
                    threshold,
                    fields = fields.len(),
                    "template expands to a large number of results"
                );
            }
        }

        debug!(
            literal_fields = base.len(),
            combination_fields = fields.len(),
            expected,
            "expanding template"
        );

        let results = cross_product(&base, &fields);

        let mut report = ExpansionReport {
            literal_fields: base.len(),
            fields: fields
                .iter()
                .map(|(name, candidates)| FieldReport {
                    field: name.to_string(),
                    candidates: candidates.len(),
                })
                .collect(),
            results: results.len(),
            clone_mode: self.options.clone_mode,
            clone_fallback: None,
        };

        let results = match self.options.clone_mode {
            CloneMode::Shallow => results,
            CloneMode::Deep => match results
                .iter()
                .map(deep_clone_record)
                .collect::<Result<Vec<_>, _>>()
            {
                Ok(cloned) => cloned,
                Err(err) => {
                    let message = err.to_string();
                    warn!(error = %message, "deep clone failed, returning shared results");
                    self.sink.record("clone_error", &message);
                    report.clone_fallback = Some(message);
                    results
                }
            },
        };

        debug!(results = report.results, "template expanded");

        Expansion { results, report }
    }

    fn record_inputs(&self, base: &Record, fields: &[(&str, Vec<Candidate>)]) {
        self.sink.record("base", &display_record(base));
        for (name, candidates) in fields {
            let rendered: Vec<String> = candidates.iter().map(ToString::to_string).collect();
            self.sink.record(name, &format!("[{}]", rendered.join(",")));
        }
    }
}

/// Fold candidate lists into records: fields outermost, then candidates, then
/// the records built so far. An empty accumulator stands for the base record.
fn cross_product(base: &Record, fields: &[(&str, Vec<Candidate>)]) -> Vec<Record> {
    if fields.is_empty() {
        return vec![base.clone()];
    }

    let mut combos: Vec<Record> = Vec::new();
    for (name, candidates) in fields {
        let seeds = if combos.is_empty() {
            std::slice::from_ref(base)
        } else {
            combos.as_slice()
        };

        let mut next = Vec::with_capacity(candidates.len().saturating_mul(seeds.len()));
        for candidate in candidates {
            for seed in seeds {
                let mut combo = seed.clone();
                if let Candidate::Set(value) = candidate {
                    combo.insert(name.to_string(), value.clone());
                }
                next.push(combo);
            }
        }
        combos = next;
    }
    combos
}
