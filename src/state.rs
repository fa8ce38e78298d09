use std::path::PathBuf;

use crate::config::ProjectConfig;
use crate::data::margin::{MarginReport, analyze};
use crate::data::model::{MeasurementSeries, SpecLimit};
use crate::report::{Annotation, ReportRecord};
use crate::trace::graph::TraceGraph;
use crate::trace::model::Need;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Active configuration (defaults until the user loads a file).
    pub config: ProjectConfig,

    /// Loaded measurement sweep.
    pub series: Option<MeasurementSeries>,

    /// Analysis of `series` against the configured limits (cached).
    pub report: Option<MarginReport>,

    /// Trace records as loaded.
    pub trace: Option<TraceGraph>,

    /// `trace` plus the record generated from the current analysis, if bound.
    pub trace_view: Option<TraceGraph>,

    /// Error message shown in the UI.
    pub status_message: Option<String>,

    /// Non-error notice, e.g. a completed export.
    pub info_message: Option<String>,

    /// Where the next viewport screenshot is written.
    pub screenshot_path: Option<PathBuf>,
}

impl AppState {
    /// Ingest a newly loaded series and analyze it.
    pub fn set_series(&mut self, series: MeasurementSeries) {
        if series.is_empty() {
            log::warn!("Loaded series has no samples");
        }
        self.series = Some(series);
        self.status_message = None;
        self.reanalyze();
    }

    /// Replace the configuration. Trace records are re-resolved against the
    /// new link types.
    pub fn set_config(&mut self, config: ProjectConfig) {
        self.config = config;
        self.status_message = None;
        // The loaded records are kept until they resolve against the new config.
        if let Some(graph) = &self.trace {
            let needs: Vec<Need> = graph.needs().cloned().collect();
            match TraceGraph::build(needs, &self.config.trace) {
                Ok(rebuilt) => self.trace = Some(rebuilt),
                Err(e) => self.fail(format!("Trace records no longer valid: {e}")),
            }
        }
        self.reanalyze();
    }

    pub fn set_trace(&mut self, graph: TraceGraph) {
        self.trace = Some(graph);
        self.status_message = None;
        self.refresh_trace_view();
    }

    /// Set scalar limits from the side-panel editor.
    pub fn set_scalar_limits(&mut self, spec_min: f64, spec_max: f64) {
        self.status_message = None;
        self.config.analysis.spec_min = SpecLimit::Scalar(spec_min);
        self.config.analysis.spec_max = SpecLimit::Scalar(spec_max);
        self.reanalyze();
    }

    /// Recompute the margin report after the series or limits changed.
    pub fn reanalyze(&mut self) {
        self.report = None;
        if let Some(series) = &self.series {
            let analysis = &self.config.analysis;
            match analyze(series, &analysis.spec_min, &analysis.spec_max) {
                Ok(report) => {
                    log::info!(
                        "{}: {} with min margin {:.3} at {} = {}",
                        analysis.title,
                        report.status,
                        report.worst.margin,
                        series.x_column,
                        report.worst.x
                    );
                    if !report.status.is_pass() {
                        log::warn!("{} of {} points outside spec", report.violations(), series.len());
                    }
                    self.report = Some(report);
                }
                Err(e) => self.fail(format!("Analysis failed: {e}")),
            }
        }
        self.refresh_trace_view();
    }

    /// Merge the analysis result record into the trace graph.
    fn refresh_trace_view(&mut self) {
        self.trace_view = self.trace.clone();
        let (Some(graph), Some(report), Some(binding)) =
            (&self.trace, &self.report, &self.config.analysis.result)
        else {
            return;
        };
        match graph.with_record(Need::from_report(binding, report)) {
            Ok(view) => self.trace_view = Some(view),
            Err(e) => {
                let message = format!("Cannot record result {}: {e}", binding.id);
                self.fail(message);
            }
        }
    }

    /// Chart annotation for the current report.
    pub fn annotation(&self) -> Option<Annotation> {
        let series = self.series.as_ref()?;
        let report = self.report.as_ref()?;
        Some(Annotation::new(report, &self.config.analysis, &series.x_column))
    }

    /// Exportable summary of the current report.
    pub fn report_record(&self) -> Option<ReportRecord> {
        let series = self.series.as_ref()?;
        let report = self.report.as_ref()?;
        Some(ReportRecord::new(series, &self.config.analysis, report))
    }

    pub fn fail(&mut self, message: String) {
        log::error!("{message}");
        self.info_message = None;
        self.status_message = Some(message);
    }

    pub fn notify(&mut self, message: String) {
        log::info!("{message}");
        self.status_message = None;
        self.info_message = Some(message);
    }
}
