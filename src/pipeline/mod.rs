//! Staged Analysis Pipeline
//!
//! Fixed stage sequence over one bundle:
//!
//! ```text
//! extract_metadata -> extract_content -> generate_summary
//!     -> analyze_target -> check_threshold -> generate_justification
//! ```
//!
//! Every stage is skipped once the state carries an error; the first
//! failure therefore decides the run. Domain outcomes of ingestion (bundle
//! too large, nothing to analyze) terminate with their own justification;
//! anything else is wrapped as `Erro em <stage>: <message>`. The run itself
//! never fails: the caller always receives a report.

pub mod prompts;
pub mod quantity;
pub mod state;

pub use quantity::{QuantityEstimate, ReconciledQuantity, parse_estimate, reconcile};
pub use state::PipelineState;

use serde_json::Value;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::ai::SharedProvider;
use crate::chunk::split_text;
use crate::ingest::{IngestLimits, extract_city, ingest_bundle, read_metadata};
use crate::types::{AnalysisReport, ThresholdMatch};

/// Metadata keys the summary response may fill in.
const SUMMARY_DETAIL_KEYS: &[&str] = &[
    "title",
    "object",
    "phone",
    "website",
    "email",
    "quantities",
    "specifications",
    "deadlines",
    "values",
];

const QUANTITIES_KEY: &str = "quantities";

// =============================================================================
// Request and Options
// =============================================================================

/// One analysis job.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    /// Bundle directory holding the edital files
    pub bundle_dir: PathBuf,
    /// Product or service the analysis looks for
    pub target: String,
    /// Minimum unit volume; 0 disables the quantity check
    pub threshold: u64,
    /// Treat the document as target-relevant without asking the model
    pub force_match: bool,
}

/// Tunable limits for one pipeline instance.
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    pub ingest: IngestLimits,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            ingest: IngestLimits::default(),
            chunk_size: crate::constants::chunk::CHUNK_SIZE,
            chunk_overlap: crate::constants::chunk::CHUNK_OVERLAP,
        }
    }
}

// =============================================================================
// Pipeline
// =============================================================================

/// Staged relevance analysis over one bundle.
pub struct AnalysisPipeline {
    provider: SharedProvider,
    options: PipelineOptions,
}

impl AnalysisPipeline {
    pub fn new(provider: SharedProvider, options: PipelineOptions) -> Self {
        Self { provider, options }
    }

    /// Run the full stage sequence and produce the report. Never fails;
    /// failed runs carry the failure in `justification`.
    pub async fn run(&self, request: &AnalysisRequest) -> AnalysisReport {
        info!(
            bundle = %request.bundle_dir.display(),
            target = %request.target,
            threshold = request.threshold,
            provider = self.provider.name(),
            model = self.provider.model(),
            "starting analysis"
        );

        let mut state = PipelineState::new(&request.bundle_dir);
        self.extract_metadata(&mut state);
        self.extract_content(&mut state);
        self.generate_summary(&mut state).await;
        self.analyze_target(&mut state, request).await;
        self.check_threshold(&mut state, request).await;
        self.generate_justification(&mut state, request).await;

        info!(
            bid_number = %state.bid_number,
            is_relevant = state.is_relevant,
            has_error = state.has_error,
            "analysis finished"
        );
        state.to_report()
    }

    // -------------------------------------------------------------------------
    // Stage 1: metadata
    // -------------------------------------------------------------------------

    fn extract_metadata(&self, state: &mut PipelineState) {
        let metadata = read_metadata(&state.bundle_dir);
        state.bid_number = metadata
            .get(crate::ingest::metadata::BID_NUMBER_KEY)
            .and_then(Value::as_str)
            .unwrap_or(crate::ingest::metadata::UNKNOWN_BID_NUMBER)
            .to_string();
        state.city = metadata
            .get("city")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| extract_city(&metadata));
        state.metadata = metadata;
        debug!(bid_number = %state.bid_number, city = %state.city, "metadata loaded");
    }

    // -------------------------------------------------------------------------
    // Stage 2: content
    // -------------------------------------------------------------------------

    fn extract_content(&self, state: &mut PipelineState) {
        if state.has_error {
            return;
        }
        match ingest_bundle(&state.bundle_dir, &self.options.ingest) {
            Ok(content) => state.content = content,
            Err(e) if e.is_domain_outcome() => {
                let justification = e.justification().unwrap_or_else(|| e.to_string());
                warn!(error = %e, "bundle cannot be analyzed");
                state.fail_domain(e.to_string(), justification);
            }
            Err(e) => state.fail_stage("extract_content", &e.to_string()),
        }
    }

    // -------------------------------------------------------------------------
    // Stage 3: summary
    // -------------------------------------------------------------------------

    async fn generate_summary(&self, state: &mut PipelineState) {
        if state.has_error {
            return;
        }
        let user = prompts::summary_user(&state.content);
        match self
            .provider
            .generate(prompts::SUMMARY_SYSTEM, &user, &prompts::summary_schema())
            .await
        {
            Ok(response) => {
                state.summary = response
                    .content
                    .get("summary")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                self.merge_summary_details(state, &response.content);
                debug!(
                    tokens = response.usage.total(),
                    chars = state.summary.chars().count(),
                    "summary generated"
                );
            }
            Err(e) => state.fail_stage("generate_summary", &e.to_string()),
        }
    }

    /// Fold the non-empty detail fields of the summary response into the
    /// bundle metadata. The summary's city wins only when the metadata gave
    /// none.
    fn merge_summary_details(&self, state: &mut PipelineState, content: &Value) {
        for key in SUMMARY_DETAIL_KEYS {
            if let Some(value) = content.get(*key).and_then(Value::as_str)
                && !value.trim().is_empty()
            {
                state
                    .metadata
                    .insert((*key).to_string(), Value::String(value.to_string()));
            }
        }
        if state.city == crate::ingest::metadata::UNKNOWN_BID_NUMBER
            && let Some(city) = content.get("city").and_then(Value::as_str)
            && !city.trim().is_empty()
        {
            state.city = city.to_string();
        }
    }

    // -------------------------------------------------------------------------
    // Stage 4: target
    // -------------------------------------------------------------------------

    async fn analyze_target(&self, state: &mut PipelineState, request: &AnalysisRequest) {
        if state.has_error {
            return;
        }
        if request.force_match {
            info!("target match forced by request");
            state.target_match = true;
            return;
        }

        let user = prompts::target_user(&request.target, &self.target_context(state));
        match self
            .provider
            .generate(prompts::TARGET_SYSTEM, &user, &prompts::target_schema())
            .await
        {
            Ok(response) => match response.content.get("target_match").and_then(Value::as_bool) {
                Some(matched) => {
                    state.target_match = matched;
                    debug!(target_match = matched, "target analyzed");
                }
                None => state.fail_stage(
                    "analyze_target",
                    "resposta do analista de alvo sem o campo target_match",
                ),
            },
            Err(e) => state.fail_stage("analyze_target", &e.to_string()),
        }
    }

    /// Context the target stage reasons over: the summary plus the detail
    /// fields the summary stage merged. The raw corpus stays out of this
    /// prompt to bound token use.
    fn target_context(&self, state: &PipelineState) -> String {
        let mut context = state.summary.clone();
        for key in ["object", "specifications", "quantities"] {
            if let Some(value) = state.metadata.get(key).and_then(Value::as_str)
                && !value.trim().is_empty()
            {
                context.push_str(&format!("\n{key}: {value}"));
            }
        }
        context
    }

    // -------------------------------------------------------------------------
    // Stage 5: threshold
    // -------------------------------------------------------------------------

    async fn check_threshold(&self, state: &mut PipelineState, request: &AnalysisRequest) {
        if state.has_error {
            return;
        }
        // Rules 1 and 2 need no model calls
        if request.threshold == 0 {
            state.threshold_match = ThresholdMatch::True;
            return;
        }
        if !state.target_match {
            state.threshold_match = ThresholdMatch::False;
            return;
        }

        let chunks = split_text(
            &state.content,
            self.options.chunk_size,
            self.options.chunk_overlap,
        );
        let chunk_total = chunks.len();
        let mut estimates = Vec::new();
        let mut degradations: Vec<String> = Vec::new();

        for chunk in &chunks {
            let user =
                prompts::quantity_user(&request.target, chunk.index, chunk_total, &chunk.text);
            let response = match self
                .provider
                .generate(prompts::QUANTITY_SYSTEM, &user, &prompts::quantity_schema())
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    state.fail_stage("check_threshold", &e.to_string());
                    return;
                }
            };

            match parse_estimate(&response.content) {
                Ok(estimate) => {
                    debug!(
                        chunk = chunk.index,
                        quantity = estimate.total_quantity,
                        unit = %estimate.unit,
                        "chunk estimate"
                    );
                    estimates.push(estimate);
                }
                Err(e) => {
                    // Malformed estimates degrade the verdict, never abort it
                    warn!(chunk = chunk.index, error = %e, "chunk estimate discarded");
                    let reason = e.to_string();
                    if !degradations.contains(&reason) {
                        degradations.push(reason);
                    }
                }
            }
        }

        let reconciled = reconcile(&estimates, request.threshold, state.target_match);
        state.threshold_match = reconciled.threshold_match;

        // Audit trail carries the winning estimate and every discarded chunk
        let mut audit = if estimates.is_empty() {
            "nenhuma quantidade identificada".to_string()
        } else {
            reconciled.audit_string()
        };
        if !degradations.is_empty() {
            audit = format!("{audit}; trechos descartados: {}", degradations.join("; "));
        }
        state
            .metadata
            .insert(QUANTITIES_KEY.to_string(), Value::String(audit));
        info!(
            quantity = reconciled.total_quantity,
            threshold = request.threshold,
            status = %state.threshold_match,
            "threshold checked"
        );
    }

    // -------------------------------------------------------------------------
    // Stage 6: justification
    // -------------------------------------------------------------------------

    async fn generate_justification(&self, state: &mut PipelineState, request: &AnalysisRequest) {
        if state.has_error {
            return;
        }
        state.is_relevant = state.target_match
            && (request.threshold == 0 || state.threshold_match == ThresholdMatch::True);

        // Always generated: for relevant bundles the justification explains
        // what makes the edital relevant, otherwise why it was rejected
        let threshold_summary = state
            .metadata
            .get(QUANTITIES_KEY)
            .and_then(Value::as_str)
            .unwrap_or("nenhuma quantidade identificada");
        let user = prompts::justification_user(
            &request.target,
            request.threshold,
            state.target_match,
            state.is_relevant,
            threshold_summary,
            &state.summary,
        );
        match self
            .provider
            .generate(
                prompts::JUSTIFICATION_SYSTEM,
                &user,
                &prompts::justification_schema(),
            )
            .await
        {
            Ok(response) => {
                state.justification = response
                    .content
                    .get("justification")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
            }
            Err(e) => state.fail_stage("generate_justification", &e.to_string()),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{LlmProvider, LlmResponse};
    use crate::types::{BidError, Result};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    struct ScriptedProvider {
        responses: Mutex<VecDeque<Value>>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<Value>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(Vec::new()),
            })
        }

        /// Recorded (system, user) prompt pairs, in call order.
        fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }

        fn systems(&self) -> Vec<String> {
            self.calls().into_iter().map(|(s, _)| s).collect()
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn generate(&self, system: &str, user: &str, _schema: &Value) -> Result<LlmResponse> {
            self.calls
                .lock()
                .unwrap()
                .push((system.to_string(), user.to_string()));
            let next = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| BidError::LlmApi("scripted responses exhausted".to_string()))?;
            Ok(LlmResponse::content_only(next))
        }

        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "test"
        }
    }

    fn bundle() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("metadata.json"),
            br#"{"bid_number":"PE 042/2026","agency":"Prefeitura de Curitiba/PR"}"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("edital.txt"),
            "Objeto: aquisição de 750 tablets educacionais para a rede municipal.".as_bytes(),
        )
        .unwrap();
        dir
    }

    fn request(dir: &tempfile::TempDir, threshold: u64, force_match: bool) -> AnalysisRequest {
        AnalysisRequest {
            bundle_dir: dir.path().to_path_buf(),
            target: "tablet".to_string(),
            threshold,
            force_match,
        }
    }

    fn pipeline(provider: Arc<ScriptedProvider>) -> AnalysisPipeline {
        AnalysisPipeline::new(provider, PipelineOptions::default())
    }

    #[tokio::test]
    async fn test_relevant_when_quantity_sufficient() {
        let provider = ScriptedProvider::new(vec![
            json!({"summary": "Aquisição de tablets.", "object": "tablets educacionais"}),
            json!({"target_match": true}),
            json!({"total_quantity": 750, "unit": "unidades", "explanation": "Objeto"}),
            json!({"justification": "O edital prevê 750 tablets, acima do mínimo de 500."}),
        ]);
        let dir = bundle();
        let report = pipeline(provider.clone())
            .run(&request(&dir, 500, false))
            .await;

        assert_eq!(report.bid_number, "PE 042/2026");
        assert_eq!(report.city, "Prefeitura de Curitiba/PR");
        assert!(report.target_match);
        assert_eq!(report.threshold_match, crate::types::ThresholdMatch::True);
        assert!(report.is_relevant);
        assert_eq!(report.summary, "Aquisição de tablets.");
        // relevant bundles get a justification too
        assert!(report.justification.contains("acima do mínimo"));
        assert_eq!(provider.calls().len(), 4);
    }

    #[tokio::test]
    async fn test_target_stage_sees_summary_not_raw_content() {
        let provider = ScriptedProvider::new(vec![
            json!({"summary": "Resumo dos tablets.", "object": "tablets educacionais"}),
            json!({"target_match": true}),
            json!({"justification": "Relevante."}),
        ]);
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("edital.txt"),
            b"MARCADOR-CORPO-BRUTO aparece apenas no documento original",
        )
        .unwrap();
        pipeline(provider.clone())
            .run(&request(&dir, 0, false))
            .await;

        let calls = provider.calls();
        let (_, target_user) = calls
            .iter()
            .find(|(system, _)| system == prompts::TARGET_SYSTEM)
            .expect("target stage ran");
        assert!(!target_user.contains("MARCADOR-CORPO-BRUTO"));
        assert!(target_user.contains("Resumo dos tablets."));
        assert!(target_user.contains("object: tablets educacionais"));
    }

    #[tokio::test]
    async fn test_not_relevant_when_quantity_insufficient() {
        let provider = ScriptedProvider::new(vec![
            json!({"summary": "Aquisição de tablets."}),
            json!({"target_match": true}),
            json!({"total_quantity": 750, "unit": "unidades", "explanation": "Objeto"}),
            json!({"justification": "O edital prevê apenas 750 unidades, abaixo do mínimo de 1000."}),
        ]);
        let dir = bundle();
        let report = pipeline(provider).run(&request(&dir, 1000, false)).await;

        assert!(report.target_match);
        assert_eq!(report.threshold_match, crate::types::ThresholdMatch::False);
        assert!(!report.is_relevant);
        assert!(report.justification.contains("750"));
    }

    #[tokio::test]
    async fn test_zero_threshold_skips_quantity_calls() {
        let provider = ScriptedProvider::new(vec![
            json!({"summary": "Resumo."}),
            json!({"target_match": true}),
            json!({"justification": "Relevante para o alvo, sem volume mínimo exigido."}),
        ]);
        let dir = bundle();
        let report = pipeline(provider.clone())
            .run(&request(&dir, 0, false))
            .await;

        assert!(report.is_relevant);
        assert_eq!(report.threshold_match, crate::types::ThresholdMatch::True);
        let systems = provider.systems();
        assert_eq!(systems.len(), 3);
        assert!(!systems.iter().any(|s| s == prompts::QUANTITY_SYSTEM));
    }

    #[tokio::test]
    async fn test_force_match_skips_target_analysis() {
        let provider = ScriptedProvider::new(vec![
            json!({"summary": "Resumo."}),
            json!({"total_quantity": 750, "unit": "unidades", "explanation": "Objeto"}),
            json!({"justification": "Relevante com 750 unidades."}),
        ]);
        let dir = bundle();
        let report = pipeline(provider.clone())
            .run(&request(&dir, 500, true))
            .await;

        assert!(report.target_match);
        assert!(report.is_relevant);
        assert!(!provider.systems().iter().any(|s| s == prompts::TARGET_SYSTEM));
    }

    #[tokio::test]
    async fn test_no_target_match_shortcuts_threshold() {
        let provider = ScriptedProvider::new(vec![
            json!({"summary": "Resumo de obra civil."}),
            json!({"target_match": false}),
            json!({"justification": "O edital trata de obra civil, sem relação com tablets."}),
        ]);
        let dir = bundle();
        let report = pipeline(provider.clone())
            .run(&request(&dir, 500, false))
            .await;

        assert!(!report.target_match);
        assert_eq!(report.threshold_match, crate::types::ThresholdMatch::False);
        assert!(!report.is_relevant);
        // no quantity calls once the target failed
        assert!(!provider.systems().iter().any(|s| s == prompts::QUANTITY_SYSTEM));
    }

    #[tokio::test]
    async fn test_malformed_quantity_degrades_to_inconclusive() {
        let provider = ScriptedProvider::new(vec![
            json!({"summary": "Resumo."}),
            json!({"target_match": true}),
            json!({"resposta": "sem os campos esperados"}),
            json!({"justification": "Não foi possível confirmar a quantidade mínima."}),
        ]);
        let dir = bundle();
        let report = pipeline(provider).run(&request(&dir, 500, false)).await;

        assert_eq!(
            report.threshold_match,
            crate::types::ThresholdMatch::Inconclusive
        );
        assert!(!report.is_relevant);
    }

    #[tokio::test]
    async fn test_audit_trail_keeps_every_discarded_chunk_reason() {
        let provider = ScriptedProvider::new(vec![
            json!({"explanation": "sem quantidade nem unidade"}),
            json!({"total_quantity": 5, "unit": "  "}),
        ]);
        let pipeline = AnalysisPipeline::new(
            provider,
            PipelineOptions {
                chunk_size: 40,
                chunk_overlap: 0,
                ..PipelineOptions::default()
            },
        );

        let mut state = PipelineState::new("/tmp/edital");
        state.target_match = true;
        state.content = "aquisição de tablets para a rede municipal, com entrega em duas etapas"
            .to_string();
        let req = AnalysisRequest {
            bundle_dir: "/tmp/edital".into(),
            target: "tablet".to_string(),
            threshold: 500,
            force_match: false,
        };
        pipeline.check_threshold(&mut state, &req).await;

        assert_eq!(state.threshold_match, ThresholdMatch::Inconclusive);
        let audit = state.metadata["quantities"].as_str().unwrap();
        assert!(audit.contains("campos ausentes"));
        assert!(audit.contains("unidade inválida"));
    }

    #[tokio::test]
    async fn test_only_metadata_bundle_is_terminal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("metadata.json"), br#"{"bid_number":"9"}"#).unwrap();

        let provider = ScriptedProvider::new(vec![]);
        let report = pipeline(provider.clone())
            .run(&request(&dir, 500, false))
            .await;

        assert_eq!(report.bid_number, "9");
        assert!(!report.is_relevant);
        assert!(report.justification.contains("Apenas metadata.json"));
        // no model calls for a terminal bundle
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_bundle_marked_not_relevant() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("grande.txt"), "x".repeat(500).as_bytes()).unwrap();

        let provider = ScriptedProvider::new(vec![]);
        let options = PipelineOptions {
            ingest: IngestLimits {
                max_content_chars: 100,
                ..IngestLimits::default()
            },
            ..PipelineOptions::default()
        };
        let report = AnalysisPipeline::new(provider, options)
            .run(&request(&dir, 500, false))
            .await;

        assert!(!report.is_relevant);
        assert!(report.justification.contains("muito grande"));
        assert!(report.justification.contains("não relevante"));
    }

    #[tokio::test]
    async fn test_stage_failure_wrapped_in_justification() {
        // empty script makes the summary stage fail
        let provider = ScriptedProvider::new(vec![]);
        let dir = bundle();
        let report = pipeline(provider).run(&request(&dir, 500, false)).await;

        assert!(!report.is_relevant);
        assert!(report.justification.starts_with("Erro em generate_summary:"));
    }
}
