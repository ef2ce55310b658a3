use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::application::ChatClient;
use crate::domain::{
    AnalysisResult, AnalysisState, DomainError, FinancialSnapshot, RetrievalResult, Stage1Result,
};

const INTERPRETER_SYSTEM_PROMPT: &str = "\
Role: Financial Data Interpreter.
Goal: Convert raw financial metrics into clear, factual descriptions.
You are a financial data analyst who interprets financial metrics factually. \
You explain what numbers mean without giving investment advice. \
You always provide analysis when given financial data.";

const ANALYST_SYSTEM_PROMPT: &str = "\
Role: Islamic Finance Researcher.
Goal: Find relevant Islamic finance information related to stock summaries.
You are an Islamic finance expert. When given a stock summary, you search \
Islamic finance texts for relevant information about the company's compliance \
with Islamic principles. You focus on interest rates, debt levels, business \
sectors, and Sharia compliance. You present factual findings without giving advice.";

/// Two dependent generation stages: a financial interpretation of the
/// snapshot, then an Islamic-finance assessment grounded in the retrieved
/// passages and the first stage's paragraph.
pub struct AnalyzeComplianceUseCase {
    chat_client: Arc<dyn ChatClient>,
}

impl AnalyzeComplianceUseCase {
    pub fn new(chat_client: Arc<dyn ChatClient>) -> Self {
        Self { chat_client }
    }

    /// Runs both stages in order. Any failure aborts the whole analysis; no
    /// partial paragraph is returned.
    pub async fn execute(
        &self,
        snapshot: &FinancialSnapshot,
        retrieval: &RetrievalResult,
    ) -> Result<AnalysisResult, DomainError> {
        let start_time = Instant::now();
        let mut run = AnalysisRun::new();

        run.advance(AnalysisState::Stage1Running);
        let stage1 = match self.interpret(snapshot).await {
            Ok(stage1) => stage1,
            Err(e) => return Err(run.fail(e)),
        };
        run.advance(AnalysisState::Stage1Done);

        run.advance(AnalysisState::Stage2Running);
        let assessment = match self.assess(&stage1, snapshot, retrieval).await {
            Ok(text) => text,
            Err(e) => return Err(run.fail(e)),
        };
        run.advance(AnalysisState::Complete);

        info!(
            "Analysis complete with {} in {:.2}s",
            self.chat_client.model_name(),
            start_time.elapsed().as_secs_f64()
        );
        Ok(AnalysisResult::new(stage1, assessment))
    }

    /// Stage one: describe what the metrics indicate.
    pub async fn interpret(&self, snapshot: &FinancialSnapshot) -> Result<Stage1Result, DomainError> {
        let prompt = interpretation_prompt(snapshot);
        let text = self
            .generate(AnalysisState::Stage1Running, INTERPRETER_SYSTEM_PROMPT, &prompt)
            .await?;
        Ok(Stage1Result::new(text))
    }

    /// Stage two. Requires a finished [`Stage1Result`].
    pub async fn assess(
        &self,
        stage1: &Stage1Result,
        snapshot: &FinancialSnapshot,
        retrieval: &RetrievalResult,
    ) -> Result<String, DomainError> {
        if retrieval.is_empty() {
            warn!("No retrieved passages, assessing without Islamic finance context");
        }
        let prompt = assessment_prompt(stage1, snapshot, retrieval);
        self.generate(AnalysisState::Stage2Running, ANALYST_SYSTEM_PROMPT, &prompt)
            .await
    }

    async fn generate(
        &self,
        stage: AnalysisState,
        system: &str,
        user: &str,
    ) -> Result<String, DomainError> {
        debug!("Prompting {} for {}", self.chat_client.model_name(), stage);
        let text = self
            .chat_client
            .complete(system, user)
            .await
            .map_err(|e| DomainError::generation(stage, e.to_string()))?;

        let text = text.trim();
        if text.is_empty() {
            return Err(DomainError::generation(stage, "model returned an empty response"));
        }
        Ok(text.to_string())
    }
}

/// Tracks and logs state transitions of a single analysis.
struct AnalysisRun {
    state: AnalysisState,
}

impl AnalysisRun {
    fn new() -> Self {
        Self {
            state: AnalysisState::Idle,
        }
    }

    fn advance(&mut self, next: AnalysisState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid transition {} -> {}",
            self.state,
            next
        );
        debug!("Analysis {} -> {}", self.state, next);
        self.state = next;
    }

    fn fail(&mut self, error: DomainError) -> DomainError {
        warn!("Analysis failed during {}: {}", self.state, error);
        self.advance(AnalysisState::Failed);
        error
    }
}

fn interpretation_prompt(snapshot: &FinancialSnapshot) -> String {
    format!(
        "TASK: Interpret the following financial metrics and write a summary paragraph.

FINANCIAL METRICS:
{metrics}

REQUIREMENTS:
1. Explain what a debt-to-equity ratio of this level typically indicates
2. Explain what the interest income percentage reveals about revenue sources
3. Describe the overall financial structure these metrics suggest
4. Use factual, descriptive language
5. Do not refuse - this is standard financial data interpretation
6. Do not give investment advice or recommendations

Write as: \"This company's financial metrics show...\"

EXPECTED OUTPUT: A factual paragraph interpreting the financial metrics.",
        metrics = snapshot.metrics_block()
    )
}

fn assessment_prompt(
    stage1: &Stage1Result,
    snapshot: &FinancialSnapshot,
    retrieval: &RetrievalResult,
) -> String {
    format!(
        "FINANCIAL SUMMARY FROM THE PREVIOUS TASK:
{summary}

FINANCIAL METRICS:
{metrics}

ISLAMIC FINANCE CONTEXT FROM SHARIAH TEXTS:
{context}

INSTRUCTIONS:
1. Review the financial summary from the previous task
2. Use only the Islamic finance context above to analyze:
   - The company's business sector and its Islamic permissibility
   - Islamic perspectives on the debt levels mentioned
   - Islamic views on interest income (if any)
   - General Sharia compliance considerations
3. Do not introduce claims that are not supported by the context above
4. Write a paragraph presenting your findings based on the Islamic texts provided
5. Focus on factual Islamic finance principles, not investment advice

Format your response as: \"Based on Islamic finance principles, this company...\"

EXPECTED OUTPUT: A paragraph presenting Islamic finance findings related to the stock.",
        summary = stage1.interpretation(),
        metrics = snapshot.metrics_block(),
        context = retrieval.context()
    )
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use super::*;
    use crate::domain::{Chunk, RetrievedPassage};

    /// Replays scripted replies and records every prompt it receives.
    struct ScriptedChat {
        replies: Mutex<VecDeque<Result<String, DomainError>>>,
        prompts: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedChat {
        fn new(replies: Vec<Result<String, DomainError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatClient for ScriptedChat {
        async fn complete(&self, system: &str, user: &str) -> Result<String, DomainError> {
            self.prompts
                .lock()
                .await
                .push((system.to_string(), user.to_string()));
            self.replies
                .lock()
                .await
                .pop_front()
                .unwrap_or_else(|| Err(DomainError::transport("no scripted reply")))
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    fn snapshot() -> FinancialSnapshot {
        FinancialSnapshot::new("Technology", 0.75, Some(1.2)).with_ticker("MSFT")
    }

    fn retrieval() -> RetrievalResult {
        RetrievalResult::new(
            "summary",
            vec![
                RetrievedPassage::new(Chunk::new(0, "Riba is prohibited.", "fiqh.pdf"), 0.8),
                RetrievedPassage::new(Chunk::new(3, "Debt below one third is tolerated.", "fiqh.pdf"), 0.7),
            ],
        )
    }

    #[tokio::test]
    async fn stage_two_receives_stage_one_output_and_context() {
        let chat = Arc::new(ScriptedChat::new(vec![
            Ok("This company's financial metrics show moderate leverage.".into()),
            Ok("Based on Islamic finance principles, this company is borderline.".into()),
        ]));
        let use_case = AnalyzeComplianceUseCase::new(chat.clone());

        let result = use_case.execute(&snapshot(), &retrieval()).await.unwrap();

        assert_eq!(
            result.interpretation(),
            "This company's financial metrics show moderate leverage."
        );
        assert_eq!(
            result.assessment(),
            "Based on Islamic finance principles, this company is borderline."
        );

        let prompts = chat.prompts.lock().await;
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].0.contains("Financial Data Interpreter"));
        assert!(prompts[0].1.contains("sector: Technology"));
        assert!(prompts[0].1.contains("debt_ratio: 1.2"));
        assert!(prompts[1].0.contains("Islamic Finance Researcher"));
        assert!(prompts[1].1.contains("moderate leverage"));
        assert!(prompts[1].1.contains("Riba is prohibited.\n\nDebt below one third is tolerated."));
    }

    #[tokio::test]
    async fn stage_one_failure_skips_stage_two() {
        let chat = Arc::new(ScriptedChat::new(vec![Err(DomainError::transport(
            "connection refused",
        ))]));
        let use_case = AnalyzeComplianceUseCase::new(chat.clone());

        let err = use_case.execute(&snapshot(), &retrieval()).await.unwrap_err();

        assert!(matches!(
            err,
            DomainError::Generation {
                stage: AnalysisState::Stage1Running,
                ..
            }
        ));
        assert_eq!(chat.prompts.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn stage_two_failure_discards_stage_one_output() {
        let chat = Arc::new(ScriptedChat::new(vec![
            Ok("This company's financial metrics show low debt.".into()),
            Err(DomainError::transport("HTTP 500")),
        ]));
        let use_case = AnalyzeComplianceUseCase::new(chat);

        let err = use_case.execute(&snapshot(), &retrieval()).await.unwrap_err();

        assert!(matches!(
            err,
            DomainError::Generation {
                stage: AnalysisState::Stage2Running,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn blank_response_is_a_generation_failure() {
        let chat = Arc::new(ScriptedChat::new(vec![Ok("   \n".into())]));
        let use_case = AnalyzeComplianceUseCase::new(chat);

        let err = use_case.execute(&snapshot(), &retrieval()).await.unwrap_err();
        assert!(err.is_generation());
    }

    #[tokio::test]
    async fn empty_retrieval_still_runs_stage_two() {
        let chat = Arc::new(ScriptedChat::new(vec![
            Ok("Interpretation.".into()),
            Ok("Assessment.".into()),
        ]));
        let use_case = AnalyzeComplianceUseCase::new(chat.clone());

        let result = use_case
            .execute(&snapshot(), &RetrievalResult::empty("summary"))
            .await
            .unwrap();

        assert_eq!(result.assessment(), "Assessment.");
        let prompts = chat.prompts.lock().await;
        assert!(prompts[1]
            .1
            .contains("ISLAMIC FINANCE CONTEXT FROM SHARIAH TEXTS:\n\n\nINSTRUCTIONS:"));
    }
}
