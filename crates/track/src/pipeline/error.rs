// ---------------------------------------------------------------------------
// PipelineError: the stage that stopped an edit request
// ---------------------------------------------------------------------------

use std::fmt;

use crate::kernel::ExecutionOpError;
use crate::plan::PlanParseError;
use crate::rules::RuleLoadError;
use crate::store::StoreError;

/// A fatal failure of one pipeline stage.
///
/// Recoverable problems never surface here; they are recorded as
/// diagnostics on the outcome instead.
#[derive(Debug)]
pub enum PipelineError {
    /// The rule repository could not be loaded, so nothing can be matched.
    Rules(RuleLoadError),
    /// The persisted plan was rejected under strict parsing.
    PlanParse(PlanParseError),
    /// Reading or writing the plan or seed log failed.
    Store(StoreError),
    /// An op failed while executing the saved plan.
    Execution(ExecutionOpError),
}

impl PipelineError {
    /// Short name of the failing stage, for logs and result listings.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Rules(_) => "rules",
            PipelineError::PlanParse(_) => "load",
            PipelineError::Store(_) => "store",
            PipelineError::Execution(_) => "execute",
        }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Rules(e) => write!(f, "Rule repository error: {e}"),
            PipelineError::PlanParse(e) => write!(f, "Plan parse error: {e}"),
            PipelineError::Store(e) => write!(f, "Store error: {e}"),
            PipelineError::Execution(e) => write!(f, "Execution error: {e}"),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Rules(e) => Some(e),
            PipelineError::PlanParse(e) => Some(e),
            PipelineError::Store(e) => Some(e),
            PipelineError::Execution(e) => Some(e),
        }
    }
}

impl From<RuleLoadError> for PipelineError {
    fn from(e: RuleLoadError) -> Self {
        PipelineError::Rules(e)
    }
}

impl From<PlanParseError> for PipelineError {
    fn from(e: PlanParseError) -> Self {
        PipelineError::PlanParse(e)
    }
}

impl From<StoreError> for PipelineError {
    fn from(e: StoreError) -> Self {
        PipelineError::Store(e)
    }
}

impl From<ExecutionOpError> for PipelineError {
    fn from(e: ExecutionOpError) -> Self {
        PipelineError::Execution(e)
    }
}
