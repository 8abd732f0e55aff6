#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    LoadingConfig,
    CheckingCache,
    LoadingCachedResult,
    LoadingInputs,
    RunningCascade,
    SavingResults,
    Completed,
}

#[derive(Debug, Clone)]
pub struct RunProgressEvent {
    pub stage: RunStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
}

impl RunProgressEvent {
    pub fn stage(stage: RunStage, elapsed_wall_s: f64, message: Option<String>) -> Self {
        Self {
            stage,
            elapsed_wall_s,
            message,
        }
    }
}

impl RunStage {
    pub fn label(self) -> &'static str {
        match self {
            RunStage::LoadingConfig => "config",
            RunStage::CheckingCache => "cache",
            RunStage::LoadingCachedResult => "cached",
            RunStage::LoadingInputs => "inputs",
            RunStage::RunningCascade => "cascade",
            RunStage::SavingResults => "save",
            RunStage::Completed => "done",
        }
    }
}
