use super::model::GenerationMode;
use std::time::Duration;

const PERCENT_PER_TICK: u64 = 2;
const TICK: Duration = Duration::from_millis(100);
const STAGE_INTERVAL: Duration = Duration::from_secs(2);
// The backend decides when processing ends; the bar never claims 100% first.
const MAX_SIMULATED_PERCENT: u64 = 99;

const HUMMING_STAGES: [&str; 3] = [
    "Analyzing your humming...",
    "Composing with AI...",
    "Rendering audio...",
];

const CONVERSION_STAGES: [&str; 3] = [
    "Analyzing the music file...",
    "Running genre conversion...",
    "Converting musical style...",
];

/// Indeterminate progress shown while a run is processing.
///
/// Purely time based: it reflects how long the user has waited, not how far
/// the backend has got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingProgress {
    pub percent: u8,
    pub stage: usize,
    pub label: &'static str,
}

impl ProcessingProgress {
    pub fn at(mode: GenerationMode, elapsed: Duration) -> Self {
        let stages = Self::stages(mode);
        let ticks = (elapsed.as_millis() / TICK.as_millis()) as u64;
        let percent = (ticks * PERCENT_PER_TICK).min(MAX_SIMULATED_PERCENT) as u8;
        let stage = ((elapsed.as_millis() / STAGE_INTERVAL.as_millis()) as usize).min(stages.len() - 1);

        Self {
            percent,
            stage,
            label: stages[stage],
        }
    }

    pub fn stages(mode: GenerationMode) -> &'static [&'static str] {
        match mode {
            GenerationMode::Humming => &HUMMING_STAGES,
            GenerationMode::GenreConversion => &CONVERSION_STAGES,
        }
    }
}
