//! Progress reporting for palette fingerprinting and mosaic assembly

use crate::io::configuration::PROGRESS_BAR_WIDTH;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::LazyLock;

/// Phase of a generation that a progress report refers to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProgressStage {
    /// Palette images being decoded and fingerprinted
    Fingerprinting,
    /// Grid rows being selected and composited
    Assembly,
}

impl ProgressStage {
    /// Label shown next to the stage's progress bar
    pub const fn label(self) -> &'static str {
        match self {
            Self::Fingerprinting => "Fingerprinting",
            Self::Assembly => "Assembling",
        }
    }
}

/// Receives percentage updates during a generation
///
/// Reports are fire-and-forget: nothing an observer does affects the result,
/// and observers may be called from worker threads during fingerprinting.
pub trait ProgressObserver: Send + Sync {
    /// Accept a completion percentage in 0-100 for `stage`
    fn report(&self, stage: ProgressStage, percent: u8);
}

/// `round(100 * done / total)`, saturating at 100
pub fn percent_complete(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let percent = (100.0 * done as f64 / total as f64).round();
    percent.clamp(0.0, 100.0) as u8
}

static STAGE_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template(&format!(
            "{{prefix:>14}} [{{bar:{PROGRESS_BAR_WIDTH}.cyan/blue}}] {{pos:>3}}%"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

/// Terminal progress bars, one per stage
pub struct ProgressManager {
    multi_progress: MultiProgress,
    fingerprint_bar: ProgressBar,
    assembly_bar: ProgressBar,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressManager {
    /// Create both stage bars at 0%
    pub fn new() -> Self {
        let multi_progress = MultiProgress::new();
        let fingerprint_bar = multi_progress.add(Self::stage_bar(ProgressStage::Fingerprinting));
        let assembly_bar = multi_progress.add(Self::stage_bar(ProgressStage::Assembly));

        Self {
            multi_progress,
            fingerprint_bar,
            assembly_bar,
        }
    }

    fn stage_bar(stage: ProgressStage) -> ProgressBar {
        let bar = ProgressBar::new(100);
        bar.set_style(STAGE_STYLE.clone());
        bar.set_prefix(stage.label());
        bar
    }

    const fn bar(&self, stage: ProgressStage) -> &ProgressBar {
        match stage {
            ProgressStage::Fingerprinting => &self.fingerprint_bar,
            ProgressStage::Assembly => &self.assembly_bar,
        }
    }

    /// Last reported percentage for `stage`
    pub fn position(&self, stage: ProgressStage) -> u64 {
        self.bar(stage).position()
    }

    /// Whether both stage bars have been finished
    pub fn is_finished(&self) -> bool {
        self.fingerprint_bar.is_finished() && self.assembly_bar.is_finished()
    }

    /// Clean up all progress displays
    pub fn finish(&self) {
        self.fingerprint_bar.finish();
        self.assembly_bar.finish();
        let _ = self.multi_progress.clear();
    }
}

impl ProgressObserver for ProgressManager {
    fn report(&self, stage: ProgressStage, percent: u8) {
        self.bar(stage).set_position(u64::from(percent.min(100)));
    }
}
