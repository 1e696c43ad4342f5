//! Outcome counters for the scattering analysis overlay

use serde::{Deserialize, Serialize};

/// Running tally of fired particles and their observed outcomes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScatterStats {
    pub fired: u64,
    pub deflected: u64,
    pub rebounded: u64,
}

impl ScatterStats {
    /// Particles counted as passing straight through.
    ///
    /// Includes particles still in flight whose outcome is not yet visible.
    pub fn passed(&self) -> u64 {
        self.fired.saturating_sub(self.deflected + self.rebounded)
    }

    fn ratio(&self, count: u64) -> f64 {
        if self.fired == 0 {
            0.0
        } else {
            count as f64 / self.fired as f64 * 100.0
        }
    }

    pub fn pass_percentage(&self) -> f64 {
        self.ratio(self.passed())
    }

    pub fn deflect_percentage(&self) -> f64 {
        self.ratio(self.deflected)
    }

    pub fn rebound_percentage(&self) -> f64 {
        self.ratio(self.rebounded)
    }

    /// Percentages formatted for display with one decimal
    pub fn formatted(&self) -> FormattedStats {
        FormattedStats {
            passed: format!("{:.1}", self.pass_percentage()),
            deflected: format!("{:.1}", self.deflect_percentage()),
            rebounded: format!("{:.1}", self.rebound_percentage()),
        }
    }
}

/// Display strings for the three outcome bars
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedStats {
    pub passed: String,
    pub deflected: String,
    pub rebounded: String,
}
