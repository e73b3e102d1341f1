use std::fmt;

/// How the best pose was chosen from a docking log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionStrategy {
    /// Taken from the first row of the clustering summary.
    Cluster,
    /// Lowest energy among individual run records.
    RunScan,
}

/// The lowest-energy pose found in one docking log.
#[derive(Debug, Clone, PartialEq)]
pub struct BestPose {
    pub ligand: String,
    /// Estimated free energy of binding in kcal/mol; more negative is better.
    pub energy: f64,
    pub run: u32,
    pub cluster_size: Option<u32>,
    pub strategy: SelectionStrategy,
    pub atom_lines: Vec<String>,
}

/// Outcome of checking a pose against the energy cutoff and cluster-size floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoseClass {
    Acceptable,
    Weak,
}

impl PoseClass {
    pub fn label(self) -> &'static str {
        match self {
            PoseClass::Acceptable => "acceptable",
            PoseClass::Weak => "weak binding",
        }
    }
}

impl fmt::Display for PoseClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Status label used by the docking summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingStatus {
    Favorable,
    Moderate,
    Failed,
}

impl BindingStatus {
    /// `Favorable` strictly below `threshold`, `Moderate` otherwise, `Failed` without a result.
    pub fn classify(energy: Option<f64>, threshold: f64) -> Self {
        match energy {
            Some(e) if e < threshold => BindingStatus::Favorable,
            Some(_) => BindingStatus::Moderate,
            None => BindingStatus::Failed,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BindingStatus::Favorable => "favorable",
            BindingStatus::Moderate => "moderate",
            BindingStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for BindingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_status_uses_strict_threshold() {
        assert_eq!(BindingStatus::classify(Some(-7.0), -6.0), BindingStatus::Favorable);
        assert_eq!(BindingStatus::classify(Some(-6.0), -6.0), BindingStatus::Moderate);
        assert_eq!(BindingStatus::classify(Some(-2.5), -6.0), BindingStatus::Moderate);
        assert_eq!(BindingStatus::classify(None, -6.0), BindingStatus::Failed);
    }

    #[test]
    fn labels_are_human_readable() {
        assert_eq!(PoseClass::Weak.to_string(), "weak binding");
        assert_eq!(BindingStatus::Favorable.to_string(), "favorable");
    }
}
