//! Decoding of Slurm compact job-state codes.

use std::str::FromStr;

/// Compact job states reported in the `ST` column of `squeue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlurmState {
    Pending,
    Suspended,
    Running,
    Completing,
    Completed,
    Failed,
    Preempted,
    Stopped,
}

impl SlurmState {
    pub fn code(&self) -> &'static str {
        match self {
            SlurmState::Pending => "PD",
            SlurmState::Suspended => "S",
            SlurmState::Running => "R",
            SlurmState::Completing => "CG",
            SlurmState::Completed => "CD",
            SlurmState::Failed => "F",
            SlurmState::Preempted => "PR",
            SlurmState::Stopped => "ST",
        }
    }
}

impl FromStr for SlurmState {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PD" => Ok(SlurmState::Pending),
            "S" => Ok(SlurmState::Suspended),
            "R" => Ok(SlurmState::Running),
            "CG" => Ok(SlurmState::Completing),
            "CD" => Ok(SlurmState::Completed),
            "F" => Ok(SlurmState::Failed),
            "PR" => Ok(SlurmState::Preempted),
            "ST" => Ok(SlurmState::Stopped),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for SlurmState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Container lifecycle phase a job state maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    Waiting,
    Running,
    Terminated,
}

impl std::fmt::Display for JobPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobPhase::Waiting => write!(f, "waiting"),
            JobPhase::Running => write!(f, "running"),
            JobPhase::Terminated => write!(f, "terminated"),
        }
    }
}

/// Decode the state column of a `squeue -o %t` listing.
///
/// Only the first token is considered. Anything that is not a known state
/// code decodes to `None`.
pub fn extract_state(output: &str) -> Option<SlurmState> {
    output.split_whitespace().next()?.parse().ok()
}

/// Map a decoded state onto a phase.
///
/// `None` (nothing recognizable in the scheduler output) is treated as a
/// finished job, same as the terminal codes.
pub fn classify(state: Option<SlurmState>) -> JobPhase {
    match state {
        Some(SlurmState::Pending | SlurmState::Suspended) => JobPhase::Waiting,
        Some(SlurmState::Running | SlurmState::Completing) => JobPhase::Running,
        Some(
            SlurmState::Completed
            | SlurmState::Failed
            | SlurmState::Preempted
            | SlurmState::Stopped,
        )
        | None => JobPhase::Terminated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [SlurmState; 8] = [
        SlurmState::Pending,
        SlurmState::Suspended,
        SlurmState::Running,
        SlurmState::Completing,
        SlurmState::Completed,
        SlurmState::Failed,
        SlurmState::Preempted,
        SlurmState::Stopped,
    ];

    #[test]
    fn codes_parse_back() {
        for state in ALL {
            assert_eq!(state.code().parse::<SlurmState>(), Ok(state));
        }
        assert!("XX".parse::<SlurmState>().is_err());
        assert!("pd".parse::<SlurmState>().is_err());
    }

    #[test]
    fn classification_table() {
        assert_eq!(classify(Some(SlurmState::Pending)), JobPhase::Waiting);
        assert_eq!(classify(Some(SlurmState::Suspended)), JobPhase::Waiting);
        assert_eq!(classify(Some(SlurmState::Running)), JobPhase::Running);
        assert_eq!(classify(Some(SlurmState::Completing)), JobPhase::Running);
        assert_eq!(classify(Some(SlurmState::Completed)), JobPhase::Terminated);
        assert_eq!(classify(Some(SlurmState::Failed)), JobPhase::Terminated);
        assert_eq!(classify(Some(SlurmState::Preempted)), JobPhase::Terminated);
        assert_eq!(classify(Some(SlurmState::Stopped)), JobPhase::Terminated);
        assert_eq!(classify(None), JobPhase::Terminated);
    }

    #[test]
    fn extract_from_state_column() {
        assert_eq!(extract_state("R\n"), Some(SlurmState::Running));
        assert_eq!(extract_state("  PD\n"), Some(SlurmState::Pending));
        assert_eq!(extract_state("ST"), Some(SlurmState::Stopped));
        assert_eq!(extract_state("S\n"), Some(SlurmState::Suspended));
    }

    #[test]
    fn extract_reads_only_the_first_token() {
        // A job named "R" in a wide listing must not be taken for a state.
        assert_eq!(extract_state("4242 batch R alice CD"), None);
        assert_eq!(extract_state("CD\nR\n"), Some(SlurmState::Completed));
    }

    #[test]
    fn extract_ignores_partial_matches() {
        assert_eq!(extract_state("RUNNING"), None);
        assert_eq!(extract_state("OOM\n"), None);
        assert_eq!(extract_state(""), None);
    }
}
