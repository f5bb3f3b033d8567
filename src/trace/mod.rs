// Parse trace recording for step-by-step replay

use crate::parser::ast::SourceLocation;
use crate::parser::diagnostics::DiagnosticKind;
use crate::parser::grammar::{Rule, Symbol};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// One move of the parse engine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TraceAction {
    Shift { symbol: Symbol, lexeme: String },
    Reduce { rule: Rule },
    Accept,
    Halt { kind: DiagnosticKind },
}

impl fmt::Display for TraceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceAction::Shift { symbol, lexeme } => write!(f, "shift {} '{}'", symbol, lexeme),
            TraceAction::Reduce { rule } => write!(f, "reduce {:>2}: {}", rule.id(), rule),
            TraceAction::Accept => write!(f, "accept"),
            TraceAction::Halt { kind } => write!(f, "halt ({})", kind),
        }
    }
}

/// A recorded move with the parse stack symbols after it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceStep {
    pub action: TraceAction,
    pub stack: Vec<Symbol>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceError {
    #[error("parse trace limit exceeded: {limit} steps")]
    LimitExceeded { limit: usize },
}

/// Records parse steps up to a fixed count
#[derive(Debug)]
pub struct TraceRecorder {
    steps: Vec<TraceStep>,
    max_steps: usize,
    truncated: bool,
}

impl TraceRecorder {
    pub fn new(max_steps: usize) -> Self {
        TraceRecorder {
            steps: Vec::new(),
            max_steps,
            truncated: false,
        }
    }

    /// Add a step to the trace
    pub fn push(&mut self, step: TraceStep) -> Result<(), TraceError> {
        if self.steps.len() >= self.max_steps {
            self.truncated = true;
            return Err(TraceError::LimitExceeded {
                limit: self.max_steps,
            });
        }

        self.steps.push(step);
        Ok(())
    }

    /// Forget every recorded step
    pub fn clear(&mut self) {
        self.steps.clear();
        self.truncated = false;
    }

    pub fn steps(&self) -> &[TraceStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Whether a push was refused because the limit was reached
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Most steps this recorder keeps
    pub fn step_limit(&self) -> usize {
        self.max_steps
    }

    /// Every rule reduced at least once
    pub fn rules_fired(&self) -> FxHashSet<Rule> {
        self.steps
            .iter()
            .filter_map(|step| match step.action {
                TraceAction::Reduce { rule } => Some(rule),
                _ => None,
            })
            .collect()
    }

    /// How often each rule was reduced
    pub fn reduction_counts(&self) -> FxHashMap<Rule, usize> {
        let mut counts = FxHashMap::default();
        for step in &self.steps {
            if let TraceAction::Reduce { rule } = step.action {
                *counts.entry(rule).or_insert(0) += 1;
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reduce(rule: Rule) -> TraceStep {
        TraceStep {
            action: TraceAction::Reduce { rule },
            stack: vec![rule.lhs()],
            location: SourceLocation::new(1, 1),
        }
    }

    #[test]
    fn test_limit_exceeded() {
        let mut recorder = TraceRecorder::new(2);
        recorder.push(reduce(Rule::Empty)).unwrap();
        recorder.push(reduce(Rule::StatementEmpty)).unwrap();

        assert_eq!(
            recorder.push(reduce(Rule::Empty)),
            Err(TraceError::LimitExceeded { limit: 2 })
        );
        assert!(recorder.is_truncated());
        assert_eq!(recorder.len(), 2);
        assert_eq!(recorder.step_limit(), 2);

        recorder.clear();
        assert!(recorder.is_empty());
        assert!(!recorder.is_truncated());
    }

    #[test]
    fn test_reduction_statistics() {
        let mut recorder = TraceRecorder::new(10);
        recorder.push(reduce(Rule::Empty)).unwrap();
        recorder.push(reduce(Rule::Empty)).unwrap();
        recorder.push(reduce(Rule::ArgTailEmpty)).unwrap();

        let fired = recorder.rules_fired();
        assert_eq!(fired.len(), 2);
        assert!(fired.contains(&Rule::ArgTailEmpty));
        assert_eq!(recorder.reduction_counts()[&Rule::Empty], 2);
    }

    #[test]
    fn test_action_display() {
        let shift = TraceAction::Shift {
            symbol: Symbol::Identifier,
            lexeme: "x".to_string(),
        };
        assert_eq!(shift.to_string(), "shift Identifier 'x'");
        assert_eq!(
            TraceAction::Reduce { rule: Rule::Empty }.to_string(),
            "reduce 61: <Empty> ::="
        );
    }
}
