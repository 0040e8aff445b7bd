#![forbid(unsafe_code)]

//! Rule conditions and their combination.
//!
//! A [`Rule`] is an ordered list of [`Condition`]s plus an all-required flag
//! and the callbacks to run on success or failure.
//!
//! # Evaluation
//!
//! Conditions are evaluated in list order against one window-size snapshot.
//!
//! - **All required**: stop at the first unmatched condition (failure);
//!   succeed only if every condition matched.
//! - **Any required**: stop at the first matched condition (success); fail
//!   only if none matched.
//!
//! Conditions after the deciding one are never evaluated, so predicates with
//! side effects observe the short-circuit.

use std::fmt;
use std::rc::Rc;

use astral_core::DebugLog;

use crate::breakpoint::{Breakpoint, WindowSize};
use crate::error::Result;

/// How a breakpoint condition compares the window width to a breakpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Comparator {
    /// `width < max_width`
    Lt,
    /// `width <= max_width`
    Le,
    /// `width > min_width`
    Gt,
    /// `width >= min_width`
    Ge,
    /// Width inside `[min_width, max_width]` and height at least `min_height`.
    #[default]
    Eq,
}

impl Comparator {
    /// Parse a selector string. Anything but an exact selector behaves as `=`.
    #[must_use]
    pub fn parse(selector: &str) -> Self {
        match selector {
            "<" => Self::Lt,
            "<=" => Self::Le,
            ">" => Self::Gt,
            ">=" => Self::Ge,
            _ => Self::Eq,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Eq => "=",
        }
    }

    #[must_use]
    pub fn matches(self, size: WindowSize, bp: &Breakpoint) -> bool {
        match self {
            Self::Lt => size.width < bp.max_width,
            Self::Le => size.width <= bp.max_width,
            Self::Gt => size.width > bp.min_width,
            Self::Ge => size.width >= bp.min_width,
            Self::Eq => bp.contains(size),
        }
    }
}

impl From<&str> for Comparator {
    fn from(selector: &str) -> Self {
        Self::parse(selector)
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One test inside a rule.
#[derive(Clone)]
pub enum Condition {
    /// Compare the window width against the breakpoint named `label`.
    Breakpoint { label: String, comparator: Comparator },
    /// Arbitrary zero-argument check.
    Predicate(Rc<dyn Fn() -> bool>),
}

impl Condition {
    #[must_use]
    pub fn breakpoint(label: impl Into<String>, comparator: impl Into<Comparator>) -> Self {
        Self::Breakpoint {
            label: label.into(),
            comparator: comparator.into(),
        }
    }

    #[must_use]
    pub fn predicate(check: impl Fn() -> bool + 'static) -> Self {
        Self::Predicate(Rc::new(check))
    }

    /// Evaluate against `size`, resolving labels through `lookup`.
    pub fn evaluate(
        &self,
        size: WindowSize,
        lookup: &impl Fn(&str) -> Result<Breakpoint>,
    ) -> Result<bool> {
        match self {
            Self::Breakpoint { label, comparator } => {
                let bp = lookup(label)?;
                Ok(comparator.matches(size, &bp))
            }
            Self::Predicate(check) => Ok(check()),
        }
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Breakpoint { label, comparator } => f
                .debug_struct("Breakpoint")
                .field("label", label)
                .field("comparator", comparator)
                .finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

type Action = Rc<dyn Fn()>;

/// Conditions plus combination mode and outcome callbacks.
#[derive(Clone)]
pub struct Rule {
    conditions: Vec<Condition>,
    all_required: bool,
    on_success: Option<Action>,
    on_fail: Option<Action>,
}

impl Rule {
    #[must_use]
    pub fn new(conditions: Vec<Condition>, all_required: bool) -> Self {
        Self {
            conditions,
            all_required,
            on_success: None,
            on_fail: None,
        }
    }

    /// Every condition must match.
    #[must_use]
    pub fn all(conditions: Vec<Condition>) -> Self {
        Self::new(conditions, true)
    }

    /// At least one condition must match.
    #[must_use]
    pub fn any(conditions: Vec<Condition>) -> Self {
        Self::new(conditions, false)
    }

    #[must_use]
    pub fn on_success(mut self, action: impl Fn() + 'static) -> Self {
        self.on_success = Some(Rc::new(action));
        self
    }

    #[must_use]
    pub fn on_fail(mut self, action: impl Fn() + 'static) -> Self {
        self.on_fail = Some(Rc::new(action));
        self
    }

    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    #[must_use]
    pub fn all_required(&self) -> bool {
        self.all_required
    }

    /// A rule can run only with at least one condition and a success action.
    #[must_use]
    pub fn is_runnable(&self) -> bool {
        !self.conditions.is_empty() && self.on_success.is_some()
    }

    /// Combine the conditions under this rule's mode. Lookup failures abort
    /// evaluation and propagate.
    pub fn matches(
        &self,
        size: WindowSize,
        lookup: &impl Fn(&str) -> Result<Breakpoint>,
        debug: &DebugLog,
    ) -> Result<bool> {
        for (index, condition) in self.conditions.iter().enumerate() {
            let matched = condition.evaluate(size, lookup)?;
            debug.log(|| format!("Condition {index} matched: {matched}"));
            if self.all_required && !matched {
                return Ok(false);
            }
            if !self.all_required && matched {
                return Ok(true);
            }
        }
        Ok(self.all_required && !self.conditions.is_empty())
    }

    /// Run the success or failure action for `matched`.
    pub fn fire(&self, matched: bool) {
        let action = if matched {
            &self.on_success
        } else {
            &self.on_fail
        };
        if let Some(action) = action {
            action();
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("conditions", &self.conditions)
            .field("all_required", &self.all_required)
            .field("on_success", &self.on_success.is_some())
            .field("on_fail", &self.on_fail.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breakpoint::BreakpointTable;
    use crate::error::LayoutError;
    use std::cell::Cell;

    fn standard_lookup() -> impl Fn(&str) -> Result<Breakpoint> {
        let table = BreakpointTable::standard();
        move |label: &str| {
            table
                .get(label)
                .copied()
                .ok_or_else(|| LayoutError::NoBreakpointForLabel {
                    label: label.to_owned(),
                })
        }
    }

    fn quiet() -> DebugLog {
        DebugLog::new("Astral.layout")
    }

    fn counted(result: bool, count: &Rc<Cell<u32>>) -> Condition {
        let count = Rc::clone(count);
        Condition::predicate(move || {
            count.set(count.get() + 1);
            result
        })
    }

    #[test]
    fn comparator_parse_and_display() {
        for selector in ["<", "<=", ">", ">=", "="] {
            assert_eq!(Comparator::parse(selector).as_str(), selector);
        }
        assert_eq!(Comparator::parse("~"), Comparator::Eq);
        assert_eq!(Comparator::from(">="), Comparator::Ge);
        assert_eq!(Comparator::from(" >= "), Comparator::Eq);
        assert_eq!(Comparator::from("=>"), Comparator::Eq);
    }

    #[test]
    fn comparator_semantics() {
        let large = Breakpoint::new(1280.0, 1920.0, 646.0);
        let at = |w: f64, h: f64| WindowSize::new(w, h);

        assert!(Comparator::Le.matches(at(1920.0, 0.0), &large));
        assert!(!Comparator::Lt.matches(at(1920.0, 0.0), &large));
        assert!(Comparator::Ge.matches(at(1280.0, 0.0), &large));
        assert!(!Comparator::Gt.matches(at(1280.0, 0.0), &large));
        assert!(Comparator::Eq.matches(at(1500.0, 646.0), &large));
        assert!(!Comparator::Eq.matches(at(1500.0, 645.0), &large));
    }

    #[test]
    fn all_required_matches_when_every_condition_does() {
        let rule = Rule::all(vec![
            Condition::breakpoint("ExtraLarge", "<="),
            Condition::breakpoint("Large", ">="),
        ]);
        let lookup = standard_lookup();
        assert_eq!(
            rule.matches(WindowSize::new(1920.0, 1080.0), &lookup, &quiet()),
            Ok(true)
        );
        assert_eq!(
            rule.matches(WindowSize::new(500.0, 80.0), &lookup, &quiet()),
            Ok(false)
        );
    }

    #[test]
    fn all_required_short_circuits_on_first_failure() {
        let count = Rc::new(Cell::new(0));
        let rule = Rule::all(vec![counted(false, &count), counted(true, &count)]);
        let lookup = standard_lookup();
        assert_eq!(
            rule.matches(WindowSize::default(), &lookup, &quiet()),
            Ok(false)
        );
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn any_required_short_circuits_on_first_success() {
        let count = Rc::new(Cell::new(0));
        let rule = Rule::any(vec![
            counted(false, &count),
            counted(true, &count),
            counted(true, &count),
        ]);
        let lookup = standard_lookup();
        assert_eq!(
            rule.matches(WindowSize::default(), &lookup, &quiet()),
            Ok(true)
        );
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn any_required_fails_when_nothing_matches() {
        let count = Rc::new(Cell::new(0));
        let rule = Rule::any(vec![counted(false, &count), counted(false, &count)]);
        let lookup = standard_lookup();
        assert_eq!(
            rule.matches(WindowSize::default(), &lookup, &quiet()),
            Ok(false)
        );
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn unknown_label_propagates() {
        let rule = Rule::any(vec![Condition::breakpoint("Gigantic", "=")]);
        let lookup = standard_lookup();
        assert_eq!(
            rule.matches(WindowSize::new(100.0, 100.0), &lookup, &quiet()),
            Err(LayoutError::NoBreakpointForLabel {
                label: "Gigantic".into()
            })
        );
    }

    #[test]
    fn lookup_failure_after_short_circuit_is_not_reached() {
        let rule = Rule::any(vec![
            Condition::predicate(|| true),
            Condition::breakpoint("Gigantic", "="),
        ]);
        let lookup = standard_lookup();
        assert_eq!(
            rule.matches(WindowSize::default(), &lookup, &quiet()),
            Ok(true)
        );
    }

    #[test]
    fn fire_runs_exactly_one_action() {
        let hits = Rc::new(Cell::new((0, 0)));
        let ok = Rc::clone(&hits);
        let ko = Rc::clone(&hits);
        let rule = Rule::all(vec![Condition::predicate(|| true)])
            .on_success(move || ok.set((ok.get().0 + 1, ok.get().1)))
            .on_fail(move || ko.set((ko.get().0, ko.get().1 + 1)));

        rule.fire(true);
        rule.fire(false);
        rule.fire(false);
        assert_eq!(hits.get(), (1, 2));
    }

    #[test]
    fn missing_fail_action_is_noop() {
        let rule = Rule::all(vec![Condition::predicate(|| false)]).on_success(|| {});
        rule.fire(false);
        assert!(rule.is_runnable());
        assert!(!Rule::all(vec![]).on_success(|| {}).is_runnable());
        assert!(!Rule::all(vec![Condition::predicate(|| true)]).is_runnable());
    }

    #[test]
    fn debug_hides_closures() {
        let rule = Rule::any(vec![
            Condition::breakpoint("Large", "<"),
            Condition::predicate(|| true),
        ]);
        let dbg = format!("{rule:?}");
        assert!(dbg.contains("Large"));
        assert!(dbg.contains("Predicate(..)"));
    }
}
