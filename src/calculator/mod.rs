//! Calculator core: input state machine plus the perturbation engine.
//!
//! A [`Calculator`] owns one session (current entry, pending operation and
//! mode). Every user action is one call that runs to completion and returns
//! an [`Outcome`] describing what the display should now show. The calculator
//! never touches a display surface; see [`crate::dom`] for the browser side.

mod evaluate;
mod format;
mod operator;
mod perturb;

pub use evaluate::{CalcError, evaluate, evaluate_symbol, parse_operand};
pub use format::{decimal_places, format_number};
pub use operator::Operator;
pub use perturb::{RandomSource, SequenceRandom, perturb, round_half_up, round_to};
pub use rand::rngs::SmallRng;

use rand::SeedableRng;
use tracing::{debug, trace};

/// Text shown in place of a result when the computation failed.
pub const ERROR_SENTINEL: &str = "Error";

const ZERO: &str = "0";

/// One user action, already validated by the input layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Digit(u8),
    DecimalPoint,
    Operator(Operator),
    Equals,
    Clear,
    ClearEntry,
    Backspace,
    ToggleMode,
}

/// Two-line display contents.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct RenderSnapshot {
    pub expression_text: String,
    pub result_text: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FeedbackKind {
    Wrong,
    Correct,
}

/// Emitted after every computed result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FeedbackEvent {
    pub kind: FeedbackKind,
}

/// Emitted when the mode is toggled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ModeChangedEvent {
    pub wrong_mode_enabled: bool,
}

/// Result of a single operation.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Outcome {
    pub snapshot: RenderSnapshot,
    pub feedback: Option<FeedbackEvent>,
    pub mode_changed: Option<ModeChangedEvent>,
}

impl Outcome {
    fn render(snapshot: RenderSnapshot) -> Self {
        Self { snapshot, feedback: None, mode_changed: None }
    }
}

/// Left operand and operator waiting for the right operand.
#[derive(Clone, Debug, PartialEq, Eq)]
struct PendingOp {
    operand: String,
    operator: Operator,
}

/// Calculator session state and the operations that mutate it.
#[derive(Debug, Clone)]
pub struct Calculator<R = SmallRng> {
    current: String,
    pending: Option<PendingOp>,
    reset_on_next_digit: bool,
    wrong_mode: bool,
    rng: R,
}

impl<R: RandomSource> Calculator<R> {
    pub fn new(wrong_mode: bool, rng: R) -> Self {
        Self {
            current: ZERO.to_string(),
            pending: None,
            reset_on_next_digit: false,
            wrong_mode,
            rng,
        }
    }

    pub fn current_entry(&self) -> &str {
        &self.current
    }

    pub fn pending_operand(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.operand.as_str())
    }

    pub fn pending_operator(&self) -> Option<Operator> {
        self.pending.as_ref().map(|p| p.operator)
    }

    pub fn wrong_mode_enabled(&self) -> bool {
        self.wrong_mode
    }

    pub fn is_error(&self) -> bool {
        self.current == ERROR_SENTINEL
    }

    /// Route an action to the matching operation.
    pub fn dispatch(&mut self, action: Action) -> Outcome {
        trace!(?action, "dispatch");
        match action {
            Action::Digit(d) => self.enter_digit(d),
            Action::DecimalPoint => self.enter_decimal_point(),
            Action::Operator(op) => self.enter_operator(op),
            Action::Equals => self.equals(),
            Action::Clear => self.clear(),
            Action::ClearEntry => self.clear_entry(),
            Action::Backspace => self.backspace(),
            Action::ToggleMode => self.toggle_mode(),
        }
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        let expression_text = match &self.pending {
            Some(p) => format!("{} {} {}", p.operand, p.operator, self.current),
            None => String::new(),
        };
        RenderSnapshot { expression_text, result_text: self.current.clone() }
    }

    /// Append a digit (0-9). Out-of-range values are ignored.
    pub fn enter_digit(&mut self, digit: u8) -> Outcome {
        if digit > 9 {
            return Outcome::render(self.snapshot());
        }
        self.start_fresh_entry_if_needed();
        let ch = char::from(b'0' + digit);
        if self.current == ZERO {
            self.current = ch.to_string();
        } else {
            self.current.push(ch);
        }
        Outcome::render(self.snapshot())
    }

    pub fn enter_decimal_point(&mut self) -> Outcome {
        self.start_fresh_entry_if_needed();
        if !self.current.contains('.') {
            self.current.push('.');
        }
        Outcome::render(self.snapshot())
    }

    /// Record `op` as the pending operator, first resolving an existing
    /// pending operation if a second operand has been typed.
    pub fn enter_operator(&mut self, op: Operator) -> Outcome {
        if self.is_error() {
            return Outcome::render(self.snapshot());
        }
        let mut feedback = None;
        let typed_second_operand = !self.reset_on_next_digit;
        if let Some(pending) = self.pending.take_if(|_| typed_second_operand) {
            feedback = Some(self.resolve(&pending));
            if self.is_error() {
                self.reset_on_next_digit = true;
                return Outcome { snapshot: self.snapshot(), feedback, mode_changed: None };
            }
        }
        self.pending = Some(PendingOp { operand: self.current.clone(), operator: op });
        self.reset_on_next_digit = true;
        Outcome { snapshot: self.snapshot(), feedback, mode_changed: None }
    }

    pub fn equals(&mut self) -> Outcome {
        if self.is_error() {
            return Outcome::render(self.snapshot());
        }
        let Some(pending) = self.pending.take() else {
            return Outcome::render(self.snapshot());
        };
        let expression_text = format!("{} {} {} =", pending.operand, pending.operator, self.current);
        let feedback = self.resolve(&pending);
        self.reset_on_next_digit = true;
        Outcome {
            snapshot: RenderSnapshot { expression_text, result_text: self.current.clone() },
            feedback: Some(feedback),
            mode_changed: None,
        }
    }

    /// Reset everything except the mode.
    pub fn clear(&mut self) -> Outcome {
        self.current = ZERO.to_string();
        self.pending = None;
        self.reset_on_next_digit = false;
        Outcome::render(self.snapshot())
    }

    pub fn clear_entry(&mut self) -> Outcome {
        self.current = ZERO.to_string();
        Outcome::render(self.snapshot())
    }

    pub fn backspace(&mut self) -> Outcome {
        if self.is_error() {
            self.current = ZERO.to_string();
        } else {
            self.current.pop();
            if self.current.is_empty() || self.current == "-" {
                self.current = ZERO.to_string();
            }
        }
        Outcome::render(self.snapshot())
    }

    pub fn toggle_mode(&mut self) -> Outcome {
        self.wrong_mode = !self.wrong_mode;
        debug!(wrong_mode = self.wrong_mode, "mode toggled");
        Outcome {
            snapshot: self.snapshot(),
            feedback: None,
            mode_changed: Some(ModeChangedEvent { wrong_mode_enabled: self.wrong_mode }),
        }
    }

    fn start_fresh_entry_if_needed(&mut self) {
        if self.reset_on_next_digit || self.is_error() {
            self.current = ZERO.to_string();
            self.reset_on_next_digit = false;
        }
    }

    /// Evaluate `pending` against the current entry and store the (possibly
    /// perturbed) result as the new current entry.
    fn resolve(&mut self, pending: &PendingOp) -> FeedbackEvent {
        self.current = match evaluate(&pending.operand, &self.current, pending.operator) {
            Ok(correct) => {
                let places = decimal_places(correct);
                let shown = perturb(correct, self.wrong_mode, places, &mut self.rng);
                debug!(correct, shown, wrong_mode = self.wrong_mode, "computed result");
                format_number(shown)
            }
            Err(err) => {
                debug!(%err, "computation failed");
                ERROR_SENTINEL.to_string()
            }
        };
        FeedbackEvent {
            kind: if self.wrong_mode { FeedbackKind::Wrong } else { FeedbackKind::Correct },
        }
    }
}

impl Calculator<SmallRng> {
    /// Calculator seeded from platform entropy.
    pub fn with_entropy(wrong_mode: bool) -> Result<Self, rand::Error> {
        Ok(Self::new(wrong_mode, SmallRng::from_rng(rand::rngs::OsRng)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn correct() -> Calculator<SequenceRandom> {
        Calculator::new(false, SequenceRandom::new([0.0]))
    }

    fn press(calc: &mut Calculator<SequenceRandom>, actions: &[Action]) -> Outcome {
        let mut outcome = Outcome::render(calc.snapshot());
        for &a in actions {
            outcome = calc.dispatch(a);
        }
        outcome
    }

    use Action::{Backspace, Clear, ClearEntry, DecimalPoint, Digit, Equals};
    const ADD: Action = Action::Operator(super::Operator::Add);
    const DIV: Action = Action::Operator(super::Operator::Divide);

    #[test]
    fn starts_at_zero() {
        let calc = correct();
        assert_eq!(calc.current_entry(), "0");
        assert_eq!(calc.snapshot(), RenderSnapshot { expression_text: String::new(), result_text: "0".into() });
    }

    #[test]
    fn leading_zero_is_replaced() {
        let mut calc = correct();
        press(&mut calc, &[Digit(0), Digit(0), Digit(7)]);
        assert_eq!(calc.current_entry(), "7");
    }

    #[test]
    fn out_of_range_digit_is_ignored() {
        let mut calc = correct();
        press(&mut calc, &[Digit(4), Digit(12)]);
        assert_eq!(calc.current_entry(), "4");
    }

    #[test]
    fn single_decimal_point() {
        let mut calc = correct();
        press(&mut calc, &[DecimalPoint, Digit(5), DecimalPoint, Digit(1)]);
        assert_eq!(calc.current_entry(), "0.51");
    }

    #[test]
    fn decimal_point_after_equals_starts_new_entry() {
        let mut calc = correct();
        press(&mut calc, &[Digit(1), DecimalPoint, Digit(5), ADD, Digit(2), Equals, DecimalPoint, Digit(7)]);
        assert_eq!(calc.current_entry(), "0.7");
        assert_eq!(calc.pending_operator(), None);
    }

    #[test]
    fn decimal_point_after_operator_starts_second_operand() {
        let mut calc = correct();
        let out = press(&mut calc, &[Digit(2), DecimalPoint, Digit(5), ADD, DecimalPoint]);
        assert_eq!(calc.current_entry(), "0.");
        assert_eq!(calc.pending_operand(), Some("2.5"));
        assert_eq!(out.snapshot.expression_text, "2.5 + 0.");
        let out = press(&mut calc, &[Digit(5), Equals]);
        assert_eq!(out.snapshot.result_text, "3");
    }

    #[test]
    fn operator_sets_pending_and_expression() {
        let mut calc = correct();
        let out = press(&mut calc, &[Digit(5), ADD]);
        assert_eq!(calc.pending_operand(), Some("5"));
        assert_eq!(calc.pending_operator(), Some(Operator::Add));
        assert_eq!(out.snapshot.expression_text, "5 + 5");
        assert!(out.feedback.is_none());
    }

    #[test]
    fn repeated_operator_replaces_pending_without_computing() {
        let mut calc = correct();
        let out = press(&mut calc, &[Digit(5), ADD, DIV]);
        assert!(out.feedback.is_none());
        assert_eq!(calc.pending_operator(), Some(Operator::Divide));
        assert_eq!(calc.pending_operand(), Some("5"));
    }

    #[test]
    fn equals_shows_full_expression() {
        let mut calc = correct();
        let out = press(&mut calc, &[Digit(5), ADD, Digit(5), Equals]);
        assert_eq!(out.snapshot.expression_text, "5 + 5 =");
        assert_eq!(out.snapshot.result_text, "10");
        assert_eq!(out.feedback, Some(FeedbackEvent { kind: FeedbackKind::Correct }));
        assert_eq!(calc.pending_operator(), None);
        assert_eq!(calc.pending_operand(), None);
    }

    #[test]
    fn equals_without_pending_is_noop() {
        let mut calc = correct();
        let out = press(&mut calc, &[Digit(9), Equals]);
        assert_eq!(out.snapshot.result_text, "9");
        assert!(out.feedback.is_none());
    }

    #[test]
    fn digit_after_equals_starts_new_entry() {
        let mut calc = correct();
        press(&mut calc, &[Digit(2), ADD, Digit(2), Equals, Digit(8)]);
        assert_eq!(calc.current_entry(), "8");
    }

    #[test]
    fn wrong_mode_perturbs_with_wrong_feedback() {
        // offset 1, positive sign
        let mut calc = Calculator::new(true, SequenceRandom::new([0.0, 0.0]));
        let out = press(&mut calc, &[Digit(2), ADD, Digit(2), Equals]);
        assert_eq!(out.snapshot.result_text, "5");
        assert_eq!(out.feedback, Some(FeedbackEvent { kind: FeedbackKind::Wrong }));
    }

    #[test]
    fn divide_by_zero_yields_error_sentinel() {
        let mut calc = Calculator::new(true, SequenceRandom::new([0.3]));
        let out = press(&mut calc, &[Digit(1), Digit(0), DIV, Digit(0), Equals]);
        assert_eq!(out.snapshot.result_text, ERROR_SENTINEL);
        assert!(calc.is_error());
    }

    #[test]
    fn error_ignores_operators_and_equals() {
        let mut calc = correct();
        press(&mut calc, &[Digit(1), DIV, Digit(0), Equals, ADD, Equals]);
        assert_eq!(calc.current_entry(), ERROR_SENTINEL);
        assert_eq!(calc.pending_operator(), None);
    }

    #[test]
    fn error_is_replaced_by_next_digit() {
        let mut calc = correct();
        press(&mut calc, &[Digit(1), DIV, Digit(0), Equals, Digit(3)]);
        assert_eq!(calc.current_entry(), "3");
    }

    #[test]
    fn chained_error_drops_pending_operation() {
        let mut calc = correct();
        let out = press(&mut calc, &[Digit(4), DIV, Digit(0), ADD]);
        assert_eq!(out.snapshot.result_text, ERROR_SENTINEL);
        assert_eq!(out.snapshot.expression_text, "");
        assert!(out.feedback.is_some());
        assert_eq!(calc.pending_operator(), None);
    }

    #[test]
    fn backspace_on_error_resets() {
        let mut calc = correct();
        press(&mut calc, &[Digit(1), DIV, Digit(0), Equals, Backspace]);
        assert_eq!(calc.current_entry(), "0");
    }

    #[test]
    fn backspace_on_negative_single_digit() {
        let mut calc = correct();
        press(&mut calc, &[Digit(2), Action::Operator(super::Operator::Subtract), Digit(9), Equals]);
        assert_eq!(calc.current_entry(), "-7");
        press(&mut calc, &[Backspace]);
        assert_eq!(calc.current_entry(), "0");
    }

    #[test]
    fn clear_entry_keeps_pending() {
        let mut calc = correct();
        press(&mut calc, &[Digit(6), ADD, Digit(3), ClearEntry]);
        assert_eq!(calc.current_entry(), "0");
        assert_eq!(calc.pending_operand(), Some("6"));
    }

    #[test]
    fn clear_keeps_mode() {
        let mut calc = Calculator::new(true, SequenceRandom::new([0.0]));
        press(&mut calc, &[Digit(6), ADD, Digit(3), Clear]);
        assert!(calc.wrong_mode_enabled());
        assert_eq!(calc.snapshot().expression_text, "");
        assert_eq!(calc.snapshot().result_text, "0");
    }

    #[test]
    fn toggle_emits_mode_event() {
        let mut calc = correct();
        let out = calc.toggle_mode();
        assert_eq!(out.mode_changed, Some(ModeChangedEvent { wrong_mode_enabled: true }));
        let out = calc.toggle_mode();
        assert_eq!(out.mode_changed, Some(ModeChangedEvent { wrong_mode_enabled: false }));
    }

    #[test]
    fn fractional_result_formats_cleanly() {
        let mut calc = correct();
        let out = press(&mut calc, &[Digit(1), DIV, Digit(4), Equals]);
        assert_eq!(out.snapshot.result_text, "0.25");
    }
}
