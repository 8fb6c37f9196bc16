//! Translation of raw browser input (key names, button data attributes) into
//! calculator actions. Kept free of web-sys types so it runs natively.

use crate::calculator::{Action, Operator};

const HANDLED_CHARS: &str = "0123456789+-*/.=";

/// Map a `KeyboardEvent.key` value to an action.
pub fn action_for_key(key: &str) -> Option<Action> {
    match key {
        "=" | "Enter" => Some(Action::Equals),
        "." => Some(Action::DecimalPoint),
        "Backspace" => Some(Action::Backspace),
        "Escape" => Some(Action::Clear),
        _ => digit(key)
            .map(Action::Digit)
            .or_else(|| Operator::from_symbol(key).map(Action::Operator)),
    }
}

/// Whether the browser's default handling of `key` should be suppressed.
pub fn prevents_default(key: &str) -> bool {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => HANDLED_CHARS.contains(c),
        _ => matches!(key, "Enter" | "Backspace" | "Escape"),
    }
}

/// Map a calculator button to an action from its data attributes.
///
/// Operator buttons without a `data-operator` attribute are the backspace key.
pub fn action_for_button(
    data_number: Option<&str>,
    data_operator: Option<&str>,
    data_action: Option<&str>,
    is_operator_button: bool,
) -> Option<Action> {
    if let Some(n) = data_number {
        return digit(n).map(Action::Digit);
    }
    if let Some(op) = data_operator.filter(|s| !s.is_empty()) {
        return Operator::from_symbol(op).map(Action::Operator);
    }
    if is_operator_button {
        return Some(Action::Backspace);
    }
    match data_action? {
        "equals" => Some(Action::Equals),
        "clear" => Some(Action::Clear),
        "clearEntry" => Some(Action::ClearEntry),
        "decimal" => Some(Action::DecimalPoint),
        _ => None,
    }
}

fn digit(s: &str) -> Option<u8> {
    match s.as_bytes() {
        [b @ b'0'..=b'9'] => Some(b - b'0'),
        _ => None,
    }
}
