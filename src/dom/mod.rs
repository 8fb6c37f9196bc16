//! Browser presentation layer.
//!
//! Wires the calculator's buttons and keyboard to a [`Calculator`] and renders
//! each [`Outcome`] into the page. Expected markup (element ids / classes):
//!
//! - `#expression`, `#result`: the two display lines
//! - `#emojiReaction`: reaction glyph, shown while it carries class `show`
//! - `#modeBtn` containing `.mode-indicator`, plus `#modeText`
//! - `.subtitle`: temporarily replaced by the mode banner
//! - `.btn-number[data-number]`, `.btn-operator[data-operator]`,
//!   `[data-action]` buttons
//!
//! Missing elements are skipped; the calculator keeps working headless.

pub mod keys;

use std::cell::RefCell;

use rand::SeedableRng;
use rand::seq::SliceRandom;
use tracing::debug;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, window};

use crate::calculator::{
    Action, Calculator, FeedbackEvent, FeedbackKind, ModeChangedEvent, Outcome, RenderSnapshot,
    SmallRng,
};
use crate::config::CalculatorConfig;

// --- Feedback texts ---------------------------------------------------------

pub const WRONG_GLYPHS: &[&str] = &["😄", "🤪", "😅", "🙃", "😉", "🤔", "😏"];
pub const CORRECT_GLYPHS: &[&str] = &["✅", "🎯", "👍", "✨", "💯"];

impl FeedbackKind {
    pub fn glyphs(self) -> &'static [&'static str] {
        match self {
            FeedbackKind::Wrong => WRONG_GLYPHS,
            FeedbackKind::Correct => CORRECT_GLYPHS,
        }
    }
}

impl ModeChangedEvent {
    pub fn label(self) -> &'static str {
        if self.wrong_mode_enabled { "Wrong Mode" } else { "Correct Mode" }
    }

    pub fn indicator(self) -> &'static str {
        if self.wrong_mode_enabled { "🔴" } else { "🟢" }
    }

    pub fn banner(self) -> &'static str {
        if self.wrong_mode_enabled { "Math is optional 😄" } else { "Math is correct ✅" }
    }
}

// --- Presenter ----------------------------------------------------------------

/// Display surface driven by calculator outcomes.
pub trait Presenter {
    fn render(&mut self, snapshot: &RenderSnapshot);
    fn show_feedback(&mut self, event: &FeedbackEvent);
    fn show_mode_banner(&mut self, event: &ModeChangedEvent);

    fn present(&mut self, outcome: &Outcome) {
        self.render(&outcome.snapshot);
        if let Some(fb) = &outcome.feedback {
            self.show_feedback(fb);
        }
        if let Some(mc) = &outcome.mode_changed {
            self.show_mode_banner(mc);
        }
    }
}

/// Pick one reaction glyph for `kind`.
pub fn pick_glyph<R: rand::Rng + ?Sized>(kind: FeedbackKind, rng: &mut R) -> &'static str {
    kind.glyphs().choose(rng).copied().unwrap_or_default()
}

/// [`Presenter`] writing into the live document.
pub struct DomPresenter {
    doc: Document,
    config: CalculatorConfig,
    rng: SmallRng,
    subtitle_text: Option<String>,
}

impl DomPresenter {
    pub fn new(doc: Document, config: CalculatorConfig, rng: SmallRng) -> Self {
        let subtitle_text = doc
            .query_selector(".subtitle")
            .ok()
            .flatten()
            .and_then(|el| el.text_content());
        Self { doc, config, rng, subtitle_text }
    }

    fn element(&self, id: &str) -> Option<Element> {
        let el = self.doc.get_element_by_id(id);
        if el.is_none() {
            debug!(id, "element missing");
        }
        el
    }

    fn select(&self, selector: &str) -> Option<Element> {
        let el = self.doc.query_selector(selector).ok().flatten();
        if el.is_none() {
            debug!(selector, "element missing");
        }
        el
    }

    /// Update the mode label and indicator without the transient banner.
    pub fn sync_mode(&self, event: &ModeChangedEvent) {
        if let Some(el) = self.element("modeText") {
            el.set_text_content(Some(event.label()));
        }
        if let Some(el) = self.select("#modeBtn .mode-indicator") {
            el.set_text_content(Some(event.indicator()));
        }
    }
}

impl Presenter for DomPresenter {
    fn render(&mut self, snapshot: &RenderSnapshot) {
        if let Some(el) = self.element("expression") {
            el.set_text_content(Some(&snapshot.expression_text));
        }
        if let Some(el) = self.element("result") {
            el.set_text_content(Some(&snapshot.result_text));
        }
    }

    fn show_feedback(&mut self, event: &FeedbackEvent) {
        let Some(el) = self.element("emojiReaction") else { return };
        el.set_text_content(Some(pick_glyph(event.kind, &mut self.rng)));
        if el.class_list().add_1("show").is_err() {
            return;
        }
        schedule(self.config.feedback_ms, move || {
            let _ = el.class_list().remove_1("show");
        });
    }

    fn show_mode_banner(&mut self, event: &ModeChangedEvent) {
        self.sync_mode(event);
        let Some(subtitle) = self.select(".subtitle") else { return };
        subtitle.set_text_content(Some(event.banner()));
        let restore = self.subtitle_text.clone();
        schedule(self.config.banner_ms, move || {
            subtitle.set_text_content(restore.as_deref());
        });
    }
}

/// Fire-and-forget `setTimeout`.
fn schedule(delay_ms: u32, f: impl FnOnce() + 'static) {
    let Some(win) = window() else { return };
    let cb = Closure::once_into_js(f);
    let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
    if win
        .set_timeout_with_callback_and_timeout_and_arguments_0(cb.unchecked_ref(), delay)
        .is_err()
    {
        debug!("setTimeout failed");
    }
}

// --- Session & listeners ----------------------------------------------------

struct Session {
    calc: Calculator,
    presenter: DomPresenter,
}

thread_local! {
    static SESSION: RefCell<Option<Session>> = const { RefCell::new(None) };
}

fn handle(action: Action) {
    SESSION.with(|cell| {
        if let Some(session) = cell.borrow_mut().as_mut() {
            let outcome = session.calc.dispatch(action);
            session.presenter.present(&outcome);
        }
    });
}

/// Build the session, attach listeners and render the initial display.
pub fn mount(config: CalculatorConfig) -> Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let calc = Calculator::with_entropy(config.start_in_wrong_mode)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let glyph_rng =
        SmallRng::from_rng(rand::rngs::OsRng).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let mut presenter = DomPresenter::new(doc.clone(), config, glyph_rng);
    presenter.sync_mode(&ModeChangedEvent { wrong_mode_enabled: calc.wrong_mode_enabled() });
    presenter.render(&calc.snapshot());

    SESSION.with(|cell| cell.replace(Some(Session { calc, presenter })));

    attach_buttons(&doc)?;
    attach_mode_button(&doc)?;
    attach_keyboard(&doc)?;
    debug!("calculator mounted");
    Ok(())
}

fn attach_buttons(doc: &Document) -> Result<(), JsValue> {
    let buttons = doc.query_selector_all(".btn-number, .btn-operator, [data-action]")?;
    for i in 0..buttons.length() {
        let Some(button) = buttons.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
            continue;
        };
        let target = button.clone();
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            let action = keys::action_for_button(
                target.get_attribute("data-number").as_deref(),
                target.get_attribute("data-operator").as_deref(),
                target.get_attribute("data-action").as_deref(),
                target.class_list().contains("btn-operator"),
            );
            if let Some(action) = action {
                handle(action);
            }
        }) as Box<dyn FnMut(_)>);
        button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}

fn attach_mode_button(doc: &Document) -> Result<(), JsValue> {
    let Some(button) = doc.get_element_by_id("modeBtn") else {
        debug!("mode button missing");
        return Ok(());
    };
    let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
        handle(Action::ToggleMode);
    }) as Box<dyn FnMut(_)>);
    button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn attach_keyboard(doc: &Document) -> Result<(), JsValue> {
    let closure = Closure::wrap(Box::new(move |evt: web_sys::KeyboardEvent| {
        let key = evt.key();
        if keys::prevents_default(&key) {
            evt.prevent_default();
        }
        if let Some(action) = keys::action_for_key(&key) {
            handle(action);
        }
    }) as Box<dyn FnMut(_)>);
    doc.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}
