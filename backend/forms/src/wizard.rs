//! Form Wizard component.
//!
//! A forward-only state machine over four stages:
//!
//! ```text
//! fields ──finalize──▶ configure ──▶ style ──▶ preview ──submit──▶ (webhook)
//! ```
//!
//! The selection becomes the field list exactly once, when leaving `fields`;
//! afterwards fields can be edited but never added or removed. `restart`
//! is the only way back.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use logging::{EventLogger, SessionEvent};
use serde::Serialize;
use tracing::{debug, info};
use vozform_core::{Notice, Notifier, PhaseCell, PhaseTag, VozError};

use crate::catalog;
use crate::field::{FieldPatch, FormField};
use crate::render::render_markup;
use crate::style::{FormStyle, StylePatch};
use crate::submit::{FormSink, FormSubmission};

pub const MSG_SUBMITTED: &str = "Formulário enviado com sucesso!";
pub const MSG_SUBMIT_FAILED: &str = "Erro ao enviar o formulário.";
pub const MSG_MISSING_DATA: &str = "Não foi possível obter o HTML do formulário ou o ID.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WizardStep {
    Fields,
    Configure,
    Style,
    Preview,
}

impl WizardStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fields => "fields",
            Self::Configure => "configure",
            Self::Style => "style",
            Self::Preview => "preview",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubmitPhase {
    Idle,
    Submitting,
}

impl PhaseTag for SubmitPhase {
    const IDLE: Self = SubmitPhase::Idle;

    fn to_raw(self) -> u8 {
        self as u8
    }

    fn from_raw(raw: u8) -> Self {
        match raw {
            1 => SubmitPhase::Submitting,
            _ => SubmitPhase::Idle,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct WizardOptions {
    /// Refuse to finalize an empty selection. Off by default: an empty form
    /// can be configured, styled and submitted.
    pub require_selection: bool,
}

/// The final fields paired with the style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormConfig {
    pub fields: Vec<FormField>,
    pub style: FormStyle,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardSnapshot {
    pub session_id: Option<String>,
    pub step: WizardStep,
    pub selected_field_ids: Vec<String>,
    pub fields: Vec<FormField>,
    pub style: FormStyle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReceipt {
    pub id: String,
    pub html_bytes: usize,
}

/// Build one field per id, in order, from catalog defaults.
pub fn materialize_fields(ids: &[String]) -> Result<Vec<FormField>, VozError> {
    ids.iter()
        .map(|id| {
            catalog::find(id)
                .map(FormField::from_predefined)
                .ok_or_else(|| VozError::InvariantViolation(format!("'{id}' is not a catalog field")))
        })
        .collect()
}

#[derive(Debug)]
struct WizardState {
    step: WizardStep,
    selected: Vec<String>,
    fields: Vec<FormField>,
    style: FormStyle,
}

impl WizardState {
    fn new() -> Self {
        Self {
            step: WizardStep::Fields,
            selected: Vec::new(),
            fields: Vec::new(),
            style: FormStyle::default(),
        }
    }

    fn require(&self, step: WizardStep, action: &str) -> Result<(), VozError> {
        if self.step == step {
            Ok(())
        } else {
            Err(VozError::InvalidTransition {
                stage: self.step.as_str().to_string(),
                action: action.to_string(),
            })
        }
    }
}

pub struct FormWizard {
    state: Mutex<WizardState>,
    submitting: PhaseCell<SubmitPhase>,
    session_id: Option<String>,
    options: WizardOptions,
    notifier: Arc<dyn Notifier>,
}

impl FormWizard {
    /// `session_id` correlates this run with an external record; it is
    /// required to submit.
    pub fn new(session_id: Option<String>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            state: Mutex::new(WizardState::new()),
            submitting: PhaseCell::new(),
            session_id,
            options: WizardOptions::default(),
            notifier,
        }
    }

    pub fn with_options(mut self, options: WizardOptions) -> Self {
        self.options = options;
        self
    }

    fn state(&self) -> MutexGuard<'_, WizardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn step(&self) -> WizardStep {
        self.state().step
    }

    pub fn snapshot(&self) -> WizardSnapshot {
        let state = self.state();
        WizardSnapshot {
            session_id: self.session_id.clone(),
            step: state.step,
            selected_field_ids: state.selected.clone(),
            fields: state.fields.clone(),
            style: state.style.clone(),
        }
    }

    pub fn form_config(&self) -> FormConfig {
        let state = self.state();
        FormConfig {
            fields: state.fields.clone(),
            style: state.style.clone(),
        }
    }

    // -- fields -------------------------------------------------------------

    pub fn select_field(&self, id: &str) -> Result<(), VozError> {
        self.toggle_field(id, true)
    }

    pub fn deselect_field(&self, id: &str) -> Result<(), VozError> {
        self.toggle_field(id, false)
    }

    /// Check or uncheck a catalog field. Re-checking is a no-op.
    pub fn toggle_field(&self, id: &str, checked: bool) -> Result<(), VozError> {
        let mut state = self.state();
        state.require(WizardStep::Fields, "change the field selection")?;
        if catalog::find(id).is_none() {
            return Err(VozError::InvariantViolation(format!("'{id}' is not a catalog field")));
        }
        let present = state.selected.iter().any(|s| s == id);
        match (checked, present) {
            (true, false) => state.selected.push(id.to_string()),
            (false, true) => state.selected.retain(|s| s != id),
            _ => {}
        }
        Ok(())
    }

    pub fn finalize_field_selection(&self) -> Result<(), VozError> {
        let mut state = self.state();
        state.require(WizardStep::Fields, "finalize the field selection")?;
        if state.selected.is_empty() && self.options.require_selection {
            return Err(VozError::EmptySelection);
        }
        state.fields = materialize_fields(&state.selected)?;
        state.step = WizardStep::Configure;
        debug!(fields = state.fields.len(), "Field selection finalized");
        Ok(())
    }

    // -- configure ----------------------------------------------------------

    pub fn update_field(&self, index: usize, patch: FieldPatch) -> Result<(), VozError> {
        let mut state = self.state();
        state.require(WizardStep::Configure, "update a field")?;
        let len = state.fields.len();
        let field = state
            .fields
            .get_mut(index)
            .ok_or(VozError::IndexOutOfRange { index, len })?;
        field.apply(patch);
        Ok(())
    }

    pub fn proceed_to_style(&self) -> Result<(), VozError> {
        let mut state = self.state();
        state.require(WizardStep::Configure, "move on to styling")?;
        state.step = WizardStep::Style;
        Ok(())
    }

    // -- style --------------------------------------------------------------

    pub fn update_style(&self, patch: StylePatch) -> Result<(), VozError> {
        let mut state = self.state();
        state.require(WizardStep::Style, "update the style")?;
        state.style.apply(patch)
    }

    pub fn proceed_to_preview(&self) -> Result<(), VozError> {
        let mut state = self.state();
        state.require(WizardStep::Style, "open the preview")?;
        state.step = WizardStep::Preview;
        Ok(())
    }

    // -- preview ------------------------------------------------------------

    pub fn render_preview(&self) -> Result<String, VozError> {
        let state = self.state();
        state.require(WizardStep::Preview, "render the preview")?;
        Ok(render_markup(&state.fields, &state.style))
    }

    /// Send the session id and rendered markup to `sink`.
    ///
    /// Without a session id nothing is sent. The outcome is always
    /// acknowledged through the notifier.
    pub async fn submit_form(&self, sink: &dyn FormSink) -> Result<SubmitReceipt, VozError> {
        let (html, field_count) = {
            let state = self.state();
            state.require(WizardStep::Preview, "submit the form")?;
            (render_markup(&state.fields, &state.style), state.fields.len())
        };
        let session = self.session_id.as_deref().unwrap_or("anonymous");

        let id = match self.session_id.as_deref() {
            Some(id) if !id.is_empty() && !html.is_empty() => id.to_string(),
            _ => {
                let err = VozError::MissingSubmissionData(
                    "a session id and the rendered form are both required".into(),
                );
                self.fail(session, &err, MSG_MISSING_DATA.to_string());
                return Err(err);
            }
        };

        let _submitting = self.submitting.try_enter(SubmitPhase::Submitting)?;
        let submission = FormSubmission { id, html };
        match sink.submit(&submission).await {
            Ok(()) => {
                info!(session = %session, fields = field_count, "Form submitted");
                EventLogger::log_event(
                    session,
                    SessionEvent::FormSubmitted {
                        field_count,
                        html_bytes: submission.html.len(),
                    },
                );
                self.notifier.notify(Notice::Info(MSG_SUBMITTED.to_string()));
                Ok(SubmitReceipt {
                    id: submission.id,
                    html_bytes: submission.html.len(),
                })
            }
            Err(e) => {
                let message = match &e {
                    VozError::NetworkFailure {
                        status: Some(_),
                        message,
                    } => format!("Erro ao enviar o formulário: {message}"),
                    _ => MSG_SUBMIT_FAILED.to_string(),
                };
                self.fail(session, &e, message);
                Err(e)
            }
        }
    }

    fn fail(&self, session: &str, error: &VozError, message: String) {
        EventLogger::log_event(
            session,
            SessionEvent::Failure {
                kind: error.kind().to_string(),
                error_msg: error.to_string(),
            },
        );
        self.notifier.notify(Notice::Error(message));
    }

    /// Back to field selection with nothing selected and the default style.
    /// The session id is kept.
    pub fn restart(&self) {
        *self.state() = WizardState::new();
    }
}
