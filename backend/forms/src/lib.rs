//! Contact-form wizard.
//!
//! Pick fields from a fixed catalog, configure them, style the form, then
//! preview the generated markup and post it to a webhook.

pub mod catalog;
pub mod field;
pub mod icons;
pub mod query;
pub mod render;
pub mod style;
pub mod submit;
pub mod wizard;

pub use catalog::{predefined_fields, FieldType, PredefinedField};
pub use field::{FieldPatch, FormField};
pub use icons::Icon;
pub use query::parameter_by_name;
pub use render::{html_escape, render_markup};
pub use style::{FormStyle, StylePatch};
pub use submit::{FormSink, FormSubmission, WebhookFormSink};
pub use wizard::{
    materialize_fields, FormConfig, FormWizard, SubmitReceipt, WizardOptions, WizardSnapshot,
    WizardStep,
};
