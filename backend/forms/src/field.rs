use serde::{Deserialize, Serialize};

use crate::catalog::{FieldType, PredefinedField};

pub const DEFAULT_FONT_SIZE: u32 = 16;
pub const MIN_FONT_SIZE: u32 = 10;
pub const MAX_FONT_SIZE: u32 = 24;

/// Clamp a caller-supplied integer into `[min, max]`.
pub(crate) fn clamp_px(value: i64, min: u32, max: u32) -> u32 {
    value.clamp(i64::from(min), i64::from(max)) as u32
}

/// A user-configured instance of a catalog field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub id: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
    pub placeholder: String,
    pub icon: String,
    pub required: bool,
    pub font_size: u32,
}

impl FormField {
    pub fn from_predefined(predefined: &PredefinedField) -> Self {
        Self {
            id: predefined.id.to_string(),
            field_type: predefined.field_type,
            label: predefined.default_label.to_string(),
            placeholder: predefined.default_placeholder.to_string(),
            icon: predefined.default_icon.to_string(),
            required: false,
            font_size: DEFAULT_FONT_SIZE,
        }
    }

    /// Merge `patch` into this field. `id` and `type` are not patchable.
    pub fn apply(&mut self, patch: FieldPatch) {
        if let Some(label) = patch.label {
            self.label = label;
        }
        if let Some(placeholder) = patch.placeholder {
            self.placeholder = placeholder;
        }
        if let Some(icon) = patch.icon {
            self.icon = icon;
        }
        if let Some(required) = patch.required {
            self.required = required;
        }
        if let Some(size) = patch.font_size {
            self.font_size = clamp_px(size, MIN_FONT_SIZE, MAX_FONT_SIZE);
        }
    }
}

/// Partial update for a [`FormField`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FieldPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<i64>,
}
