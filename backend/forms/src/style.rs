//! Shared styling record for the rendered form.

use serde::{Deserialize, Serialize};
use vozform_core::VozError;

use crate::field::{clamp_px, DEFAULT_FONT_SIZE, MAX_FONT_SIZE, MIN_FONT_SIZE};

pub const MIN_BORDER_RADIUS: u32 = 0;
pub const MAX_BORDER_RADIUS: u32 = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormStyle {
    pub background_color: String,
    pub text_color: String,
    pub border_color: String,
    pub border_radius: u32,
    pub form_background: String,
    pub placeholder_color: String,
    pub icon_color: String,
    pub font_size: u32,
}

impl Default for FormStyle {
    fn default() -> Self {
        Self {
            background_color: "#ffffff".to_string(),
            text_color: "#333333".to_string(),
            border_color: "#cccccc".to_string(),
            border_radius: 4,
            form_background: "#f3f4f6".to_string(),
            placeholder_color: "#9ca3af".to_string(),
            icon_color: "#6b7280".to_string(),
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

/// Partial update for [`FormStyle`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StylePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<i64>,
}

/// Accepts `#rgb` or `#rrggbb`, returned lowercased.
pub fn normalize_color(attribute: &str, value: &str) -> Result<String, VozError> {
    let hex = value.trim();
    let valid = hex
        .strip_prefix('#')
        .is_some_and(|digits| matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit()));
    if !valid {
        return Err(VozError::InvalidStyle {
            attribute: attribute.to_string(),
            value: value.to_string(),
        });
    }
    Ok(hex.to_ascii_lowercase())
}

impl FormStyle {
    /// Merge `patch`. Colors are validated before anything changes, so a
    /// rejected patch leaves the style untouched. Numbers are clamped.
    pub fn apply(&mut self, patch: StylePatch) -> Result<(), VozError> {
        let color = |attribute: &str, value: Option<String>| {
            value.map(|v| normalize_color(attribute, &v)).transpose()
        };
        let background_color = color("backgroundColor", patch.background_color)?;
        let text_color = color("textColor", patch.text_color)?;
        let border_color = color("borderColor", patch.border_color)?;
        let form_background = color("formBackground", patch.form_background)?;
        let placeholder_color = color("placeholderColor", patch.placeholder_color)?;
        let icon_color = color("iconColor", patch.icon_color)?;

        if let Some(v) = background_color {
            self.background_color = v;
        }
        if let Some(v) = text_color {
            self.text_color = v;
        }
        if let Some(v) = border_color {
            self.border_color = v;
        }
        if let Some(v) = form_background {
            self.form_background = v;
        }
        if let Some(v) = placeholder_color {
            self.placeholder_color = v;
        }
        if let Some(v) = icon_color {
            self.icon_color = v;
        }
        if let Some(radius) = patch.border_radius {
            self.border_radius = clamp_px(radius, MIN_BORDER_RADIUS, MAX_BORDER_RADIUS);
        }
        if let Some(size) = patch.font_size {
            self.font_size = clamp_px(size, MIN_FONT_SIZE, MAX_FONT_SIZE);
        }
        Ok(())
    }
}
