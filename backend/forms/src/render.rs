//! Renders the preview markup sent to the forms webhook.

use crate::field::FormField;
use crate::icons::Icon;
use crate::style::FormStyle;

pub const PREVIEW_CLASS: &str = "form-preview";
pub const PREVIEW_HEADING: &str = "Pré-visualização do Formulário";

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// One `<div class="form-preview">` holding a labeled input per field.
pub fn render_markup(fields: &[FormField], style: &FormStyle) -> String {
    let mut html = String::new();
    html.push_str(&format!(
        r#"<div class="{PREVIEW_CLASS}" style="background-color: {}; padding: 1rem; border-radius: 0.375rem;">"#,
        html_escape(&style.form_background)
    ));
    html.push_str(&format!(
        "<style>.{PREVIEW_CLASS} input::placeholder {{ color: {}; }}</style>",
        html_escape(&style.placeholder_color)
    ));
    html.push_str(&format!("<h2>{PREVIEW_HEADING}</h2>"));
    for field in fields {
        html.push_str(&render_field(field, style));
    }
    html.push_str("</div>");
    html
}

fn render_field(field: &FormField, style: &FormStyle) -> String {
    let icon = Icon::from_key(&field.icon)
        .map(|icon| icon.render(&html_escape(&style.icon_color)))
        .unwrap_or_default();
    let marker = if field.required {
        r#"<span style="color: red;">*</span>"#
    } else {
        ""
    };

    format!(
        concat!(
            r#"<div class="form-field" style="margin-bottom: 1rem;">"#,
            r#"<label style="display: flex; align-items: center; gap: 0.5rem; font-size: {size}px; color: {text};">"#,
            "{icon}{label}{marker}</label>",
            r#"<input type="{kind}" placeholder="{placeholder}" "#,
            r#"style="width: 100%; padding: 0.5rem; font-size: {size}px; border: 1px solid {border}; "#,
            r#"border-radius: {radius}px; background-color: {background}; color: {text};">"#,
            "</div>"
        ),
        size = field.font_size,
        text = html_escape(&style.text_color),
        icon = icon,
        label = html_escape(&field.label),
        marker = marker,
        kind = field.field_type.as_str(),
        placeholder = html_escape(&field.placeholder),
        border = html_escape(&style.border_color),
        radius = style.border_radius,
        background = html_escape(&style.background_color),
    )
}
