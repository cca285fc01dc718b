//! CLI Catalog Command
//!
//! Lists the predefined fields a form can be built from.

use vozform_forms::{predefined_fields, Icon};

use crate::output::render_table;

pub fn run() {
    let rows: Vec<Vec<String>> = predefined_fields()
        .iter()
        .map(|f| {
            vec![
                f.id.to_string(),
                f.name.to_string(),
                f.field_type.as_str().to_string(),
                f.default_label.to_string(),
                f.default_placeholder.to_string(),
                f.default_icon.to_string(),
            ]
        })
        .collect();

    println!("\nPredefined fields\n");
    print!(
        "{}",
        render_table(&["ID", "Nome", "Tipo", "Rótulo", "Placeholder", "Ícone"], &rows)
    );

    let icons: Vec<&str> = Icon::ALL.iter().map(Icon::key).collect();
    println!("\nIcons: {}\n", icons.join(", "));
}
