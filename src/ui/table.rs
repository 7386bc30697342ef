use tabled::{builder::Builder, settings::Style};

use crate::extension::QueryOutput;
use crate::ui::muted;

/// Render a query result as a rounded table. NULLs are shown as a muted `NULL`.
pub fn result_table(output: &QueryOutput) -> String {
    let mut builder = Builder::default();
    builder.push_record(output.columns.iter().cloned());
    for row in &output.rows {
        builder.push_record(
            row.iter()
                .map(|value| value.clone().unwrap_or_else(|| muted("NULL"))),
        );
    }

    builder.build().with(Style::rounded()).to_string()
}
