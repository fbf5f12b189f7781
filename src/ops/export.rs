use std::io;
use std::path::Path;

use crate::io::recovery::atomic_write;
use crate::model::store::TaskStore;

/// Column header of the export file: content, quadrant, created, finished
pub const CSV_HEADER: [&str; 4] = ["内容", "象限", "创建时间", "完成时间"];

/// Default file name offered for an export
pub const DEFAULT_EXPORT_NAME: &str = "已完成事项.csv";

const BOM: &str = "\u{feff}";

/// One row per finished task, across all quadrants in board order
pub fn completed_rows(store: &TaskStore) -> Vec<[String; 4]> {
    store
        .done_tasks()
        .map(|(quadrant, task)| {
            [
                task.content.clone(),
                quadrant.label().to_string(),
                task.created_label(),
                task.finished_label(),
            ]
        })
        .collect()
}

/// Render the export as CSV text: UTF-8 BOM, CRLF line endings, fields
/// quoted only when they contain a comma, quote or line break.
pub fn render_csv(store: &TaskStore) -> String {
    let mut out = String::from(BOM);
    push_record(&mut out, CSV_HEADER.iter().copied());
    for row in completed_rows(store) {
        push_record(&mut out, row.iter().map(String::as_str));
    }
    out
}

/// Write the export to `path`. Returns the number of data rows written.
pub fn export_csv(store: &TaskStore, path: &Path) -> io::Result<usize> {
    let rows = store.done_tasks().count();
    atomic_write(path, render_csv(store).as_bytes())?;
    Ok(rows)
}

fn push_record<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(',');
        }
        push_field(out, field);
    }
    out.push_str("\r\n");
}

fn push_field(out: &mut String, field: &str) {
    if field.contains([',', '"', '\r', '\n']) {
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(field);
    }
}
