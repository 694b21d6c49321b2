use crate::crawler::TraversalReport;
use crate::product::StoredRecord;

/// Formats the end-of-run summary of a traversal
///
/// The first block mirrors the fields a caller needs to judge the run
/// (`status`, `inserted_count`, `existing_count`, `total_products`); page and
/// store failures follow, one per line.
pub fn format_report(report: &TraversalReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("status: {}\n", report.status().to_db_string()));
    out.push_str(&format!("inserted_count: {}\n", report.inserted_count));
    out.push_str(&format!("existing_count: {}\n", report.existing_count));
    out.push_str(&format!("total_products: {}\n", report.total_products()));
    out.push_str(&format!(
        "pages_fetched: {}/{}\n",
        report.pages_fetched, report.pages_requested
    ));

    if !report.page_failures.is_empty() {
        out.push_str(&format!("\nFailed pages ({}):\n", report.page_failures.len()));
        for failure in &report.page_failures {
            out.push_str(&format!(
                "  - page {} ({}): {}\n",
                failure.page, failure.url, failure.error
            ));
        }
    }

    if !report.store_failures.is_empty() {
        out.push_str(&format!("\nStore failures ({}):\n", report.store_failures.len()));
        for failure in &report.store_failures {
            out.push_str(&format!(
                "  - {} \"{}\": {}\n",
                failure.id,
                escape_field(&failure.record.title),
                failure.error
            ));
        }
    }

    out
}

pub fn print_report(report: &TraversalReport) {
    print!("{}", format_report(report));
}

/// Formats stored records as tab-separated lines: id, title, price, image URL
///
/// Backslash, tab, newline and carriage return inside a field are written as
/// `\\`, `\t`, `\n` and `\r`, so every record stays on one line with four
/// columns.
pub fn format_products(products: &[StoredRecord]) -> String {
    let mut out = String::new();
    for stored in products {
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\n",
            stored.id,
            escape_field(&stored.record.title),
            escape_field(&stored.record.price),
            escape_field(&stored.record.image_url)
        ));
    }
    out
}

fn escape_field(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\t' => escaped.push_str("\\t"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn print_products(products: &[StoredRecord]) {
    print!("{}", format_products(products));
}
