//! CSV export of the current record set.

use crate::models::PackageRecord;

/// Byte-order mark so spreadsheet tools pick UTF-8.
const BOM: &str = "\u{feff}";

const HEADER: &[&str] = &[
    "tracking_number",
    "item_name",
    "recipient",
    "sender",
    "cost_price",
    "quantity",
    "status",
    "created_at",
];

/// Quote a field when it contains the delimiter, a quote, or a newline;
/// internal quotes are doubled.
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn record_row(record: &PackageRecord) -> String {
    let cost_price = record
        .cost_price
        .map(|price| price.to_string())
        .unwrap_or_default();
    let quantity = record.quantity.to_string();
    let created_at = record.created_at.to_rfc3339();
    let fields = [
        record.tracking_number.as_deref().unwrap_or(""),
        record.item_name.as_str(),
        record.recipient.as_deref().unwrap_or(""),
        record.sender.as_deref().unwrap_or(""),
        cost_price.as_str(),
        quantity.as_str(),
        record.status.as_str(),
        created_at.as_str(),
    ];
    fields
        .iter()
        .map(|field| csv_field(field))
        .collect::<Vec<_>>()
        .join(",")
}

/// Serialize the full record set to CSV text (UTF-8 with BOM, header row,
/// one row per record).
pub fn to_csv(records: &[PackageRecord]) -> String {
    let mut output = String::from(BOM);
    output.push_str(&HEADER.join(","));
    output.push('\n');
    for record in records {
        output.push_str(&record_row(record));
        output.push('\n');
    }
    output
}
