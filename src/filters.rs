use askama::Result;

/// Badge class for a status literal; "" for anything else.
pub fn status_class(status: &str) -> &'static str {
    match status {
        "Active" | "Present" | "Approved" | "Available" => "badge badge-ok",
        "Late" | "Half Day" | "Pending" | "In Use" | "Low Stock" | "On Order" => "badge badge-warn",
        "Inactive" | "Absent" | "Rejected" | "Maintenance" | "Out of Stock" => "badge badge-bad",
        _ => "",
    }
}

// Custom filter for values known to be statuses.
// Usage in templates: `<span class="{{ bucket.label|badge }}">`.
#[allow(clippy::unnecessary_wraps)]
pub fn badge<T: std::fmt::Display>(value: T) -> Result<&'static str> {
    Ok(status_class(&value.to_string()))
}

// Shows a placeholder for empty cells.
#[allow(clippy::unnecessary_wraps)]
pub fn or_dash<T: std::fmt::Display>(value: T) -> Result<String> {
    let text = value.to_string();
    Ok(if text.is_empty() { "-".to_string() } else { text })
}
