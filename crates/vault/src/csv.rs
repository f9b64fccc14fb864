use civic_core::Issue;

const HEADER: [&str; 9] = [
    "id",
    "title",
    "category",
    "severity",
    "status",
    "upvotes",
    "reportedAt",
    "lat",
    "lng",
];

/// RFC 4180: CRLF line endings, fields quoted when they contain a comma,
/// quote or line break.
pub fn issues_csv(issues: &[Issue]) -> String {
    let mut out = String::new();
    push_record(&mut out, HEADER.iter().map(|field| field.to_string()));
    for issue in issues {
        push_record(
            &mut out,
            [
                issue.id.clone(),
                issue.title.clone(),
                issue.category.clone(),
                issue.severity.to_string(),
                issue.status.to_string(),
                issue.upvotes.to_string(),
                issue.reported_at.clone(),
                issue.lat.to_string(),
                issue.lng.to_string(),
            ],
        );
    }
    out
}

fn push_record(out: &mut String, fields: impl IntoIterator<Item = String>) {
    let escaped: Vec<String> = fields.into_iter().map(|field| escape_field(&field)).collect();
    out.push_str(&escaped.join(","));
    out.push_str("\r\n");
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
