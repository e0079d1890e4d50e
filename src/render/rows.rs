//! Table rows for the record list.

use std::fmt::Write;

use super::escape::{escape_attr, escape_html};
use crate::models::Hospital;

/// Ten data columns plus the actions column.
pub const COLUMN_COUNT: usize = 11;

/// Shown in place of a missing link.
pub const DASH: &str = "—";

pub const EMPTY_MESSAGE: &str = "No data.";

fn text(value: Option<&str>) -> String {
    escape_html(value.unwrap_or_default())
}

/// One `<tr>` for one record. Every interpolated value is escaped.
pub fn render_row(record: &Hospital) -> String {
    let website = match record.website.as_deref().filter(|w| !w.is_empty()) {
        Some(url) => format!(
            r#"<a href="{}" target="_blank" rel="noreferrer">Link</a>"#,
            escape_attr(url)
        ),
        None => DASH.to_string(),
    };
    let email = match record.email.as_deref().filter(|e| !e.is_empty()) {
        Some(address) => format!(
            r#"<a href="mailto:{}">{}</a>"#,
            escape_attr(address),
            escape_html(address)
        ),
        None => DASH.to_string(),
    };
    let id = escape_attr(&record.id);

    let mut row = String::with_capacity(1024);
    let _ = write!(
        row,
        r#"<tr data-id="{id}"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{website}</td><td>{email}</td><td>{}</td><td>{}</td>"#,
        escape_html(&record.name),
        escape_html(record.status.as_str()),
        escape_html(&record.country),
        escape_html(&record.city),
        escape_html(record.category.as_str()),
        text(record.speciality.as_deref()),
        text(record.telephone.as_deref()),
        escape_html(record.teleconsultation.as_str()),
    );
    let _ = write!(
        row,
        concat!(
            r#"<td class="right">"#,
            r##"<form method="get" action="/#top" class="inline">"##,
            r#"<input type="hidden" name="edit" value="{id}">"#,
            r#"<button type="submit" class="btn" data-action="edit">Edit</button></form>"#,
            r#"<form method="post" action="/hospitals/delete" class="inline" data-confirm="Delete this facility?">"#,
            r#"<input type="hidden" name="id" value="{id}">"#,
            r#"<input type="hidden" name="confirmed" value="">"#,
            r#"<button type="submit" class="btn danger" data-action="delete">Delete</button></form>"#,
            r#"</td></tr>"#,
        ),
        id = id,
    );
    row
}

/// A single row spanning every column, for empty and degraded states.
pub fn placeholder_row(message: &str) -> String {
    format!(
        r#"<tr class="placeholder"><td colspan="{COLUMN_COUNT}">{}</td></tr>"#,
        escape_html(message)
    )
}

/// All rows, or the empty placeholder.
pub fn render_rows(records: &[&Hospital]) -> String {
    if records.is_empty() {
        return placeholder_row(EMPTY_MESSAGE);
    }
    records.iter().map(|h| render_row(h)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HospitalCategory, HospitalStatus, Teleconsultation};

    fn city_hospital() -> Hospital {
        Hospital {
            id: "h1".into(),
            name: "City Hospital".into(),
            status: HospitalStatus::Active,
            country: "FR".into(),
            city: "Paris".into(),
            category: HospitalCategory::Hospital,
            speciality: None,
            website: None,
            email: None,
            telephone: None,
            teleconsultation: Teleconsultation::Yes,
            created_at: None,
        }
    }

    fn cells(row: &str) -> Vec<String> {
        row.split("<td")
            .skip(1)
            .map(|cell| {
                let start = cell.find('>').unwrap() + 1;
                let end = cell.find("</td>").unwrap();
                cell[start..end].to_string()
            })
            .collect()
    }

    #[test]
    fn row_without_links_shows_dashes_and_teleconsultation() {
        let row = render_row(&city_hospital());
        let cells = cells(&row);
        assert_eq!(cells.len(), COLUMN_COUNT);
        assert_eq!(cells[0], "City Hospital");
        assert_eq!(cells[6], DASH);
        assert_eq!(cells[7], DASH);
        assert_eq!(cells[9], "YES");
    }

    #[test]
    fn stored_markup_is_escaped() {
        let mut record = city_hospital();
        record.name = "<script>alert(1)</script>".into();
        record.website = Some("javascript:`x`\"".into());
        record.id = "a\"b".into();
        let row = render_row(&record);

        assert!(!row.contains("<script>"));
        assert!(row.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(row.contains(r#"href="javascript:&#096;x&#096;&quot;""#));
        assert!(row.contains(r#"data-id="a&quot;b""#));
    }

    #[test]
    fn email_becomes_mailto_link() {
        let mut record = city_hospital();
        record.email = Some("desk@city.example".into());
        let row = render_row(&record);
        assert!(row.contains(r#"<a href="mailto:desk@city.example">desk@city.example</a>"#));
    }

    #[test]
    fn empty_list_renders_one_spanning_placeholder() {
        let html = render_rows(&[]);
        assert_eq!(
            html,
            r#"<tr class="placeholder"><td colspan="11">No data.</td></tr>"#
        );
    }

    #[test]
    fn rendering_is_deterministic() {
        let a = city_hospital();
        let mut b = city_hospital();
        b.id = "h2".into();
        let first = render_rows(&[&a, &b]);
        assert_eq!(first, render_rows(&[&a, &b]));
        assert_eq!(first.matches("<tr ").count(), 2);
    }

    #[test]
    fn row_actions_carry_escaped_id() {
        let mut record = city_hospital();
        record.id = "x'y".into();
        let row = render_row(&record);
        assert_eq!(row.matches(r#"value="x&#039;y""#).count(), 2);
        assert!(row.contains(r#"data-action="edit""#));
        assert!(row.contains(r#"data-action="delete""#));
    }
}
