use chrono::NaiveDate;
use itertools::Itertools;

use crate::model::{expiry_label, format_date, ExpiryStatus, Record, Summary};

fn badge(status: ExpiryStatus) -> &'static str {
    match status {
        ExpiryStatus::Expired => "[EXPIRED ]",
        ExpiryStatus::Critical => "[CRITICAL]",
        ExpiryStatus::Warning => "[WARNING ]",
        ExpiryStatus::Normal => "[  OK    ]",
    }
}

pub fn render_record(record: &Record, today: NaiveDate) -> String {
    let status = ExpiryStatus::for_date(record.expiry_date, today);
    format!(
        "{} #{} {} {} | {} | expires {} | action due {} | {}",
        badge(status),
        record.sno,
        record.document_type,
        record.document_number,
        record.document_owner,
        format_date(record.expiry_date),
        format_date(record.action_due_date),
        expiry_label(record.expiry_date, today),
    )
}

pub fn render_summary(summary: &Summary) -> String {
    format!(
        "{} documents: {} expired, {} critical, {} warning, {} ok",
        summary.total(),
        summary.expired,
        summary.critical,
        summary.warning,
        summary.normal
    )
}

/// Header plus one line per record, or a placeholder when nothing matched.
pub fn render_list(records: &[Record], today: NaiveDate) -> String {
    if records.is_empty() {
        return "No documents found".to_owned();
    }
    let header = render_summary(&Summary::of(records, today));
    std::iter::once(header)
        .chain(records.iter().map(|r| render_record(r, today)))
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RecordId;

    #[test]
    fn record_line_carries_status_and_label() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let record = Record {
            sno: RecordId::from("42"),
            document_type: "Passport".to_owned(),
            document_owner: "Alice".to_owned(),
            document_number: "P-100".to_owned(),
            expiry_date: NaiveDate::from_ymd_opt(2026, 10, 24).unwrap(),
            action_due_date: NaiveDate::from_ymd_opt(2026, 10, 20).unwrap(),
        };
        assert_eq!(
            render_record(&record, today),
            "[CRITICAL] #42 Passport P-100 | Alice | expires Oct 24, 2026 | action due Oct 20, 2026 | 5 days left"
        );
        let list = render_list(&[record], today);
        assert!(list.starts_with("1 documents: 0 expired, 1 critical"));
        assert_eq!(render_list(&[], today), "No documents found");
    }
}
