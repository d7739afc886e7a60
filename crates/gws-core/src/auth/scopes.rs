//! OAuth scope definitions per service.

use std::collections::BTreeSet;

const DOCUMENTS: &str = "https://www.googleapis.com/auth/documents";
const SPREADSHEETS: &str = "https://www.googleapis.com/auth/spreadsheets";
const PRESENTATIONS: &str = "https://www.googleapis.com/auth/presentations";
const DRIVE: &str = "https://www.googleapis.com/auth/drive";
const GMAIL_MODIFY: &str = "https://www.googleapis.com/auth/gmail.modify";
const CALENDAR: &str = "https://www.googleapis.com/auth/calendar";
const CONTACTS: &str = "https://www.googleapis.com/auth/contacts";

/// Scopes one service needs. Unknown services need none.
pub fn scopes_for_service(service: &str) -> &'static [&'static str] {
    match service {
        "docs" => &[DOCUMENTS],
        "sheets" => &[SPREADSHEETS],
        "slides" => &[PRESENTATIONS],
        "drive" => &[DRIVE],
        "gmail" => &[GMAIL_MODIFY],
        "calendar" => &[CALENDAR],
        "contacts" => &[CONTACTS],
        "convert" => &[DRIVE, DOCUMENTS, PRESENTATIONS],
        _ => &[],
    }
}

/// Sorted, de-duplicated union of the scopes for `services`.
pub fn scopes_for_services<S: AsRef<str>>(services: &[S]) -> Vec<String> {
    services
        .iter()
        .flat_map(|s| scopes_for_service(s.as_ref()).iter())
        .map(|s| s.to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
