//! Service catalog
//!
//! The closed list of Google Workspace services gws knows about, and the
//! read-only operation table applied by `account set-readonly`.

use std::collections::BTreeMap;

use crate::common::{GwsError, GwsResult};

pub const ALL_SERVICES: &[&str] = &[
    "docs", "sheets", "slides", "drive", "gmail", "calendar", "contacts", "convert",
];

const READ_ONLY_OPS: &[(&str, &[&str])] = &[
    (
        "gmail",
        &[
            "list",
            "read",
            "search",
            "labels",
            "drafts",
            "get-draft",
            "list-attachments",
            "download-attachment",
            "threads",
            "get-thread",
            "get-vacation",
            "get-signature",
            "filters",
            "get-filter",
            "get-label",
            "history",
        ],
    ),
    (
        "docs",
        &[
            "list-tabs",
            "read",
            "structure",
            "list-tables",
            "list-headers-footers",
            "find-text",
            "list-named-ranges",
            "list-footnotes",
            "suggestions",
            "get-page-format",
            "document-mode",
        ],
    ),
    (
        "sheets",
        &[
            "metadata",
            "read",
            "batch-get",
            "list-filter-views",
            "list-pivot-tables",
            "list-protected-ranges",
            "list-named-ranges",
        ],
    ),
    ("slides", &["metadata", "read", "get-speaker-notes"]),
    (
        "drive",
        &[
            "list",
            "search",
            "get",
            "download",
            "export",
            "list-comments",
            "list-revisions",
            "get-revision",
            "list-trash",
            "list-permissions",
            "get-permission",
            "list-replies",
            "get-reply",
            "changes-token",
            "list-changes",
            "list-shared-drives",
            "get-shared-drive",
            "generate-ids",
        ],
    ),
    (
        "calendar",
        &[
            "calendars",
            "list",
            "get",
            "instances",
            "attendees",
            "freebusy",
            "list-acl",
            "get-reminders",
            "get-default-reminders",
            "colors",
        ],
    ),
    (
        "contacts",
        &[
            "list",
            "get",
            "groups",
            "get-group",
            "get-photo",
            "search-directory",
            "list-directory",
            "batch-get",
        ],
    ),
    ("convert", &[]),
];

/// Per-service operation allowlist, as stored under `allowed_operations`.
pub type OperationAllowlist = BTreeMap<String, Vec<String>>;

pub fn is_known_service(service: &str) -> bool {
    ALL_SERVICES.contains(&service)
}

/// Reject service names outside the catalog.
pub fn validate_service(service: &str) -> GwsResult<()> {
    if is_known_service(service) {
        Ok(())
    } else {
        Err(GwsError::InvalidService(service.to_string()))
    }
}

pub fn all_services() -> Vec<String> {
    ALL_SERVICES.iter().map(|s| s.to_string()).collect()
}

/// The non-mutating operation set for every service.
pub fn read_only_operations() -> OperationAllowlist {
    READ_ONLY_OPS
        .iter()
        .map(|(service, ops)| {
            (
                service.to_string(),
                ops.iter().map(|op| op.to_string()).collect(),
            )
        })
        .collect()
}
