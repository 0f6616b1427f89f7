use serde::{Deserialize, Serialize};

/// A named link to a file stored elsewhere (photos, PDFs, invoices).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub url: String,
}
