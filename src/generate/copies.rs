use serde::Serialize;

/// Copy status accepted by the copy endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CopyStatus {
    Available,
}

/// Body of `POST books/exact-book/create-book`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyPayload {
    pub book_edition_id: i64,
    pub status: CopyStatus,
}

/// New copies always start on the shelf so they can be rented
pub fn copy(book_edition_id: i64) -> CopyPayload {
    CopyPayload {
        book_edition_id,
        status: CopyStatus::Available,
    }
}
