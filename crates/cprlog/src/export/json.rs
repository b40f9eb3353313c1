//! JSON export of the full record.

use serde::Serialize;

use crate::error::Result;
use crate::patient::PatientMeta;
use crate::session::Session;

/// The exported document: patient metadata and the session, verbatim.
#[derive(Debug, Serialize)]
pub struct Record<'a> {
    /// Patient metadata.
    pub meta: &'a PatientMeta,
    /// The session.
    pub session: &'a Session,
}

/// Render `{meta, session}` as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render(meta: &PatientMeta, session: &Session) -> Result<String> {
    Ok(serde_json::to_string_pretty(&Record { meta, session })?)
}
