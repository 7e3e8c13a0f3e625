//! Deep-link identity codec.
//!
//! A document's portable identity is its webUrl augmented with the composite
//! key (folder, site, drive and document ids) as query parameters. Encoding
//! is idempotent: a key already present in the query string is never written
//! again, so the same document always yields the same link. Decoding is
//! best-effort and never contacts the remote service.

use url::Url;

use crate::error::Error;
use crate::model::Document;

pub const PARENT_ID: &str = "parentid";
pub const PARENT_SITE_ID: &str = "parentsiteid";
pub const DRIVE_ID: &str = "driveid";
pub const DOC_ID: &str = "docid";
pub const FILE_NAME: &str = "file";

/// Encode a document's composite key onto its webUrl.
///
/// Keys are appended in a fixed order (`parentid`, `parentsiteid`,
/// `driveid`, `docid`), each only when not already present, so the result
/// is deterministic for a given input.
pub fn encode_doc_url(doc: &Document) -> Result<String, Error> {
    if doc.web_url.is_empty() {
        return Err(Error::InvalidIdentity);
    }
    let mut url =
        Url::parse(&doc.web_url).map_err(|e| Error::Parse(format!("webUrl: {e}")))?;

    for (key, value) in [
        (PARENT_ID, doc.parent_folder_id.as_str()),
        (PARENT_SITE_ID, doc.parent_site_id.as_str()),
        (DRIVE_ID, doc.parent_drive_id.as_str()),
        (DOC_ID, doc.id.as_str()),
    ] {
        if !value.is_empty() {
            append_if_absent(&mut url, key, value);
        }
    }
    Ok(url.to_string())
}

/// Decode a deep link back into a partial document. Absent keys map to
/// empty fields, never an error.
pub fn parse_doc_url(web_url: &str) -> Result<Document, Error> {
    let url = Url::parse(web_url).map_err(|e| Error::Parse(format!("webUrl: {e}")))?;
    let mut doc = Document {
        web_url: web_url.to_string(),
        ..Default::default()
    };
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            DRIVE_ID => doc.parent_drive_id = value.into_owned(),
            PARENT_ID => doc.parent_folder_id = value.into_owned(),
            PARENT_SITE_ID => doc.parent_site_id = value.into_owned(),
            DOC_ID => doc.id = value.into_owned(),
            FILE_NAME => doc.name = value.into_owned(),
            _ => {}
        }
    }
    Ok(doc)
}

/// First write wins: a query part already starting with `key=` (exact,
/// case-sensitive) leaves the URL untouched.
fn append_if_absent(url: &mut Url, key: &str, value: &str) {
    let query = url.query().unwrap_or("").to_string();
    let prefix = format!("{key}=");
    if query.split('&').any(|part| part.starts_with(&prefix)) {
        return;
    }
    let appended = if query.is_empty() {
        format!("{key}={value}")
    } else {
        format!("{query}&{key}={value}")
    };
    url.set_query(Some(&appended));
}
