use crate::config::UploadLimits;
use crate::error::UploadError;
use crate::gateway::PresignedTicket;

/// A validated storage destination, ready for the multipart POST.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadTarget {
    pub upload_url: String,
    /// Where the object will live once stored.
    pub file_url: String,
    /// Form fields in the order they must be sent, ahead of the file.
    pub fields: Vec<(String, String)>,
}

/// Checks a presigned answer and builds the form fields for it.
///
/// When the backend sends no field map, fields are built from the content
/// type (plus content disposition, if any). Required policy fields are
/// checked against whichever field set results; a blank value counts as
/// missing.
pub fn resolve_target(ticket: PresignedTicket, limits: &UploadLimits) -> Result<UploadTarget, UploadError> {
    let upload_url = ticket
        .upload_url
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| UploadError::InvalidPresignedResponse("missing upload URL".into()))?;

    let fields = match ticket.upload_fields.filter(|fields| !fields.is_empty()) {
        Some(fields) => fields,
        None => {
            let content_type = ticket.content_type.ok_or_else(|| {
                UploadError::InvalidPresignedResponse(
                    "no upload fields and no content type to build them from".into(),
                )
            })?;
            let mut fields = vec![("Content-Type".to_string(), content_type)];
            if let Some(disposition) = ticket.content_disposition {
                fields.push(("Content-Disposition".to_string(), disposition));
            }
            fields
        }
    };

    let missing: Vec<String> = limits
        .required_fields
        .iter()
        .filter(|required| {
            !fields
                .iter()
                .any(|(key, value)| key == *required && !value.trim().is_empty())
        })
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(UploadError::MissingUploadFields { missing });
    }

    let file_url = ticket
        .file_url
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| upload_url.clone());

    Ok(UploadTarget {
        upload_url,
        file_url,
        fields,
    })
}
