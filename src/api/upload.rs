//! Reading `multipart/form-data` bodies from the admin editors.

use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::PortalError;
use crate::objects::{ImageUpload, content_type_for};

/// Text parts plus at most one image part.
#[derive(Debug, Default)]
pub struct MultipartBody {
    fields: Map<String, Value>,
    file: Option<ImageUpload>,
}

impl MultipartBody {
    /// Drains `multipart`, keeping the part named `file_part` as the image.
    ///
    /// An empty file part (a browser form with no file chosen) counts as
    /// no file.
    ///
    /// # Errors
    ///
    /// - [`PortalError::InvalidRequest`] for a malformed body.
    /// - [`PortalError::Validation`] when the file part is not an image.
    pub async fn read(mut multipart: Multipart, file_part: &str) -> Result<Self, PortalError> {
        let mut body = Self::default();
        while let Some(field) = multipart.next_field().await.map_err(malformed)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            if name != file_part {
                let text = field.text().await.map_err(malformed)?;
                body.fields.insert(name, Value::String(text));
                continue;
            }

            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.map_err(malformed)?;
            if bytes.is_empty() {
                continue;
            }
            if !is_image(content_type.as_deref(), &file_name) {
                return Err(PortalError::field(
                    file_part,
                    "Only image files can be uploaded",
                ));
            }
            body.file = Some(ImageUpload {
                file_name,
                content_type,
                bytes: bytes.to_vec(),
            });
        }
        Ok(body)
    }

    /// Deserializes the text parts into `T` and hands back the file.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::InvalidRequest`] when the parts do not fit `T`.
    pub fn into_parts<T: DeserializeOwned>(self) -> Result<(T, Option<ImageUpload>), PortalError> {
        let form = serde_json::from_value(Value::Object(self.fields))
            .map_err(|e| PortalError::InvalidRequest(e.to_string()))?;
        Ok((form, self.file))
    }
}

fn malformed(err: MultipartError) -> PortalError {
    PortalError::InvalidRequest(format!("malformed multipart body: {err}"))
}

/// Declared MIME type when present, otherwise the one implied by the name.
/// SVG is never accepted.
fn is_image(content_type: Option<&str>, file_name: &str) -> bool {
    let svg_name = file_name.to_ascii_lowercase().ends_with(".svg");
    let mime = content_type
        .filter(|ct| !ct.is_empty() && *ct != "application/octet-stream")
        .unwrap_or_else(|| content_type_for(file_name))
        .to_ascii_lowercase();
    mime.starts_with("image/") && !mime.contains("svg") && !svg_name
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::api::dto::EventForm;

    #[test]
    fn image_detection() {
        assert!(is_image(Some("image/png"), "x.bin"));
        assert!(is_image(None, "poster.JPG"));
        assert!(is_image(Some("application/octet-stream"), "logo.webp"));
        assert!(!is_image(Some("text/plain"), "notes.png"));
        assert!(!is_image(None, "notes.txt"));
        assert!(!is_image(Some("image/svg+xml"), "logo.png"));
        assert!(!is_image(Some("image/png"), "logo.SVG"));
        assert!(!is_image(None, "logo.svg"));
    }

    #[test]
    fn text_parts_fill_the_form() {
        let mut body = MultipartBody::default();
        body.fields
            .insert("title".into(), Value::String("Cosplay".into()));
        body.fields
            .insert("price".into(), Value::String("499".into()));
        let Ok((form, file)) = body.into_parts::<EventForm>() else {
            panic!("form should deserialize");
        };
        assert_eq!(form.title.as_deref(), Some("Cosplay"));
        assert_eq!(form.price.as_deref(), Some("499"));
        assert!(form.date.is_none());
        assert!(file.is_none());
    }
}
