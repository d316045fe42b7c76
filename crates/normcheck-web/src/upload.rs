use std::path::Path;

use axum::extract::Multipart;

use crate::error::ApiError;

/// Form field carrying the document.
const FILE_FIELD: &str = "archivo";

const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "docx", "doc"];

/// An uploaded document with its data and original name.
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Whether the upload's extension is one the service analyses.
pub fn is_allowed(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

/// Reduce a client-supplied name to its final component.
pub fn sanitize_filename(filename: &str) -> String {
    let last = filename.rsplit(['/', '\\']).next().unwrap_or("");
    if last.is_empty() || last == "." || last == ".." {
        "documento".to_string()
    } else {
        last.to_string()
    }
}

/// Read the `archivo` field from a multipart upload, rejecting other
/// extensions with 400.
pub async fn parse_multipart(mut multipart: Multipart) -> Result<UploadedFile, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Formulario inválido: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            // Unknown fields are drained; a broken one still fails the request.
            let name = field.name().unwrap_or("").to_string();
            field.bytes().await.map_err(|e| {
                ApiError::bad_request(format!("No se pudo leer el campo '{}': {}", name, e))
            })?;
            continue;
        }

        let filename = sanitize_filename(field.file_name().unwrap_or(""));
        if !is_allowed(&filename) {
            return Err(ApiError::bad_request("Solo se permiten archivos PDF o Word"));
        }
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("No se pudo leer el archivo: {}", e)))?
            .to_vec();
        return Ok(UploadedFile { filename, data });
    }

    Err(ApiError::unprocessable("Falta el campo 'archivo'"))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::{Request, StatusCode, header};

    use super::*;

    async fn multipart(body: &'static str) -> Multipart {
        let req = Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "multipart/form-data; boundary=XYZ")
            .body(Body::from(body))
            .unwrap();
        Multipart::from_request(req, &()).await.unwrap()
    }

    #[test]
    fn allowed_extensions() {
        assert!(is_allowed("tesis.pdf"));
        assert!(is_allowed("Tesis.DOCX"));
        assert!(is_allowed("viejo.doc"));
        assert!(!is_allowed("notas.txt"));
        assert!(!is_allowed("pdf"));
        assert!(!is_allowed("tesis.pdf.exe"));
    }

    #[test]
    fn sanitize_strips_directories() {
        assert_eq!(sanitize_filename("../../etc/tesis.pdf"), "tesis.pdf");
        assert_eq!(sanitize_filename("C:\\Users\\ana\\tesis.docx"), "tesis.docx");
        assert_eq!(sanitize_filename(".."), "documento");
        assert_eq!(sanitize_filename(""), "documento");
    }

    #[tokio::test]
    async fn unknown_fields_are_skipped() {
        let body = "--XYZ\r\nContent-Disposition: form-data; name=\"comentario\"\r\n\r\nhola\r\n--XYZ\r\nContent-Disposition: form-data; name=\"archivo\"; filename=\"tesis.pdf\"\r\n\r\ncontenido\r\n--XYZ--\r\n";
        let upload = parse_multipart(multipart(body).await).await.unwrap();
        assert_eq!(upload.filename, "tesis.pdf");
        assert_eq!(upload.data, b"contenido");
    }

    #[tokio::test]
    async fn truncated_unknown_field_is_bad_request() {
        let body = "--XYZ\r\nContent-Disposition: form-data; name=\"comentario\"\r\n\r\nsin cierre";
        let err = parse_multipart(multipart(body).await).await.err().unwrap();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.detail.starts_with("No se pudo leer el campo 'comentario'"), "{}", err.detail);
    }
}
