use axum::Json;

use crate::models::Banner;

pub async fn index() -> Json<Banner> {
    Json(Banner {
        mensaje: "API de análisis de normas APA e IEEE",
    })
}
