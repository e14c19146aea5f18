use actix_files::{Files, NamedFile};
use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse};
use futures::{StreamExt, TryStreamExt};
use log::{error, info};
use serde::Serialize;

use crate::config::AppConfig;
use crate::error::UploadError;
use crate::inference::{AgeModel, InferenceError, Prediction};
use crate::render;
use crate::storage::TempStore;

const ALLOWED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];
const HTML: &str = "text/html; charset=utf-8";

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

struct UploadedImage {
    filename: String,
    bytes: Vec<u8>,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig, static_dir: String) {
    cfg.service(
        web::resource("/")
            .route(web::get().to(index))
            .route(web::post().to(handle_upload)),
    )
    .service(web::resource("/api/predict").route(web::post().to(handle_predict_api)))
    .service(web::resource("/temp/{filename}").route(web::get().to(serve_temp)))
    .service(Files::new("/static", static_dir));
}

async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(HTML)
        .body(render::index_page(None))
}

async fn handle_upload(
    model: web::Data<AgeModel>,
    store: web::Data<TempStore>,
    config: web::Data<AppConfig>,
    payload: Multipart,
) -> HttpResponse {
    match process_upload(&model, &store, config.max_upload_bytes, payload).await {
        Ok(prediction) => HttpResponse::Ok()
            .content_type(HTML)
            .body(render::result_page(&prediction)),
        Err(err) => {
            info!("Upload rejected: {}", err);
            HttpResponse::build(err.form_status())
                .content_type(HTML)
                .body(render::index_page(Some(&err.to_string())))
        }
    }
}

async fn handle_predict_api(
    model: web::Data<AgeModel>,
    store: web::Data<TempStore>,
    config: web::Data<AppConfig>,
    payload: Multipart,
) -> HttpResponse {
    match process_upload(&model, &store, config.max_upload_bytes, payload).await {
        Ok(prediction) => HttpResponse::Ok().json(prediction),
        Err(err) => {
            info!("Upload rejected: {}", err);
            HttpResponse::build(err.api_status()).json(ErrorResponse {
                error: err.to_string(),
            })
        }
    }
}

async fn serve_temp(
    req: HttpRequest,
    store: web::Data<TempStore>,
    path: web::Path<String>,
) -> HttpResponse {
    let name = path.into_inner();
    match store.resolve(&name) {
        Some(file_path) => match NamedFile::open_async(&file_path).await {
            Ok(file) => file.into_response(&req),
            Err(e) => {
                error!("Failed to open stored file {}: {}", name, e);
                HttpResponse::InternalServerError().finish()
            }
        },
        None => HttpResponse::NotFound().body("File not found"),
    }
}

/// The shared upload pipeline: validate the multipart request, persist the
/// bytes, classify, and assemble the prediction for rendering.
async fn process_upload(
    model: &AgeModel,
    store: &TempStore,
    max_bytes: usize,
    payload: Multipart,
) -> Result<Prediction, UploadError> {
    let upload = read_upload(payload, max_bytes).await?;

    let key = store.save(&upload.filename, &upload.bytes).map_err(|e| {
        error!("Failed to persist upload {}: {}", upload.filename, e);
        UploadError::Internal
    })?;

    let (age, confidence) = model.predict(&upload.bytes).map_err(|e| match e {
        InferenceError::Decode(_) => UploadError::UndecodableImage,
        other => {
            error!("Inference failed for {}: {}", key, other);
            UploadError::Internal
        }
    })?;

    Ok(Prediction::new(age, confidence, format!("/temp/{}", key)))
}

/// Reads the `file` field out of the multipart stream, enforcing the name,
/// extension and size rules before any bytes reach the classifier.
async fn read_upload(mut payload: Multipart, max_bytes: usize) -> Result<UploadedImage, UploadError> {
    while let Ok(Some(mut field)) = payload.try_next().await {
        if field.name() != Some("file") {
            // Drain unrelated fields so the stream can advance.
            while let Some(chunk) = field.next().await {
                if chunk.is_err() {
                    break;
                }
            }
            continue;
        }

        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .unwrap_or_default()
            .to_string();
        if filename.is_empty() {
            return Err(UploadError::MissingFile);
        }
        if !allowed_file(&filename) {
            return Err(UploadError::UnsupportedType);
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let data = chunk.map_err(|_| UploadError::Unreadable)?;
            if bytes.len() + data.len() > max_bytes {
                return Err(UploadError::TooLarge);
            }
            bytes.extend_from_slice(&data);
        }

        return Ok(UploadedImage { filename, bytes });
    }

    Err(UploadError::MissingFile)
}

fn allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}
