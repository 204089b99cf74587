use crate::error::ApiError;
use crate::multipart::UploadForm;
use crate::AppState;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use application::command::staging::{unique_name, TempUpload};
use application::command::upload::NftUploadRequest;
use log::info;
use model::metadata::MetadataInput;
use model::uri;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::Path;

/// Display name of the staged pair folder on the pinning provider.
const PAIR_FOLDER_NAME: &str = "music-nft";

pub fn configure_routes(svc: &mut web::ServiceConfig) {
    svc.service(
        web::scope("/upload")
            .route("/track", web::post().to(upload_track))
            .route("/cover", web::post().to(upload_cover))
            .route("/both", web::post().to(upload_both))
            .route("/folder", web::post().to(upload_folder))
            .route("/mint/prepare", web::post().to(mint_prepare))
            .route("", web::post().to(upload_nft)),
    );
}

fn with_success(value: Value) -> Value {
    match value {
        Value::Object(mut map) => {
            map.insert("success".to_string(), json!(true));
            Value::Object(map)
        }
        other => other,
    }
}

async fn upload_track(
    state: web::Data<AppState>,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    info!("POST /upload/track");
    let cfg = state.app_cfg.upload();
    let form = UploadForm::read(&mut payload, cfg.max_file_size).await?;
    let track = form.require_file("track", "No track file provided")?;

    let temp = TempUpload::write(
        &cfg.staging_root(),
        &unique_name(&track.file_name),
        &track.data,
    )
    .await
    .map_err(|e| ApiError::internal("Failed to upload track", e))?;

    let result = state
        .uploads
        .upload_file(temp.path(), &track.file_name)
        .await
        .map_err(|e| ApiError::internal("Failed to upload track", e))?;

    Ok(HttpResponse::Ok().json(json!({ "success": true, "track": result })))
}

async fn upload_cover(
    state: web::Data<AppState>,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    info!("POST /upload/cover");
    let cfg = state.app_cfg.upload();
    let form = UploadForm::read(&mut payload, cfg.max_file_size).await?;
    let cover = form.require_file("cover", "No cover file provided")?;

    let temp = TempUpload::write(
        &cfg.staging_root(),
        &unique_name(&cover.file_name),
        &cover.data,
    )
    .await
    .map_err(|e| ApiError::internal("Failed to upload cover", e))?;

    let result = state
        .uploads
        .upload_file(temp.path(), &cover.file_name)
        .await
        .map_err(|e| ApiError::internal("Failed to upload cover", e))?;

    Ok(HttpResponse::Ok().json(json!({ "success": true, "cover": result })))
}

async fn upload_both(
    state: web::Data<AppState>,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    info!("POST /upload/both");
    let cfg = state.app_cfg.upload();
    let form = UploadForm::read(&mut payload, cfg.max_file_size).await?;
    let track = form.require_file("track", "No track file provided")?;
    let cover = form.require_file("cover", "No cover file provided")?;

    let metadata: Option<MetadataInput> = match form.field("metadata") {
        Some(raw) if !raw.is_empty() => Some(
            serde_json::from_str(raw)
                .map_err(|e| ApiError::bad_request(format!("Invalid metadata JSON: {e}")))?,
        ),
        _ => None,
    };

    let context = "Failed to upload files";
    let staging_root = cfg.staging_root();
    let track_temp = TempUpload::write(&staging_root, &unique_name(&track.file_name), &track.data)
        .await
        .map_err(|e| ApiError::internal(context, e))?;
    let cover_temp = TempUpload::write(&staging_root, &unique_name(&cover.file_name), &cover.data)
        .await
        .map_err(|e| ApiError::internal(context, e))?;

    let body = match metadata {
        Some(input) => {
            let result = state
                .uploads
                .upload_track_cover_with_metadata(
                    track_temp.path(),
                    &track.file_name,
                    cover_temp.path(),
                    &cover.file_name,
                    &input,
                    PAIR_FOLDER_NAME,
                )
                .await
                .map_err(|e| ApiError::internal(context, e))?;
            serde_json::to_value(result).map_err(|e| ApiError::internal(context, e.into()))?
        }
        None => {
            let result = state
                .uploads
                .upload_track_cover_as_folder(
                    track_temp.path(),
                    &track.file_name,
                    cover_temp.path(),
                    &cover.file_name,
                    PAIR_FOLDER_NAME,
                )
                .await
                .map_err(|e| ApiError::internal(context, e))?;
            serde_json::to_value(result).map_err(|e| ApiError::internal(context, e.into()))?
        }
    };

    Ok(HttpResponse::Ok().json(with_success(body)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderUploadBody {
    folder_path: Option<String>,
    custom_name: Option<String>,
    track_file_name: Option<String>,
    cover_file_name: Option<String>,
    metadata: Option<MetadataInput>,
}

fn folder_path_example() -> Value {
    json!({
        "folderPath": "/path/to/your/folder",
        "customName": "my-music-collection",
        "trackFileName": "track.mp3",
        "coverFileName": "cover.jpg",
        "metadata": {
            "name": "Music NFT #1",
            "description": "Description",
            "artist": "Artist Name",
            "duration": "3:25",
            "format": "MP3",
            "external_url": "https://example.com",
            "customAttributes": [
                { "trait_type": "Genre", "value": "Lo-fi" }
            ]
        }
    })
}

async fn upload_folder(
    state: web::Data<AppState>,
    body: web::Json<FolderUploadBody>,
) -> Result<HttpResponse, ApiError> {
    info!("POST /upload/folder");
    let context = "Failed to upload folder";

    let folder_path = body
        .folder_path
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| {
            ApiError::bad_request_with_example("folderPath is required", folder_path_example())
        })?;

    let result = match (&body.metadata, &body.track_file_name, &body.cover_file_name) {
        (Some(metadata), Some(track_file), Some(cover_file)) => {
            let result = state
                .uploads
                .upload_folder_with_metadata(
                    Path::new(folder_path),
                    track_file,
                    cover_file,
                    metadata,
                    body.custom_name.as_deref(),
                )
                .await
                .map_err(|e| ApiError::internal(context, e))?;
            serde_json::to_value(result).map_err(|e| ApiError::internal(context, e.into()))?
        }
        _ => {
            let result = state
                .uploads
                .upload_folder(Path::new(folder_path), body.custom_name.as_deref())
                .await
                .map_err(|e| ApiError::internal(context, e))?;
            serde_json::to_value(result).map_err(|e| ApiError::internal(context, e.into()))?
        }
    };

    Ok(HttpResponse::Ok().json(with_success(result)))
}

async fn upload_nft(
    state: web::Data<AppState>,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    info!("POST /upload");
    let context = "Failed to upload music NFT";
    let cfg = state.app_cfg.upload();
    let form = UploadForm::read(&mut payload, cfg.max_file_size).await?;
    let track = form.require_file("track", "No track file provided")?;
    let cover = form.require_file("cover", "No cover file provided")?;

    let request = NftUploadRequest {
        prompt: form.require_field("prompt")?.to_string(),
        username: form.require_field("username")?.to_string(),
        token_id: form.field("token_id").map(str::to_string),
        external_url: form.field("external_url").map(str::to_string),
        name: form.field("name").map(str::to_string),
    };

    let staging_root = cfg.staging_root();
    let track_temp = TempUpload::write(&staging_root, &unique_name(&track.file_name), &track.data)
        .await
        .map_err(|e| ApiError::internal(context, e))?;
    let cover_temp = TempUpload::write(&staging_root, &unique_name(&cover.file_name), &cover.data)
        .await
        .map_err(|e| ApiError::internal(context, e))?;

    let result = state
        .uploads
        .upload_music_nft(track_temp.path(), cover_temp.path(), &request)
        .await
        .map_err(|e| ApiError::internal(context, e))?;

    let token_uri = result.metadata_url.clone();
    let gateway_base = state.app_cfg.gateway().upload_base;
    let mut body = with_success(
        serde_json::to_value(result).map_err(|e| ApiError::internal(context, e.into()))?,
    );
    if let Value::Object(ref mut map) = body {
        map.insert("tokenURI".to_string(), json!(token_uri));
        map.insert(
            "tokenURIGateway".to_string(),
            json!(uri::to_gateway(&token_uri, &gateway_base)),
        );
    }

    Ok(HttpResponse::Ok().json(body))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintPrepareBody {
    metadata_cid: Option<String>,
    folder_cid: Option<String>,
}

async fn mint_prepare(
    state: web::Data<AppState>,
    body: web::Json<MintPrepareBody>,
) -> Result<HttpResponse, ApiError> {
    info!("POST /upload/mint/prepare");

    let metadata_cid = body.metadata_cid.as_deref().filter(|c| !c.is_empty());
    let folder_cid = body.folder_cid.as_deref().filter(|c| !c.is_empty());

    // a direct metadata CID wins over the folder form
    let token_uri = match (metadata_cid, folder_cid) {
        (Some(cid), _) => uri::token_uri(cid, false),
        (None, Some(cid)) => uri::token_uri(cid, true),
        (None, None) => {
            return Err(ApiError::bad_request_with_example(
                "Either metadataCid or folderCid is required",
                json!({
                    "metadataCid": "QmXXXXXX...",
                    "folderCid": "QmYYYYYY...",
                }),
            ))
        }
    };

    let gateway_url = uri::to_gateway(&token_uri, &state.app_cfg.gateway().mint_base);
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "tokenURI": token_uri,
        "gatewayUrl": gateway_url,
    })))
}
