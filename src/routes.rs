use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use utoipa::OpenApi;

use crate::error::ApodError;
use crate::nasa::model::DEFAULT_MEDIA_TYPE;
use crate::nasa::ApodRecord;
use crate::openapi::ApiDoc;
use crate::state::AppState;

const NON_IMAGE_MESSAGE: &str = "APOD atual não é uma imagem.";
const MEDIA_DISPOSITION: &str = "inline; filename=apod-media";

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/apod", get(get_apod))
        .route("/apod/image", get(get_apod_image))
        .route("/api-docs/openapi.json", get(openapi_json))
        .route("/health", get(health_check))
}

/// Full application: routes, middleware and state.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(create_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Busca APOD (Astronomy Picture of the Day) da NASA
#[utoipa::path(
    get,
    path = "/apod",
    tag = "apod",
    responses(
        (status = 200, description = "APOD retornado com sucesso", body = ApodRecord),
        (status = 502, description = "Resposta vazia da API da NASA"),
        (status = 503, description = "Serviço indisponível")
    )
)]
pub async fn get_apod(State(state): State<AppState>) -> Result<Json<ApodRecord>, ApodError> {
    let mut apod = state.nasa.fetch_apod().await?;

    // Sequential on purpose: each field's chunks keep their order and the
    // outbound call count stays predictable.
    let title = state.translator.translate(apod.title()).await;
    if let Some(title) = title {
        apod.set_title(title);
    }
    let explanation = state.translator.translate(apod.explanation()).await;
    if let Some(explanation) = explanation {
        apod.set_explanation(explanation);
    }

    Ok(Json(apod))
}

/// Retorna a mídia (imagem) do APOD como binário
#[utoipa::path(
    get,
    path = "/apod/image",
    tag = "apod",
    responses(
        (status = 200, description = "Imagem retornada com sucesso", content_type = "image/*", body = Vec<u8>),
        (status = 204, description = "APOD atual é um vídeo ou não há imagem para retornar"),
        (status = 502, description = "Resposta vazia da API da NASA"),
        (status = 503, description = "Serviço indisponível")
    )
)]
pub async fn get_apod_image(State(state): State<AppState>) -> Result<Response, ApodError> {
    let apod = state.nasa.fetch_apod().await.map_err(|e| match e {
        ApodError::EmptyPayload => ApodError::MissingMediaUrl,
        other => other,
    })?;
    let url = apod.url().ok_or(ApodError::MissingMediaUrl)?;

    let media = state.nasa.fetch_media(url).await?;
    if !media.is_image_like() {
        info!(content_type = media.content_type(), %url, "{}", NON_IMAGE_MESSAGE);
        return Ok((StatusCode::NO_CONTENT, NON_IMAGE_MESSAGE).into_response());
    }

    let content_type = HeaderValue::from_str(media.content_type())
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_MEDIA_TYPE));

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, HeaderValue::from_static(MEDIA_DISPOSITION)),
        ],
        media.bytes,
    )
        .into_response())
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "langpair": state.config.translation.langpair,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, HttpConfig, NasaApiConfig, NasaConfig, ServerConfig, TranslationConfig};
    use axum::body::{Body, Bytes};
    use axum::http::{HeaderMap, Request};
    use mockito::{Matcher, Mock, Server, ServerGuard};
    use tower::ServiceExt;

    const NASA_PATH: &str = "/planetary/apod";

    fn config_for(nasa_base: &str, translate_base: &str) -> Config {
        Config {
            server: ServerConfig::default(),
            nasa: NasaConfig {
                api: NasaApiConfig {
                    url: format!("{}{}", nasa_base, NASA_PATH),
                    key: "DEMO_KEY".to_string(),
                },
            },
            translation: TranslationConfig {
                api_url: format!("{}/get", translate_base),
                langpair: "en|pt-BR".to_string(),
            },
            http: HttpConfig::default(),
        }
    }

    /// Address nothing listens on, for connection failures.
    fn closed_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}", addr)
    }

    fn app_for(server: &ServerGuard) -> Router {
        let config = config_for(&server.url(), &server.url());
        build_app(AppState::new(config).unwrap())
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, HeaderMap, Bytes) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, body)
    }

    async fn mock_nasa(server: &mut ServerGuard, status: usize, body: &str) -> Mock {
        server
            .mock("GET", NASA_PATH)
            .match_query(Matcher::UrlEncoded("api_key".into(), "DEMO_KEY".into()))
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    async fn mock_translation(server: &mut ServerGuard, input: &str, output: &str) -> Mock {
        server
            .mock("GET", "/get")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), input.into()),
                Matcher::UrlEncoded("langpair".into(), "en|pt-BR".into()),
            ]))
            .with_status(200)
            .with_body(json!({"responseData": {"translatedText": output}}).to_string())
            .expect(1)
            .create_async()
            .await
    }

    fn text_with_periods(len: usize, periods: &[usize]) -> String {
        (0..len)
            .map(|i| {
                if periods.contains(&i) {
                    '.'
                } else if i % 9 == 8 {
                    ' '
                } else {
                    'w'
                }
            })
            .collect()
    }

    #[tokio::test]
    async fn short_fields_are_translated() {
        let mut server = Server::new_async().await;
        let _nasa = mock_nasa(
            &mut server,
            200,
            r#"{"title":"Galaxy","explanation":"A spiral galaxy.","url":"http://x/y.jpg"}"#,
        )
        .await;
        let title = mock_translation(&mut server, "Galaxy", "Galáxia").await;
        let explanation =
            mock_translation(&mut server, "A spiral galaxy.", "Uma galáxia espiral.").await;

        let (status, _, body) = get(app_for(&server), "/apod").await;

        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            json,
            json!({"title": "Galáxia", "explanation": "Uma galáxia espiral.", "url": "http://x/y.jpg"})
        );
        title.assert_async().await;
        explanation.assert_async().await;
    }

    #[tokio::test]
    async fn long_explanation_is_translated_in_three_chunks() {
        let explanation = text_with_periods(1200, &[480, 900]);
        let mut server = Server::new_async().await;
        let nasa_body = json!({"title": "Galaxy", "explanation": &explanation, "url": "http://x/y.jpg"});
        let _nasa = mock_nasa(&mut server, 200, &nasa_body.to_string()).await;
        let _title = mock_translation(&mut server, "Galaxy", "Galáxia").await;
        let chunks = [
            mock_translation(&mut server, &explanation[..481], "um.").await,
            mock_translation(&mut server, &explanation[481..901], "dois.").await,
            mock_translation(&mut server, &explanation[901..], "três").await,
        ];

        let (status, _, body) = get(app_for(&server), "/apod").await;

        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["explanation"], "um. dois. três");
        for chunk in &chunks {
            chunk.assert_async().await;
        }
    }

    #[tokio::test]
    async fn translation_failures_keep_original_text() {
        let mut server = Server::new_async().await;
        let _nasa = mock_nasa(
            &mut server,
            200,
            r#"{"title":"Galaxy","explanation":"A spiral galaxy.","url":"http://x/y.jpg"}"#,
        )
        .await;
        let translations = server
            .mock("GET", "/get")
            .match_query(Matcher::Any)
            .with_status(500)
            .expect(2)
            .create_async()
            .await;

        let (status, _, body) = get(app_for(&server), "/apod").await;

        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["title"], "Galaxy");
        assert_eq!(json["explanation"], "A spiral galaxy.");
        translations.assert_async().await;
    }

    #[tokio::test]
    async fn other_fields_pass_through() {
        let nasa_body = r#"{"copyright":"Jane Doe","date":"2024-05-01","explanation":"A spiral galaxy.","hdurl":null,"media_type":"image","service_version":"v1","title":"Galaxy","url":"http://x/y.jpg"}"#;
        let mut server = Server::new_async().await;
        let _nasa = mock_nasa(&mut server, 200, nasa_body).await;
        let _title = mock_translation(&mut server, "Galaxy", "Galáxia").await;
        let _explanation =
            mock_translation(&mut server, "A spiral galaxy.", "Uma galáxia espiral.").await;

        let (status, _, body) = get(app_for(&server), "/apod").await;

        assert_eq!(status, StatusCode::OK);
        let expected = nasa_body
            .replace(r#""title":"Galaxy""#, r#""title":"Galáxia""#)
            .replace(
                r#""explanation":"A spiral galaxy.""#,
                r#""explanation":"Uma galáxia espiral.""#,
            );
        assert_eq!(String::from_utf8_lossy(&body), expected);
    }

    #[tokio::test]
    async fn missing_and_null_text_fields_are_not_translated() {
        let nasa_body = r#"{"date":"2024-05-01","explanation":null,"media_type":"video","url":"http://x/v.mp4"}"#;
        let mut server = Server::new_async().await;
        let _nasa = mock_nasa(&mut server, 200, nasa_body).await;
        let translations = server
            .mock("GET", "/get")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let (status, _, body) = get(app_for(&server), "/apod").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(String::from_utf8_lossy(&body), nasa_body);
        translations.assert_async().await;
    }

    #[tokio::test]
    async fn empty_upstream_body_is_bad_gateway() {
        let mut server = Server::new_async().await;
        let _nasa = mock_nasa(&mut server, 200, "").await;
        let translations = server
            .mock("GET", "/get")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let (status, _, body) = get(app_for(&server), "/apod").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(
            String::from_utf8_lossy(&body),
            "Não foi possível obter os dados da NASA neste momento."
        );
        translations.assert_async().await;
    }

    #[tokio::test]
    async fn upstream_status_is_relayed() {
        let mut server = Server::new_async().await;
        let _nasa = mock_nasa(&mut server, 429, r#"{"error":"OVER_RATE_LIMIT"}"#).await;

        let (status, _, body) = get(app_for(&server), "/apod").await;

        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        let body = String::from_utf8_lossy(&body);
        assert!(body.starts_with("Erro ao acessar a API da NASA"));
        assert!(body.contains("Too Many Requests"));
    }

    #[tokio::test]
    async fn transport_failure_is_service_unavailable() {
        let dead_url = closed_url();
        let app = build_app(AppState::new(config_for(&dead_url, &dead_url)).unwrap());
        let (status, _, body) = get(app.clone(), "/apod").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(String::from_utf8_lossy(&body).starts_with("Serviço indisponível"));

        let (status, _, _) = get(app, "/apod/image").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn video_media_is_no_content() {
        let mut server = Server::new_async().await;
        let nasa_body = json!({"title": "Launch", "url": format!("{}/launch.mp4", server.url())});
        let _nasa = mock_nasa(&mut server, 200, &nasa_body.to_string()).await;
        let _media = server
            .mock("GET", "/launch.mp4")
            .with_status(200)
            .with_header("content-type", "video/mp4")
            .with_body([0u8, 0, 0, 0x18, b'f', b't', b'y', b'p'])
            .create_async()
            .await;

        let (status, _, _) = get(app_for(&server), "/apod/image").await;

        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn html_media_is_no_content() {
        let mut server = Server::new_async().await;
        let nasa_body = json!({"url": format!("{}/embed", server.url())});
        let _nasa = mock_nasa(&mut server, 200, &nasa_body.to_string()).await;
        let _media = server
            .mock("GET", "/embed")
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body("<html><iframe></iframe></html>")
            .create_async()
            .await;

        let (status, _, _) = get(app_for(&server), "/apod/image").await;

        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn image_bytes_are_relayed() {
        let png = [0x89u8, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        let mut server = Server::new_async().await;
        let nasa_body = json!({"title": "Galaxy", "url": format!("{}/y.png", server.url())});
        let _nasa = mock_nasa(&mut server, 200, &nasa_body.to_string()).await;
        let _media = server
            .mock("GET", "/y.png")
            .with_status(200)
            .with_header("content-type", "image/png")
            .with_body(png)
            .create_async()
            .await;
        let translations = server
            .mock("GET", "/get")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let (status, headers, body) = get(app_for(&server), "/apod/image").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(&body[..], &png[..]);
        assert_eq!(headers[header::CONTENT_TYPE], "image/png");
        assert_eq!(headers[header::CONTENT_DISPOSITION], "inline; filename=apod-media");
        translations.assert_async().await;
    }

    #[tokio::test]
    async fn media_without_content_type_is_octet_stream() {
        let mut server = Server::new_async().await;
        let nasa_body = json!({"url": format!("{}/blob", server.url())});
        let _nasa = mock_nasa(&mut server, 200, &nasa_body.to_string()).await;
        let _media = server
            .mock("GET", "/blob")
            .with_status(200)
            .with_body("raw")
            .create_async()
            .await;

        let (status, headers, body) = get(app_for(&server), "/apod/image").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], DEFAULT_MEDIA_TYPE);
        assert_eq!(&body[..], b"raw");
    }

    #[tokio::test]
    async fn missing_url_or_media_is_bad_gateway() {
        let mut server = Server::new_async().await;
        let _nasa = mock_nasa(&mut server, 200, r#"{"title":"Galaxy","url":null}"#).await;

        let (status, _, body) = get(app_for(&server), "/apod/image").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(
            String::from_utf8_lossy(&body),
            "Não foi possível obter a URL da mídia da NASA neste momento."
        );

        let mut server = Server::new_async().await;
        let nasa_body = json!({"url": format!("{}/gone.jpg", server.url())});
        let _nasa = mock_nasa(&mut server, 200, &nasa_body.to_string()).await;
        let _media = server
            .mock("GET", "/gone.jpg")
            .with_status(404)
            .create_async()
            .await;

        let (status, _, body) = get(app_for(&server), "/apod/image").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(
            String::from_utf8_lossy(&body),
            "Não foi possível baixar a mídia da URL fornecida pela NASA."
        );
    }

    #[tokio::test]
    async fn image_endpoint_relays_nasa_status() {
        let mut server = Server::new_async().await;
        let _nasa = mock_nasa(&mut server, 403, "forbidden").await;

        let (status, _, _) = get(app_for(&server), "/apod/image").await;

        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn serves_openapi_and_health() {
        let server = Server::new_async().await;
        let app = app_for(&server);

        let (status, _, body) = get(app.clone(), "/api-docs/openapi.json").await;
        assert_eq!(status, StatusCode::OK);
        let doc: Value = serde_json::from_slice(&body).unwrap();
        assert!(doc["paths"]["/apod/image"].is_object());

        let (status, _, body) = get(app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        let health: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(health["status"], "ok");
    }
}
