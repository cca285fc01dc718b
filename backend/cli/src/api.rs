use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, patch, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use vozform_config::VozformConfig;
use vozform_core::{MemoryNotifier, Notice, VozError};
use vozform_forms::{
    parameter_by_name, predefined_fields, FieldPatch, FormSink, FormWizard, Icon, StylePatch,
    WizardOptions,
};
use vozform_keyboard::{layout, KeyboardInput, KeyboardOptions, SubmitOutcome, VoiceOutcome};
use vozform_tts::{ClipRecorder, TtsProvider};

use crate::sessions::SessionStore;

/// A keyboard driven over HTTP. Audio is captured instead of played and
/// handed back to the caller as a data URI.
pub struct KeyboardSession {
    pub keyboard: KeyboardInput,
    pub recorder: Arc<ClipRecorder>,
    pub notifier: Arc<MemoryNotifier>,
}

pub struct WizardSession {
    pub wizard: FormWizard,
    pub notifier: Arc<MemoryNotifier>,
}

/// Shared application state for API handlers.
pub struct AppState {
    pub config: VozformConfig,
    pub tts: Arc<dyn TtsProvider>,
    pub forms: Arc<dyn FormSink>,
    pub keyboards: SessionStore<KeyboardSession>,
    pub wizards: SessionStore<WizardSession>,
}

impl AppState {
    pub fn new(config: VozformConfig, tts: Arc<dyn TtsProvider>, forms: Arc<dyn FormSink>) -> Self {
        let capacity = config.max_sessions();
        let idle = Duration::from_secs(config.session_idle_secs());
        Self {
            config,
            tts,
            forms,
            keyboards: SessionStore::new("keyboard", capacity, idle),
            wizards: SessionStore::new("wizard", capacity, idle),
        }
    }

    async fn keyboard(&self, id: Uuid) -> Result<Arc<KeyboardSession>, ApiError> {
        self.keyboards
            .get(id)
            .await
            .ok_or_else(|| ApiError::not_found("keyboard", id))
    }

    async fn wizard(&self, id: Uuid) -> Result<Arc<WizardSession>, ApiError> {
        self.wizards
            .get(id)
            .await
            .ok_or_else(|| ApiError::not_found("wizard", id))
    }

    /// Drop idle sessions of both kinds.
    pub async fn cleanup(&self) -> usize {
        self.keyboards.cleanup().await + self.wizards.cleanup().await
    }
}

/// Build the Axum router with all API routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/catalog", get(catalog))
        .route("/api/keyboards", post(create_keyboard))
        .route("/api/keyboards/:id", get(get_keyboard).delete(delete_keyboard))
        .route("/api/keyboards/:id/keys", post(press_key))
        .route("/api/keyboards/:id/space", post(press_space))
        .route("/api/keyboards/:id/voice", post(activate_voice))
        .route("/api/keyboards/:id/submit", post(submit_text))
        .route("/api/wizards", post(create_wizard))
        .route("/api/wizards/:id", get(get_wizard).delete(delete_wizard))
        .route("/api/wizards/:id/fields/:field/toggle", post(toggle_field))
        .route("/api/wizards/:id/fields/:field", patch(update_field))
        .route("/api/wizards/:id/finalize", post(finalize_fields))
        .route("/api/wizards/:id/style/next", post(proceed_to_style))
        .route("/api/wizards/:id/style", patch(update_style))
        .route("/api/wizards/:id/preview", get(render_preview).post(proceed_to_preview))
        .route("/api/wizards/:id/submit", post(submit_form))
        .route("/api/wizards/:id/restart", post(restart_wizard))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// HTTP status for a component error.
pub fn status_for(err: &VozError) -> StatusCode {
    match err {
        VozError::Busy(_) | VozError::InvalidTransition { .. } => StatusCode::CONFLICT,
        VozError::IndexOutOfRange { .. } => StatusCode::NOT_FOUND,
        VozError::InvariantViolation(_) | VozError::InvalidStyle { .. } => StatusCode::BAD_REQUEST,
        VozError::EmptySelection | VozError::MissingSubmissionData(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        VozError::UnsupportedCapability(_) => StatusCode::NOT_IMPLEMENTED,
        VozError::NetworkFailure { .. } => StatusCode::BAD_GATEWAY,
        VozError::PlaybackFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub struct ApiError {
    status: StatusCode,
    body: Value,
}

impl ApiError {
    fn not_found(what: &str, id: Uuid) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            body: json!({ "error": "not_found", "message": format!("no {what} with id {id}") }),
        }
    }

    fn component(err: VozError, notices: Vec<Notice>) -> Self {
        let status = status_for(&err);
        if status.is_server_error() {
            warn!(error = %err, kind = err.kind(), "Request failed");
        }
        Self {
            status,
            body: json!({
                "error": err.kind(),
                "message": err.to_string(),
                "notices": notices,
            }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

type ApiResult = Result<Json<Value>, ApiError>;

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Health check endpoint.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "vozform",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn catalog() -> Json<Value> {
    let icons: Vec<&str> = Icon::ALL.iter().map(Icon::key).collect();
    Json(json!({ "fields": predefined_fields(), "icons": icons }))
}

// ---------------------------------------------------------------------------
// Keyboard
// ---------------------------------------------------------------------------

async fn create_keyboard(State(state): State<Arc<AppState>>) -> Json<Value> {
    let id = Uuid::new_v4();
    let recorder = Arc::new(ClipRecorder::new());
    let notifier = Arc::new(MemoryNotifier::default());
    let keyboard = KeyboardInput::new(state.tts.clone(), recorder.clone(), notifier.clone())
        .with_options(KeyboardOptions {
            session: id.to_string(),
            clear_after_send: state.config.clear_after_send(),
        });

    state
        .keyboards
        .insert(
            id,
            Arc::new(KeyboardSession {
                keyboard,
                recorder,
                notifier,
            }),
        )
        .await;
    let live = state.keyboards.len().await;
    info!(keyboard = %id, live, "Keyboard session created");
    Json(json!({ "id": id, "layout": layout::rows() }))
}

fn keyboard_view(id: Uuid, session: &KeyboardSession) -> Value {
    json!({
        "id": id,
        "text": session.keyboard.text(),
        "phase": session.keyboard.phase(),
    })
}

async fn get_keyboard(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> ApiResult {
    let session = state.keyboard(id).await?;
    Ok(Json(keyboard_view(id, &session)))
}

async fn delete_keyboard(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !state.keyboards.remove(id).await {
        return Err(ApiError::not_found("keyboard", id));
    }
    info!(keyboard = %id, "Keyboard session closed");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
struct KeyPress {
    key: String,
}

async fn press_key(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<KeyPress>,
) -> ApiResult {
    let session = state.keyboard(id).await?;
    let mut chars = body.key.chars();
    let key = match (chars.next(), chars.next()) {
        (Some(key), None) => key,
        _ => {
            return Err(ApiError::component(
                VozError::InvariantViolation(format!("expected a single key, got {:?}", body.key)),
                Vec::new(),
            ))
        }
    };
    session.keyboard.press_key(key);
    Ok(Json(keyboard_view(id, &session)))
}

async fn press_space(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> ApiResult {
    let session = state.keyboard(id).await?;
    session.keyboard.press_space();
    Ok(Json(keyboard_view(id, &session)))
}

/// Outcome of a keyboard action plus the captured audio and notices.
fn keyboard_reply(session: &KeyboardSession, outcome: Value) -> Value {
    json!({
        "outcome": outcome,
        "text": session.keyboard.text(),
        "audio": session.recorder.take().map(|clip| clip.data_uri()),
        "notices": session.notifier.drain(),
    })
}

async fn activate_voice(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> ApiResult {
    let session = state.keyboard(id).await?;
    let outcome: Result<VoiceOutcome, VozError> = session.keyboard.activate_voice().await;
    match outcome {
        Ok(outcome) => Ok(Json(keyboard_reply(&session, json!(outcome)))),
        Err(err) => Err(ApiError::component(err, session.notifier.drain())),
    }
}

async fn submit_text(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> ApiResult {
    let session = state.keyboard(id).await?;
    let outcome: Result<SubmitOutcome, VozError> = session.keyboard.submit_text().await;
    match outcome {
        Ok(outcome) => Ok(Json(keyboard_reply(&session, json!(outcome)))),
        Err(err) => Err(ApiError::component(err, session.notifier.drain())),
    }
}

// ---------------------------------------------------------------------------
// Wizard
// ---------------------------------------------------------------------------

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct NewWizard {
    session_id: Option<String>,
    /// Page URL carrying the session id as its `id` query parameter.
    url: Option<String>,
}

async fn create_wizard(
    State(state): State<Arc<AppState>>,
    body: Option<Json<NewWizard>>,
) -> Json<Value> {
    let body = body.map(|Json(body)| body).unwrap_or_default();
    let session_id = body
        .session_id
        .or_else(|| body.url.as_deref().and_then(|url| parameter_by_name(url, "id")));

    let id = Uuid::new_v4();
    let notifier = Arc::new(MemoryNotifier::default());
    let wizard = FormWizard::new(session_id.clone(), notifier.clone()).with_options(WizardOptions {
        require_selection: state.config.require_selection(),
    });

    state
        .wizards
        .insert(id, Arc::new(WizardSession { wizard, notifier }))
        .await;
    let live = state.wizards.len().await;
    info!(wizard = %id, session = ?session_id, live, "Wizard created");
    Json(json!({ "id": id, "sessionId": session_id }))
}

/// Run a synchronous wizard step and answer with the new snapshot.
fn wizard_step(
    session: &WizardSession,
    step: impl FnOnce(&FormWizard) -> Result<(), VozError>,
) -> ApiResult {
    match step(&session.wizard) {
        Ok(()) => Ok(Json(json!(session.wizard.snapshot()))),
        Err(err) => Err(ApiError::component(err, session.notifier.drain())),
    }
}

async fn get_wizard(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> ApiResult {
    let session = state.wizard(id).await?;
    Ok(Json(json!(session.wizard.snapshot())))
}

async fn delete_wizard(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !state.wizards.remove(id).await {
        return Err(ApiError::not_found("wizard", id));
    }
    info!(wizard = %id, "Wizard closed");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
struct Toggle {
    checked: bool,
}

async fn toggle_field(
    State(state): State<Arc<AppState>>,
    Path((id, field)): Path<(Uuid, String)>,
    Json(body): Json<Toggle>,
) -> ApiResult {
    let session = state.wizard(id).await?;
    wizard_step(&session, |w| w.toggle_field(&field, body.checked))
}

async fn finalize_fields(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> ApiResult {
    let session = state.wizard(id).await?;
    wizard_step(&session, FormWizard::finalize_field_selection)
}

async fn update_field(
    State(state): State<Arc<AppState>>,
    Path((id, index)): Path<(Uuid, usize)>,
    Json(patch): Json<FieldPatch>,
) -> ApiResult {
    let session = state.wizard(id).await?;
    wizard_step(&session, |w| w.update_field(index, patch))
}

async fn proceed_to_style(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> ApiResult {
    let session = state.wizard(id).await?;
    wizard_step(&session, FormWizard::proceed_to_style)
}

async fn update_style(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(patch): Json<StylePatch>,
) -> ApiResult {
    let session = state.wizard(id).await?;
    wizard_step(&session, |w| w.update_style(patch))
}

async fn proceed_to_preview(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> ApiResult {
    let session = state.wizard(id).await?;
    wizard_step(&session, FormWizard::proceed_to_preview)
}

async fn render_preview(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let session = state.wizard(id).await?;
    let html = session
        .wizard
        .render_preview()
        .map_err(|err| ApiError::component(err, session.notifier.drain()))?;
    Ok(([(header::CONTENT_TYPE, "text/html; charset=utf-8")], html).into_response())
}

async fn submit_form(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> ApiResult {
    let session = state.wizard(id).await?;
    match session.wizard.submit_form(state.forms.as_ref()).await {
        Ok(receipt) => Ok(Json(json!({
            "receipt": receipt,
            "notices": session.notifier.drain(),
        }))),
        Err(err) => Err(ApiError::component(err, session.notifier.drain())),
    }
}

async fn restart_wizard(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> ApiResult {
    let session = state.wizard(id).await?;
    session.wizard.restart();
    Ok(Json(json!(session.wizard.snapshot())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;
    use vozform_config::schema::ServerConfig;
    use vozform_forms::WebhookFormSink;
    use vozform_tts::WebhookTts;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn spawn_api(hooks: &MockServer) -> String {
        spawn_api_with(hooks, VozformConfig::default()).await
    }

    async fn spawn_api_with(hooks: &MockServer, config: VozformConfig) -> String {
        let state = Arc::new(AppState::new(
            config,
            Arc::new(WebhookTts::new(format!("{}/tts", hooks.uri()))),
            Arc::new(WebhookFormSink::new(format!("{}/get-form", hooks.uri()))),
        ));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, build_router(state)).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn errors_map_to_statuses() {
        assert_eq!(status_for(&VozError::Busy("sending".into())), StatusCode::CONFLICT);
        assert_eq!(
            status_for(&VozError::IndexOutOfRange { index: 2, len: 1 }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(status_for(&VozError::EmptySelection), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            status_for(&VozError::UnsupportedCapability("speech".into())),
            StatusCode::NOT_IMPLEMENTED
        );
        assert_eq!(status_for(&VozError::network("down")), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn keyboard_round_trip_returns_audio() {
        let hooks = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tts"))
            .and(body_json(json!({ "text": "oi" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "audioBase64": "AAAA" })))
            .expect(1)
            .mount(&hooks)
            .await;
        let base = spawn_api(&hooks).await;
        let client = reqwest::Client::new();

        let created: Value = client
            .post(format!("{base}/api/keyboards"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(created["layout"][0][0], "Q");
        let kb = format!("{base}/api/keyboards/{}", created["id"].as_str().unwrap());

        for key in ["o", "i"] {
            client
                .post(format!("{kb}/keys"))
                .json(&json!({ "key": key }))
                .send()
                .await
                .unwrap();
        }
        let reply: Value = client
            .post(format!("{kb}/submit"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(reply["outcome"]["outcome"], "sent");
        assert_eq!(reply["audio"], "data:audio/mpeg;base64,AAAA");
        assert_eq!(reply["text"], "oi");
    }

    #[tokio::test]
    async fn voice_is_unsupported_on_the_server() {
        let hooks = MockServer::start().await;
        let base = spawn_api(&hooks).await;
        let client = reqwest::Client::new();

        let created: Value = client
            .post(format!("{base}/api/keyboards"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let resp = client
            .post(format!("{base}/api/keyboards/{}/voice", created["id"].as_str().unwrap()))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), reqwest::StatusCode::NOT_IMPLEMENTED);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"], "unsupported_capability");
    }

    #[tokio::test]
    async fn wizard_flow_submits_markup() {
        let hooks = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/get-form"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&hooks)
            .await;
        let base = spawn_api(&hooks).await;
        let client = reqwest::Client::new();

        let created: Value = client
            .post(format!("{base}/api/wizards"))
            .json(&json!({ "url": "https://forms.example/editor?id=abc" }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(created["sessionId"], "abc");
        let wz = format!("{base}/api/wizards/{}", created["id"].as_str().unwrap());

        client
            .post(format!("{wz}/fields/name/toggle"))
            .json(&json!({ "checked": true }))
            .send()
            .await
            .unwrap();
        client.post(format!("{wz}/finalize")).send().await.unwrap();

        let missing = client
            .patch(format!("{wz}/fields/4"))
            .json(&json!({ "label": "x" }))
            .send()
            .await
            .unwrap();
        assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);

        client.post(format!("{wz}/style/next")).send().await.unwrap();
        let bad_style = client
            .patch(format!("{wz}/style"))
            .json(&json!({ "textColor": "blue" }))
            .send()
            .await
            .unwrap();
        assert_eq!(bad_style.status(), reqwest::StatusCode::BAD_REQUEST);
        client.post(format!("{wz}/preview")).send().await.unwrap();

        let html = client
            .get(format!("{wz}/preview"))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(html.contains("Nome Completo"));

        let reply: Value = client
            .post(format!("{wz}/submit"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(reply["receipt"]["id"], "abc");
        assert_eq!(reply["notices"][0]["message"], "Formulário enviado com sucesso!");
    }

    #[tokio::test]
    async fn unknown_session_is_404() {
        let hooks = MockServer::start().await;
        let base = spawn_api(&hooks).await;
        let resp = reqwest::get(format!("{base}/api/wizards/{}", Uuid::new_v4()))
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn deleted_sessions_are_404() {
        let hooks = MockServer::start().await;
        let base = spawn_api(&hooks).await;
        let client = reqwest::Client::new();

        for kind in ["keyboards", "wizards"] {
            let created: Value = client
                .post(format!("{base}/api/{kind}"))
                .send()
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
            let url = format!("{base}/api/{kind}/{}", created["id"].as_str().unwrap());

            let deleted = client.delete(&url).send().await.unwrap();
            assert_eq!(deleted.status(), reqwest::StatusCode::NO_CONTENT);
            let gone = client.get(&url).send().await.unwrap();
            assert_eq!(gone.status(), reqwest::StatusCode::NOT_FOUND);
            let again = client.delete(&url).send().await.unwrap();
            assert_eq!(again.status(), reqwest::StatusCode::NOT_FOUND);
        }
    }

    #[tokio::test]
    async fn oldest_wizard_is_evicted_at_capacity() {
        let hooks = MockServer::start().await;
        let config = VozformConfig {
            server: Some(ServerConfig {
                max_sessions: Some(1),
                ..Default::default()
            }),
            ..Default::default()
        };
        let base = spawn_api_with(&hooks, config).await;
        let client = reqwest::Client::new();

        let mut ids = Vec::new();
        for _ in 0..2 {
            let created: Value = client
                .post(format!("{base}/api/wizards"))
                .send()
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
            ids.push(created["id"].as_str().unwrap().to_string());
        }

        let first = client.get(format!("{base}/api/wizards/{}", ids[0])).send().await.unwrap();
        assert_eq!(first.status(), reqwest::StatusCode::NOT_FOUND);
        let second = client.get(format!("{base}/api/wizards/{}", ids[1])).send().await.unwrap();
        assert_eq!(second.status(), reqwest::StatusCode::OK);
    }
}
