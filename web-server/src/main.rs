use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Form, Path, Query, State},
    http::StatusCode,
    response::{Json, Redirect},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use finrisk::{
    catalog, records, AiConfig, DashboardService, DashboardView, GroundedQueryService,
    OpenAiClient, QueryConfig, SheetsConfig, SheetsStore, StoreError, TableStore,
};

// Application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TableStore>,
    pub dashboard: Arc<DashboardService>,
    pub ask: Arc<GroundedQueryService>,
}

impl AppState {
    pub fn new(store: Arc<dyn TableStore>, provider: Arc<dyn finrisk::ModelProvider>) -> Self {
        Self {
            dashboard: Arc::new(DashboardService::new(store.clone())),
            ask: Arc::new(GroundedQueryService::new(
                store.clone(),
                provider,
                QueryConfig::default(),
            )),
            store,
        }
    }
}

// API types
#[derive(Serialize, Deserialize)]
pub struct AnswerResponse {
    pub answer: String,
}

#[derive(Deserialize, Default)]
pub struct AskRequest {
    #[serde(default)]
    pub question: String,
}

#[derive(Deserialize)]
pub struct AskQuery {
    pub q: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct TableView {
    pub table: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub tables: Vec<String>,
}

#[derive(Serialize)]
pub struct FormView {
    pub table: String,
    pub headers: Vec<String>,
    pub tables: Vec<String>,
}

#[derive(Serialize)]
pub struct AppendedRow {
    pub table: String,
    pub row: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter("finrisk_web_server=info,finrisk=info,tower_http=debug")
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    // External collaborators
    let store: Arc<dyn TableStore> = Arc::new(SheetsStore::new(SheetsConfig::default())?);
    let provider = Arc::new(OpenAiClient::new(AiConfig::default())?);

    let app_state = AppState::new(store, provider);

    // Build our application with routes
    let app = create_router(app_state);

    // Determine port
    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "4091".to_string())
        .parse::<u16>()
        .unwrap_or(4091);

    let addr = format!("0.0.0.0:{}", port);
    info!("Starting server on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/dashboard", get(dashboard))
        .route("/table/:name", get(table))
        .route("/add/:name", get(add_form).post(add_record))
        .route("/ask", get(ask_get).post(ask_post))
        .route("/api/health", get(health_check))
        // Add middleware
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state)
}

// Map store failures onto response codes: a missing table is the caller's
// problem, everything else is a broken upstream.
fn store_status(error: &StoreError) -> StatusCode {
    match error {
        StoreError::TableNotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_GATEWAY,
    }
}

// Home redirects to the dashboard
async fn home() -> Redirect {
    Redirect::to("/dashboard")
}

// Health check endpoint
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

// Ranked risk view plus band tallies
async fn dashboard(State(state): State<AppState>) -> Result<Json<DashboardView>, StatusCode> {
    match state.dashboard.build().await {
        Ok(view) => Ok(Json(view)),
        Err(e) => {
            warn!("failed to build dashboard: {e}");
            Err(store_status(&e))
        }
    }
}

// Raw table dump
async fn table(
    Path(name): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<TableView>, StatusCode> {
    match state.store.read_table(&name).await {
        Ok(table) => Ok(Json(TableView {
            table: name,
            headers: table.headers,
            rows: table.rows,
            tables: catalog::table_names(),
        })),
        Err(e) => {
            warn!("failed to read table '{}': {e}", name);
            Err(store_status(&e))
        }
    }
}

// Form schema for a table: its header row
async fn add_form(
    Path(name): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<FormView>, StatusCode> {
    match state.store.read_table(&name).await {
        Ok(table) => Ok(Json(FormView {
            table: name,
            headers: table.headers,
            tables: catalog::table_names(),
        })),
        Err(e) => {
            warn!("failed to read table '{}': {e}", name);
            Err(store_status(&e))
        }
    }
}

// Append one submitted record in header-column order
async fn add_record(
    Path(name): Path<String>,
    State(state): State<AppState>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Json<AppendedRow>, StatusCode> {
    match records::append_record(state.store.as_ref(), &name, &form).await {
        Ok(row) => Ok(Json(AppendedRow { table: name, row })),
        Err(e) => {
            warn!("failed to append to table '{}': {e}", name);
            Err(store_status(&e))
        }
    }
}

// Grounded query, question as ?q= parameter
async fn ask_get(
    State(state): State<AppState>,
    Query(query): Query<AskQuery>,
) -> Result<Json<AnswerResponse>, StatusCode> {
    answer(&state, &query.q.unwrap_or_default()).await
}

// Grounded query, question as JSON body; a missing or malformed body is an
// empty question, not a client error
async fn ask_post(
    State(state): State<AppState>,
    body: Option<Json<AskRequest>>,
) -> Result<Json<AnswerResponse>, StatusCode> {
    let question = body.map(|Json(request)| request.question).unwrap_or_default();
    answer(&state, &question).await
}

async fn answer(state: &AppState, question: &str) -> Result<Json<AnswerResponse>, StatusCode> {
    match state.ask.answer(question).await {
        Ok(answer) => Ok(Json(AnswerResponse { answer })),
        Err(e) => {
            warn!("failed to read risk snapshot: {e}");
            Err(store_status(&e))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use finrisk::{ask, AiResult, MemoryStore, ModelProvider};

    use super::*;

    struct FakeProvider {
        answer: String,
        calls: AtomicUsize,
    }

    impl FakeProvider {
        fn answering(answer: &str) -> Self {
            Self {
                answer: answer.to_string(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ModelProvider for FakeProvider {
        async fn complete(&self, _prompt: &str) -> AiResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.answer.clone())
        }
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn seeded_state(provider: Arc<FakeProvider>) -> AppState {
        let store = MemoryStore::new()
            .with_table(
                catalog::BORROWERS_TABLE,
                strings(&["borrower_id", "borrower_name"]),
                vec![strings(&["B-1", "Acme"])],
            )
            .with_table(
                catalog::LOANS_TABLE,
                strings(&["loan_id", "borrower_id"]),
                vec![strings(&["L-1", "B-1"])],
            )
            .with_table(
                catalog::MASTER_RISK_TABLE,
                strings(&["loan_id", "risk_band", "final_risk_score"]),
                vec![strings(&["L-1", "HIGH", "91"])],
            );
        AppState::new(Arc::new(store), provider)
    }

    #[tokio::test]
    async fn test_dashboard_handler() {
        let state = seeded_state(Arc::new(FakeProvider::answering("unused")));
        let Json(view) = dashboard(State(state)).await.unwrap();

        assert_eq!(view.top.len(), 1);
        assert_eq!(view.top[0].name, "Acme");
        assert_eq!(view.high, 1);
        assert_eq!(view.tables.len(), 24);
    }

    #[tokio::test]
    async fn test_table_handler_unknown_table() {
        let state = seeded_state(Arc::new(FakeProvider::answering("unused")));
        let status = table(Path("payroll".to_string()), State(state))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_ask_post_empty_body_is_guidance() {
        let provider = Arc::new(FakeProvider::answering("unused"));
        let state = seeded_state(provider.clone());

        let Json(response) = ask_post(State(state), None).await.unwrap();
        assert_eq!(response.answer, ask::EMPTY_QUESTION_ANSWER);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_ask_get_returns_provider_answer() {
        let provider = Arc::new(FakeProvider::answering("L-1 is the riskiest."));
        let state = seeded_state(provider.clone());

        let Json(response) = ask_get(
            State(state),
            Query(AskQuery {
                q: Some("Which loan is riskiest?".to_string()),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.answer, "L-1 is the riskiest.");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_add_record_handler() {
        let state = seeded_state(Arc::new(FakeProvider::answering("unused")));
        let mut form = HashMap::new();
        form.insert("loan_id".to_string(), "L-2".to_string());
        form.insert("borrower_id".to_string(), "B-1".to_string());

        let Json(appended) = add_record(
            Path(catalog::LOANS_TABLE.to_string()),
            State(state.clone()),
            Form(form),
        )
        .await
        .unwrap();

        assert_eq!(appended.row, strings(&["L-2", "B-1"]));

        let table = state
            .store
            .read_table(catalog::LOANS_TABLE)
            .await
            .unwrap();
        assert_eq!(table.rows.len(), 2);
    }
}
