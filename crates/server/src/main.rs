use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use pages::{CityConfig, EventsQuery, PageContext, SearchForm};
use serde::Deserialize;
use shared::error::{ErrorCode, SiteError};
use storage::Storage;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

mod config;
mod templates;

use config::{load_settings, normalize_database_url, Settings};
use templates::{
    AboutTemplate, CommitteeTemplate, CommitteesTemplate, CouncilMembersTemplate, EventTemplate,
    EventsTemplate, HtmlTemplate, IndexTemplate, LegislationTemplate, NotFoundTemplate,
    PersonTemplate, SearchTemplate, ServerErrorTemplate, SiteMeta,
};

#[derive(Clone)]
struct AppState {
    pages: PageContext,
    site: SiteMeta,
}

impl AppState {
    fn new(settings: Settings, storage: Storage) -> Self {
        let site = SiteMeta {
            site_name: settings.site_name,
            city_name: settings.city_name,
            city_name_short: settings.city_name_short,
            city_council_name: settings.city_council_name,
            search_placeholder: settings.search_placeholder,
            legistar_url: settings.legistar_url,
        };
        let city = CityConfig {
            council_ocd_id: settings.council_ocd_id,
            council_meeting_name: settings.council_meeting_name,
            committee_descriptions: settings.committee_descriptions,
        };
        Self {
            pages: PageContext { storage, city },
            site,
        }
    }
}

#[derive(Debug, Deserialize)]
struct EventsParams {
    year: Option<String>,
    month: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    q: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    let database_url = normalize_database_url(&settings.database_url);
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;

    let addr: SocketAddr = settings.server_bind.parse()?;
    let state = AppState::new(settings, storage);
    let app = build_router(Arc::new(state));

    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/", get(home_page))
        .route("/about", get(about_page))
        .route("/council-members", get(council_members_page))
        .route("/legislation/:slug", get(legislation_page))
        .route("/committees", get(committees_page))
        .route("/committee/:slug", get(committee_page))
        .route("/person/:slug", get(person_page))
        .route("/events", get(events_page))
        .route("/event/:slug", get(event_page))
        .route("/search", get(search_page))
        .fallback(not_found_page)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz(State(state): State<Arc<AppState>>) -> Response {
    match state.pages.storage.health_check().await {
        Ok(()) => (StatusCode::OK, "ok").into_response(),
        Err(err) => {
            error!(%err, "database health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "database unavailable").into_response()
        }
    }
}

async fn home_page(State(state): State<Arc<AppState>>) -> Response {
    match pages::home(&state.pages).await {
        Ok(page) => HtmlTemplate(IndexTemplate {
            site: state.site.clone(),
            page,
        })
        .into_response(),
        Err(err) => error_response(&state.site, err),
    }
}

async fn about_page(State(state): State<Arc<AppState>>) -> Response {
    HtmlTemplate(AboutTemplate {
        site: state.site.clone(),
    })
    .into_response()
}

async fn council_members_page(State(state): State<Arc<AppState>>) -> Response {
    match pages::council_members(&state.pages).await {
        Ok(page) => HtmlTemplate(CouncilMembersTemplate {
            site: state.site.clone(),
            page,
        })
        .into_response(),
        Err(err) => error_response(&state.site, err),
    }
}

async fn legislation_page(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Response {
    match pages::bill(&state.pages, &slug).await {
        Ok(page) => HtmlTemplate(LegislationTemplate {
            site: state.site.clone(),
            page,
        })
        .into_response(),
        Err(err) => error_response(&state.site, err),
    }
}

async fn committees_page(State(state): State<Arc<AppState>>) -> Response {
    match pages::committees(&state.pages).await {
        Ok(committees) => HtmlTemplate(CommitteesTemplate {
            site: state.site.clone(),
            committees,
        })
        .into_response(),
        Err(err) => error_response(&state.site, err),
    }
}

async fn committee_page(State(state): State<Arc<AppState>>, Path(slug): Path<String>) -> Response {
    match pages::committee(&state.pages, &slug).await {
        Ok(page) => HtmlTemplate(CommitteeTemplate {
            site: state.site.clone(),
            page,
        })
        .into_response(),
        Err(err) => error_response(&state.site, err),
    }
}

async fn person_page(State(state): State<Arc<AppState>>, Path(slug): Path<String>) -> Response {
    match pages::person(&state.pages, &slug).await {
        Ok(page) => HtmlTemplate(PersonTemplate {
            site: state.site.clone(),
            page,
        })
        .into_response(),
        Err(err) => error_response(&state.site, err),
    }
}

async fn events_page(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EventsParams>,
) -> Response {
    // Query-string noise picks the default view rather than a 400 page.
    let query = EventsQuery {
        year: params.year.as_deref().and_then(|v| v.trim().parse().ok()),
        month: params.month.as_deref().and_then(|v| v.trim().parse().ok()),
    };
    match pages::events(&state.pages, query).await {
        Ok(page) => HtmlTemplate(EventsTemplate {
            site: state.site.clone(),
            page,
        })
        .into_response(),
        Err(err) => error_response(&state.site, err),
    }
}

async fn event_page(State(state): State<Arc<AppState>>, Path(slug): Path<String>) -> Response {
    match pages::event(&state.pages, &slug).await {
        Ok(page) => HtmlTemplate(EventTemplate {
            site: state.site.clone(),
            page,
        })
        .into_response(),
        Err(err) => error_response(&state.site, err),
    }
}

async fn search_page(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Response {
    let form = SearchForm { q: params.q };
    match pages::search(&state.pages, form).await {
        Ok(page) => HtmlTemplate(SearchTemplate {
            site: state.site.clone(),
            page,
        })
        .into_response(),
        Err(err) => error_response(&state.site, err),
    }
}

async fn not_found_page(State(state): State<Arc<AppState>>) -> Response {
    (
        StatusCode::NOT_FOUND,
        HtmlTemplate(NotFoundTemplate {
            site: state.site.clone(),
        }),
    )
        .into_response()
}

fn error_response(site: &SiteMeta, err: SiteError) -> Response {
    match err.code {
        ErrorCode::NotFound => (
            StatusCode::NOT_FOUND,
            HtmlTemplate(NotFoundTemplate { site: site.clone() }),
        )
            .into_response(),
        _ => {
            error!(%err, "failed to build page");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HtmlTemplate(ServerErrorTemplate { site: site.clone() }),
            )
                .into_response()
        }
    }
}
