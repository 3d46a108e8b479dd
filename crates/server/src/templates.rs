//! Askama template definitions for the public site.

use askama::Template;
use axum::response::{Html, IntoResponse, Response};

use pages::{BillPage, CommitteePage, CommitteeSummary, CouncilPage, EventPage, EventsPage, HomePage, PersonPage, SearchPage};

/// Branding constants available to every template through the `site` field.
#[derive(Debug, Clone)]
pub struct SiteMeta {
    pub site_name: String,
    pub city_name: String,
    pub city_name_short: String,
    pub city_council_name: String,
    pub search_placeholder: String,
    pub legistar_url: Option<String>,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub site: SiteMeta,
    pub page: HomePage,
}

#[derive(Template)]
#[template(path = "about.html")]
pub struct AboutTemplate {
    pub site: SiteMeta,
}

#[derive(Template)]
#[template(path = "council_members.html")]
pub struct CouncilMembersTemplate {
    pub site: SiteMeta,
    pub page: CouncilPage,
}

#[derive(Template)]
#[template(path = "legislation.html")]
pub struct LegislationTemplate {
    pub site: SiteMeta,
    pub page: BillPage,
}

#[derive(Template)]
#[template(path = "committees.html")]
pub struct CommitteesTemplate {
    pub site: SiteMeta,
    pub committees: Vec<CommitteeSummary>,
}

#[derive(Template)]
#[template(path = "committee.html")]
pub struct CommitteeTemplate {
    pub site: SiteMeta,
    pub page: CommitteePage,
}

#[derive(Template)]
#[template(path = "person.html")]
pub struct PersonTemplate {
    pub site: SiteMeta,
    pub page: PersonPage,
}

#[derive(Template)]
#[template(path = "events.html")]
pub struct EventsTemplate {
    pub site: SiteMeta,
    pub page: EventsPage,
}

#[derive(Template)]
#[template(path = "event.html")]
pub struct EventTemplate {
    pub site: SiteMeta,
    pub page: EventPage,
}

#[derive(Template)]
#[template(path = "search.html")]
pub struct SearchTemplate {
    pub site: SiteMeta,
    pub page: SearchPage,
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub site: SiteMeta,
}

#[derive(Template)]
#[template(path = "server_error.html")]
pub struct ServerErrorTemplate {
    pub site: SiteMeta,
}

/// Renders an askama template into an HTML response, logging and
/// answering 500 when rendering fails.
pub struct HtmlTemplate<T>(pub T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => {
                tracing::error!(%err, "template rendering failed");
                (
                    axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "template rendering failed",
                )
                    .into_response()
            }
        }
    }
}
