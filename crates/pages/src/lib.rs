//! Page controllers: each public function issues the queries for one page
//! and shapes the rows into a template-ready context struct.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};

use shared::{
    domain::{BillId, EventId, EventStatus, InferredStatus, MembershipRole, OrganizationId, PersonId},
    error::SiteError,
    search::{BillHit, SearchIndex, SearchQuery},
};
use storage::{Storage, StoredBill, StoredEvent, StoredMembership, StoredOrganization};

pub mod calendar;

pub use calendar::{EventDay, MonthOption, YearOption};

/// Window behind "recent legislation" on the home page.
const RECENT_LEGISLATION_DAYS: i64 = 100;
/// How many recently passed bills the home page highlights.
const RECENTLY_PASSED_LIMIT: usize = 3;
/// How many upcoming committee meetings the home page lists.
const UPCOMING_MEETINGS_LIMIT: u32 = 3;

/// City-specific wiring the page controllers need beyond the database:
/// which organization is the council, what its full meeting is called,
/// and optional editorial blurbs for committees.
#[derive(Debug, Clone)]
pub struct CityConfig {
    pub council_ocd_id: String,
    pub council_meeting_name: String,
    pub committee_descriptions: HashMap<String, String>,
}

#[derive(Clone)]
pub struct PageContext {
    pub storage: Storage,
    pub city: CityConfig,
}

// ---- view structs --------------------------------------------------------

#[derive(Debug, Clone)]
pub struct BillSummary {
    pub bill_id: BillId,
    pub identifier: String,
    pub description: String,
    pub bill_type: String,
    pub slug: String,
    pub last_action_date: Option<NaiveDate>,
    pub inferred_status: Option<InferredStatus>,
}

impl BillSummary {
    fn from_stored(bill: StoredBill) -> Self {
        Self {
            bill_id: bill.bill_id,
            identifier: bill.identifier,
            description: bill.description,
            bill_type: bill.bill_type,
            slug: bill.slug,
            last_action_date: bill.last_action_date,
            inferred_status: bill.inferred_status,
        }
    }

    pub fn last_action_display(&self) -> String {
        match self.last_action_date {
            Some(date) => date.format("%B %-d, %Y").to_string(),
            None => "no actions yet".to_string(),
        }
    }

    pub fn status_display(&self) -> &str {
        match self.inferred_status {
            Some(status) => status.as_db_str(),
            None => "",
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventSummary {
    pub event_id: EventId,
    pub name: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub location: Option<String>,
    pub status: EventStatus,
    pub slug: String,
}

impl EventSummary {
    fn from_stored(event: StoredEvent) -> Self {
        Self {
            event_id: event.event_id,
            name: event.name,
            description: event.description,
            start_time: event.start_time,
            location: event.location,
            status: event.status,
            slug: event.slug,
        }
    }

    pub fn start_display(&self) -> String {
        self.start_time.format("%B %-d, %Y %-I:%M %p").to_string()
    }

    pub fn time_display(&self) -> String {
        self.start_time.format("%-I:%M %p").to_string()
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == EventStatus::Cancelled
    }
}

#[derive(Debug, Clone)]
pub struct HomePage {
    pub recent_legislation: Vec<BillSummary>,
    pub recently_passed: Vec<BillSummary>,
    pub next_council_meeting: Option<EventSummary>,
    pub upcoming_committee_meetings: Vec<EventSummary>,
}

#[derive(Debug, Clone)]
pub struct SeatView {
    pub label: String,
    pub holder_name: Option<String>,
    pub holder_slug: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CouncilPage {
    pub council_name: String,
    pub seats: Vec<SeatView>,
}

#[derive(Debug, Clone)]
pub struct ActionView {
    pub description: String,
    pub classification: Option<String>,
    pub date: NaiveDate,
}

impl ActionView {
    pub fn date_display(&self) -> String {
        self.date.format("%B %-d, %Y").to_string()
    }
}

#[derive(Debug, Clone)]
pub struct BillPage {
    pub bill: BillSummary,
    pub actions: Vec<ActionView>,
}

#[derive(Debug, Clone)]
pub struct CommitteeSummary {
    pub name: String,
    pub slug: String,
}

impl CommitteeSummary {
    fn from_stored(organization: StoredOrganization) -> Self {
        Self {
            name: organization.name,
            slug: organization.slug,
        }
    }
}

/// A membership as shown on committee and person pages.
#[derive(Debug, Clone)]
pub struct MembershipView {
    pub organization_name: String,
    pub organization_slug: String,
    pub person_name: String,
    pub person_slug: String,
    pub post_label: Option<String>,
}

impl MembershipView {
    fn from_stored(membership: StoredMembership) -> Self {
        Self {
            organization_name: membership.organization_name,
            organization_slug: membership.organization_slug,
            person_name: membership.person_name,
            person_slug: membership.person_slug,
            post_label: membership.post_label,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommitteePage {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub chairs: Vec<MembershipView>,
    pub members: Vec<MembershipView>,
}

#[derive(Debug, Clone)]
pub struct PersonPage {
    pub name: String,
    pub slug: String,
    pub website_url: Option<String>,
    pub email: Option<String>,
    pub sponsored_legislation: Vec<BillSummary>,
    pub chairs: Vec<MembershipView>,
    pub memberships: Vec<MembershipView>,
}

/// Raw `year`/`month` selection from the events page query string.
/// Values that do not name a real calendar month fall back to the
/// upcoming view rather than erroring.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventsQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct EventsPage {
    pub year_options: Vec<YearOption>,
    pub month_options: Vec<MonthOption>,
    pub show_upcoming: bool,
    pub this_year: i32,
    pub this_month: u32,
    pub days: Vec<EventDay>,
}

impl EventsPage {
    pub fn month_display(&self) -> &'static str {
        calendar::month_name(self.this_month).unwrap_or("")
    }
}

#[derive(Debug, Clone)]
pub struct EventPage {
    pub event: EventSummary,
    pub participants: Vec<CommitteeSummary>,
}

#[derive(Debug, Clone, Default)]
pub struct SearchForm {
    pub q: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SearchPage {
    pub query_text: String,
    pub results: Vec<BillHit>,
}

// ---- page controllers ----------------------------------------------------

pub async fn home(ctx: &PageContext) -> Result<HomePage, SiteError> {
    let now = Utc::now();
    let since = now.date_naive() - Duration::days(RECENT_LEGISLATION_DAYS);

    let recent_legislation: Vec<BillSummary> = ctx
        .storage
        .bills_active_since(since)
        .await
        .map_err(internal)?
        .into_iter()
        .map(BillSummary::from_stored)
        .collect();

    let recently_passed: Vec<BillSummary> = recent_legislation
        .iter()
        .filter(|bill| {
            bill.inferred_status == Some(InferredStatus::Passed)
                && bill.bill_type == "Introduction"
        })
        .take(RECENTLY_PASSED_LIMIT)
        .cloned()
        .collect();

    let next_council_meeting = ctx
        .storage
        .next_event_named(&ctx.city.council_meeting_name, now)
        .await
        .map_err(internal)?
        .map(EventSummary::from_stored);

    let upcoming_committee_meetings = ctx
        .storage
        .upcoming_events_excluding(&ctx.city.council_meeting_name, now, UPCOMING_MEETINGS_LIMIT)
        .await
        .map_err(internal)?
        .into_iter()
        .map(EventSummary::from_stored)
        .collect();

    Ok(HomePage {
        recent_legislation,
        recently_passed,
        next_council_meeting,
        upcoming_committee_meetings,
    })
}

pub async fn council_members(ctx: &PageContext) -> Result<CouncilPage, SiteError> {
    let council = ctx
        .storage
        .organization_by_ocd_id(&ctx.city.council_ocd_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| SiteError::not_found("council organization is not loaded"))?;

    let seats = ctx
        .storage
        .seats_for_organization(council.organization_id)
        .await
        .map_err(internal)?
        .into_iter()
        .map(|seat| SeatView {
            label: seat.label,
            holder_name: seat.holder.as_ref().map(|h| h.name.clone()),
            holder_slug: seat.holder.map(|h| h.slug),
        })
        .collect();

    Ok(CouncilPage {
        council_name: council.name,
        seats,
    })
}

pub async fn bill(ctx: &PageContext, slug: &str) -> Result<BillPage, SiteError> {
    let bill = ctx
        .storage
        .bill_by_slug(slug)
        .await
        .map_err(internal)?
        .ok_or_else(|| SiteError::not_found("no legislation with that identifier"))?;

    let actions = ctx
        .storage
        .actions_for_bill(bill.bill_id)
        .await
        .map_err(internal)?
        .into_iter()
        .map(|action| ActionView {
            description: action.description,
            classification: action.classification,
            date: action.date,
        })
        .collect();

    Ok(BillPage {
        bill: BillSummary::from_stored(bill),
        actions,
    })
}

pub async fn committees(ctx: &PageContext) -> Result<Vec<CommitteeSummary>, SiteError> {
    Ok(ctx
        .storage
        .committees()
        .await
        .map_err(internal)?
        .into_iter()
        .map(CommitteeSummary::from_stored)
        .collect())
}

pub async fn committee(ctx: &PageContext, slug: &str) -> Result<CommitteePage, SiteError> {
    let organization = ctx
        .storage
        .organization_by_slug(slug)
        .await
        .map_err(internal)?
        .ok_or_else(|| SiteError::not_found("no committee with that name"))?;

    let chairs = memberships_view(
        ctx,
        organization.organization_id,
        &MembershipRole::Chairperson,
    )
    .await?;
    let members = memberships_view(
        ctx,
        organization.organization_id,
        &MembershipRole::CommitteeMember,
    )
    .await?;
    let description = ctx.city.committee_descriptions.get(&organization.slug).cloned();

    Ok(CommitteePage {
        name: organization.name,
        slug: organization.slug,
        description,
        chairs,
        members,
    })
}

pub async fn person(ctx: &PageContext, slug: &str) -> Result<PersonPage, SiteError> {
    let person = ctx
        .storage
        .person_by_slug(slug)
        .await
        .map_err(internal)?
        .ok_or_else(|| SiteError::not_found("no official with that name"))?;

    let sponsored_legislation = ctx
        .storage
        .sponsored_bills_for_person(person.person_id)
        .await
        .map_err(internal)?
        .into_iter()
        .map(BillSummary::from_stored)
        .collect();

    let chairs = person_memberships_view(ctx, person.person_id, &MembershipRole::Chairperson).await?;
    let memberships =
        person_memberships_view(ctx, person.person_id, &MembershipRole::CommitteeMember).await?;

    Ok(PersonPage {
        name: person.name,
        slug: person.slug,
        website_url: person.website_url,
        email: person.email,
        sponsored_legislation,
        chairs,
        memberships,
    })
}

pub async fn events(ctx: &PageContext, query: EventsQuery) -> Result<EventsPage, SiteError> {
    let now = Utc::now();
    let today = now.date_naive();

    let bounds = ctx.storage.event_time_bounds().await.map_err(internal)?;
    let (min_year, max_year) = match bounds {
        Some((min, max)) => (min.year(), max.year()),
        None => (today.year(), today.year()),
    };

    let selected = match (query.year, query.month) {
        (Some(year), Some(month)) => match calendar::month_bounds(year, month) {
            Some(window) => Some((year, month, window)),
            None => {
                tracing::debug!(year, month, "ignoring out-of-range month selection");
                None
            }
        },
        _ => None,
    };

    let (show_upcoming, this_year, this_month, stored) = match selected {
        Some((year, month, (from, until))) => {
            let stored = ctx
                .storage
                .events_in_range(from, until)
                .await
                .map_err(internal)?;
            (false, year, month, stored)
        }
        None => {
            let start_of_today = today.and_time(NaiveTime::MIN).and_utc();
            let stored = ctx
                .storage
                .events_after(start_of_today)
                .await
                .map_err(internal)?;
            (true, today.year(), today.month(), stored)
        }
    };

    let days = calendar::group_by_day(
        stored.into_iter().map(EventSummary::from_stored).collect(),
    );

    Ok(EventsPage {
        year_options: calendar::year_options(min_year, max_year, this_year),
        month_options: calendar::month_options(this_month),
        show_upcoming,
        this_year,
        this_month,
        days,
    })
}

pub async fn event(ctx: &PageContext, slug: &str) -> Result<EventPage, SiteError> {
    let event = ctx
        .storage
        .event_by_slug(slug)
        .await
        .map_err(internal)?
        .ok_or_else(|| SiteError::not_found("no meeting with that name"))?;

    let names: Vec<String> = ctx
        .storage
        .participants_for_event(event.event_id)
        .await
        .map_err(internal)?
        .into_iter()
        .map(|participant| participant.entity_name)
        .collect();

    let participants = ctx
        .storage
        .organizations_by_names(&names)
        .await
        .map_err(internal)?
        .into_iter()
        .map(CommitteeSummary::from_stored)
        .collect();

    Ok(EventPage {
        event: EventSummary::from_stored(event),
        participants,
    })
}

pub async fn search(ctx: &PageContext, form: SearchForm) -> Result<SearchPage, SiteError> {
    let query = SearchQuery::from_form_input(form.q.as_deref());
    let results = ctx
        .storage
        .search_bills(&query)
        .await
        .map_err(internal)?;

    Ok(SearchPage {
        query_text: query.text.unwrap_or_default(),
        results,
    })
}

async fn memberships_view(
    ctx: &PageContext,
    organization_id: OrganizationId,
    role: &MembershipRole,
) -> Result<Vec<MembershipView>, SiteError> {
    Ok(ctx
        .storage
        .memberships_for_organization(organization_id, role)
        .await
        .map_err(internal)?
        .into_iter()
        .map(MembershipView::from_stored)
        .collect())
}

async fn person_memberships_view(
    ctx: &PageContext,
    person_id: PersonId,
    role: &MembershipRole,
) -> Result<Vec<MembershipView>, SiteError> {
    Ok(ctx
        .storage
        .memberships_for_person(person_id, role)
        .await
        .map_err(internal)?
        .into_iter()
        .map(MembershipView::from_stored)
        .collect())
}

fn internal(err: anyhow::Error) -> SiteError {
    SiteError::internal(err.to_string())
}
