use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use shared::{
    domain::{
        ActionId, BillId, EventId, EventStatus, InferredStatus, MembershipId, MembershipRole,
        OrganizationId, PersonId, PostId,
    },
    search::{BillHit, SearchIndex, SearchQuery},
};

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone)]
pub struct StoredBill {
    pub bill_id: BillId,
    pub ocd_id: String,
    pub identifier: String,
    pub description: String,
    pub bill_type: String,
    pub slug: String,
    pub last_action_date: Option<NaiveDate>,
    pub inferred_status: Option<InferredStatus>,
}

/// Input for [`Storage::upsert_bill`], written by the sync job.
#[derive(Debug, Clone)]
pub struct BillRecord<'a> {
    pub ocd_id: &'a str,
    pub identifier: &'a str,
    pub description: &'a str,
    pub bill_type: &'a str,
    pub slug: &'a str,
    pub last_action_date: Option<NaiveDate>,
    pub inferred_status: Option<InferredStatus>,
}

#[derive(Debug, Clone)]
pub struct StoredAction {
    pub action_id: ActionId,
    pub bill_id: BillId,
    pub description: String,
    pub classification: Option<String>,
    pub date: NaiveDate,
    pub sequence: i64,
}

#[derive(Debug, Clone)]
pub struct StoredPerson {
    pub person_id: PersonId,
    pub name: String,
    pub slug: String,
    pub website_url: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StoredOrganization {
    pub organization_id: OrganizationId,
    pub ocd_id: String,
    pub name: String,
    pub classification: Option<String>,
    pub slug: String,
}

/// A seat on an organization together with its current holder, if any.
#[derive(Debug, Clone)]
pub struct StoredSeat {
    pub post_id: PostId,
    pub label: String,
    pub holder: Option<SeatHolder>,
}

#[derive(Debug, Clone)]
pub struct SeatHolder {
    pub person_id: PersonId,
    pub name: String,
    pub slug: String,
}

/// A membership row joined against both endpoints, usable from either the
/// organization page or the person page.
#[derive(Debug, Clone)]
pub struct StoredMembership {
    pub membership_id: MembershipId,
    pub organization_id: OrganizationId,
    pub organization_name: String,
    pub organization_slug: String,
    pub person_id: PersonId,
    pub person_name: String,
    pub person_slug: String,
    pub role: MembershipRole,
    pub post_label: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StoredEvent {
    pub event_id: EventId,
    pub ocd_id: String,
    pub name: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub location: Option<String>,
    pub status: EventStatus,
    pub slug: String,
}

/// Input for [`Storage::upsert_event`], written by the sync job.
#[derive(Debug, Clone)]
pub struct EventRecord<'a> {
    pub ocd_id: &'a str,
    pub name: &'a str,
    pub description: &'a str,
    pub start_time: DateTime<Utc>,
    pub location: Option<&'a str>,
    pub status: EventStatus,
    pub slug: &'a str,
}

#[derive(Debug, Clone)]
pub struct StoredParticipant {
    pub entity_name: String,
    pub entity_type: String,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    // ---- sync-job entry points -------------------------------------------

    pub async fn upsert_organization(
        &self,
        ocd_id: &str,
        name: &str,
        classification: Option<&str>,
        slug: &str,
    ) -> Result<OrganizationId> {
        let rec = sqlx::query(
            "INSERT INTO organizations (ocd_id, name, classification, slug)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(ocd_id) DO UPDATE SET
                name = excluded.name,
                classification = excluded.classification,
                slug = excluded.slug
             RETURNING id",
        )
        .bind(ocd_id)
        .bind(name)
        .bind(classification)
        .bind(slug)
        .fetch_one(&self.pool)
        .await?;
        Ok(OrganizationId(rec.get::<i64, _>(0)))
    }

    pub async fn create_post(&self, organization_id: OrganizationId, label: &str) -> Result<PostId> {
        let rec = sqlx::query("INSERT INTO posts (organization_id, label) VALUES (?, ?) RETURNING id")
            .bind(organization_id.0)
            .bind(label)
            .fetch_one(&self.pool)
            .await?;
        Ok(PostId(rec.get::<i64, _>(0)))
    }

    pub async fn upsert_person(
        &self,
        name: &str,
        slug: &str,
        website_url: Option<&str>,
        email: Option<&str>,
    ) -> Result<PersonId> {
        let rec = sqlx::query(
            "INSERT INTO people (name, slug, website_url, email)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(slug) DO UPDATE SET
                name = excluded.name,
                website_url = excluded.website_url,
                email = excluded.email
             RETURNING id",
        )
        .bind(name)
        .bind(slug)
        .bind(website_url)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;
        Ok(PersonId(rec.get::<i64, _>(0)))
    }

    pub async fn add_membership(
        &self,
        organization_id: OrganizationId,
        person_id: PersonId,
        post_id: Option<PostId>,
        role: &MembershipRole,
        end_date: Option<NaiveDate>,
    ) -> Result<MembershipId> {
        let rec = sqlx::query(
            "INSERT INTO memberships (organization_id, person_id, post_id, role, end_date)
             VALUES (?, ?, ?, ?, ?)
             RETURNING id",
        )
        .bind(organization_id.0)
        .bind(person_id.0)
        .bind(post_id.map(|id| id.0))
        .bind(role.as_db_str())
        .bind(end_date)
        .fetch_one(&self.pool)
        .await?;
        Ok(MembershipId(rec.get::<i64, _>(0)))
    }

    pub async fn upsert_bill(&self, bill: BillRecord<'_>) -> Result<BillId> {
        let rec = sqlx::query(
            "INSERT INTO bills (ocd_id, identifier, description, bill_type, slug, last_action_date, inferred_status)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(ocd_id) DO UPDATE SET
                identifier = excluded.identifier,
                description = excluded.description,
                bill_type = excluded.bill_type,
                slug = excluded.slug,
                last_action_date = excluded.last_action_date,
                inferred_status = excluded.inferred_status
             RETURNING id",
        )
        .bind(bill.ocd_id)
        .bind(bill.identifier)
        .bind(bill.description)
        .bind(bill.bill_type)
        .bind(bill.slug)
        .bind(bill.last_action_date)
        .bind(bill.inferred_status.map(|s| s.as_db_str()))
        .fetch_one(&self.pool)
        .await?;
        Ok(BillId(rec.get::<i64, _>(0)))
    }

    pub async fn add_action(
        &self,
        bill_id: BillId,
        description: &str,
        classification: Option<&str>,
        date: NaiveDate,
        sequence: i64,
    ) -> Result<ActionId> {
        let rec = sqlx::query(
            "INSERT INTO actions (bill_id, description, classification, date, sequence)
             VALUES (?, ?, ?, ?, ?)
             RETURNING id",
        )
        .bind(bill_id.0)
        .bind(description)
        .bind(classification)
        .bind(date)
        .bind(sequence)
        .fetch_one(&self.pool)
        .await?;
        Ok(ActionId(rec.get::<i64, _>(0)))
    }

    pub async fn add_sponsorship(
        &self,
        bill_id: BillId,
        person_id: PersonId,
        is_primary: bool,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO sponsorships (bill_id, person_id, is_primary)
             VALUES (?, ?, ?)
             ON CONFLICT(bill_id, person_id) DO UPDATE SET is_primary = excluded.is_primary",
        )
        .bind(bill_id.0)
        .bind(person_id.0)
        .bind(is_primary)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn upsert_event(&self, event: EventRecord<'_>) -> Result<EventId> {
        let rec = sqlx::query(
            "INSERT INTO events (ocd_id, name, description, start_time, location, status, slug)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(ocd_id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                start_time = excluded.start_time,
                location = excluded.location,
                status = excluded.status,
                slug = excluded.slug
             RETURNING id",
        )
        .bind(event.ocd_id)
        .bind(event.name)
        .bind(event.description)
        .bind(event.start_time)
        .bind(event.location)
        .bind(event.status.as_db_str())
        .bind(event.slug)
        .fetch_one(&self.pool)
        .await?;
        Ok(EventId(rec.get::<i64, _>(0)))
    }

    pub async fn add_event_participant(
        &self,
        event_id: EventId,
        entity_name: &str,
        entity_type: &str,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO event_participants (event_id, entity_name, entity_type) VALUES (?, ?, ?)",
        )
        .bind(event_id.0)
        .bind(entity_name)
        .bind(entity_type)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // ---- bills -----------------------------------------------------------

    /// Bills whose last action is strictly newer than `since`, newest first.
    /// Bills that never saw an action are excluded.
    pub async fn bills_active_since(&self, since: NaiveDate) -> Result<Vec<StoredBill>> {
        let rows = sqlx::query(
            "SELECT id, ocd_id, identifier, description, bill_type, slug, last_action_date, inferred_status
             FROM bills
             WHERE last_action_date IS NOT NULL AND last_action_date > ?
             ORDER BY last_action_date DESC",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(bill_from_row).collect())
    }

    pub async fn bill_by_slug(&self, slug: &str) -> Result<Option<StoredBill>> {
        let row = sqlx::query(
            "SELECT id, ocd_id, identifier, description, bill_type, slug, last_action_date, inferred_status
             FROM bills
             WHERE slug = ?",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(bill_from_row))
    }

    /// A bill's history, most recent step first.
    pub async fn actions_for_bill(&self, bill_id: BillId) -> Result<Vec<StoredAction>> {
        let rows = sqlx::query(
            "SELECT id, bill_id, description, classification, date, sequence
             FROM actions
             WHERE bill_id = ?
             ORDER BY sequence DESC",
        )
        .bind(bill_id.0)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| StoredAction {
                action_id: ActionId(r.get::<i64, _>(0)),
                bill_id: BillId(r.get::<i64, _>(1)),
                description: r.get::<String, _>(2),
                classification: r.get::<Option<String>, _>(3),
                date: r.get::<NaiveDate, _>(4),
                sequence: r.get::<i64, _>(5),
            })
            .collect())
    }

    pub async fn sponsored_bills_for_person(&self, person_id: PersonId) -> Result<Vec<StoredBill>> {
        let rows = sqlx::query(
            "SELECT b.id, b.ocd_id, b.identifier, b.description, b.bill_type, b.slug, b.last_action_date, b.inferred_status
             FROM bills b
             INNER JOIN sponsorships s ON s.bill_id = b.id
             WHERE s.person_id = ? AND s.is_primary = 1
             ORDER BY b.last_action_date IS NULL, b.last_action_date DESC",
        )
        .bind(person_id.0)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(bill_from_row).collect())
    }

    // ---- people ----------------------------------------------------------

    pub async fn person_by_slug(&self, slug: &str) -> Result<Option<StoredPerson>> {
        let row = sqlx::query(
            "SELECT id, name, slug, website_url, email FROM people WHERE slug = ?",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| StoredPerson {
            person_id: PersonId(r.get::<i64, _>(0)),
            name: r.get::<String, _>(1),
            slug: r.get::<String, _>(2),
            website_url: r.get::<Option<String>, _>(3),
            email: r.get::<Option<String>, _>(4),
        }))
    }

    // ---- organizations ---------------------------------------------------

    pub async fn organization_by_ocd_id(&self, ocd_id: &str) -> Result<Option<StoredOrganization>> {
        let row = sqlx::query(
            "SELECT id, ocd_id, name, classification, slug FROM organizations WHERE ocd_id = ?",
        )
        .bind(ocd_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(organization_from_row))
    }

    pub async fn organization_by_slug(&self, slug: &str) -> Result<Option<StoredOrganization>> {
        let row = sqlx::query(
            "SELECT id, ocd_id, name, classification, slug FROM organizations WHERE slug = ?",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(organization_from_row))
    }

    /// Committee bodies, i.e. organizations classified as committees whose
    /// display name carries the `Committee` prefix.
    pub async fn committees(&self) -> Result<Vec<StoredOrganization>> {
        let rows = sqlx::query(
            "SELECT id, ocd_id, name, classification, slug
             FROM organizations
             WHERE classification = 'committee' AND name LIKE 'Committee%'
             ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(organization_from_row).collect())
    }

    pub async fn organizations_by_names(&self, names: &[String]) -> Result<Vec<StoredOrganization>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; names.len()].join(", ");
        let sql = format!(
            "SELECT id, ocd_id, name, classification, slug
             FROM organizations
             WHERE name IN ({placeholders})
             ORDER BY name ASC"
        );
        let mut query = sqlx::query(&sql);
        for name in names {
            query = query.bind(name);
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.iter().map(organization_from_row).collect())
    }

    /// The seats of an organization with their current holders. A seat whose
    /// membership has lapsed (non-null end date) shows up vacant.
    pub async fn seats_for_organization(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<StoredSeat>> {
        let rows = sqlx::query(
            "SELECT p.id, p.label, pe.id, pe.name, pe.slug
             FROM posts p
             LEFT JOIN memberships m ON m.post_id = p.id AND m.end_date IS NULL
             LEFT JOIN people pe ON pe.id = m.person_id
             WHERE p.organization_id = ?
             ORDER BY p.label ASC",
        )
        .bind(organization_id.0)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| StoredSeat {
                post_id: PostId(r.get::<i64, _>(0)),
                label: r.get::<String, _>(1),
                holder: r.get::<Option<i64>, _>(2).map(|person_id| SeatHolder {
                    person_id: PersonId(person_id),
                    name: r.get::<String, _>(3),
                    slug: r.get::<String, _>(4),
                }),
            })
            .collect())
    }

    pub async fn memberships_for_organization(
        &self,
        organization_id: OrganizationId,
        role: &MembershipRole,
    ) -> Result<Vec<StoredMembership>> {
        let rows = sqlx::query(
            "SELECT m.id, o.id, o.name, o.slug, pe.id, pe.name, pe.slug, m.role, po.label
             FROM memberships m
             INNER JOIN organizations o ON o.id = m.organization_id
             INNER JOIN people pe ON pe.id = m.person_id
             LEFT JOIN posts po ON po.id = m.post_id
             WHERE m.organization_id = ? AND m.role = ? AND m.end_date IS NULL
             ORDER BY lower(pe.name) ASC",
        )
        .bind(organization_id.0)
        .bind(role.as_db_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(membership_from_row).collect())
    }

    pub async fn memberships_for_person(
        &self,
        person_id: PersonId,
        role: &MembershipRole,
    ) -> Result<Vec<StoredMembership>> {
        let rows = sqlx::query(
            "SELECT m.id, o.id, o.name, o.slug, pe.id, pe.name, pe.slug, m.role, po.label
             FROM memberships m
             INNER JOIN organizations o ON o.id = m.organization_id
             INNER JOIN people pe ON pe.id = m.person_id
             LEFT JOIN posts po ON po.id = m.post_id
             WHERE m.person_id = ? AND m.role = ? AND m.end_date IS NULL
             ORDER BY o.name ASC",
        )
        .bind(person_id.0)
        .bind(role.as_db_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(membership_from_row).collect())
    }

    // ---- events ----------------------------------------------------------

    /// Future meetings in chronological order. Cancelled meetings are left
    /// out of forward-looking listings.
    pub async fn events_after(&self, after: DateTime<Utc>) -> Result<Vec<StoredEvent>> {
        let rows = sqlx::query(
            "SELECT id, ocd_id, name, description, start_time, location, status, slug
             FROM events
             WHERE start_time > ? AND status != 'cancelled'
             ORDER BY start_time ASC",
        )
        .bind(after)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(event_from_row).collect())
    }

    /// All meetings in `[from, until)`, cancelled ones included so the
    /// historical record stays complete.
    pub async fn events_in_range(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<StoredEvent>> {
        let rows = sqlx::query(
            "SELECT id, ocd_id, name, description, start_time, location, status, slug
             FROM events
             WHERE start_time >= ? AND start_time < ?
             ORDER BY start_time ASC",
        )
        .bind(from)
        .bind(until)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(event_from_row).collect())
    }

    pub async fn event_time_bounds(&self) -> Result<Option<(DateTime<Utc>, DateTime<Utc>)>> {
        let row = sqlx::query("SELECT MIN(start_time), MAX(start_time) FROM events")
            .fetch_one(&self.pool)
            .await?;
        let min = row.get::<Option<DateTime<Utc>>, _>(0);
        let max = row.get::<Option<DateTime<Utc>>, _>(1);
        Ok(min.zip(max))
    }

    pub async fn next_event_named(
        &self,
        name: &str,
        after: DateTime<Utc>,
    ) -> Result<Option<StoredEvent>> {
        let row = sqlx::query(
            "SELECT id, ocd_id, name, description, start_time, location, status, slug
             FROM events
             WHERE name = ? AND start_time > ? AND status != 'cancelled'
             ORDER BY start_time ASC
             LIMIT 1",
        )
        .bind(name)
        .bind(after)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(event_from_row))
    }

    pub async fn upcoming_events_excluding(
        &self,
        name: &str,
        after: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<StoredEvent>> {
        let rows = sqlx::query(
            "SELECT id, ocd_id, name, description, start_time, location, status, slug
             FROM events
             WHERE name != ? AND start_time > ? AND status != 'cancelled'
             ORDER BY start_time ASC
             LIMIT ?",
        )
        .bind(name)
        .bind(after)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(event_from_row).collect())
    }

    pub async fn event_by_slug(&self, slug: &str) -> Result<Option<StoredEvent>> {
        let row = sqlx::query(
            "SELECT id, ocd_id, name, description, start_time, location, status, slug
             FROM events
             WHERE slug = ?",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(event_from_row))
    }

    pub async fn participants_for_event(&self, event_id: EventId) -> Result<Vec<StoredParticipant>> {
        let rows = sqlx::query(
            "SELECT entity_name, entity_type FROM event_participants WHERE event_id = ? ORDER BY id ASC",
        )
        .bind(event_id.0)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| StoredParticipant {
                entity_name: r.get::<String, _>(0),
                entity_type: r.get::<String, _>(1),
            })
            .collect())
    }
}

fn bill_from_row(row: &SqliteRow) -> StoredBill {
    StoredBill {
        bill_id: BillId(row.get::<i64, _>(0)),
        ocd_id: row.get::<String, _>(1),
        identifier: row.get::<String, _>(2),
        description: row.get::<String, _>(3),
        bill_type: row.get::<String, _>(4),
        slug: row.get::<String, _>(5),
        last_action_date: row.get::<Option<NaiveDate>, _>(6),
        inferred_status: row
            .get::<Option<String>, _>(7)
            .as_deref()
            .and_then(InferredStatus::from_db_str),
    }
}

fn organization_from_row(row: &SqliteRow) -> StoredOrganization {
    StoredOrganization {
        organization_id: OrganizationId(row.get::<i64, _>(0)),
        ocd_id: row.get::<String, _>(1),
        name: row.get::<String, _>(2),
        classification: row.get::<Option<String>, _>(3),
        slug: row.get::<String, _>(4),
    }
}

fn membership_from_row(row: &SqliteRow) -> StoredMembership {
    StoredMembership {
        membership_id: MembershipId(row.get::<i64, _>(0)),
        organization_id: OrganizationId(row.get::<i64, _>(1)),
        organization_name: row.get::<String, _>(2),
        organization_slug: row.get::<String, _>(3),
        person_id: PersonId(row.get::<i64, _>(4)),
        person_name: row.get::<String, _>(5),
        person_slug: row.get::<String, _>(6),
        role: MembershipRole::from_db_str(&row.get::<String, _>(7)),
        post_label: row.get::<Option<String>, _>(8),
    }
}

fn event_from_row(row: &SqliteRow) -> StoredEvent {
    StoredEvent {
        event_id: EventId(row.get::<i64, _>(0)),
        ocd_id: row.get::<String, _>(1),
        name: row.get::<String, _>(2),
        description: row.get::<String, _>(3),
        start_time: row.get::<DateTime<Utc>, _>(4),
        location: row.get::<Option<String>, _>(5),
        status: EventStatus::from_db_str(&row.get::<String, _>(6)),
        slug: row.get::<String, _>(7),
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[async_trait]
impl SearchIndex for Storage {
    /// Default legislation index: substring match over identifier and
    /// description. A blank query returns the full corpus, newest first.
    async fn search_bills(&self, query: &SearchQuery) -> Result<Vec<BillHit>> {
        let rows = match &query.text {
            Some(text) => {
                sqlx::query(
                    "SELECT id, identifier, description, slug, last_action_date
                     FROM bills
                     WHERE identifier LIKE '%' || ? || '%' OR description LIKE '%' || ? || '%'
                     ORDER BY last_action_date IS NULL, last_action_date DESC",
                )
                .bind(text)
                .bind(text)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    "SELECT id, identifier, description, slug, last_action_date
                     FROM bills
                     ORDER BY last_action_date IS NULL, last_action_date DESC",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows
            .into_iter()
            .map(|r| BillHit {
                bill_id: BillId(r.get::<i64, _>(0)),
                identifier: r.get::<String, _>(1),
                description: r.get::<String, _>(2),
                slug: r.get::<String, _>(3),
                last_action_date: r.get::<Option<NaiveDate>, _>(4),
            })
            .collect())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
