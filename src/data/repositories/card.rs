use chrono::{DateTime, Utc};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_types::Integer;

use super::ReviewStore;
use crate::data::models::{
    CardReviewState, CardRow, NewCard, NewCardRow, NewReviewEvent, NewReviewEventRow,
    ReviewEvent, ReviewEventRow, SrsError, SrsResult,
};
use crate::schema::{cards, review_events};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

const CREATE_TABLES: &str = "
    CREATE TABLE IF NOT EXISTS cards (
        card_id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
        owner_id INTEGER NOT NULL,
        topic_id INTEGER,
        front TEXT NOT NULL,
        back TEXT NOT NULL,
        repetition_count INTEGER NOT NULL DEFAULT 0,
        easiness_factor DOUBLE NOT NULL DEFAULT 2.5,
        next_review_at TIMESTAMP NOT NULL,
        last_reviewed_at TIMESTAMP,
        last_retention DOUBLE NOT NULL DEFAULT 0,
        mastery_level DOUBLE NOT NULL DEFAULT 0,
        created_at TIMESTAMP NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_cards_owner_due ON cards (owner_id, next_review_at);
    CREATE TABLE IF NOT EXISTS review_events (
        event_id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
        card_id INTEGER NOT NULL REFERENCES cards (card_id),
        owner_id INTEGER NOT NULL,
        difficulty INTEGER NOT NULL,
        retention DOUBLE NOT NULL,
        interval_days INTEGER NOT NULL,
        easiness_factor DOUBLE NOT NULL,
        reviewed_at TIMESTAMP NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_review_events_owner ON review_events (owner_id, reviewed_at);
";

pub struct CardRepository;

impl CardRepository {
    pub fn ensure_schema(conn: &mut SqliteConnection) -> Result<(), diesel::result::Error> {
        conn.batch_execute(CREATE_TABLES)
    }

    pub fn insert_card(
        conn: &mut SqliteConnection,
        card: &NewCard,
        now: DateTime<Utc>,
    ) -> Result<CardReviewState, diesel::result::Error> {
        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let initial = CardReviewState::new(0, card.clone(), now);
            diesel::insert_into(cards::table)
                .values(&NewCardRow {
                    owner_id: initial.owner_id,
                    topic_id: initial.topic_id,
                    front: &initial.front,
                    back: &initial.back,
                    repetition_count: initial.repetition_count,
                    easiness_factor: initial.easiness_factor,
                    next_review_at: initial.next_review_at.naive_utc(),
                    last_reviewed_at: None,
                    last_retention: initial.last_retention,
                    mastery_level: initial.mastery_level,
                    created_at: initial.created_at.naive_utc(),
                })
                .execute(conn)?;

            let card_id = diesel::select(diesel::dsl::sql::<Integer>("last_insert_rowid()"))
                .get_result::<i32>(conn)?;

            Ok(CardReviewState { card_id, ..initial })
        })
    }

    pub fn find_by_id(
        conn: &mut SqliteConnection,
        card_id: i32,
    ) -> Result<Option<CardReviewState>, diesel::result::Error> {
        cards::table
            .find(card_id)
            .select(CardRow::as_select())
            .first::<CardRow>(conn)
            .optional()
            .map(|row| row.map(CardReviewState::from))
    }

    /// Returns the number of rows updated (0 when the card is unknown)
    pub fn update_schedule(
        conn: &mut SqliteConnection,
        card: &CardReviewState,
    ) -> Result<usize, diesel::result::Error> {
        diesel::update(cards::table.find(card.card_id))
            .set((
                cards::repetition_count.eq(card.repetition_count),
                cards::easiness_factor.eq(card.easiness_factor),
                cards::next_review_at.eq(card.next_review_at.naive_utc()),
                cards::last_reviewed_at.eq(card.last_reviewed_at.map(|t| t.naive_utc())),
                cards::last_retention.eq(card.last_retention),
                cards::mastery_level.eq(card.mastery_level),
            ))
            .execute(conn)
    }

    pub fn insert_event(
        conn: &mut SqliteConnection,
        event: &NewReviewEvent,
    ) -> Result<ReviewEvent, diesel::result::Error> {
        diesel::insert_into(review_events::table)
            .values(NewReviewEventRow::from(event))
            .execute(conn)?;

        let event_id = diesel::select(diesel::dsl::sql::<Integer>("last_insert_rowid()"))
            .get_result::<i32>(conn)?;

        Ok(ReviewEvent::from_new(event_id, event.clone()))
    }

    pub fn find_by_owner(
        conn: &mut SqliteConnection,
        owner_id: i32,
    ) -> Result<Vec<CardReviewState>, diesel::result::Error> {
        cards::table
            .filter(cards::owner_id.eq(owner_id))
            .order_by(cards::card_id.asc())
            .select(CardRow::as_select())
            .load::<CardRow>(conn)
            .map(|rows| rows.into_iter().map(CardReviewState::from).collect())
    }

    pub fn find_due(
        conn: &mut SqliteConnection,
        owner_id: i32,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<CardReviewState>, diesel::result::Error> {
        cards::table
            .filter(cards::owner_id.eq(owner_id))
            .filter(cards::next_review_at.le(as_of.naive_utc()))
            .order_by((cards::next_review_at.asc(), cards::card_id.asc()))
            .select(CardRow::as_select())
            .load::<CardRow>(conn)
            .map(|rows| rows.into_iter().map(CardReviewState::from).collect())
    }

    pub fn find_events_by_owner(
        conn: &mut SqliteConnection,
        owner_id: i32,
    ) -> Result<Vec<ReviewEvent>, diesel::result::Error> {
        review_events::table
            .filter(review_events::owner_id.eq(owner_id))
            .order_by((review_events::reviewed_at.asc(), review_events::event_id.asc()))
            .select(ReviewEventRow::as_select())
            .load::<ReviewEventRow>(conn)
            .map(|rows| rows.into_iter().map(ReviewEvent::from).collect())
    }
}

/// Review store backed by SQLite through an r2d2 pool
#[derive(Clone)]
pub struct SqliteReviewStore {
    pool: DbPool,
}

impl SqliteReviewStore {
    pub fn new(pool: DbPool) -> SrsResult<Self> {
        let mut conn = pool.get()?;
        CardRepository::ensure_schema(&mut conn)?;
        Ok(Self { pool })
    }

    /// Open `database_url`; `:memory:` databases get a single connection
    pub fn connect(database_url: &str) -> SrsResult<Self> {
        let path = database_url.strip_prefix("sqlite://").unwrap_or(database_url);
        let manager = ConnectionManager::<SqliteConnection>::new(path);
        let builder = if path == ":memory:" {
            // The database lives and dies with its one connection
            Pool::builder().max_size(1).max_lifetime(None).idle_timeout(None)
        } else {
            Pool::builder().max_size(8)
        };
        let pool = builder.build(manager)?;
        Self::new(pool)
    }

    fn conn(&self) -> SrsResult<diesel::r2d2::PooledConnection<ConnectionManager<SqliteConnection>>> {
        self.pool.get().map_err(|e| {
            log::error!("Failed to get DB connection: {}", e);
            SrsError::from(e)
        })
    }
}

impl ReviewStore for SqliteReviewStore {
    fn create_card(&self, card: NewCard, now: DateTime<Utc>) -> SrsResult<CardReviewState> {
        let mut conn = self.conn()?;
        Ok(CardRepository::insert_card(&mut conn, &card, now)?)
    }

    fn get_card(&self, card_id: i32) -> SrsResult<CardReviewState> {
        let mut conn = self.conn()?;
        CardRepository::find_by_id(&mut conn, card_id)?.ok_or(SrsError::NotFound(card_id))
    }

    fn save_card(&self, card: &CardReviewState) -> SrsResult<()> {
        let mut conn = self.conn()?;
        match CardRepository::update_schedule(&mut conn, card)? {
            0 => Err(SrsError::NotFound(card.card_id)),
            _ => Ok(()),
        }
    }

    fn append_review_event(&self, event: &NewReviewEvent) -> SrsResult<ReviewEvent> {
        let mut conn = self.conn()?;
        Ok(CardRepository::insert_event(&mut conn, event)?)
    }

    fn list_cards_by_owner(&self, owner_id: i32) -> SrsResult<Vec<CardReviewState>> {
        let mut conn = self.conn()?;
        Ok(CardRepository::find_by_owner(&mut conn, owner_id)?)
    }

    fn list_due_cards(&self, owner_id: i32, as_of: DateTime<Utc>) -> SrsResult<Vec<CardReviewState>> {
        let mut conn = self.conn()?;
        Ok(CardRepository::find_due(&mut conn, owner_id, as_of)?)
    }

    fn list_review_events(&self, owner_id: i32) -> SrsResult<Vec<ReviewEvent>> {
        let mut conn = self.conn()?;
        Ok(CardRepository::find_events_by_owner(&mut conn, owner_id)?)
    }

    fn commit_review(&self, card: &CardReviewState, event: &NewReviewEvent) -> SrsResult<ReviewEvent> {
        let mut conn = self.conn()?;
        conn.transaction::<_, SrsError, _>(|conn| {
            if CardRepository::update_schedule(conn, card)? == 0 {
                return Err(SrsError::NotFound(card.card_id));
            }
            Ok(CardRepository::insert_event(conn, event)?)
        })
    }
}
