//! # Intranet client
//!
//! [`Intranet`] is the entry point of the crate. Connecting logs in, fetches
//! the resources roster and binds the configured username to a person id;
//! afterwards every portal feature is one async method.
//!
//! ## Caching
//!
//! Reads are memoized for the lifetime of the client, keyed by their
//! arguments, and return `Arc`s: calling an operation twice with the same
//! arguments yields the very same value without a second request. Nothing
//! expires on its own. When the portal session lapses, build a new client
//! or call [`Intranet::invalidate_caches`].
//!
//! Writes (`set_homework`, `delete_homework`) always hit the portal and
//! evict the cached homework info of their lesson.
//!
//! ## Examples
//!
//! ```rust,no_run
//! use opentam::{Credentials, Intranet, Settings, TimetableQuery};
//!
//! # tokio_test::block_on(async {
//! let credentials = Credentials::new("max.muster", "secret", "krm");
//! let intranet = Intranet::connect(credentials, Settings::default()).await?;
//!
//! let query = TimetableQuery::between("20.12.21", "25.02.22");
//! for lesson in intranet.timetable(&query).await?.iter() {
//!     if lesson.str("title").is_some_and(|t| t.contains("(!)")) {
//!         println!("Exam on {} during {}", lesson["lessonDate"], lesson["title"]);
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! # });
//! ```

use crate::{
    Error, Result,
    client::{cache::Memo, identity},
    config::{ListIds, Settings},
    extract::extract_grid_rows,
    session::{Credentials, PortalSession},
    types::{
        AbsenceData, DateRange, Field, Lessons, Record, Records, TimetableQuery, records_from_rows,
    },
    utils::{TimeWindow, current_week, custom_window},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use chrono::Local;
use image::{DynamicImage, ImageFormat};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Instrument, Span};

/// Grid list pages served under `list/index/list/<id>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ListKind {
    Absences,
    Classmates,
    ClassTeachers,
}

impl ListKind {
    fn label(self) -> &'static str {
        match self {
            ListKind::Absences => "absence-data",
            ListKind::Classmates => "get-class-mates",
            ListKind::ClassTeachers => "get-class-teachers",
        }
    }

    fn id(self, ids: &ListIds) -> u32 {
        match self {
            ListKind::Absences => ids.absences,
            ListKind::Classmates => ids.classmates,
            ListKind::ClassTeachers => ids.class_teachers,
        }
    }
}

/// Authenticated client for one portal account
#[derive(Debug)]
pub struct Intranet {
    session: PortalSession,
    username: String,
    /// Person id the username resolved to
    user_id: i64,
    /// Context attached to every log line of this client
    span: Span,
    resources: Memo<(), Arc<Record>>,
    timetables: Memo<(TimeWindow, i64), Records>,
    lists: Memo<ListKind, Records>,
    lesson_absences: Memo<Record, Arc<Record>>,
    homework: Memo<Record, Arc<Record>>,
    pictures: Memo<i64, Arc<DynamicImage>>,
}

impl Intranet {
    /// Log in, fetch the roster and resolve the account's person id.
    ///
    /// # Errors
    ///
    /// Everything [`PortalSession::open`] fails with, plus
    /// [`Error::Authentication`] if the resources endpoint does not answer
    /// with JSON and [`Error::UserIdNotMatching`] if the username does not
    /// match exactly one roster entry.
    pub async fn connect(credentials: Credentials, settings: Settings) -> Result<Self> {
        let span = tracing::info_span!(
            "intranet",
            school = %credentials.school_code,
            user = %credentials.username
        );

        async move {
            let session = PortalSession::open(&credentials, Arc::new(settings)).await?;

            let resources = Memo::new("resources");
            let session_ref = &session;
            let roster = resources
                .get_or_try_init((), move || Self::fetch_resources(session_ref))
                .await?;
            let user_id =
                identity::match_username(&credentials.username, roster.records("students"))?;

            tracing::debug!("Init passed, user id = {}", user_id);

            Ok(Self {
                session,
                username: credentials.username,
                user_id,
                span: Span::current(),
                resources,
                timetables: Memo::new("timetable"),
                lists: Memo::new("list"),
                lesson_absences: Memo::new("lesson absence"),
                homework: Memo::new("homework"),
                pictures: Memo::new("picture"),
            })
        }
        .instrument(span)
        .await
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn school_code(&self) -> &str {
        self.session.school_code()
    }

    pub fn csrf_token(&self) -> &str {
        self.session.csrf_token()
    }

    pub fn session(&self) -> &PortalSession {
        &self.session
    }

    /// Roster and other resources; `students` lists `personId` and `name`
    pub async fn resources(&self) -> Result<Arc<Record>> {
        self.resources
            .get_or_try_init((), move || Self::fetch_resources(&self.session))
            .instrument(self.span.clone())
            .await
    }

    /// Lessons of the query's window.
    ///
    /// # Errors
    ///
    /// [`Error::BadTimestamp`] for dates not in `DD.MM.YY` form (or an
    /// inverted window under [`crate::config::DateOrderPolicy::Reject`]),
    /// [`Error::PortalStatus`] if the portal flags the request as failed.
    pub async fn timetable(&self, query: &TimetableQuery) -> Result<Records> {
        async move {
            let student_id = query.student_id.unwrap_or(self.user_id);
            let window = match &query.range {
                DateRange::CurrentWeek => current_week()?,
                DateRange::Between { start, end } => custom_window(
                    start,
                    end,
                    &Local,
                    self.session.settings().timetable.date_order,
                )?,
            };
            tracing::debug!(
                "timetable for {} from {} to {}",
                student_id,
                window.start_ms,
                window.end_ms
            );

            self.timetables
                .get_or_try_init((window, student_id), move || {
                    self.fetch_timetable(window, student_id, query.timeout)
                })
                .await
        }
        .instrument(self.span.clone())
        .await
    }

    /// Rows of the absences list
    pub async fn absences(&self) -> Result<Records> {
        self.list(ListKind::Absences).await
    }

    /// Rows of the classmates list (`PersonID`, `Name`, `Vorname`, ...)
    pub async fn classmates(&self) -> Result<Records> {
        self.list(ListKind::Classmates).await
    }

    /// Rows of the class teachers list
    pub async fn class_teachers(&self) -> Result<Records> {
        self.list(ListKind::ClassTeachers).await
    }

    /// Absence entry data for one lesson or several.
    ///
    /// The result mirrors the input: one lesson gives
    /// [`AbsenceData::One`], a slice gives [`AbsenceData::Many`] in the
    /// same order.
    pub async fn lesson_absence_data<'a>(
        &self,
        lessons: impl Into<Lessons<'a>>,
    ) -> Result<AbsenceData> {
        match lessons.into() {
            Lessons::One(lesson) => Ok(AbsenceData::One(self.lesson_absence(lesson).await?)),
            Lessons::Many(lessons) => {
                let mut data = Vec::with_capacity(lessons.len());
                for lesson in lessons {
                    data.push(self.lesson_absence(lesson).await?);
                }
                Ok(AbsenceData::Many(data))
            }
        }
    }

    /// Homework title and description attached to a lesson
    pub async fn homework_info(&self, lesson: &Record) -> Result<Arc<Record>> {
        self.homework
            .get_or_try_init(lesson.clone(), move || self.fetch_homework(lesson))
            .instrument(self.span.clone())
            .await
    }

    /// Set a lesson's homework.
    ///
    /// # Errors
    ///
    /// [`Error::MissingPermission`] when the portal answers with empty data,
    /// which is how it rejects accounts that may not edit homework.
    pub async fn set_homework(
        &self,
        lesson: &Record,
        title: &str,
        description: &str,
    ) -> Result<Arc<Record>> {
        async move {
            let class_id = match lesson.require("classId")? {
                Field::List(ids) => ids
                    .first()
                    .ok_or_else(|| Error::missing_field("classId[0]"))?
                    .to_string(),
                other => other.to_string(),
            };
            let form = [
                ("timetableClassBookId", class_id),
                ("timetableId", lesson.require("id")?.to_string()),
                ("homeWorkData[title]", title.to_string()),
                ("homeWorkData[description]", description.to_string()),
            ];

            // Evict around the write: a read racing it must not keep the old homework
            self.homework.evict(lesson).await;
            let payload = self
                .session
                .post_ajax_json(
                    "ajax-save-lesson-home-work-data",
                    "timetable/ajax-save-lesson-home-work-data",
                    &form,
                    None,
                )
                .await;
            self.homework.evict(lesson).await;
            let content = Record::try_from(payload?)?;

            if content.get("data").is_none_or(Field::is_empty) {
                return Err(Error::missing_permission(
                    "Portal refused to save homework for this account",
                ));
            }

            Ok(Arc::new(content))
        }
        .instrument(self.span.clone())
        .await
    }

    /// Clear a lesson's homework; same as setting empty title and description
    pub async fn delete_homework(&self, lesson: &Record) -> Result<Arc<Record>> {
        self.set_homework(lesson, "", "").await
    }

    /// Profile picture of a student, the account's own by default
    pub async fn person_picture(&self, student_id: Option<i64>) -> Result<Arc<DynamicImage>> {
        let person = student_id.unwrap_or(self.user_id);
        self.pictures
            .get_or_try_init(person, move || self.fetch_picture(person))
            .instrument(self.span.clone())
            .await
    }

    /// Forget every memoized read. Not done automatically, not even when the
    /// session expires.
    pub async fn invalidate_caches(&self) {
        self.resources.clear().await;
        self.timetables.clear().await;
        self.lists.clear().await;
        self.lesson_absences.clear().await;
        self.homework.clear().await;
        self.pictures.clear().await;
        tracing::info!(parent: &self.span, "All caches invalidated");
    }

    // Private helpers

    async fn fetch_resources(session: &PortalSession) -> Result<Arc<Record>> {
        let form = [("periodId", session.settings().portal.period_id.clone())];
        let body = session
            .post_ajax("get-resources", "timetable/ajax-get-resources", &form, None)
            .await?
            .text()
            .await?;

        let payload: Value = serde_json::from_str(&body)
            .map_err(|_| Error::authentication("Could not authenticate"))?;
        Ok(Arc::new(data_record("get-resources", payload)?))
    }

    async fn fetch_timetable(
        &self,
        window: TimeWindow,
        student_id: i64,
        timeout: Option<Duration>,
    ) -> Result<Records> {
        tracing::debug!("requesting timetable...");
        let form = [
            ("startDate", window.start_ms.to_string()),
            ("endDate", window.end_ms.to_string()),
            ("studentId[]", student_id.to_string()),
            ("holidaysOnly", "0".to_string()),
        ];
        let mut payload = self
            .session
            .post_ajax_json(
                "ajax-get-timetable",
                "timetable/ajax-get-timetable",
                &form,
                timeout,
            )
            .await?;

        let status = payload
            .get("status")
            .cloned()
            .map(Field::from)
            .and_then(|status| status.as_i64())
            .unwrap_or(0);
        if status != 1 {
            return Err(Error::portal_status("ajax-get-timetable", status));
        }

        match payload.get_mut("data").map(Value::take) {
            Some(Value::Array(rows)) => records_from_rows(rows),
            Some(Value::Null) | None => Ok(Records::from(Vec::<Record>::new())),
            Some(other) => Err(Error::payload(format!(
                "timetable data is not a list: {}",
                other
            ))),
        }
    }

    async fn list(&self, kind: ListKind) -> Result<Records> {
        self.lists
            .get_or_try_init(kind, move || self.fetch_list(kind))
            .instrument(self.span.clone())
            .await
    }

    async fn fetch_list(&self, kind: ListKind) -> Result<Records> {
        let id = kind.id(&self.session.settings().portal.lists);
        let body = self
            .session
            .get_page(kind.label(), &format!("list/index/list/{}", id))
            .await?;
        let rows = extract_grid_rows(&body)?;
        tracing::debug!("{} matched {} rows", kind.label(), rows.len());
        records_from_rows(rows)
    }

    async fn lesson_absence(&self, lesson: &Record) -> Result<Arc<Record>> {
        self.lesson_absences
            .get_or_try_init(lesson.clone(), move || self.fetch_lesson_absence(lesson))
            .instrument(self.span.clone())
            .await
    }

    async fn fetch_lesson_absence(&self, lesson: &Record) -> Result<Arc<Record>> {
        let classmates = self.classmates().await?;
        let prepared_name = identity::prepared_name(self.user_id, classmates.iter())?;
        tracing::debug!("prepared name = {}", prepared_name);

        let form = [
            ("timetableId", lesson.require("id")?.to_string()),
            ("CourseId", lesson.require("courseId")?.to_string()),
            ("Date", lesson.require("lessonDate")?.to_string()),
            ("StartTime", lesson.require("lessonStart")?.to_string()),
            ("EndTime", lesson.require("lessonEnd")?.to_string()),
            ("Students[0][studentId]", self.user_id.to_string()),
            ("Students[0][studentName]", prepared_name),
        ];
        let payload = self
            .session
            .post_ajax_json(
                "absence-data-lesson",
                "timetable/ajax-get-lesson-students-absence-data",
                &form,
                None,
            )
            .await?;

        Ok(Arc::new(Record::try_from(payload)?))
    }

    async fn fetch_homework(&self, lesson: &Record) -> Result<Arc<Record>> {
        let form = [(
            "timetableClassBookId",
            lesson.require("courseId")?.to_string(),
        )];
        let payload = self
            .session
            .post_ajax_json(
                "homework-data",
                "timetable/ajax-get-lesson-home-work-data",
                &form,
                None,
            )
            .await?;

        Ok(Arc::new(data_record("homework-data", payload)?))
    }

    async fn fetch_picture(&self, person: i64) -> Result<Arc<DynamicImage>> {
        let form = [("person", person.to_string())];
        let body = self
            .session
            .post_ajax("get-person-picture", "list/get-person-picture", &form, None)
            .await?
            .bytes()
            .await?;

        // Like a lenient base64 decoder, skip anything outside the alphabet
        let encoded: Vec<u8> = body
            .iter()
            .copied()
            .filter(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'='))
            .collect();
        let jpeg = BASE64.decode(encoded)?;

        Ok(Arc::new(image::load_from_memory_with_format(
            &jpeg,
            ImageFormat::Jpeg,
        )?))
    }
}

/// The `data` member of an AJAX envelope as a record. An empty list or null
/// means "nothing there" and becomes an empty record.
fn data_record(label: &str, mut payload: Value) -> Result<Record> {
    match payload.get_mut("data").map(Value::take) {
        Some(data @ Value::Object(_)) => Record::try_from(data),
        Some(Value::Null) => Ok(Record::new()),
        Some(Value::Array(items)) if items.is_empty() => Ok(Record::new()),
        Some(other) => Err(Error::payload(format!(
            "{} data is not an object: {}",
            label, other
        ))),
        None => Err(Error::payload(format!("{} response lacks data", label))),
    }
}
