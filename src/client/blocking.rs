//! Synchronous facade over [`crate::Intranet`]
//!
//! Each method drives the async client to completion on a private
//! current-thread runtime, so one call blocks the calling thread for the
//! full round trip. Calling these methods from inside an async context
//! panics; use the async client there.
//!
//! ```rust,no_run
//! use opentam::{Credentials, Settings, blocking::Intranet};
//!
//! # fn main() -> opentam::Result<()> {
//! let credentials = Credentials::new("max.muster", "secret", "krm");
//! let intranet = Intranet::connect(credentials, Settings::default())?;
//! for absence in intranet.absences()?.iter() {
//!     println!("{}", absence["Kurs_Anlass"]);
//! }
//! # Ok(())
//! # }
//! ```

use crate::{
    Result,
    config::Settings,
    session::Credentials,
    types::{AbsenceData, Lessons, Record, Records, TimetableQuery},
};
use image::DynamicImage;
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::{Builder, Runtime};

/// Blocking intranet client
#[derive(Debug)]
pub struct Intranet {
    inner: crate::client::Intranet,
    runtime: Runtime,
}

impl Intranet {
    /// See [`crate::Intranet::connect`]
    pub fn connect(credentials: Credentials, settings: Settings) -> Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        let inner = runtime.block_on(crate::client::Intranet::connect(credentials, settings))?;
        Ok(Self { inner, runtime })
    }

    fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// The async client this facade drives
    pub fn as_async(&self) -> &crate::client::Intranet {
        &self.inner
    }

    pub fn user_id(&self) -> i64 {
        self.inner.user_id()
    }

    pub fn username(&self) -> &str {
        self.inner.username()
    }

    pub fn resources(&self) -> Result<Arc<Record>> {
        self.block_on(self.inner.resources())
    }

    pub fn timetable(&self, query: &TimetableQuery) -> Result<Records> {
        self.block_on(self.inner.timetable(query))
    }

    pub fn absences(&self) -> Result<Records> {
        self.block_on(self.inner.absences())
    }

    pub fn classmates(&self) -> Result<Records> {
        self.block_on(self.inner.classmates())
    }

    pub fn class_teachers(&self) -> Result<Records> {
        self.block_on(self.inner.class_teachers())
    }

    pub fn lesson_absence_data<'a>(
        &self,
        lessons: impl Into<Lessons<'a>>,
    ) -> Result<AbsenceData> {
        self.block_on(self.inner.lesson_absence_data(lessons))
    }

    pub fn homework_info(&self, lesson: &Record) -> Result<Arc<Record>> {
        self.block_on(self.inner.homework_info(lesson))
    }

    pub fn set_homework(
        &self,
        lesson: &Record,
        title: &str,
        description: &str,
    ) -> Result<Arc<Record>> {
        self.block_on(self.inner.set_homework(lesson, title, description))
    }

    pub fn delete_homework(&self, lesson: &Record) -> Result<Arc<Record>> {
        self.block_on(self.inner.delete_homework(lesson))
    }

    pub fn person_picture(&self, student_id: Option<i64>) -> Result<Arc<DynamicImage>> {
        self.block_on(self.inner.person_picture(student_id))
    }

    pub fn invalidate_caches(&self) {
        self.block_on(self.inner.invalidate_caches())
    }
}
