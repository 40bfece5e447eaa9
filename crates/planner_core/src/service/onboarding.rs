//! First-launch onboarding wizard.
//!
//! # Responsibility
//! - Hold wizard input across the welcome/profile/term/course/preferences steps.
//! - Derive the academic terms for the chosen setup.
//! - Persist profile, terms and the optional first course atomically.
//!
//! # Invariants
//! - Semester mode is only available to high-school students.
//! - Exactly one created term is active.
//! - `complete` either writes everything or nothing.

use crate::model::course::{Course, CourseValidationError, WeekdayMask, DEFAULT_COURSE_COLOR};
use crate::model::profile::{StudentLevel, StudentProfile, DEFAULT_REMINDER_LEAD_HOURS};
use crate::model::term::AcademicTerm;
use crate::repo::course_repo::{CourseRepository, SqliteCourseRepository};
use crate::repo::profile_repo::{ProfileRepository, SqliteProfileRepository};
use crate::repo::RepoError;
use crate::time::Calendar;
use log::info;
use rusqlite::{Connection, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const DEFAULT_TERM_NAME: &str = "Spring Term";
pub const FALLBACK_TERM_NAME: &str = "Current Term";
pub const FALLBACK_SCHOOL_YEAR_NAME: &str = "School Year";
pub const DEFAULT_SEMESTER_BREAK_WEEKS: i64 = 2;
const SEMESTER_MONTHS: i32 = 6;
const DEFAULT_TERM_MONTHS: i32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum OnboardingStep {
    Welcome,
    Profile,
    Term,
    Course,
    Preferences,
}

impl OnboardingStep {
    pub const ALL: [OnboardingStep; 5] = [
        Self::Welcome,
        Self::Profile,
        Self::Term,
        Self::Course,
        Self::Preferences,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    fn next(self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }

    fn previous(self) -> Option<Self> {
        self.index().checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }
}

#[derive(Debug)]
pub enum OnboardingError {
    /// The current step's input does not allow finishing.
    Incomplete(OnboardingStep),
    Course(CourseValidationError),
    Repo(RepoError),
}

impl Display for OnboardingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Incomplete(step) => write!(f, "onboarding step {step:?} is incomplete"),
            Self::Course(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for OnboardingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Incomplete(_) => None,
            Self::Course(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for OnboardingError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<rusqlite::Error> for OnboardingError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(RepoError::from(value))
    }
}

/// Records written by a successful `complete`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnboardingResult {
    pub profile: StudentProfile,
    pub terms: Vec<AcademicTerm>,
    pub course: Option<Course>,
}

/// Wizard state. Fields are edited directly by the host form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Onboarding {
    pub step: OnboardingStep,

    pub display_name: String,
    pub student_level: StudentLevel,

    pub term_name: String,
    pub term_start_date: i64,
    pub term_end_date: i64,

    pub add_initial_course: bool,
    pub course_name: String,
    pub course_code: String,
    pub course_location: String,
    pub course_color_hex: String,
    pub course_meeting_days: WeekdayMask,
    pub course_start_minute: u16,
    pub course_end_minute: u16,

    pub default_reminder_lead_hours: i64,
    pub semester_mode_enabled: bool,
    pub semester_break_weeks: i64,
}

impl Onboarding {
    /// Starts the wizard with a term spanning last week to four months out.
    pub fn new(now_ms: i64, calendar: &dyn Calendar) -> Self {
        let start = calendar.add_days(now_ms, -7).unwrap_or(now_ms);
        let end = calendar
            .add_months(now_ms, DEFAULT_TERM_MONTHS)
            .unwrap_or(now_ms);
        let default_course = Course::new("", StudentLevel::College);
        Self {
            step: OnboardingStep::Welcome,
            display_name: String::new(),
            student_level: StudentLevel::College,
            term_name: DEFAULT_TERM_NAME.to_string(),
            term_start_date: start,
            term_end_date: end,
            add_initial_course: false,
            course_name: String::new(),
            course_code: String::new(),
            course_location: String::new(),
            course_color_hex: DEFAULT_COURSE_COLOR.to_string(),
            course_meeting_days: WeekdayMask::EMPTY,
            course_start_minute: default_course.start_minute,
            course_end_minute: default_course.end_minute,
            default_reminder_lead_hours: DEFAULT_REMINDER_LEAD_HOURS,
            semester_mode_enabled: false,
            semester_break_weeks: DEFAULT_SEMESTER_BREAK_WEEKS,
        }
    }

    pub fn supports_semester_split(&self) -> bool {
        self.student_level == StudentLevel::HighSchool
    }

    pub fn setup_description(&self) -> String {
        if !self.semester_mode_enabled {
            return "One active term".to_string();
        }
        format!(
            "Creates Semester 1 + Semester 2 (6 months each) with a {}-week break",
            self.semester_break_weeks
        )
    }

    pub fn can_continue(&self) -> bool {
        match self.step {
            OnboardingStep::Welcome | OnboardingStep::Profile | OnboardingStep::Preferences => true,
            OnboardingStep::Term => {
                let has_name = !self.term_name.trim().is_empty();
                if self.semester_mode_enabled {
                    has_name
                } else {
                    has_name && self.term_start_date <= self.term_end_date
                }
            }
            OnboardingStep::Course => {
                !self.add_initial_course || !self.course_name.trim().is_empty()
            }
        }
    }

    pub fn is_first_step(&self) -> bool {
        self.step == OnboardingStep::Welcome
    }

    pub fn is_last_step(&self) -> bool {
        self.step == OnboardingStep::Preferences
    }

    /// Advances one step when the current step allows it.
    pub fn go_forward(&mut self) {
        if !self.can_continue() {
            return;
        }
        if let Some(next) = self.step.next() {
            self.step = next;
        }
    }

    pub fn go_back(&mut self) {
        if let Some(previous) = self.step.previous() {
            self.step = previous;
        }
    }

    /// Turns semester mode off for students who cannot use it.
    pub fn enforce_compatible_setup(&mut self) {
        if !self.supports_semester_split() {
            self.semester_mode_enabled = false;
        }
    }

    /// Recomputes `term_end_date` for the selected setup.
    ///
    /// Single-term mode only repairs a reversed range; semester mode sets the
    /// end to the last day of semester two.
    pub fn sync_dates_for_selected_setup(&mut self, calendar: &dyn Calendar) {
        if !self.semester_mode_enabled {
            if self.term_start_date > self.term_end_date {
                self.term_end_date = calendar
                    .add_months(self.term_start_date, DEFAULT_TERM_MONTHS)
                    .unwrap_or(self.term_start_date);
            }
            return;
        }
        self.term_end_date = self.semester_dates(calendar).semester2_end;
    }

    /// Terms that `complete` would create.
    pub fn build_terms(&self, calendar: &dyn Calendar) -> Vec<AcademicTerm> {
        let clean_name = self.term_name.trim();

        if !(self.supports_semester_split() && self.semester_mode_enabled) {
            let name = if clean_name.is_empty() {
                FALLBACK_TERM_NAME
            } else {
                clean_name
            };
            return vec![AcademicTerm::new(
                name,
                self.term_start_date,
                self.term_end_date,
                true,
            )];
        }

        let dates = self.semester_dates(calendar);
        let base = if clean_name.is_empty() {
            FALLBACK_SCHOOL_YEAR_NAME
        } else {
            clean_name
        };
        vec![
            AcademicTerm::new(
                format!("{base} - Semester 1"),
                self.term_start_date,
                dates.semester1_end,
                true,
            ),
            AcademicTerm::new(
                format!("{base} - Semester 2"),
                dates.semester2_start,
                dates.semester2_end,
                false,
            ),
        ]
    }

    /// Persists profile, terms and the optional course in one transaction.
    ///
    /// The course attaches to the first (active) term. A blank course name
    /// skips the course instead of failing.
    pub fn complete(
        &self,
        conn: &mut Connection,
        now_ms: i64,
        calendar: &dyn Calendar,
    ) -> Result<OnboardingResult, OnboardingError> {
        let mut profile =
            StudentProfile::new(self.display_name.trim(), self.student_level, now_ms);
        profile.default_reminder_lead_hours = self.default_reminder_lead_hours;

        let terms = self.build_terms(calendar);
        let course = self.build_course(terms.first())?;

        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        {
            let profiles = SqliteProfileRepository::new(&tx);
            let courses = SqliteCourseRepository::new(&tx);
            profiles.save_profile(&profile)?;
            for term in &terms {
                courses.create_term(term)?;
            }
            if let Some(course) = &course {
                courses.create_course(course)?;
            }
        }
        tx.commit()?;

        info!(
            "event=onboarding_complete module=service status=ok terms={} course={}",
            terms.len(),
            course.is_some()
        );
        Ok(OnboardingResult {
            profile,
            terms,
            course,
        })
    }

    /// Fills missing input with defaults and completes in one go.
    pub fn complete_for_skip(
        &mut self,
        conn: &mut Connection,
        now_ms: i64,
        calendar: &dyn Calendar,
    ) -> Result<OnboardingResult, OnboardingError> {
        if self.term_name.trim().is_empty() {
            self.term_name = FALLBACK_TERM_NAME.to_string();
        }
        self.enforce_compatible_setup();
        self.sync_dates_for_selected_setup(calendar);
        self.complete(conn, now_ms, calendar)
    }

    fn build_course(
        &self,
        primary_term: Option<&AcademicTerm>,
    ) -> Result<Option<Course>, OnboardingError> {
        if !self.add_initial_course {
            return Ok(None);
        }
        let name = self.course_name.trim();
        if name.is_empty() {
            return Ok(None);
        }

        let mut course = Course::new(name, self.student_level);
        course.code = self.course_code.trim().to_string();
        course.location = self.course_location.trim().to_string();
        course.color_hex = self.course_color_hex.clone();
        course.meeting_days = self.course_meeting_days;
        course.start_minute = self.course_start_minute;
        course.end_minute = self.course_end_minute;
        course.term_id = primary_term.map(|term| term.uuid);
        course.validate().map_err(OnboardingError::Course)?;
        Ok(Some(course))
    }

    fn semester_dates(&self, calendar: &dyn Calendar) -> SemesterDates {
        let start = self.term_start_date;
        let semester1_end = calendar
            .add_months(start, SEMESTER_MONTHS)
            .and_then(|candidate| calendar.add_days(candidate, -1))
            .unwrap_or(start);
        let semester2_start = self
            .semester_break_weeks
            .checked_mul(7)
            .and_then(|days| days.checked_add(1))
            .and_then(|offset| calendar.add_days(semester1_end, offset))
            .unwrap_or(semester1_end);
        let semester2_end = calendar
            .add_months(semester2_start, SEMESTER_MONTHS)
            .and_then(|candidate| calendar.add_days(candidate, -1))
            .unwrap_or(semester2_start);
        SemesterDates {
            semester1_end,
            semester2_start,
            semester2_end,
        }
    }
}

struct SemesterDates {
    semester1_end: i64,
    semester2_start: i64,
    semester2_end: i64,
}
