use chrono::format::{self, Parsed, StrftimeItems};
use chrono::{
    DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, ParseError, TimeZone, Utc,
};
use uuid::Uuid;

use super::models::{Expense, ExpenseFilterQuery, ExpenseListQuery};

/// +05:30, the offset every calendar day is interpreted in unless configured otherwise.
pub const DEFAULT_REPORTING_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// Fixed UTC offset used for date-range boundaries and per-day bucketing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportingOffset(FixedOffset);

impl Default for ReportingOffset {
    fn default() -> Self {
        Self::from_seconds(DEFAULT_REPORTING_OFFSET_SECS).unwrap_or(Self(Utc.fix()))
    }
}

impl ReportingOffset {
    /// Returns `None` when the offset is not strictly within ±24h.
    pub fn from_seconds(seconds: i32) -> Option<Self> {
        FixedOffset::east_opt(seconds).map(Self)
    }

    /// Parse `±HH:MM` (e.g. `+05:30`, `-08:00`); trailing input is rejected.
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let mut parsed = Parsed::new();
        format::parse(&mut parsed, raw.trim(), StrftimeItems::new("%:z"))?;
        parsed.to_fixed_offset().map(Self)
    }

    pub fn seconds(&self) -> i32 {
        self.0.local_minus_utc()
    }

    /// The UTC instant at which `day` begins in this offset.
    /// `None` only for dates at the edge of the representable range.
    pub fn day_start(&self, day: NaiveDate) -> Option<DateTime<Utc>> {
        day.and_time(NaiveTime::MIN)
            .checked_sub_signed(Duration::seconds(self.seconds().into()))
            .map(|naive| Utc.from_utc_datetime(&naive))
    }

    /// The UTC instant at which the day after `day` begins in this offset.
    pub fn day_end_exclusive(&self, day: NaiveDate) -> Option<DateTime<Utc>> {
        day.succ_opt().and_then(|next| self.day_start(next))
    }

    /// The calendar day `instant` falls on in this offset.
    pub fn day_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.0).date_naive()
    }
}

/// Canonical predicate shared by the row listing and every aggregate.
///
/// Date bounds form the half-open range `[start, end)`; a `None` bound is
/// unbounded on that side. `None` ids mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseFilter {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub category_id: Option<Uuid>,
    pub payment_method_id: Option<Uuid>,
}

impl ExpenseFilter {
    pub fn normalize(
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        category_id: Option<Uuid>,
        payment_method_id: Option<Uuid>,
        offset: ReportingOffset,
    ) -> Self {
        Self {
            start: start_date.and_then(|day| offset.day_start(day)),
            end: end_date.and_then(|day| offset.day_end_exclusive(day)),
            category_id,
            payment_method_id,
        }
    }

    pub fn from_list_query(query: &ExpenseListQuery, offset: ReportingOffset) -> Self {
        Self::normalize(
            query.start_date,
            query.end_date,
            query.category_id,
            query.payment_method_id,
            offset,
        )
    }

    pub fn from_filter_query(query: &ExpenseFilterQuery, offset: ReportingOffset) -> Self {
        Self::normalize(
            query.start_date,
            query.end_date,
            query.category_id,
            query.payment_method_id,
            offset,
        )
    }

    /// Evaluate the predicate against a single row (owner scoping is the caller's job).
    pub fn matches(&self, expense: &Expense) -> bool {
        self.start.map_or(true, |start| expense.expense_date >= start)
            && self.end.map_or(true, |end| expense.expense_date < end)
            && self
                .category_id
                .map_or(true, |id| expense.category_id == id)
            && self
                .payment_method_id
                .map_or(true, |id| expense.payment_method_id == id)
    }
}
