//! Booking rules: the temporal and textual checks a request must pass
//! before the store is consulted.
//!
//! Every rule is an independent pure function of the request, the current
//! instant and the [`Policy`]. Each field reports only its first failing
//! check, but every field is evaluated, so a single call to [`validate`]
//! returns the complete list of problems with a request.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeDelta, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, appointment::BookingRequest};

// ─── Policy ──────────────────────────────────────────────────────────────────

const fn hm(hour: u32, min: u32) -> NaiveTime {
  match NaiveTime::from_hms_opt(hour, min, 0) {
    Some(t) => t,
    None => panic!("invalid time constant"),
  }
}

pub const DEFAULT_OPENS_AT: NaiveTime = hm(8, 0);
pub const DEFAULT_CLOSES_AT: NaiveTime = hm(18, 0);
pub const DEFAULT_MIN_LEAD_MINUTES: i64 = 30;
pub const DEFAULT_MIN_TEXT_LEN: usize = 2;
pub const DEFAULT_MAX_TEXT_LEN: usize = 200;

/// Business constants the rules are evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
  /// First bookable time of day (inclusive).
  pub opens_at:         NaiveTime,
  /// Last bookable time of day (inclusive).
  pub closes_at:        NaiveTime,
  /// Same-day bookings must start at least this far from now.
  pub min_lead_minutes: i64,
  pub min_text_len:     usize,
  pub max_text_len:     usize,
}

impl Default for Policy {
  fn default() -> Self {
    Self {
      opens_at:         DEFAULT_OPENS_AT,
      closes_at:        DEFAULT_CLOSES_AT,
      min_lead_minutes: DEFAULT_MIN_LEAD_MINUTES,
      min_text_len:     DEFAULT_MIN_TEXT_LEN,
      max_text_len:     DEFAULT_MAX_TEXT_LEN,
    }
  }
}

impl Policy {
  /// Reject policies that could never accept a booking.
  pub fn check(&self) -> Result<()> {
    if self.opens_at > self.closes_at {
      return Err(Error::InvertedOpeningHours {
        opens_at:  self.opens_at,
        closes_at: self.closes_at,
      });
    }
    if self.min_text_len > self.max_text_len {
      return Err(Error::InvertedLengthBounds {
        min: self.min_text_len,
        max: self.max_text_len,
      });
    }
    if self.min_lead_minutes < 0 {
      return Err(Error::NegativeLeadTime(self.min_lead_minutes));
    }
    Ok(())
  }

  pub fn min_lead(&self) -> TimeDelta {
    TimeDelta::try_minutes(self.min_lead_minutes).unwrap_or(TimeDelta::MAX)
  }
}

// ─── Violations ──────────────────────────────────────────────────────────────

/// The request field a violation is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
  Name,
  Service,
  Date,
  Time,
  /// The combined date + time lead-time rule.
  DateTime,
}

/// Which rule failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
  Required,
  /// The value could not be decoded at all (only produced by transports).
  Format,
  Length,
  Characters,
  PastDate,
  Weekend,
  BusinessHours,
  LeadTime,
}

/// A single failed rule with a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
  pub rule:    Rule,
  pub message: String,
}

impl Violation {
  pub fn new(rule: Rule, message: impl Into<String>) -> Self {
    Self { rule, message: message.into() }
  }
}

/// A violation attributed to a request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
  pub field:   Field,
  pub rule:    Rule,
  pub message: String,
}

/// Every violation found in a request, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("request failed {} validation rule(s)", .0.len())]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
  pub fn push(&mut self, field: Field, violation: Violation) {
    self.0.push(FieldError {
      field,
      rule: violation.rule,
      message: violation.message,
    });
  }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn iter(&self) -> impl Iterator<Item = &FieldError> { self.0.iter() }

  /// The violation reported for `field`, if any.
  pub fn get(&self, field: Field) -> Option<&FieldError> {
    self.0.iter().find(|e| e.field == field)
  }

  /// Whether any field failed `rule`.
  pub fn has_rule(&self, rule: Rule) -> bool { self.0.iter().any(|e| e.rule == rule) }

  pub fn into_inner(self) -> Vec<FieldError> { self.0 }
}

impl From<FieldError> for ValidationErrors {
  fn from(e: FieldError) -> Self { Self(vec![e]) }
}

// ─── Predicates ──────────────────────────────────────────────────────────────

/// Fail with [`Rule::Required`] if `value` is absent.
pub fn required<T>(value: Option<T>, label: &str) -> Result<T, Violation> {
  value.ok_or_else(|| Violation::new(Rule::Required, format!("{label} is required")))
}

fn required_text<'a>(value: Option<&'a str>, label: &str) -> Result<&'a str, Violation> {
  match value {
    Some(s) if !s.trim().is_empty() => Ok(s),
    _ => Err(Violation::new(Rule::Required, format!("{label} is required"))),
  }
}

fn bounded_length(value: &str, label: &str, policy: &Policy) -> Result<(), Violation> {
  let len = value.chars().count();
  if (policy.min_text_len..=policy.max_text_len).contains(&len) {
    Ok(())
  } else {
    Err(Violation::new(
      Rule::Length,
      format!(
        "{label} must be between {} and {} characters",
        policy.min_text_len, policy.max_text_len
      ),
    ))
  }
}

/// Letters from ASCII and the Latin-1 supplement, plus whitespace.
fn is_name_char(c: char) -> bool {
  c.is_ascii_alphabetic() || ('\u{C0}'..='\u{FF}').contains(&c) || c.is_whitespace()
}

/// Subject name: required, bounded length, letters and spaces only.
pub fn check_name<'a>(value: Option<&'a str>, policy: &Policy) -> Result<&'a str, Violation> {
  let name = required_text(value, "name")?;
  bounded_length(name, "name", policy)?;
  if !name.chars().all(is_name_char) {
    return Err(Violation::new(
      Rule::Characters,
      "name must contain only letters and spaces",
    ));
  }
  Ok(name)
}

/// Service name: required, bounded length.
pub fn check_service<'a>(value: Option<&'a str>, policy: &Policy) -> Result<&'a str, Violation> {
  let service = required_text(value, "service")?;
  bounded_length(service, "service", policy)?;
  Ok(service)
}

/// Date: not before `today`, and not on a weekend.
pub fn check_date(date: NaiveDate, today: NaiveDate) -> Result<(), Violation> {
  if date < today {
    return Err(Violation::new(Rule::PastDate, "date must be today or later"));
  }
  if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
    return Err(Violation::new(
      Rule::Weekend,
      "appointments are only available on weekdays",
    ));
  }
  Ok(())
}

/// Time: within opening hours, both bounds inclusive.
pub fn check_time(time: NaiveTime, policy: &Policy) -> Result<(), Violation> {
  if time < policy.opens_at || time > policy.closes_at {
    return Err(Violation::new(
      Rule::BusinessHours,
      format!(
        "opening hours are {} to {}",
        policy.opens_at.format("%H:%M"),
        policy.closes_at.format("%H:%M")
      ),
    ));
  }
  Ok(())
}

/// Combined date + time.
///
/// A booking for today must start at least `min_lead` from `now`. A booking
/// for a later date always passes; lead time is not re-applied to it. A
/// booking for an earlier date always fails.
pub fn check_lead_time(
  date: NaiveDate,
  time: NaiveTime,
  now: DateTime<Utc>,
  policy: &Policy,
) -> Result<(), Violation> {
  let today = now.date_naive();
  let ok = if date == today {
    now
      .naive_utc()
      .checked_add_signed(policy.min_lead())
      .is_some_and(|earliest| date.and_time(time) >= earliest)
  } else {
    date > today
  };

  if ok {
    Ok(())
  } else {
    Err(Violation::new(
      Rule::LeadTime,
      format!(
        "appointment must be at least {} minutes in the future",
        policy.min_lead_minutes
      ),
    ))
  }
}

/// Whether a slot is bookable at all, independent of existing bookings.
///
/// Checks run in order (non-past date, weekday, opening hours, lead time)
/// and the first failure is returned.
pub fn check_slot(
  date: NaiveDate,
  time: NaiveTime,
  now: DateTime<Utc>,
  policy: &Policy,
) -> Result<(), Violation> {
  check_date(date, now.date_naive())?;
  check_time(time, policy)?;
  check_lead_time(date, time, now, policy)
}

// ─── Request validation ──────────────────────────────────────────────────────

/// A request whose every field passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRequest {
  pub name:    String,
  pub service: String,
  pub date:    NaiveDate,
  pub time:    NaiveTime,
}

fn collect<T>(errors: &mut ValidationErrors, field: Field, result: Result<T, Violation>) -> Option<T> {
  match result {
    Ok(v) => Some(v),
    Err(violation) => {
      errors.push(field, violation);
      None
    }
  }
}

/// Evaluate every rule against `request`.
///
/// Each field contributes at most one violation (its first failing check).
/// The combined lead-time rule is evaluated whenever both a date and a time
/// were supplied, even if one of them failed its own rule.
pub fn validate(
  request: &BookingRequest,
  now: DateTime<Utc>,
  policy: &Policy,
) -> Result<ValidRequest, ValidationErrors> {
  let mut errors = ValidationErrors::default();
  let today = now.date_naive();

  let name = collect(&mut errors, Field::Name, check_name(request.name.as_deref(), policy));
  let service = collect(
    &mut errors,
    Field::Service,
    check_service(request.service.as_deref(), policy),
  );
  let date = collect(
    &mut errors,
    Field::Date,
    required(request.date, "date").and_then(|d| check_date(d, today).map(|()| d)),
  );
  let time = collect(
    &mut errors,
    Field::Time,
    required(request.time, "time").and_then(|t| check_time(t, policy).map(|()| t)),
  );

  if let (Some(d), Some(t)) = (request.date, request.time) {
    collect(&mut errors, Field::DateTime, check_lead_time(d, t, now, policy));
  }

  match (name, service, date, time) {
    (Some(name), Some(service), Some(date), Some(time)) if errors.is_empty() => {
      Ok(ValidRequest {
        name: name.to_owned(),
        service: service.to_owned(),
        date,
        time,
      })
    }
    _ => Err(errors),
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use chrono::TimeZone;
  use proptest::prelude::*;

  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, d).unwrap() }

  fn time(h: u32, m: u32, s: u32) -> NaiveTime { NaiveTime::from_hms_opt(h, m, s).unwrap() }

  fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
  }

  // Tuesday 2026-10-20, 07:00 UTC.
  fn tuesday_morning() -> DateTime<Utc> { at(2026, 10, 20, 7, 0) }

  fn request(d: NaiveDate, t: NaiveTime) -> BookingRequest {
    BookingRequest::new("Maria Silva", "Corte", d, t)
  }

  // ── Text fields ─────────────────────────────────────────────────────────

  #[test]
  fn name_missing_or_blank_is_required() {
    let p = Policy::default();
    assert_eq!(check_name(None, &p).unwrap_err().rule, Rule::Required);
    assert_eq!(check_name(Some(""), &p).unwrap_err().rule, Rule::Required);
    assert_eq!(check_name(Some("   "), &p).unwrap_err().rule, Rule::Required);
  }

  #[test]
  fn name_length_bounds() {
    let p = Policy::default();
    assert_eq!(check_name(Some("A"), &p).unwrap_err().rule, Rule::Length);
    assert!(check_name(Some("Al"), &p).is_ok());
    assert!(check_name(Some("a".repeat(200).as_str()), &p).is_ok());
    assert_eq!(
      check_name(Some("a".repeat(201).as_str()), &p).unwrap_err().rule,
      Rule::Length
    );
  }

  #[test]
  fn name_accepts_accented_letters_and_spaces() {
    let p = Policy::default();
    assert!(check_name(Some("João Conceição"), &p).is_ok());
    assert!(check_name(Some("Zoë Ångström"), &p).is_ok());
  }

  #[test]
  fn name_rejects_digits_and_punctuation() {
    let p = Policy::default();
    assert_eq!(check_name(Some("R2D2"), &p).unwrap_err().rule, Rule::Characters);
    assert_eq!(
      check_name(Some("Anne-Marie"), &p).unwrap_err().rule,
      Rule::Characters
    );
  }

  #[test]
  fn name_length_is_checked_before_characters() {
    let p = Policy::default();
    assert_eq!(check_name(Some("1"), &p).unwrap_err().rule, Rule::Length);
  }

  #[test]
  fn service_allows_any_characters() {
    let p = Policy::default();
    assert!(check_service(Some("Corte + Barba (30min)"), &p).is_ok());
    assert_eq!(check_service(Some("x"), &p).unwrap_err().rule, Rule::Length);
    assert_eq!(check_service(None, &p).unwrap_err().rule, Rule::Required);
  }

  // ── Date ────────────────────────────────────────────────────────────────

  #[test]
  fn today_is_not_past() {
    let today = date(2026, 10, 20);
    assert!(check_date(today, today).is_ok());
    assert_eq!(
      check_date(date(2026, 10, 19), today).unwrap_err().rule,
      Rule::PastDate
    );
  }

  #[test]
  fn weekends_rejected() {
    let today = date(2026, 10, 20);
    assert_eq!(
      check_date(date(2026, 10, 24), today).unwrap_err().rule,
      Rule::Weekend
    );
    assert_eq!(
      check_date(date(2026, 10, 25), today).unwrap_err().rule,
      Rule::Weekend
    );
    assert!(check_date(date(2026, 10, 23), today).is_ok());
  }

  #[test]
  fn past_weekend_reports_past_first() {
    let today = date(2026, 10, 20);
    assert_eq!(
      check_date(date(2026, 10, 18), today).unwrap_err().rule,
      Rule::PastDate
    );
  }

  // ── Time ────────────────────────────────────────────────────────────────

  #[test]
  fn business_hours_are_inclusive() {
    let p = Policy::default();
    assert!(check_time(time(8, 0, 0), &p).is_ok());
    assert!(check_time(time(18, 0, 0), &p).is_ok());
    assert_eq!(
      check_time(time(7, 59, 59), &p).unwrap_err().rule,
      Rule::BusinessHours
    );
    assert_eq!(
      check_time(time(18, 1, 0), &p).unwrap_err().rule,
      Rule::BusinessHours
    );
    assert_eq!(
      check_time(time(18, 30, 0), &p).unwrap_err().message,
      "opening hours are 08:00 to 18:00"
    );
  }

  // ── Lead time ───────────────────────────────────────────────────────────

  #[test]
  fn same_day_lead_time_boundary() {
    let p = Policy::default();
    let now = at(2026, 10, 20, 10, 0);
    let today = now.date_naive();

    assert!(check_lead_time(today, time(10, 30, 0), now, &p).is_ok());
    assert_eq!(
      check_lead_time(today, time(10, 29, 59), now, &p)
        .unwrap_err()
        .rule,
      Rule::LeadTime
    );
    assert!(check_lead_time(today, time(9, 0, 0), now, &p).is_err());
  }

  #[test]
  fn future_date_skips_lead_time() {
    let p = Policy::default();
    let now = at(2026, 10, 20, 23, 59);
    assert!(check_lead_time(date(2026, 10, 21), time(0, 0, 0), now, &p).is_ok());
  }

  #[test]
  fn past_date_fails_lead_time() {
    let p = Policy::default();
    let now = tuesday_morning();
    assert!(check_lead_time(date(2026, 10, 19), time(12, 0, 0), now, &p).is_err());
  }

  #[test]
  fn zero_lead_time_accepts_exact_now() {
    let p = Policy { min_lead_minutes: 0, ..Policy::default() };
    let now = at(2026, 10, 20, 10, 0);
    assert!(check_lead_time(now.date_naive(), time(10, 0, 0), now, &p).is_ok());
  }

  // ── Slot ────────────────────────────────────────────────────────────────

  #[test]
  fn check_slot_reports_first_failure() {
    let p = Policy::default();
    let now = tuesday_morning();
    // Saturday at 19:00: weekday fails before opening hours.
    let err = check_slot(date(2026, 10, 24), time(19, 0, 0), now, &p).unwrap_err();
    assert_eq!(err.rule, Rule::Weekend);
    // Weekday at 19:00.
    let err = check_slot(date(2026, 10, 21), time(19, 0, 0), now, &p).unwrap_err();
    assert_eq!(err.rule, Rule::BusinessHours);
    // Today at 07:15, inside the lead window and before opening.
    let err = check_slot(date(2026, 10, 20), time(7, 15, 0), now, &p).unwrap_err();
    assert_eq!(err.rule, Rule::BusinessHours);
    // Today at 08:00, 60 minutes ahead.
    assert!(check_slot(date(2026, 10, 20), time(8, 0, 0), now, &p).is_ok());
  }

  // ── validate ────────────────────────────────────────────────────────────

  #[test]
  fn valid_request_is_promoted() {
    let now = tuesday_morning();
    let ok = validate(&request(date(2026, 10, 20), time(9, 0, 0)), now, &Policy::default())
      .unwrap();
    assert_eq!(ok.name, "Maria Silva");
    assert_eq!(ok.service, "Corte");
    assert_eq!(ok.time, time(9, 0, 0));
  }

  #[test]
  fn empty_request_reports_every_required_field() {
    let errs = validate(&BookingRequest::default(), tuesday_morning(), &Policy::default())
      .unwrap_err();
    assert_eq!(errs.len(), 4);
    assert!(errs.iter().all(|e| e.rule == Rule::Required));
    assert!(errs.get(Field::DateTime).is_none());
  }

  #[test]
  fn all_fields_are_evaluated() {
    let req = BookingRequest {
      name:    Some("R2".into()),
      service: Some("x".into()),
      date:    Some(date(2026, 10, 24)),
      time:    Some(time(19, 0, 0)),
    };
    let errs = validate(&req, tuesday_morning(), &Policy::default()).unwrap_err();
    assert_eq!(errs.get(Field::Name).unwrap().rule, Rule::Characters);
    assert_eq!(errs.get(Field::Service).unwrap().rule, Rule::Length);
    assert_eq!(errs.get(Field::Date).unwrap().rule, Rule::Weekend);
    assert_eq!(errs.get(Field::Time).unwrap().rule, Rule::BusinessHours);
    // Saturday is a later date, so the combined rule passes.
    assert!(errs.get(Field::DateTime).is_none());
  }

  #[test]
  fn past_date_fails_both_date_and_combined_rule() {
    let errs = validate(
      &request(date(2026, 10, 19), time(9, 0, 0)),
      tuesday_morning(),
      &Policy::default(),
    )
    .unwrap_err();
    assert_eq!(errs.get(Field::Date).unwrap().rule, Rule::PastDate);
    assert_eq!(errs.get(Field::DateTime).unwrap().rule, Rule::LeadTime);
    assert_eq!(errs.len(), 2);
  }

  #[test]
  fn lead_time_violation_alone() {
    let now = at(2026, 10, 20, 9, 0);
    let errs = validate(&request(date(2026, 10, 20), time(9, 15, 0)), now, &Policy::default())
      .unwrap_err();
    assert_eq!(errs.len(), 1);
    assert_eq!(errs.get(Field::DateTime).unwrap().rule, Rule::LeadTime);
  }

  #[test]
  fn policy_check_rejects_inverted_bounds() {
    let p = Policy { opens_at: time(19, 0, 0), ..Policy::default() };
    assert!(matches!(p.check(), Err(Error::InvertedOpeningHours { .. })));
    let p = Policy { min_text_len: 10, max_text_len: 5, ..Policy::default() };
    assert!(matches!(p.check(), Err(Error::InvertedLengthBounds { .. })));
    let p = Policy { min_lead_minutes: -1, ..Policy::default() };
    assert!(matches!(p.check(), Err(Error::NegativeLeadTime(-1))));
    assert!(Policy::default().check().is_ok());
  }

  // ── Properties ──────────────────────────────────────────────────────────

  fn weekday_after(base: NaiveDate, days: i64) -> NaiveDate {
    let mut d = base + TimeDelta::days(days);
    while matches!(d.weekday(), Weekday::Sat | Weekday::Sun) {
      d += TimeDelta::days(1);
    }
    d
  }

  proptest! {
    #[test]
    fn past_dates_always_rejected(days_back in 1i64..3650, secs in 0u32..86_400) {
      let now = tuesday_morning();
      let d = now.date_naive() - TimeDelta::days(days_back);
      let t = NaiveTime::from_num_seconds_from_midnight_opt(secs, 0).unwrap();
      let errs = validate(&request(d, t), now, &Policy::default()).unwrap_err();
      prop_assert_eq!(errs.get(Field::Date).unwrap().rule, Rule::PastDate);
      prop_assert!(check_slot(d, t, now, &Policy::default()).is_err());
    }

    #[test]
    fn weekends_always_rejected(weeks in 0i64..520, sunday in any::<bool>(), secs in 0u32..86_400) {
      // 2026-10-24 is a Saturday.
      let d = date(2026, 10, 24) + TimeDelta::weeks(weeks) + TimeDelta::days(i64::from(sunday));
      let t = NaiveTime::from_num_seconds_from_midnight_opt(secs, 0).unwrap();
      let err = check_slot(d, t, tuesday_morning(), &Policy::default()).unwrap_err();
      prop_assert_eq!(err.rule, Rule::Weekend);
    }

    #[test]
    fn outside_opening_hours_always_rejected(days in 1i64..3650, secs in 0u32..86_400) {
      let t = NaiveTime::from_num_seconds_from_midnight_opt(secs, 0).unwrap();
      prop_assume!(t < DEFAULT_OPENS_AT || t > DEFAULT_CLOSES_AT);
      let d = weekday_after(tuesday_morning().date_naive(), days);
      let err = check_slot(d, t, tuesday_morning(), &Policy::default()).unwrap_err();
      prop_assert_eq!(err.rule, Rule::BusinessHours);
    }

    #[test]
    fn future_weekday_within_hours_always_accepted(days in 1i64..3650, secs in 28_800u32..=64_800) {
      let t = NaiveTime::from_num_seconds_from_midnight_opt(secs, 0).unwrap();
      let d = weekday_after(tuesday_morning().date_naive(), days);
      prop_assert!(validate(&request(d, t), tuesday_morning(), &Policy::default()).is_ok());
    }

    #[test]
    fn same_day_accepted_iff_lead_time_met(now_secs in 0u32..86_400, slot_secs in 28_800u32..=64_800) {
      let today = date(2026, 10, 20);
      let now = today
        .and_time(NaiveTime::from_num_seconds_from_midnight_opt(now_secs, 0).unwrap())
        .and_utc();
      let t = NaiveTime::from_num_seconds_from_midnight_opt(slot_secs, 0).unwrap();
      let expected = i64::from(slot_secs) >= i64::from(now_secs) + 30 * 60;
      prop_assert_eq!(check_slot(today, t, now, &Policy::default()).is_ok(), expected);
    }
  }
}
