//! Request body validation.
//!
//! Checks accumulate into a single list so the client sees every failing
//! field at once, as `{"errors":[{"msg":..,"param":..,"value":..}]}`.

use serde::Serialize;

use crate::error::ApiError;

/// One failed check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
  pub msg:   &'static str,
  pub param: &'static str,
  /// The offending input, echoed back for non-secret fields only.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub value: Option<String>,
}

#[derive(Debug, Default)]
pub struct Checks {
  errors: Vec<FieldError>,
}

impl Checks {
  pub fn new() -> Self { Self::default() }

  /// `value` must be present and contain something other than whitespace.
  pub fn not_empty(
    mut self,
    param: &'static str,
    value: Option<&str>,
    msg:   &'static str,
  ) -> Self {
    if value.is_none_or(|v| v.trim().is_empty()) {
      self.fail(param, value, msg);
    }
    self
  }

  /// Like [`Checks::not_empty`], but only applies when the field was sent.
  pub fn not_empty_if_present(
    self,
    param: &'static str,
    value: Option<&str>,
    msg:   &'static str,
  ) -> Self {
    match value {
      Some(_) => self.not_empty(param, value, msg),
      None    => self,
    }
  }

  /// `value` must be present and look like an email address.
  pub fn email(
    mut self,
    param: &'static str,
    value: Option<&str>,
    msg:   &'static str,
  ) -> Self {
    if !value.is_some_and(is_email) {
      self.fail(param, value, msg);
    }
    self
  }

  /// `value` must be present and at least `min` characters long. The value is
  /// never echoed back.
  pub fn min_len(
    mut self,
    param: &'static str,
    value: Option<&str>,
    min:   usize,
    msg:   &'static str,
  ) -> Self {
    if value.is_none_or(|v| v.chars().count() < min) {
      self.errors.push(FieldError { msg, param, value: None });
    }
    self
  }

  pub fn finish(self) -> Result<(), ApiError> {
    if self.errors.is_empty() {
      Ok(())
    } else {
      Err(ApiError::Validation(self.errors))
    }
  }

  fn fail(&mut self, param: &'static str, value: Option<&str>, msg: &'static str) {
    self.errors.push(FieldError { msg, param, value: value.map(str::to_owned) });
  }
}

/// A deliberately loose shape check: one `@`, a non-empty local part, and a
/// dotted domain with no empty labels. Deliverability is not our problem.
pub fn is_email(s: &str) -> bool {
  let s = s.trim();
  if s.chars().any(char::is_whitespace) {
    return false;
  }
  let Some((local, domain)) = s.split_once('@') else {
    return false;
  };
  !local.is_empty()
    && !domain.contains('@')
    && domain.contains('.')
    && domain.split('.').all(|label| !label.is_empty())
}
