//! Resource shapes exchanged with the upstream API.
//!
//! Entities carry no behavior. A [`Booking`] embeds snapshots of its user
//! and parc as the upstream returned them at read time.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A remote resource kind and the shape used to create it.
pub trait Resource: DeserializeOwned + Serialize + Send + Sync + 'static {
    /// Body sent on `POST /{PATH}`.
    type Create: Validate + DeserializeOwned + Serialize + Send + Sync + 'static;

    /// Collection path segment, e.g. `users`.
    const PATH: &'static str;

    /// Human-readable singular name for logs.
    const NAME: &'static str;
}

/// Envelope wrapping every list response: `{ "data": [...] }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ListEnvelope<R> {
    pub data: Vec<R>,
}

/// A rejected field in a creation payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} {reason}")]
pub struct FieldError {
    pub field: &'static str,
    pub reason: String,
}

impl FieldError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Local checks run on a creation payload before it leaves the process.
pub trait Validate {
    fn validate(&self) -> Result<(), Vec<FieldError>>;
}

fn require(errors: &mut Vec<FieldError>, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, "should not be empty"));
    }
}

fn finish(errors: Vec<FieldError>) -> Result<(), Vec<FieldError>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
}

impl Validate for CreateUser {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        require(&mut errors, "name", &self.name);
        if !self.email.contains('@') {
            errors.push(FieldError::new("email", "must be an email"));
        }
        finish(errors)
    }
}

impl Resource for User {
    type Create = CreateUser;
    const PATH: &'static str = "users";
    const NAME: &'static str = "user";
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Parc {
    pub id: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CreateParc {
    pub name: String,
    pub description: String,
}

impl Validate for CreateParc {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        require(&mut errors, "name", &self.name);
        require(&mut errors, "description", &self.description);
        finish(errors)
    }
}

impl Resource for Parc {
    type Create = CreateParc;
    const PATH: &'static str = "parcs";
    const NAME: &'static str = "parc";
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Booking {
    pub id: String,
    pub user: User,
    pub parc: Parc,
    #[serde(rename = "bookingdate")]
    pub booking_date: String,
    pub comments: String,
}

/// Booking request. `user` and `parc` are ids, not embedded objects.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CreateBooking {
    pub user: String,
    pub parc: String,
    #[serde(rename = "bookingdate")]
    pub booking_date: String,
    pub comments: String,
}

impl Validate for CreateBooking {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        require(&mut errors, "user", &self.user);
        require(&mut errors, "parc", &self.parc);
        if NaiveDate::parse_from_str(&self.booking_date, "%Y-%m-%d").is_err() {
            errors.push(FieldError::new("bookingdate", "must be a date formatted YYYY-MM-DD"));
        }
        finish(errors)
    }
}

impl Resource for Booking {
    type Create = CreateBooking;
    const PATH: &'static str = "bookings";
    const NAME: &'static str = "booking";
}
