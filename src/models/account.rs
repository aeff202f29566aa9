use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The role tag carried by an account and embedded in its tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// One weekly availability entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilitySlot {
    /// Day of the week, e.g. `Monday`.
    pub day: String,
    /// Time slot within the day, e.g. `09:00-11:00`.
    pub slot: String,
}

/// Represents a registered account as stored.
///
/// Deliberately not `Serialize`: the password hash must never leave the
/// server. Use [`Account::view`] for anything sent to a client. `Debug`
/// redacts the hash.
#[derive(Clone)]
pub struct Account {
    /// The unique identifier for the account.
    pub id: Uuid,
    /// The display name.
    pub name: String,
    /// The normalised (trimmed, lowercased) email address.
    pub email: String,
    /// The Argon2id PHC string.
    pub password_hash: String,
    /// The account's role.
    pub role: Role,
    /// Academic year, e.g. `Junior`.
    pub grade_level: String,
    /// Declared major.
    pub major: String,
    /// Degree type, e.g. `B.S.`.
    pub degree_type: String,
    /// Identifiers of completed courses.
    pub completed_courses: Vec<String>,
    /// Identifiers of courses in progress.
    pub current_courses: Vec<String>,
    /// Career-interest tags.
    pub career_interests: Vec<String>,
    /// Accessibility-need tags.
    pub disabilities: Vec<String>,
    /// Weekly availability.
    pub availability: Vec<AvailabilitySlot>,
    /// The timestamp when the account was created.
    pub created_at: DateTime<Utc>,
    /// The timestamp when the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("role", &self.role)
            .field("grade_level", &self.grade_level)
            .field("major", &self.major)
            .field("degree_type", &self.degree_type)
            .field("completed_courses", &self.completed_courses)
            .field("current_courses", &self.current_courses)
            .field("career_interests", &self.career_interests)
            .field("disabilities", &self.disabilities)
            .field("availability", &self.availability)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

impl Account {
    /// The sanitized view of this account.
    pub fn view(&self) -> AccountView {
        AccountView {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            grade_level: self.grade_level.clone(),
            major: self.major.clone(),
            degree_type: self.degree_type.clone(),
            completed_courses: self.completed_courses.clone(),
            current_courses: self.current_courses.clone(),
            career_interests: self.career_interests.clone(),
            disabilities: self.disabilities.clone(),
            availability: self.availability.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Applies the fields present in `update`, leaving the rest untouched.
    pub fn apply(&mut self, update: &ProfileUpdate, now: DateTime<Utc>) {
        if let Some(grade_level) = &update.grade_level {
            self.grade_level = grade_level.clone();
        }
        if let Some(major) = &update.major {
            self.major = major.clone();
        }
        if let Some(degree_type) = &update.degree_type {
            self.degree_type = degree_type.clone();
        }
        if let Some(courses) = &update.completed_courses {
            self.completed_courses = courses.clone();
        }
        if let Some(courses) = &update.current_courses {
            self.current_courses = courses.clone();
        }
        if let Some(interests) = &update.career_interests {
            self.career_interests = interests.clone();
        }
        if let Some(disabilities) = &update.disabilities {
            self.disabilities = disabilities.clone();
        }
        if let Some(availability) = &update.availability {
            self.availability = availability.clone();
        }
        self.updated_at = now;
    }
}

/// An account as shown to clients. Never carries credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub grade_level: String,
    pub major: String,
    pub degree_type: String,
    pub completed_courses: Vec<String>,
    pub current_courses: Vec<String>,
    pub career_interests: Vec<String>,
    pub disabilities: Vec<String>,
    pub availability: Vec<AvailabilitySlot>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The data needed to persist a freshly registered account.
#[derive(Clone, Debug)]
pub struct NewAccount {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl NewAccount {
    /// The full account as it looks right after insertion, with default
    /// academic fields.
    pub fn into_account(self) -> Account {
        Account {
            id: self.id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            role: self.role,
            grade_level: String::new(),
            major: String::new(),
            degree_type: String::new(),
            completed_courses: Vec::new(),
            current_courses: Vec::new(),
            career_interests: Vec::new(),
            disabilities: Vec::new(),
            availability: Vec::new(),
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// A partial profile update. `None` means "leave as is".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degree_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_courses: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_courses: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub career_interests: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabilities: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<Vec<AvailabilitySlot>>,
}
