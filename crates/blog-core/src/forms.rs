//! Input forms: raw submitted fields, their validation, and binding onto entities.
//!
//! Each form's `clean` either yields typed data or a [`FormErrors`] map keyed
//! by field name, so a rejected submission can be redisplayed with inline
//! errors. Cross-entity checks (does the category exist, is the username
//! taken) happen in the service, which adds to the same map.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Category, Comment, Location, Post, User};

pub const TITLE_MAX_LENGTH: usize = 256;
pub const SLUG_MAX_LENGTH: usize = 64;
pub const USERNAME_MAX_LENGTH: usize = 150;
pub const NAME_MAX_LENGTH: usize = 150;
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Key for errors that belong to no single field.
pub const NON_FIELD_ERRORS: &str = "__all__";

pub(crate) const REQUIRED: &str = "This field is required.";
pub(crate) const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

/// Field-level validation errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn field(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Ok(value)` when no error was recorded.
    pub fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, FormErrors> {
        if self.is_empty() { Ok(value()) } else { Err(self) }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Trim `value` and check it against `required` and `max_length`.
fn clean_char_field(
    errors: &mut FormErrors,
    field: &str,
    value: &str,
    required: bool,
    max_length: Option<usize>,
) -> String {
    let value = value.trim();
    if required && value.is_empty() {
        errors.add(field, REQUIRED);
    }
    if let Some(max) = max_length {
        let len = value.chars().count();
        if len > max {
            errors.add(
                field,
                format!("Ensure this value has at most {max} characters (it has {len})."),
            );
        }
    }
    value.to_string()
}

/// Accepts RFC 3339 or a naive `YYYY-MM-DD[T ]HH:MM[:SS]`, read as UTC.
pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ]
    .iter()
    .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
    .map(|naive| naive.and_utc())
}

fn is_valid_username(value: &str) -> bool {
    value
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '@' | '.' | '+' | '-'))
}

fn is_valid_slug(value: &str) -> bool {
    value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.rsplit_once('@') else {
        return false;
    };
    !local.is_empty()
        && !local.contains(char::is_whitespace)
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Posts

/// Submitted post fields. The author is never part of the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    /// Publication moment; a future value schedules the post.
    #[serde(default)]
    pub pub_date: Option<String>,
    #[serde(default)]
    pub location: Option<i64>,
    #[serde(default)]
    pub category: Option<i64>,
    #[serde(default = "default_true")]
    pub is_published: bool,
}

impl Default for PostForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            text: String::new(),
            pub_date: None,
            location: None,
            category: None,
            is_published: true,
        }
    }
}

/// Validated post fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostData {
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub location_id: Option<i64>,
    pub category_id: i64,
    pub is_published: bool,
}

impl PostForm {
    /// A form prefilled from an existing post.
    pub fn from_post(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            text: post.text.clone(),
            pub_date: Some(post.pub_date.to_rfc3339()),
            location: post.location_id,
            category: post.category_id,
            is_published: post.is_published,
        }
    }

    pub fn clean(&self) -> Result<PostData, FormErrors> {
        let mut errors = FormErrors::new();

        let title = clean_char_field(
            &mut errors,
            "title",
            &self.title,
            true,
            Some(TITLE_MAX_LENGTH),
        );
        let text = clean_char_field(&mut errors, "text", &self.text, true, None);

        let pub_date = match self.pub_date.as_deref().map(str::trim) {
            None | Some("") => {
                errors.add("pub_date", REQUIRED);
                None
            }
            Some(raw) => {
                let parsed = parse_datetime(raw);
                if parsed.is_none() {
                    errors.add("pub_date", "Enter a valid date/time.");
                }
                parsed
            }
        };

        if self.category.is_none() {
            errors.add("category", REQUIRED);
        }

        errors.finish(|| PostData {
            title,
            text,
            pub_date: pub_date.unwrap_or_default(),
            location_id: self.location,
            category_id: self.category.unwrap_or_default(),
            is_published: self.is_published,
        })
    }
}

impl PostData {
    pub fn into_post(self, author_id: i64) -> Post {
        let mut post = Post::new(author_id, self.title, self.text, self.pub_date);
        post.location_id = self.location_id;
        post.category_id = Some(self.category_id);
        post.is_published = self.is_published;
        post
    }

    pub fn apply_to(self, post: &mut Post) {
        post.title = self.title;
        post.text = self.text;
        post.pub_date = self.pub_date;
        post.location_id = self.location_id;
        post.category_id = Some(self.category_id);
        post.is_published = self.is_published;
    }
}

// ---------------------------------------------------------------------------
// Comments

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub text: String,
}

impl CommentForm {
    pub fn from_comment(comment: &Comment) -> Self {
        Self {
            text: comment.text.clone(),
        }
    }

    /// The trimmed comment body.
    pub fn clean(&self) -> Result<String, FormErrors> {
        let mut errors = FormErrors::new();
        let text = clean_char_field(&mut errors, "text", &self.text, true, None);
        errors.finish(|| text)
    }
}

// ---------------------------------------------------------------------------
// Accounts

/// Editable profile fields of the requester's own account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileData {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

fn clean_username(errors: &mut FormErrors, value: &str) -> String {
    let username = clean_char_field(
        errors,
        "username",
        value,
        true,
        Some(USERNAME_MAX_LENGTH),
    );
    if !username.is_empty() && !is_valid_username(&username) {
        errors.add(
            "username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        );
    }
    username
}

fn clean_email(errors: &mut FormErrors, value: &str, required: bool) -> String {
    let email = clean_char_field(errors, "email", value, required, None);
    if !email.is_empty() && !is_valid_email(&email) {
        errors.add("email", "Enter a valid email address.");
    }
    email
}

impl ProfileForm {
    pub fn from_user(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }

    pub fn clean(&self) -> Result<ProfileData, FormErrors> {
        let mut errors = FormErrors::new();
        let username = clean_username(&mut errors, &self.username);
        let email = clean_email(&mut errors, &self.email, false);
        let first_name = clean_char_field(
            &mut errors,
            "first_name",
            &self.first_name,
            false,
            Some(NAME_MAX_LENGTH),
        );
        let last_name = clean_char_field(
            &mut errors,
            "last_name",
            &self.last_name,
            false,
            Some(NAME_MAX_LENGTH),
        );
        errors.finish(|| ProfileData {
            username,
            email,
            first_name,
            last_name,
        })
    }
}

impl ProfileData {
    pub fn apply_to(self, user: &mut User) {
        user.username = self.username;
        user.email = self.email;
        user.first_name = self.first_name;
        user.last_name = self.last_name;
    }
}

/// Sign-up fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing)]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationData {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegistrationForm {
    pub fn clean(&self) -> Result<RegistrationData, FormErrors> {
        let mut errors = FormErrors::new();
        let username = clean_username(&mut errors, &self.username);
        let email = clean_email(&mut errors, &self.email, true);
        if self.password.chars().count() < PASSWORD_MIN_LENGTH {
            errors.add(
                "password",
                format!(
                    "This password is too short. It must contain at least {PASSWORD_MIN_LENGTH} characters."
                ),
            );
        }
        errors.finish(|| RegistrationData {
            username,
            email,
            password: self.password.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Reference data

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default = "default_true")]
    pub is_published: bool,
}

impl CategoryForm {
    pub fn clean(&self) -> Result<Category, FormErrors> {
        let mut errors = FormErrors::new();
        let title = clean_char_field(
            &mut errors,
            "title",
            &self.title,
            true,
            Some(TITLE_MAX_LENGTH),
        );
        let description =
            clean_char_field(&mut errors, "description", &self.description, true, None);
        let slug = clean_char_field(&mut errors, "slug", &self.slug, true, Some(SLUG_MAX_LENGTH));
        if !slug.is_empty() && !is_valid_slug(&slug) {
            errors.add(
                "slug",
                "Enter a valid slug consisting of Latin letters, numbers, underscores or hyphens.",
            );
        }
        errors.finish(|| {
            let mut category = Category::new(title, description, slug);
            category.is_published = self.is_published;
            category
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationForm {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_true")]
    pub is_published: bool,
}

impl LocationForm {
    pub fn clean(&self) -> Result<Location, FormErrors> {
        let mut errors = FormErrors::new();
        let name = clean_char_field(&mut errors, "name", &self.name, true, Some(TITLE_MAX_LENGTH));
        errors.finish(|| {
            let mut location = Location::new(name);
            location.is_published = self.is_published;
            location
        })
    }
}
