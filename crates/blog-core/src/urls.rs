//! Canonical paths of the public pages, used as redirect targets.

pub fn index() -> String {
    "/".to_string()
}

pub fn category(slug: &str) -> String {
    format!("/category/{slug}/")
}

pub fn post_detail(post_id: i64) -> String {
    format!("/posts/{post_id}/")
}

pub fn profile(username: &str) -> String {
    format!("/profile/{username}/")
}
