use std::sync::Arc;

use actix_web::dev::ServiceResponse;
use actix_web::{App, http::StatusCode, http::header, test, web};
use chrono::{Duration, Utc};
use serde_json::{Value, json};

use blog_core::domain::{Category, Comment, Post, User};
use blog_core::ports::{BaseRepository, CommentRepository, Repositories};
use blog_infra::InMemoryStore;

use super::configure_routes;
use crate::config::{AdminConfig, AppConfig};
use crate::state::AppState;

macro_rules! app {
    ($fixture:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($fixture.state.clone()))
                .configure(configure_routes),
        )
        .await
    };
}

struct Fixture {
    state: AppState,
    repos: Repositories,
}

impl Fixture {
    fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            state: AppState::in_memory(&store, &AppConfig::default()),
            repos: store.repositories(),
        }
    }

    /// A stored user and a bearer header for them.
    async fn user(&self, username: &str, staff: bool) -> (User, String) {
        let mut user = User::new(username.into(), format!("{username}@example.com"), "x".into());
        user.is_staff = staff;
        let user = self.repos.users.insert(user).await.unwrap();

        let mut roles = vec!["user".to_string()];
        if staff {
            roles.push("admin".to_string());
        }
        let token = self
            .state
            .token_service
            .generate_token(user.id, &user.username, roles)
            .unwrap();
        (user, format!("Bearer {token}"))
    }

    async fn category(&self, slug: &str, published: bool) -> Category {
        let mut category = Category::new(slug.to_uppercase(), "About it".into(), slug.into());
        category.is_published = published;
        self.repos.categories.insert(category).await.unwrap()
    }

    async fn post(&self, author: &User, category: &Category, published: bool) -> Post {
        let mut post = Post::new(
            author.id,
            "Hello".into(),
            "First words".into(),
            Utc::now() - Duration::hours(1),
        );
        post.category_id = Some(category.id);
        post.is_published = published;
        self.repos.posts.insert(post).await.unwrap()
    }
}

fn location<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[actix_rt::test]
async fn test_index_lists_only_public_posts() {
    let fx = Fixture::new();
    let (alice, _) = fx.user("alice", false).await;
    let news = fx.category("news", true).await;
    let hidden = fx.category("hidden", false).await;
    let visible = fx.post(&alice, &news, true).await;
    fx.post(&alice, &news, false).await;
    fx.post(&alice, &hidden, true).await;
    let app = app!(fx);

    let body: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request()).await;

    assert_eq!(body["page_obj"]["count"], 1);
    assert_eq!(body["page_obj"]["items"][0]["id"], visible.id);
    assert_eq!(body["page_obj"]["items"][0]["author_username"], "alice");
    assert_eq!(body["page_obj"]["items"][0]["comment_count"], 0);
}

#[actix_rt::test]
async fn test_index_page_parameter_is_strict() {
    let fx = Fixture::new();
    let app = app!(fx);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/?page=abc").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/?page=2").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/?page=last").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_blank_page_parameter_means_first_page() {
    let fx = Fixture::new();
    let app = app!(fx);

    let req = test::TestRequest::get().uri("/?page=").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["page_obj"]["number"], 1);
}

#[actix_rt::test]
async fn test_unpublished_category_is_not_found() {
    let fx = Fixture::new();
    fx.category("drafts", false).await;
    let app = app!(fx);

    let req = test::TestRequest::get().uri("/category/drafts/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["title"], "Not Found");
}

#[actix_rt::test]
async fn test_draft_is_visible_to_its_author_only() {
    let fx = Fixture::new();
    let (alice, alice_auth) = fx.user("alice", false).await;
    let (_, bob_auth) = fx.user("bob", false).await;
    let news = fx.category("news", true).await;
    let draft = fx.post(&alice, &news, false).await;
    let uri = format!("/posts/{}/", draft.id);
    let app = app!(fx);

    let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header((header::AUTHORIZATION, bob_auth))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header((header::AUTHORIZATION, alice_auth))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["post"]["id"], draft.id);
    assert_eq!(body["author_username"], "alice");
    assert_eq!(body["form"]["text"], "");
}

#[actix_rt::test]
async fn test_non_numeric_post_id_is_not_found() {
    let fx = Fixture::new();
    let app = app!(fx);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/posts/abc/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_anonymous_create_redirects_to_login() {
    let fx = Fixture::new();
    let app = app!(fx);

    let req = test::TestRequest::post()
        .uri("/posts/create/")
        .set_json(json!({ "title": "x" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/auth/login/?next=/posts/create/");

    let req = test::TestRequest::get().uri("/profile/edit/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), "/auth/login/?next=/profile/edit/");
}

#[actix_rt::test]
async fn test_login_redirect_keeps_query_string() {
    let fx = Fixture::new();
    let app = app!(fx);

    let req = test::TestRequest::get()
        .uri("/posts/create/?title=a%20b&x=1")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        location(&resp),
        "/auth/login/?next=/posts/create/%3Ftitle%3Da%2520b%26x%3D1"
    );
}

#[actix_rt::test]
async fn test_create_post_redirects_to_profile() {
    let fx = Fixture::new();
    let (alice, auth) = fx.user("alice", false).await;
    let news = fx.category("news", true).await;
    let app = app!(fx);

    let req = test::TestRequest::post()
        .uri("/posts/create/")
        .insert_header((header::AUTHORIZATION, auth))
        .set_json(json!({
            "title": "Spring",
            "text": "Blossoms everywhere",
            "pub_date": "2024-04-01T10:00:00Z",
            "category": news.id,
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/profile/alice/");
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["redirect"], "/profile/alice/");

    let req = test::TestRequest::get().uri("/profile/alice/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["profile"]["id"], alice.id);
    assert_eq!(body["page_obj"]["items"][0]["title"], "Spring");
    assert!(body["profile"].get("password_hash").is_none());
}

#[actix_rt::test]
async fn test_invalid_post_echoes_form() {
    let fx = Fixture::new();
    let (_, auth) = fx.user("alice", false).await;
    let app = app!(fx);

    let req = test::TestRequest::post()
        .uri("/posts/create/")
        .insert_header((header::AUTHORIZATION, auth))
        .set_json(json!({ "title": "No category", "text": "body" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["errors"]["category"].is_array());
    assert!(body["errors"]["pub_date"].is_array());
    assert_eq!(body["form"]["title"], "No category");
}

#[actix_rt::test]
async fn test_edit_by_non_author_redirects_without_change() {
    let fx = Fixture::new();
    let (alice, _) = fx.user("alice", false).await;
    let (_, bob_auth) = fx.user("bob", false).await;
    let news = fx.category("news", true).await;
    let post = fx.post(&alice, &news, true).await;
    let app = app!(fx);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/edit/", post.id))
        .insert_header((header::AUTHORIZATION, bob_auth.clone()))
        .set_json(json!({
            "title": "Hijacked",
            "text": "x",
            "pub_date": "2024-04-01T10:00:00Z",
            "category": news.id,
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), format!("/posts/{}/", post.id));

    let stored = fx.repos.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Hello");

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/edit/", post.id))
        .insert_header((header::AUTHORIZATION, bob_auth))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
}

#[actix_rt::test]
async fn test_delete_by_non_author_is_not_found() {
    let fx = Fixture::new();
    let (alice, alice_auth) = fx.user("alice", false).await;
    let (_, bob_auth) = fx.user("bob", false).await;
    let news = fx.category("news", true).await;
    let post = fx.post(&alice, &news, true).await;
    let uri = format!("/posts/{}/delete/", post.id);
    let app = app!(fx);

    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header((header::AUTHORIZATION, bob_auth))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    assert!(fx.repos.posts.find_by_id(post.id).await.unwrap().is_some());

    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header((header::AUTHORIZATION, alice_auth))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), "/");
    assert!(fx.repos.posts.find_by_id(post.id).await.unwrap().is_none());
}

#[actix_rt::test]
async fn test_comment_flow() {
    let fx = Fixture::new();
    let (alice, alice_auth) = fx.user("alice", false).await;
    let (_, bob_auth) = fx.user("bob", false).await;
    let news = fx.category("news", true).await;
    let post = fx.post(&alice, &news, true).await;
    let app = app!(fx);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/comment/", post.id))
        .insert_header((header::AUTHORIZATION, alice_auth.clone()))
        .set_json(json!({ "text": "   " }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );
    assert!(fx.repos.comments.list_for_post(post.id).await.unwrap().is_empty());

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/comment/", post.id))
        .insert_header((header::AUTHORIZATION, alice_auth))
        .set_json(json!({ "text": "Nice" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), format!("/posts/{}/", post.id));

    let comment: Comment = fx.repos.comments.list_for_post(post.id).await.unwrap()[0]
        .comment
        .clone();

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/edit_comment/{}/", post.id, comment.id))
        .insert_header((header::AUTHORIZATION, bob_auth.clone()))
        .set_json(json!({ "text": "Mine now" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/delete_comment/{}/", post.id, comment.id))
        .insert_header((header::AUTHORIZATION, bob_auth))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let stored = fx.repos.comments.find_by_id(comment.id).await.unwrap().unwrap();
    assert_eq!(stored.text, "Nice");
}

#[actix_rt::test]
async fn test_register_login_and_me() {
    let fx = Fixture::new();
    let app = app!(fx);

    let req = test::TestRequest::post()
        .uri("/auth/registration/")
        .set_json(json!({ "username": "carol", "email": "carol@example.com", "password": "s3cret-pass" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/auth/registration/")
        .set_json(json!({ "username": "carol", "email": "c2@example.com", "password": "another-pass" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["errors"]["username"].is_array());
    assert!(body["form"].get("password").is_none());

    let req = test::TestRequest::post()
        .uri("/auth/login/")
        .set_json(json!({ "username": "carol", "password": "wrong-pass" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/auth/login/")
        .set_json(json!({ "username": "carol", "password": "s3cret-pass" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["token_type"], "Bearer");
    let token = body["access_token"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/auth/me/")
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["username"], "carol");
    assert_eq!(body["display_name"], "carol");
    assert_eq!(body["is_staff"], false);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/auth/me/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_admin_requires_staff_role() {
    let fx = Fixture::new();
    let (_, user_auth) = fx.user("alice", false).await;
    let (_, staff_auth) = fx.user("root", true).await;
    let app = app!(fx);

    let form = json!({ "title": "Travel", "description": "Trips", "slug": "travel" });

    let req = test::TestRequest::post()
        .uri("/admin/categories/")
        .insert_header((header::AUTHORIZATION, user_auth))
        .set_json(&form)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri("/admin/categories/")
        .insert_header((header::AUTHORIZATION, staff_auth.clone()))
        .set_json(&form)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/admin/categories/")
        .insert_header((header::AUTHORIZATION, staff_auth.clone()))
        .set_json(&form)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = test::TestRequest::get()
        .uri("/admin/categories/")
        .insert_header((header::AUTHORIZATION, staff_auth))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));
}

#[actix_rt::test]
async fn test_seeded_admin_gets_admin_role_at_login() {
    let fx = Fixture::new();
    let config = AppConfig {
        admin: Some(AdminConfig {
            username: "root".into(),
            email: "root@example.com".into(),
            password: "admin-pass-1".into(),
        }),
        ..AppConfig::default()
    };
    fx.state.seed_admin(&config).await.unwrap();
    let app = app!(fx);

    let req = test::TestRequest::post()
        .uri("/auth/login/")
        .set_json(json!({ "username": "root", "password": "admin-pass-1" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let token = body["access_token"].as_str().unwrap().to_string();

    let claims = fx.state.token_service.validate_token(&token).unwrap();
    assert!(claims.roles.iter().any(|r| r == "admin"));

    let req = test::TestRequest::get()
        .uri("/admin/categories/")
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_admin_deletes_any_post() {
    let fx = Fixture::new();
    let (alice, _) = fx.user("alice", false).await;
    let (_, staff_auth) = fx.user("root", true).await;
    let news = fx.category("news", true).await;
    let post = fx.post(&alice, &news, true).await;
    let app = app!(fx);

    let req = test::TestRequest::post()
        .uri(&format!("/admin/posts/{}/delete/", post.id))
        .insert_header((header::AUTHORIZATION, staff_auth))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert!(fx.repos.posts.find_by_id(post.id).await.unwrap().is_none());
}

#[actix_rt::test]
async fn test_health_check() {
    let fx = Fixture::new();
    let app = app!(fx);

    let body: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/health/").to_request())
            .await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "memory");
}

#[actix_rt::test]
async fn test_malformed_json_is_a_problem_document() {
    let fx = Fixture::new();
    let (_, auth) = fx.user("alice", false).await;
    let app = app!(fx);

    let req = test::TestRequest::post()
        .uri("/posts/create/")
        .insert_header((header::AUTHORIZATION, auth))
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 400);
    assert_eq!(body["instance"], "/posts/create/");
}
