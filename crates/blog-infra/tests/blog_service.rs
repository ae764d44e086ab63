//! Use-case behaviour of `BlogService` over the in-memory store.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use blog_core::domain::{Category, Comment, Location, Post, User};
use blog_core::forms::{CategoryForm, CommentForm, LocationForm, PostForm, ProfileForm, RegistrationForm};
use blog_core::ports::{BaseRepository, CommentRepository, Repositories};
use blog_core::service::Outcome;
use blog_core::{BlogService, DomainError, Redirect, Requester};
use blog_infra::{Argon2PasswordService, InMemoryStore};

struct Harness {
    repos: Repositories,
    blog: BlogService,
}

impl Harness {
    fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            repos: store.repositories(),
            blog: BlogService::new(store.repositories()),
        }
    }

    async fn user(&self, username: &str) -> User {
        let user = User::new(username.into(), format!("{username}@example.com"), "hash".into());
        self.repos.users.insert(user).await.unwrap()
    }

    async fn category(&self, slug: &str, published: bool) -> Category {
        let mut category = Category::new(slug.into(), "Description".into(), slug.into());
        category.is_published = published;
        self.repos.categories.insert(category).await.unwrap()
    }

    async fn post_at(
        &self,
        author: &User,
        category: Option<&Category>,
        published: bool,
        pub_date: DateTime<Utc>,
    ) -> Post {
        let mut post = Post::new(author.id, "Title".into(), "Text".into(), pub_date);
        post.category_id = category.map(|c| c.id);
        post.is_published = published;
        self.repos.posts.insert(post).await.unwrap()
    }

    async fn post(&self, author: &User, category: &Category) -> Post {
        self.post_at(author, Some(category), true, Utc::now() - Duration::days(1))
            .await
    }

    async fn comment(&self, author: &User, post: &Post, text: &str) -> Comment {
        self.repos
            .comments
            .insert(Comment::new(post.id, author.id, text.into()))
            .await
            .unwrap()
    }
}

fn post_form(category: &Category, title: &str) -> PostForm {
    PostForm {
        title: title.into(),
        text: "Body".into(),
        pub_date: Some("2024-05-01T12:00:00Z".into()),
        category: Some(category.id),
        ..PostForm::default()
    }
}

fn ids<T>(items: &[T], id: impl Fn(&T) -> i64) -> Vec<i64> {
    items.iter().map(id).collect()
}

#[tokio::test]
async fn test_index_holds_exactly_public_posts() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    let open = h.category("open", true).await;
    let closed = h.category("closed", false).await;
    let past = Utc::now() - Duration::hours(2);
    let future = Utc::now() + Duration::days(3);

    let public = h.post_at(&alice, Some(&open), true, past).await;
    h.post_at(&alice, Some(&open), false, past).await;
    h.post_at(&alice, Some(&open), true, future).await;
    h.post_at(&alice, Some(&closed), true, past).await;
    h.post_at(&alice, None, true, past).await;

    let page = h.blog.index(None).await.unwrap().page_obj;
    assert_eq!(page.count, 1);
    assert_eq!(ids(&page.items, |s| s.post.id), vec![public.id]);
}

#[tokio::test]
async fn test_index_is_newest_first() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    let open = h.category("open", true).await;
    let now = Utc::now();

    let older = h.post_at(&alice, Some(&open), true, now - Duration::days(2)).await;
    let newer = h.post_at(&alice, Some(&open), true, now - Duration::days(1)).await;

    let page = h.blog.index(None).await.unwrap().page_obj;
    assert_eq!(ids(&page.items, |s| s.post.id), vec![newer.id, older.id]);
}

#[tokio::test]
async fn test_listing_annotates_comment_count() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    let bob = h.user("bob").await;
    let open = h.category("open", true).await;
    let post = h.post(&alice, &open).await;
    h.comment(&bob, &post, "one").await;
    h.comment(&alice, &post, "two").await;

    let page = h.blog.index(None).await.unwrap().page_obj;
    assert_eq!(page.items[0].comment_count, 2);
    assert_eq!(page.items[0].author_username, "alice");
}

#[tokio::test]
async fn test_strict_pagination_on_listings() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    let open = h.category("open", true).await;
    for _ in 0..11 {
        h.post(&alice, &open).await;
    }

    let first = h.blog.index(None).await.unwrap().page_obj;
    assert_eq!(first.items.len(), 10);
    assert_eq!(first.num_pages, 2);
    assert!(first.has_next);
    assert!(!first.has_previous);

    let last = h.blog.index(Some("last")).await.unwrap().page_obj;
    assert_eq!(last.number, 2);
    assert_eq!(last.items.len(), 1);

    for bad in ["3", "0", "abc"] {
        let err = h.blog.index(Some(bad)).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }), "page {bad}");
    }

    let err = h.blog.category_posts("open", Some("9")).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn test_empty_index_has_one_page() {
    let h = Harness::new();
    let page = h.blog.index(Some("1")).await.unwrap().page_obj;
    assert_eq!(page.count, 0);
    assert_eq!(page.num_pages, 1);
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn test_category_listing() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    let travel = h.category("travel", true).await;
    let food = h.category("food", true).await;
    let trip = h.post(&alice, &travel).await;
    h.post(&alice, &food).await;

    let context = h.blog.category_posts("travel", None).await.unwrap();
    assert_eq!(context.category.id, travel.id);
    assert_eq!(ids(&context.page_obj.items, |s| s.post.id), vec![trip.id]);
}

#[tokio::test]
async fn test_unpublished_category_is_not_found() {
    let h = Harness::new();
    h.category("hidden", false).await;

    let err = h.blog.category_posts("hidden", None).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { entity_type: "Category" }));

    let err = h.blog.category_posts("missing", None).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn test_detail_of_draft() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    let bob = h.user("bob").await;
    let open = h.category("open", true).await;
    let draft = h
        .post_at(&alice, Some(&open), false, Utc::now() - Duration::hours(1))
        .await;
    let first = h.comment(&bob, &draft, "first").await;
    let second = h.comment(&alice, &draft, "second").await;

    let err = h.blog.post_detail(draft.id, None).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));

    let err = h
        .blog
        .post_detail(draft.id, Some(&Requester::user(bob.id)))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));

    let context = h
        .blog
        .post_detail(draft.id, Some(&Requester::user(alice.id)))
        .await
        .unwrap();
    assert_eq!(context.post.id, draft.id);
    assert_eq!(context.category.map(|c| c.id), Some(open.id));
    assert_eq!(
        ids(&context.comments, |c| c.comment.id),
        vec![first.id, second.id]
    );
    assert_eq!(context.comments[0].author_username, "bob");
    assert!(context.form.text.is_empty());
}

#[tokio::test]
async fn test_scheduled_post_is_hidden_from_others() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    let open = h.category("open", true).await;
    let scheduled = h
        .post_at(&alice, Some(&open), true, Utc::now() + Duration::days(1))
        .await;

    assert!(h.blog.post_detail(scheduled.id, None).await.is_err());
    assert!(
        h.blog
            .post_detail(scheduled.id, Some(&Requester::user(alice.id)))
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_create_post() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    let open = h.category("open", true).await;

    let to = h
        .blog
        .create_post(&Requester::user(alice.id), &post_form(&open, "Fresh"))
        .await
        .unwrap();
    assert_eq!(to, Redirect::to("/profile/alice/"));

    let profile = h.blog.profile("alice", None).await.unwrap();
    assert_eq!(profile.page_obj.count, 1);
    assert_eq!(profile.page_obj.items[0].post.title, "Fresh");
    assert_eq!(profile.page_obj.items[0].post.author_id, alice.id);
}

#[tokio::test]
async fn test_create_post_rejects_unknown_choices() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    let open = h.category("open", true).await;

    let mut form = post_form(&open, "Fresh");
    form.category = Some(open.id + 100);
    form.location = Some(42);

    let err = h
        .blog
        .create_post(&Requester::user(alice.id), &form)
        .await
        .unwrap_err();
    let DomainError::Validation(errors) = err else {
        panic!("expected validation error, got {err:?}");
    };
    assert!(errors.has_field("category"));
    assert!(errors.has_field("location"));
    assert_eq!(h.blog.profile("alice", None).await.unwrap().page_obj.count, 0);
}

#[tokio::test]
async fn test_post_form_contexts() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    let open = h.category("open", true).await;
    h.category("closed", false).await;
    let loc = h
        .repos
        .locations
        .insert(Location::new("Kazan".into()))
        .await
        .unwrap();
    let post = h.post(&alice, &open).await;
    let requester = Requester::user(alice.id);

    let blank = h.blog.new_post_form(&requester).await.unwrap();
    assert_eq!(blank.post_id, None);
    assert_eq!(blank.categories.len(), 2);
    assert_eq!(ids(&blank.locations, |l| l.id), vec![loc.id]);

    let Outcome::Render(bound) = h.blog.edit_post_form(&requester, post.id).await.unwrap() else {
        panic!("author should get the form");
    };
    assert_eq!(bound.post_id, Some(post.id));
    assert_eq!(bound.form.category, Some(open.id));

    let confirm = h.blog.delete_post_form(&requester, post.id).await.unwrap();
    assert_eq!(confirm.post.id, post.id);
    assert_eq!(confirm.form.title, post.title);
}

#[tokio::test]
async fn test_edit_by_non_author_changes_nothing() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    let bob = h.user("bob").await;
    let open = h.category("open", true).await;
    let post = h.post(&alice, &open).await;
    let intruder = Requester::user(bob.id);

    let outcome = h.blog.edit_post_form(&intruder, post.id).await.unwrap();
    let Outcome::Redirect(to) = outcome else {
        panic!("non-author should be redirected");
    };
    assert_eq!(to, Redirect::to(format!("/posts/{}/", post.id)));

    let to = h
        .blog
        .update_post(&intruder, post.id, &post_form(&open, "Hijacked"))
        .await
        .unwrap();
    assert_eq!(to, Redirect::to(format!("/posts/{}/", post.id)));

    let stored = h.repos.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored, post);

    let err = h
        .blog
        .update_post(&intruder, post.id + 99, &post_form(&open, "x"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn test_author_updates_post() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    let open = h.category("open", true).await;
    let post = h.post(&alice, &open).await;

    let to = h
        .blog
        .update_post(&Requester::user(alice.id), post.id, &post_form(&open, "Edited"))
        .await
        .unwrap();
    assert_eq!(to, Redirect::to(format!("/posts/{}/", post.id)));

    let stored = h.repos.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Edited");
    assert_eq!(stored.author_id, alice.id);
}

#[tokio::test]
async fn test_delete_post() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    let bob = h.user("bob").await;
    let open = h.category("open", true).await;
    let post = h.post(&alice, &open).await;
    let comment = h.comment(&bob, &post, "hi").await;

    let err = h
        .blog
        .delete_post(&Requester::user(bob.id), post.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
    assert!(h.blog.delete_post_form(&Requester::user(bob.id), post.id).await.is_err());

    let to = h
        .blog
        .delete_post(&Requester::user(alice.id), post.id)
        .await
        .unwrap();
    assert_eq!(to, Redirect::to("/"));
    assert!(h.repos.posts.find_by_id(post.id).await.unwrap().is_none());
    assert!(h.repos.comments.find_by_id(comment.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_empty_comment_is_rejected() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    let open = h.category("open", true).await;
    let post = h.post(&alice, &open).await;

    let form = CommentForm { text: "  \n ".into() };
    let err = h
        .blog
        .add_comment(&Requester::user(alice.id), post.id, &form)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(ref e) if e.has_field("text")));
    assert!(h.repos.comments.list_for_post(post.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_comment_on_missing_post() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    let form = CommentForm { text: "hello".into() };

    let err = h
        .blog
        .add_comment(&Requester::user(alice.id), 404, &form)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { entity_type: "Post" }));
}

#[tokio::test]
async fn test_comment_lifecycle() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    let bob = h.user("bob").await;
    let open = h.category("open", true).await;
    let post = h.post(&alice, &open).await;
    let as_bob = Requester::user(bob.id);

    let to = h
        .blog
        .add_comment(&as_bob, post.id, &CommentForm { text: " Great ".into() })
        .await
        .unwrap();
    assert_eq!(to, Redirect::to(format!("/posts/{}/", post.id)));
    let comment = h.repos.comments.list_for_post(post.id).await.unwrap()[0]
        .comment
        .clone();
    assert_eq!(comment.text, "Great");
    assert_eq!(comment.author_id, bob.id);

    let context = h.blog.edit_comment_form(&as_bob, comment.id).await.unwrap();
    assert_eq!(context.form.text, "Great");

    h.blog
        .update_comment(&as_bob, comment.id, &CommentForm { text: "Greater".into() })
        .await
        .unwrap();
    let stored = h.repos.comments.find_by_id(comment.id).await.unwrap().unwrap();
    assert_eq!(stored.text, "Greater");
    assert_eq!(stored.created_at, comment.created_at);

    let confirm = h.blog.delete_comment_form(&as_bob, comment.id).await.unwrap();
    assert_eq!(confirm.comment.id, comment.id);

    let to = h.blog.delete_comment(&as_bob, comment.id).await.unwrap();
    assert_eq!(to, Redirect::to(format!("/posts/{}/", post.id)));
    assert!(h.repos.comments.find_by_id(comment.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_foreign_comment_is_not_found() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    let bob = h.user("bob").await;
    let open = h.category("open", true).await;
    let post = h.post(&alice, &open).await;
    let comment = h.comment(&bob, &post, "bob's").await;
    let as_alice = Requester::user(alice.id);

    let form = CommentForm { text: "alice's".into() };
    for err in [
        h.blog.edit_comment_form(&as_alice, comment.id).await.unwrap_err(),
        h.blog.update_comment(&as_alice, comment.id, &form).await.unwrap_err(),
        h.blog.delete_comment_form(&as_alice, comment.id).await.unwrap_err(),
        h.blog.delete_comment(&as_alice, comment.id).await.unwrap_err(),
    ] {
        assert!(matches!(err, DomainError::NotFound { entity_type: "Comment" }));
    }

    let stored = h.repos.comments.find_by_id(comment.id).await.unwrap().unwrap();
    assert_eq!(stored.text, "bob's");
}

#[tokio::test]
async fn test_profile_lists_every_post_of_the_author() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    let bob = h.user("bob").await;
    let closed = h.category("closed", false).await;
    let now = Utc::now();

    h.post_at(&alice, Some(&closed), false, now + Duration::days(5)).await;
    h.post_at(&alice, None, true, now - Duration::days(1)).await;
    h.post_at(&bob, Some(&closed), true, now).await;

    let context = h.blog.profile("alice", None).await.unwrap();
    assert_eq!(context.profile.id, alice.id);
    assert_eq!(context.page_obj.count, 2);
    assert!(context.page_obj.items.iter().all(|s| s.post.author_id == alice.id));

    let err = h.blog.profile("nobody", None).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { entity_type: "User" }));
}

#[tokio::test]
async fn test_profile_pagination_is_lenient() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    let open = h.category("open", true).await;
    for _ in 0..12 {
        h.post(&alice, &open).await;
    }

    let page = h.blog.profile("alice", Some("abc")).await.unwrap().page_obj;
    assert_eq!(page.number, 1);

    let page = h.blog.profile("alice", Some("99")).await.unwrap().page_obj;
    assert_eq!(page.number, 2);
    assert_eq!(page.items.len(), 2);
}

#[tokio::test]
async fn test_update_profile() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    h.user("bob").await;
    let requester = Requester::user(alice.id);

    let form = h.blog.edit_profile_form(&requester).await.unwrap().form;
    assert_eq!(form.username, "alice");

    let taken = ProfileForm {
        username: "bob".into(),
        ..form.clone()
    };
    let err = h.blog.update_profile(&requester, &taken).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation(ref e) if e.has_field("username")));

    let renamed = ProfileForm {
        username: "alicia".into(),
        first_name: "Alice".into(),
        last_name: "Liddell".into(),
        ..form
    };
    let to = h.blog.update_profile(&requester, &renamed).await.unwrap();
    assert_eq!(to, Redirect::to("/"));

    let stored = h.repos.users.find_by_id(alice.id).await.unwrap().unwrap();
    assert_eq!(stored.username, "alicia");
    assert_eq!(stored.first_name, "Alice");
    assert_eq!(stored.password_hash, alice.password_hash);
}

#[tokio::test]
async fn test_register_and_authenticate() {
    let h = Harness::new();
    let passwords = Argon2PasswordService::new();
    let form = RegistrationForm {
        username: "dora".into(),
        email: "dora@example.com".into(),
        password: "correct horse".into(),
    };

    let user = h.blog.register(&form, &passwords).await.unwrap();
    assert_ne!(user.password_hash, "correct horse");
    assert!(!user.is_staff);

    let err = h.blog.register(&form, &passwords).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation(ref e) if e.has_field("username")));

    let found = h
        .blog
        .authenticate("dora", "correct horse", &passwords)
        .await
        .unwrap();
    assert_eq!(found.id, user.id);

    for (username, password) in [("dora", "wrong horse"), ("nobody", "correct horse")] {
        let err = h
            .blog
            .authenticate(username, password, &passwords)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized));
    }
}

#[tokio::test]
async fn test_short_password_is_rejected() {
    let h = Harness::new();
    let form = RegistrationForm {
        username: "eve".into(),
        email: "eve@example.com".into(),
        password: "short".into(),
    };

    let err = h
        .blog
        .register(&form, &Argon2PasswordService::new())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(ref e) if e.has_field("password")));
}

#[tokio::test]
async fn test_ensure_staff_creates_then_promotes() {
    let h = Harness::new();
    let passwords = Argon2PasswordService::new();
    let form = RegistrationForm {
        username: "root".into(),
        email: "root@example.com".into(),
        password: "admin-pass-1".into(),
    };

    let admin = h.blog.ensure_staff(&form, &passwords).await.unwrap();
    assert!(admin.is_staff);
    let found = h
        .blog
        .authenticate("root", "admin-pass-1", &passwords)
        .await
        .unwrap();
    assert_eq!(found.id, admin.id);

    let again = h.blog.ensure_staff(&form, &passwords).await.unwrap();
    assert_eq!(again.id, admin.id);

    let alice = h.user("alice").await;
    let promoted = h
        .blog
        .ensure_staff(
            &RegistrationForm {
                username: "alice".into(),
                email: "alice@example.com".into(),
                password: "ignored-pass".into(),
            },
            &passwords,
        )
        .await
        .unwrap();
    assert_eq!(promoted.id, alice.id);
    let stored = h.repos.users.find_by_id(alice.id).await.unwrap().unwrap();
    assert!(stored.is_staff);
    assert_eq!(stored.password_hash, alice.password_hash);

    let err = h
        .blog
        .ensure_staff(
            &RegistrationForm {
                username: "ops".into(),
                email: String::new(),
                password: "admin-pass-1".into(),
            },
            &passwords,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(ref e) if e.has_field("email")));
}

#[tokio::test]
async fn test_admin_requires_staff() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    let open = h.category("open", true).await;
    let post = h.post(&alice, &open).await;
    let requester = Requester::user(alice.id);

    assert!(matches!(
        h.blog.admin_categories(&requester).await,
        Err(DomainError::Forbidden)
    ));
    assert!(matches!(
        h.blog.admin_locations(&requester).await,
        Err(DomainError::Forbidden)
    ));
    assert!(matches!(
        h.blog.admin_delete_post(&requester, post.id).await,
        Err(DomainError::Forbidden)
    ));
    assert!(h.repos.posts.find_by_id(post.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_admin_manages_reference_data() {
    let h = Harness::new();
    let root = h.user("root").await;
    let staff = Requester::staff(root.id);

    let form = CategoryForm {
        title: "Travel".into(),
        description: "Trips".into(),
        slug: "travel".into(),
        is_published: false,
    };
    let travel = h.blog.admin_create_category(&staff, &form).await.unwrap();
    assert!(!travel.is_published);

    let err = h.blog.admin_create_category(&staff, &form).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation(ref e) if e.has_field("slug")));

    let publish = CategoryForm {
        is_published: true,
        ..form
    };
    let travel = h
        .blog
        .admin_update_category(&staff, travel.id, &publish)
        .await
        .unwrap();
    assert!(travel.is_published);
    assert!(h.blog.category_posts("travel", None).await.is_ok());

    let kazan = h
        .blog
        .admin_create_location(
            &staff,
            &LocationForm {
                name: "Kazan".into(),
                is_published: true,
            },
        )
        .await
        .unwrap();
    let renamed = h
        .blog
        .admin_update_location(
            &staff,
            kazan.id,
            &LocationForm {
                name: "Kazan, Tatarstan".into(),
                is_published: true,
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Kazan, Tatarstan");
    assert_eq!(h.blog.admin_locations(&staff).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_admin_deletes_any_post() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    let root = h.user("root").await;
    let open = h.category("open", true).await;
    let post = h.post(&alice, &open).await;
    let staff = Requester::staff(root.id);

    h.blog.admin_delete_post(&staff, post.id).await.unwrap();
    assert!(h.repos.posts.find_by_id(post.id).await.unwrap().is_none());

    let err = h.blog.admin_delete_post(&staff, post.id).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { entity_type: "Post" }));
}

#[tokio::test]
async fn test_removed_category_hides_its_posts() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    let open = h.category("open", true).await;
    let post = h.post(&alice, &open).await;

    h.repos.categories.delete(open.id).await.unwrap();

    let stored = h.repos.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.category_id, None);
    assert_eq!(h.blog.index(None).await.unwrap().page_obj.count, 0);
    assert!(
        h.blog
            .post_detail(post.id, Some(&Requester::user(alice.id)))
            .await
            .is_ok()
    );
}
