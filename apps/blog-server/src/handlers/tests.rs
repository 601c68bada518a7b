use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use chrono::NaiveDate;

use blog_core::domain::{Comment, NewComment, NewPost, NewReply, Reply};
use blog_core::ports::{BaseRepository, CommentRepository, ReplyRepository};
use blog_core::{BlogConfig, ListingVisibility};
use blog_infra::{InMemoryBlogStore, JwtConfig};
use blog_shared::dto::{CommentForm, LoginForm};

use super::configure_routes;
use crate::config::AppConfig;
use crate::render::Renderer;
use crate::state::{AppState, Repositories};

fn test_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database: None,
        blog: BlogConfig {
            page_size: 5,
            listing_visibility: ListingVisibility::ShowAll,
        },
        jwt: JwtConfig {
            secret: "test-secret".to_string(),
            expiration_hours: 1,
            issuer: "blog-test".to_string(),
        },
        login_url: "/accounts/login".to_string(),
        secure_cookies: false,
        template_dir: None,
    }
}

fn state_for(store: &Arc<InMemoryBlogStore>) -> AppState {
    AppState::new(
        Repositories::in_memory(store.clone()),
        Renderer::embedded().unwrap(),
        &test_config(),
    )
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

fn bearer(state: &AppState) -> (header::HeaderName, String) {
    let token = state.tokens.generate_token(1, "editor").unwrap();
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .configure(configure_routes),
        )
        .await
    };
}

async fn body_text(resp: actix_web::dev::ServiceResponse) -> String {
    String::from_utf8(test::read_body(resp).await.to_vec()).unwrap()
}

fn location(resp: &actix_web::dev::ServiceResponse) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[actix_web::test]
async fn test_index_lists_most_recently_updated_first() {
    let store = Arc::new(InMemoryBlogStore::new());
    store
        .insert_post(NewPost::new("Older post", "a").published().updated_on(day(1)))
        .await
        .unwrap();
    store
        .insert_post(NewPost::new("Newer post", "b").published().updated_on(day(2)))
        .await
        .unwrap();
    let state = state_for(&store);
    let app = app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_text(resp).await;
    let newer = body.find("Newer post").unwrap();
    let older = body.find("Older post").unwrap();
    assert!(newer < older);
}

#[actix_web::test]
async fn test_page_past_the_end_clamps_and_garbage_falls_back() {
    let store = Arc::new(InMemoryBlogStore::new());
    for i in 1..=7 {
        store
            .insert_post(NewPost::new(format!("Post {i}"), "body").updated_on(day(i)))
            .await
            .unwrap();
    }
    let state = state_for(&store);
    let app = app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/?page=99").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("Page 2 of 2"));
    assert!(body.contains("Post 1"));
    assert!(!body.contains("Post 7"));

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/?page=99999999999999999999")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("Page 2 of 2"));

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/?page=abc").to_request(),
    )
    .await;
    let body = body_text(resp).await;
    assert!(body.contains("Page 1 of 2"));
    assert!(body.contains("Post 7"));
}

#[actix_web::test]
async fn test_category_and_tag_listings() {
    let store = Arc::new(InMemoryBlogStore::new());
    let tech = store.insert_category("Tech", "tech").await.unwrap();
    let rust = store.insert_tag("Rust", "rust").await.unwrap();
    store
        .insert_post(NewPost::new("In tech", "x").in_category(tech.id))
        .await
        .unwrap();
    store
        .insert_post(NewPost::new("Tagged rust", "x").tagged(rust.id))
        .await
        .unwrap();
    let state = state_for(&store);
    let app = app!(state);

    let body = body_text(
        test::call_service(&app, test::TestRequest::get().uri("/category/tech").to_request())
            .await,
    )
    .await;
    assert!(body.contains("Category: Tech"));
    assert!(body.contains("In tech"));
    assert!(!body.contains("Tagged rust"));

    let body = body_text(
        test::call_service(&app, test::TestRequest::get().uri("/tag/rust").to_request()).await,
    )
    .await;
    assert!(body.contains("Tagged rust"));
    assert!(!body.contains("In tech"));

    for uri in ["/category/nope", "/tag/nope"] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[actix_web::test]
async fn test_draft_detail_requires_login() {
    let store = Arc::new(InMemoryBlogStore::new());
    let draft = store
        .insert_post(NewPost::new("Secret draft", "**wip**"))
        .await
        .unwrap();
    let state = state_for(&store);
    let app = app!(state);
    let uri = format!("/post/{}", draft.id);

    let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&uri)
            .insert_header(bearer(&state))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("Secret draft"));
    assert!(body.contains("<strong>wip</strong>"));
}

#[actix_web::test]
async fn test_search_without_matches_reports_zero() {
    let store = Arc::new(InMemoryBlogStore::new());
    store
        .insert_post(NewPost::new("Hello", "world").published())
        .await
        .unwrap();
    let state = state_for(&store);
    let app = app!(state);

    let body = body_text(
        test::call_service(
            &app,
            test::TestRequest::get().uri("/search?query=zzz").to_request(),
        )
        .await,
    )
    .await;
    assert!(body.contains("0 posts found."));
    assert!(body.contains("No posts."));

    let body = body_text(
        test::call_service(
            &app,
            test::TestRequest::get().uri("/search?query=WORLD").to_request(),
        )
        .await,
    )
    .await;
    assert!(body.contains("1 post found."));
}

#[actix_web::test]
async fn test_comment_is_stored_and_redirects_to_post() {
    let store = Arc::new(InMemoryBlogStore::new());
    store
        .insert_post_with_id(42, NewPost::new("Answer", "42").published())
        .await
        .unwrap();
    let state = state_for(&store);
    let app = app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/post/42/comment")
            .set_form(CommentForm {
                content: "Nice post".to_string(),
            })
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/post/42");

    let threads = store.threads_for_post(42).await.unwrap();
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].comment.post_id, 42);
    assert_eq!(threads[0].comment.content, "Nice post");
}

#[actix_web::test]
async fn test_blank_comment_rerenders_form_without_saving() {
    let store = Arc::new(InMemoryBlogStore::new());
    let post = store
        .insert_post(NewPost::new("Post", "body").published())
        .await
        .unwrap();
    let state = state_for(&store);
    let app = app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/post/{}/comment", post.id))
            .set_form(CommentForm {
                content: "   ".to_string(),
            })
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("This field is required."));
    assert!(store.threads_for_post(post.id).await.unwrap().is_empty());
}

#[actix_web::test]
async fn test_comment_on_missing_post_is_not_found() {
    let store = Arc::new(InMemoryBlogStore::new());
    let state = state_for(&store);
    let app = app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/post/404/comment")
            .set_form(CommentForm {
                content: "hello".to_string(),
            })
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/comment/9/reply").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_reply_redirects_to_the_comments_post() {
    let store = Arc::new(InMemoryBlogStore::new());
    let post = store.insert_post(NewPost::new("Post", "body")).await.unwrap();
    let comment = CommentRepository::create(&*store, NewComment::new(post.id, "first".into()))
        .await
        .unwrap();
    let state = state_for(&store);
    let app = app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/comment/{}/reply", comment.id))
            .set_form(CommentForm {
                content: "agreed".to_string(),
            })
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), format!("/post/{}", post.id));

    let threads = store.threads_for_post(post.id).await.unwrap();
    assert_eq!(threads[0].replies.len(), 1);
    assert_eq!(threads[0].replies[0].content, "agreed");
}

#[actix_web::test]
async fn test_deleting_comment_removes_its_replies() {
    let store = Arc::new(InMemoryBlogStore::new());
    let post = store.insert_post(NewPost::new("Post", "body")).await.unwrap();
    let comment = CommentRepository::create(&*store, NewComment::new(post.id, "first".into()))
        .await
        .unwrap();
    let reply = ReplyRepository::create(&*store, NewReply::new(comment.id, "second".into()))
        .await
        .unwrap();
    let state = state_for(&store);
    let app = app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/comment/{}/delete", comment.id))
            .insert_header(bearer(&state))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("Delete comment?"));

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/comment/{}/delete", comment.id))
            .insert_header(bearer(&state))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), format!("/post/{}", post.id));

    let found = BaseRepository::<Comment, i64>::find_by_id(&*store, comment.id)
        .await
        .unwrap();
    assert!(found.is_none());
    let found = BaseRepository::<Reply, i64>::find_by_id(&*store, reply.id)
        .await
        .unwrap();
    assert!(found.is_none());
}

#[actix_web::test]
async fn test_deleting_reply_keeps_comment() {
    let store = Arc::new(InMemoryBlogStore::new());
    let post = store.insert_post(NewPost::new("Post", "body")).await.unwrap();
    let comment = CommentRepository::create(&*store, NewComment::new(post.id, "first".into()))
        .await
        .unwrap();
    let reply = ReplyRepository::create(&*store, NewReply::new(comment.id, "second".into()))
        .await
        .unwrap();
    let state = state_for(&store);
    let app = app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/reply/{}/delete", reply.id))
            .insert_header(bearer(&state))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), format!("/post/{}", post.id));

    let threads = store.threads_for_post(post.id).await.unwrap();
    assert_eq!(threads.len(), 1);
    assert!(threads[0].replies.is_empty());
}

#[actix_web::test]
async fn test_anonymous_delete_redirects_to_login() {
    let store = Arc::new(InMemoryBlogStore::new());
    let post = store.insert_post(NewPost::new("Post", "body")).await.unwrap();
    let comment = CommentRepository::create(&*store, NewComment::new(post.id, "keep me".into()))
        .await
        .unwrap();
    let state = state_for(&store);
    let app = app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/comment/{}/delete", comment.id))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        location(&resp),
        format!("/accounts/login?next=%2Fcomment%2F{}%2Fdelete", comment.id)
    );

    let found = BaseRepository::<Comment, i64>::find_by_id(&*store, comment.id)
        .await
        .unwrap();
    assert!(found.is_some());
}

#[actix_web::test]
async fn test_login_sets_cookie_that_authenticates() {
    let store = Arc::new(InMemoryBlogStore::new());
    let draft = store.insert_post(NewPost::new("Draft", "body")).await.unwrap();
    let state = state_for(&store);
    state
        .accounts
        .register("editor", "correct horse")
        .await
        .unwrap();
    let app = app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/accounts/login")
            .set_form(LoginForm {
                username: "editor".to_string(),
                password: "wrong password".to_string(),
                next: None,
            })
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.response().cookies().next().is_none());

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/accounts/login")
            .set_form(LoginForm {
                username: "editor".to_string(),
                password: "correct horse".to_string(),
                next: Some(format!("/post/{}", draft.id)),
            })
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), format!("/post/{}", draft.id));

    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == "access_token")
        .unwrap()
        .into_owned();
    assert_eq!(cookie.http_only(), Some(true));

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/post/{}", draft.id))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_session_cookie_survives_other_authorization_schemes() {
    let store = Arc::new(InMemoryBlogStore::new());
    let draft = store.insert_post(NewPost::new("Draft", "body")).await.unwrap();
    let state = state_for(&store);
    let token = state.tokens.generate_token(1, "editor").unwrap();
    let app = app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/post/{}", draft.id))
            .insert_header((header::AUTHORIZATION, "Basic dXNlcjpwYXNz"))
            .cookie(Cookie::new("access_token", token))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_login_ignores_offsite_next() {
    let store = Arc::new(InMemoryBlogStore::new());
    let state = state_for(&store);
    state
        .accounts
        .register("editor", "correct horse")
        .await
        .unwrap();
    let app = app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/accounts/login")
            .set_form(LoginForm {
                username: "editor".to_string(),
                password: "correct horse".to_string(),
                next: Some("//evil.example".to_string()),
            })
            .to_request(),
    )
    .await;
    assert_eq!(location(&resp), "/");
}

#[actix_web::test]
async fn test_health_check() {
    let store = Arc::new(InMemoryBlogStore::new());
    let state = state_for(&store);
    let app = app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
}
