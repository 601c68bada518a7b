//! Comment and reply handlers: creation forms and authenticated deletion.

use actix_web::{HttpRequest, HttpResponse, web};
use blog_core::domain::{Comment, CommentDraft, Post};
use blog_core::error::DomainError;
use blog_shared::dto::CommentForm;

use super::{base_context, html, login_or, post_url, see_other};
use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /post/{post_id}/comment
pub async fn comment_form(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    post_id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let post = state.comments.comment_target(*post_id).await?;
    render_form(&state, &identity, &post, None, "", &[])
}

/// POST /post/{post_id}/comment
pub async fn create_comment(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    post_id: web::Path<i64>,
    form: web::Form<CommentForm>,
) -> AppResult<HttpResponse> {
    let draft = CommentDraft::new(form.into_inner().content);

    match state.comments.create_comment(*post_id, &draft).await {
        Ok(comment) => Ok(see_other(&post_url(comment.post_id))),
        Err(DomainError::Validation(errors)) => {
            let post = state.comments.comment_target(*post_id).await?;
            render_form(
                &state,
                &identity,
                &post,
                None,
                &draft.content,
                errors.field("content"),
            )
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /comment/{comment_id}/reply
pub async fn reply_form(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    comment_id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let comment = state.comments.reply_target(*comment_id).await?;
    let post = state.comments.comment_target(comment.post_id).await?;
    render_form(&state, &identity, &post, Some(&comment), "", &[])
}

/// POST /comment/{comment_id}/reply
pub async fn create_reply(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    comment_id: web::Path<i64>,
    form: web::Form<CommentForm>,
) -> AppResult<HttpResponse> {
    let draft = CommentDraft::new(form.into_inner().content);

    match state.comments.create_reply(*comment_id, &draft).await {
        Ok(posted) => Ok(see_other(&post_url(posted.post_id))),
        Err(DomainError::Validation(errors)) => {
            let comment = state.comments.reply_target(*comment_id).await?;
            let post = state.comments.comment_target(comment.post_id).await?;
            render_form(
                &state,
                &identity,
                &post,
                Some(&comment),
                &draft.content,
                errors.field("content"),
            )
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /comment/{id}/delete
pub async fn confirm_comment_delete(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let comment = state
        .comments
        .comment_for_deletion(identity.viewer(), *id)
        .await
        .map_err(login_or(&state, &req))?;

    let mut context = base_context(&identity);
    context.insert("entity", "comment");
    context.insert("content", &comment.content);
    context.insert("form_action", &format!("/comment/{}/delete", comment.id));
    context.insert("cancel_url", &post_url(comment.post_id));
    html(&state, "confirm_delete.html", &context)
}

/// POST /comment/{id}/delete
pub async fn delete_comment(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let post_id = state
        .comments
        .delete_comment(identity.viewer(), *id)
        .await
        .map_err(login_or(&state, &req))?;

    Ok(see_other(&post_url(post_id)))
}

/// GET /reply/{id}/delete
pub async fn confirm_reply_delete(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let reply = state
        .comments
        .reply_for_deletion(identity.viewer(), *id)
        .await
        .map_err(login_or(&state, &req))?;
    let comment = state.comments.reply_target(reply.comment_id).await?;

    let mut context = base_context(&identity);
    context.insert("entity", "reply");
    context.insert("content", &reply.content);
    context.insert("form_action", &format!("/reply/{}/delete", reply.id));
    context.insert("cancel_url", &post_url(comment.post_id));
    html(&state, "confirm_delete.html", &context)
}

/// POST /reply/{id}/delete
pub async fn delete_reply(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let post_id = state
        .comments
        .delete_reply(identity.viewer(), *id)
        .await
        .map_err(login_or(&state, &req))?;

    Ok(see_other(&post_url(post_id)))
}

fn render_form(
    state: &AppState,
    identity: &OptionalIdentity,
    post: &Post,
    comment: Option<&Comment>,
    content: &str,
    errors: &[String],
) -> AppResult<HttpResponse> {
    let form_action = match comment {
        Some(comment) => format!("/comment/{}/reply", comment.id),
        None => format!("/post/{}/comment", post.id),
    };

    let mut context = base_context(identity);
    context.insert("post", post);
    context.insert("comment", &comment);
    context.insert("form_action", &form_action);
    context.insert("content", content);
    context.insert("errors", errors);
    html(state, "comment_form.html", &context)
}
