use askama::Template;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Form, Router};
use serde::Deserialize;

use crate::auth::flash;
use crate::db::models::Question;
use crate::db::{posts, questions};
use crate::drafts::AnswerDraft;
use crate::error::{AppError, AppResult};
use crate::extractors::{CurrentUser, Flash};
use crate::routes::home::{Html, Layout};
use crate::state::AppState;

const ANSWER_LIST_LIMIT: i64 = 5;

#[derive(Template)]
#[template(path = "pages/ask.html")]
pub struct AskTemplate {
    pub layout: Layout,
    pub question: String,
}

#[derive(Template)]
#[template(path = "pages/answer.html")]
pub struct AnswerTemplate {
    pub layout: Layout,
    pub questions: Vec<Question>,
}

#[derive(Template)]
#[template(path = "pages/new_post.html")]
pub struct NewPostTemplate {
    pub layout: Layout,
    pub draft: String,
    pub question: String,
    pub answer: String,
}

#[derive(Deserialize)]
pub struct AskForm {
    #[serde(default)]
    pub question: String,
}

/// Question selection, from a link (`?q_id=`) or the radio list on `/answer`.
#[derive(Deserialize)]
pub struct QuestionChoice {
    pub q_id: Option<String>,
}

/// Missing fields read as empty: no draft goes home, no answer redisplays.
#[derive(Deserialize)]
pub struct NewPostForm {
    #[serde(default)]
    pub draft: String,
    #[serde(default)]
    pub answer: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ask", get(ask_page).post(ask))
        .route("/answer", get(answer_page).post(choose_question))
        .route("/new-post", get(new_post_page).post(new_post))
}

fn parse_question_id(choice: &QuestionChoice) -> Option<i64> {
    choice.q_id.as_deref()?.trim().parse().ok()
}

/// GET /ask
pub async fn ask_page(user: CurrentUser, flash: Flash) -> Response {
    Html(AskTemplate {
        layout: Layout::new(&user, flash),
        question: String::new(),
    })
    .into_response()
}

/// POST /ask — publish a question. Empty text redisplays the form.
pub async fn ask(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(form): Form<AskForm>,
) -> AppResult<Response> {
    let text = form.question.trim();
    if text.is_empty() {
        return Ok(Html(AskTemplate {
            layout: Layout::with_flash(&user, "Your question can't be empty"),
            question: String::new(),
        })
        .into_response());
    }

    let conn = state.db.get()?;
    let question_id = questions::insert(&conn, user.id, &user.name, text)?;
    tracing::info!(user_id = user.id, question_id, "Question asked");

    flash::redirect_with_flash(
        &conn,
        &state.config.auth,
        Some(&user.token),
        "Your question has been posted",
        "/profile",
    )
}

/// GET /answer — a handful of questions to pick from, unanswered first.
pub async fn answer_page(
    State(state): State<AppState>,
    user: CurrentUser,
    flash: Flash,
) -> AppResult<Response> {
    let conn = state.db.get()?;
    let questions = questions::to_answer(&conn, ANSWER_LIST_LIMIT)?;

    Ok(Html(AnswerTemplate {
        layout: Layout::new(&user, flash),
        questions,
    })
    .into_response())
}

/// POST /answer — the radio-button selection; forwards to the answer form.
pub async fn choose_question(
    _user: CurrentUser,
    Form(choice): Form<QuestionChoice>,
) -> Redirect {
    match parse_question_id(&choice) {
        Some(id) => Redirect::to(&format!("/new-post?q_id={}", id)),
        None => Redirect::to("/answer"),
    }
}

/// GET /new-post?q_id= — open an answer draft for the chosen question.
pub async fn new_post_page(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(choice): Query<QuestionChoice>,
) -> AppResult<Response> {
    let Some(question_id) = parse_question_id(&choice) else {
        return Ok(Redirect::to("/").into_response());
    };

    let question = {
        let conn = state.db.get()?;
        questions::find(&conn, question_id)?
    };
    let Some(question) = question else {
        return Ok(Redirect::to("/").into_response());
    };

    let token = state.drafts.lock().await.insert(AnswerDraft {
        user_id: user.id,
        question_id: question.id,
        question: question.question.clone(),
    });
    let flash = {
        let conn = state.db.get()?;
        Flash::take(&conn, &user.token)?
    };

    Ok(Html(NewPostTemplate {
        layout: Layout::new(&user, flash),
        draft: token,
        question: question.question,
        answer: String::new(),
    })
    .into_response())
}

/// POST /new-post — publish the answer for the pending draft.
///
/// Without a live draft nothing is written and the user goes home. On any
/// failure the draft stays pending and the form comes back with a message.
pub async fn new_post(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(form): Form<NewPostForm>,
) -> AppResult<Response> {
    let draft = state.drafts.lock().await.get(&form.draft, user.id);
    let Some(draft) = draft else {
        tracing::info!(user_id = user.id, "Answer submitted without a pending question");
        return Ok(Redirect::to("/").into_response());
    };

    let answer = form.answer.trim();
    let retry = |message: &str| {
        Html(NewPostTemplate {
            layout: Layout::with_flash(&user, message),
            draft: form.draft.clone(),
            question: draft.question.clone(),
            answer: answer.to_string(),
        })
        .into_response()
    };

    if answer.is_empty() {
        return Ok(retry("Your answer can't be empty"));
    }

    let published = state
        .db
        .get()
        .map_err(AppError::from)
        .and_then(|mut conn| {
            posts::create(&mut conn, user.id, draft.question_id, answer).map_err(AppError::from)
        });

    let post_id = match published {
        Ok(post_id) => post_id,
        Err(e) => {
            tracing::error!(
                user_id = user.id,
                question_id = draft.question_id,
                "Failed to publish answer: {}",
                e
            );
            return Ok(retry("Your answer could not be posted, please try again"));
        }
    };

    state.drafts.lock().await.remove(&form.draft);
    tracing::info!(user_id = user.id, post_id, "Answer posted");

    let conn = state.db.get()?;
    flash::redirect_with_flash(
        &conn,
        &state.config.auth,
        Some(&user.token),
        "Your answer has been posted",
        "/",
    )
}
