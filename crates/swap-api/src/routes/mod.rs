//! Route handlers for the SkillSwap API.

pub mod credits;
pub mod feedback;
pub mod groups;
pub mod health;
pub mod matching;
pub mod messages;
pub mod profiles;

use axum::routing::{get, post, put};
use axum::Router;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health))
        // Profiles and search
        .route(
            "/api/profiles/me",
            put(profiles::save_me).delete(profiles::close_account),
        )
        .route("/api/profiles/me/photo", put(profiles::set_photo))
        .route("/api/profiles/:id", get(profiles::get_profile))
        .route("/api/search", get(profiles::search))
        // Matching
        .route("/api/deck", get(matching::deck))
        .route("/api/swipes", post(matching::swipe))
        .route("/api/matches", get(matching::matches))
        .route("/api/connections", get(matching::connections))
        // Direct messages and sessions
        .route("/api/messages", get(messages::inbox))
        .route(
            "/api/messages/:peer",
            get(messages::conversation).post(messages::send),
        )
        .route("/api/sessions", post(messages::request_session))
        .route("/api/sessions/:id/respond", post(messages::respond_to_session))
        .route("/api/sessions/:id/complete", post(messages::complete_session))
        .route("/api/leaderboard", get(messages::leaderboard))
        // Groups
        .route("/api/groups", get(groups::list).post(groups::create))
        .route("/api/groups/:id", get(groups::get).delete(groups::delete))
        .route("/api/groups/:id/join", post(groups::join))
        .route("/api/groups/:id/leave", post(groups::leave))
        .route("/api/groups/:id/invite", post(groups::invite))
        .route("/api/groups/:id/members", get(groups::members))
        .route(
            "/api/groups/:id/messages",
            get(groups::messages).post(groups::post_message),
        )
        .route("/api/groups/:id/events", get(groups::events))
        .route(
            "/api/groups/:id/typing",
            get(groups::typing).put(groups::start_typing).delete(groups::stop_typing),
        )
        .route("/api/invitations", get(groups::invitations))
        .route("/api/invitations/:id/accept", post(groups::accept_invitation))
        .route("/api/invitations/:id/decline", post(groups::decline_invitation))
        // Credits
        .route("/api/credits", get(credits::summary))
        .route("/api/credits/spend", post(credits::spend))
        .route("/api/credits/earn", post(credits::earn))
        // Feedback and reports
        .route(
            "/api/users/:id/feedback",
            get(feedback::list).post(feedback::give),
        )
        .route("/api/reports", post(feedback::report))
}
