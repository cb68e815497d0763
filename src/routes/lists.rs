//! The `/lists` resource: every verb maps to one list or entry operation.

use crate::handlers::{add_url, create_list, delete_entry, get_lists, update_url};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn list_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/lists",
            get(get_lists)
                .post(create_list)
                .put(add_url)
                .patch(update_url)
                .delete(delete_entry),
        )
        .with_state(state)
}
