use serde::Serialize;
use std::sync::Arc;
use warp::{filters::BoxedFilter, Filter};

use super::globals::{success, Response};
use api::lookups::Lookups;

#[derive(Serialize)]
struct LookupsResponse<'a> {
    status: &'static str,
    lookups: &'a Lookups,
}

pub fn routes(lookups: Arc<Lookups>) -> BoxedFilter<(Response,)> {
    warp::path!("api" / "lookups")
        .and(warp::get())
        .map(move || {
            success(&LookupsResponse {
                status: "success",
                lookups: &lookups,
            })
        })
        .boxed()
}
