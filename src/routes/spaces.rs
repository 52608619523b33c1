use serde::Deserialize;
use warp::{filters::BoxedFilter, Filter};

use super::globals::{
    normalized_page_number, render, same_text, success, Failure, ListResponse, Response,
};
use super::resource;
use api::{
    models::{Id, Resource, Space, Status},
    search, Api,
};
use filters::{authed, with_api};

pub fn routes(api: &Api) -> BoxedFilter<(Response,)> {
    let list_route = warp::path!("api" / "spaces")
        .and(warp::get())
        .and(authed(api))
        .and(with_api(api.clone()))
        .and(warp::query::<ListRequest>())
        .and_then(|api, request| render(list(api, request)))
        .boxed();

    list_route
        .or(resource::routes::<Space>(api, "spaces"))
        .unify()
        .boxed()
}

#[derive(Deserialize)]
struct ListRequest {
    query: Option<String>,
    page: Option<i64>,
    site_id: Option<Id>,
    space_type: Option<String>,
    /// Only spaces that fit at least this many people.
    min_capacity: Option<u32>,
    status: Option<Status>,
}

async fn list(api: Api, request: ListRequest) -> Result<Response, Failure> {
    let spaces = api.list::<Space>().await?;

    let found = search(
        &spaces,
        Space::search_text,
        normalized_page_number(request.page),
        request.query.as_deref(),
        |s| {
            request.site_id.map_or(true, |id| s.fields.site_id == Some(id))
                && same_text(request.space_type.as_deref(), &s.fields.space_type)
                && request.min_capacity.map_or(true, |c| s.fields.capacity >= c)
                && request.status.map_or(true, |status| s.fields.status == status)
        },
    );

    Ok(success(&ListResponse::new(found)))
}
