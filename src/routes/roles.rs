use serde::Deserialize;
use warp::{filters::BoxedFilter, Filter};

use super::globals::{normalized_page_number, render, success, Failure, ListResponse, Response};
use super::resource;
use api::{
    models::{Resource, Role, RoleCategory, Status},
    search, Api,
};
use filters::{authed, with_api};

pub fn routes(api: &Api) -> BoxedFilter<(Response,)> {
    let list_route = warp::path!("api" / "roles")
        .and(warp::get())
        .and(authed(api))
        .and(with_api(api.clone()))
        .and(warp::query::<ListRequest>())
        .and_then(|api, request| render(list(api, request)))
        .boxed();

    list_route
        .or(resource::routes::<Role>(api, "roles"))
        .unify()
        .boxed()
}

#[derive(Deserialize)]
struct ListRequest {
    query: Option<String>,
    page: Option<i64>,
    category: Option<RoleCategory>,
    status: Option<Status>,
}

async fn list(api: Api, request: ListRequest) -> Result<Response, Failure> {
    let roles = api.list::<Role>().await?;

    let found = search(
        &roles,
        Role::search_text,
        normalized_page_number(request.page),
        request.query.as_deref(),
        |r| {
            request.category.map_or(true, |c| r.fields.category == c)
                && request.status.map_or(true, |s| r.fields.status == s)
        },
    );

    Ok(success(&ListResponse::new(found)))
}
