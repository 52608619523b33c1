use serde::Deserialize;
use warp::{filters::BoxedFilter, Filter};

use super::globals::{normalized_page_number, render, success, Failure, ListResponse, Response};
use super::resource;
use api::{
    models::{Id, Resource, Status, User},
    search, Api,
};
use filters::{authed, with_api};

pub fn routes(api: &Api) -> BoxedFilter<(Response,)> {
    let list_route = warp::path!("api" / "users")
        .and(warp::get())
        .and(authed(api))
        .and(with_api(api.clone()))
        .and(warp::query::<ListRequest>())
        .and_then(|api, request| render(list(api, request)))
        .boxed();

    list_route
        .or(resource::routes::<User>(api, "users"))
        .unify()
        .boxed()
}

#[derive(Deserialize)]
struct ListRequest {
    query: Option<String>,
    page: Option<i64>,
    role_id: Option<Id>,
    status: Option<Status>,
}

async fn list(api: Api, request: ListRequest) -> Result<Response, Failure> {
    let users = api.list::<User>().await?;

    let found = search(
        &users,
        User::search_text,
        normalized_page_number(request.page),
        request.query.as_deref(),
        |u| {
            request.role_id.map_or(true, |id| u.fields.role_id == Some(id))
                && request.status.map_or(true, |s| u.fields.status == s)
        },
    );

    Ok(success(&ListResponse::new(found)))
}
