use serde::Deserialize;
use warp::{filters::BoxedFilter, Filter};

use super::globals::{normalized_page_number, render, success, Failure, ListResponse, Response};
use super::resource;
use api::{
    models::{Resource, Site, Status},
    search, Api,
};
use filters::{authed, with_api};

pub fn routes(api: &Api) -> BoxedFilter<(Response,)> {
    let list_route = warp::path!("api" / "sites")
        .and(warp::get())
        .and(authed(api))
        .and(with_api(api.clone()))
        .and(warp::query::<ListRequest>())
        .and_then(|api, request| render(list(api, request)))
        .boxed();

    list_route
        .or(resource::routes::<Site>(api, "sites"))
        .unify()
        .boxed()
}

#[derive(Deserialize)]
struct ListRequest {
    query: Option<String>,
    page: Option<i64>,
    status: Option<Status>,
}

async fn list(api: Api, request: ListRequest) -> Result<Response, Failure> {
    let sites = api.list::<Site>().await?;

    let found = search(
        &sites,
        Site::search_text,
        normalized_page_number(request.page),
        request.query.as_deref(),
        |s| request.status.map_or(true, |status| s.fields.status == status),
    );

    Ok(success(&ListResponse::new(found)))
}
