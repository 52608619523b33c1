use serde::Deserialize;
use warp::{filters::BoxedFilter, Filter};

use super::globals::{normalized_page_number, render, success, Failure, ListResponse, Response};
use super::resource;
use api::{
    models::{Price, PriceKind, Resource, Status},
    search, Api,
};
use filters::{authed, with_api};

pub fn routes(api: &Api) -> BoxedFilter<(Response,)> {
    let list_route = warp::path!("api" / "prices")
        .and(warp::get())
        .and(authed(api))
        .and(with_api(api.clone()))
        .and(warp::query::<ListRequest>())
        .and_then(|api, request| render(list(api, request)))
        .boxed();

    list_route
        .or(resource::routes::<Price>(api, "prices"))
        .unify()
        .boxed()
}

#[derive(Deserialize)]
struct ListRequest {
    query: Option<String>,
    page: Option<i64>,
    kind: Option<PriceKind>,
    status: Option<Status>,
}

async fn list(api: Api, request: ListRequest) -> Result<Response, Failure> {
    let prices = api.list::<Price>().await?;

    let found = search(
        &prices,
        Price::search_text,
        normalized_page_number(request.page),
        request.query.as_deref(),
        |p| {
            request.kind.map_or(true, |k| p.fields.kind == k)
                && request.status.map_or(true, |s| p.fields.status == s)
        },
    );

    Ok(success(&ListResponse::new(found)))
}
