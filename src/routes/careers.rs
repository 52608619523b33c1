use serde::Deserialize;
use warp::{filters::BoxedFilter, Filter};

use super::globals::{
    normalized_page_number, render, same_text, success, Failure, ListResponse, Response,
};
use super::resource;
use api::{
    models::{Career, Resource},
    search, Api,
};
use filters::{authed, with_api};

pub fn routes(api: &Api) -> BoxedFilter<(Response,)> {
    let list_route = warp::path!("api" / "careers")
        .and(warp::get())
        .and(authed(api))
        .and(with_api(api.clone()))
        .and(warp::query::<ListRequest>())
        .and_then(|api, request| render(list(api, request)))
        .boxed();

    list_route
        .or(resource::routes::<Career>(api, "careers"))
        .unify()
        .boxed()
}

#[derive(Deserialize)]
struct ListRequest {
    query: Option<String>,
    page: Option<i64>,
    faculty: Option<String>,
    modality: Option<String>,
}

async fn list(api: Api, request: ListRequest) -> Result<Response, Failure> {
    let careers = api.list::<Career>().await?;

    let found = search(
        &careers,
        Career::search_text,
        normalized_page_number(request.page),
        request.query.as_deref(),
        |c| {
            same_text(request.faculty.as_deref(), &c.fields.faculty)
                && same_text(request.modality.as_deref(), &c.fields.modality)
        },
    );

    Ok(success(&ListResponse::new(found)))
}
