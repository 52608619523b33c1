use serde::Deserialize;
use warp::{filters::BoxedFilter, Filter};

use super::globals::{normalized_page_number, render, success, Failure, ListResponse, Response};
use super::resource;
use api::{
    models::{Id, Resource, Subject},
    search, Api,
};
use filters::{authed, with_api};

pub fn routes(api: &Api) -> BoxedFilter<(Response,)> {
    let list_route = warp::path!("api" / "subjects")
        .and(warp::get())
        .and(authed(api))
        .and(with_api(api.clone()))
        .and(warp::query::<ListRequest>())
        .and_then(|api, request| render(list(api, request)))
        .boxed();

    let prerequisites_route = warp::path!("api" / "subjects" / Id / "prerequisites")
        .and(warp::get())
        .and(authed(api))
        .and(with_api(api.clone()))
        .and_then(|id, api| render(prerequisites(id, api)))
        .boxed();

    list_route
        .or(prerequisites_route)
        .unify()
        .or(resource::routes::<Subject>(api, "subjects"))
        .unify()
        .boxed()
}

#[derive(Deserialize)]
struct ListRequest {
    query: Option<String>,
    page: Option<i64>,
    career_id: Option<Id>,
    elective: Option<bool>,
}

async fn list(api: Api, request: ListRequest) -> Result<Response, Failure> {
    let subjects = api.list::<Subject>().await?;

    let found = search(
        &subjects,
        Subject::search_text,
        normalized_page_number(request.page),
        request.query.as_deref(),
        |s| {
            request.career_id.map_or(true, |id| s.fields.career_id == Some(id))
                && request.elective.map_or(true, |e| s.fields.elective == e)
        },
    );

    Ok(success(&ListResponse::new(found)))
}

/// Resolves the prerequisite ids of a subject into the subjects themselves.
async fn prerequisites(id: Id, api: Api) -> Result<Response, Failure> {
    let subjects = api.list::<Subject>().await?;

    let subject = subjects
        .iter()
        .find(|s| s.id == id)
        .ok_or(Failure::NotFound)?;

    let prerequisites: Vec<&Subject> = subjects
        .iter()
        .filter(|s| subject.fields.prerequisites.contains(&s.id))
        .collect();

    Ok(success(&ListResponse::new((
        prerequisites.len(),
        prerequisites,
    ))))
}
