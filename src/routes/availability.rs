use serde::Deserialize;
use warp::{filters::BoxedFilter, Filter};

use super::globals::{
    normalized_page_number, render, success, Failure, ListResponse, Response,
    SimpleSuccessResponse,
};
use api::{
    models::{AvailabilityQuery, AvailableTeacher, BlockAssignment, Id},
    search, Api,
};
use filters::{authed, with_api};

pub fn routes(api: &Api) -> BoxedFilter<(Response,)> {
    let teachers_route = warp::path!("api" / "availability" / "teachers")
        .and(warp::get())
        .and(authed(api))
        .and(with_api(api.clone()))
        .and(warp::query::<TeachersRequest>())
        .and_then(|api, request| render(teachers(api, request)))
        .boxed();

    let assign_route = warp::path!("api" / "availability" / "assign")
        .and(warp::post())
        .and(authed(api))
        .and(with_api(api.clone()))
        .and(warp::body::content_length_limit(1024 * 16).and(warp::body::json()))
        .and_then(|api, assignment| render(assign(api, assignment)))
        .boxed();

    teachers_route.or(assign_route).unify().boxed()
}

#[derive(Deserialize)]
struct TeachersRequest {
    query: Option<String>,
    page: Option<i64>,
    subject_id: Option<Id>,
    day: Option<String>,
    shift: Option<String>,
}

/// Teachers the availability service reports as free, narrowed by name.
async fn teachers(api: Api, request: TeachersRequest) -> Result<Response, Failure> {
    let filters = AvailabilityQuery {
        subject_id: request.subject_id,
        day: request.day,
        shift: request.shift,
    };
    let teachers = api.available_teachers(&filters).await?;

    let found = search(
        &teachers,
        |t: &AvailableTeacher| format!("{} {}", t.first_name, t.last_name),
        normalized_page_number(request.page),
        request.query.as_deref(),
        |_| true,
    );

    Ok(success(&ListResponse::new(found)))
}

async fn assign(api: Api, assignment: BlockAssignment) -> Result<Response, Failure> {
    api.assign_block(&assignment).await?;
    Ok(success(&SimpleSuccessResponse::new()))
}
