use serde::Deserialize;
use warp::{filters::BoxedFilter, Filter};

use super::globals::{
    created, normalized_page_number, render, success, Failure, ItemResponse, ListResponse,
    Response,
};
use super::resource;
use crate::validation::{check_unique_class_type, Validate};
use api::{
    models::{Class, ClassFields, ClassState, ClassType, Id, Resource},
    search, Api,
};
use filters::{authed, with_api};

pub fn routes(api: &Api) -> BoxedFilter<(Response,)> {
    let list_route = warp::path!("api" / "courses" / Id / "classes")
        .and(warp::get())
        .and(authed(api))
        .and(with_api(api.clone()))
        .and(warp::query::<ListRequest>())
        .and_then(|course_id, api, request| render(list(course_id, api, request)))
        .boxed();

    let create_route = warp::path!("api" / "courses" / Id / "classes")
        .and(warp::post())
        .and(authed(api))
        .and(with_api(api.clone()))
        .and(warp::body::content_length_limit(1024 * 16).and(warp::body::json()))
        .and_then(|course_id, api, payload| render(create(course_id, api, payload)))
        .boxed();

    let update_route = warp::path!("api" / "classes" / Id)
        .and(warp::put())
        .and(authed(api))
        .and(with_api(api.clone()))
        .and(warp::body::content_length_limit(1024 * 16).and(warp::body::json()))
        .and_then(|id, api, payload| render(update(id, api, payload)))
        .boxed();

    list_route
        .or(create_route)
        .unify()
        .or(update_route)
        .unify()
        .or(resource::get_route::<Class>(api, "classes"))
        .unify()
        .or(resource::delete_route::<Class>(api, "classes"))
        .unify()
        .boxed()
}

#[derive(Deserialize)]
struct ListRequest {
    query: Option<String>,
    page: Option<i64>,
    #[serde(rename = "type")]
    class_type: Option<ClassType>,
    state: Option<ClassState>,
}

async fn list(course_id: Id, api: Api, request: ListRequest) -> Result<Response, Failure> {
    let classes = api.course_classes(course_id).await?;

    let found = search(
        &classes,
        Class::search_text,
        normalized_page_number(request.page),
        request.query.as_deref(),
        |c| {
            request.class_type.map_or(true, |t| c.fields.class_type == t)
                && request.state.map_or(true, |s| c.fields.state == s)
        },
    );

    Ok(success(&ListResponse::new(found)))
}

async fn create(course_id: Id, api: Api, mut payload: ClassFields) -> Result<Response, Failure> {
    payload.course_id = course_id;
    payload.validate()?;

    let existing = api.course_classes(course_id).await?;
    check_unique_class_type(&existing, &payload, None)?;

    let class = api.create::<Class>(&payload).await?;
    Ok(created(&ItemResponse::new(&class)))
}

/// Checked against the course the class is stored under, and against the course it moves to.
async fn update(id: Id, api: Api, payload: ClassFields) -> Result<Response, Failure> {
    payload.validate_update(id)?;

    let stored = api.get::<Class>(id).await?;
    let mut courses = vec![stored.fields.course_id];
    if payload.course_id != stored.fields.course_id {
        courses.push(payload.course_id);
    }

    for course_id in courses {
        let existing = api.course_classes(course_id).await?;
        check_unique_class_type(&existing, &payload, Some(id))?;
    }

    let class = api.update::<Class>(id, &payload).await?;
    Ok(success(&ItemResponse::new(&class)))
}
