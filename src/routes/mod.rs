use std::sync::Arc;
use warp::{filters::BoxedFilter, Filter};

use api::{lookups::Lookups, Api};

mod availability;
mod careers;
mod classes;
mod courses;
mod globals;
mod lookups;
mod prices;
mod proposals;
mod resource;
mod roles;
mod session;
mod sites;
mod spaces;
mod subjects;
mod users;

#[cfg(test)]
mod tests;

pub use courses::Memo;
pub use globals::{ErrorCode, FailureResponse};

pub fn routes(api: &Api, memo: &Memo, lookups: Arc<Lookups>) -> BoxedFilter<(globals::Response,)> {
    session::routes(api)
        .or(lookups::routes(lookups))
        .unify()
        .or(users::routes(api))
        .unify()
        .or(roles::routes(api))
        .unify()
        .or(careers::routes(api))
        .unify()
        .or(subjects::routes(api))
        .unify()
        .or(courses::routes(api, memo))
        .unify()
        .or(classes::routes(api))
        .unify()
        .or(spaces::routes(api))
        .unify()
        .or(sites::routes(api))
        .unify()
        .or(prices::routes(api))
        .unify()
        .or(availability::routes(api))
        .unify()
        .or(proposals::routes(api))
        .unify()
        .boxed()
}
