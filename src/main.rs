use fern::colors::{Color, ColoredLevelConfig};
use log::{error, info, LevelFilter};
use std::sync::Arc;
use warp::{http::StatusCode, Filter, Rejection, Reply};

mod config;
mod routes;
mod schedule;
mod validation;

use api::{lookups::Lookups, new_api};
use config::Config;
use filters::Unauthorized;
use routes::{routes, ErrorCode, FailureResponse, Memo};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let config = Config::from_env();
    setup_logging(config.log_level);

    let api = match new_api(config.backend()) {
        Ok(api) => api,
        Err(e) => {
            error!("Could not create the backend client: {}", e);
            std::process::exit(1);
        }
    };
    let lookups = match Lookups::from_parsed_json() {
        Ok(lookups) => Arc::new(lookups),
        Err(e) => {
            error!("Could not read bundled lookups: {}", e);
            std::process::exit(1);
        }
    };
    let memo = Memo::default();

    let filters = routes(&api, &memo, lookups);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_methods(vec!["GET", "POST", "PUT", "DELETE"])
        .allow_headers(vec!["content-type", "Authorization"]);

    let filters = filters
        .with(cors)
        // Before logging for correct status codes
        .recover(handle_rejection)
        .with(warp::log("campus_connect"));

    info!("Listening on {}", config.address);
    warp::serve(filters).run(config.address).await;
}

fn setup_logging(level: LevelFilter) {
    let colors = ColoredLevelConfig::new().debug(Color::Magenta);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{}{} {}",
                colors.color(record.level()),
                chrono::Local::now().format("[%H:%M:%S]"),
                message
            ))
        })
        .level(level)
        .chain(std::io::stdout())
        .apply()
        .expect("Could not apply logging configuration");
}

async fn handle_rejection(err: Rejection) -> Result<impl Reply, std::convert::Infallible> {
    let response;
    let status_code;

    if err.is_not_found() {
        response = FailureResponse::new(ErrorCode::NotFound);
        status_code = StatusCode::NOT_FOUND;
    } else if let Some(Unauthorized { login_url }) = err.find() {
        response = FailureResponse::login_required(login_url.clone());
        status_code = StatusCode::UNAUTHORIZED;
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        response = FailureResponse::new(ErrorCode::MalformedData).with_detail(e.to_string());
        status_code = StatusCode::BAD_REQUEST;
    } else if let Some(e) = err.find::<warp::reject::InvalidQuery>() {
        response = FailureResponse::new(ErrorCode::MalformedData).with_detail(e.to_string());
        status_code = StatusCode::BAD_REQUEST;
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some()
        || err.find::<warp::reject::LengthRequired>().is_some()
        || err.find::<warp::reject::UnsupportedMediaType>().is_some()
    {
        response = FailureResponse::new(ErrorCode::MalformedData);
        status_code = StatusCode::BAD_REQUEST;
    } else if let Some(_) = err.find::<warp::reject::MethodNotAllowed>() {
        response = FailureResponse::new(ErrorCode::MethodNotAllowed);
        status_code = StatusCode::METHOD_NOT_ALLOWED;
    } else {
        error!("Unhandled rejection: {:?}", err);
        response = FailureResponse::new(ErrorCode::InternalServerError);
        status_code = StatusCode::INTERNAL_SERVER_ERROR;
    }

    let json = warp::reply::json(&response);
    Ok(warp::reply::with_status(json, status_code))
}
