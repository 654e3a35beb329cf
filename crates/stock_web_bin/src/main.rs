use alphavantage_api::api::{AlphaVantageClient, FetchError};
use alphavantage_api::fetcher::QuoteFetcher;
use dotenvy::dotenv;
use log::{error, info};
use redis::ConnectionLike;
use result_cache::RedisCache;
use serde::{Deserialize, Serialize};
use std::{env, process::exit};

use actix_web::{
    App, HttpResponse, HttpServer, Responder, get, http::StatusCode, middleware::Logger, post, web,
};

mod utils;
mod view;

type Fetcher = QuoteFetcher<AlphaVantageClient, RedisCache>;

#[derive(Serialize)]
struct HealthcheckResponse {
    status: String,
}

#[derive(Deserialize)]
struct QuoteForm {
    symbol: String,
}

#[derive(Deserialize)]
struct HistoricalForm {
    historical_symbol: String,
}

#[get("/")]
async fn home() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(view::HOME_PAGE)
}

#[post("/get_stock_info")]
async fn get_stock_info(form: web::Form<QuoteForm>, fetcher: web::Data<Fetcher>) -> HttpResponse {
    let symbol = match utils::clean_symbol(&form.symbol) {
        Some(symbol) => symbol,
        None => return empty_symbol_response(),
    };

    match fetcher.quote(&symbol).await {
        Ok(quote) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(view::quote_page(&symbol, &quote)),
        Err(e) => {
            error!("get_stock_info | symbol: {} | {}", symbol, e);
            fetch_error_response(&e)
        }
    }
}

#[post("/get_historical_data")]
async fn get_historical_data(
    form: web::Form<HistoricalForm>,
    fetcher: web::Data<Fetcher>,
) -> HttpResponse {
    let symbol = match utils::clean_symbol(&form.historical_symbol) {
        Some(symbol) => symbol,
        None => return empty_symbol_response(),
    };

    match fetcher.historical(&symbol).await {
        Ok(series) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(view::historical_page(&symbol, &series)),
        Err(e) => {
            error!("get_historical_data | symbol: {} | {}", symbol, e);
            fetch_error_response(&e)
        }
    }
}

fn empty_symbol_response() -> HttpResponse {
    HttpResponse::BadRequest()
        .content_type("text/plain; charset=utf-8")
        .body("Error: symbol must not be empty")
}

// The original service rendered every failure with a success status; here
// each failure kind carries a real status so machine clients can tell them
// apart.
fn fetch_error_response(err: &FetchError) -> HttpResponse {
    let status = match err {
        FetchError::NotFound { .. } => StatusCode::NOT_FOUND,
        FetchError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        FetchError::Connection(_) | FetchError::Upstream(_) | FetchError::Decode(_) => {
            StatusCode::BAD_GATEWAY
        }
    };

    HttpResponse::build(status)
        .content_type("text/plain; charset=utf-8")
        .body(format!("Error: {}", err))
}

#[get("/healthcheck")]
async fn healthcheck() -> impl Responder {
    web::Json(HealthcheckResponse {
        status: "ok".to_string(),
    })
}

async fn not_found() -> impl Responder {
    HttpResponse::NotFound().json(HealthcheckResponse {
        status: "not found".to_string(),
    })
}

struct Config {
    workers: usize,
    redis_url: String,
    api_key: String,
}

impl Config {
    fn new() -> Result<Config, Box<dyn std::error::Error>> {
        dotenv().ok();

        let redis_url = env::var("REDIS_URL")?;
        if redis_url.trim().is_empty() {
            return Err("REDIS_URL must not be empty".into());
        }

        let api_key = env::var("ALPHAVANTAGE_API_KEY")?;
        if api_key.trim().is_empty() {
            return Err("ALPHAVANTAGE_API_KEY must not be empty".into());
        }

        let mut workers: usize = match env::var("STOCK_WEB_WORKERS") {
            Ok(raw) => raw.parse()?,
            Err(_) => 2,
        };
        if workers == 0 {
            workers = 1;
        }

        Ok(Config {
            workers,
            redis_url,
            api_key,
        })
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = match Config::new() {
        Ok(config) => config,
        Err(e) => {
            error!("Could not create config: {}", e);
            exit(1);
        }
    };

    let mut redis_client =
        redis::Client::open(config.redis_url).expect("Failed to create Redis client");
    let redis_connected = redis_client.check_connection();
    if !redis_connected {
        error!("Redis unavailable");
        exit(1);
    }
    info!("Redis connected");

    let fetcher = web::Data::new(QuoteFetcher::new(
        AlphaVantageClient::new(config.api_key),
        RedisCache::new(redis_client),
    ));

    HttpServer::new(move || {
        App::new()
            .app_data(fetcher.clone())
            .service(home)
            .service(healthcheck)
            .service(get_stock_info)
            .service(get_historical_data)
            .default_service(web::to(not_found))
            .wrap(Logger::default())
    })
    .bind(("0.0.0.0", 8080))?
    .workers(config.workers)
    .run()
    .await
}
