//! Minimal accesslog example: a couple of endpoints behind the access logger.
//!
//! Run with:
//!   RUST_LOG=debug ACCESSLOG_FORMAT=dev cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/users/42
//!   curl -X POST http://localhost:3000/users -d '{"name":"alice"}'
//!   curl http://localhost:3000/nope

use std::io::Write;

use accesslog::middleware::Logger;
use accesslog::{Config, MetricsFacade, Request, ResponseWriter, Server};
use http::{HeaderValue, Method, StatusCode};

#[tokio::main]
async fn main() -> Result<(), accesslog::Error> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;

    // No recorder is installed here, so metrics go nowhere; plug in a
    // Prometheus or statsd exporter to collect them.
    let app = Logger::new(route, std::io::stdout(), config.format).with_metrics(MetricsFacade);

    Server::bind(&config.addr)?.serve(app).await
}

fn route(req: &Request, res: &mut dyn ResponseWriter) {
    let path = req.uri().path();
    match (req.method(), path) {
        (&Method::GET, "/healthz") => {
            let _ = res.write_all(b"ok");
        }
        (&Method::GET, _) if path.starts_with("/users/") => {
            let id = &path["/users/".len()..];
            json(res, StatusCode::OK, &format!(r#"{{"id":"{id}","name":"alice"}}"#));
        }
        (&Method::POST, "/users") => {
            if req.body().is_empty() {
                res.write_header(StatusCode::BAD_REQUEST);
                return;
            }
            res.headers().insert("location", HeaderValue::from_static("/users/99"));
            json(res, StatusCode::CREATED, r#"{"id":"99","name":"new_user"}"#);
        }
        _ => res.write_header(StatusCode::NOT_FOUND),
    }
}

fn json(res: &mut dyn ResponseWriter, status: StatusCode, body: &str) {
    res.headers().insert("content-type", HeaderValue::from_static("application/json"));
    res.write_header(status);
    let _ = res.write_all(body.as_bytes());
}
