use std::time::Duration;

use serde::Deserialize;

const HEALTHCHECK_URL: &str = "http://localhost:8080/healthcheck";

#[derive(Debug)]
enum ProbeError {
    Request(String),
    Unhealthy,
}

#[derive(Debug, Deserialize)]
struct StatusJSON {
    status: String,
}

impl std::fmt::Display for ProbeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeError::Request(e) => write!(f, "Request error: {}", e),
            ProbeError::Unhealthy => write!(f, "Status code != 200 or service not healthy"),
        }
    }
}

impl From<reqwest::Error> for ProbeError {
    fn from(err: reqwest::Error) -> ProbeError {
        ProbeError::Request(err.to_string())
    }
}

fn main() -> Result<(), ProbeError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()?;

    let res = client.get(HEALTHCHECK_URL).send()?;
    if res.status() != 200 {
        return Err(ProbeError::Unhealthy);
    }

    let body: StatusJSON = res.json()?;
    if body.status != "ok" {
        return Err(ProbeError::Unhealthy);
    }

    Ok(())
}
