use reqwest::{header::CONTENT_TYPE, Client, StatusCode};
use serde::{de::Error as _, Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;
use time::{macros::format_description, Time};

const JSON_UTF8: &str = "application/json; charset=UTF-8";

/// A course picked by the optimizer together with the weekly appointments
/// that make it up
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub(crate) struct SelectedCourse {
    pub(crate) subject: String,
    #[serde(default)]
    pub(crate) name_en: Option<String>,
    pub(crate) appointments: Vec<Appointment>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub(crate) struct Appointment {
    pub(crate) weekday: String,
    #[serde(deserialize_with = "deserialize_time")]
    pub(crate) from: Time,
    #[serde(deserialize_with = "deserialize_time")]
    pub(crate) to: Time,
    #[serde(default)]
    pub(crate) course_type: Option<String>,
}

impl Appointment {
    pub(crate) fn falls_on(&self, weekday: time::Weekday) -> bool {
        self.weekday.eq_ignore_ascii_case(&weekday.to_string())
    }
}

#[derive(Debug, Error)]
pub(crate) enum ApiError {
    #[error("request to {url} failed")]
    Request {
        url: String,
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: StatusCode },
    #[error("could not decode the response from {url}")]
    Decode {
        url: String,
        source: reqwest::Error,
    },
}

/// Client for the optimizer backend
#[derive(Clone, Debug)]
pub(crate) struct OptimizerClient {
    base_url: String,
    client: Client,
}

impl OptimizerClient {
    pub(crate) fn new(base_url: &str) -> OptimizerClient {
        OptimizerClient {
            base_url: base_url.trim_end_matches('/').to_owned(),
            client: Client::new(),
        }
    }

    /// Submit a serialized configuration and return the courses the
    /// optimizer selected
    pub(crate) async fn optimize(&self, body: &Value) -> Result<Vec<SelectedCourse>, ApiError> {
        let url = format!("{}/api/optimize", self.base_url);
        tracing::info!(%url, "Submitting configuration to optimizer");
        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, JSON_UTF8)
            .body(body.to_string())
            .send()
            .await
            .map_err(|source| ApiError::Request {
                url: url.clone(),
                source,
            })?;
        let courses = decode::<Vec<SelectedCourse>>(url, response).await?;
        tracing::info!(count = courses.len(), "Optimizer returned a schedule");
        Ok(courses)
    }

    /// Fetch the raw department listing
    pub(crate) async fn departments(&self) -> Result<Vec<String>, ApiError> {
        let url = format!("{}/api/departments", self.base_url);
        tracing::debug!(%url, "Fetching departments");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| ApiError::Request {
                url: url.clone(),
                source,
            })?;
        decode(url, response).await
    }
}

async fn decode<T: serde::de::DeserializeOwned>(
    url: String,
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::Status { url, status });
    }
    response
        .json::<T>()
        .await
        .map_err(|source| ApiError::Decode { url, source })
}

/// Strip the two leading code tokens from a department listing entry, e.g.
/// `"TUS1000 51897 Department of Mathematics"` becomes
/// `"Department of Mathematics"`
pub(crate) fn department_name(raw: &str) -> String {
    raw.split(' ').skip(2).collect::<Vec<_>>().join(" ")
}

fn deserialize_time<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Time, D::Error> {
    let s = String::deserialize(deserializer)?;
    parse_time(&s).ok_or_else(|| D::Error::custom(format!("invalid time of day: {s:?}")))
}

/// Parse `HH:MM:SS` or `HH:MM`, the latter also being how times are typed
/// into the blocker form
pub(crate) fn parse_time(s: &str) -> Option<Time> {
    let s = s.trim();
    // Drop fractional seconds
    let s = s.split_once('.').map_or(s, |(whole, _)| whole);
    Time::parse(s, format_description!("[hour]:[minute]:[second]"))
        .or_else(|_| Time::parse(s, format_description!("[hour]:[minute]")))
        .or_else(|_| Time::parse(s, format_description!("[hour padding:none]:[minute]")))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::time;

    #[test]
    fn test_department_name() {
        assert_eq!(
            department_name("TUS1000 51897 Department of Mathematics"),
            "Department of Mathematics"
        );
        assert_eq!(department_name("A B C"), "C");
        assert_eq!(department_name("only two"), "");
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("09:30:00"), Some(time!(9:30)));
        assert_eq!(parse_time("14:15"), Some(time!(14:15)));
        assert_eq!(parse_time("8:05"), Some(time!(8:05)));
        assert_eq!(parse_time("10:00:00.5"), Some(time!(10:00)));
        assert_eq!(parse_time("25:00"), None);
        assert_eq!(parse_time("noon"), None);
    }

    #[test]
    fn test_decode_selected_courses() {
        let courses = serde_json::from_value::<Vec<SelectedCourse>>(json!([
            {
                "subject": "IN0001",
                "name_en": "Introduction to Informatics",
                "ects": 6.0,
                "appointments": [
                    {"weekday": "Monday", "from": "10:00:00", "to": "12:00:00", "course_type": "VO"},
                    {"weekday": "Thursday", "from": "14:00:00", "to": "16:00:00"}
                ]
            }
        ]))
        .unwrap();
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].subject, "IN0001");
        assert_eq!(courses[0].appointments[0].from, time!(10:00));
        assert_eq!(courses[0].appointments[0].course_type.as_deref(), Some("VO"));
        assert_eq!(courses[0].appointments[1].course_type, None);
        assert!(courses[0].appointments[1].falls_on(time::Weekday::Thursday));
        assert!(!courses[0].appointments[1].falls_on(time::Weekday::Friday));
    }

    #[tokio::test]
    async fn test_optimize_posts_json() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/optimize")
            .match_header("content-type", JSON_UTF8)
            .match_body(mockito::Matcher::Json(json!({"curriculum": "CS-BS"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!([{
                    "subject": "MA0001",
                    "appointments": [{"weekday": "Tuesday", "from": "08:00:00", "to": "10:00:00"}]
                }])
                .to_string(),
            )
            .create_async()
            .await;
        let client = OptimizerClient::new(&server.url());
        let courses = client
            .optimize(&json!({"curriculum": "CS-BS"}))
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].subject, "MA0001");
    }

    #[tokio::test]
    async fn test_optimize_reports_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/optimize")
            .with_status(500)
            .create_async()
            .await;
        let client = OptimizerClient::new(&server.url());
        let err = client.optimize(&json!({})).await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::Status { status, .. } if status == StatusCode::INTERNAL_SERVER_ERROR
        ));
    }

    #[tokio::test]
    async fn test_departments() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/departments")
            .with_status(200)
            .with_body(r#"["TUS1 1 School of Computation", "TUS2 2 School of Management"]"#)
            .create_async()
            .await;
        let client = OptimizerClient::new(&format!("{}/", server.url()));
        let departments = client.departments().await.unwrap();
        assert_eq!(
            departments
                .iter()
                .map(String::as_str)
                .map(department_name)
                .collect::<Vec<_>>(),
            ["School of Computation", "School of Management"]
        );
    }
}
