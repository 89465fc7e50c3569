use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum Code {
    ResultShown,
    JobDone,
    NoActionTaken,
    Conflict,
    #[serde(rename = "WrongKey")]
    Unauthorized,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiurProtocol {
    pub code: Code,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiurValue<T> {
    #[serde(flatten)]
    pub protocol: AiurProtocol,
    pub value: T,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiurCollection<T> {
    #[serde(flatten)]
    pub protocol: AiurProtocol,
    pub items: Vec<T>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiurPagedCollection<T> {
    #[serde(flatten)]
    pub protocol: AiurProtocol,
    pub items: Vec<T>,
    pub current_page: i32,
    pub page_size: i32,
    pub total_count: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryNumberAddressModel {
    pub question: Option<String>,
    #[serde(default)]
    pub page_number: i32,
    #[serde(default)]
    pub page_size: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterAddressModel {
    #[required]
    pub name: String,
    pub password: String,
    pub age: u32,
    pub birthday: Option<DateTime<Utc>>,
    pub hobbies: Vec<String>,
    #[serde(skip)]
    session: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterViewModel {
    #[serde(flatten)]
    pub protocol: AiurProtocol,
    pub user_id: String,
    #[example_ignore]
    pub debug_trace: Option<String>,
}

#[derive(Debug)]
pub struct AiurServerError {
    pub code: Code,
    pub message: String,
}
