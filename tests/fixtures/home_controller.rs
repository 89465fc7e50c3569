use crate::models::*;
use axum::extract::{Form, Json, Query};

#[api_exception_handler(passthrough_remote_errors = true)]
#[api_model_state_checker]
#[generate_doc]
pub struct HomeController {
    started: std::time::Instant,
}

impl ControllerBase for HomeController {}

impl HomeController {
    pub fn new() -> Self {
        Self {
            started: std::time::Instant::now(),
        }
    }

    pub fn index(&self) -> AiurProtocol {
        AiurProtocol::new(Code::ResultShown, "Welcome to this API project!")
    }

    #[route("home/no-action")]
    pub fn no_action(&self) -> AiurProtocol {
        AiurProtocol::new(Code::NoActionTaken, "No action taken!")
    }

    #[authorize]
    pub fn authorized_api(&self) -> String {
        "This is not a valid protocol response.".to_string()
    }

    #[produces(AiurValue<i32>)]
    pub fn get_a_number(&self) -> AiurValue<i32> {
        AiurValue::new(Code::ResultShown, "Got your value!", 123)
    }

    #[produces(AiurCollection<i32>)]
    pub fn query_something(&self, Query(question): Query<String>) -> AiurCollection<i32> {
        let items = fibonacci()
            .take(1024 * 1024)
            .filter(|i| i.to_string().ends_with(&question))
            .take(10)
            .collect();
        AiurCollection::new(Code::ResultShown, "Got your value!", items)
    }

    #[produces(AiurPagedCollection<i32>)]
    pub async fn query_something_paged(
        &self,
        Query(model): Query<QueryNumberAddressModel>,
    ) -> AiurPagedCollection<i32> {
        let question = model.question.clone().unwrap_or_default();
        let items: Vec<i32> = fibonacci()
            .take(30)
            .filter(|i| i.to_string().ends_with(&question))
            .collect();
        AiurPagedCollection::page(Code::ResultShown, "Got your value!", items, &model)
    }

    #[produces(AiurCollection<i32>)]
    pub fn get_fibonacci_first10(&self) -> AiurCollection<i32> {
        AiurCollection::new(Code::ResultShown, "Got your value!", fibonacci().take(10).collect())
    }

    #[http_post]
    #[produces(RegisterViewModel)]
    pub fn register_form(&self, Form(model): Form<RegisterAddressModel>) -> RegisterViewModel {
        RegisterViewModel::registered(&model.name)
    }

    #[http_post]
    #[produces(RegisterViewModel)]
    pub fn register_json(&self, Json(model): Json<RegisterAddressModel>) -> RegisterViewModel {
        RegisterViewModel::registered(&model.name)
    }

    pub fn crash_known(&self) -> Result<AiurProtocol, AiurServerError> {
        Err(AiurServerError::new(Code::Conflict, "Known error"))
    }

    #[deprecated]
    pub fn crash_unknown(&self) -> AiurProtocol {
        panic!("unknown error")
    }

    #[non_action]
    pub fn uptime(&self) -> std::time::Duration {
        self.started.elapsed()
    }

    fn warm_up(&self) {}
}

fn fibonacci() -> impl Iterator<Item = i32> {
    let mut state = (1, 1);
    std::iter::from_fn(move || {
        let current = state.0;
        state = (state.1, state.0 + state.1);
        Some(current)
    })
}
