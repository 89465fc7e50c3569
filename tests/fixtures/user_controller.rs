use crate::models::*;

#[route("api/users")]
#[generate_doc]
pub struct UserController;

impl Controller for UserController {}

impl UserController {
    #[route("/")]
    #[route("list")]
    #[authorize]
    #[produces(AiurCollection<String>)]
    pub fn list(&self, #[from_query(name = "q")] filter: Option<String>, #[default_value] take: i32) {}

    #[http_post]
    #[route("{id}/rename")]
    pub fn rename(&self, id: u64, #[required] new_name: String, effective: Option<DateTime<Utc>>) {}
}

/// Not documented: no documentable marker
pub struct AdminController;

impl Controller for AdminController {}

impl AdminController {
    pub fn reset(&self) {}
}

/// Not a handler: private
#[generate_doc]
struct InternalController;

impl Controller for InternalController {
    fn handle(&self) {}
}

/// Not a handler: wrong suffix
#[generate_doc]
pub struct UserService;

impl Controller for UserService {}

impl UserService {
    pub fn find(&self) {}
}
