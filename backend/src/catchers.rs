use rocket::{Request, catch, serde::json::Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct ErrorMessage {
    error: String,
    status: u16,
}

impl ErrorMessage {
    fn new(status: u16, error: &str) -> Json<Self> {
        Json(Self { error: error.into(), status })
    }
}

#[catch(400)]
pub fn bad_request(_req: &Request) -> Json<ErrorMessage> {
    ErrorMessage::new(400, "Invalid request parameters.")
}

#[catch(404)]
pub fn not_found(req: &Request) -> Json<ErrorMessage> {
    match req.headers().get_one("Content-Type") {
        Some(ct) if !ct.contains("json") && req.method() == rocket::http::Method::Post =>
            ErrorMessage::new(404, "Poll endpoints expect a JSON body (Content-Type: application/json)."),
        _ => ErrorMessage::new(404, "The requested resource was not found."),
    }
}

#[catch(422)]
pub fn unprocessable_entity(req: &Request) -> Json<ErrorMessage> {
    let error_msg = match req.uri().path().segments().last() {
        Some("vote") => "Expected a body like {\"voteCast\": \"<option>\"}.",
        _ => "Expected a body like {\"question\": \"...\", \"options\": [\"...\"]}."
    };
    ErrorMessage::new(422, error_msg)
}

#[catch(500)]
pub fn internal_error(_req: &Request) -> Json<ErrorMessage> {
    ErrorMessage::new(500, "An internal server error occurred.")
}
