use crate::http::request::Request;
use crate::http::response::Response;

pub type HandlerFunc = Box<dyn Fn(&Request) -> Response + Sync + Send>;
