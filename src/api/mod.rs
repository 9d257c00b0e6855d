pub mod services;

pub use services::links::link_routes;
pub use services::redirect::redirect_routes;
pub use services::users::user_routes;
