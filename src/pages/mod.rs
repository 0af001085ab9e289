// Headless view-models, one per page of the client.
//
// Each page owns the state its HTML counterpart would keep in the DOM and
// exposes the user actions as async methods.

pub mod auth;
pub mod posts;
pub mod profile;

pub use auth::AuthPage;
pub use posts::PostsPage;
pub use profile::ProfilePage;
