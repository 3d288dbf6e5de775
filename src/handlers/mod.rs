// Handlers decode requests, call the repository and encode responses.
// Every failure is returned as an `ApiError`; the repository never writes
// responses itself.
pub mod health;
pub mod services;
pub mod utils;
