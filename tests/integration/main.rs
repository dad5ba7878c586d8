//! Integration tests: the REST client and the session against a stub backend.

mod helpers;

mod client_test;
mod session_test;
