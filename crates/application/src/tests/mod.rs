//! Shared test doubles for the gateway and auth service tests.
