//! Test-only crate. Scenarios live under `tests/`, sharing `tests/helpers`.
