//! Integration tests for the Flux-Relay API live under `tests/`.
