//! CLI integration tests driving a fake `cmake`.

mod common;
