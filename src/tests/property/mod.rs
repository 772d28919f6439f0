//! Property-based tests
//!
//! Invariants that must hold for all inputs, using proptest.
//!
//! ## Test Modules
//!
//! - `sizing_props`: composer box sizing
//!   - Width always within the configured bounds
//!   - Narrow text pins to the minimum width
//!   - Height never exceeds the cap; scrolling exactly when content is taller
//!
//! - `stream_props`: NDJSON stream decoding
//!   - Output is independent of how the byte stream is chunked
//!   - A final record without a trailing newline is still delivered
//!   - Malformed lines never drop the valid lines around them
//!
//! ## Configuration
//!
//! By default, proptest runs 256 cases per property. This can be configured
//! via the `PROPTEST_CASES` environment variable:
//!
//! ```sh
//! PROPTEST_CASES=1000 cargo test property --release
//! ```

mod sizing_props;
