//! Shared test infrastructure for the domain crates.
//!
//! - [`TestMongo`]: a disposable MongoDB container per test
//! - [`TestDataBuilder`]: reproducible ids, names, and emails seeded from
//!   the test name
//! - [`assertions`]: small helpers for clearer failure messages
//!
//! # Usage
//!
//! ```rust,no_run
//! use test_utils::{TestDataBuilder, TestMongo};
//!
//! #[tokio::test]
//! async fn my_mongo_test() {
//!     let mongo = TestMongo::new().await;
//!     let data = TestDataBuilder::from_test_name("my_test");
//!
//!     let user_id = data.user_id();
//!     let email = data.email("teammate");
//! }
//! ```

use uuid::Uuid;

mod mongo;

pub use mongo::TestMongo;

/// Deterministic test data derived from a seed.
///
/// Two builders with the same seed hand out identical values, so a failing
/// test reproduces with the same ids every run.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed from the test's own name; the usual entry point.
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let data = TestDataBuilder::from_test_name("test_create_event");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    fn uuid_from(&self, salt: u64) -> Uuid {
        let bytes = self.seed.wrapping_mul(salt).to_le_bytes();
        let mut uuid_bytes = [0u8; 16];
        uuid_bytes[..8].copy_from_slice(&bytes);
        uuid_bytes[8..16].copy_from_slice(&bytes);
        Uuid::from_bytes(uuid_bytes)
    }

    /// A user id stable for this seed
    pub fn user_id(&self) -> Uuid {
        self.uuid_from(1)
    }

    /// An event id stable for this seed, distinct from `user_id`
    pub fn event_id(&self) -> Uuid {
        self.uuid_from(31)
    }

    /// `test-{prefix}-{seed}-{suffix}`, unique across differently-seeded tests
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, suffix)
    }

    /// A campus email address unique to this seed, e.g. `lead-42@campus.test`
    pub fn email(&self, local: &str) -> String {
        format!("{}-{}@campus.test", local, self.seed)
    }
}

pub mod assertions {
    use uuid::Uuid;

    pub fn assert_uuid_eq(actual: Uuid, expected: Uuid, context: &str) {
        assert_eq!(
            actual, expected,
            "{}: expected UUID {}, got {}",
            context, expected, actual
        );
    }

    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }
}
