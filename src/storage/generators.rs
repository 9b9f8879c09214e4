//! Object id generators
//!
//! A generator produces new ids and validates ids supplied by clients
//! against its pattern. Every generator is checked once when it is built:
//! a sample id must satisfy the generator's own pattern.

use std::fmt;
use std::sync::Arc;

use rand::distributions::Alphanumeric as AlphanumericChars;
use rand::Rng;
use regex::Regex;
use uuid::Uuid;

use super::errors::{ConfigError, ConfigResult, GeneratorError, GeneratorResult};

/// Pattern accepted by the base generator
pub const DEFAULT_ID_PATTERN: &str = r"^[a-zA-Z0-9][a-zA-Z0-9_-]*$";

/// Any syntactically valid UUID; version and variant nibbles are not checked
pub const UUID4_PATTERN: &str =
    r"^[a-fA-F0-9]{8}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{12}$";

const ALPHANUMERIC_LENGTH: usize = 12;

/// Produces and validates object ids
pub trait IdGenerator: Send + Sync {
    /// Returns a fresh id
    fn generate(&self) -> String;

    /// Pattern every valid id matches
    fn regexp(&self) -> &Regex;

    /// Returns true if `id` is acceptable to this generator
    fn matches(&self, id: &str) -> bool {
        self.regexp().is_match(id)
    }
}

/// Checks that a generator's output satisfies its own pattern
pub fn checked<G: IdGenerator>(generator: G) -> GeneratorResult<G> {
    let sample = generator.generate();
    if !generator.matches(&sample) {
        return Err(GeneratorError::Mismatch {
            id: sample,
            pattern: generator.regexp().as_str().to_string(),
        });
    }
    Ok(generator)
}

fn compile(pattern: &str) -> GeneratorResult<Regex> {
    Regex::new(pattern).map_err(|source| GeneratorError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Random version 4 UUIDs
pub struct Uuid4 {
    regexp: Regex,
}

impl Uuid4 {
    pub fn new() -> GeneratorResult<Self> {
        checked(Self {
            regexp: compile(UUID4_PATTERN)?,
        })
    }
}

impl IdGenerator for Uuid4 {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }

    fn regexp(&self) -> &Regex {
        &self.regexp
    }
}

/// Short random alphanumeric ids validated by the base pattern
pub struct Alphanumeric {
    length: usize,
    regexp: Regex,
}

impl Alphanumeric {
    pub fn new() -> GeneratorResult<Self> {
        Self::with_length(ALPHANUMERIC_LENGTH)
    }

    pub fn with_length(length: usize) -> GeneratorResult<Self> {
        checked(Self {
            length,
            regexp: compile(DEFAULT_ID_PATTERN)?,
        })
    }
}

impl IdGenerator for Alphanumeric {
    fn generate(&self) -> String {
        rand::thread_rng()
            .sample_iter(&AlphanumericChars)
            .take(self.length)
            .map(char::from)
            .collect()
    }

    fn regexp(&self) -> &Regex {
        &self.regexp
    }
}

/// Generator backed by a closure and an explicit pattern
pub struct FnGenerator<F> {
    generate: F,
    regexp: Regex,
}

impl<F> FnGenerator<F>
where
    F: Fn() -> String + Send + Sync,
{
    pub fn new(pattern: &str, generate: F) -> GeneratorResult<Self> {
        checked(Self {
            generate,
            regexp: compile(pattern)?,
        })
    }
}

impl<F> IdGenerator for FnGenerator<F>
where
    F: Fn() -> String + Send + Sync,
{
    fn generate(&self) -> String {
        (self.generate)()
    }

    fn regexp(&self) -> &Regex {
        &self.regexp
    }
}

impl<F> fmt::Debug for FnGenerator<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnGenerator")
            .field("regexp", &self.regexp.as_str())
            .finish()
    }
}

/// Resolves a configured generator name
pub fn from_name(name: &str) -> ConfigResult<Arc<dyn IdGenerator>> {
    match name {
        "uuid4" => Ok(Arc::new(Uuid4::new()?)),
        "alphanumeric" => Ok(Arc::new(Alphanumeric::new()?)),
        other => Err(ConfigError::UnknownIdGenerator(other.to_string())),
    }
}
