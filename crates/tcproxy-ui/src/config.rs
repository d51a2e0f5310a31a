//! Per-session configuration.

use std::fmt;

/// Environment variable that turns on verbose session tracing.
pub const DEBUG_ENV_VAR: &str = "TCPROXY_DEBUG";

/// Input type bits reported to the platform when a session starts.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputType(pub u32);

impl InputType {
    pub const NULL: InputType = InputType(0);
    pub const CLASS_TEXT: InputType = InputType(0x0000_0001);
    pub const VARIATION_NORMAL: InputType = InputType(0x0000_0000);
    pub const FLAG_MULTI_LINE: InputType = InputType(0x0002_0000);
    pub const FLAG_NO_SUGGESTIONS: InputType = InputType(0x0008_0000);
    /// Plain single-line text.
    pub const TEXT_NORMAL: InputType = InputType(Self::CLASS_TEXT.0 | Self::VARIATION_NORMAL.0);

    pub const fn union(self, other: InputType) -> InputType {
        InputType(self.0 | other.0)
    }

    pub const fn contains(self, other: InputType) -> bool {
        self.0 & other.0 == other.0
    }
}

impl Default for InputType {
    fn default() -> Self {
        InputType::TEXT_NORMAL
    }
}

impl fmt::Debug for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InputType({:#x})", self.0)
    }
}

/// Behaviour switches for an [`EditSession`](crate::EditSession).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// Strip `'\n'` from committed text and send one enter signal per
    /// stripped newline instead.
    pub filter_newlines: bool,
    pub input_type: InputType,
    /// Trace every responder call.
    pub verbose: bool,
}

impl SessionConfig {
    /// Defaults, with `verbose` taken from [`DEBUG_ENV_VAR`].
    pub fn from_env() -> Self {
        Self::default().with_verbose(std::env::var_os(DEBUG_ENV_VAR).is_some())
    }

    pub fn with_filter_newlines(mut self, filter_newlines: bool) -> Self {
        self.filter_newlines = filter_newlines;
        self
    }

    pub fn with_input_type(mut self, input_type: InputType) -> Self {
        self.input_type = input_type;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            filter_newlines: true,
            input_type: InputType::TEXT_NORMAL,
            verbose: false,
        }
    }
}
