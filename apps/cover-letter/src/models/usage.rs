use std::ops::Add;

use serde::{Deserialize, Serialize};

/// Best-effort usage for one request, summed over every stage that ran.
///
/// Both units are tracked: tokens as reported by the backend (0 when it
/// reports none) and characters counted locally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageCounters {
    pub total_tokens: u64,
    pub input_chars: u64,
    pub output_chars: u64,
}

impl UsageCounters {
    /// Usage of a single exchange.
    pub fn for_exchange(input: &str, output: &str, total_tokens: u64) -> Self {
        Self {
            total_tokens,
            input_chars: input.chars().count() as u64,
            output_chars: output.chars().count() as u64,
        }
    }

    pub fn combine(self, other: UsageCounters) -> UsageCounters {
        UsageCounters {
            total_tokens: self.total_tokens + other.total_tokens,
            input_chars: self.input_chars + other.input_chars,
            output_chars: self.output_chars + other.output_chars,
        }
    }

    pub fn total_chars(&self) -> u64 {
        self.input_chars + self.output_chars
    }
}

impl Add for UsageCounters {
    type Output = UsageCounters;

    fn add(self, rhs: UsageCounters) -> UsageCounters {
        self.combine(rhs)
    }
}

/// Caller-owned running total across requests in one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUsage {
    pub tokens: u64,
    pub chars: u64,
}

impl SessionUsage {
    pub fn record(&mut self, usage: &UsageCounters) {
        self.tokens += usage.total_tokens;
        self.chars += usage.total_chars();
    }
}
