/// What a rule looks for in the lower-cased input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Any of the phrases occurs as a substring.
    AnyOf(&'static [&'static str]),
    /// Fewer than `n` characters.
    ShorterThan(usize),
    Always,
}

impl Trigger {
    fn matches(&self, input: &str) -> bool {
        match self {
            Trigger::AnyOf(phrases) => phrases.iter().any(|p| input.contains(p)),
            Trigger::ShorterThan(n) => input.chars().count() < *n,
            Trigger::Always => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Canned(&'static str),
    /// Reports the server's wall clock.
    ServerTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseRule {
    pub name: &'static str,
    pub trigger: Trigger,
    pub reply: Reply,
}

/// Evaluated top to bottom; the first match wins. Order is significant.
pub const RULES: &[ResponseRule] = &[
    ResponseRule {
        name: "test",
        trigger: Trigger::AnyOf(&["test"]),
        reply: Reply::Canned(
            "This is a test response. I'm a mock assistant running in a demonstration \
             environment. I can simulate responses, but I'm not connected to a live model \
             at the moment.",
        ),
    },
    ResponseRule {
        name: "greeting",
        trigger: Trigger::AnyOf(&["hello", "hi "]),
        reply: Reply::Canned(
            "Hello there! I'm a simulated assistant. How can I help you today? Note that \
             this is a demonstration mode, not connected to the live API.",
        ),
    },
    ResponseRule {
        name: "help",
        trigger: Trigger::AnyOf(&["help"]),
        reply: Reply::Canned(
            "I can help with answering questions, explaining concepts, or assisting with \
             writing. What would you like help with? (This is a mock reply.)",
        ),
    },
    ResponseRule {
        name: "weather",
        trigger: Trigger::AnyOf(&["weather"]),
        reply: Reply::Canned(
            "I don't have access to real-time weather data in mock mode. A live model could \
             help interpret weather data you provide, but has no direct feed of current \
             conditions.",
        ),
    },
    ResponseRule {
        name: "time",
        trigger: Trigger::AnyOf(&["time"]),
        reply: Reply::ServerTime,
    },
    ResponseRule {
        name: "api_key",
        trigger: Trigger::AnyOf(&["api key"]),
        reply: Reply::Canned(
            "The upstream credential is read from the relay's configuration. In mock mode no \
             request leaves the server, so the key is never used.",
        ),
    },
    ResponseRule {
        name: "endpoint",
        trigger: Trigger::AnyOf(&["endpoint"]),
        reply: Reply::Canned(
            "The upstream endpoint is set with --upstream-url or CHATRELAY_UPSTREAM_URL. \
             Point it at the base URL of the remote conversation API.",
        ),
    },
    ResponseRule {
        name: "model",
        trigger: Trigger::AnyOf(&["model"]),
        reply: Reply::Canned(
            "Several models are supported, from lighter and faster to the most capable. \
             Pick one per message; a conversation remembers the last model you chose.",
        ),
    },
    ResponseRule {
        name: "capabilities",
        trigger: Trigger::AnyOf(&["what can you do"]),
        reply: Reply::Canned(
            "A live model can write, edit, summarize, translate, answer questions, brainstorm \
             and help with code. This mock only demonstrates the conversation flow.",
        ),
    },
    ResponseRule {
        name: "repository",
        trigger: Trigger::AnyOf(&["github", "repo"]),
        reply: Reply::Canned(
            "This project is a relay between a chat UI and a remote model API. Fork it and \
             point it at your own upstream to go live.",
        ),
    },
    ResponseRule {
        name: "too_short",
        trigger: Trigger::ShorterThan(10),
        reply: Reply::Canned(
            "I noticed your message was quite short. Could you provide more details so I can \
             give you a more helpful response?",
        ),
    },
    ResponseRule {
        name: "fallback",
        trigger: Trigger::Always,
        reply: Reply::Canned(
            "Thank you for your message. With a live upstream you would get a considered \
             answer here; this mock has a limited set of replies.",
        ),
    },
];

/// Deterministic keyword-driven replies for running without network access.
pub struct MockResponseGenerator {
    rules: &'static [ResponseRule],
}

impl Default for MockResponseGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl MockResponseGenerator {
    pub fn new() -> Self {
        Self { rules: RULES }
    }

    /// The rule that answers `content`. The table ends with a catch-all.
    pub fn matching_rule(&self, content: &str) -> &'static ResponseRule {
        let input = content.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.trigger.matches(&input))
            .unwrap_or(&RULES[RULES.len() - 1])
    }

    pub fn generate(&self, content: &str) -> String {
        match self.matching_rule(content).reply {
            Reply::Canned(text) => text.to_string(),
            Reply::ServerTime => format!(
                "The current time according to the server is {}. This is based on the \
                 server's clock.",
                chrono::Local::now().format("%H:%M:%S")
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(content: &str) -> &'static str {
        MockResponseGenerator::new().matching_rule(content).name
    }

    #[test]
    fn greeting_rule_matches_hello() {
        let generator = MockResponseGenerator::new();
        let first = generator.generate("hello there");
        let second = generator.generate("hello there");

        assert_eq!(rule("hello there"), "greeting");
        assert_eq!(first, second);
        assert!(first.starts_with("Hello there!"));
    }

    #[test]
    fn very_short_input_gets_too_short_reply() {
        assert_eq!(rule("xy"), "too_short");
        assert_eq!(rule("xy"), "too_short");
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(rule("HELLO, who are you?"), "greeting");
        assert_eq!(rule("Tell me the WEATHER today"), "weather");
    }

    #[test]
    fn earlier_rules_take_precedence() {
        // Contains both "test" and "hello"; "test" is listed first.
        assert_eq!(rule("hello, this is a test"), "test");
        // Short but keyword-bearing input never reaches the length rule.
        assert_eq!(rule("help"), "help");
    }

    #[test]
    fn hi_requires_trailing_space() {
        assert_eq!(rule("hi there friend"), "greeting");
        assert_eq!(rule("this is something"), "fallback");
    }

    #[test]
    fn long_unmatched_input_falls_back() {
        assert_eq!(rule("Explain recursion please"), "fallback");
    }

    #[test]
    fn time_reply_reports_clock() {
        let reply = MockResponseGenerator::new().generate("what time is it?");
        assert!(reply.starts_with("The current time according to the server is"));
    }

    #[test]
    fn table_ends_with_catch_all() {
        assert_eq!(RULES.last().map(|r| r.trigger), Some(Trigger::Always));
    }
}
