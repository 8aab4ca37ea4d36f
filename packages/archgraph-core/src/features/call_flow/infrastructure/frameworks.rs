//! Framework registration idioms
//!
//! Two tables:
//! - `FRAMEWORK_PATTERNS`: call shapes that register an entry point, per framework key
//! - `MODULE_FRAMEWORKS` / `IMPORT_FRAMEWORKS`: module path prefixes that reveal a framework

use lazy_static::lazy_static;

use crate::config::{CustomCallPattern, CustomFrameworkConfig};
use crate::features::call_flow::domain::{DetectedFrameworks, HttpMethod};
use crate::shared::models::{RawCall, RawFunc, RawProject};

/// Call-expression shape that registers an entry point
#[derive(Debug, Clone, PartialEq)]
pub struct CallPattern {
    /// Exact callee name
    pub method: Option<String>,
    /// Callee name suffix (gRPC `Register*Server`)
    pub method_suffix: Option<String>,
    /// Substring of the receiver type; only checked when the receiver is known
    pub receiver_contains: Option<String>,
    pub protocol: String,
    pub http_method: Option<HttpMethod>,
    pub path_arg: usize,
    pub handler_arg: usize,
}

impl CallPattern {
    fn exact(method: &str, protocol: &str) -> Self {
        Self {
            method: Some(method.to_string()),
            method_suffix: None,
            receiver_contains: None,
            protocol: protocol.to_string(),
            http_method: None,
            path_arg: 0,
            handler_arg: 1,
        }
    }

    fn http(method: &str, verb: HttpMethod) -> Self {
        Self {
            http_method: Some(verb),
            ..Self::exact(method, "http")
        }
    }

    fn on_receiver(mut self, receiver: &str) -> Self {
        self.receiver_contains = Some(receiver.to_string());
        self
    }

    fn suffix(suffix: &str, protocol: &str) -> Self {
        Self {
            method: None,
            method_suffix: Some(suffix.to_string()),
            ..Self::exact("", protocol)
        }
    }

    pub fn from_custom(pattern: &CustomCallPattern, protocol: &str) -> Self {
        Self {
            method: pattern.method.clone(),
            method_suffix: pattern.method_suffix.clone(),
            receiver_contains: pattern.receiver_contains.clone(),
            protocol: protocol.to_string(),
            http_method: None,
            path_arg: pattern.path_arg_index.unwrap_or(0),
            handler_arg: pattern.handler_arg_index.unwrap_or(1),
        }
    }

    pub fn matches(&self, call: &RawCall) -> bool {
        if let Some(method) = &self.method {
            if call.function_name != *method {
                return false;
            }
        }
        if let Some(suffix) = &self.method_suffix {
            if !call.function_name.ends_with(suffix.as_str()) {
                return false;
            }
        }
        match (&self.receiver_contains, &call.receiver_type) {
            (Some(needle), Some(receiver)) => receiver.contains(needle.as_str()),
            _ => true,
        }
    }

    fn is_receiver_constrained(&self) -> bool {
        self.receiver_contains.is_some()
    }
}

/// Pattern tagged with the framework key that owns it
#[derive(Debug, Clone, PartialEq)]
pub struct ActivePattern {
    pub framework: String,
    pub pattern: CallPattern,
}

fn verbs(names: [&str; 5]) -> Vec<CallPattern> {
    let methods = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
    ];
    names
        .iter()
        .zip(methods)
        .map(|(name, verb)| CallPattern::http(name, verb))
        .collect()
}

lazy_static! {
    /// Built-in registration idioms, in table order
    pub static ref FRAMEWORK_PATTERNS: Vec<(&'static str, Vec<CallPattern>)> = {
        let mut gin = verbs(["GET", "POST", "PUT", "DELETE", "PATCH"]);
        gin.push(CallPattern::http("Any", HttpMethod::Any));

        vec![
            (
                "net/http",
                vec![
                    CallPattern::exact("HandleFunc", "http"),
                    CallPattern::exact("Handle", "http"),
                ],
            ),
            ("gin", gin),
            (
                "gorilla/mux",
                vec![
                    CallPattern::exact("Handle", "http").on_receiver("mux.Router"),
                    CallPattern::exact("HandleFunc", "http").on_receiver("mux.Router"),
                ],
            ),
            ("echo", verbs(["GET", "POST", "PUT", "DELETE", "PATCH"])),
            ("chi", verbs(["Get", "Post", "Put", "Delete", "Patch"])),
            ("cobra", vec![CallPattern::exact("AddCommand", "cli")]),
            ("grpc", vec![CallPattern::suffix("Server", "grpc")]),
            ("kafka-go", vec![CallPattern::exact("ConsumePartition", "message")]),
            ("sarama", vec![CallPattern::exact("ConsumePartition", "message")]),
            (
                "nats",
                vec![
                    CallPattern::exact("Subscribe", "message"),
                    CallPattern::exact("QueueSubscribe", "message"),
                ],
            ),
            (
                "cron",
                vec![
                    CallPattern::exact("AddFunc", "scheduler"),
                    CallPattern::exact("AddJob", "scheduler"),
                ],
            ),
        ]
    };

    /// Module requirement / import prefix -> framework key
    static ref MODULE_FRAMEWORKS: Vec<(&'static str, &'static str)> = vec![
        ("github.com/gin-gonic/gin", "gin"),
        ("github.com/labstack/echo", "echo"),
        ("github.com/go-chi/chi", "chi"),
        ("github.com/gorilla/mux", "gorilla/mux"),
        ("github.com/gofiber/fiber", "fiber"),
        ("google.golang.org/grpc", "grpc"),
        ("github.com/spf13/cobra", "cobra"),
        ("github.com/urfave/cli", "urfave/cli"),
        ("github.com/segmentio/kafka-go", "kafka-go"),
        ("github.com/Shopify/sarama", "sarama"),
        ("github.com/IBM/sarama", "sarama"),
        ("github.com/nats-io/nats.go", "nats"),
        ("github.com/robfig/cron", "cron"),
    ];

    /// Frameworks only recognisable from import paths
    static ref IMPORT_FRAMEWORKS: Vec<(&'static str, &'static str)> = vec![
        ("github.com/beego/beego", "beego"),
        ("github.com/cloudwego/hertz", "hertz"),
        ("github.com/kataras/iris", "iris"),
        ("github.com/confluentinc/confluent-kafka-go", "confluent-kafka"),
    ];
}

fn has_prefix(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .map_or(false, |rest| rest.starts_with('/'))
}

/// Patterns for the active frameworks plus the custom ones.
///
/// Receiver-constrained patterns come first so that `r.HandleFunc` on a
/// `*mux.Router` is attributed to gorilla/mux rather than net/http.
pub fn active_patterns(
    detected: &DetectedFrameworks,
    custom: &[CustomFrameworkConfig],
) -> Vec<ActivePattern> {
    let mut active: Vec<ActivePattern> = Vec::new();
    for key in detected.iter() {
        if let Some((_, patterns)) = FRAMEWORK_PATTERNS.iter().find(|(k, _)| *k == key) {
            active.extend(patterns.iter().map(|p| ActivePattern {
                framework: key.to_string(),
                pattern: p.clone(),
            }));
        }
    }
    for framework in custom {
        active.extend(framework.patterns.iter().map(|p| ActivePattern {
            framework: framework.name.clone(),
            pattern: CallPattern::from_custom(p, &framework.protocol),
        }));
    }
    // stable: table order is kept within each group
    active.sort_by_key(|a| !a.pattern.is_receiver_constrained());
    active
}

/// Finds the frameworks a project uses
#[derive(Debug, Clone, Default)]
pub struct FrameworkDetector;

impl FrameworkDetector {
    pub fn new() -> Self {
        Self
    }

    /// `net/http` always, then module requirements, import paths and signatures
    pub fn detect(&self, project: &RawProject) -> DetectedFrameworks {
        let mut found = DetectedFrameworks::new();
        found.insert("net/http");

        for require in &project.requires {
            Self::scan(&require.path, &MODULE_FRAMEWORKS, &mut found);
        }

        for pkg in &project.packages {
            for import in &pkg.imports {
                Self::scan(&import.path, &MODULE_FRAMEWORKS, &mut found);
                Self::scan(&import.path, &IMPORT_FRAMEWORKS, &mut found);
            }
        }

        for pkg in &project.packages {
            if pkg.name == "main" {
                found.insert("main");
            }
            let serves_http = pkg
                .structs
                .iter()
                .flat_map(|s| s.methods.iter())
                .any(Self::is_serve_http);
            if serves_http {
                found.insert("serve-http");
            }
        }

        found
    }

    fn scan(path: &str, table: &[(&'static str, &'static str)], found: &mut DetectedFrameworks) {
        for (prefix, key) in table {
            if has_prefix(path, prefix) {
                found.insert(*key);
            }
        }
    }

    /// `ServeHTTP(http.ResponseWriter, *http.Request)`
    fn is_serve_http(method: &RawFunc) -> bool {
        if method.name != "ServeHTTP" || method.parameters.len() != 2 {
            return false;
        }
        let writer = &method.parameters[0].type_name;
        let request = &method.parameters[1].type_name;
        (writer == "http.ResponseWriter" || writer.ends_with(".ResponseWriter"))
            && (request == "*http.Request" || request.ends_with(".Request"))
    }
}
