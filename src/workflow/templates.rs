/// Built-in node template catalog
///
/// The palette of node kinds a workflow can be assembled from. Templates carry
/// the default configuration a freshly dropped node starts with; the canvas
/// client renders them grouped by category.

use serde::Serialize;

use crate::workflow::types::{ConfigValue, NodeCategory, NodeConfig, NodeType};

/// Blueprint for a node kind in the library palette
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTemplate {
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub category: NodeCategory,
    pub name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub default_config: NodeConfig,
}

fn text(value: &str) -> ConfigValue {
    ConfigValue::Text(value.to_string())
}

fn number(value: u64) -> ConfigValue {
    ConfigValue::Number(value.into())
}

fn config<const N: usize>(entries: [(&str, ConfigValue); N]) -> NodeConfig {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

/// The full built-in template catalog, palette order
pub fn builtin_templates() -> Vec<NodeTemplate> {
    vec![
        NodeTemplate {
            node_type: NodeType::Trigger,
            category: NodeCategory::Triggers,
            name: "Webhook",
            icon: "Webhook",
            description: "Trigger on incoming webhook request",
            default_config: config([("url", text("")), ("method", text("POST"))]),
        },
        NodeTemplate {
            node_type: NodeType::Trigger,
            category: NodeCategory::Triggers,
            name: "Schedule",
            icon: "Clock",
            description: "Run on a recurring schedule",
            default_config: config([("cron", text("0 9 * * *")), ("timezone", text("UTC"))]),
        },
        NodeTemplate {
            node_type: NodeType::Trigger,
            category: NodeCategory::Triggers,
            name: "Manual",
            icon: "Play",
            description: "Manually trigger the workflow",
            default_config: NodeConfig::new(),
        },
        NodeTemplate {
            node_type: NodeType::Action,
            category: NodeCategory::Integrations,
            name: "HTTP Request",
            icon: "Globe",
            description: "Make an HTTP API call",
            default_config: config([
                ("url", text("")),
                ("method", text("GET")),
                ("headers", text("{}")),
                ("body", text("")),
            ]),
        },
        NodeTemplate {
            node_type: NodeType::Action,
            category: NodeCategory::Integrations,
            name: "Slack",
            icon: "MessageSquare",
            description: "Send message to Slack",
            default_config: config([("channel", text("")), ("message", text(""))]),
        },
        NodeTemplate {
            node_type: NodeType::Action,
            category: NodeCategory::Integrations,
            name: "Email",
            icon: "Mail",
            description: "Send an email",
            default_config: config([
                ("to", text("")),
                ("subject", text("")),
                ("body", text("")),
            ]),
        },
        NodeTemplate {
            node_type: NodeType::Action,
            category: NodeCategory::Data,
            name: "Transform",
            icon: "Shuffle",
            description: "Transform data with JavaScript",
            default_config: config([("code", text("return data;"))]),
        },
        NodeTemplate {
            node_type: NodeType::Action,
            category: NodeCategory::Data,
            name: "Filter",
            icon: "Filter",
            description: "Filter data based on conditions",
            default_config: config([("condition", text(""))]),
        },
        NodeTemplate {
            node_type: NodeType::Logic,
            category: NodeCategory::Logic,
            name: "Condition",
            icon: "GitBranch",
            description: "Branch based on conditions",
            default_config: config([
                ("condition", text("")),
                ("trueLabel", text("Yes")),
                ("falseLabel", text("No")),
            ]),
        },
        NodeTemplate {
            node_type: NodeType::Logic,
            category: NodeCategory::Logic,
            name: "Loop",
            icon: "Repeat",
            description: "Loop through array items",
            default_config: config([("arrayPath", text("data.items"))]),
        },
        NodeTemplate {
            node_type: NodeType::Logic,
            category: NodeCategory::Logic,
            name: "Delay",
            icon: "Timer",
            description: "Wait for specified duration",
            default_config: config([("seconds", number(5))]),
        },
        NodeTemplate {
            node_type: NodeType::Action,
            category: NodeCategory::Ai,
            name: "AI Prompt",
            icon: "Sparkles",
            description: "Generate text with AI",
            default_config: config([("prompt", text("")), ("model", text("gpt-4"))]),
        },
        NodeTemplate {
            node_type: NodeType::Action,
            category: NodeCategory::Ai,
            name: "AI Classify",
            icon: "Tags",
            description: "Classify content with AI",
            default_config: config([
                ("categories", ConfigValue::List(Vec::new())),
                ("inputPath", text("data.text")),
            ]),
        },
        NodeTemplate {
            node_type: NodeType::End,
            category: NodeCategory::Output,
            name: "Response",
            icon: "Send",
            description: "Return response to caller",
            default_config: config([("statusCode", number(200)), ("body", text("{}"))]),
        },
        NodeTemplate {
            node_type: NodeType::End,
            category: NodeCategory::Output,
            name: "Save to DB",
            icon: "Database",
            description: "Store data in database",
            default_config: config([("table", text("")), ("data", text("{}"))]),
        },
    ]
}
