//! Prompt text and the router tool schema.
//!
//! Every route description comes from [`RouteLabel::description`], so the
//! classifier, the fallback, and the specialists always agree on what each
//! route can do.

use switchyard_core::{RouteLabel, ToolDefinition};

/// Name of the forced-choice tool the classifier must call.
pub const ROUTER_TOOL_NAME: &str = "router";

/// System instruction for the classification call.
pub const CLASSIFIER_PROMPT: &str = "You're a highly helpful AI assistant, tasked with routing the user's query to the appropriate tool.
You should analyze the user's input, and choose the appropriate tool to use.";

/// `- name: description` lines for the specialized routes.
pub fn specialized_descriptions() -> String {
    RouteLabel::specialized()
        .map(|r| format!("- {}: {}", r.as_str(), r.description()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Description of the `route` argument: every specialized route plus the catch-all.
fn route_argument_description() -> String {
    let catch_all = RouteLabel::ALL
        .into_iter()
        .filter(|r| r.is_catch_all())
        .map(|r| format!("- {}: {}", r.as_str(), r.description()))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "The route to take based on the user's input.\n{}\n{}\n",
        specialized_descriptions(),
        catch_all
    )
}

/// The single tool offered to the classifier.
///
/// Its only argument is an enum of every route label, so a well-behaved
/// oracle cannot answer with anything but one of them.
pub fn router_tool() -> ToolDefinition {
    let labels: Vec<&str> = RouteLabel::ALL.iter().map(|r| r.as_str()).collect();

    ToolDefinition {
        name: ROUTER_TOOL_NAME.into(),
        description: "A tool to route the user's query to the appropriate tool.".into(),
        parameters: serde_json::json!({
            "type": "object",
            "properties": {
                "route": {
                    "type": "string",
                    "enum": labels,
                    "description": route_argument_description(),
                }
            },
            "required": ["route"],
            "additionalProperties": false,
        }),
    }
}

/// System instruction for the catch-all conversational reply.
pub fn general_input_prompt() -> String {
    format!(
        "You are an AI assistant.\nIf the user asks what you can do, describe these tools. Otherwise, just answer as normal.\n\n{}",
        specialized_descriptions()
    )
}

/// Built-in persona for an LLM-backed specialist.
pub fn specialist_prompt(route: RouteLabel) -> String {
    match route {
        RouteLabel::Stockbroker => format!(
            "You are a stockbroker assistant. Capabilities: {}.\n\
            Answer the user's latest request about tickers, trades, or their portfolio. \
            Never claim a trade was executed unless the conversation shows it was.",
            route.description()
        ),
        RouteLabel::TripPlanner => format!(
            "You are a trip planning assistant. Capabilities: {}\n\
            Ask for the location and dates if they are missing, then suggest concrete options.",
            route.description()
        ),
        RouteLabel::GeneralInput => general_input_prompt(),
    }
}
