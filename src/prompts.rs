//! Prompt templates for the proxy and the agent services.
//!
//! The two services role-play different personas and keep separate
//! templates, even though both ask for the same terminal-style reply.

use crate::config::AgentIdentity;
use crate::llm::{ChatCompletionRequest, ChatMessage};

/// Upper bound on reply length
pub const MAX_TOKENS: u32 = 150;
/// Low sampling temperature so replies stay close to the format
pub const TEMPERATURE: f32 = 0.3;

pub const DEFAULT_AGENT_KIND: &str = "general";

pub fn proxy_system_prompt(id: &str, kind: &str) -> String {
    format!(
        "You are {id} Agent, a {kind} agent running inside an autonomous agent swarm on a \
         high-throughput blockchain. Answer as a terminal process would. Start every line \
         with \"[{id}] > \". Report what you are doing as two to four short log lines, then \
         finish with a single line that starts with \"[{id}] RESULT: \". Do not use markdown. \
         Keep the whole reply under 120 words."
    )
}

pub fn proxy_user_prompt(id: &str, query: &str) -> String {
    format!("Agent {id}, process the following request: {query}")
}

pub fn agent_system_prompt(identity: &AgentIdentity) -> String {
    format!(
        "You are {name}, agent {agent_id} of a decentralized agent swarm. {description} \
         Every query you answer is paid for in advance to your wallet {wallet}. Respond like \
         a terminal session: prefix each line with \"> \", print brief status logs of the \
         work you perform, and end with one line beginning \"> ANSWER: \". No markdown, no \
         apologies, fewer than 120 words.",
        name = identity.name,
        agent_id = identity.agent_id,
        description = identity.description,
        wallet = identity.wallet_address,
    )
}

pub fn agent_user_prompt(query: &str) -> String {
    format!("Query: {query}")
}

/// Build the two-message request the proxy sends upstream.
pub fn proxy_request(model: &str, id: &str, kind: &str, query: &str) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage::system(proxy_system_prompt(id, kind)),
            ChatMessage::user(proxy_user_prompt(id, query)),
        ],
        max_tokens: MAX_TOKENS,
        temperature: TEMPERATURE,
    }
}

/// Build the two-message request an agent service sends upstream.
pub fn agent_request(model: &str, identity: &AgentIdentity, query: &str) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage::system(agent_system_prompt(identity)),
            ChatMessage::user(agent_user_prompt(query)),
        ],
        max_tokens: MAX_TOKENS,
        temperature: TEMPERATURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proxy_request_role_plays_id_agent() {
        let req = proxy_request("grok-2-latest", "RL-7", "market-maker", "quote SOL/USDC");
        assert_eq!(req.model, "grok-2-latest");
        assert_eq!(req.max_tokens, 150);
        assert!((req.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(req.messages.len(), 2);

        assert_eq!(req.messages[0].role, "system");
        assert!(req.messages[0].content.starts_with("You are RL-7 Agent, a market-maker agent"));
        assert!(req.messages[0].content.contains("[RL-7] RESULT: "));

        assert_eq!(req.messages[1].role, "user");
        assert!(req.messages[1].content.contains("RL-7"));
        assert!(req.messages[1].content.ends_with("quote SOL/USDC"));
    }

    #[test]
    fn agent_request_uses_identity() {
        let identity = AgentIdentity {
            agent_id: "oracle-0042".to_string(),
            name: "Price Oracle".to_string(),
            description: "Aggregates price feeds.".to_string(),
            wallet_address: "So1anaWa11et".to_string(),
        };
        let req = agent_request("grok-2-latest", &identity, "what is the SOL price?");

        let system = &req.messages[0].content;
        assert!(system.starts_with("You are Price Oracle, agent oracle-0042"));
        assert!(system.contains("Aggregates price feeds."));
        assert!(system.contains("So1anaWa11et"));
        assert!(!system.contains("Price Oracle Agent"));
        assert_eq!(req.messages[1].content, "Query: what is the SOL price?");
    }

    #[test]
    fn templates_stay_distinct() {
        let identity = AgentIdentity::default();
        assert_ne!(
            proxy_system_prompt(&identity.agent_id, DEFAULT_AGENT_KIND),
            agent_system_prompt(&identity)
        );
    }
}
