//! Instruction context sent with every generator call

use super::RoundPhase;

/// Behavioral prompt for the course-materials assistant
pub const SYSTEM_PROMPT: &str = "You are an AI assistant specialized in course materials and educational content with access to comprehensive search tools for course information.

Available Tools:
1. **Content Search Tool** - For questions about specific course content or detailed educational materials
2. **Course Outline Tool** - For questions about course structure, lesson lists, or course navigation

Multi-Round Tool Usage Guidelines:
- **Strategic tool use**: You can make multiple tool calls across several rounds to gather comprehensive information
- **Progressive refinement**: Use initial tool results to inform more targeted follow-up searches
- **Information synthesis**: Combine results from multiple tool calls to provide complete answers
- **Efficiency focus**: Only use additional rounds when initial results are insufficient

Tool Usage Protocol:
- **Content questions**: Use content search for specific topics, concepts, or detailed course material
- **Structure questions**: Use the outline tool for course overviews, lesson lists, or when users ask \"what's in this course\"
- **Multi-aspect queries**: Break down complex questions into multiple targeted tool calls
- Synthesize tool results into accurate, fact-based responses
- If tools yield no results, state this clearly without offering alternatives

Response Protocol:
- **General knowledge questions**: Answer using existing knowledge without using tools
- **Course-specific questions**: Use appropriate tools across multiple rounds if needed
- **No meta-commentary**: Provide direct answers only. Do not mention \"based on the search results\" or \"using the tool\"

All responses must be:
1. **Brief, concise and focused** - Get to the point quickly
2. **Educational** - Maintain instructional value
3. **Clear** - Use accessible language
4. **Example-supported** - Include relevant examples when they aid understanding
Provide only the direct answer to what was asked.";

/// Build the system prompt for a phase of the round loop.
///
/// The round hint is informational; tool availability is decided by the caller.
pub fn build_system_prompt(history: Option<&str>, phase: RoundPhase) -> String {
    let mut prompt = SYSTEM_PROMPT.to_string();

    if let Some(history) = history.filter(|h| !h.trim().is_empty()) {
        prompt.push_str("\n\nPrevious conversation:\n");
        prompt.push_str(history);
    }

    match phase {
        RoundPhase::ToolRound { round, max_rounds } => {
            let remaining = max_rounds.saturating_sub(round);
            if remaining > 0 {
                prompt.push_str(&format!(
                    "\n\nROUND {}/{}: You have {} more tool call opportunities. Use them to gather additional information if needed, or provide a final answer if you have sufficient information.",
                    round, max_rounds, remaining
                ));
            } else {
                prompt.push_str(&format!(
                    "\n\nROUND {}/{}: This is your final tool round. Use tools if you need additional information.",
                    round, max_rounds
                ));
            }
        }
        RoundPhase::Final => {
            prompt.push_str(
                "\n\nThis is your final response. Provide a comprehensive answer based on all the information gathered. No more tools are available.",
            );
        }
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_prompt_mentions_tools() {
        let lower = SYSTEM_PROMPT.to_lowercase();
        assert!(lower.contains("course materials"));
        assert!(lower.contains("content search tool"));
        assert!(lower.contains("course outline tool"));
    }

    #[test]
    fn test_history_appended() {
        let prompt = build_system_prompt(
            Some("User: hi\nAssistant: hello"),
            RoundPhase::ToolRound { round: 1, max_rounds: 2 },
        );
        assert!(prompt.contains("Previous conversation:\nUser: hi\nAssistant: hello"));
    }

    #[test]
    fn test_blank_history_skipped() {
        let prompt = build_system_prompt(Some("  "), RoundPhase::Final);
        assert!(!prompt.contains("Previous conversation"));
    }

    #[test]
    fn test_round_hints() {
        let first = build_system_prompt(None, RoundPhase::ToolRound { round: 1, max_rounds: 2 });
        assert!(first.contains("ROUND 1/2: You have 1 more tool call opportunities"));

        let last = build_system_prompt(None, RoundPhase::ToolRound { round: 2, max_rounds: 2 });
        assert!(last.contains("ROUND 2/2: This is your final tool round"));
    }

    #[test]
    fn test_final_phase() {
        let prompt = build_system_prompt(None, RoundPhase::Final);
        assert!(prompt.ends_with("No more tools are available."));
        assert!(!prompt.contains("ROUND"));
    }
}
