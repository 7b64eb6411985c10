use super::DebateRole;

/// Persona for each side. `points` is the number of points each side makes.
pub fn system_prompt(role: DebateRole, points: usize) -> String {
    match role {
        DebateRole::Opponent => format!(
            "You are a sophisticated debater arguing against the topic of the research paper. \
             Your goal is to be polite and highlight logical flaws, unproven claims, and \
             methodological weaknesses. You must provide exactly {} distinct points before providing a conclusion. \
             Focus solely on the provided chat history to form your arguments.",
            points
        ),
        DebateRole::Proponent => format!(
            "You are a sophisticated debater arguing in support of the research paper. \
             Your goal is to be polite and highlight the key strengths of the paper, \
             such as its innovative approach, compelling data, and clear findings. \
             Counter the other debater's arguments point by point. You must provide exactly {} distinct \
             points before concluding. Focus solely on the provided chat history.",
            points
        ),
    }
}

/// First turn of the shared history.
pub fn paper_turn(paper: &str) -> String {
    format!("Analyze the following research paper content:\n\n{}", paper)
}

pub fn point_prompt(role: DebateRole, index: usize) -> String {
    match role {
        DebateRole::Opponent => format!(
            "Provide point {} against the research paper based on the content. Be succinct and logical.",
            index
        ),
        DebateRole::Proponent => format!(
            "Provide point {} in support of the research paper, countering Agent A's previous points. Be succinct and logical.",
            index
        ),
    }
}

pub fn conclusion_prompt(role: DebateRole) -> &'static str {
    match role {
        DebateRole::Opponent => {
            "Please provide your final conclusion summarizing your points against the paper."
        }
        DebateRole::Proponent => {
            "Please provide your final conclusion summarizing your points in support of the paper."
        }
    }
}

pub const JUDGE_SYSTEM_PROMPT: &str = "You are an impartial chair of a peer-review panel. \
     You have read a research paper and a debate between a critical reviewer (Agent A) \
     and a supporting researcher (Agent B). Judge which side argued more convincingly \
     and whether the paper meets the standard of a publishable research paper.";

pub fn judge_prompt(opponent_conclusion: &str, proponent_conclusion: &str) -> String {
    format!(
        "Agent A's final statement:\n{}\n\n\
         Agent B's final statement:\n{}\n\n\
         Reply with only a JSON object of the form \
         {{\"winner\": \"critical\" or \"pro\", \"final_decision\": \"PASS\" or \"FAIL\", \
         \"final_score\": a number from 0 to 100, \"winning_reasoning\": \"one paragraph\"}}.",
        opponent_conclusion, proponent_conclusion
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_system_prompts_mention_five_points() {
        assert!(system_prompt(DebateRole::Opponent, 5).contains("exactly 5 distinct points"));
        assert!(system_prompt(DebateRole::Proponent, 5).contains("exactly 5 distinct points"));
    }

    #[test]
    fn test_point_prompts() {
        assert_eq!(
            point_prompt(DebateRole::Opponent, 3),
            "Provide point 3 against the research paper based on the content. Be succinct and logical."
        );
        assert!(point_prompt(DebateRole::Proponent, 1).contains("countering Agent A's previous points"));
    }

    #[test]
    fn test_judge_prompt_is_json_shaped() {
        let prompt = judge_prompt("A", "B");
        assert!(prompt.contains("{\"winner\""));
        assert!(prompt.contains("Agent A's final statement:\nA"));
    }
}
