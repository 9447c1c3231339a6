use crate::config::PromptConfig;
use crate::domain::portfolio::PortfolioLine;
use crate::llm::ChatPrompt;

const USER_INPUT_PLACEHOLDER: &str = "{user_input}";

/// Renders the analysis prompt from configured templates. Pure; the
/// templates come from the immutable startup config.
pub struct AnalysisRequestBuilder<'a> {
    prompts: &'a PromptConfig,
}

impl<'a> AnalysisRequestBuilder<'a> {
    pub fn new(prompts: &'a PromptConfig) -> Self {
        Self { prompts }
    }

    pub fn build(&self, stocks: &[PortfolioLine], instructions: &str) -> ChatPrompt {
        let portfolio = stocks
            .iter()
            .map(|line| {
                format!(
                    "- {}: {} shares @ ${:.2}",
                    line.ticker, line.quantity, line.price
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        let user_input = format!("User Instructions:\n{instructions}\n\nPortfolio:\n{portfolio}");

        ChatPrompt {
            system: self.prompts.system.clone(),
            user: self
                .prompts
                .analysis_template
                .replace(USER_INPUT_PLACEHOLDER, &user_input),
        }
    }
}
