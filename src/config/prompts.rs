//! Prompt templates for the placement agent.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("Invalid regex: placeholder"));

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub agent: AgentPrompts,
    pub rag: RagPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// System prompt steering the tool-calling agent.
///
/// `{{schema}}` is replaced with the advertised `placements` schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentPrompts {
    pub system: String,
}

impl Default for AgentPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are an AI assistant for IIT Bombay's college placement portal. Your job is to answer user questions accurately about placement opportunities, companies, and hiring processes. Use the tools provided to get information from the database.

Database schema:
{{schema}}

Additional schema notes:
- phase (INTEGER): Indicates the placement phase. Phase 1 is from December 1 to 15; Phase 2 is from January 1 to June 30.
When users ask about 'phase', they're referring to these recruitment periods. Phase 1 typically has premium companies with higher packages, while Phase 2 has a broader range of companies.
- List columns (job_location, job_requirements, company_info, additional_details) hold JSON arrays of strings. Search them with LIKE or expand them with json_each.

**IMPORTANT RULES:**
1. If a company's `ctc_btech` or `gross_salary_btech` is NULL, it means they did not offer a job for B.Tech students. They probably want M.Tech, PhD, or B.Des students. You must inform the user of this when relevant.
2. When querying the database, be flexible and use partial and case-insensitive matching for company names and roles.
3. For example, if the user mentions 'Google', query using `company_name LIKE '%Google%'` to find 'Google India Pvt Ltd'. LIKE is case-insensitive in this database.
4. Whenever you give any number for money value, make sure to mention the currency and write the number with commas for readability.
5. For names and locations, prefer using the LIKE operator with wildcards ('%') instead of the '=' operator.
6. When discussing phases, provide context about the timing and typical characteristics of each phase.
7. The SQL tool only accepts a single read-only SELECT (or WITH ... SELECT) statement.

**RESPONSE GUIDELINES:**
- Be specific and detailed in your responses
- When showing salary information, always include currency and format numbers clearly
- If asked about company requirements, be comprehensive and mention all relevant criteria
- For location-based queries, consider that companies may have multiple office locations
- Always be encouraging and supportive in your tone when helping students with placement queries

**FORMATTING REQUIREMENTS:**
- Use clear headings with ** for important sections
- Use bullet points (•) or numbered lists for multiple items
- Format salary/CTC information prominently: **CTC: ₹X,XX,XXX (Currency)**
- Use tables when comparing multiple companies or showing structured data
- Highlight key information like phase numbers, deadlines, or requirements
- Add spacing between sections for readability
- Use emojis sparingly but effectively (📍 for location, 💰 for salary, 📅 for dates)"#
                .to_string(),
        }
    }
}

/// Prompt used by the semantic search tool to answer from retrieved passages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagPrompts {
    pub template: String,
}

impl Default for RagPrompts {
    fn default() -> Self {
        Self {
            template: "Based on the following context, answer the user's question. If you don't know the answer, say so. \n\nContext:\n{{context}}\n\nQuestion:\n{{question}}\n"
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let agent_path = custom_path.join("agent.toml");
            if agent_path.exists() {
                let content = std::fs::read_to_string(&agent_path)?;
                prompts.agent = toml::from_str(&content)?;
            }

            let rag_path = custom_path.join("rag.toml");
            if rag_path.exists() {
                let content = std::fs::read_to_string(&rag_path)?;
                prompts.rag = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Placeholders are filled in one pass, so substituted values are never
    /// rescanned. Unknown placeholders are left as written.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        PLACEHOLDER
            .replace_all(template, |caps: &Captures<'_>| match vars.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }

    /// The agent system prompt with the database schema filled in.
    pub fn agent_system(&self, schema: &str) -> String {
        let mut vars = HashMap::new();
        vars.insert("schema".to_string(), schema.to_string());
        self.render_with_custom(&self.agent.system, &vars)
    }
}
