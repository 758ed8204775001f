//! Prompt construction: function schemas rendered as Python declarations,
//! wrapped in a system preamble and a ChatML conversation.
pub mod chat_template;
pub mod schema;
pub mod signature;

use anyhow::Result;

use crate::config::ChatMarkers;

pub use chat_template::{ChatMessage, ChatTemplateProcessor, CHATML_TEMPLATE};
pub use schema::{FunctionInput, FunctionSchema, ParameterSchema, ParametersSchema};
pub use signature::{format_signature, format_signatures, python_type};

/// Builtins the model is told it cannot use
pub const RESTRICTED_BUILTINS: [&str; 8] = [
    "exec",
    "eval",
    "execfile",
    "compile",
    "importlib",
    "__import__",
    "input",
    "exit",
];

const PREAMBLE_INTRO: &str = "You are an expert AI assistant that specializes in providing Python code to solve the task/problem at hand provided by the user.

You can use Python code freely, including the following available functions:

<|functions_schema|>
";

const PREAMBLE_OUTRO: &str = "
Think step by step and provide your reasoning, outside of the function calls.
You can write Python code and use the available functions. Provide all your python code in a SINGLE markdown code block like the following:

```python
result = example_function(arg1, \"string\")
result2 = example_function2(result, arg2)
```

DO NOT use print() statements AT ALL. Avoid mutating variables whenever possible.";

/// System prompt listing the available functions and the restricted builtins
pub fn system_prompt(functions: &[FunctionSchema]) -> String {
    let mut prompt = String::from(PREAMBLE_INTRO);
    let signatures = format_signatures(functions);
    prompt.push_str(&signatures);
    // Each declaration ends with a newline, leaving a blank line before the end marker
    if !signatures.is_empty() {
        prompt.push('\n');
    }
    prompt.push_str("\n<|end_functions_schema|>\n\n");
    prompt.push_str("The following dangerous builtins are restricted for security:\n");
    for builtin in RESTRICTED_BUILTINS {
        prompt.push_str("- ");
        prompt.push_str(builtin);
        prompt.push('\n');
    }
    prompt.push_str(PREAMBLE_OUTRO);
    prompt
}

/// Builds the full generation prompt for a conversation
#[derive(Debug, Clone, Default)]
pub struct PromptFormatter {
    processor: ChatTemplateProcessor,
}

impl PromptFormatter {
    pub fn new(markers: ChatMarkers) -> Self {
        Self {
            processor: ChatTemplateProcessor::chatml(markers),
        }
    }

    pub fn with_processor(processor: ChatTemplateProcessor) -> Self {
        Self { processor }
    }

    /// System turn, then every message, then an open assistant turn
    pub fn format_prompt(
        &self,
        messages: &[ChatMessage],
        functions: &FunctionInput,
    ) -> Result<String> {
        let mut turns = Vec::with_capacity(messages.len() + 1);
        turns.push(ChatMessage::system(system_prompt(functions.as_slice())));
        turns.extend_from_slice(messages);
        self.processor.apply_chat_template(&turns, true)
    }
}
