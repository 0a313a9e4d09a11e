//! Prompt templates for the financial-advisor persona.

pub const CONTEXT_HEADER: &str = "Context from finance docs:";

/// Join chunk texts nearest-first, separated by a blank line.
pub fn join_context<'a, I>(chunks: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    chunks.into_iter().collect::<Vec<_>>().join("\n\n")
}

pub fn grounded_prompt(context: &str, question: &str) -> String {
    format!(
        "You are a financial advisor chatbot.\n\
         Use the following documents to answer user queries accurately.\n\
         \n\
         {CONTEXT_HEADER}\n\
         {context}\n\
         \n\
         User question:\n\
         {question}\n\
         \n\
         Provide a clear, practical answer.\n"
    )
}

pub fn fallback_prompt(question: &str) -> String {
    format!(
        "You are a financial advisor chatbot. Answer the question clearly.\n\
         \n\
         User question:\n\
         {question}\n"
    )
}
