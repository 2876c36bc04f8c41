//! Instruction templates sent to the language model

use crate::store::QueryMatch;

const SEPARATOR_WIDTH: usize = 60;

/// Wraps a raw user message in the keyword-extraction instruction
pub fn keyword_prompt(message: &str) -> String {
    format!(
        "can you generate keywords for courses that suit the user prompt. Keep it very brief, \
         just a list of keywords. Use information from the prompt to infer what the user may \
         like. If the user prompt can not be related to coursework, just reply back with the \
         user prompt. User prompt: {message}**PLEASE ONLY RESPOND WITH VERY BASIC KEYWORDS** \
         If the user prompt seems like a reply to something, please just respond back with the \
         user prompt, and do not generate a list"
    )
}

/// Concatenate relevant matches into the labeled course block
pub fn context_block(matches: &[QueryMatch]) -> String {
    let separator = "=".repeat(SEPARATOR_WIDTH);
    matches
        .iter()
        .map(|m| {
            let name = m
                .metadata
                .get("name")
                .map(String::as_str)
                .unwrap_or(crate::corpus::UNKNOWN);
            format!(
                "Matched Course: {}\nCourse Details:\n {}\n {}\n",
                name, m.document, separator
            )
        })
        .collect()
}

/// Instruction for answering from retrieved course data
pub fn grounded_prompt(block: &str, query: &str) -> String {
    format!(
        "You are an RMIT Chatbot. Only provide information that an RMIT chatbot would, such as \
         course information. Speak in plain text. The students know that you are an rmit \
         chatbot, so there is no need to specify. Include specific course details such as \
         ATAR, pathways etc, repeating for more course options if required. Use the following \
         results to provide a response to the student query.\n {block} **IF THE STUDENT QUERY \
         IS CONVERSATIONAL, MAKE BRIEF CONVERSATION BUT STEER IT TOWARDS COURSE HELP**. If you \
         get the data, please respond with details such as ATAR and other \
         requirements/information. Student Query: {query}. If the original student query \
         doesn't have any information about what kind of course might be good for them, \
         respond to them briefly with no course data, and prompt for them to provide you with \
         more information"
    )
}

/// Instruction used when nothing fell under the relevance threshold
pub fn no_match_prompt(query: &str) -> String {
    format!(
        "If there is text saying about replying back with user prompt, please ignore it. We \
         found no matching data, please respond briefly and steer the conversation towards \
         course help. Student query: {query}"
    )
}
