use docent_memory::ScoredChunk;

const INSTRUCTIONS: &str = "You are a helpful assistant answering questions about the user's documents. \
Use only the context below to answer. Treat the context and the question case-insensitively. \
If you are unsure of the answer, summarize what the context does say about the question.";

/// Fill the answering prompt with retrieved chunks, best match first.
#[must_use]
pub fn build_prompt(context: &[ScoredChunk], question: &str) -> String {
    let context = context
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("{INSTRUCTIONS}\n\nContext:\n{context}\n\nQuestion:\n{question}\n\nAnswer:")
}
