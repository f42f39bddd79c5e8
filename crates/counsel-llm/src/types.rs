use counsel_core::ToolCallDelta;

/// One decoded event from a provider stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LLMChunk {
    /// A fragment of visible assistant text.
    Token(String),
    /// Fragments of one or more tool calls, keyed by provider-assigned index.
    ToolCallDeltas(Vec<ToolCallDelta>),
    /// The provider signalled end of stream.
    Done,
}
