//! The page instruction sent to the inference backend.
//!
//! Centralised so that changing the default behaviour requires editing
//! exactly one place, and so unit tests can inspect the prompt without a
//! live backend. The instruction is page-invariant: every page of every
//! document gets the same one, overridable via
//! [`crate::config::PipelineConfig::prompt`].

/// Default instruction for transcribing one page image to Markdown.
///
/// The model is asked to open with a small metadata front-matter block; the
/// response normaliser strips it before assembly, so only the transcription
/// reaches the artifact.
pub const PAGE_PROMPT: &str = r#"Attached is the image of one page of a document. Transcribe it to clean, well-structured Markdown.

Follow these rules precisely:

1. METADATA
   - Open your response with a front-matter block delimited by two lines
     containing only ---
   - Inside it, state the primary language of the page and whether the page
     contains a table or a diagram

2. TEXT PRESERVATION
   - Transcribe ALL text content completely and accurately
   - Maintain the natural reading order of the page
   - Do not invent text that is not on the page

3. STRUCTURE
   - Use #, ##, ### headings to match the visual hierarchy
   - Use - for unordered lists and 1. 2. 3. for ordered lists
   - Convert tables to GFM pipe format
   - Use **bold** and *italic* to match the visual emphasis

4. FORMULAS
   - Render mathematical expressions using LaTeX delimiters

5. OUTPUT FORMAT
   - After the metadata block, output ONLY the page content as Markdown
   - Do NOT add commentary, explanations, or "Page X" markers"#;
